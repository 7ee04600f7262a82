//! # DTF Backoffice
//!
//! Order management back office for a DTF print shop: customers, orders
//! with frozen price snapshots, carrier shipping labels and e-invoicing.
//!
//! ## Architecture
//!
//! - [`domain`]: entities, status vocabularies, the pricing calculator and
//!   order numbering — pure and synchronous
//! - [`storage`]: async store traits plus an in-memory backend
//! - [`vendors`]: the carrier and invoicing adapters behind gateway traits
//! - [`stats`]: read-side rollups for the dashboard and monthly billing
//! - [`server`]: axum router and handlers tying everything together
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dtf_backoffice::prelude::*;
//!
//! let state = AppState {
//!     customers: Arc::new(InMemoryCustomerStore::new()),
//!     orders: Arc::new(InMemoryOrderStore::new()),
//!     price_lists: Arc::new(InMemoryPriceListStore::new()),
//!     carrier: Arc::new(carrier_client),
//!     invoicing: Arc::new(invoicing_client),
//!     config: Arc::new(AppConfig::from_env()),
//! };
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod stats;
pub mod storage;
pub mod vendors;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{AppError, AppResult, ErrorResponse};

    // === Config ===
    pub use crate::config::AppConfig;

    // === Domain ===
    pub use crate::domain::{
        Customer, CustomerInput, InvoiceStatus, NewOrder, Order, OrderInput, OrderStatus,
        OrderUpdate, PaymentMethod, PaymentStatus, PriceBreakdown, PriceList, PriceListInput,
        ShippingMethod, calculate_price, next_order_number,
    };

    // === Storage ===
    pub use crate::storage::{
        CustomerStore, InMemoryCustomerStore, InMemoryOrderStore, InMemoryPriceListStore,
        OrderStore, PriceListStore,
    };

    // === Vendors ===
    pub use crate::vendors::{
        CarrierClient, CarrierError, CarrierGateway, InvoiceRequest, InvoicingClient,
        InvoicingError, InvoicingGateway, IssuedInvoice, ParcelLabel, ParcelRequest, ParcelStatus,
    };

    // === Server ===
    pub use crate::server::{AppState, build_router};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
