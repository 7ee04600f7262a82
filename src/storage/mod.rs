//! Store traits for customers, orders and price lists
//!
//! Handlers only ever see these traits; the backing implementation is
//! swappable. The crate ships an in-memory backend, which is also what the
//! integration tests run against.

mod in_memory;

pub use in_memory::{InMemoryCustomerStore, InMemoryOrderStore, InMemoryPriceListStore};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Customer, NewOrder, Order, PriceList};

/// CRUD over customers
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn create(&self, customer: Customer) -> Result<Customer>;

    async fn get(&self, id: &Uuid) -> Result<Option<Customer>>;

    async fn list(&self) -> Result<Vec<Customer>>;

    async fn update(&self, id: &Uuid, customer: Customer) -> Result<Customer>;

    async fn delete(&self, id: &Uuid) -> Result<()>;
}

/// CRUD over orders
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a priced order. The order number is reserved and committed
    /// inside this call: implementations must make the derive-then-insert
    /// pair atomic so concurrent creations never share a number.
    async fn create(&self, new_order: NewOrder) -> Result<Order>;

    async fn get(&self, id: &Uuid) -> Result<Option<Order>>;

    /// Look an order up by its carrier parcel number. The webhook receiver
    /// uses this; the vendor has no notion of internal order ids.
    async fn find_by_parcel_number(&self, parcel_number: &str) -> Result<Option<Order>>;

    async fn list(&self) -> Result<Vec<Order>>;

    /// Number of orders referencing a customer; guards customer deletion.
    async fn count_by_customer(&self, customer_id: &Uuid) -> Result<usize>;

    async fn update(&self, id: &Uuid, order: Order) -> Result<Order>;

    async fn delete(&self, id: &Uuid) -> Result<()>;
}

/// Append-only price list rows
#[async_trait]
pub trait PriceListStore: Send + Sync {
    async fn append(&self, row: PriceList) -> Result<PriceList>;

    /// The row in effect: greatest `valid_from <= now`.
    async fn current(&self, now: DateTime<Utc>) -> Result<Option<PriceList>>;

    /// All rows, most recent validity first.
    async fn history(&self) -> Result<Vec<PriceList>>;
}
