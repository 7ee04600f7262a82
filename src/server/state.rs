//! Application state shared across handlers

use std::sync::Arc;

use crate::config::AppConfig;
use crate::storage::{CustomerStore, OrderStore, PriceListStore};
use crate::vendors::{CarrierGateway, InvoicingGateway};

/// Everything a handler can reach: the three stores, the two vendor
/// gateways and the configuration. Gateways are trait objects so tests
/// swap in mocks without touching the router.
#[derive(Clone)]
pub struct AppState {
    pub customers: Arc<dyn CustomerStore>,
    pub orders: Arc<dyn OrderStore>,
    pub price_lists: Arc<dyn PriceListStore>,
    pub carrier: Arc<dyn CarrierGateway>,
    pub invoicing: Arc<dyn InvoicingGateway>,
    pub config: Arc<AppConfig>,
}
