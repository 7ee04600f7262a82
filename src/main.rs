//! Server binary: wire configuration, stores, vendor clients and serve.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use dtf_backoffice::config::AppConfig;
use dtf_backoffice::core::error::set_debug_errors;
use dtf_backoffice::domain::PriceList;
use dtf_backoffice::server::{AppState, build_router};
use dtf_backoffice::storage::{
    InMemoryCustomerStore, InMemoryOrderStore, InMemoryPriceListStore, PriceListStore,
};
use dtf_backoffice::vendors::{CarrierClient, InvoicingClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dtf_backoffice=info,tower_http=info")),
        )
        .init();

    let config = match std::env::var("DTF_CONFIG") {
        Ok(path) => AppConfig::from_yaml_file(&path)?,
        Err(_) => AppConfig::from_env(),
    };
    set_debug_errors(config.debug);
    config.warn_on_missing_credentials();

    let price_lists = Arc::new(InMemoryPriceListStore::new());
    if price_lists.current(Utc::now()).await?.is_none() {
        price_lists.append(PriceList::seed()).await?;
        tracing::info!("seeded default price list");
    }

    let carrier = CarrierClient::new(
        config.carrier.clone(),
        config.sender.clone(),
        config.vendor_timeout(),
    )?;
    let invoicing = InvoicingClient::new(config.invoicing.clone(), config.vendor_timeout())?;

    let listen_addr = config.listen_addr.clone();
    let state = AppState {
        customers: Arc::new(InMemoryCustomerStore::new()),
        orders: Arc::new(InMemoryOrderStore::new()),
        price_lists,
        carrier: Arc::new(carrier),
        invoicing: Arc::new(invoicing),
        config: Arc::new(config),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listen_addr, "dtf-backoffice listening");
    axum::serve(listener, app).await?;

    Ok(())
}
