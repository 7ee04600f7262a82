//! Router assembly

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{customers, invoices, orders, pricing, shipping, stats};
use super::state::AppState;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/{id}",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/orders/{id}",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route(
            "/pricing",
            get(pricing::current_pricing).post(pricing::create_pricing),
        )
        .route("/pricing/history", get(pricing::pricing_history))
        .route("/pricing/quote", post(pricing::quote))
        .route("/shipping/labels", post(shipping::create_label))
        .route(
            "/shipping/labels/{parcel_number}",
            get(shipping::reprint_label),
        )
        .route(
            "/shipping/track/{parcel_number}",
            get(shipping::track_parcel),
        )
        .route("/webhooks/carrier", post(shipping::carrier_webhook))
        .route("/invoices", post(invoices::create_invoice))
        .route("/invoices/cancel", post(invoices::cancel_invoice))
        .route(
            "/invoices/{invoice_number}/download",
            get(invoices::download_invoice),
        )
        .route("/stats", get(stats::get_stats))
        .route("/billing/monthly", get(stats::monthly_billing_report))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
