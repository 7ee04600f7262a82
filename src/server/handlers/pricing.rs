//! Price list handlers
//!
//! Price rows are append-only. Editing history would retroactively change
//! nothing anyway — orders snapshot their amounts — but append-only keeps
//! the audit trail honest.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde::Deserialize;

use crate::core::{AppError, AppResult};
use crate::domain::{
    PaymentMethod, PriceBreakdown, PriceList, PriceListInput, ShippingMethod, calculate_price,
};
use crate::server::state::AppState;

/// GET /pricing
///
/// The row currently in effect. An empty store is seeded on first read so
/// the endpoint never 404s.
pub async fn current_pricing(State(state): State<AppState>) -> AppResult<Json<PriceList>> {
    if let Some(current) = state.price_lists.current(Utc::now()).await? {
        return Ok(Json(current));
    }

    let seeded = state.price_lists.append(PriceList::seed()).await?;
    tracing::warn!("price list store was empty; seeded defaults");
    Ok(Json(seeded))
}

/// GET /pricing/history
pub async fn pricing_history(State(state): State<AppState>) -> AppResult<Json<Vec<PriceList>>> {
    Ok(Json(state.price_lists.history().await?))
}

/// POST /pricing
pub async fn create_pricing(
    State(state): State<AppState>,
    Json(input): Json<PriceListInput>,
) -> AppResult<(StatusCode, Json<PriceList>)> {
    if input.price_per_sqm <= 0 {
        return Err(AppError::validation("pricePerSqm", "must be positive"));
    }
    if input.vat_rate < 0.0 {
        return Err(AppError::validation("vatRate", "must not be negative"));
    }
    if input.carrier_surcharge < 0 || input.cod_surcharge < 0 {
        return Err(AppError::validation("surcharge", "must not be negative"));
    }

    let row = state.price_lists.append(input.into_price_list()).await?;

    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub length_mm: i64,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
}

/// POST /pricing/quote
///
/// Compute a price breakdown without creating an order.
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> AppResult<Json<PriceBreakdown>> {
    if request.length_mm <= 0 {
        return Err(AppError::validation("lengthMm", "must be positive"));
    }

    let price_list = state
        .price_lists
        .current(Utc::now())
        .await?
        .ok_or_else(|| AppError::internal("no price list configured"))?;

    Ok(Json(calculate_price(
        request.length_mm,
        request.shipping_method,
        request.payment_method,
        &price_list,
    )))
}
