//! Carrier label creation, tracking, label reprint and the webhook receiver

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::{AppError, AppResult};
use crate::domain::{Customer, Order, OrderStatus, PaymentMethod, ShippingMethod};
use crate::server::state::AppState;
use crate::vendors::carrier::{is_delivered, status_phrase};
use crate::vendors::{CarrierError, ParcelRequest};

fn carrier_error(err: CarrierError) -> AppError {
    AppError::Vendor {
        vendor: "carrier",
        message: err.to_string(),
    }
}

/// Resolve the delivery address for a label: the customer's shipping block
/// when it is complete, the billing block otherwise. An address stored on
/// the order overrides the street line.
fn delivery_address(order: &Order, customer: &Customer) -> (String, String, String, String) {
    let (name, zip, city, street) = match (
        &customer.shipping_name,
        &customer.shipping_zip,
        &customer.shipping_city,
        &customer.shipping_address,
    ) {
        (Some(name), Some(zip), Some(city), Some(street)) => (
            name.clone(),
            zip.clone(),
            city.clone(),
            street.clone(),
        ),
        _ => (
            customer.billing_name.clone(),
            customer.billing_zip.clone(),
            customer.billing_city.clone(),
            customer.billing_address.clone(),
        ),
    };

    let street = order.shipping_address.clone().unwrap_or(street);
    (name, zip, city, street)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIdBody {
    pub order_id: Uuid,
}

/// POST /shipping/labels
///
/// Creates the carrier parcel and stores the label metadata on the order.
/// A second call for the same order is refused before any vendor traffic.
pub async fn create_label(
    State(state): State<AppState>,
    Json(body): Json<OrderIdBody>,
) -> AppResult<Json<serde_json::Value>> {
    let mut order = state
        .orders
        .get(&body.order_id)
        .await?
        .ok_or_else(|| AppError::not_found("order", body.order_id.to_string()))?;

    if order.shipping_method != ShippingMethod::Carrier {
        return Err(AppError::conflict("this order does not ship via carrier"));
    }
    if order.has_label() {
        return Err(AppError::conflict("a label already exists for this order"));
    }

    let customer = state
        .customers
        .get(&order.customer_id)
        .await?
        .ok_or_else(|| AppError::not_found("customer", order.customer_id.to_string()))?;

    let (name, zip_code, city, address) = delivery_address(&order, &customer);
    let cod_amount = (order.payment_method == PaymentMethod::CashOnDelivery)
        .then_some(order.total_gross);

    let request = ParcelRequest {
        name,
        address,
        city,
        zip_code,
        phone: customer.phone.clone(),
        email: Some(customer.email.clone()),
        reference: order.order_number.clone(),
        weight_kg: state.config.parcel_weight_kg,
        cod_amount,
        count: 1,
    };

    let label = state
        .carrier
        .create_parcel(&request)
        .await
        .map_err(carrier_error)?;

    order.parcel_number = Some(label.parcel_number.clone());
    order.label_url = Some(label.label_url.clone());
    order.tracking_url = Some(label.tracking_url.clone());
    order.carrier_status = Some("Label created".to_string());
    order.touch();
    let id = order.id;
    let order = state.orders.update(&id, order).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "parcelNumber": label.parcel_number,
        "labelUrl": label.label_url,
        "trackingUrl": label.tracking_url,
        "order": order,
    })))
}

/// GET /shipping/labels/{parcel_number}
///
/// Re-download the label PDF for an existing parcel.
pub async fn reprint_label(
    State(state): State<AppState>,
    Path(parcel_number): Path<String>,
) -> AppResult<impl IntoResponse> {
    let pdf = state
        .carrier
        .parcel_label(&parcel_number)
        .await
        .map_err(|err| match err {
            CarrierError::MissingLabel => AppError::not_found("label", parcel_number.clone()),
            other => carrier_error(other),
        })?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.pdf\"", parcel_number),
        ),
    ];
    Ok((headers, pdf))
}

/// GET /shipping/track/{parcel_number}
///
/// Queries the carrier and refreshes the stored status text on the order
/// that owns the parcel, when there is one.
pub async fn track_parcel(
    State(state): State<AppState>,
    Path(parcel_number): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    if parcel_number.trim().is_empty() {
        return Err(AppError::validation("parcelNumber", "must not be empty"));
    }

    let status = state
        .carrier
        .track_parcel(&parcel_number)
        .await
        .map_err(carrier_error)?;

    if let Some(mut order) = state.orders.find_by_parcel_number(&parcel_number).await? {
        order.carrier_status = Some(status.status_text.clone());
        order.touch();
        let id = order.id;
        state.orders.update(&id, order).await?;
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "parcelNumber": parcel_number,
        "status": status.status,
        "statusCode": status.status_code,
        "statusText": status.status_text,
        "location": status.location,
        "timestamp": status.timestamp,
        "trackingUrl": crate::vendors::carrier::tracking_url(&parcel_number),
    })))
}

/// Inbound status push from the carrier
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub parcel_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// POST /webhooks/carrier
///
/// The vendor identifies parcels by parcel number only. A delivered code
/// force-advances the order to shipped, overriding any manual status.
pub async fn carrier_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<WebhookPayload>,
) -> AppResult<Json<serde_json::Value>> {
    if let Some(expected) = &state.config.webhook_token {
        let provided = headers
            .get("X-Webhook-Token")
            .and_then(|value| value.to_str().ok());
        if provided != Some(expected.as_str()) {
            return Err(AppError::Unauthorized {
                message: "missing or invalid webhook token".to_string(),
            });
        }
    }

    let parcel_number = payload
        .parcel_number
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::validation("parcelNumber", "is required"))?;
    let status = payload
        .status
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::validation("status", "is required"))?;

    tracing::info!(
        parcel_number,
        status,
        status_code = ?payload.status_code,
        timestamp = ?payload.timestamp,
        location = ?payload.location,
        "carrier webhook received"
    );

    let mut order = state
        .orders
        .find_by_parcel_number(parcel_number)
        .await?
        .ok_or_else(|| AppError::not_found("order", parcel_number.to_string()))?;

    // Prefer the numeric code for the phrase lookup; fall back to the raw
    // status, and pass unknown codes through unchanged.
    let status_key = payload.status_code.as_deref().unwrap_or(status);
    let status_text = status_phrase(status_key)
        .map(str::to_string)
        .unwrap_or_else(|| status_key.to_string());

    order.carrier_status = Some(status_text.clone());
    if is_delivered(payload.status_code.as_deref(), status) {
        order.order_status = OrderStatus::Shipped;
    }
    order.touch();
    let id = order.id;
    let order = state.orders.update(&id, order).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Status updated",
        "orderId": order.id,
        "orderNumber": order.order_number,
        "newStatus": status_text,
    })))
}
