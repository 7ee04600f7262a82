//! Order CRUD handlers
//!
//! Creation is the atomic part: the price snapshot is computed from the
//! current price list and the order number reserved inside the store's
//! create call, so the persisted order is complete from its first moment.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{AppError, AppResult};
use crate::domain::{
    Customer, NewOrder, Order, OrderInput, OrderStatus, OrderUpdate, calculate_price,
};
use crate::server::state::AppState;

/// Customer fields shown inline on order listings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBrief {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl From<&Customer> for CustomerBrief {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderWithCustomer {
    #[serde(flatten)]
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerBrief>,
}

async fn with_customer(state: &AppState, order: Order) -> AppResult<OrderWithCustomer> {
    let customer = state.customers.get(&order.customer_id).await?;
    Ok(OrderWithCustomer {
        order,
        customer: customer.as_ref().map(CustomerBrief::from),
    })
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

/// GET /orders?status=...
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<OrderWithCustomer>>> {
    let mut orders = state.orders.list().await?;
    if let Some(status) = query.status {
        orders.retain(|order| order.order_status == status);
    }
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut response = Vec::with_capacity(orders.len());
    for order in orders {
        response.push(with_customer(&state, order).await?);
    }

    Ok(Json(response))
}

/// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<OrderInput>,
) -> AppResult<(StatusCode, Json<OrderWithCustomer>)> {
    if input.length_mm <= 0 {
        return Err(AppError::validation("lengthMm", "must be positive"));
    }

    if state.customers.get(&input.customer_id).await?.is_none() {
        return Err(AppError::validation("customerId", "unknown customer"));
    }

    let price_list = state
        .price_lists
        .current(Utc::now())
        .await?
        .ok_or_else(|| AppError::internal("no price list configured"))?;

    let prices = calculate_price(
        input.length_mm,
        input.shipping_method,
        input.payment_method,
        &price_list,
    );

    let order = state.orders.create(NewOrder { input, prices }).await?;

    tracing::info!(order_number = %order.order_number, total_gross = order.total_gross, "order created");

    let response = with_customer(&state, order).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrderWithCustomer>> {
    let order = state
        .orders
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("order", id.to_string()))?;

    Ok(Json(with_customer(&state, order).await?))
}

/// PUT /orders/{id}
///
/// Status and metadata updates only. Invoice and shipping fields are
/// owned by the vendor adapters and cannot be written here.
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<OrderUpdate>,
) -> AppResult<Json<OrderWithCustomer>> {
    let mut order = state
        .orders
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("order", id.to_string()))?;

    order.apply_update(update);
    let order = state.orders.update(&id, order).await?;

    Ok(Json(with_customer(&state, order).await?))
}

/// DELETE /orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .orders
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("order", id.to_string()))?;

    state.orders.delete(&id).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
