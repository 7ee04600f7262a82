//! Customer CRUD handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use crate::core::{AppError, AppResult};
use crate::domain::{Customer, CustomerInput, Order, OrderStatus};
use crate::server::state::AppState;

use super::validate_body;

/// Order fields shown inline on customer listings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBrief {
    pub id: Uuid,
    pub order_number: String,
    pub total_gross: i64,
    pub order_status: OrderStatus,
}

impl From<&Order> for OrderBrief {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            total_gross: order.total_gross,
            order_status: order.order_status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerWithOrders {
    #[serde(flatten)]
    pub customer: Customer,
    pub orders: Vec<OrderBrief>,
}

/// GET /customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CustomerWithOrders>>> {
    let mut customers = state.customers.list().await?;
    customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let orders = state.orders.list().await?;

    let response = customers
        .into_iter()
        .map(|customer| {
            let mut briefs: Vec<OrderBrief> = orders
                .iter()
                .filter(|order| order.customer_id == customer.id)
                .map(OrderBrief::from)
                .collect();
            briefs.sort_by(|a, b| b.order_number.cmp(&a.order_number));
            CustomerWithOrders {
                customer,
                orders: briefs,
            }
        })
        .collect();

    Ok(Json(response))
}

/// POST /customers
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    validate_body(&input)?;

    let customer = state.customers.create(Customer::new(input)).await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let customer = state
        .customers
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("customer", id.to_string()))?;

    let mut orders: Vec<Order> = state
        .orders
        .list()
        .await?
        .into_iter()
        .filter(|order| order.customer_id == id)
        .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut body = serde_json::to_value(&customer).map_err(|e| AppError::internal(e.to_string()))?;
    body["orders"] = serde_json::to_value(&orders).map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(body))
}

/// PUT /customers/{id}
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CustomerInput>,
) -> AppResult<Json<Customer>> {
    validate_body(&input)?;

    let mut customer = state
        .customers
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("customer", id.to_string()))?;

    customer.apply(input);
    let customer = state.customers.update(&id, customer).await?;

    Ok(Json(customer))
}

/// DELETE /customers/{id}
///
/// Refused while any order still references the customer.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .customers
        .get(&id)
        .await?
        .ok_or_else(|| AppError::not_found("customer", id.to_string()))?;

    let order_count = state.orders.count_by_customer(&id).await?;
    if order_count > 0 {
        return Err(AppError::conflict(
            "the customer cannot be deleted because orders reference it",
        ));
    }

    state.customers.delete(&id).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
