//! Dashboard statistics and monthly billing handlers

use axum::Json;
use axum::extract::{Query, State};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::{AppError, AppResult};
use crate::domain::Customer;
use crate::server::state::AppState;
use crate::stats::{BillingFilter, BillingReport, DashboardStats, dashboard, monthly_billing};

async fn customer_map(state: &AppState) -> AppResult<HashMap<Uuid, Customer>> {
    Ok(state
        .customers
        .list()
        .await?
        .into_iter()
        .map(|customer| (customer.id, customer))
        .collect())
}

/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let orders = state.orders.list().await?;
    let customers = customer_map(&state).await?;

    Ok(Json(dashboard(&orders, &customers, Utc::now())))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingQuery {
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
}

/// GET /billing/monthly?customerId=&year=&month=
pub async fn monthly_billing_report(
    State(state): State<AppState>,
    Query(query): Query<BillingQuery>,
) -> AppResult<Json<BillingReport>> {
    if let Some(month) = query.month {
        if !(1..=12).contains(&month) {
            return Err(AppError::validation("month", "must be between 1 and 12"));
        }
        if query.year.is_none() {
            return Err(AppError::validation("year", "is required when month is set"));
        }
    }

    let orders = state.orders.list().await?;
    let customers = customer_map(&state).await?;

    let report = monthly_billing(
        &orders,
        &customers,
        BillingFilter {
            customer_id: query.customer_id,
            year: query.year,
            month: query.month,
        },
    );

    Ok(Json(report))
}
