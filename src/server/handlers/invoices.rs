//! Invoice issue, cancel and download handlers
//!
//! Line items echo the order's stored price breakdown field by field; the
//! invoice can never disagree with the persisted order. Issue and cancel
//! guard their status preconditions before any vendor traffic.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;

use crate::core::{AppError, AppResult};
use crate::domain::{Customer, InvoiceStatus, Order};
use crate::server::state::AppState;
use crate::vendors::{InvoiceCustomer, InvoiceLineItem, InvoiceRequest, InvoicingError};

use super::shipping::OrderIdBody;

fn invoicing_error(err: InvoicingError) -> AppError {
    AppError::Vendor {
        vendor: "invoicing",
        message: err.to_string(),
    }
}

/// One line per non-zero price component, amounts copied verbatim.
fn build_line_items(order: &Order) -> Vec<InvoiceLineItem> {
    let mut items = vec![InvoiceLineItem {
        name: format!(
            "DTF print {}x{}mm ({:.2} m²)",
            order.width_mm, order.length_mm, order.square_meters
        ),
        quantity: 1,
        unit: "pcs".to_string(),
        net_unit_price: order.product_net,
        vat_rate: order.vat_rate,
        net_amount: order.product_net,
        vat_amount: order.product_vat,
        gross_amount: order.product_net + order.product_vat,
    }];

    if order.shipping_net > 0 {
        items.push(InvoiceLineItem {
            name: "Shipping fee (carrier)".to_string(),
            quantity: 1,
            unit: "pcs".to_string(),
            net_unit_price: order.shipping_net,
            vat_rate: order.vat_rate,
            net_amount: order.shipping_net,
            vat_amount: order.shipping_vat,
            gross_amount: order.shipping_net + order.shipping_vat,
        });
    }

    if order.cod_net > 0 {
        items.push(InvoiceLineItem {
            name: "Cash-on-delivery handling fee".to_string(),
            quantity: 1,
            unit: "pcs".to_string(),
            net_unit_price: order.cod_net,
            vat_rate: order.vat_rate,
            net_amount: order.cod_net,
            vat_amount: order.cod_vat,
            gross_amount: order.cod_net + order.cod_vat,
        });
    }

    items
}

fn build_invoice_request(order: &Order, customer: &Customer) -> InvoiceRequest {
    InvoiceRequest {
        order_number: order.order_number.clone(),
        customer: InvoiceCustomer {
            name: customer.display_name().to_string(),
            zip: customer.billing_zip.clone(),
            city: customer.billing_city.clone(),
            address: customer.billing_address.clone(),
            email: customer.email.clone(),
            tax_number: customer.tax_number.clone(),
            phone: Some(customer.phone.clone()),
        },
        items: build_line_items(order),
        payment_method: order.payment_method,
        payment_date: order.payment_date,
        deadline: order.deadline,
        comment: order.description.clone(),
    }
}

/// POST /invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(body): Json<OrderIdBody>,
) -> AppResult<Json<serde_json::Value>> {
    let mut order = state
        .orders
        .get(&body.order_id)
        .await?
        .ok_or_else(|| AppError::not_found("order", body.order_id.to_string()))?;

    match order.invoice_status {
        InvoiceStatus::Issued => {
            return Err(AppError::conflict(
                "an invoice has already been issued for this order",
            ));
        }
        InvoiceStatus::Cancelled => {
            return Err(AppError::conflict(
                "the invoice for this order was cancelled and cannot be re-issued",
            ));
        }
        InvoiceStatus::None => {}
    }

    let customer = state
        .customers
        .get(&order.customer_id)
        .await?
        .ok_or_else(|| AppError::not_found("customer", order.customer_id.to_string()))?;

    let request = build_invoice_request(&order, &customer);
    let issued = state
        .invoicing
        .issue_invoice(&request)
        .await
        .map_err(invoicing_error)?;

    order.invoice_status = InvoiceStatus::Issued;
    order.invoice_number = Some(issued.invoice_number.clone());
    order.touch();
    let id = order.id;
    state.orders.update(&id, order).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "invoiceNumber": issued.invoice_number,
        "pdfUrl": issued.pdf_url,
        "message": "Invoice issued",
    })))
}

/// POST /invoices/cancel
///
/// Cancellation is terminal: the order keeps its invoice number for the
/// audit trail but can never carry a new invoice.
pub async fn cancel_invoice(
    State(state): State<AppState>,
    Json(body): Json<OrderIdBody>,
) -> AppResult<Json<serde_json::Value>> {
    let mut order = state
        .orders
        .get(&body.order_id)
        .await?
        .ok_or_else(|| AppError::not_found("order", body.order_id.to_string()))?;

    let invoice_number = match (&order.invoice_status, &order.invoice_number) {
        (InvoiceStatus::Issued, Some(number)) => number.clone(),
        _ => {
            return Err(AppError::conflict(
                "no issued invoice exists for this order",
            ));
        }
    };

    state
        .invoicing
        .cancel_invoice(&invoice_number)
        .await
        .map_err(invoicing_error)?;

    order.invoice_status = InvoiceStatus::Cancelled;
    order.touch();
    let id = order.id;
    state.orders.update(&id, order).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Invoice cancelled",
    })))
}

/// GET /invoices/{invoice_number}/download
pub async fn download_invoice(
    State(state): State<AppState>,
    Path(invoice_number): Path<String>,
) -> AppResult<impl IntoResponse> {
    let pdf = state
        .invoicing
        .download_invoice(&invoice_number)
        .await
        .map_err(|err| match err {
            InvoicingError::EmptyDocument => {
                AppError::not_found("invoice", invoice_number.clone())
            }
            other => invoicing_error(other),
        })?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.pdf\"", invoice_number),
        ),
    ];
    Ok((headers, pdf))
}
