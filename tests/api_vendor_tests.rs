//! End-to-end tests for the vendor-facing surface: labels, tracking,
//! webhook and invoicing, with the gateways mocked.

mod support;

use axum::http::{HeaderName, HeaderValue};
use serde_json::json;
use std::sync::atomic::Ordering;
use support::{
    MOCK_INVOICE_NUMBER, MOCK_PARCEL_NUMBER, MOCK_PDF, MockCarrier, MockInvoicing, create_customer,
    create_order, spawn_app, spawn_app_with,
};

use dtf_backoffice::config::AppConfig;

// =============================================================================
// Shipping labels
// =============================================================================

#[tokio::test]
async fn label_creation_stores_carrier_metadata() {
    let app = spawn_app().await;
    let customer_id = create_customer(&app).await;
    let order = create_order(&app, &customer_id, "carrier", "prepaid").await;

    let response = app
        .server
        .post("/shipping/labels")
        .json(&json!({ "orderId": order["id"] }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    let body = response.json::<serde_json::Value>();

    assert_eq!(body["parcelNumber"], MOCK_PARCEL_NUMBER);
    assert_eq!(
        body["trackingUrl"],
        format!(
            "https://online.gls-hungary.com/tt_page.php?tt_value={}",
            MOCK_PARCEL_NUMBER
        )
    );
    assert_eq!(body["order"]["carrierStatus"], "Label created");
    assert_eq!(app.carrier.create_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn duplicate_label_is_refused_without_calling_the_vendor() {
    let app = spawn_app().await;
    let customer_id = create_customer(&app).await;
    let order = create_order(&app, &customer_id, "carrier", "prepaid").await;

    let first = app
        .server
        .post("/shipping/labels")
        .json(&json!({ "orderId": order["id"] }))
        .await;
    assert_eq!(first.status_code(), 200);

    let second = app
        .server
        .post("/shipping/labels")
        .json(&json!({ "orderId": order["id"] }))
        .await;
    assert_eq!(second.status_code(), 400);
    assert_eq!(second.json::<serde_json::Value>()["code"], "CONFLICT");

    // The guard fired before any vendor traffic
    assert_eq!(app.carrier.create_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn label_creation_requires_carrier_shipping() {
    let app = spawn_app().await;
    let customer_id = create_customer(&app).await;
    let order = create_order(&app, &customer_id, "pickup", "prepaid").await;

    let response = app
        .server
        .post("/shipping/labels")
        .json(&json!({ "orderId": order["id"] }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(app.carrier.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn vendor_failure_surfaces_as_500_and_leaves_the_order_unchanged() {
    let carrier = MockCarrier {
        fail_create: true,
        ..Default::default()
    };
    let app = spawn_app_with(AppConfig::default(), carrier, MockInvoicing::default()).await;
    let customer_id = create_customer(&app).await;
    let order = create_order(&app, &customer_id, "carrier", "prepaid").await;

    let response = app
        .server
        .post("/shipping/labels")
        .json(&json!({ "orderId": order["id"] }))
        .await;
    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json::<serde_json::Value>()["code"], "VENDOR_ERROR");

    // Retryable: the order still has no parcel number
    let response = app
        .server
        .get(&format!("/orders/{}", order["id"].as_str().unwrap()))
        .await;
    assert!(response.json::<serde_json::Value>().get("parcelNumber").is_none());
}

#[tokio::test]
async fn label_creation_for_unknown_order_is_404() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/shipping/labels")
        .json(&json!({ "orderId": "00000000-0000-0000-0000-000000000000" }))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn label_reprint_streams_pdf() {
    let app = spawn_app().await;

    let response = app
        .server
        .get(&format!("/shipping/labels/{}", MOCK_PARCEL_NUMBER))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    assert_eq!(response.as_bytes().as_ref(), MOCK_PDF);
}

#[tokio::test]
async fn tracking_refreshes_the_stored_status_text() {
    let app = spawn_app().await;
    let customer_id = create_customer(&app).await;
    let order = create_order(&app, &customer_id, "carrier", "prepaid").await;

    app.server
        .post("/shipping/labels")
        .json(&json!({ "orderId": order["id"] }))
        .await;

    let response = app
        .server
        .get(&format!("/shipping/track/{}", MOCK_PARCEL_NUMBER))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["statusCode"], "4");
    assert_eq!(body["statusText"], "En route");

    let response = app
        .server
        .get(&format!("/orders/{}", order["id"].as_str().unwrap()))
        .await;
    assert_eq!(
        response.json::<serde_json::Value>()["carrierStatus"],
        "En route"
    );
}

// =============================================================================
// Webhook
// =============================================================================

/// Create an order with a label and return its id.
async fn labeled_order(app: &support::TestApp) -> String {
    let customer_id = create_customer(app).await;
    let order = create_order(app, &customer_id, "carrier", "prepaid").await;
    let response = app
        .server
        .post("/shipping/labels")
        .json(&json!({ "orderId": order["id"] }))
        .await;
    assert_eq!(response.status_code(), 200);
    order["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn delivered_webhook_forces_order_to_shipped() {
    let app = spawn_app().await;
    let order_id = labeled_order(&app).await;

    // Manually move the order backwards first; delivery must override it.
    app.server
        .put(&format!("/orders/{}", order_id))
        .json(&json!({ "orderStatus": "in_production" }))
        .await;

    let response = app
        .server
        .post("/webhooks/carrier")
        .json(&json!({
            "parcelNumber": MOCK_PARCEL_NUMBER,
            "status": "some vendor text",
            "statusCode": "6",
            "timestamp": "2025-03-10T12:00:00"
        }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["newStatus"], "Delivered");

    let response = app.server.get(&format!("/orders/{}", order_id)).await;
    let order = response.json::<serde_json::Value>();
    assert_eq!(order["orderStatus"], "shipped");
    assert_eq!(order["carrierStatus"], "Delivered");
}

#[tokio::test]
async fn non_delivery_webhook_updates_status_text_only() {
    let app = spawn_app().await;
    let order_id = labeled_order(&app).await;

    let response = app
        .server
        .post("/webhooks/carrier")
        .json(&json!({
            "parcelNumber": MOCK_PARCEL_NUMBER,
            "status": "moving",
            "statusCode": "4",
            "timestamp": "2025-03-10T12:00:00"
        }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = app.server.get(&format!("/orders/{}", order_id)).await;
    let order = response.json::<serde_json::Value>();
    assert_eq!(order["orderStatus"], "new");
    assert_eq!(order["carrierStatus"], "En route");
}

#[tokio::test]
async fn webhook_passes_unknown_codes_through() {
    let app = spawn_app().await;
    let order_id = labeled_order(&app).await;

    app.server
        .post("/webhooks/carrier")
        .json(&json!({
            "parcelNumber": MOCK_PARCEL_NUMBER,
            "status": "odd",
            "statusCode": "99",
            "timestamp": "2025-03-10T12:00:00"
        }))
        .await;

    let response = app.server.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(response.json::<serde_json::Value>()["carrierStatus"], "99");
}

#[tokio::test]
async fn webhook_validates_required_fields_and_parcel_number() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/webhooks/carrier")
        .json(&json!({ "status": "whatever", "timestamp": "t" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .server
        .post("/webhooks/carrier")
        .json(&json!({
            "parcelNumber": "not-a-known-parcel",
            "status": "whatever",
            "timestamp": "t"
        }))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn webhook_token_is_enforced_when_configured() {
    let config = AppConfig {
        webhook_token: Some("hook-secret".to_string()),
        ..Default::default()
    };
    let app = spawn_app_with(config, MockCarrier::default(), MockInvoicing::default()).await;
    let order_id = labeled_order(&app).await;

    let payload = json!({
        "parcelNumber": MOCK_PARCEL_NUMBER,
        "status": "text",
        "statusCode": "6",
        "timestamp": "t"
    });

    let response = app.server.post("/webhooks/carrier").json(&payload).await;
    assert_eq!(response.status_code(), 401);

    // The order was not mutated
    let response = app.server.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(response.json::<serde_json::Value>()["orderStatus"], "new");

    let response = app
        .server
        .post("/webhooks/carrier")
        .add_header(
            HeaderName::from_static("x-webhook-token"),
            HeaderValue::from_static("hook-secret"),
        )
        .json(&payload)
        .await;
    assert_eq!(response.status_code(), 200);
}

// =============================================================================
// Invoices
// =============================================================================

#[tokio::test]
async fn invoice_issue_and_cancel_lifecycle() {
    let app = spawn_app().await;
    let customer_id = create_customer(&app).await;
    let order = create_order(&app, &customer_id, "carrier", "prepaid").await;
    let order_id = order["id"].as_str().unwrap();

    let response = app
        .server
        .post("/invoices")
        .json(&json!({ "orderId": order_id }))
        .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    assert_eq!(
        response.json::<serde_json::Value>()["invoiceNumber"],
        MOCK_INVOICE_NUMBER
    );

    let response = app.server.get(&format!("/orders/{}", order_id)).await;
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["invoiceStatus"], "issued");
    assert_eq!(body["invoiceNumber"], MOCK_INVOICE_NUMBER);

    // Second issue is refused before any vendor traffic
    let response = app
        .server
        .post("/invoices")
        .json(&json!({ "orderId": order_id }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(app.invoicing.issue_calls.load(Ordering::SeqCst), 1);

    // Cancel succeeds and is terminal
    let response = app
        .server
        .post("/invoices/cancel")
        .json(&json!({ "orderId": order_id }))
        .await;
    assert_eq!(response.status_code(), 200);

    let response = app.server.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(
        response.json::<serde_json::Value>()["invoiceStatus"],
        "cancelled"
    );

    // Neither a re-issue nor a second cancel is possible
    let response = app
        .server
        .post("/invoices")
        .json(&json!({ "orderId": order_id }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .server
        .post("/invoices/cancel")
        .json(&json!({ "orderId": order_id }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(app.invoicing.cancel_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cancel_without_issued_invoice_is_refused() {
    let app = spawn_app().await;
    let customer_id = create_customer(&app).await;
    let order = create_order(&app, &customer_id, "pickup", "prepaid").await;

    let response = app
        .server
        .post("/invoices/cancel")
        .json(&json!({ "orderId": order["id"] }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(app.invoicing.cancel_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_issue_leaves_invoice_status_unchanged() {
    let invoicing = MockInvoicing {
        fail_issue: true,
        ..Default::default()
    };
    let app = spawn_app_with(AppConfig::default(), MockCarrier::default(), invoicing).await;
    let customer_id = create_customer(&app).await;
    let order = create_order(&app, &customer_id, "pickup", "prepaid").await;
    let order_id = order["id"].as_str().unwrap();

    let response = app
        .server
        .post("/invoices")
        .json(&json!({ "orderId": order_id }))
        .await;
    assert_eq!(response.status_code(), 500);
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["code"], "VENDOR_ERROR");
    assert!(body["error"].as_str().unwrap().contains("Invalid buyer"));

    let response = app.server.get(&format!("/orders/{}", order_id)).await;
    assert_eq!(response.json::<serde_json::Value>()["invoiceStatus"], "none");
}

#[tokio::test]
async fn invoice_download_streams_pdf_or_404s() {
    let app = spawn_app().await;

    let response = app
        .server
        .get(&format!("/invoices/{}/download", MOCK_INVOICE_NUMBER))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/pdf"
    );
    assert_eq!(response.as_bytes().as_ref(), MOCK_PDF);

    let invoicing = MockInvoicing {
        empty_download: true,
        ..Default::default()
    };
    let app = spawn_app_with(AppConfig::default(), MockCarrier::default(), invoicing).await;
    let response = app
        .server
        .get(&format!("/invoices/{}/download", MOCK_INVOICE_NUMBER))
        .await;
    assert_eq!(response.status_code(), 404);
}
