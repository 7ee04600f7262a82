//! Shared test harness: mock vendor gateways and a ready-to-drive server
#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dtf_backoffice::config::AppConfig;
use dtf_backoffice::server::{AppState, build_router};
use dtf_backoffice::storage::{
    InMemoryCustomerStore, InMemoryOrderStore, InMemoryPriceListStore, PriceListStore,
};
use dtf_backoffice::domain::PriceList;
use dtf_backoffice::vendors::{
    CarrierError, CarrierGateway, InvoiceRequest, InvoicingError, InvoicingGateway, IssuedInvoice,
    ParcelLabel, ParcelRequest, ParcelStatus,
};

pub const MOCK_PARCEL_NUMBER: &str = "12345678901";
pub const MOCK_INVOICE_NUMBER: &str = "E-DTF-2025-123";
pub const MOCK_PDF: &[u8] = b"%PDF-1.4 mock";

/// Carrier gateway double; counts calls so tests can assert the
/// idempotency guard fires before any vendor traffic.
pub struct MockCarrier {
    pub create_calls: AtomicUsize,
    pub fail_create: bool,
}

impl Default for MockCarrier {
    fn default() -> Self {
        Self {
            create_calls: AtomicUsize::new(0),
            fail_create: false,
        }
    }
}

#[async_trait]
impl CarrierGateway for MockCarrier {
    async fn create_parcel(&self, _request: &ParcelRequest) -> Result<ParcelLabel, CarrierError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(CarrierError::Http(503));
        }
        Ok(ParcelLabel {
            parcel_number: MOCK_PARCEL_NUMBER.to_string(),
            label_url: "data:application/pdf;base64,JVBERi0xLjQ=".to_string(),
            tracking_url: format!(
                "https://online.gls-hungary.com/tt_page.php?tt_value={}",
                MOCK_PARCEL_NUMBER
            ),
        })
    }

    async fn parcel_label(&self, _parcel_number: &str) -> Result<Vec<u8>, CarrierError> {
        Ok(MOCK_PDF.to_vec())
    }

    async fn track_parcel(&self, _parcel_number: &str) -> Result<ParcelStatus, CarrierError> {
        Ok(ParcelStatus {
            status_code: Some("4".to_string()),
            status: "InTransit".to_string(),
            status_text: "En route".to_string(),
            location: Some("Budapest".to_string()),
            timestamp: Some("2025-03-10T10:00:00".to_string()),
        })
    }
}

/// Invoicing gateway double
pub struct MockInvoicing {
    pub issue_calls: AtomicUsize,
    pub cancel_calls: AtomicUsize,
    pub fail_issue: bool,
    pub empty_download: bool,
}

impl Default for MockInvoicing {
    fn default() -> Self {
        Self {
            issue_calls: AtomicUsize::new(0),
            cancel_calls: AtomicUsize::new(0),
            fail_issue: false,
            empty_download: false,
        }
    }
}

#[async_trait]
impl InvoicingGateway for MockInvoicing {
    async fn issue_invoice(
        &self,
        _request: &InvoiceRequest,
    ) -> Result<IssuedInvoice, InvoicingError> {
        self.issue_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_issue {
            return Err(InvoicingError::Vendor {
                code: "54".to_string(),
                message: "Invalid buyer".to_string(),
            });
        }
        Ok(IssuedInvoice {
            invoice_number: MOCK_INVOICE_NUMBER.to_string(),
            pdf_url: Some("https://invoicing.test/pdf/123".to_string()),
        })
    }

    async fn cancel_invoice(&self, _invoice_number: &str) -> Result<(), InvoicingError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn download_invoice(&self, _invoice_number: &str) -> Result<Vec<u8>, InvoicingError> {
        if self.empty_download {
            return Err(InvoicingError::EmptyDocument);
        }
        Ok(MOCK_PDF.to_vec())
    }
}

/// Everything a test might want to poke at after driving the API
pub struct TestApp {
    pub server: TestServer,
    pub carrier: Arc<MockCarrier>,
    pub invoicing: Arc<MockInvoicing>,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(AppConfig::default(), MockCarrier::default(), MockInvoicing::default()).await
}

pub async fn spawn_app_with(
    config: AppConfig,
    carrier: MockCarrier,
    invoicing: MockInvoicing,
) -> TestApp {
    let price_lists = Arc::new(InMemoryPriceListStore::new());
    price_lists.append(PriceList::seed()).await.unwrap();

    let carrier = Arc::new(carrier);
    let invoicing = Arc::new(invoicing);

    let state = AppState {
        customers: Arc::new(InMemoryCustomerStore::new()),
        orders: Arc::new(InMemoryOrderStore::new()),
        price_lists,
        carrier: carrier.clone(),
        invoicing: invoicing.clone(),
        config: Arc::new(config),
    };

    let server = TestServer::new(build_router(state));

    TestApp {
        server,
        carrier,
        invoicing,
    }
}

/// A valid customer payload; tweak fields per test.
pub fn customer_payload() -> serde_json::Value {
    json!({
        "name": "Teszt Ügyfél Kft.",
        "email": "info@teszt.hu",
        "phone": "+36 30 123 4567",
        "billingName": "Teszt Ügyfél Kft.",
        "billingZip": "1234",
        "billingCity": "Budapest",
        "billingAddress": "Teszt utca 1.",
        "taxNumber": "12345678-1-23"
    })
}

/// Create a customer and return its id.
pub async fn create_customer(app: &TestApp) -> String {
    let response = app.server.post("/customers").json(&customer_payload()).await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    response.json::<serde_json::Value>()["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Create an order for `customer_id` and return the response body.
pub async fn create_order(
    app: &TestApp,
    customer_id: &str,
    shipping_method: &str,
    payment_method: &str,
) -> serde_json::Value {
    let response = app
        .server
        .post("/orders")
        .json(&json!({
            "customerId": customer_id,
            "lengthMm": 5000,
            "shippingMethod": shipping_method,
            "paymentMethod": payment_method
        }))
        .await;
    assert_eq!(response.status_code(), 201, "{}", response.text());
    response.json::<serde_json::Value>()
}
