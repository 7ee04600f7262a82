//! E-invoicing vendor integration (issue, cancel, download)
//!
//! The vendor accepts form-encoded POSTs whose `data` field is an XML
//! document; the root element differs per operation. Line items always
//! echo the order's stored price breakdown — the adapter never recomputes
//! amounts, so the invoice can never drift from the persisted order.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use std::time::Duration as StdDuration;
use thiserror::Error;

use crate::config::InvoicingConfig;
use crate::domain::PaymentMethod;

use super::xml;

/// Vendor payment-method vocabulary. The mapping is lossy but fixed.
pub fn vendor_payment_method(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Prepaid | PaymentMethod::BankTransfer => "transfer",
        PaymentMethod::CashOnDelivery => "COD",
        PaymentMethod::PickupPayment => "cash",
        PaymentMethod::MonthlyBilling => "card",
    }
}

/// One line on the invoice, amounts in whole currency units
#[derive(Debug, Clone)]
pub struct InvoiceLineItem {
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    pub net_unit_price: i64,
    pub vat_rate: f64,
    pub net_amount: i64,
    pub vat_amount: i64,
    pub gross_amount: i64,
}

/// Buyer block of the invoice
#[derive(Debug, Clone)]
pub struct InvoiceCustomer {
    pub name: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub email: String,
    pub tax_number: Option<String>,
    pub phone: Option<String>,
}

/// Everything needed to issue one invoice
#[derive(Debug, Clone)]
pub struct InvoiceRequest {
    pub order_number: String,
    pub customer: InvoiceCustomer,
    pub items: Vec<InvoiceLineItem>,
    pub payment_method: PaymentMethod,
    /// Marks the payment deadline when present
    pub payment_date: Option<NaiveDate>,
    /// Marks the fulfillment date when present
    pub deadline: Option<NaiveDate>,
    pub comment: Option<String>,
}

/// A successfully issued invoice
#[derive(Debug, Clone)]
pub struct IssuedInvoice {
    pub invoice_number: String,
    pub pdf_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum InvoicingError {
    #[error("invoicing API returned HTTP {0}")]
    Http(u16),

    #[error("invoicing request failed: {0}")]
    Transport(String),

    /// The vendor rejected the operation; code and message come from the
    /// response body.
    #[error("invoicing vendor rejected the request ({code}): {message}")]
    Vendor { code: String, message: String },

    #[error("invoicing vendor did not return an invoice number")]
    MissingInvoiceNumber,

    #[error("invoice document is empty")]
    EmptyDocument,
}

/// Seam between handlers and the invoicing HTTP client; tests plug in mocks.
#[async_trait]
pub trait InvoicingGateway: Send + Sync {
    async fn issue_invoice(&self, request: &InvoiceRequest)
    -> Result<IssuedInvoice, InvoicingError>;

    async fn cancel_invoice(&self, invoice_number: &str) -> Result<(), InvoicingError>;

    /// Fetch the raw invoice PDF.
    async fn download_invoice(&self, invoice_number: &str) -> Result<Vec<u8>, InvoicingError>;
}

/// HTTP implementation of [`InvoicingGateway`]
pub struct InvoicingClient {
    http: reqwest::Client,
    config: InvoicingConfig,
}

/// The vendor writes integer VAT rates without a decimal point.
fn format_vat_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{}", rate as i64)
    } else {
        format!("{}", rate)
    }
}

impl InvoicingClient {
    pub fn new(config: InvoicingConfig, timeout: StdDuration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, config })
    }

    async fn post_form(&self, action: &str, data: String) -> Result<reqwest::Response, InvoicingError> {
        let response = self
            .http
            .post(&self.config.api_url)
            .form(&[("action", action), ("data", data.as_str())])
            .send()
            .await
            .map_err(|e| InvoicingError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), action, "invoicing API error");
            return Err(InvoicingError::Http(status.as_u16()));
        }

        Ok(response)
    }

    fn build_invoice_xml(&self, request: &InvoiceRequest, issue_date: NaiveDate) -> String {
        let fulfillment_date = request.deadline.unwrap_or(issue_date);
        let payment_deadline = request
            .payment_date
            .unwrap_or(issue_date + Duration::days(8));
        let comment = request
            .comment
            .clone()
            .unwrap_or_else(|| format!("Order: {}", request.order_number));

        let tax_number = request
            .customer
            .tax_number
            .as_deref()
            .map(|t| format!("<adoszam>{}</adoszam>", xml::escape(t)))
            .unwrap_or_default();
        let phone = request
            .customer
            .phone
            .as_deref()
            .map(|p| format!("<telefonszam>{}</telefonszam>", xml::escape(p)))
            .unwrap_or_default();

        let mut items = String::new();
        for item in &request.items {
            items.push_str(&format!(
                r#"
    <tetel>
      <megnevezes>{name}</megnevezes>
      <mennyiseg>{quantity}</mennyiseg>
      <mennyisegiEgyseg>{unit}</mennyisegiEgyseg>
      <nettoEgysegar>{net_unit}</nettoEgysegar>
      <afakulcs>{vat_rate}</afakulcs>
      <netto>{net}</netto>
      <afa>{vat}</afa>
      <brutto>{gross}</brutto>
    </tetel>"#,
                name = xml::escape(&item.name),
                quantity = item.quantity,
                unit = xml::escape(&item.unit),
                net_unit = item.net_unit_price,
                vat_rate = format_vat_rate(item.vat_rate),
                net = item.net_amount,
                vat = item.vat_amount,
                gross = item.gross_amount,
            ));
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xmlszamla xmlns="http://www.szamlazz.hu/xmlszamla" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <beallitasok>
    <szamlaagentkulcs>{api_key}</szamlaagentkulcs>
    <eszamla>true</eszamla>
    <szamlaLetoltes>true</szamlaLetoltes>
    <valaszVerzio>2</valaszVerzio>
  </beallitasok>
  <fejlec>
    <keltDatum>{issue_date}</keltDatum>
    <teljesitesDatum>{fulfillment_date}</teljesitesDatum>
    <fizetesiHataridoDatum>{payment_deadline}</fizetesiHataridoDatum>
    <fizmod>{payment_method}</fizmod>
    <penznem>HUF</penznem>
    <szamlaNyelve>hu</szamlaNyelve>
    <megjegyzes>{comment}</megjegyzes>
    <rendelesSzam>{order_number}</rendelesSzam>
  </fejlec>
  <elado>
    <bank>{bank}</bank>
    <bankszamlaszam>{bank_account}</bankszamlaszam>
  </elado>
  <vevo>
    <nev>{buyer_name}</nev>
    <irsz>{zip}</irsz>
    <telepules>{city}</telepules>
    <cim>{address}</cim>
    <email>{email}</email>
    {tax_number}
    {phone}
    <sendEmail>true</sendEmail>
  </vevo>
  <tetelek>{items}
  </tetelek>
</xmlszamla>"#,
            api_key = xml::escape(&self.config.api_key),
            issue_date = issue_date,
            fulfillment_date = fulfillment_date,
            payment_deadline = payment_deadline,
            payment_method = vendor_payment_method(request.payment_method),
            comment = xml::escape(&comment),
            order_number = xml::escape(&request.order_number),
            bank = xml::escape(&self.config.bank_name),
            bank_account = xml::escape(&self.config.bank_account),
            buyer_name = xml::escape(&request.customer.name),
            zip = xml::escape(&request.customer.zip),
            city = xml::escape(&request.customer.city),
            address = xml::escape(&request.customer.address),
            email = xml::escape(&request.customer.email),
            tax_number = tax_number,
            phone = phone,
            items = items,
        )
    }

    fn build_cancel_xml(&self, invoice_number: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xmlszamlast xmlns="http://www.szamlazz.hu/xmlszamlast">
  <beallitasok>
    <szamlaagentkulcs>{api_key}</szamlaagentkulcs>
    <eszamla>true</eszamla>
  </beallitasok>
  <fejlec>
    <szamlaszam>{invoice_number}</szamlaszam>
  </fejlec>
</xmlszamlast>"#,
            api_key = xml::escape(&self.config.api_key),
            invoice_number = xml::escape(invoice_number),
        )
    }

    fn build_download_xml(&self, invoice_number: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<xmlszamladown xmlns="http://www.szamlazz.hu/xmlszamladown">
  <felhasznalo>{api_key}</felhasznalo>
  <szamlaszam>{invoice_number}</szamlaszam>
</xmlszamladown>"#,
            api_key = xml::escape(&self.config.api_key),
            invoice_number = xml::escape(invoice_number),
        )
    }
}

/// Turn a failure response into the vendor error it describes.
fn vendor_error(response: &str) -> InvoicingError {
    InvoicingError::Vendor {
        code: xml::element_text(response, &["hibakod"]).unwrap_or_else(|| "unknown".to_string()),
        message: xml::element_text(response, &["hibauzenet"])
            .unwrap_or_else(|| "unknown vendor error".to_string()),
    }
}

#[async_trait]
impl InvoicingGateway for InvoicingClient {
    async fn issue_invoice(
        &self,
        request: &InvoiceRequest,
    ) -> Result<IssuedInvoice, InvoicingError> {
        let data = self.build_invoice_xml(request, Utc::now().date_naive());
        let response = self.post_form("xml_invoice", data).await?;
        let body = response
            .text()
            .await
            .map_err(|e| InvoicingError::Transport(e.to_string()))?;

        if !xml::element_is_true(&body, &["sikeres"]) {
            return Err(vendor_error(&body));
        }

        let invoice_number = xml::element_text(&body, &["szamlaszam"])
            .ok_or(InvoicingError::MissingInvoiceNumber)?;

        tracing::info!(invoice_number = %invoice_number, order_number = %request.order_number, "invoice issued");

        Ok(IssuedInvoice {
            invoice_number,
            pdf_url: xml::element_text(&body, &["szamlapdf"]),
        })
    }

    async fn cancel_invoice(&self, invoice_number: &str) -> Result<(), InvoicingError> {
        let data = self.build_cancel_xml(invoice_number);
        let response = self.post_form("xml_invoice_cancel", data).await?;
        let body = response
            .text()
            .await
            .map_err(|e| InvoicingError::Transport(e.to_string()))?;

        if !xml::element_is_true(&body, &["sikeres"]) {
            return Err(vendor_error(&body));
        }

        tracing::info!(invoice_number = %invoice_number, "invoice cancelled");

        Ok(())
    }

    async fn download_invoice(&self, invoice_number: &str) -> Result<Vec<u8>, InvoicingError> {
        let data = self.build_download_xml(invoice_number);
        let response = self.post_form("xml_invoice_download", data).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| InvoicingError::Transport(e.to_string()))?;

        if bytes.is_empty() {
            return Err(InvoicingError::EmptyDocument);
        }

        Ok(bytes.to_vec())
    }
}
