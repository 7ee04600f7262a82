//! Shipping carrier integration (parcel labels and tracking)
//!
//! The adapter translates orders into the carrier's SOAP-wrapped XML
//! requests and parses its responses into structured results. It never
//! lets a transport error escape raw: every operation returns a tagged
//! [`CarrierError`] the handlers translate into HTTP responses.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::time::Duration;
use thiserror::Error;

use crate::config::{CarrierConfig, SenderConfig};

use super::xml;

/// Host serving the public tracking page. The URL is shown to end users
/// and must be reproduced byte-for-byte.
const TRACKING_URL_BASE: &str = "https://online.gls-hungary.com/tt_page.php?tt_value=";

/// Label sheet layout requested from the carrier: four labels per A4 page.
const PRINTER_TEMPLATE: &str = "A4_2x2";

/// Content description printed on every label.
const PARCEL_CONTENT: &str = "DTF Film";

/// Public tracking page for a parcel.
pub fn tracking_url(parcel_number: &str) -> String {
    format!("{}{}", TRACKING_URL_BASE, parcel_number)
}

/// Fixed phrase table for the carrier's numeric status codes (1-10).
/// Unknown codes fall through to the raw code.
pub fn status_phrase(code: &str) -> Option<&'static str> {
    match code {
        "1" => Some("Parcel registered"),
        "2" => Some("Picked up"),
        "3" => Some("At depot"),
        "4" => Some("En route"),
        "5" => Some("Out for delivery"),
        "6" => Some("Delivered"),
        "7" => Some("Delivery failed"),
        "8" => Some("Returned to sender"),
        "9" => Some("Destroyed"),
        "10" => Some("Stored"),
        _ => None,
    }
}

/// Status code signalling successful delivery.
pub const DELIVERED_CODE: &str = "6";

/// Whether a webhook payload means the parcel was delivered: either the
/// numeric code, or a status text containing the delivered phrase.
pub fn is_delivered(status_code: Option<&str>, status: &str) -> bool {
    status_code == Some(DELIVERED_CODE) || status.to_lowercase().contains("delivered")
}

/// Everything the carrier needs to print one label
#[derive(Debug, Clone)]
pub struct ParcelRequest {
    pub name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub phone: String,
    pub email: Option<String>,
    /// Order number, echoed back as the client reference
    pub reference: String,
    /// Parcel weight in kilograms
    pub weight_kg: u32,
    /// Cash-on-delivery amount; `None` for prepaid orders
    pub cod_amount: Option<i64>,
    /// Number of packages
    pub count: u32,
}

/// Result of a successful label creation
#[derive(Debug, Clone)]
pub struct ParcelLabel {
    pub parcel_number: String,
    /// `data:application/pdf;base64,...` URL wrapping the label PDF
    pub label_url: String,
    pub tracking_url: String,
}

/// Result of a tracking query
#[derive(Debug, Clone)]
pub struct ParcelStatus {
    pub status_code: Option<String>,
    /// Raw status string from the vendor
    pub status: String,
    /// Human-readable phrase from the code table
    pub status_text: String,
    pub location: Option<String>,
    pub timestamp: Option<String>,
}

#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("carrier API returned HTTP {0}")]
    Http(u16),

    #[error("carrier request failed: {0}")]
    Transport(String),

    #[error("carrier did not return a parcel number")]
    MissingParcelNumber,

    #[error("carrier did not return a label document")]
    MissingLabel,
}

/// Seam between handlers and the carrier HTTP client; tests plug in mocks.
#[async_trait]
pub trait CarrierGateway: Send + Sync {
    /// Create a parcel and print its label.
    async fn create_parcel(&self, request: &ParcelRequest) -> Result<ParcelLabel, CarrierError>;

    /// Re-download the label PDF for an already created parcel.
    async fn parcel_label(&self, parcel_number: &str) -> Result<Vec<u8>, CarrierError>;

    /// Query the current status of a parcel.
    async fn track_parcel(&self, parcel_number: &str) -> Result<ParcelStatus, CarrierError>;
}

/// HTTP implementation of [`CarrierGateway`]
pub struct CarrierClient {
    http: reqwest::Client,
    config: CarrierConfig,
    sender: SenderConfig,
}

impl CarrierClient {
    pub fn new(
        config: CarrierConfig,
        sender: SenderConfig,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            config,
            sender,
        })
    }

    async fn post_xml(&self, operation: &str, body: String) -> Result<String, CarrierError> {
        let url = format!("{}/{}", self.config.api_url.trim_end_matches('/'), operation);
        let soap_action = format!("http://api.mygls.hu/ParcelService/{}", operation);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", soap_action)
            .body(body)
            .send()
            .await
            .map_err(|e| CarrierError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), operation, "carrier API error");
            return Err(CarrierError::Http(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| CarrierError::Transport(e.to_string()))
    }

    fn build_print_labels_xml(&self, request: &ParcelRequest) -> String {
        let cod_amount = request.cod_amount.unwrap_or(0);
        let cod_reference = if request.cod_amount.is_some() {
            xml::escape(&request.reference)
        } else {
            String::new()
        };
        let email = request.email.as_deref().map(xml::escape).unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <PrintLabelsRequest>
      <Username>{username}</Username>
      <Password>{password}</Password>
      <ParcelList>
        <ParcelData>
          <ClientNumber>{client_number}</ClientNumber>
          <ClientReference>{reference}</ClientReference>
          <CODAmount>{cod_amount}</CODAmount>
          <CODReference>{cod_reference}</CODReference>
          <Content>{content}</Content>
          <Count>{count}</Count>
          <DeliveryName>{name}</DeliveryName>
          <DeliveryAddress>{address}</DeliveryAddress>
          <DeliveryCity>{city}</DeliveryCity>
          <DeliveryZipCode>{zip}</DeliveryZipCode>
          <DeliveryContactName>{name}</DeliveryContactName>
          <DeliveryContactPhone>{phone}</DeliveryContactPhone>
          <DeliveryContactEmail>{email}</DeliveryContactEmail>
          <PickupName>{sender_name}</PickupName>
          <PickupAddress>{sender_address}</PickupAddress>
          <PickupCity>{sender_city}</PickupCity>
          <PickupZipCode>{sender_zip}</PickupZipCode>
          <PickupContactName>{sender_contact}</PickupContactName>
          <PickupContactPhone>{sender_phone}</PickupContactPhone>
          <PickupContactEmail>{sender_email}</PickupContactEmail>
          <Weight>{weight}</Weight>
        </ParcelData>
      </ParcelList>
      <PrinterTemplate>{template}</PrinterTemplate>
    </PrintLabelsRequest>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
            username = xml::escape(&self.config.username),
            password = xml::escape(&self.config.password),
            client_number = xml::escape(&self.config.client_number),
            reference = xml::escape(&request.reference),
            cod_amount = cod_amount,
            cod_reference = cod_reference,
            content = PARCEL_CONTENT,
            count = request.count,
            name = xml::escape(&request.name),
            address = xml::escape(&request.address),
            city = xml::escape(&request.city),
            zip = xml::escape(&request.zip_code),
            phone = xml::escape(&request.phone),
            email = email,
            sender_name = xml::escape(&self.sender.name),
            sender_address = xml::escape(&self.sender.address),
            sender_city = xml::escape(&self.sender.city),
            sender_zip = xml::escape(&self.sender.zip_code),
            sender_contact = xml::escape(&self.sender.contact_name),
            sender_phone = xml::escape(&self.sender.phone),
            sender_email = xml::escape(&self.sender.email),
            weight = request.weight_kg,
            template = PRINTER_TEMPLATE,
        )
    }

    fn build_printed_labels_xml(&self, parcel_number: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <GetPrintedLabelsRequest>
      <Username>{username}</Username>
      <Password>{password}</Password>
      <ParcelIdList>
        <ParcelId>{parcel_number}</ParcelId>
      </ParcelIdList>
      <PrinterTemplate>{template}</PrinterTemplate>
    </GetPrintedLabelsRequest>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
            username = xml::escape(&self.config.username),
            password = xml::escape(&self.config.password),
            parcel_number = xml::escape(parcel_number),
            template = PRINTER_TEMPLATE,
        )
    }

    fn build_track_xml(&self, parcel_number: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/">
  <SOAP-ENV:Body>
    <GetParcelStatusesRequest>
      <Username>{username}</Username>
      <Password>{password}</Password>
      <ParcelNumberList>
        <ParcelNumber>{parcel_number}</ParcelNumber>
      </ParcelNumberList>
    </GetParcelStatusesRequest>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#,
            username = xml::escape(&self.config.username),
            password = xml::escape(&self.config.password),
            parcel_number = xml::escape(parcel_number),
        )
    }
}

/// Pull the base64 label payload out of a response. Historically seen as
/// `Labels` or `PrintData`, bare or namespaced.
fn extract_label_base64(response: &str) -> Option<String> {
    xml::element_text(response, &["Labels", "PrintData"])
}

#[async_trait]
impl CarrierGateway for CarrierClient {
    async fn create_parcel(&self, request: &ParcelRequest) -> Result<ParcelLabel, CarrierError> {
        let body = self.build_print_labels_xml(request);
        let response = self.post_xml("PrintLabels", body).await?;

        let parcel_number = xml::element_text(&response, &["ParcelNumber", "ParcelId"])
            .ok_or(CarrierError::MissingParcelNumber)?;

        let label_url = extract_label_base64(&response)
            .map(|b64| format!("data:application/pdf;base64,{}", b64))
            .unwrap_or_default();

        tracing::info!(parcel_number = %parcel_number, reference = %request.reference, "parcel created");

        Ok(ParcelLabel {
            tracking_url: tracking_url(&parcel_number),
            parcel_number,
            label_url,
        })
    }

    async fn parcel_label(&self, parcel_number: &str) -> Result<Vec<u8>, CarrierError> {
        let body = self.build_printed_labels_xml(parcel_number);
        let response = self.post_xml("GetPrintedLabels", body).await?;

        let b64 = extract_label_base64(&response).ok_or(CarrierError::MissingLabel)?;
        BASE64
            .decode(b64.as_bytes())
            .map_err(|_| CarrierError::MissingLabel)
    }

    async fn track_parcel(&self, parcel_number: &str) -> Result<ParcelStatus, CarrierError> {
        let body = self.build_track_xml(parcel_number);
        let response = self.post_xml("GetParcelStatuses", body).await?;

        let status_code = xml::element_text(&response, &["StatusCode"]);
        let status = xml::element_text(&response, &["StatusInfo", "Status"])
            .unwrap_or_else(|| "Unknown".to_string());
        let status_text = status_code
            .as_deref()
            .and_then(status_phrase)
            .map(str::to_string)
            .unwrap_or_else(|| status_code.clone().unwrap_or_else(|| status.clone()));

        Ok(ParcelStatus {
            status_code,
            status,
            status_text,
            location: xml::element_text(&response, &["DepotCity"]),
            timestamp: xml::element_text(&response, &["EventDate", "StatusDate"]),
        })
    }
}
