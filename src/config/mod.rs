//! Configuration loading and management
//!
//! Configuration comes from two layers: an optional YAML file for the
//! non-secret parts (bind address, sender address block, vendor URLs) and
//! environment variables, which always win and are the only way to supply
//! credentials. `AppConfig::from_env()` alone is enough for production;
//! the YAML file exists for local overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Carrier (parcel shipping) API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    pub api_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub client_number: String,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.mygls.hu/ParcelService.svc".to_string(),
            username: String::new(),
            password: String::new(),
            client_number: String::new(),
        }
    }
}

/// E-invoicing vendor API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoicingConfig {
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub bank_account: String,
}

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://www.szamlazz.hu/szamla/".to_string(),
            api_key: String::new(),
            bank_name: "OTP Bank".to_string(),
            bank_account: String::new(),
        }
    }
}

/// The sender address block printed on every parcel label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    pub name: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            name: "DTF Nyomda Kft.".to_string(),
            address: "Fő utca 1.".to_string(),
            city: "Budapest".to_string(),
            zip_code: "1111".to_string(),
            contact_name: "Kapcsolattartó".to_string(),
            phone: "+36301234567".to_string(),
            email: "info@dtfnyomda.hu".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bind address for the HTTP server
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Timeout applied to every outbound vendor call, in seconds
    #[serde(default = "default_vendor_timeout_secs")]
    pub vendor_timeout_secs: u64,

    /// Default parcel weight in kg when an order has no explicit weight
    #[serde(default = "default_parcel_weight_kg")]
    pub parcel_weight_kg: u32,

    /// Shared secret required in `X-Webhook-Token` on the carrier webhook.
    /// When unset the webhook accepts unauthenticated calls.
    #[serde(default)]
    pub webhook_token: Option<String>,

    /// Include internal error details in responses
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub carrier: CarrierConfig,

    #[serde(default)]
    pub invoicing: InvoicingConfig,

    #[serde(default)]
    pub sender: SenderConfig,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_vendor_timeout_secs() -> u64 {
    30
}

fn default_parcel_weight_kg() -> u32 {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            vendor_timeout_secs: default_vendor_timeout_secs(),
            parcel_weight_kg: default_parcel_weight_kg(),
            webhook_token: None,
            debug: false,
            carrier: CarrierConfig::default(),
            invoicing: InvoicingConfig::default(),
            sender: SenderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file '{}'", path))?;
        config.apply_env();
        Ok(config)
    }

    /// Build configuration from defaults plus environment variables only.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Timeout for outbound vendor HTTP calls
    pub fn vendor_timeout(&self) -> Duration {
        Duration::from_secs(self.vendor_timeout_secs)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = env::var("DTF_LISTEN_ADDR") {
            self.listen_addr = v;
        }
        if let Ok(v) = env::var("DTF_VENDOR_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                self.vendor_timeout_secs = secs;
            }
        }
        if let Ok(v) = env::var("DTF_WEBHOOK_TOKEN") {
            if !v.is_empty() {
                self.webhook_token = Some(v);
            }
        }
        if let Ok(v) = env::var("DTF_DEBUG") {
            self.debug = v == "1" || v.eq_ignore_ascii_case("true");
        }

        if let Ok(v) = env::var("GLS_API_URL") {
            self.carrier.api_url = v;
        }
        if let Ok(v) = env::var("GLS_USERNAME") {
            self.carrier.username = v;
        }
        if let Ok(v) = env::var("GLS_PASSWORD") {
            self.carrier.password = v;
        }
        if let Ok(v) = env::var("GLS_CLIENT_NUMBER") {
            self.carrier.client_number = v;
        }

        if let Ok(v) = env::var("SZAMLAZZ_API_URL") {
            self.invoicing.api_url = v;
        }
        if let Ok(v) = env::var("SZAMLAZZ_API_KEY") {
            self.invoicing.api_key = v;
        }
        if let Ok(v) = env::var("SZAMLAZZ_BANK_NAME") {
            self.invoicing.bank_name = v;
        }
        if let Ok(v) = env::var("SZAMLAZZ_BANK_ACCOUNT") {
            self.invoicing.bank_account = v;
        }

        if let Ok(v) = env::var("SENDER_NAME") {
            self.sender.name = v;
        }
        if let Ok(v) = env::var("SENDER_ADDRESS") {
            self.sender.address = v;
        }
        if let Ok(v) = env::var("SENDER_CITY") {
            self.sender.city = v;
        }
        if let Ok(v) = env::var("SENDER_ZIPCODE") {
            self.sender.zip_code = v;
        }
        if let Ok(v) = env::var("SENDER_CONTACT_NAME") {
            self.sender.contact_name = v;
        }
        if let Ok(v) = env::var("SENDER_PHONE") {
            self.sender.phone = v;
        }
        if let Ok(v) = env::var("SENDER_EMAIL") {
            self.sender.email = v;
        }
    }

    /// Warn about credentials that are missing; the server still starts so
    /// the CRUD surface works without vendor access.
    pub fn warn_on_missing_credentials(&self) {
        if self.carrier.username.is_empty()
            || self.carrier.password.is_empty()
            || self.carrier.client_number.is_empty()
        {
            tracing::warn!("carrier API credentials are not configured; label creation will fail");
        }
        if self.invoicing.api_key.is_empty() {
            tracing::warn!("invoicing API key is not configured; invoice issuance will fail");
        }
    }
}
