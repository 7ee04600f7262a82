//! Customer entity
//!
//! A customer carries a mandatory billing address block and an optional
//! shipping block. The shipping fields travel together: the UI either
//! copies billing or fills all of them, so the persisted layer treats them
//! as independent optionals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,

    pub billing_name: String,
    pub billing_zip: String,
    pub billing_city: String,
    pub billing_address: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_zip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(input: CustomerInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            billing_name: input.billing_name,
            billing_zip: input.billing_zip,
            billing_city: input.billing_city,
            billing_address: input.billing_address,
            company_name: input.company_name,
            tax_number: input.tax_number,
            shipping_name: input.shipping_name,
            shipping_zip: input.shipping_zip,
            shipping_city: input.shipping_city,
            shipping_address: input.shipping_address,
            note: input.note,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a full update, keeping id and created_at.
    pub fn apply(&mut self, input: CustomerInput) {
        self.name = input.name;
        self.email = input.email;
        self.phone = input.phone;
        self.billing_name = input.billing_name;
        self.billing_zip = input.billing_zip;
        self.billing_city = input.billing_city;
        self.billing_address = input.billing_address;
        self.company_name = input.company_name;
        self.tax_number = input.tax_number;
        self.shipping_name = input.shipping_name;
        self.shipping_zip = input.shipping_zip;
        self.shipping_city = input.shipping_city;
        self.shipping_address = input.shipping_address;
        self.note = input.note;
        self.updated_at = Utc::now();
    }

    /// Name used on invoices and dashboards: company name when present.
    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or(&self.billing_name)
    }
}

/// Request body for creating or fully updating a customer
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub phone: String,

    #[validate(length(min = 1, message = "must not be empty"))]
    pub billing_name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub billing_zip: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub billing_city: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub billing_address: String,

    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,

    #[serde(default)]
    pub shipping_name: Option<String>,
    #[serde(default)]
    pub shipping_zip: Option<String>,
    #[serde(default)]
    pub shipping_city: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,

    #[serde(default)]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> CustomerInput {
        CustomerInput {
            name: "Teszt Ügyfél Kft.".to_string(),
            email: "info@teszt.hu".to_string(),
            phone: "+36 30 123 4567".to_string(),
            billing_name: "Teszt Ügyfél Kft.".to_string(),
            billing_zip: "1234".to_string(),
            billing_city: "Budapest".to_string(),
            billing_address: "Teszt utca 1.".to_string(),
            company_name: None,
            tax_number: Some("12345678-1-23".to_string()),
            shipping_name: None,
            shipping_zip: None,
            shipping_city: None,
            shipping_address: None,
            note: None,
        }
    }

    #[test]
    fn new_customer_gets_id_and_timestamps() {
        let customer = Customer::new(input());
        assert!(!customer.id.is_nil());
        assert_eq!(customer.created_at, customer.updated_at);
    }

    #[test]
    fn display_name_prefers_company() {
        let mut customer = Customer::new(input());
        assert_eq!(customer.display_name(), "Teszt Ügyfél Kft.");
        customer.company_name = Some("Céges Név Zrt.".to_string());
        assert_eq!(customer.display_name(), "Céges Név Zrt.");
    }

    #[test]
    fn input_validation_rejects_empty_billing() {
        let mut bad = input();
        bad.billing_zip = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn input_validation_rejects_bad_email() {
        let mut bad = input();
        bad.email = "not-an-email".to_string();
        assert!(bad.validate().is_err());
    }
}
