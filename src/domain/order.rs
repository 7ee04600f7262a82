//! Order entity and its status vocabularies
//!
//! An order freezes its price breakdown at creation time and then tracks
//! three independent statuses. Shipping and invoice metadata are written
//! only by the vendor adapters; the generic update path deliberately has
//! no access to them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pricing::PriceBreakdown;
use super::FILM_WIDTH_MM;

/// Production status, a linear progression the UI may skip steps of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    InProduction,
    Ready,
    Shipped,
    Closed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProduction => "in_production",
            OrderStatus::Ready => "ready",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Closed => "closed",
        }
    }
}

/// Payment status, free transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PartiallyPaid,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::PartiallyPaid => "partially_paid",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// Invoice status. `Issued` is only ever set by the invoicing adapter,
/// `Cancelled` only from `Issued`, and `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    None,
    Issued,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Pickup,
    Carrier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Prepaid,
    PickupPayment,
    CashOnDelivery,
    BankTransfer,
    MonthlyBilling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,

    pub width_mm: i64,
    pub length_mm: i64,
    pub square_meters: f64,
    /// VAT rate in percent, frozen with the price snapshot
    pub vat_rate: f64,

    // Price snapshot, frozen at creation
    pub product_net: i64,
    pub product_vat: i64,
    pub shipping_net: i64,
    pub shipping_vat: i64,
    pub cod_net: i64,
    pub cod_vat: i64,
    pub total_net: i64,
    pub total_vat: i64,
    pub total_gross: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub shipping_method: ShippingMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,

    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub invoice_status: InvoiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,

    // Carrier metadata, written only by the shipping adapter and webhook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcel_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// True when a shipping label exists; the label is never replaced.
    pub fn has_label(&self) -> bool {
        self.parcel_number.is_some()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Request body for creating an order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub customer_id: Uuid,
    pub length_mm: i64,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

/// A fully priced order, ready for the store to number and persist.
///
/// The order number is assigned inside the store's create operation so two
/// concurrent creations can never observe the same sequence maximum.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub input: OrderInput,
    pub prices: PriceBreakdown,
}

impl NewOrder {
    /// Materialize the order once the store has reserved `order_number`.
    pub fn into_order(self, order_number: String) -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            order_number,
            customer_id: self.input.customer_id,
            width_mm: FILM_WIDTH_MM,
            length_mm: self.input.length_mm,
            square_meters: self.prices.square_meters,
            vat_rate: self.prices.vat_rate,
            product_net: self.prices.product_net,
            product_vat: self.prices.product_vat,
            shipping_net: self.prices.shipping_net,
            shipping_vat: self.prices.shipping_vat,
            cod_net: self.prices.cod_net,
            cod_vat: self.prices.cod_vat,
            total_net: self.prices.total_net,
            total_vat: self.prices.total_vat,
            total_gross: self.prices.total_gross,
            description: self.input.description,
            shipping_method: self.input.shipping_method,
            shipping_address: self.input.shipping_address,
            payment_method: self.input.payment_method,
            payment_date: self.input.payment_date,
            order_status: OrderStatus::New,
            payment_status: PaymentStatus::Unpaid,
            invoice_status: InvoiceStatus::None,
            invoice_number: None,
            parcel_number: None,
            label_url: None,
            tracking_url: None,
            carrier_status: None,
            deadline: self.input.deadline,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for the generic order update endpoint.
///
/// Invoice and shipping metadata are intentionally absent: those fields
/// belong to the vendor adapters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    #[serde(default)]
    pub order_status: Option<OrderStatus>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

impl Order {
    pub fn apply_update(&mut self, update: OrderUpdate) {
        if let Some(status) = update.order_status {
            self.order_status = status;
        }
        if let Some(status) = update.payment_status {
            self.payment_status = status;
        }
        if let Some(date) = update.payment_date {
            self.payment_date = Some(date);
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(deadline) = update.deadline {
            self.deadline = Some(deadline);
        }
        self.touch();
    }
}
