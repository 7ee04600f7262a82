//! Price list versioning and the pricing calculator
//!
//! The calculator is a pure function: the same inputs and price list always
//! produce the same breakdown. Each component is rounded to whole currency
//! units at its own field, and the totals are sums of the rounded
//! components, so persisted orders always re-add exactly for auditing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::order::{PaymentMethod, ShippingMethod};
use super::FILM_WIDTH_MM;

/// A versioned row of pricing parameters. Rows are append-only; the row in
/// effect is the most recent one with `valid_from <= now`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceList {
    pub id: Uuid,
    /// Net price of one square meter of film
    pub price_per_sqm: i64,
    /// VAT rate in percent
    pub vat_rate: f64,
    /// Net surcharge when the order ships via the carrier
    pub carrier_surcharge: i64,
    /// Net surcharge when the order is paid cash-on-delivery
    pub cod_surcharge: i64,
    pub valid_from: DateTime<Utc>,
}

impl PriceList {
    /// The defaults the store is seeded with when empty.
    pub fn seed() -> Self {
        Self {
            id: Uuid::new_v4(),
            price_per_sqm: 6800,
            vat_rate: 27.0,
            carrier_surcharge: 1490,
            cod_surcharge: 600,
            valid_from: Utc::now(),
        }
    }
}

/// Request body for appending a price list row
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceListInput {
    pub price_per_sqm: i64,
    pub vat_rate: f64,
    pub carrier_surcharge: i64,
    pub cod_surcharge: i64,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
}

impl PriceListInput {
    pub fn into_price_list(self) -> PriceList {
        PriceList {
            id: Uuid::new_v4(),
            price_per_sqm: self.price_per_sqm,
            vat_rate: self.vat_rate,
            carrier_surcharge: self.carrier_surcharge,
            cod_surcharge: self.cod_surcharge,
            valid_from: self.valid_from.unwrap_or_else(Utc::now),
        }
    }
}

/// Itemized price breakdown, all money fields in whole currency units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub square_meters: f64,
    /// VAT rate in percent, frozen from the price list row
    pub vat_rate: f64,
    pub product_net: i64,
    pub product_vat: i64,
    pub shipping_net: i64,
    pub shipping_vat: i64,
    pub cod_net: i64,
    pub cod_vat: i64,
    pub total_net: i64,
    pub total_vat: i64,
    pub total_gross: i64,
}

fn round_money(value: f64) -> i64 {
    value.round() as i64
}

/// Compute the itemized price for a print job.
///
/// The film width is fixed at 300 mm; `length_mm` is the variable
/// dimension. The rounded square meter value (2 decimals) feeds the
/// product price so the breakdown can be re-derived from persisted fields.
pub fn calculate_price(
    length_mm: i64,
    shipping_method: ShippingMethod,
    payment_method: PaymentMethod,
    price_list: &PriceList,
) -> PriceBreakdown {
    let vat_factor = price_list.vat_rate / 100.0;

    let square_meters =
        ((FILM_WIDTH_MM * length_mm) as f64 / 1_000_000.0 * 100.0).round() / 100.0;

    let product_net = round_money(square_meters * price_list.price_per_sqm as f64);
    let product_vat = round_money(product_net as f64 * vat_factor);

    let (shipping_net, shipping_vat) = match shipping_method {
        ShippingMethod::Carrier => {
            let net = price_list.carrier_surcharge;
            (net, round_money(net as f64 * vat_factor))
        }
        ShippingMethod::Pickup => (0, 0),
    };

    let (cod_net, cod_vat) = match payment_method {
        PaymentMethod::CashOnDelivery => {
            let net = price_list.cod_surcharge;
            (net, round_money(net as f64 * vat_factor))
        }
        _ => (0, 0),
    };

    let total_net = product_net + shipping_net + cod_net;
    let total_vat = product_vat + shipping_vat + cod_vat;

    PriceBreakdown {
        square_meters,
        vat_rate: price_list.vat_rate,
        product_net,
        product_vat,
        shipping_net,
        shipping_vat,
        cod_net,
        cod_vat,
        total_net,
        total_vat,
        total_gross: total_net + total_vat,
    }
}
