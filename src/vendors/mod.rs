//! Vendor API adapters
//!
//! Two external services: the parcel carrier (label creation, tracking)
//! and the e-invoicing vendor (issue, cancel, download). Each adapter is a
//! trait so handlers stay testable without network access; the HTTP
//! implementations share the tolerant XML helpers in [`xml`].

pub mod carrier;
pub mod invoicing;
pub mod xml;

pub use carrier::{
    CarrierClient, CarrierError, CarrierGateway, ParcelLabel, ParcelRequest, ParcelStatus,
};
pub use invoicing::{
    InvoiceCustomer, InvoiceLineItem, InvoiceRequest, InvoicingClient, InvoicingError,
    InvoicingGateway, IssuedInvoice,
};
