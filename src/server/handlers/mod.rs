//! HTTP handlers, grouped by resource

pub mod customers;
pub mod invoices;
pub mod orders;
pub mod pricing;
pub mod shipping;
pub mod stats;

use crate::core::AppError;
use validator::Validate;

/// Run `validator` checks on a request body and convert the first failure
/// into the API's 400 shape.
pub(crate) fn validate_body(input: &impl Validate) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        let message = errors.to_string().replace('\n', "; ");
        AppError::validation("body", message)
    })
}
