//! Request validation: decode the raw body into a well-formed `PaymentRequest`.

use lettre::Address;
use tracing::debug;

use crate::error::{CheckoutError, CheckoutResult};
use crate::models::PaymentRequest;

/// Decode and structurally validate a checkout request body.
///
/// Fails with `InvalidRequestBody` when the body does not decode, when there
/// are no order lines, or when any line lacks a concert id or either ticket
/// count, or when the buyer's email is missing or is not a deliverable
/// address. A concert id of the wrong JSON type fails decoding.
pub fn parse_request_body(body: &[u8]) -> CheckoutResult<PaymentRequest> {
    let mut request: PaymentRequest = serde_json::from_slice(body)
        .map_err(|e| CheckoutError::InvalidRequestBody(e.to_string()))?;

    if request.order_lines.is_empty() {
        return Err(CheckoutError::InvalidRequestBody("No orders made".to_string()));
    }

    for (index, line) in request.order_lines.iter().enumerate() {
        if line.num_of_full_price.is_none()
            || line.num_of_concessions.is_none()
            || line.concert_id.trim().is_empty()
        {
            return Err(CheckoutError::InvalidRequestBody(format!(
                "order line {} is missing required information",
                index
            )));
        }
    }

    request.email = request.email.trim().to_string();
    if request.email.parse::<Address>().is_err() {
        return Err(CheckoutError::InvalidRequestBody(format!(
            "email '{}' is not a valid address",
            request.email
        )));
    }

    debug!(
        "Parsed payment request with {} order lines",
        request.order_lines.len()
    );
    Ok(request)
}
