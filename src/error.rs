//! Checkout error kinds and their HTTP mapping.
//!
//! Every stage of the checkout aborts on its first error. The caller only ever
//! sees a status code and a short message; detail for persistence, fulfilment
//! and configuration failures is logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::config::ConfigError;
use crate::models::ErrorResponse;

const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
const INVALID_REQUEST: &str = "Invalid request";
const PAYMENT_FAILED: &str = "Payment Failed. Please try again later";

/// Result alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// The closed set of ways a checkout can fail.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// The request body is malformed or missing required fields.
    #[error("{0}")]
    InvalidRequestBody(String),

    /// A line asks for more tickets than the concert has left.
    #[error("{0}")]
    InsufficientAvailableTickets(String),

    /// The inventory could not provide the concert (missing, in the past, or unreachable).
    #[error("{0}")]
    ConcertLookupFailed(String),

    /// An order record could not be written.
    #[error("order persistence failed: {0}")]
    OrderPersistenceFailed(String),

    /// The payment processor declined or errored.
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    /// Inventory update or ticket delivery failed after the charge.
    #[error("fulfilment failed: {0}")]
    FulfillmentFailed(String),

    /// Required configuration is missing, unparsable or names a missing table.
    ///
    /// Configuration is loaded and checked before the server binds, so this
    /// kind is only produced during startup; no request ever receives it.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl CheckoutError {
    /// Status code the caller receives for this kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientAvailableTickets(_) => StatusCode::FORBIDDEN,
            Self::ConcertLookupFailed(_) => StatusCode::BAD_REQUEST,
            Self::OrderPersistenceFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentFailed(_) => StatusCode::BAD_REQUEST,
            Self::FulfillmentFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message the caller receives for this kind.
    ///
    /// Lookup and availability messages are surfaced unchanged; everything
    /// else is replaced by a fixed message.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidRequestBody(_) => INVALID_REQUEST.to_string(),
            Self::InsufficientAvailableTickets(message) => message.clone(),
            Self::ConcertLookupFailed(message) => message.clone(),
            Self::PaymentFailed(_) => PAYMENT_FAILED.to_string(),
            Self::OrderPersistenceFailed(_)
            | Self::FulfillmentFailed(_)
            | Self::Configuration(_) => INTERNAL_SERVER_ERROR.to_string(),
        }
    }
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!(status = status.as_u16(), "Checkout failed: {}", self);

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
