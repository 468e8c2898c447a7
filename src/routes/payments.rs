//! Checkout routes.
//!
//! POST /payments - Validate, price, persist, charge and fulfil a checkout

use axum::body::Bytes;
use axum::routing::post;
use axum::{Extension, Json, Router};
use tracing::info;

use crate::error::CheckoutError;
use crate::handlers::{self, CheckoutContext};
use crate::models::PaymentResponse;

/// Build the payments router.
pub fn router() -> Router {
    Router::new().route("/payments", post(process_payment))
}

/// Run a checkout for the raw request body.
///
/// The body is handed to the validator undecoded so that every decoding
/// failure is reported as an invalid request rather than an extractor
/// rejection.
async fn process_payment(
    Extension(ctx): Extension<CheckoutContext>,
    body: Bytes,
) -> Result<Json<PaymentResponse>, CheckoutError> {
    info!("Received payment request ({} bytes)", body.len());
    let response = handlers::process_payment(&ctx, &body).await?;
    Ok(Json(response))
}
