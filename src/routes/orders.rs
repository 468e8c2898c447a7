//! Order lookup routes.
//!
//! GET /orders/{reference} - Every order line of a checkout, with its status.
//! Buyer names, email and additional fields are never returned.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use tracing::error;

use crate::handlers::CheckoutContext;
use crate::models::{ApiResponse, OrderSummary};

/// Build the orders router.
pub fn router() -> Router {
    Router::new().route("/orders/{reference}", get(get_orders))
}

/// Retrieve the order lines sharing a reference.
async fn get_orders(
    Extension(ctx): Extension<CheckoutContext>,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<Vec<OrderSummary>>>, StatusCode> {
    let orders = ctx
        .inventory
        .orders_by_reference(&reference)
        .await
        .map_err(|e| {
            error!("Failed to query orders for {}: {}", reference, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    if orders.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    Ok(Json(ApiResponse {
        message: format!("{} order lines retrieved", orders.len()),
        data: orders.iter().map(OrderSummary::from).collect(),
    }))
}
