//! # Concert Checkout
//!
//! Request-triggered checkout for concert tickets: validates a buyer's order,
//! checks availability, computes the balance, persists orders, charges the
//! payment processor, decrements inventory and emails tickets.
//!
//! Exposes the Axum router so integration tests can create an in-process
//! server with in-memory collaborators.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod mocks;
pub mod models;
pub mod notification;
pub mod payment;
pub mod routes;

use axum::http::{header, HeaderValue, Method};
use axum::{Extension, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::CheckoutContext;

/// Build the Axum router with all route modules and middleware.
///
/// CORS preflights for JSON posts are answered for `allowed_origin` (`*` allows
/// any origin), and every response, errors included, carries
/// `Access-Control-Allow-Origin: allowed_origin`. This function does NOT start
/// a server.
pub fn create_app(ctx: CheckoutContext, allowed_origin: HeaderValue) -> Router {
    let origin = if allowed_origin.as_bytes() == b"*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::exact(allowed_origin.clone())
    };
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(routes::payments::router())
        .merge(routes::orders::router())
        .layer(Extension(ctx))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            allowed_origin,
        ))
}
