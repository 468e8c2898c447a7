//! HTTP route modules for the checkout service.
//!
//! - `payments`: run a checkout
//! - `orders`: inspect the orders a checkout created

pub mod orders;
pub mod payments;
