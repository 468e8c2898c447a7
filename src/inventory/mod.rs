//! Inventory store: concerts, orders and order references.
//!
//! The checkout reads concerts, writes one order per line and decrements
//! remaining capacity through this trait. It offers no transaction spanning
//! those calls; `update_sold_count` is the only guarded write and it refuses
//! to take capacity below zero.

pub mod postgres;

pub use postgres::PgInventoryStore;

use async_trait::async_trait;

use crate::models::{Concert, Order, OrderStatus};

/// Errors raised by an inventory store.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Concert {concert_id} not found")]
    ConcertNotFound { concert_id: String },

    #[error("Error concert {title} in the past, tickets are no longer available")]
    ConcertInPast { title: String },

    #[error("Concert {concert_id} has fewer than {requested} tickets remaining")]
    InsufficientCapacity { concert_id: String, requested: u32 },

    #[error("Order {order_reference}/{line_number} cannot move to {status}")]
    InvalidStatusTransition {
        order_reference: String,
        line_number: u32,
        status: OrderStatus,
    },

    #[error("Unable to generate a unique order reference after {attempts} attempts")]
    ReferenceExhausted { attempts: usize },

    #[error("Inventory store error: {0}")]
    Storage(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence and capacity operations the checkout depends on.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Fetch a concert that can still be sold.
    ///
    /// Fails with `ConcertNotFound` or `ConcertInPast` as well as on storage errors.
    async fn fetch_concert(&self, concert_id: &str) -> Result<Concert, InventoryError>;

    /// Persist a new order line.
    async fn create_order(&self, order: &Order) -> Result<(), InventoryError>;

    /// Record `delta` more tickets as sold, failing with `InsufficientCapacity`
    /// instead of going below zero.
    async fn update_sold_count(&self, concert_id: &str, delta: u32) -> Result<(), InventoryError>;

    /// Move a pending order line to a terminal status.
    async fn update_order_status(
        &self,
        order_reference: &str,
        line_number: u32,
        status: OrderStatus,
    ) -> Result<(), InventoryError>;

    /// All order lines sharing a reference, in line order.
    async fn orders_by_reference(&self, order_reference: &str) -> Result<Vec<Order>, InventoryError>;

    /// A short reference not yet used by any order.
    async fn generate_reference(&self, length: usize) -> Result<String, InventoryError>;
}

/// Uppercase hex reference candidate of `length` characters.
pub fn reference_candidate(length: usize) -> String {
    let mut candidate = String::with_capacity(length);
    while candidate.len() < length {
        candidate.push_str(&uuid::Uuid::new_v4().simple().to_string().to_uppercase());
    }
    candidate.truncate(length);
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_candidate_length_and_charset() {
        for length in [1, 4, 32, 40] {
            let reference = reference_candidate(length);
            assert_eq!(reference.len(), length);
            assert!(reference
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_in_past_message_names_concert() {
        let err = InventoryError::ConcertInPast {
            title: "Winter Gala".into(),
        };
        assert_eq!(
            err.to_string(),
            "Error concert Winter Gala in the past, tickets are no longer available"
        );
    }
}
