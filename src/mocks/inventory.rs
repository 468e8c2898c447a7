//! In-memory inventory store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::inventory::{reference_candidate, InventoryError, InventoryStore};
use crate::models::{Concert, Order, OrderStatus};

#[derive(Debug, Default)]
struct Inner {
    concerts: HashMap<String, Concert>,
    orders: Vec<Order>,
    order_creation_budget: Option<usize>,
    failing_sold_count: Option<String>,
}

/// Inventory store held in memory.
///
/// Cloning shares the underlying state, so a test can keep a handle while the
/// checkout owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryInventoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a concert.
    pub fn with_concert(self, concert: Concert) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.concerts.insert(concert.id.clone(), concert);
        }
        self
    }

    /// Let `count` more orders be created, then fail every further write.
    pub fn fail_order_creation_after(self, count: usize) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.order_creation_budget = Some(count);
        }
        self
    }

    /// Fail every sold-count update for `concert_id`.
    pub fn fail_sold_count_update_for(self, concert_id: &str) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing_sold_count = Some(concert_id.to_string());
        }
        self
    }

    /// Snapshot of every persisted order.
    pub fn orders(&self) -> Vec<Order> {
        self.inner
            .lock()
            .map(|inner| inner.orders.clone())
            .unwrap_or_default()
    }

    /// Current state of a concert.
    pub fn concert(&self, concert_id: &str) -> Option<Concert> {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.concerts.get(concert_id).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, InventoryError> {
        self.inner
            .lock()
            .map_err(|_| InventoryError::Storage("inventory lock poisoned".to_string()))
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn fetch_concert(&self, concert_id: &str) -> Result<Concert, InventoryError> {
        let inner = self.lock()?;
        let concert = inner
            .concerts
            .get(concert_id)
            .cloned()
            .ok_or_else(|| InventoryError::ConcertNotFound {
                concert_id: concert_id.to_string(),
            })?;
        if concert.is_in_past(Utc::now()) {
            return Err(InventoryError::ConcertInPast {
                title: concert.title,
            });
        }
        Ok(concert)
    }

    async fn create_order(&self, order: &Order) -> Result<(), InventoryError> {
        let mut inner = self.lock()?;
        if let Some(remaining) = inner.order_creation_budget.as_mut() {
            if *remaining == 0 {
                return Err(InventoryError::Storage(format!(
                    "rejected write of order {}/{}",
                    order.order_reference, order.line_number
                )));
            }
            *remaining -= 1;
        }
        let duplicate = inner.orders.iter().any(|existing| {
            existing.order_reference == order.order_reference
                && existing.line_number == order.line_number
        });
        if duplicate {
            return Err(InventoryError::Storage(format!(
                "order {}/{} already exists",
                order.order_reference, order.line_number
            )));
        }
        inner.orders.push(order.clone());
        Ok(())
    }

    async fn update_sold_count(&self, concert_id: &str, delta: u32) -> Result<(), InventoryError> {
        let mut inner = self.lock()?;
        if inner.failing_sold_count.as_deref() == Some(concert_id) {
            return Err(InventoryError::Storage(format!(
                "rejected sold count update for {}",
                concert_id
            )));
        }
        let concert = inner
            .concerts
            .get_mut(concert_id)
            .ok_or_else(|| InventoryError::ConcertNotFound {
                concert_id: concert_id.to_string(),
            })?;
        if concert.available_tickets < delta {
            return Err(InventoryError::InsufficientCapacity {
                concert_id: concert_id.to_string(),
                requested: delta,
            });
        }
        concert.available_tickets -= delta;
        Ok(())
    }

    async fn update_order_status(
        &self,
        order_reference: &str,
        line_number: u32,
        status: OrderStatus,
    ) -> Result<(), InventoryError> {
        let mut inner = self.lock()?;
        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.order_reference == order_reference && o.line_number == line_number)
            .ok_or_else(|| InventoryError::Storage(format!(
                "order {}/{} not found",
                order_reference, line_number
            )))?;
        if !order.status.can_transition_to(status) {
            return Err(InventoryError::InvalidStatusTransition {
                order_reference: order_reference.to_string(),
                line_number,
                status,
            });
        }
        order.status = status;
        Ok(())
    }

    async fn orders_by_reference(&self, order_reference: &str) -> Result<Vec<Order>, InventoryError> {
        let inner = self.lock()?;
        let mut orders: Vec<Order> = inner
            .orders
            .iter()
            .filter(|o| o.order_reference == order_reference)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.line_number);
        Ok(orders)
    }

    async fn generate_reference(&self, length: usize) -> Result<String, InventoryError> {
        let inner = self.lock()?;
        for _ in 0..8 {
            let candidate = reference_candidate(length);
            if !inner.orders.iter().any(|o| o.order_reference == candidate) {
                return Ok(candidate);
            }
        }
        Err(InventoryError::ReferenceExhausted { attempts: 8 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderLine, PaymentRequest};
    use bigdecimal::BigDecimal;

    fn concert(id: &str, available: u32, days_from_now: i64) -> Concert {
        Concert {
            id: id.into(),
            title: format!("Concert {}", id),
            description: String::new(),
            starts_at: Utc::now() + chrono::Duration::days(days_from_now),
            full_price: BigDecimal::from(11),
            concession_price: BigDecimal::from(9),
            available_tickets: available,
        }
    }

    fn pending_order(reference: &str) -> Order {
        let line = OrderLine {
            concert_id: "ABC".into(),
            num_of_full_price: Some(1),
            num_of_concessions: Some(0),
            additional_fields: None,
        };
        Order::pending(reference, 0, &PaymentRequest::default(), &line)
    }

    #[tokio::test]
    async fn test_fetch_concert_in_past_fails() {
        let store = MemoryInventoryStore::new().with_concert(concert("OLD", 10, -1));
        let err = store.fetch_concert("OLD").await.unwrap_err();
        assert!(matches!(err, InventoryError::ConcertInPast { .. }));

        let err = store.fetch_concert("MISSING").await.unwrap_err();
        assert!(matches!(err, InventoryError::ConcertNotFound { .. }));
    }

    #[tokio::test]
    async fn test_sold_count_never_goes_below_zero() {
        let store = MemoryInventoryStore::new().with_concert(concert("ABC", 3, 7));
        store.update_sold_count("ABC", 2).await.unwrap();
        let err = store.update_sold_count("ABC", 2).await.unwrap_err();
        assert!(matches!(err, InventoryError::InsufficientCapacity { .. }));
        assert_eq!(store.concert("ABC").unwrap().available_tickets, 1);
    }

    #[tokio::test]
    async fn test_fulfilled_order_never_regresses() {
        let store = MemoryInventoryStore::new();
        store.create_order(&pending_order("AAAA")).await.unwrap();

        store
            .update_order_status("AAAA", 0, OrderStatus::Fulfilled)
            .await
            .unwrap();
        let err = store
            .update_order_status("AAAA", 0, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidStatusTransition { .. }));
        let err = store
            .update_order_status("AAAA", 0, OrderStatus::Failed)
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidStatusTransition { .. }));

        let orders = store.orders_by_reference("AAAA").await.unwrap();
        assert_eq!(orders[0].status, OrderStatus::Fulfilled);
    }

    #[tokio::test]
    async fn test_order_creation_budget() {
        let store = MemoryInventoryStore::new().fail_order_creation_after(1);
        store.create_order(&pending_order("AAAA")).await.unwrap();
        assert!(store.create_order(&pending_order("BBBB")).await.is_err());
        assert_eq!(store.orders().len(), 1);
    }
}
