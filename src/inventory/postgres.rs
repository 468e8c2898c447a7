//! PostgreSQL-backed inventory store.
//!
//! Table names come from configuration and are interpolated into the SQL; they
//! are validated as plain identifiers when the configuration is loaded.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use super::{reference_candidate, InventoryError, InventoryStore};
use crate::models::{Concert, Order, OrderStatus};

const MAX_REFERENCE_ATTEMPTS: usize = 8;

/// Inventory store over the concerts and orders tables.
#[derive(Debug, Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
    concerts_table: String,
    orders_table: String,
}

impl PgInventoryStore {
    pub fn new(
        pool: PgPool,
        concerts_table: impl Into<String>,
        orders_table: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            concerts_table: concerts_table.into(),
            orders_table: orders_table.into(),
        }
    }
}

fn to_db_int(value: u32, what: &str) -> Result<i32, InventoryError> {
    i32::try_from(value).map_err(|_| InventoryError::Storage(format!("{} {} out of range", what, value)))
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn fetch_concert(&self, concert_id: &str) -> Result<Concert, InventoryError> {
        let query = format!(
            "SELECT id, title, description, starts_at, full_price, concession_price, available_tickets \
             FROM {} WHERE id = $1",
            self.concerts_table
        );
        let concert: Concert = sqlx::query_as(&query)
            .bind(concert_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| InventoryError::ConcertNotFound {
                concert_id: concert_id.to_string(),
            })?;

        if concert.is_in_past(Utc::now()) {
            return Err(InventoryError::ConcertInPast {
                title: concert.title,
            });
        }

        debug!(
            "Fetched concert {} ({} tickets available)",
            concert.id, concert.available_tickets
        );
        Ok(concert)
    }

    async fn create_order(&self, order: &Order) -> Result<(), InventoryError> {
        let query = format!(
            r#"
            INSERT INTO {} (order_reference, line_number, concert_id, first_name, last_name,
                            email, num_of_full_price, num_of_concessions, additional_fields, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
            self.orders_table
        );
        sqlx::query(&query)
            .bind(&order.order_reference)
            .bind(to_db_int(order.line_number, "line number")?)
            .bind(&order.concert_id)
            .bind(&order.first_name)
            .bind(&order.last_name)
            .bind(&order.email)
            .bind(to_db_int(order.num_of_full_price, "full price count")?)
            .bind(to_db_int(order.num_of_concessions, "concession count")?)
            .bind(&order.additional_fields)
            .bind(order.status.as_str())
            .execute(&self.pool)
            .await?;

        info!(
            "Order {}/{} created for concert {}",
            order.order_reference, order.line_number, order.concert_id
        );
        Ok(())
    }

    async fn update_sold_count(&self, concert_id: &str, delta: u32) -> Result<(), InventoryError> {
        let query = format!(
            "UPDATE {} SET available_tickets = available_tickets - $1 \
             WHERE id = $2 AND available_tickets >= $1",
            self.concerts_table
        );
        let result = sqlx::query(&query)
            .bind(to_db_int(delta, "ticket delta")?)
            .bind(concert_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            warn!("Concert {} could not absorb {} more sold tickets", concert_id, delta);
            return Err(InventoryError::InsufficientCapacity {
                concert_id: concert_id.to_string(),
                requested: delta,
            });
        }
        Ok(())
    }

    async fn update_order_status(
        &self,
        order_reference: &str,
        line_number: u32,
        status: OrderStatus,
    ) -> Result<(), InventoryError> {
        if !OrderStatus::Pending.can_transition_to(status) {
            return Err(InventoryError::InvalidStatusTransition {
                order_reference: order_reference.to_string(),
                line_number,
                status,
            });
        }

        let query = format!(
            "UPDATE {} SET status = $1, updated_at = now() \
             WHERE order_reference = $2 AND line_number = $3 AND status = 'pending'",
            self.orders_table
        );
        let result = sqlx::query(&query)
            .bind(status.as_str())
            .bind(order_reference)
            .bind(to_db_int(line_number, "line number")?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(InventoryError::InvalidStatusTransition {
                order_reference: order_reference.to_string(),
                line_number,
                status,
            });
        }
        Ok(())
    }

    async fn orders_by_reference(&self, order_reference: &str) -> Result<Vec<Order>, InventoryError> {
        let query = format!(
            "SELECT order_reference, line_number, concert_id, first_name, last_name, email, \
                    num_of_full_price, num_of_concessions, additional_fields, status \
             FROM {} WHERE order_reference = $1 ORDER BY line_number",
            self.orders_table
        );
        let orders = sqlx::query_as(&query)
            .bind(order_reference)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn generate_reference(&self, length: usize) -> Result<String, InventoryError> {
        let query = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE order_reference = $1)",
            self.orders_table
        );
        for _ in 0..MAX_REFERENCE_ATTEMPTS {
            let candidate = reference_candidate(length);
            let taken: bool = sqlx::query_scalar(&query)
                .bind(&candidate)
                .fetch_one(&self.pool)
                .await?;
            if !taken {
                return Ok(candidate);
            }
            debug!("Order reference {} already in use, retrying", candidate);
        }
        Err(InventoryError::ReferenceExhausted {
            attempts: MAX_REFERENCE_ATTEMPTS,
        })
    }
}
