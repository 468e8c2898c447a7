//! Domain models for the concert checkout service.
//!
//! Request models are deserialized from the buyer's JSON payload, database
//! models map to the concerts and orders tables, and response models are the
//! JSON bodies returned to the caller.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request Models (Deserialize from JSON input)
// ============================================================================

/// The full checkout payload submitted by a buyer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub order_lines: Vec<OrderLine>,
}

/// One buyer-submitted line item: a number of tickets for a single concert.
///
/// Ticket counts are optional at the decoding layer so that an explicit `0`
/// can be told apart from an omitted field; the validator rejects the latter.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default)]
    pub concert_id: String,
    pub num_of_full_price: Option<u32>,
    pub num_of_concessions: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_fields: Option<serde_json::Value>,
}

impl OrderLine {
    /// Number of full-price tickets, zero when absent.
    pub fn full_price_count(&self) -> u32 {
        self.num_of_full_price.unwrap_or(0)
    }

    /// Number of concession tickets, zero when absent.
    pub fn concession_count(&self) -> u32 {
        self.num_of_concessions.unwrap_or(0)
    }

    /// Total tickets requested on this line.
    pub fn ticket_total(&self) -> u64 {
        u64::from(self.full_price_count()) + u64::from(self.concession_count())
    }
}

// ============================================================================
// Database Models (sqlx::FromRow)
// ============================================================================

/// A concert as stored in the inventory.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Concert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub full_price: BigDecimal,
    pub concession_price: BigDecimal,
    #[sqlx(try_from = "i32")]
    pub available_tickets: u32,
}

impl Concert {
    /// Whether the concert has already started at `now`.
    pub fn is_in_past(&self, now: DateTime<Utc>) -> bool {
        self.starts_at < now
    }

    /// Price of a line against this concert, before fees.
    pub fn price_for(&self, line: &OrderLine) -> BigDecimal {
        &self.full_price * &BigDecimal::from(line.full_price_count())
            + &self.concession_price * &BigDecimal::from(line.concession_count())
    }
}

/// Lifecycle of a persisted order line.
///
/// Orders are created `Pending` before payment is attempted and move exactly
/// once to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Fulfilled,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Only `Pending` may move, and only to a terminal state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fulfilled) | (Self::Pending, Self::Failed)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "fulfilled" => Ok(Self::Fulfilled),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown order status '{}'", other)),
        }
    }
}

/// One persisted order line. All lines of a checkout share `order_reference`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_reference: String,
    #[sqlx(try_from = "i32")]
    pub line_number: u32,
    pub concert_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[sqlx(try_from = "i32")]
    pub num_of_full_price: u32,
    #[sqlx(try_from = "i32")]
    pub num_of_concessions: u32,
    pub additional_fields: Option<serde_json::Value>,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
}

impl Order {
    /// Build the pending order for one line of a validated request.
    pub fn pending(
        order_reference: &str,
        line_number: u32,
        request: &PaymentRequest,
        line: &OrderLine,
    ) -> Self {
        Self {
            order_reference: order_reference.to_string(),
            line_number,
            concert_id: line.concert_id.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            num_of_full_price: line.full_price_count(),
            num_of_concessions: line.concession_count(),
            additional_fields: line.additional_fields.clone(),
            status: OrderStatus::Pending,
        }
    }

    pub fn ticket_total(&self) -> u32 {
        self.num_of_full_price.saturating_add(self.num_of_concessions)
    }

    pub fn buyer_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Audit view of an order line: progress without the buyer's personal data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_reference: String,
    pub line_number: u32,
    pub concert_id: String,
    pub num_of_full_price: u32,
    pub num_of_concessions: u32,
    pub status: OrderStatus,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            order_reference: order.order_reference.clone(),
            line_number: order.line_number,
            concert_id: order.concert_id.clone(),
            num_of_full_price: order.num_of_full_price,
            num_of_concessions: order.num_of_concessions,
            status: order.status,
        }
    }
}

// ============================================================================
// Response Models
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
}

/// Body returned when a checkout has been charged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub client_secret: String,
    pub order_reference: String,
}

/// Body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_never_regresses() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Fulfilled));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Failed));
        assert!(!OrderStatus::Fulfilled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Failed.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Fulfilled.can_transition_to(OrderStatus::Failed));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [OrderStatus::Pending, OrderStatus::Fulfilled, OrderStatus::Failed] {
            assert_eq!(OrderStatus::try_from(status.to_string()), Ok(status));
        }
        assert!(OrderStatus::try_from("shipped".to_string()).is_err());
    }

    #[test]
    fn test_concert_price_for_line() {
        let concert = Concert {
            id: "ABC".into(),
            title: "Spring Concert".into(),
            description: String::new(),
            starts_at: Utc::now(),
            full_price: BigDecimal::from(11),
            concession_price: BigDecimal::from(9),
            available_tickets: 100,
        };
        let line = OrderLine {
            concert_id: "ABC".into(),
            num_of_full_price: Some(2),
            num_of_concessions: Some(2),
            additional_fields: None,
        };
        assert_eq!(concert.price_for(&line), BigDecimal::from(40));
        assert_eq!(line.ticket_total(), 4);
    }

    #[test]
    fn test_order_summary_omits_buyer_details() {
        let line = OrderLine {
            concert_id: "ABC".into(),
            num_of_full_price: Some(2),
            num_of_concessions: Some(1),
            additional_fields: Some(serde_json::json!({"phone": "07700 900123"})),
        };
        let request = PaymentRequest {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.org".into(),
            order_lines: vec![line.clone()],
        };
        let order = Order::pending("BEEF", 0, &request, &line);

        let json = serde_json::to_string(&OrderSummary::from(&order)).unwrap();
        assert!(json.contains(r#""orderReference":"BEEF""#));
        assert!(json.contains(r#""status":"pending""#));
        for leaked in ["ada@example.org", "Lovelace", "07700", "email", "firstName"] {
            assert!(!json.contains(leaked), "{} leaked in {}", leaked, json);
        }
    }
}
