//! Mock payment processor.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

use crate::payment::{PaymentError, PaymentProcessor};

/// A charge seen by the mock processor.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCharge {
    pub amount: BigDecimal,
    pub order_reference: String,
}

/// Payment processor that records every charge and either approves or
/// declines all of them.
#[derive(Debug, Clone)]
pub struct MockPaymentProcessor {
    should_succeed: bool,
    charges: Arc<Mutex<Vec<RecordedCharge>>>,
}

impl MockPaymentProcessor {
    /// A processor that approves every charge.
    pub fn new() -> Self {
        Self {
            should_succeed: true,
            charges: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A processor that declines every charge.
    pub fn declining() -> Self {
        Self {
            should_succeed: false,
            ..Self::new()
        }
    }

    pub fn charges(&self) -> Vec<RecordedCharge> {
        self.charges.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn charge(&self, amount: &BigDecimal, order_reference: &str) -> Result<String, PaymentError> {
        if let Ok(mut charges) = self.charges.lock() {
            charges.push(RecordedCharge {
                amount: amount.clone(),
                order_reference: order_reference.to_string(),
            });
        }

        if !self.should_succeed {
            return Err(PaymentError::Declined("Your card was declined.".to_string()));
        }

        let client_secret = format!("pi_mock_{}_secret_{}", order_reference, Uuid::new_v4().simple());
        info!("Mock payment of {} approved for order {}", amount, order_reference);
        Ok(client_secret)
    }
}
