//! Payment processor collaborator.
//!
//! A charge takes the computed balance and the checkout's order reference and
//! yields a client secret the buyer's browser uses to complete the payment.

pub mod stripe;

pub use stripe::StripePaymentProcessor;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};

/// Errors raised by a payment processor.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment declined: {0}")]
    Declined(String),

    #[error("invalid amount {0}")]
    InvalidAmount(String),

    #[error("payment transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected payment processor response: {0}")]
    UnexpectedResponse(String),
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Charge `amount` against `order_reference`, returning the client secret.
    async fn charge(&self, amount: &BigDecimal, order_reference: &str) -> Result<String, PaymentError>;
}

/// Convert a decimal amount to the processor's minor units (pence, cents).
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, PaymentError> {
    let minor = (amount * &BigDecimal::from(100)).round(0);
    minor
        .to_i64()
        .filter(|value| *value >= 0)
        .ok_or_else(|| PaymentError::InvalidAmount(amount.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_to_minor_units() {
        assert_eq!(to_minor_units(&BigDecimal::from(46)).unwrap(), 4600);
        assert_eq!(
            to_minor_units(&BigDecimal::from_str("12.344").unwrap()).unwrap(),
            1234
        );
        assert_eq!(
            to_minor_units(&BigDecimal::from_str("0.999").unwrap()).unwrap(),
            100
        );
    }

    #[test]
    fn test_to_minor_units_rejects_negative() {
        let err = to_minor_units(&BigDecimal::from(-1)).unwrap_err();
        assert!(matches!(err, PaymentError::InvalidAmount(_)));
    }
}
