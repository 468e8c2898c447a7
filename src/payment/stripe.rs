//! Stripe payment processor.
//!
//! Creates a PaymentIntent for the checkout balance and hands its client
//! secret back to the caller; the buyer confirms the intent client-side.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use tracing::{error, info};

use super::{to_minor_units, PaymentError, PaymentProcessor};

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Payment processor backed by the Stripe PaymentIntents API.
#[derive(Debug, Clone)]
pub struct StripePaymentProcessor {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
    currency: String,
}

impl StripePaymentProcessor {
    pub fn new(
        secret_key: impl Into<String>,
        api_base: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            currency: currency.into(),
        }
    }
}

#[async_trait]
impl PaymentProcessor for StripePaymentProcessor {
    async fn charge(&self, amount: &BigDecimal, order_reference: &str) -> Result<String, PaymentError> {
        let minor_units = to_minor_units(amount)?;
        let params = [
            ("amount", minor_units.to_string()),
            ("currency", self.currency.clone()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("metadata[orderReference]", order_reference.to_string()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message.or(b.error.code))
                .unwrap_or_else(|| format!("processor returned {}", status));
            error!("Stripe rejected payment for order {}: {}", order_reference, reason);
            return Err(PaymentError::Declined(reason));
        }

        let intent: PaymentIntent = response.json().await?;
        let client_secret = intent
            .client_secret
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                PaymentError::UnexpectedResponse(format!(
                    "payment intent {} has no client secret",
                    intent.id
                ))
            })?;

        info!(
            "Payment intent {} created for order {} ({} {})",
            intent.id, order_reference, amount, self.currency
        );
        Ok(client_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_charge_returns_client_secret() {
        let router = Router::new().route(
            "/v1/payment_intents",
            post(
                |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                    assert_eq!(
                        headers.get("authorization").unwrap(),
                        "Bearer sk_test_123"
                    );
                    assert_eq!(form["amount"], "4600");
                    assert_eq!(form["currency"], "gbp");
                    assert_eq!(form["metadata[orderReference]"], "AB12");
                    Json(json!({"id": "pi_1", "client_secret": "pi_1_secret_xyz"}))
                },
            ),
        );
        let base = spawn_stub(router).await;

        let processor = StripePaymentProcessor::new("sk_test_123", base, "gbp");
        let secret = processor.charge(&BigDecimal::from(46), "AB12").await.unwrap();
        assert_eq!(secret, "pi_1_secret_xyz");
    }

    #[tokio::test]
    async fn test_charge_surfaces_decline_reason() {
        let router = Router::new().route(
            "/v1/payment_intents",
            post(|| async {
                (
                    StatusCode::PAYMENT_REQUIRED,
                    Json(json!({"error": {"code": "card_declined", "message": "Your card was declined."}})),
                )
            }),
        );
        let base = spawn_stub(router).await;

        let processor = StripePaymentProcessor::new("sk_test_123", base, "gbp");
        let err = processor.charge(&BigDecimal::from(10), "AB12").await.unwrap_err();
        match err {
            PaymentError::Declined(reason) => assert_eq!(reason, "Your card was declined."),
            other => panic!("expected decline, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_charge_without_client_secret_is_unexpected() {
        let router = Router::new().route(
            "/v1/payment_intents",
            post(|| async { Json(json!({"id": "pi_2"})) }),
        );
        let base = spawn_stub(router).await;

        let processor = StripePaymentProcessor::new("sk_test_123", base, "gbp");
        let err = processor.charge(&BigDecimal::from(10), "AB12").await.unwrap_err();
        assert!(matches!(err, PaymentError::UnexpectedResponse(_)));
    }
}
