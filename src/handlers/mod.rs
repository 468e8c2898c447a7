//! # Checkout Processing
//!
//! The checkout runs three stages strictly in sequence for each request:
//!
//! 1. **validation**: decode and validate the payment request
//! 2. **pricing**: fetch each line's concert, check capacity, compute the balance
//! 3. **commit**: persist pending orders, charge, decrement inventory, email tickets
//!
//! Each stage aborts the whole request on its first error. Resubmitting the
//! same request is a new checkout: it gets a new order reference and a second
//! charge attempt.

pub mod commit;
pub mod pricing;
pub mod validation;

use std::sync::Arc;

use tracing::info;

use crate::config::FeeModel;
use crate::error::CheckoutResult;
use crate::inventory::InventoryStore;
use crate::models::PaymentResponse;
use crate::notification::{TicketDocumentOptions, TicketNotifier};
use crate::payment::PaymentProcessor;

pub use commit::commit_checkout;
pub use pricing::{price_order_lines, PricedCheckout};
pub use validation::parse_request_body;

/// Collaborators and settings shared by every checkout request.
#[derive(Clone)]
pub struct CheckoutContext {
    pub inventory: Arc<dyn InventoryStore>,
    pub payments: Arc<dyn PaymentProcessor>,
    pub notifier: Arc<dyn TicketNotifier>,
    pub fees: FeeModel,
    pub reference_length: usize,
    pub ticket_options: TicketDocumentOptions,
}

impl CheckoutContext {
    pub fn new(
        inventory: Arc<dyn InventoryStore>,
        payments: Arc<dyn PaymentProcessor>,
        notifier: Arc<dyn TicketNotifier>,
    ) -> Self {
        Self {
            inventory,
            payments,
            notifier,
            fees: FeeModel::default(),
            reference_length: 4,
            ticket_options: TicketDocumentOptions::default(),
        }
    }

    pub fn with_fees(mut self, fees: FeeModel) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_reference_length(mut self, length: usize) -> Self {
        self.reference_length = length;
        self
    }

    pub fn with_ticket_options(mut self, options: TicketDocumentOptions) -> Self {
        self.ticket_options = options;
        self
    }
}

/// Process one checkout from raw request body to client secret.
pub async fn process_payment(ctx: &CheckoutContext, body: &[u8]) -> CheckoutResult<PaymentResponse> {
    let request = parse_request_body(body)?;
    let priced = price_order_lines(ctx.inventory.as_ref(), &ctx.fees, &request).await?;
    let response = commit_checkout(ctx, &request, &priced).await?;

    info!(
        "Checkout {} complete: {} lines charged {}",
        response.order_reference,
        request.order_lines.len(),
        priced.balance
    );
    Ok(response)
}
