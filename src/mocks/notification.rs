//! Mock ticket notifier.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::models::{Concert, Order};
use crate::notification::{
    render_ticket_html, NotificationError, TicketDocumentOptions, TicketNotifier,
};

/// A ticket email captured by the mock notifier.
#[derive(Debug, Clone)]
pub struct SentTicket {
    pub email: String,
    pub order_reference: String,
    pub line_number: u32,
    pub attachment: Vec<u8>,
}

/// Ticket notifier that renders real documents but keeps emails in memory.
#[derive(Debug, Clone)]
pub struct MockTicketNotifier {
    should_succeed: bool,
    sent: Arc<Mutex<Vec<SentTicket>>>,
}

impl MockTicketNotifier {
    pub fn new() -> Self {
        Self {
            should_succeed: true,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A notifier whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            should_succeed: false,
            ..Self::new()
        }
    }

    pub fn sent(&self) -> Vec<SentTicket> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for MockTicketNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TicketNotifier for MockTicketNotifier {
    fn render_ticket_document(
        &self,
        order: &Order,
        concert: &Concert,
        options: &TicketDocumentOptions,
    ) -> Result<Vec<u8>, NotificationError> {
        Ok(render_ticket_html(order, concert, options).into_bytes())
    }

    async fn send(&self, order: &Order, attachment: Vec<u8>) -> Result<(), NotificationError> {
        if !self.should_succeed {
            return Err(NotificationError::Delivery(format!(
                "mail relay refused message for {}",
                order.email
            )));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(SentTicket {
                email: order.email.clone(),
                order_reference: order.order_reference.clone(),
                line_number: order.line_number,
                attachment,
            });
        }
        Ok(())
    }
}
