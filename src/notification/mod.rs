//! Ticket notification collaborator.
//!
//! After a checkout is charged, each order line gets a rendered ticket
//! document which is emailed to the buyer as an attachment.

pub mod smtp;
pub mod ticket;

pub use smtp::SmtpTicketNotifier;
pub use ticket::{render_ticket_html, TicketDocumentOptions};

use async_trait::async_trait;

use crate::models::{Concert, Order};

/// Errors raised while rendering or delivering a ticket.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("failed to render ticket: {0}")]
    Render(String),

    #[error("invalid email address: {0}")]
    Address(String),

    #[error("failed to send ticket email: {0}")]
    Delivery(String),
}

#[async_trait]
pub trait TicketNotifier: Send + Sync {
    /// Render the ticket document for one order line.
    fn render_ticket_document(
        &self,
        order: &Order,
        concert: &Concert,
        options: &TicketDocumentOptions,
    ) -> Result<Vec<u8>, NotificationError>;

    /// Email the buyer of `order` with `attachment` attached.
    async fn send(&self, order: &Order, attachment: Vec<u8>) -> Result<(), NotificationError>;
}
