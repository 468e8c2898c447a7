//! SMTP ticket delivery using Lettre.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use super::ticket::escape;
use super::{render_ticket_html, NotificationError, TicketDocumentOptions, TicketNotifier};
use crate::config::SmtpConfig;
use crate::models::{Concert, Order};

/// Sends rendered tickets over an authenticated SMTP relay.
pub struct SmtpTicketNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpTicketNotifier {
    /// Create a notifier sending from `sender_address` through the configured relay.
    pub fn new(smtp: &SmtpConfig, sender_address: &str) -> Result<Self, NotificationError> {
        let sender: Mailbox = sender_address
            .parse()
            .map_err(|e| NotificationError::Address(format!("{}: {}", sender_address, e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.server)
            .map_err(|e| NotificationError::Delivery(format!("SMTP relay error: {e}")))?
            .port(smtp.port);
        if let (Some(username), Some(password)) = (&smtp.username, &smtp.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            sender,
        })
    }
}

/// HTML body of the ticket email. Buyer-supplied text is escaped.
fn ticket_email_body(order: &Order) -> String {
    format!(
        "<p>Dear {},</p>\
         <p>Thank you for your order. Your tickets for order <strong>{}</strong> are attached; \
         please bring them with you to the concert.</p>",
        escape(&order.buyer_name()),
        escape(&order.order_reference)
    )
}

/// Build the ticket email for `order` with the rendered document attached.
pub fn build_ticket_message(
    sender: &Mailbox,
    order: &Order,
    attachment: Vec<u8>,
) -> Result<Message, NotificationError> {
    let recipient: Mailbox = order
        .email
        .parse()
        .map_err(|e| NotificationError::Address(format!("{}: {}", order.email, e)))?;

    let body = ticket_email_body(order);
    let filename = format!(
        "tickets-{}-{}.html",
        order.order_reference, order.line_number
    );

    Message::builder()
        .from(sender.clone())
        .to(recipient)
        .subject(format!("Your tickets - order {}", order.order_reference))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::html(body))
                .singlepart(Attachment::new(filename).body(attachment, ContentType::TEXT_HTML)),
        )
        .map_err(|e| NotificationError::Delivery(format!("Failed to build email: {e}")))
}

#[async_trait]
impl TicketNotifier for SmtpTicketNotifier {
    fn render_ticket_document(
        &self,
        order: &Order,
        concert: &Concert,
        options: &TicketDocumentOptions,
    ) -> Result<Vec<u8>, NotificationError> {
        Ok(render_ticket_html(order, concert, options).into_bytes())
    }

    async fn send(&self, order: &Order, attachment: Vec<u8>) -> Result<(), NotificationError> {
        let email = build_ticket_message(&self.sender, order, attachment)?;
        self.mailer
            .send(email)
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        info!(
            "Ticket email sent to {} for order {}/{}",
            order.email, order.order_reference, order.line_number
        );
        Ok(())
    }
}
