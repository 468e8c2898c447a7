//! HTML ticket document rendering.

use crate::models::{Concert, Order};

/// Presentation options for rendered tickets.
#[derive(Debug, Clone)]
pub struct TicketDocumentOptions {
    /// Name printed as the ticket issuer.
    pub organiser: String,
}

impl Default for TicketDocumentOptions {
    fn default() -> Self {
        Self {
            organiser: "Box Office".to_string(),
        }
    }
}

/// Escape text for interpolation into HTML.
pub(crate) fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render a standalone HTML ticket for one order line.
pub fn render_ticket_html(order: &Order, concert: &Concert, options: &TicketDocumentOptions) -> String {
    let starts_at = concert.starts_at.format("%A %-d %B %Y, %H:%M UTC");
    let title = escape(&concert.title);
    let description = escape(&concert.description);
    let buyer = escape(&order.buyer_name());
    let organiser = escape(&options.organiser);
    let reference = escape(&order.order_reference);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Tickets for {title}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px; border: 2px dashed #2563eb;">
        <h2 style="color: #2563eb;">{title}</h2>
        <p>{description}</p>
        <p><strong>{starts_at}</strong></p>
        <table>
            <tr><td>Order reference</td><td><strong>{reference}</strong></td></tr>
            <tr><td>Name</td><td>{buyer}</td></tr>
            <tr><td>Full price</td><td>{full_price}</td></tr>
            <tr><td>Concessions</td><td>{concessions}</td></tr>
            <tr><td>Admits</td><td>{admits}</td></tr>
        </table>
        <p style="color: #666; font-size: 12px; margin-top: 40px;">Issued by {organiser}</p>
    </div>
</body>
</html>
"#,
        full_price = order.num_of_full_price,
        concessions = order.num_of_concessions,
        admits = order.ticket_total(),
    )
}
