//! Pricing and availability: fetch each line's concert, check capacity and
//! accumulate the balance to charge.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use tracing::{error, info, warn};

use crate::config::FeeModel;
use crate::error::{CheckoutError, CheckoutResult};
use crate::inventory::{InventoryError, InventoryStore};
use crate::models::{Concert, PaymentRequest};

/// Outcome of pricing a validated request.
#[derive(Debug, Clone)]
pub struct PricedCheckout {
    /// Ticket total before fees.
    pub subtotal: BigDecimal,
    /// Amount to charge, fees included.
    pub balance: BigDecimal,
    /// Concert snapshots as read during the check, keyed by concert id.
    pub concerts: HashMap<String, Concert>,
}

/// Price every line of `request` and verify each against its concert's
/// remaining capacity.
///
/// Lookup failures are surfaced with the inventory's message unchanged. Each
/// line is checked against the capacity in the snapshot it fetched, so two
/// lines for the same concert are not checked against their combined total;
/// the atomic decrement after charging is what ultimately refuses oversale.
pub async fn price_order_lines(
    inventory: &dyn InventoryStore,
    fees: &FeeModel,
    request: &PaymentRequest,
) -> CheckoutResult<PricedCheckout> {
    let mut subtotal = BigDecimal::from(0);
    let mut concerts = HashMap::new();

    for line in &request.order_lines {
        let concert = inventory
            .fetch_concert(&line.concert_id)
            .await
            .map_err(|e| lookup_failed(&line.concert_id, e))?;

        let ticket_total = line.ticket_total();
        if ticket_total > u64::from(concert.available_tickets) {
            warn!(
                "Requested {} tickets for {} but only {} remain",
                ticket_total, concert.id, concert.available_tickets
            );
            return Err(CheckoutError::InsufficientAvailableTickets(format!(
                "Insufficient tickets available for {}",
                concert.title
            )));
        }

        subtotal += concert.price_for(line);
        concerts.insert(concert.id.clone(), concert);
    }

    let balance = fees.apply(&subtotal);
    info!(
        "Priced {} order lines: subtotal={}, balance={}",
        request.order_lines.len(),
        subtotal,
        balance
    );

    Ok(PricedCheckout {
        subtotal,
        balance,
        concerts,
    })
}

/// Not-found and in-past messages reach the caller unchanged; storage errors
/// are logged and replaced with a generic message.
fn lookup_failed(concert_id: &str, e: InventoryError) -> CheckoutError {
    match e {
        InventoryError::ConcertNotFound { .. } | InventoryError::ConcertInPast { .. } => {
            CheckoutError::ConcertLookupFailed(e.to_string())
        }
        other => {
            error!("Lookup of concert {} failed: {}", concert_id, other);
            CheckoutError::ConcertLookupFailed(format!("Unable to retrieve concert {}", concert_id))
        }
    }
}
