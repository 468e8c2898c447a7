//! Order commit pipeline: persist pending orders, charge the balance, then
//! fulfil each line.
//!
//! ## Steps
//!
//! 1. **generate_reference**: one reference shared by every line of the checkout
//! 2. **persist_orders**: one `pending` order per line, in input order
//! 3. **charge**: submit the balance and reference to the payment processor
//! 4. **fulfil_orders**: per line, decrement inventory, render and email the
//!    ticket, mark the order `fulfilled`
//!
//! Nothing is rolled back. A failure in step 2 leaves earlier lines `pending`;
//! a failed charge marks the checkout's orders `failed`; a failure in step 4
//! leaves the failing line and every later line `pending` while earlier lines
//! are already fulfilled.

use tracing::{error, info, warn};

use super::pricing::PricedCheckout;
use super::CheckoutContext;
use crate::error::{CheckoutError, CheckoutResult};
use crate::models::{Order, OrderStatus, PaymentRequest, PaymentResponse};

// ============================================================================
// Step 1 & 2: Reference and Pending Orders
// ============================================================================

/// Generate the checkout's reference and persist one pending order per line.
pub async fn persist_orders(
    ctx: &CheckoutContext,
    request: &PaymentRequest,
) -> CheckoutResult<(String, Vec<Order>)> {
    let order_reference = ctx
        .inventory
        .generate_reference(ctx.reference_length)
        .await
        .map_err(|e| CheckoutError::OrderPersistenceFailed(e.to_string()))?;

    let mut orders = Vec::with_capacity(request.order_lines.len());
    for (index, line) in request.order_lines.iter().enumerate() {
        let line_number = u32::try_from(index)
            .map_err(|_| CheckoutError::InvalidRequestBody("too many order lines".to_string()))?;
        let order = Order::pending(&order_reference, line_number, request, line);

        if let Err(e) = ctx.inventory.create_order(&order).await {
            error!(
                "Unable to create order {}/{} ({} of {} lines persisted): {}",
                order_reference,
                line_number,
                orders.len(),
                request.order_lines.len(),
                e
            );
            return Err(CheckoutError::OrderPersistenceFailed(e.to_string()));
        }
        orders.push(order);
    }

    info!(
        "Persisted {} pending orders under reference {}",
        orders.len(),
        order_reference
    );
    Ok((order_reference, orders))
}

// ============================================================================
// Step 3: Charge
// ============================================================================

/// Charge the checkout balance, marking every order `failed` when declined.
pub async fn charge(
    ctx: &CheckoutContext,
    priced: &PricedCheckout,
    order_reference: &str,
    orders: &[Order],
) -> CheckoutResult<String> {
    match ctx.payments.charge(&priced.balance, order_reference).await {
        Ok(client_secret) => Ok(client_secret),
        Err(e) => {
            error!("Payment for order {} failed: {}", order_reference, e);
            mark_orders(ctx, orders, OrderStatus::Failed).await;
            Err(CheckoutError::PaymentFailed(e.to_string()))
        }
    }
}

/// Best-effort status update; failures are logged and left for reconciliation.
async fn mark_orders(ctx: &CheckoutContext, orders: &[Order], status: OrderStatus) {
    for order in orders {
        if let Err(e) = ctx
            .inventory
            .update_order_status(&order.order_reference, order.line_number, status)
            .await
        {
            warn!(
                "Could not mark order {}/{} as {}: {}",
                order.order_reference, order.line_number, status, e
            );
        }
    }
}

// ============================================================================
// Step 4: Fulfil
// ============================================================================

/// Decrement inventory, send the ticket and mark each order fulfilled, in
/// input order. Stops at the first failing line.
pub async fn fulfil_orders(
    ctx: &CheckoutContext,
    priced: &PricedCheckout,
    orders: &[Order],
) -> CheckoutResult<()> {
    for (done, order) in orders.iter().enumerate() {
        if let Err(e) = fulfil_order(ctx, priced, order).await {
            error!(
                "Fulfilment stopped at order {}/{} after {} of {} lines: {}",
                order.order_reference,
                order.line_number,
                done,
                orders.len(),
                e
            );
            return Err(e);
        }
    }
    Ok(())
}

async fn fulfil_order(
    ctx: &CheckoutContext,
    priced: &PricedCheckout,
    order: &Order,
) -> CheckoutResult<()> {
    let concert = priced.concerts.get(&order.concert_id).ok_or_else(|| {
        CheckoutError::FulfillmentFailed(format!("no snapshot for concert {}", order.concert_id))
    })?;

    ctx.inventory
        .update_sold_count(&order.concert_id, order.ticket_total())
        .await
        .map_err(|e| CheckoutError::FulfillmentFailed(e.to_string()))?;

    let document = ctx
        .notifier
        .render_ticket_document(order, concert, &ctx.ticket_options)
        .map_err(|e| CheckoutError::FulfillmentFailed(e.to_string()))?;

    ctx.notifier
        .send(order, document)
        .await
        .map_err(|e| CheckoutError::FulfillmentFailed(e.to_string()))?;

    ctx.inventory
        .update_order_status(&order.order_reference, order.line_number, OrderStatus::Fulfilled)
        .await
        .map_err(|e| CheckoutError::FulfillmentFailed(e.to_string()))?;

    info!(
        "Order {}/{} fulfilled: {} tickets for {}",
        order.order_reference,
        order.line_number,
        order.ticket_total(),
        order.concert_id
    );
    Ok(())
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run the full commit pipeline for a priced request.
pub async fn commit_checkout(
    ctx: &CheckoutContext,
    request: &PaymentRequest,
    priced: &PricedCheckout,
) -> CheckoutResult<PaymentResponse> {
    let (order_reference, orders) = persist_orders(ctx, request).await?;
    let client_secret = charge(ctx, priced, &order_reference, &orders).await?;
    fulfil_orders(ctx, priced, &orders).await?;

    Ok(PaymentResponse {
        client_secret,
        order_reference,
    })
}
