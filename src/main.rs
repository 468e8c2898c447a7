//! # Concert Checkout Service
//!
//! Standalone Axum application serving the ticket checkout.
//!
//! ## Architecture
//!
//! - Axum handles HTTP routing and the request/response lifecycle
//! - SQLx manages the concerts and orders tables (the inventory store)
//! - Stripe PaymentIntents take the charge
//! - Tickets are emailed over SMTP with Lettre

use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use tracing::info;

use concert_checkout::config::Config;
use concert_checkout::handlers::CheckoutContext;
use concert_checkout::inventory::PgInventoryStore;
use concert_checkout::notification::{SmtpTicketNotifier, TicketDocumentOptions};
use concert_checkout::payment::StripePaymentProcessor;
use concert_checkout::{create_app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "concert_checkout=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting concert checkout service");

    // Fail fast on configuration before any collaborator is touched
    let config = Config::from_env().context("invalid configuration")?;
    let allowed_origin = HeaderValue::from_str(&config.allowed_origin)
        .context("ALLOWED_ORIGIN is not a valid header value")?;

    let app_db = db::connect(&config.database_url, 10).await?;
    info!("Connected to application database, migrations complete");

    let table_names: Vec<&str> = config.tables().iter().map(|(_, table)| *table).collect();
    let existing = db::existing_tables(&app_db, &table_names).await?;
    config
        .ensure_tables_exist(&existing)
        .context("invalid configuration")?;

    let inventory = PgInventoryStore::new(app_db, &config.concerts_table, &config.orders_table);
    let payments = StripePaymentProcessor::new(
        &config.stripe_secret,
        &config.stripe_api_base,
        &config.payment_currency,
    );
    let notifier = SmtpTicketNotifier::new(&config.smtp, &config.sender_address)?;

    let ctx = CheckoutContext::new(Arc::new(inventory), Arc::new(payments), Arc::new(notifier))
        .with_fees(config.fees.clone())
        .with_reference_length(config.order_reference_length)
        .with_ticket_options(TicketDocumentOptions {
            organiser: config.ticket_organiser.clone(),
        });

    let app = create_app(ctx, allowed_origin);

    // Bind and serve
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
