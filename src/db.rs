//! Database helpers for the checkout service.
//!
//! The pool backs the inventory store: the concerts and orders tables.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Type alias for the application database pool.
pub type AppDb = PgPool;

/// Connect to the application database and apply pending migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<AppDb, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Names of the tables in the current schema that match `names`.
///
/// Used at startup so a misconfigured table name fails fast instead of on the
/// first checkout.
pub async fn existing_tables(pool: &AppDb, names: &[&str]) -> Result<Vec<String>, sqlx::Error> {
    let names: Vec<String> = names.iter().map(|name| name.to_lowercase()).collect();
    sqlx::query_scalar(
        "SELECT table_name::text FROM information_schema.tables \
         WHERE table_schema = current_schema() AND table_name = ANY($1)",
    )
    .bind(&names)
    .fetch_all(pool)
    .await
}
