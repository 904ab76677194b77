//! Expiration sweep entrypoint.
//!
//! Runs one pass of the expiration sweeper and exits, intended to be invoked
//! periodically by an external scheduler such as cron. Plan and reminder
//! mutations from mentors go through the library API behind a separate
//! service layer; this binary only advances statuses by elapsed time.

use dotenvy::dotenv;
use mentor_billing::{clock::Clock, config, core::sweeper, errors::Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing as early as possible
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load .env if present; env vars can also be set externally
    dotenv().ok();

    let db = config::database::create_connection().await?;
    config::database::create_tables(&db).await?;
    info!("database ready at {}", config::database::get_database_url());

    let outcome = sweeper::process_expirations(&db, &Clock::system()).await?;
    info!(
        expired = outcome.expired,
        notified = outcome.notified,
        "expiration sweep finished"
    );

    Ok(())
}
