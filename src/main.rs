//! Smiles Intake - incident registration for airline customer-service agents.
//!
//! # API Endpoints
//!
//! - `GET /screen` - Current screen
//! - `POST /form/fields/:field` - Edit one form field
//! - `POST /form/submit` - Submit the form for enrichment and storage
//! - `POST /form/reset` - Start a new record
//! - `POST /view/admin` - Open the admin view with the shared password
//! - `POST /view/entry` - Back to the entry form
//! - `GET /admin/records` - List stored records
//! - `GET /admin/records/:id` - Record details
//! - `GET /health` - Health check

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use smiles_intake::api::router;
use smiles_intake::config::Config;
use smiles_intake::enrichment::GeminiEnricher;
use smiles_intake::shell::Shell;
use smiles_intake::storage::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default level keeps record contents out of the logs.
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("smiles_intake=info".parse()?))
        .init();

    let config = Config::from_env();
    info!(
        port = config.port,
        db_url = %config.database_url,
        model = %config.gemini.model,
        "Starting Smiles Intake"
    );

    if config.gemini.api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; every summary will be the fallback");
    }

    let store = SqliteStore::new(&config.database_url).await?;
    info!("Database initialized");

    let enricher = GeminiEnricher::new(config.gemini.clone());
    let shell = Shell::start(Arc::new(enricher), Arc::new(store)).await?;

    let app = router(Arc::new(shell));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Smiles Intake is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
