use anyhow::{Context, Result};
use axum::routing::get;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

use vouch_ledger::api::{create_api_router, ApiState};
use vouch_ledger::audit::{AuditSink, NullSink, WebhookSink};
use vouch_ledger::config::LedgerConfig;
use vouch_ledger::database::DatabasePool;
use vouch_ledger::directory::{IdentityDirectory, StaticDirectory};
use vouch_ledger::ledger::VouchLedger;

#[tokio::main]
async fn main() -> Result<()> {
    let config = LedgerConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        e
    })?;

    init_logging(&config)?;

    info!("Starting vouch ledger service");

    // Immutable process-start timestamp, captured once and passed
    // explicitly to the status endpoint.
    let started_at = Utc::now();

    let db = Arc::new(
        DatabasePool::new(&config.database)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?,
    );
    db.init_schema()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize schema: {}", e))?;

    let audit: Arc<dyn AuditSink> = match &config.audit.webhook_base_url {
        Some(base_url) => {
            info!("Audit notifications enabled via {}", base_url);
            Arc::new(
                WebhookSink::new(
                    base_url.clone(),
                    Duration::from_secs(config.audit.timeout_secs),
                )
                .context("Failed to create audit webhook client")?,
            )
        }
        None => {
            info!("No audit webhook configured; notifications disabled");
            Arc::new(NullSink)
        }
    };

    let ledger = Arc::new(VouchLedger::new(Arc::clone(&db), audit));
    let directory: Arc<dyn IdentityDirectory> = Arc::new(StaticDirectory);

    let state = ApiState {
        ledger,
        db,
        directory,
        started_at,
    };

    let app = create_api_router(state)
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http());

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("Vouch ledger listening on {}", bind_addr);
    info!(
        "Store deadline: {}s, pool size: {}",
        config.database.call_timeout_secs, config.database.max_connections
    );

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &LedgerConfig) -> Result<()> {
    let log_level = match config.logging.level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    Ok(())
}
