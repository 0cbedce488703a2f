//! # ventmond: ventilation controller daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the point store, step store, script runner and timer
//! - Construct the closure controller and its event runner
//! - Run the boot evaluation so the controller catches up with reality
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use ventmon_adapter_http_axum::state::AppState;
use ventmon_adapter_storage_sqlite_sqlx::{SqlitePointStore, SqliteStepStore};
use ventmon_app::condition_evaluator::PointConditionEvaluator;
use ventmon_app::controller::ClosureController;
use ventmon_app::event_bus::InProcessEventBus;
use ventmon_app::runner;
use ventmon_app::timer::TokioTimer;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = ventmon_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Ports
    let points = Arc::new(SqlitePointStore::new(pool.clone()));
    let steps = SqliteStepStore::new(pool);
    let scripts = config.script_runner().build();
    let event_bus = Arc::new(InProcessEventBus::new(256));
    let timer = TokioTimer::new(Arc::clone(&event_bus));

    // Controller
    let controller = Arc::new(ClosureController::new(
        config.controller.clone(),
        Arc::clone(&points),
        PointConditionEvaluator::new(Arc::clone(&points)),
        scripts,
        steps,
        timer,
    ));
    tracing::info!(
        controller = %controller.id(),
        name = %controller.config().name,
        status = %controller.status(),
        "controller configured"
    );

    let events = event_bus.subscribe();
    let runner_handle = tokio::spawn(runner::run(Arc::clone(&controller), events));

    match controller.evaluate().await {
        Ok(outcome) => tracing::info!(?outcome, "boot evaluation done"),
        Err(err) => tracing::error!(%err, "boot evaluation failed"),
    }

    // HTTP
    let state = AppState::from_arcs(Arc::clone(&controller), points, event_bus);
    let app = ventmon_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("ventmond listening on http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runner_handle.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
