// crates/role-reactor-service/src/main.rs
// ============================================================================
// Module: Role Reactor Daemon Entry Point
// Description: Wires the reactor loop to its store, queue, and notify sink.
// Purpose: Run the command reactor as a long-lived service process.
// Dependencies: clap, role-reactor-config, role-reactor-core,
//               role-reactor-store-sqlite, role-reactor-transport, tracing
// ============================================================================

//! ## Overview
//! `role-reactord` loads configuration, opens the `SQLite` role store and the
//! spool queue, selects a notify sink, and runs the reactor loop until the
//! process is stopped. Startup fails closed: any missing or invalid
//! collaborator aborts before the first message is consumed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::convert::Infallible;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use role_reactor_config::ConfigError;
use role_reactor_config::ReactorConfig;
use role_reactor_core::DispatchConfig;
use role_reactor_core::Reactor;
use role_reactor_core::ReactorBuildError;
use role_reactor_core::ReactorBuilder;
use role_reactor_service::StoredPolicyRollback;
use role_reactor_service::SystemClock;
use role_reactor_store_sqlite::SqliteRoleStore;
use role_reactor_store_sqlite::SqliteRoleStoreConfig;
use role_reactor_transport::LogNotifier;
use role_reactor_transport::SpoolQueue;
use role_reactor_transport::WebhookNotifier;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI
// ============================================================================

/// Command-line arguments for the reactor daemon.
#[derive(Debug, Parser)]
#[command(name = "role-reactord", version, about = "Role command reactor daemon")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Startup errors for the reactor daemon.
#[derive(Debug, Error)]
enum ServiceError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Role store could not be opened.
    #[error("role store startup failed: {0}")]
    Store(String),
    /// Command queue could not be opened.
    #[error("command queue startup failed: {0}")]
    Queue(String),
    /// Notify sink could not be constructed.
    #[error("notify sink startup failed: {0}")]
    Notify(String),
    /// Reactor wiring is incomplete.
    #[error(transparent)]
    Build(#[from] ReactorBuildError),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Daemon entry point returning an exit code.
fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(never) => match never {},
        Err(err) => {
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "role-reactord: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the tracing subscriber from the environment.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Loads configuration, wires collaborators, and runs the loop forever.
fn run() -> Result<Infallible, ServiceError> {
    let cli = Cli::parse();
    let config = ReactorConfig::load(cli.config.as_deref())?;

    let store = SqliteRoleStore::open(&SqliteRoleStoreConfig::new(&config.store.path))
        .map_err(|err| ServiceError::Store(err.to_string()))?;
    let queue = SpoolQueue::open(&config.queue.spool_dir)
        .map_err(|err| ServiceError::Queue(err.to_string()))?;

    let builder = Reactor::builder()
        .store(store)
        .source(queue)
        .rollback(StoredPolicyRollback::new(Arc::new(SystemClock)))
        .clock(SystemClock)
        .config(DispatchConfig {
            opt_out_period_days: config.reactor.opt_out_period_days,
        })
        .poll_wait(Duration::from_secs(config.reactor.poll_wait_secs));
    let builder = attach_sink(builder, &config)?;

    let reactor = builder.build()?;
    info!(
        store = %config.store.path.display(),
        spool = %config.queue.spool_dir.display(),
        "role reactor started"
    );
    reactor.run()
}

/// Attaches the configured notify sink to the builder.
fn attach_sink(
    builder: ReactorBuilder,
    config: &ReactorConfig,
) -> Result<ReactorBuilder, ServiceError> {
    match &config.notify.webhook_url {
        Some(url) => {
            let sink = WebhookNotifier::new(url.clone())
                .map_err(|err| ServiceError::Notify(err.to_string()))?;
            Ok(builder.sink(sink))
        }
        None => {
            info!("no webhook configured; replies go to the log");
            Ok(builder.sink(LogNotifier::new()))
        }
    }
}
