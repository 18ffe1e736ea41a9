//! Shop database guard checker entry point.
//!
//! Reads one JSON request per line on stdin and answers one JSON response per
//! line on stdout, so services outside this process can consult the guard.

use anyhow::{Context, Result};
use shopdb_guard::transport::serve;
use shopdb_guard::{AccessGuard, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging to stderr (stdout carries responses)
    init_logging();

    let version = env!("CARGO_PKG_VERSION");
    info!("shopdb-guard v{} starting", version);

    // Load configuration from environment
    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Configuration loaded: max_depth={}, payload_strategy={}, strict_keys={}",
        config.max_depth, config.payload_strategy, config.strict_keys
    );

    let guard = AccessGuard::from_config(&config);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let answered = serve(&guard, stdin.lock(), stdout.lock()).context("stdio transport failed")?;

    info!("Input closed after {} requests", answered);
    Ok(())
}

/// Initialize tracing subscriber with stderr output.
///
/// Logs MUST go to stderr because stdout is used for responses.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,shopdb_guard=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
