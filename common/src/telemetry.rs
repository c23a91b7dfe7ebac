//! Provides helper functions for initializing log collection.
use anyhow::Result;
use tracing_subscriber::{filter::LevelFilter, prelude::*, EnvFilter, Registry};

/// Initialize tracing
///
/// Logs are written to stderr so that stdout only carries run output.
pub fn init() -> Result<()> {
    // Default to INFO if no env is specified
    let log_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;

    let logger = tracing_subscriber::fmt::layer()
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(log_filter);

    let collector = Registry::default().with(logger);

    tracing::subscriber::set_global_default(collector)?;

    Ok(())
}
