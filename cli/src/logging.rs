//! Log setup for the `powchain` binary.
//!
//! The ledger reports bootstrap, mining, and commits as `tracing` events.
//! They go to stderr; stdout is reserved for command output such as the
//! `printchain` listing.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset: ledger warnings, CLI progress.
pub const DEFAULT_FILTER: &str = "powchain=warn,powchain_cli=info";

/// Filter used with `--verbose`: per-block mining and commit events.
pub const VERBOSE_FILTER: &str = "powchain=debug,powchain_cli=debug";

/// Where log lines are meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line text for a terminal.
    Pretty,
    /// One JSON object per event, fields flattened.
    Json,
}

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Panics if a subscriber is already installed.
pub fn init_logging(default_filter: &str, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    tracing::debug!(?format, "logging ready");
}
