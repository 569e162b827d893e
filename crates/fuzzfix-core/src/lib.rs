//! Fuzzfix Core
//!
//! Core components for normalizing C control-flow conditions: a lossless
//! Rowan-based syntax tree, the text edit model, temporary naming, output
//! formatting and configuration.

pub mod autofix;
pub mod config;
pub mod cst; // Concrete Syntax Tree (lossless, Rowan-based)
pub mod diagnostics;
pub mod error;
pub mod formatter;
pub mod naming;
pub mod result;

// Re-export commonly used types
pub use autofix::{AtomicChange, ChangeSet, Edit, generate_unified_diff};
pub use config::{
    ConfigLoader, FormatOptions, FormatterConfiguration, FuzzfixConfig, IndentStyle, RULE_IDS,
    RewriteConfiguration, RewriteSettings,
};
pub use diagnostics::{Diagnostic, LineIndex, Location, Severity};
pub use error::{ErrorKind, FuzzfixError};
pub use formatter::{CFormatter, Formatter, LineEnding, NoopFormatter, formatter_for};
pub use naming::{DEFAULT_TEMP_PREFIX, TempNameGenerator};
pub use result::{Result, ResultExt};

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr so that stdout stays reserved for rewritten source.
/// `RUST_LOG` wins over `default_filter`. Calling this twice is harmless.
pub fn init_tracing(default_filter: &str, format: LogFormat) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
