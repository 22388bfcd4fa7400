//! Structured logging setup.
//!
//! The bridge logs through `tracing` everywhere; embedding applications either install
//! their own subscriber or call [`init_observability`] once at startup.

use std::{io, str::FromStr};

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::BridgeError;

/// Log format configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format for development.
    #[default]
    Pretty,
    /// JSON format for production log aggregation.
    Json,
}

impl LogFormat {
    /// Determines log format from the `LOG_FORMAT` environment variable.
    ///
    /// `json` selects [`LogFormat::Json`]; anything else, or no value, selects
    /// [`LogFormat::Pretty`].
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT").ok().and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for LogFormat {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(BridgeError::ConfigError(format!("unknown log format: {other}"))),
        }
    }
}

/// Installs a global `tracing` subscriber writing to stderr.
///
/// The level filter comes from `RUST_LOG` (default `info`). Returns `false` when a
/// global subscriber was already installed, in which case nothing changes.
///
/// # Examples
///
/// ```no_run
/// use m2_commerce_bridge::observability::{LogFormat, init_observability};
///
/// init_observability(LogFormat::Json);
/// ```
pub fn init_observability(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(io::stderr),
            )
            .try_init(),
        LogFormat::Json => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(io::stderr),
            )
            .try_init(),
    };

    installed.is_ok()
}
