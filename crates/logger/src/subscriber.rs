use std::env::var;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Output format of the log layer, selected with `RUST_LOG_FORMAT`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line human readable output without timestamps
    #[default]
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Unknown values fall back to [`LogFormat::Compact`]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Initialize tracing at `info` unless `RUST_LOG` says otherwise
pub fn init_tracing() {
    init_tracing_with_level(LevelFilter::INFO);
}

/// Initialize tracing with `level` as the default directive.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing_with_level(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT").map(|value| LogFormat::parse(&value));

    let log_layer = match log_format.unwrap_or_default() {
        LogFormat::Json => tracing_subscriber::fmt::layer().json().with_filter(env_filter).boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    if let Err(error) = tracing_subscriber::registry().with(log_layer).try_init() {
        warn!("Tracing subscriber already installed: {error}");
    }
}
