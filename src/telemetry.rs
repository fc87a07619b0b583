//! Telemetry initialization for the `graphlog` binary.
//!
//! Controlled by `GRAPHLOG_LOG_FORMAT`:
//! - unset → no-op (no subscriber installed)
//! - `"json"` → JSON spans/events to stderr
//! - `"pretty"` → human-readable events to stderr
//!
//! Either way `RUST_LOG` picks the filter, defaulting to `info`. The library
//! never calls this; embedding hosts install their own subscriber.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "GRAPHLOG_LOG_FORMAT";

/// Output format chosen from [`LOG_FORMAT_ENV`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// No subscriber.
    Off,
    /// One JSON object per line.
    Json,
    /// Human-readable lines.
    Pretty,
}

impl LogFormat {
    /// Interpret the variable's value. Unknown values fall back to `Off`.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            Some(v) if v.eq_ignore_ascii_case("pretty") => Self::Pretty,
            None | Some("") => Self::Off,
            Some(other) => {
                eprintln!("warning: {LOG_FORMAT_ENV}={other:?} not recognized, logging disabled");
                Self::Off
            }
        }
    }
}

/// Install a stderr subscriber per `GRAPHLOG_LOG_FORMAT`.
///
/// Returns the format that was selected.
pub fn init() -> LogFormat {
    let format = LogFormat::from_env_value(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Off => {}
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter())
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter())
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
    format
}
