//! Logging bootstrap and span helpers.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    #[default]
    Pretty,
}

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` level.
///
/// Safe to call more than once; only the first call has an effect.
///
/// ```rust
/// use meter_report_lifecycle::observability::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Pretty);
/// ```
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let result = match format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .try_init(),
        };
        // Another subscriber (e.g. a test harness) may already be installed.
        let _ = result;
    });
}

/// Span wrapping one lifecycle operation.
///
/// Operations that allocate the id pass `None` and fill the field in later
/// with `Span::current().record("report_id", ..)`.
#[must_use]
pub fn lifecycle_span(operation: &'static str, report_id: Option<&str>) -> Span {
    let span = tracing::info_span!("report_lifecycle", op = operation, report_id = tracing::field::Empty);
    if let Some(report_id) = report_id {
        span.record("report_id", report_id);
    }
    span
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(LogFormat::Json);
        init_logging(LogFormat::Pretty);
    }

    #[test]
    fn test_lifecycle_span() {
        let span = lifecycle_span("update_status", Some("YT2025010001"));
        let _guard = span.enter();
        tracing::info!("inside lifecycle span");

        let pending = lifecycle_span("create_yantek_report", None);
        let _guard = pending.enter();
        Span::current().record("report_id", "YT2025010002");
    }
}
