//! Unified logging module for WellFlow services
//!
//! Console logging with an optional non-blocking file appender. Services
//! call [`init_logging`] once during bootstrap, before any other output.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Custom event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2026-08-07T00:50:44.809Z [INFO] Service started`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m", // magenta
                Level::DEBUG => "\x1b[34m", // blue
                Level::INFO => "\x1b[32m",  // green
                Level::WARN => "\x1b[33m",  // yellow
                Level::ERROR => "\x1b[31m", // red
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Guards for the non-blocking file writers, kept alive for the process
// lifetime so buffered log lines are flushed.
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

fn retain_guard(guard: WorkerGuard) {
    if let Ok(mut guards) = GUARDS.get_or_init(|| Mutex::new(Vec::new())).lock() {
        guards.push(guard);
    }
}

/// Options controlling logger setup
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Default filter directive when `RUST_LOG` is unset, e.g. "info"
    pub default_filter: String,
    /// Service name, used as the log file stem
    pub service_name: String,
    /// Log directory; `None` disables the file appender.
    /// `WELLFLOW_LOG_DIR` overrides this when set.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            service_name: "wellflow".to_string(),
            log_dir: None,
        }
    }
}

/// Initialize global logging for a service
///
/// Console output always; daily-rolling file output when a log directory is
/// configured. Safe to call once per process.
pub fn init_logging(options: &LoggingOptions) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_filter.clone()));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    layers.push(
        tracing_subscriber::fmt::layer()
            .event_format(BracketedLevelFormat)
            .with_writer(std::io::stdout)
            .boxed(),
    );

    let log_dir = std::env::var("WELLFLOW_LOG_DIR")
        .map(PathBuf::from)
        .ok()
        .or_else(|| options.log_dir.clone());
    if let Some(dir) = log_dir {
        let appender =
            tracing_appender::rolling::daily(dir, format!("{}.log", options.service_name));
        let (writer, guard) = tracing_appender::non_blocking(appender);
        retain_guard(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .event_format(BracketedLevelFormat)
                .with_ansi(false)
                .with_writer(writer)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).with(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_level() {
        assert_eq!(format_level(&Level::INFO), "[INFO]");
        assert_eq!(format_level(&Level::ERROR), "[ERROR]");
    }

    #[test]
    fn test_default_options() {
        let options = LoggingOptions::default();
        assert_eq!(options.default_filter, "info");
        assert!(options.log_dir.is_none());
    }
}
