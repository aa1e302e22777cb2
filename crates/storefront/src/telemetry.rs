//! Logging and error forwarding.
//!
//! The application logs through `tracing` macros. This module turns an
//! explicit [`LogConfig`] into a subscriber:
//!
//! - Development: every level at or above `min_level` is written to stdout
//!   with an RFC 3339 UTC timestamp and the level tag.
//! - Production: only `ERROR` events are written (to stderr); everything
//!   else is dropped.
//!
//! When a Sentry DSN is configured, error events are also forwarded to
//! Sentry.

use std::str::FromStr;

use sentry::integrations::tracing as sentry_tracing;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

/// Log severity, least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    const fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("invalid log level: {other}")),
        }
    }
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    /// Interpret a mode flag. Only `development` (any case) selects
    /// development; every other value is production.
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        if flag.trim().eq_ignore_ascii_case("development") {
            Self::Development
        } else {
            Self::Production
        }
    }

    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// Logger configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Deployment mode; production only surfaces errors.
    pub environment: Environment,
    /// Minimum level written in development.
    pub min_level: LogLevel,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
    /// Colorize level tags (text format only).
    pub ansi: bool,
    /// Sentry DSN for error forwarding.
    pub sentry_dsn: Option<String>,
    /// Fraction of error events sent to Sentry.
    pub sentry_sample_rate: f32,
}

impl LogConfig {
    /// Every level, colored text.
    #[must_use]
    pub const fn development() -> Self {
        Self {
            environment: Environment::Development,
            min_level: LogLevel::Debug,
            json: false,
            ansi: true,
            sentry_dsn: None,
            sentry_sample_rate: 1.0,
        }
    }

    /// Errors only, JSON lines.
    #[must_use]
    pub const fn production() -> Self {
        Self {
            environment: Environment::Production,
            min_level: LogLevel::Error,
            json: true,
            ansi: false,
            sentry_dsn: None,
            sentry_sample_rate: 1.0,
        }
    }

    /// Lowest level that produces output under this configuration.
    #[must_use]
    pub const fn effective_level(&self) -> LogLevel {
        match self.environment {
            Environment::Development => self.min_level,
            Environment::Production => LogLevel::Error,
        }
    }

    /// Returns `true` if entries at `level` are written.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.effective_level()
    }

    #[must_use]
    pub const fn level_filter(&self) -> LevelFilter {
        self.effective_level().to_level_filter()
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

/// Keeps the Sentry client alive; drop it at shutdown to flush events.
#[must_use = "dropping the guard stops error forwarding"]
pub struct TelemetryGuard {
    _sentry: Option<sentry::ClientInitGuard>,
}

/// Build a subscriber that writes entries admitted by `config` to `make_writer`.
pub fn build_subscriber<W>(
    config: &LogConfig,
    make_writer: W,
) -> impl tracing::Subscriber + for<'a> LookupSpan<'a> + Send + Sync + use<W>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_timer(SystemTime)
            .with_writer(make_writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_timer(SystemTime)
            .with_ansi(config.ansi)
            .with_target(false)
            .with_writer(make_writer)
            .boxed()
    };

    Registry::default()
        .with(config.level_filter())
        .with(fmt_layer)
}

/// Install the global subscriber and, if configured, Sentry.
///
/// Calling this twice keeps the first subscriber.
pub fn init(config: &LogConfig) -> TelemetryGuard {
    let sentry = init_sentry(config);
    let forward = sentry.is_some();

    let installed = if config.environment.is_development() {
        build_subscriber(config, std::io::stdout)
            .with(forward.then(sentry_layer))
            .try_init()
    } else {
        build_subscriber(config, std::io::stderr)
            .with(forward.then(sentry_layer))
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed; keeping it");
    } else {
        tracing::info!(
            environment = config.environment.as_str(),
            level = config.effective_level().as_str(),
            sentry = forward,
            "Logging initialized"
        );
    }

    TelemetryGuard { _sentry: sentry }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &LogConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    Some(sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(config.environment.as_str().into()),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    )))
}

fn sentry_layer<S>() -> sentry_tracing::SentryLayer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    sentry_tracing::layer().event_filter(sentry_event_filter)
}

/// Only errors become Sentry events; warnings and info are kept as breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    /// In-memory sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn lines(&self) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(String::from)
                .collect()
        }
    }

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn emit_one_of_each(config: &LogConfig) -> Vec<String> {
        let capture = Capture::default();
        let subscriber = build_subscriber(config, capture.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("debug entry");
            tracing::info!("info entry");
            tracing::warn!("warn entry");
            tracing::error!(order_id = "o-1", "error entry");
        });
        capture.lines()
    }

    fn plain(mut config: LogConfig) -> LogConfig {
        config.ansi = false;
        config.json = false;
        config
    }

    #[test]
    fn test_development_emits_every_level() {
        let lines = emit_one_of_each(&plain(LogConfig::development()));
        assert_eq!(lines.len(), 4, "{lines:?}");

        for (line, tag) in lines.iter().zip(["DEBUG", "INFO", "WARN", "ERROR"]) {
            assert!(line.contains(tag), "{line}");
        }
    }

    #[test]
    fn test_development_entries_are_timestamped() {
        let lines = emit_one_of_each(&plain(LogConfig::development()));
        let first = lines.first().unwrap();
        let timestamp = first.split_whitespace().next().unwrap();
        assert!(
            chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(),
            "not RFC 3339: {timestamp}"
        );
    }

    #[test]
    fn test_development_respects_min_level() {
        let mut config = plain(LogConfig::development());
        config.min_level = LogLevel::Warn;
        let lines = emit_one_of_each(&config);
        assert_eq!(lines.len(), 2, "{lines:?}");
    }

    #[test]
    fn test_production_emits_only_errors() {
        let lines = emit_one_of_each(&plain(LogConfig::production()));
        assert_eq!(lines.len(), 1, "{lines:?}");
        assert!(lines.first().unwrap().contains("error entry"));
    }

    #[test]
    fn test_production_ignores_min_level() {
        let mut config = plain(LogConfig::production());
        config.min_level = LogLevel::Debug;
        assert_eq!(emit_one_of_each(&config).len(), 1);
    }

    #[test]
    fn test_production_json_lines() {
        let lines = emit_one_of_each(&LogConfig::production());
        assert_eq!(lines.len(), 1);

        let entry: serde_json::Value = serde_json::from_str(lines.first().unwrap()).unwrap();
        assert_eq!(entry["level"], "ERROR");
        assert_eq!(entry["fields"]["message"], "error entry");
        assert_eq!(entry["fields"]["order_id"], "o-1");
        assert!(entry["timestamp"].is_string());
    }

    #[test]
    fn test_enabled() {
        let dev = LogConfig::development();
        assert!(dev.enabled(LogLevel::Debug));

        let prod = LogConfig::production();
        assert!(!prod.enabled(LogLevel::Warn));
        assert!(prod.enabled(LogLevel::Error));
    }

    #[test]
    fn test_environment_flag() {
        assert_eq!(Environment::from_flag("development"), Environment::Development);
        assert_eq!(Environment::from_flag(" Development "), Environment::Development);
        assert_eq!(Environment::from_flag("production"), Environment::Production);
        assert_eq!(Environment::from_flag("staging"), Environment::Production);
        assert_eq!(Environment::from_flag(""), Environment::Production);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert!("trace".parse::<LogLevel>().is_err());
        assert!(LogLevel::Debug < LogLevel::Error);
    }
}
