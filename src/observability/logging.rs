//! Injected structured logging.
//!
//! Components receive an `Arc<dyn Logger>` instead of calling a global.
//! [`TracingLogger`] forwards to `tracing`; hosts decide whether a
//! subscriber is installed, optionally through [`init_tracing`].

use std::fmt;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};
use crate::error::AssignError;

pub trait Logger: Send + Sync {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &dyn fmt::Display)]);
}

fn render_fields(fields: &[(&str, &dyn fmt::Display)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Forwards to the `tracing` macros at the matching level.
///
/// Field names are only known at runtime, so all fields travel in a single
/// `context` field rendered as space-separated `key=value` pairs. JSON output
/// carries that string as is; consumers that need per-key fields should
/// parse `context` or inject their own [`Logger`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        let context = render_fields(fields);
        match level {
            Level::ERROR => tracing::error!(context = %context, "{message}"),
            Level::WARN => tracing::warn!(context = %context, "{message}"),
            Level::INFO => tracing::info!(context = %context, "{message}"),
            Level::DEBUG => tracing::debug!(context = %context, "{message}"),
            _ => tracing::trace!(context = %context, "{message}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: Level, _message: &str, _fields: &[(&str, &dyn fmt::Display)]) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Keeps every record in memory. Meant for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn at_level(&self, level: Level) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.records().iter().any(|record| record.message == message)
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        let record = LogRecord {
            level,
            message: message.to_string(),
            fields: fields
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        };
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record);
    }
}

/// Installs a `tracing_subscriber` fmt subscriber for the host process.
pub fn init_tracing(config: &Config) -> Result<(), AssignError> {
    let filter = EnvFilter::try_new(&config.log_level).map_err(|err| {
        AssignError::InvalidConfig(format!("invalid LOG_LEVEL {}: {err}", config.log_level))
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };

    installed
        .map_err(|err| AssignError::InvalidConfig(format!("failed to install subscriber: {err}")))
}
