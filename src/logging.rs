//! Structured logging.
//!
//! Every component takes its [`Logger`] as a constructor argument; there is
//! no global logger. Applications build a root logger once with
//! [`configure`] and hand children of it to listers and pollers, while
//! libraries embedding the crate and tests can use [`discard`].

use serde::{Deserialize, Serialize};
use slog::{Discard, Drain, Level, Logger, o};
use std::io::stdout;
use std::sync::Mutex;

/// Supported logging drains.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingDrain {
    /// Log JSON objects to standard output.
    #[default]
    Json,

    /// Human readable lines on the terminal.
    #[cfg(feature = "term-logging")]
    Term,
}

/// Minimum level of records to emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Critical,
    Error,
    Warning,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LoggingLevel> for Level {
    fn from(level: LoggingLevel) -> Level {
        match level {
            LoggingLevel::Critical => Level::Critical,
            LoggingLevel::Error => Level::Error,
            LoggingLevel::Warning => Level::Warning,
            LoggingLevel::Info => Level::Info,
            LoggingLevel::Debug => Level::Debug,
            LoggingLevel::Trace => Level::Trace,
        }
    }
}

impl std::str::FromStr for LoggingLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "error" => Ok(Self::Error),
            "warning" | "warn" => Ok(Self::Warning),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown logging level '{other}'")),
        }
    }
}

/// Logging configuration options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Flush logs asynchronously.
    #[serde(rename = "async", default = "LoggingConfig::default_async")]
    pub async_flush: bool,

    /// The drain to send logs to.
    #[serde(default)]
    pub drain: LoggingDrain,

    #[serde(default)]
    pub level: LoggingLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            async_flush: Self::default_async(),
            drain: LoggingDrain::default(),
            level: LoggingLevel::default(),
        }
    }
}

impl LoggingConfig {
    fn default_async() -> bool {
        true
    }
}

/// Filter by level, optionally flush asynchronously, and attach global tags.
fn into_logger<D>(config: &LoggingConfig, drain: D) -> Logger
where
    D: Drain<Ok = (), Err = slog::Never> + Send + 'static,
{
    let drain = drain.filter_level(config.level.into()).fuse();
    let tags = o!("crate" => env!("CARGO_PKG_NAME"), "version" => env!("CARGO_PKG_VERSION"));
    if config.async_flush {
        Logger::root(slog_async::Async::new(drain).build().fuse(), tags)
    } else {
        Logger::root(Mutex::new(drain).fuse(), tags)
    }
}

/// Creates a [`Logger`] based on the given configuration.
pub fn configure(config: &LoggingConfig) -> Logger {
    match config.drain {
        LoggingDrain::Json => {
            let drain = slog_json::Json::default(stdout()).fuse();
            into_logger(config, Mutex::new(drain).fuse())
        }
        #[cfg(feature = "term-logging")]
        LoggingDrain::Term => {
            let decorator = slog_term::TermDecorator::new().build();
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            into_logger(config, drain)
        }
    }
}

/// A logger that drops every record.
#[must_use]
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}
