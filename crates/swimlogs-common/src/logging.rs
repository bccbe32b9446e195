//! Logging configuration and initialization
//!
//! All Swimlogs binaries log through `tracing`. This module installs the global
//! subscriber, writing to the console, to a daily rolling file, or to both, in
//! either human-readable text or JSON.
//!
//! Use the structured macros with fields rather than formatting values into
//! the message:
//!
//! ```rust
//! # let training_id = 1;
//! tracing::info!(%training_id, sets = 4, "Training created");
//! ```
//!
//! # Example
//!
//! ```no_run
//! use swimlogs_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

use anyhow::Context;
use std::{path::PathBuf, str::FromStr};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::error::{CommonError, Result};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Output target for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    fn writes_console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn writes_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl FromStr for LogOutput {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(CommonError::invalid("log output", s)),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(CommonError::invalid("log format", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level for events without a more specific directive
    pub level: Level,
    pub output: LogOutput,
    pub format: LogFormat,
    /// Directory for rolling log files, used when output includes a file
    pub log_dir: PathBuf,
    /// File name prefix, e.g. "swimlogs-server" -> "swimlogs-server.2024-01-18"
    pub log_file_prefix: String,
    /// Extra comma separated directives such as "sqlx=warn,tower_http=debug"
    pub filter_directives: Option<String>,
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "swimlogs".to_string(),
            filter_directives: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment variables over an existing configuration
    ///
    /// Recognized variables: `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_DIR`,
    /// `LOG_FILE_PREFIX`, `LOG_FILTER` and `LOG_INCLUDE_LOCATION`.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.level = level
                .parse()
                .map_err(|_| CommonError::invalid("log level", level.as_str()))?;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.output = output.parse()?;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Ok(prefix) = std::env::var("LOG_FILE_PREFIX") {
            self.log_file_prefix = prefix;
        }
        if let Ok(filter) = std::env::var("LOG_FILTER") {
            self.filter_directives = Some(filter);
        }
        if let Ok(value) = std::env::var("LOG_INCLUDE_LOCATION") {
            self.include_location = value.parse().unwrap_or(false);
        }
        Ok(self)
    }
}

/// Builder for [`LogConfig`]
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    pub fn log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn include_location(mut self, include: bool) -> Self {
        self.config.include_location = include;
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Flushes buffered file output when dropped
///
/// Keep it alive for as long as the process logs.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global tracing subscriber
///
/// Fails if a subscriber is already installed or a filter directive does not
/// parse.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<LoggingGuard> {
    let mut filter = EnvFilter::from_default_env().add_directive(config.level.into());
    if let Some(directives) = &config.filter_directives {
        for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
            filter = filter.add_directive(
                directive
                    .parse()
                    .with_context(|| format!("Invalid filter directive '{directive}'"))?,
            );
        }
    }

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.output.writes_console() {
        layers.push(fmt_layer(config, std::io::stdout, true));
    }

    let mut file_guard = None;
    if config.output.writes_file() {
        std::fs::create_dir_all(&config.log_dir).with_context(|| {
            format!("Failed to create log directory {}", config.log_dir.display())
        })?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt_layer(config, writer, false));
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard { _file: file_guard })
}

fn fmt_layer<W>(config: &LogConfig, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer::<Registry>()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(FmtSpan::CLOSE);

    match config.format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_log_output_from_str() {
        assert_eq!("console".parse::<LogOutput>().unwrap(), LogOutput::Console);
        assert_eq!("FILE".parse::<LogOutput>().unwrap(), LogOutput::File);
        assert_eq!("all".parse::<LogOutput>().unwrap(), LogOutput::Both);
        assert!("syslog".parse::<LogOutput>().is_err());
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = LogConfig::builder()
            .level(Level::DEBUG)
            .output(LogOutput::Both)
            .format(LogFormat::Json)
            .log_dir("/var/log/swimlogs")
            .log_file_prefix("test")
            .build();

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.output, LogOutput::Both);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_dir, PathBuf::from("/var/log/swimlogs"));
        assert_eq!(config.log_file_prefix, "test");
    }

    #[test]
    #[serial]
    fn test_env_overrides_base_config() {
        std::env::set_var("LOG_LEVEL", "warn");
        std::env::set_var("LOG_FORMAT", "json");
        std::env::remove_var("LOG_OUTPUT");

        let base = LogConfig::builder().log_file_prefix("swimlogs-server").build();
        let config = base.with_env_overrides().unwrap();

        std::env::remove_var("LOG_LEVEL");
        std::env::remove_var("LOG_FORMAT");

        assert_eq!(config.level, Level::WARN);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Console);
        assert_eq!(config.log_file_prefix, "swimlogs-server");
    }

    #[test]
    #[serial]
    fn test_env_rejects_invalid_level() {
        std::env::set_var("LOG_LEVEL", "loud");
        let result = LogConfig::from_env();
        std::env::remove_var("LOG_LEVEL");

        assert_eq!(result.unwrap_err(), CommonError::invalid("log level", "loud"));
    }

    #[test]
    fn test_file_output_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested");
        let config = LogConfig::builder()
            .output(LogOutput::File)
            .log_dir(&log_dir)
            .build();

        // Another test may already own the global subscriber; the directory is
        // created before installation either way.
        let _ = init_logging(&config);
        assert!(log_dir.is_dir());
    }
}
