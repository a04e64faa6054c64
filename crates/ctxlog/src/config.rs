//! Logger configuration
//!
//! A [`LoggerConfig`] collects two ordered rule lists and an output
//! destination. It can be built with chained setters or by folding a
//! sequence of [`LoggerOption`]s over an empty record:
//!
//! ```
//! use ctxlog::config::{options, LoggerConfig};
//! use ctxlog::test_capture::CaptureBuffer;
//!
//! let buf = CaptureBuffer::new();
//! let config = LoggerConfig::new().apply([
//!     options::writer(buf.clone()),
//!     options::context_fields(|c| c.str("service", "payments")),
//!     options::event_fields(|ctx, e| match &ctx.trace_id {
//!         Some(id) => e.str("trace_id", id.as_str()),
//!         None => e,
//!     }),
//! ]);
//! assert_eq!(config.context_rules().len(), 1);
//! assert_eq!(config.event_rules().len(), 1);
//! ```

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use ctxlog_core_types::RequestContext;

use crate::event::Event;
use crate::level::Level;
use crate::logger::{Logger, LoggerContext};
use crate::writer::LogWriter;

/// Environment variable read by [`LoggerConfig::from_env`]
pub const LEVEL_ENV_VAR: &str = "CTXLOG_LEVEL";

/// Run once when a logger is built; bakes fixed fields into its context
pub type ContextRule = Arc<dyn Fn(LoggerContext) -> LoggerContext + Send + Sync>;

/// Run on every event started through the facade
pub type EventRule = Arc<dyn Fn(&RequestContext, Event) -> Event + Send + Sync>;

/// One configuration step
pub type LoggerOption = Box<dyn FnOnce(LoggerConfig) -> LoggerConfig + Send>;

#[derive(Clone, Default)]
pub struct LoggerConfig {
    context_rules: Vec<ContextRule>,
    event_rules: Vec<EventRule>,
    writer: Option<LogWriter>,
    level: Level,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty configuration whose minimum level comes from `CTXLOG_LEVEL`
    pub fn from_env() -> Self {
        Self::from_env_var(LEVEL_ENV_VAR)
    }

    /// Same as [`LoggerConfig::from_env`], reading the level from `var`
    ///
    /// An unset variable keeps the default level; an unparsable one is
    /// reported and ignored.
    pub fn from_env_var(var: &str) -> Self {
        let config = Self::new();
        match std::env::var(var) {
            Ok(raw) => match raw.parse::<Level>() {
                Ok(level) => config.with_level(level),
                Err(err) => {
                    tracing::warn!(
                        target: crate::DIAGNOSTICS_TARGET,
                        var,
                        error = %err,
                        "ignoring invalid log level"
                    );
                    config
                }
            },
            Err(_) => config,
        }
    }

    /// Append a rule run once at logger construction
    pub fn with_context_fields<F>(mut self, rule: F) -> Self
    where
        F: Fn(LoggerContext) -> LoggerContext + Send + Sync + 'static,
    {
        self.context_rules.push(Arc::new(rule));
        self
    }

    /// Append a rule run on every emitted event
    pub fn with_event_fields<F>(mut self, rule: F) -> Self
    where
        F: Fn(&RequestContext, Event) -> Event + Send + Sync + 'static,
    {
        self.event_rules.push(Arc::new(rule));
        self
    }

    /// Send records to `writer` instead of stdout
    pub fn with_writer<W>(mut self, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.writer = Some(LogWriter::new(writer));
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Fold `options` over this configuration in order
    pub fn apply<I>(self, options: I) -> Self
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        options.into_iter().fold(self, |config, option| option(config))
    }

    pub fn context_rules(&self) -> &[ContextRule] {
        &self.context_rules
    }

    pub fn event_rules(&self) -> &[EventRule] {
        &self.event_rules
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Build the logger and hand back the event rules it must run with
    pub(crate) fn build(self) -> (Logger, Vec<EventRule>) {
        let writer = self.writer.unwrap_or_else(LogWriter::stdout);
        let logger = build_context(writer, &self.context_rules)
            .logger()
            .level(self.level);
        (logger, self.event_rules)
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("context_rules", &self.context_rules.len())
            .field("event_rules", &self.event_rules.len())
            .field("writer", &self.writer)
            .field("level", &self.level)
            .finish()
    }
}

/// Timestamped base context bound to `writer`, with `rules` applied in order
///
/// This is what every configured logger is built from; use it directly to
/// build a standalone logger that shares nothing with the process-wide one.
pub fn create_logger_context<W>(writer: W, rules: &[ContextRule]) -> LoggerContext
where
    W: Write + Send + 'static,
{
    build_context(LogWriter::new(writer), rules)
}

fn build_context(writer: LogWriter, rules: &[ContextRule]) -> LoggerContext {
    rules
        .iter()
        .fold(LoggerContext::bound_to(writer).timestamp(), |ctx, rule| {
            rule(ctx)
        })
}

/// Constructors for [`LoggerOption`]s
pub mod options {
    use super::*;

    pub fn context_fields<F>(rule: F) -> LoggerOption
    where
        F: Fn(LoggerContext) -> LoggerContext + Send + Sync + 'static,
    {
        Box::new(move |config: LoggerConfig| config.with_context_fields(rule))
    }

    pub fn event_fields<F>(rule: F) -> LoggerOption
    where
        F: Fn(&RequestContext, Event) -> Event + Send + Sync + 'static,
    {
        Box::new(move |config: LoggerConfig| config.with_event_fields(rule))
    }

    pub fn writer<W>(writer: W) -> LoggerOption
    where
        W: Write + Send + 'static,
    {
        Box::new(move |config: LoggerConfig| config.with_writer(writer))
    }

    pub fn level(level: Level) -> LoggerOption {
        Box::new(move |config: LoggerConfig| config.with_level(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_capture::CaptureBuffer;

    #[test]
    fn test_default_config_is_empty() {
        let config = LoggerConfig::default();
        assert!(config.context_rules().is_empty());
        assert!(config.event_rules().is_empty());
        assert_eq!(config.level(), Level::Debug);
    }

    #[test]
    fn test_options_apply_in_order() {
        let config = LoggerConfig::new().apply([
            options::level(Level::Warn),
            options::level(Level::Error),
        ]);
        assert_eq!(config.level(), Level::Error);
    }

    #[test]
    fn test_built_logger_is_timestamped() {
        let buf = CaptureBuffer::new();
        let (logger, rules) = LoggerConfig::new().with_writer(buf.clone()).build();

        logger.info().msg("stamped");

        assert!(rules.is_empty());
        let records = buf.records();
        let time = records[0]["time"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
    }

    #[test]
    fn test_context_rules_run_in_order() {
        let buf = CaptureBuffer::new();
        let rules: [ContextRule; 2] = [
            Arc::new(|c: LoggerContext| c.str("service", "first")),
            Arc::new(|c: LoggerContext| c.str("service", "second")),
        ];
        let ctx = create_logger_context(buf.clone(), &rules);

        ctx.logger().info().msg("x");

        assert_eq!(buf.records()[0]["service"], "second");
    }

    #[test]
    fn test_from_env_var_reads_level() {
        std::env::set_var("CTXLOG_TEST_LEVEL_VALID", "warn");
        let config = LoggerConfig::from_env_var("CTXLOG_TEST_LEVEL_VALID");
        assert_eq!(config.level(), Level::Warn);
    }

    #[test]
    fn test_from_env_var_ignores_garbage() {
        std::env::set_var("CTXLOG_TEST_LEVEL_INVALID", "shouty");
        let config = LoggerConfig::from_env_var("CTXLOG_TEST_LEVEL_INVALID");
        assert_eq!(config.level(), Level::Debug);
    }

    #[test]
    fn test_from_env_var_unset_keeps_default() {
        let config = LoggerConfig::from_env_var("CTXLOG_TEST_LEVEL_UNSET");
        assert_eq!(config.level(), Level::Debug);
    }
}
