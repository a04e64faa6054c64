//! Loggers and the contexts they are built from
//!
//! A [`LoggerContext`] accumulates fields that are baked into every event
//! of the [`Logger`] it produces. Loggers are immutable and cheap to clone.

use std::error::Error as StdError;
use std::io::Write;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::event::{is_reserved, to_value, Event};
use crate::level::Level;
use crate::writer::LogWriter;

#[derive(Debug, Clone)]
pub(crate) struct LoggerCore {
    pub(crate) writer: LogWriter,
    pub(crate) fields: Map<String, Value>,
    pub(crate) timestamp: bool,
    pub(crate) min_level: Level,
}

/// Handle to a configured logging pipeline
#[derive(Debug, Clone)]
pub struct Logger {
    core: Arc<LoggerCore>,
}

impl Logger {
    /// Logger writing to `writer` with no fields and no timestamp
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        LoggerContext::bound_to(LogWriter::new(writer)).logger()
    }

    /// Start a child context inheriting this logger's fields and sink
    pub fn with(&self) -> LoggerContext {
        LoggerContext {
            core: LoggerCore::clone(&self.core),
        }
    }

    /// Copy of this logger that drops events below `min_level`
    pub fn level(&self, min_level: Level) -> Logger {
        let mut core = LoggerCore::clone(&self.core);
        core.min_level = min_level;
        Logger {
            core: Arc::new(core),
        }
    }

    pub fn min_level(&self) -> Level {
        self.core.min_level
    }

    pub fn debug(&self) -> Event {
        self.log_at(Level::Debug)
    }

    pub fn info(&self) -> Event {
        self.log_at(Level::Info)
    }

    pub fn warn(&self) -> Event {
        self.log_at(Level::Warn)
    }

    pub fn error(&self) -> Event {
        self.log_at(Level::Error)
    }

    pub fn fatal(&self) -> Event {
        self.log_at(Level::Fatal)
    }

    /// Error-level event carrying `err` when present, info-level otherwise
    pub fn err(&self, err: Option<&dyn StdError>) -> Event {
        match err {
            Some(err) => self.log_at(Level::Error).err(Some(err)),
            None => self.log_at(Level::Info),
        }
    }

    pub fn log_at(&self, level: Level) -> Event {
        Event::new(Arc::clone(&self.core), level)
    }
}

/// Builder for the fields shared by every event of a logger
#[derive(Debug, Clone)]
pub struct LoggerContext {
    core: LoggerCore,
}

impl LoggerContext {
    pub(crate) fn bound_to(writer: LogWriter) -> Self {
        Self {
            core: LoggerCore {
                writer,
                fields: Map::new(),
                timestamp: false,
                min_level: Level::Debug,
            },
        }
    }

    /// Stamp every event with the current time
    pub fn timestamp(mut self) -> Self {
        self.core.timestamp = true;
        self
    }

    pub fn str(self, key: &str, value: impl Into<String>) -> Self {
        self.field(key, Value::String(value.into()))
    }

    pub fn int(self, key: &str, value: i64) -> Self {
        self.field(key, Value::from(value))
    }

    pub fn uint(self, key: &str, value: u64) -> Self {
        self.field(key, Value::from(value))
    }

    pub fn float(self, key: &str, value: f64) -> Self {
        self.field(key, Value::from(value))
    }

    pub fn bool(self, key: &str, value: bool) -> Self {
        self.field(key, Value::Bool(value))
    }

    /// Attach any serializable value
    pub fn any<T>(self, key: &str, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        self.field(key, to_value(value))
    }

    pub fn logger(self) -> Logger {
        Logger {
            core: Arc::new(self.core),
        }
    }

    // level and time are stamped per event and cannot be baked in
    fn field(mut self, key: &str, value: Value) -> Self {
        if is_reserved(key) {
            return self;
        }
        self.core.fields.insert(key.to_string(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_capture::CaptureBuffer;

    #[test]
    fn test_context_fields_reach_every_event() {
        let buf = CaptureBuffer::new();
        let logger = LoggerContext::bound_to(LogWriter::new(buf.clone()))
            .str("service", "billing")
            .int("shard", 3)
            .logger();

        logger.info().msg("a");
        logger.warn().msg("b");

        let records = buf.records();
        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record["service"], "billing");
            assert_eq!(record["shard"], 3);
        }
    }

    #[test]
    fn test_context_cannot_replace_level_or_time() {
        let buf = CaptureBuffer::new();
        let rules: [crate::config::ContextRule; 1] =
            [Arc::new(|c: LoggerContext| c.str("level", "custom").str("time", "never"))];
        let logger = crate::create_logger_context(buf.clone(), &rules).logger();

        logger.error().msg("x");

        let records = buf.records();
        assert_eq!(records[0]["level"], "error");
        assert_ne!(records[0]["time"], "never");
    }

    #[test]
    fn test_child_context_does_not_touch_parent() {
        let buf = CaptureBuffer::new();
        let parent = Logger::new(buf.clone());
        let child = parent.with().str("component", "db").logger();

        parent.info().msg("parent");
        child.info().msg("child");

        let records = buf.records();
        assert!(records[0].get("component").is_none());
        assert_eq!(records[1]["component"], "db");
    }

    #[test]
    fn test_err_without_error_is_info() {
        let buf = CaptureBuffer::new();
        let logger = Logger::new(buf.clone());

        logger.err(None).msg("nothing failed");

        let records = buf.records();
        assert_eq!(records[0]["level"], "info");
        assert!(records[0].get("error").is_none());
    }

    #[test]
    fn test_level_returns_filtered_copy() {
        let buf = CaptureBuffer::new();
        let logger = Logger::new(buf.clone());
        let quiet = logger.level(Level::Warn);

        quiet.info().msg("dropped");
        quiet.warn().msg("kept");
        logger.info().msg("unfiltered");

        assert_eq!(quiet.min_level(), Level::Warn);
        assert_eq!(logger.min_level(), Level::Debug);
        let messages: Vec<_> = buf
            .records()
            .iter()
            .map(|r| r["message"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(messages, vec!["kept", "unfiltered"]);
    }
}
