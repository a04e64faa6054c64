//! In-flight log events
//!
//! An [`Event`] is one open record at a fixed level. Fields are added by
//! chaining; nothing is written until the event is finalized with
//! [`Event::msg`], [`Event::msgf`], [`Event::send`] or [`Event::try_msg`].
//! Dropping an event without finalizing it discards the record.
//!
//! `level` and `time` belong to the engine: setters given either key leave
//! the record unchanged.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use ctxlog_core_types::schema::{FIELD_ERROR, FIELD_LEVEL, FIELD_MESSAGE, FIELD_TIME};
use ctxlog_core_types::RequestContext;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::level::Level;
use crate::logger::LoggerCore;

/// Exit status used after a fatal record has been written
pub const FATAL_EXIT_CODE: i32 = 1;

#[must_use = "an event is only written once it is finalized with msg, msgf or send"]
pub struct Event {
    core: Arc<LoggerCore>,
    level: Level,
    // None when the level is below the logger's minimum
    fields: Option<Map<String, Value>>,
    ctx: Option<RequestContext>,
}

impl Event {
    pub(crate) fn new(core: Arc<LoggerCore>, level: Level) -> Self {
        let fields = (level >= core.min_level).then(|| {
            let mut fields = Map::new();
            fields.insert(FIELD_LEVEL.to_string(), Value::from(level.as_str()));
            if core.timestamp {
                fields.insert(FIELD_TIME.to_string(), Value::from(now()));
            }
            for (key, value) in &core.fields {
                fields.insert(key.clone(), value.clone());
            }
            fields
        });

        Self {
            core,
            level,
            fields,
            ctx: None,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// False when the logger's minimum level filters this event out
    pub fn enabled(&self) -> bool {
        self.fields.is_some()
    }

    /// Bind the request context this event is emitted under
    pub fn ctx(mut self, ctx: &RequestContext) -> Self {
        self.ctx = Some(ctx.clone());
        self
    }

    /// Context bound with [`Event::ctx`], if any
    pub fn context(&self) -> Option<&RequestContext> {
        self.ctx.as_ref()
    }

    /// Current value of a field, if set
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.as_ref().and_then(|fields| fields.get(key))
    }

    pub fn str(self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, || Value::String(value.into()))
    }

    pub fn int(self, key: &str, value: i64) -> Self {
        self.insert(key, || Value::from(value))
    }

    pub fn uint(self, key: &str, value: u64) -> Self {
        self.insert(key, || Value::from(value))
    }

    pub fn float(self, key: &str, value: f64) -> Self {
        self.insert(key, || Value::from(value))
    }

    pub fn bool(self, key: &str, value: bool) -> Self {
        self.insert(key, || Value::Bool(value))
    }

    /// Attach any serializable value
    pub fn any<T>(self, key: &str, value: &T) -> Self
    where
        T: Serialize + ?Sized,
    {
        self.insert(key, || to_value(value))
    }

    /// Attach the error's description under `error`; `None` leaves the event untouched
    pub fn err(self, err: Option<&dyn StdError>) -> Self {
        match err {
            Some(err) => self.insert(FIELD_ERROR, || Value::String(err.to_string())),
            None => self,
        }
    }

    /// Finalize with `message` and write the record
    ///
    /// Write failures are reported on stderr. A fatal event terminates the
    /// process after writing.
    pub fn msg(self, message: &str) {
        // try_msg reports and exits on its own for fatal events
        if let Err(err) = self.try_msg(message) {
            report(&err);
        }
    }

    pub fn msgf(self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(message) => self.msg(message),
            None => self.msg(&args.to_string()),
        }
    }

    /// Finalize without a message
    pub fn send(self) {
        self.msg("")
    }

    /// Finalize with `message`, returning write failures to the caller
    ///
    /// A fatal event still terminates the process, whether or not the
    /// write succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LogError`] when the record cannot be encoded or the
    /// destination rejects the write.
    pub fn try_msg(self, message: &str) -> Result<()> {
        let fatal = self.level == Level::Fatal;
        let result = self.write(message);
        if fatal {
            if let Err(err) = &result {
                report(err);
            }
            std::process::exit(FATAL_EXIT_CODE);
        }
        result
    }

    fn write(self, message: &str) -> Result<()> {
        let Some(mut fields) = self.fields else {
            return Ok(());
        };
        if !message.is_empty() {
            fields.insert(FIELD_MESSAGE.to_string(), Value::from(message));
        }

        let mut line = serde_json::to_vec(&fields)?;
        line.push(b'\n');
        self.core.writer.write_record(&line)
    }

    fn insert(mut self, key: &str, value: impl FnOnce() -> Value) -> Self {
        if is_reserved(key) {
            return self;
        }
        if let Some(fields) = self.fields.as_mut() {
            fields.insert(key.to_string(), value());
        }
        self
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("level", &self.level)
            .field("fields", &self.fields)
            .field("ctx", &self.ctx)
            .finish()
    }
}

/// Keys written by the engine itself
pub(crate) fn is_reserved(key: &str) -> bool {
    key == FIELD_LEVEL || key == FIELD_TIME
}

pub(crate) fn to_value<T>(value: &T) -> Value
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value).unwrap_or_else(|err| Value::String(err.to_string()))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn report(err: &crate::errors::LogError) {
    eprintln!("ctxlog: could not write event: {err}");
}
