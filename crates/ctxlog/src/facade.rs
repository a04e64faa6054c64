//! The logger facade
//!
//! A [`Facade`] owns the active logger together with the event rules it was
//! configured with. Both live in one immutable snapshot that `configure`
//! replaces wholesale, so a level call never sees a logger from one
//! configuration paired with rules from another.

use std::error::Error as StdError;
use std::sync::{Arc, PoisonError, RwLock};

use ctxlog_core_types::RequestContext;

use crate::config::{EventRule, LoggerConfig, LoggerOption};
use crate::event::Event;
use crate::level::Level;
use crate::logger::Logger;

struct Snapshot {
    logger: Logger,
    event_rules: Vec<EventRule>,
}

impl Snapshot {
    fn from_config(config: LoggerConfig) -> Self {
        let (logger, event_rules) = config.build();
        Self {
            logger,
            event_rules,
        }
    }
}

pub struct Facade {
    current: RwLock<Arc<Snapshot>>,
}

impl Facade {
    /// Facade with an unconfigured, timestamped stdout logger and no rules
    pub fn new() -> Self {
        Self::with_config(LoggerConfig::default())
    }

    pub fn with_config(config: LoggerConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::from_config(config))),
        }
    }

    /// Replace the active configuration with one built from `options`
    ///
    /// Options are applied to an empty configuration; nothing carries over
    /// from a previous call.
    pub fn configure<I>(&self, options: I) -> Logger
    where
        I: IntoIterator<Item = LoggerOption>,
    {
        self.configure_with(LoggerConfig::new().apply(options))
    }

    /// Replace the active configuration with `config`
    pub fn configure_with(&self, config: LoggerConfig) -> Logger {
        let context_rules = config.context_rules().len();
        let snapshot = Arc::new(Snapshot::from_config(config));
        let logger = snapshot.logger.clone();
        let event_rules = snapshot.event_rules.len();

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;

        // Lock released above; FacadeLayer drops this target so nothing is written
        tracing::debug!(
            target: crate::DIAGNOSTICS_TARGET,
            context_rules,
            event_rules,
            "logger configured"
        );
        logger
    }

    /// The active logger, without event rules
    pub fn logger(&self) -> Logger {
        self.snapshot().logger.clone()
    }

    pub fn debug(&self, ctx: &RequestContext) -> Event {
        self.start(ctx, |logger| logger.debug())
    }

    pub fn info(&self, ctx: &RequestContext) -> Event {
        self.start(ctx, |logger| logger.info())
    }

    pub fn warn(&self, ctx: &RequestContext) -> Event {
        self.start(ctx, |logger| logger.warn())
    }

    pub fn error(&self, ctx: &RequestContext) -> Event {
        self.start(ctx, |logger| logger.error())
    }

    pub fn fatal(&self, ctx: &RequestContext) -> Event {
        self.start(ctx, |logger| logger.fatal())
    }

    /// Error-level event carrying `err`, or info-level when `err` is `None`
    pub fn err(&self, ctx: &RequestContext, err: Option<&dyn StdError>) -> Event {
        self.start(ctx, |logger| logger.err(err))
    }

    pub fn log_at(&self, level: Level, ctx: &RequestContext) -> Event {
        self.start(ctx, |logger| logger.log_at(level))
    }

    fn start<F>(&self, ctx: &RequestContext, begin: F) -> Event
    where
        F: FnOnce(&Logger) -> Event,
    {
        let snapshot = self.snapshot();
        let event = begin(&snapshot.logger).ctx(ctx);
        snapshot
            .event_rules
            .iter()
            .fold(event, |event, rule| rule(ctx, event))
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for Facade {
    fn default() -> Self {
        Self::new()
    }
}
