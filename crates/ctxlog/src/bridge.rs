//! Routes `tracing` events through a facade
//!
//! Installing a [`FacadeLayer`] lets library code instrumented with
//! `tracing` land in the same JSON stream as direct facade calls, with the
//! configured event rules applied.
//!
//! ```
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let subscriber = tracing_subscriber::registry().with(ctxlog::FacadeLayer::global());
//! tracing::subscriber::with_default(subscriber, || {
//!     tracing::info!(user = "ann", "signed in");
//! });
//! ```

use std::fmt;
use std::sync::Arc;

use ctxlog_core_types::schema::FIELD_TARGET;
use ctxlog_core_types::RequestContext;
use serde_json::Value;
use tracing::field::{Field, Visit};
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::facade::Facade;
use crate::level::Level;

enum Target {
    Global,
    Owned(Arc<Facade>),
}

pub struct FacadeLayer {
    target: Target,
}

impl FacadeLayer {
    /// Forward into the process-wide facade
    pub fn global() -> Self {
        Self {
            target: Target::Global,
        }
    }

    /// Forward into a specific facade
    pub fn new(facade: Arc<Facade>) -> Self {
        Self {
            target: Target::Owned(facade),
        }
    }

    fn facade(&self) -> &Facade {
        match &self.target {
            Target::Global => crate::global(),
            Target::Owned(facade) => facade.as_ref(),
        }
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(&'static str, Value)>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.push((field.name(), value));
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, Value::String(value.to_string()));
    }
}

impl<S> Layer<S> for FacadeLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() == crate::DIAGNOSTICS_TARGET {
            return;
        }
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let level = Level::from(*metadata.level());
        let record = self
            .facade()
            .log_at(level, &RequestContext::background())
            .str(FIELD_TARGET, metadata.target());
        let record = visitor
            .fields
            .into_iter()
            .fold(record, |record, (key, value)| record.any(key, &value));

        record.msg(visitor.message.as_deref().unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options;
    use crate::test_capture::CaptureBuffer;
    use tracing_subscriber::layer::SubscriberExt;

    fn capture() -> (Arc<Facade>, CaptureBuffer) {
        let buf = CaptureBuffer::new();
        let facade = Arc::new(Facade::new());
        facade.configure([
            options::writer(buf.clone()),
            options::event_fields(|_, e| e.str("bridged", "yes")),
        ]);
        (facade, buf)
    }

    #[test]
    fn test_tracing_event_is_forwarded() {
        let (facade, buf) = capture();
        let subscriber = tracing_subscriber::registry().with(FacadeLayer::new(facade));

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(attempts = 3, user = "ann", "retrying");
        });

        let records = buf.records();
        let record = records
            .iter()
            .find(|r| r["message"] == "retrying")
            .expect("forwarded record");
        assert_eq!(record["level"], "warn");
        assert_eq!(record["attempts"], 3);
        assert_eq!(record["user"], "ann");
        assert_eq!(record["bridged"], "yes");
        assert!(record["target"].as_str().unwrap().starts_with("ctxlog"));
    }

    #[test]
    fn test_trace_level_maps_to_debug() {
        let (facade, buf) = capture();
        let subscriber = tracing_subscriber::registry().with(FacadeLayer::new(facade));

        tracing::subscriber::with_default(subscriber, || {
            tracing::trace!("very chatty");
        });

        buf.assert_record_exists(Level::Debug, "very chatty");
    }

    #[test]
    fn test_configure_under_bridge_writes_no_records() {
        let buf = CaptureBuffer::new();
        let facade = Arc::new(Facade::new());
        let subscriber = tracing_subscriber::registry().with(FacadeLayer::new(facade.clone()));

        tracing::subscriber::with_default(subscriber, || {
            facade.configure([options::writer(buf.clone())]);
            facade.info(&RequestContext::background()).msg("hello");
        });

        let records = buf.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["message"], "hello");
    }

    #[test]
    fn test_invalid_env_level_under_bridge_writes_no_records() {
        let buf = CaptureBuffer::new();
        let facade = Arc::new(Facade::new());
        facade.configure([options::writer(buf.clone())]);
        let subscriber = tracing_subscriber::registry().with(FacadeLayer::new(facade));
        std::env::set_var("CTXLOG_TEST_BRIDGE_LEVEL", "shouty");

        tracing::subscriber::with_default(subscriber, || {
            let _ = crate::LoggerConfig::from_env_var("CTXLOG_TEST_BRIDGE_LEVEL");
        });

        assert!(buf.contents().is_empty());
    }
}
