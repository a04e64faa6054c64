//! ctxlog - context-carrying structured logging facade
//!
//! One process-wide logger, configured at startup, shared by every call
//! site. Each level function takes the caller's [`RequestContext`] so
//! event rules can attach per-request fields (trace ids, session ids, ...)
//! uniformly, and returns an open [`Event`] to finish with a message.
//!
//! # Usage
//!
//! ```
//! use ctxlog::config::options;
//! use ctxlog::test_capture::CaptureBuffer;
//! use ctxlog::{RequestContext, TraceId};
//!
//! let buf = CaptureBuffer::new();
//! ctxlog::configure([
//!     options::writer(buf.clone()),
//!     options::context_fields(|c| c.str("service", "payments")),
//!     options::event_fields(|ctx, e| match &ctx.trace_id {
//!         Some(id) => e.str("trace_id", id.as_str()),
//!         None => e,
//!     }),
//! ]);
//!
//! let ctx = RequestContext::new().with_trace_id(TraceId::from_string("123456"));
//! ctxlog::info(&ctx).str("order", "o-1").msg("order accepted");
//!
//! assert!(buf.contents().contains("\"trace_id\":\"123456\""));
//! ```

pub mod bridge;
pub mod config;
pub mod errors;
pub mod event;
pub mod facade;
pub mod level;
pub mod logger;
pub mod test_capture;
pub mod writer;

use std::error::Error as StdError;
use std::sync::OnceLock;

pub use bridge::FacadeLayer;
pub use config::{create_logger_context, LoggerConfig, LoggerOption};
pub use ctxlog_core_types::{schema, RequestContext, RequestId, SpanId, TraceId};
pub use errors::{LogError, ParseLevelError, Result};
pub use event::Event;
pub use facade::Facade;
pub use level::Level;
pub use logger::{Logger, LoggerContext};

/// `tracing` target of the crate's own diagnostics; [`FacadeLayer`] never
/// forwards it, so configuring a facade writes no records of its own
pub const DIAGNOSTICS_TARGET: &str = "ctxlog::diagnostics";

static GLOBAL: OnceLock<Facade> = OnceLock::new();

/// The process-wide facade behind the free functions
pub fn global() -> &'static Facade {
    GLOBAL.get_or_init(Facade::new)
}

/// Replace the process-wide configuration with one built from `options`
pub fn configure<I>(options: I) -> Logger
where
    I: IntoIterator<Item = LoggerOption>,
{
    global().configure(options)
}

/// Replace the process-wide configuration with `config`
pub fn configure_with(config: LoggerConfig) -> Logger {
    global().configure_with(config)
}

/// The active process-wide logger
pub fn logger() -> Logger {
    global().logger()
}

/// Debug-level event from the process-wide facade
pub fn debug(ctx: &RequestContext) -> Event {
    global().debug(ctx)
}

/// Info-level event from the process-wide facade
pub fn info(ctx: &RequestContext) -> Event {
    global().info(ctx)
}

/// Warn-level event from the process-wide facade
pub fn warn(ctx: &RequestContext) -> Event {
    global().warn(ctx)
}

/// Error-level event from the process-wide facade
pub fn error(ctx: &RequestContext) -> Event {
    global().error(ctx)
}

/// Finalizing the returned event terminates the process
pub fn fatal(ctx: &RequestContext) -> Event {
    global().fatal(ctx)
}

/// Error-level event with `err` attached; info-level when `err` is `None`
pub fn err(ctx: &RequestContext, err: Option<&dyn StdError>) -> Event {
    global().err(ctx, err)
}
