//! Request logging demonstration
//!
//! Configures the process-wide logger once, then logs a few calls under
//! different request contexts. Run with `CTXLOG_LEVEL=info` to hide the
//! debug record.
//!
//! Key concepts illustrated:
//! 1. Context rules bake fixed fields into every record
//! 2. Event rules copy per-request ids out of the context
//! 3. `err` picks the level from whether an error is present
//! 4. `tracing` events routed through the same pipeline

use std::io;

use ctxlog::schema::{FIELD_REQUEST_ID, FIELD_TRACE_ID};
use ctxlog::{FacadeLayer, LoggerConfig, RequestContext, TraceId};
use tracing_subscriber::layer::SubscriberExt;

fn main() {
    ctxlog::configure_with(
        LoggerConfig::from_env()
            .with_writer(io::stderr())
            .with_context_fields(|c| c.str("service", "checkout").str("version", "1.0"))
            .with_event_fields(|ctx, e| match &ctx.request_id {
                Some(id) => e.str(FIELD_REQUEST_ID, id.as_str()),
                None => e,
            })
            .with_event_fields(|ctx, e| match &ctx.trace_id {
                Some(id) => e.str(FIELD_TRACE_ID, id.as_str()),
                None => e,
            }),
    );

    let ctx = RequestContext::new().with_trace_id(TraceId::new());
    ctxlog::debug(&ctx).str("cart", "c-17").msg("loading cart");
    ctxlog::info(&ctx).int("items", 3).msg("cart loaded");

    let failure = io::Error::new(io::ErrorKind::TimedOut, "payment provider timed out");
    ctxlog::err(&ctx, Some(&failure)).msg("charge failed");
    ctxlog::err(&ctx, None).msg("charge retried");

    let subscriber = tracing_subscriber::registry().with(FacadeLayer::global());
    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!(attempt = 2, "falling back to secondary provider");
    });

    ctxlog::info(&RequestContext::background()).msg("shutting down");
}
