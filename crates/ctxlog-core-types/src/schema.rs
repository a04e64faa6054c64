//! Canonical field keys for emitted records
//!
//! Every record is a single JSON object; these are the names the engine
//! itself writes. Enrichment rules should prefer the correlation keys below
//! so records from different services line up.

// Written by the engine
pub const FIELD_LEVEL: &str = "level";
pub const FIELD_TIME: &str = "time";
pub const FIELD_MESSAGE: &str = "message";
pub const FIELD_ERROR: &str = "error";

// Correlation
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_SPAN_ID: &str = "span_id";
pub const FIELD_SESSION_ID: &str = "session_id";

// Set by the tracing bridge
pub const FIELD_TARGET: &str = "target";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_fields_are_distinct() {
        let fields = [FIELD_LEVEL, FIELD_TIME, FIELD_MESSAGE, FIELD_ERROR];
        for (i, a) in fields.iter().enumerate() {
            for b in &fields[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
