use thiserror::Error;

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;

/// Failures while finalizing an event
///
/// Only [`crate::Event::try_msg`] surfaces these. The other finalizers
/// report them on stderr and carry on, since a logger has nowhere better
/// to log its own failures.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write record: {0}")]
    Write(#[from] std::io::Error),
}

/// Returned when a string does not name a known level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level {0:?} (expected debug, info, warn, error or fatal)")]
pub struct ParseLevelError(pub String);
