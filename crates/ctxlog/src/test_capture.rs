//! In-memory destination for asserting on emitted records
//!
//! `CaptureBuffer` is a cloneable `Write` sink. Hand one clone to
//! `with_writer` and keep the other to inspect what was written.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::level::Level;

/// Shared byte buffer that records every line written to it
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        let bytes = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// One parsed JSON value per written line; lines that are not JSON are skipped
    pub fn records(&self) -> Vec<Value> {
        self.contents()
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Count records matching a predicate
    pub fn count_records<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Value) -> bool,
    {
        self.records().iter().filter(|r| predicate(r)).count()
    }

    /// Assert that a record with the given level and message was written
    ///
    /// # Panics
    ///
    /// Panics if no such record is found
    pub fn assert_record_exists(&self, level: Level, message: &str) {
        let records = self.records();
        let found = records.iter().any(|r| {
            r["level"].as_str() == Some(level.as_str()) && r["message"].as_str() == Some(message)
        });
        assert!(
            found,
            "Expected record level={} message={:?} not found in {} captured records",
            level,
            message,
            records.len()
        );
    }

    pub fn clear(&self) {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
