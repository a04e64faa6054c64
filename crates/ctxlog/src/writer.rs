//! Shared output destination

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::Result;

/// Cloneable handle to the byte sink records are written to
///
/// Every logger built from the same configuration shares one sink. A record
/// is written with a single `write_all` while the lock is held, so lines
/// from concurrent callers never interleave. The sink is never closed here;
/// it is dropped with the last handle.
#[derive(Clone)]
pub struct LogWriter {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl LogWriter {
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            inner: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub(crate) fn write_record(&self, record: &[u8]) -> Result<()> {
        let mut sink = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        sink.write_all(record)?;
        sink.flush()?;
        Ok(())
    }
}

impl fmt::Debug for LogWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogWriter").finish_non_exhaustive()
    }
}
