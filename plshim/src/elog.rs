//! Reporting messages to the Postgres log and client.
//!
//! Only the non-aborting levels are reachable from here. Reporting is fire
//! and forget: nothing is returned and nothing is retried.
//!
//! [`ElogWriter`] plugs `elog` into `tracing-subscriber`, so code running
//! inside the backend can use ordinary `tracing` macros and have the output
//! show up as `NOTICE`s (or whichever level is chosen).

use crate::error::AdapterError;
use crate::pg_sys::{backend, ElogLevel};
use once_cell::sync::OnceCell;
use std::ffi::CString;
use std::io;
use tracing_subscriber::{fmt::MakeWriter, EnvFilter};

/// Environment variable read by [`init_tracing_from_env`].
pub const LOG_ENV: &str = "PLSHIM_LOG";

/// `elog(level, "%s", message)`.
///
/// The message is never interpreted as a format string. It is cut at its
/// first NUL byte, if it has one.
pub fn elog(level: ElogLevel, message: &str) {
    let message = match CString::new(message) {
        Ok(message) => message,
        Err(err) => {
            let nul = err.nul_position();
            let mut bytes = err.into_vec();
            bytes.truncate(nul);
            // SAFETY: everything from the first NUL on was just dropped
            unsafe { CString::from_vec_unchecked(bytes) }
        }
    };
    backend::with(|b| b.emit(level, &message));
}

/// `elog(NOTICE, "%s", message)`
#[inline]
pub fn notice(message: &str) {
    elog(ElogLevel::Notice, message)
}

/// A [`MakeWriter`] whose writers report what was written through `elog`.
/// Each writer reports once, when dropped, with trailing newlines trimmed.
#[derive(Debug, Clone, Copy)]
pub struct ElogWriter {
    level: ElogLevel,
}

impl ElogWriter {
    pub fn new(level: ElogLevel) -> ElogWriter {
        ElogWriter { level }
    }
}

impl Default for ElogWriter {
    fn default() -> ElogWriter {
        ElogWriter::new(ElogLevel::Notice)
    }
}

impl<'a> MakeWriter<'a> for ElogWriter {
    type Writer = ElogLine;

    fn make_writer(&'a self) -> ElogLine {
        ElogLine { level: self.level, buf: Vec::new() }
    }
}

/// A buffered message, reported when dropped.
pub struct ElogLine {
    level: ElogLevel,
    buf: Vec<u8>,
}

impl io::Write for ElogLine {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ElogLine {
    fn drop(&mut self) {
        while self.buf.last() == Some(&b'\n') {
            self.buf.pop();
        }
        // tracing events can fire on threads that never entered a backend
        if self.buf.is_empty() || !backend::is_available() {
            return;
        }
        elog(self.level, &String::from_utf8_lossy(&self.buf));
    }
}

static TRACING: OnceCell<()> = OnceCell::new();

/// Install a global `tracing` subscriber that reports through `elog` at
/// `level`, filtered by `directives` (`EnvFilter` syntax). Only the first
/// successful call has any effect.
pub fn init_tracing(directives: &str, level: ElogLevel) -> Result<(), AdapterError> {
    TRACING.get_or_try_init(|| {
        let filter =
            EnvFilter::try_new(directives).map_err(|e| AdapterError::Tracing(e.to_string()))?;
        install(filter, level)
    })?;
    Ok(())
}

/// [`init_tracing`] with directives from `PLSHIM_LOG`, defaulting to
/// `warn`.
pub fn init_tracing_from_env(level: ElogLevel) -> Result<(), AdapterError> {
    TRACING.get_or_try_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
        install(filter, level)
    })?;
    Ok(())
}

fn install(filter: EnvFilter, level: ElogLevel) -> Result<(), AdapterError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(ElogWriter::new(level))
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .try_init()
        .map_err(|e| AdapterError::Tracing(e.to_string()))
}
