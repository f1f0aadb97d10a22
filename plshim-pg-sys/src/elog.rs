//! Message severities accepted by `elog`.

use core::ffi::c_int;

/// The non-aborting `elog` levels.
///
/// `ERROR` and above are deliberately absent: reporting them `longjmp`s out
/// of the caller, which must never happen across Rust frames.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElogLevel {
    Debug5 = 10,
    Debug4 = 11,
    Debug3 = 12,
    Debug2 = 13,
    Debug1 = 14,
    Log = 15,
    Info = 17,
    Notice = 18,
    Warning = 19,
}

impl ElogLevel {
    #[inline]
    pub const fn as_c_int(self) -> c_int {
        self as c_int
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ElogLevel::Debug5
            | ElogLevel::Debug4
            | ElogLevel::Debug3
            | ElogLevel::Debug2
            | ElogLevel::Debug1 => "DEBUG",
            ElogLevel::Log => "LOG",
            ElogLevel::Info => "INFO",
            ElogLevel::Notice => "NOTICE",
            ElogLevel::Warning => "WARNING",
        }
    }
}

impl core::fmt::Display for ElogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
