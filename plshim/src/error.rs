use crate::pg_sys;
use core::str::Utf8Error;

fn spi_code_name(code: &i32) -> String {
    pg_sys::SPI_result_code_string(*code).to_string_lossy().into_owned()
}

/// Failures reported by the checked half of the API.
///
/// The unchecked accessors never produce these: calling them with a bad
/// index or the wrong type is a contract violation, not an error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("argument {index} is out of range for a call with {nargs} arguments")]
    ArgumentOutOfRange { index: usize, nargs: usize },

    #[error("argument {0} is NULL")]
    NullArgument(usize),

    #[error("row {row} is out of range for a result of {processed} rows")]
    RowOutOfRange { row: usize, processed: usize },

    #[error("column {column} is out of range for a descriptor with {natts} attributes")]
    ColumnOutOfRange { column: usize, natts: usize },

    #[error("{operation} failed: {}", spi_code_name(.code))]
    Spi { operation: &'static str, code: i32 },

    #[error("statement expects {expected} parameters, {given} were given")]
    ArgumentCount { expected: usize, given: usize },

    #[error("query returned {0} rows where exactly one was expected")]
    NotOneRow(usize),

    #[error("function was not called as a trigger")]
    NotATrigger,

    #[error("text value is not valid UTF-8")]
    InvalidUtf8(#[from] Utf8Error),

    #[error("could not install the tracing subscriber: {0}")]
    Tracing(String),
}
