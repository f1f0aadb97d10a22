//! Hand-written equivalents of the parts of the Postgres C ABI that `plshim`
//! needs: the `Datum` word, the V1 function-call info block, `varlena`
//! headers, the handful of SPI/tuple types an adapter reads, array headers,
//! and the trigger event word.
//!
//! Everything here is layout-compatible with Postgres 13 and newer on 64-bit
//! targets. The functions named after Postgres macros (`VARSIZE`,
//! `Int32GetDatum`, ...) behave exactly like the macros they are named after.
//!
//! Calls that need a live backend (allocation, detoasting, attribute
//! extraction, error reporting, SPI, arrays) go through [`backend`].
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]

pub mod array;
pub mod backend;
pub mod datum;
pub mod elog;
pub mod fmgr;
pub mod htup;
pub mod spi;
pub mod submodules;
pub mod trigger;
pub mod varatt;

pub use array::*;
pub use backend::Backend;
pub use datum::*;
pub use elog::ElogLevel;
pub use fmgr::*;
pub use htup::*;
pub use spi::*;
pub use submodules::*;
pub use trigger::*;
pub use varatt::*;

/// Object identifier, `unsigned int` in C.
pub type Oid = u32;

/// `size_t` as spelled by Postgres.
pub type Size = usize;

/// Opaque `Node`. Only ever handled by pointer.
#[repr(C)]
pub struct Node {
    _private: [u8; 0],
}

/// Opaque `MemoryContextData`. Only ever handled by pointer.
#[repr(C)]
pub struct MemoryContextData {
    _private: [u8; 0],
}

pub type MemoryContext = *mut MemoryContextData;

pub const InvalidOid: Oid = 0;
pub const BOOLOID: Oid = 16;
pub const BYTEAOID: Oid = 17;
pub const INT8OID: Oid = 20;
pub const INT2OID: Oid = 21;
pub const INT4OID: Oid = 23;
pub const TEXTOID: Oid = 25;
pub const OIDOID: Oid = 26;
pub const FLOAT4OID: Oid = 700;
pub const FLOAT8OID: Oid = 701;
pub const DATEOID: Oid = 1082;
pub const TIMEOID: Oid = 1083;
pub const TIMESTAMPOID: Oid = 1114;
pub const TIMESTAMPTZOID: Oid = 1184;
pub const INT4ARRAYOID: Oid = 1007;
pub const VOIDOID: Oid = 2278;

// `int8` and `float8` are only pass-by-value when a Datum is 8 bytes wide.
const _: () = assert!(core::mem::size_of::<Datum>() == 8, "plshim requires a 64-bit target");
