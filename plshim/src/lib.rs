//! `plshim` turns the macros a C extension uses to talk to Postgres' function
//! manager (`PG_GETARG_*`, `*GetDatum`, `VARSIZE`, `SPI_getbinval`, `palloc`,
//! `elog`, `CALLED_AS_TRIGGER`) into ordinary functions, so that a runtime which cannot run the C
//! preprocessor can still implement Postgres functions.
//!
//! There are two surfaces:
//!
//! - the Rust API in [`fcinfo`], [`datum`], [`array`], [`spi`], [`trigger`],
//!   [`varlena`], [`mem`] and [`elog`], which makes the memory context and
//!   nullability explicit;
//! - the [`ffi`] module, a flat catalogue of `extern "C"` functions with the
//!   names foreign runtimes link against.
//!
//! Neither surface checks types: a `Datum` is decoded as whatever the caller
//! says it is.

pub mod array;
pub mod datum;
pub mod elog;
pub mod error;
pub mod fcinfo;
pub mod ffi;
pub mod mem;
pub mod spi;
pub mod trigger;
pub mod varlena;

pub use plshim_pg_sys as pg_sys;

pub use datum::{FromDatum, IntoDatum};
pub use error::AdapterError;
pub use fcinfo::FcInfo;
pub use mem::MemCx;

pub mod prelude {
    pub use crate::datum::{FromDatum, IntoDatum};
    pub use crate::elog::{elog, notice};
    pub use crate::error::AdapterError;
    pub use crate::fcinfo::FcInfo;
    pub use crate::mem::MemCx;
    pub use crate::pg_sys::{self, Datum, ElogLevel};
    pub use crate::spi::{SpiConnection, SpiPlan, SpiRow, SpiRows};
    pub use crate::trigger::{TriggerCall, TriggerLevel, TriggerOp, TriggerWhen};
}
