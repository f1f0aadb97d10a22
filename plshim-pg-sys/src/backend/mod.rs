//! The seam between `plshim` and the Postgres backend it runs inside.
//!
//! Most of what the adapter does is pure bit-shuffling on `Datum`s and
//! varlena headers. The operations that need the real server are collected
//! in [`Backend`]: allocating in a memory context, detoasting, pulling an
//! attribute out of a tuple, reporting a message, running SPI statements,
//! and building or taking apart arrays.
//!
//! The backend in use is chosen per thread. [`enter`] installs one for the
//! duration of a closure. With the `postgres` feature enabled and nothing
//! entered, [`PgBackend`] is used, which calls straight into the server's
//! exported symbols.

use crate::{ArrayType, Datum, ElogLevel, HeapTuple, MemoryContext, NodeTag, Oid, SPIPlanPtr, SPITupleTable, TupleDesc, varlena};
use core::cell::Cell;
use core::ffi::{c_char, c_int, c_void, CStr};

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use postgres::PgBackend;

/// The Postgres services the adapter layer depends on.
pub trait Backend {
    /// `CurrentMemoryContext`
    fn current_memory_context(&self) -> MemoryContext;

    /// `MemoryContextAlloc(cx, size)`. Never returns null: allocation
    /// failure aborts the current call.
    ///
    /// # Safety
    ///
    /// `cx` must be a live memory context.
    unsafe fn alloc(&self, cx: MemoryContext, size: usize) -> *mut c_void;

    /// `pg_detoast_datum(ptr)`. Returns `ptr` itself when it is already an
    /// uncompressed inline value, and a freshly allocated copy in the current
    /// memory context otherwise.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a valid varlena.
    unsafe fn detoast(&self, ptr: *mut varlena) -> *mut varlena;

    /// `heap_getattr(tuple, attnum, desc, &isnull)`. `attnum` is one-based;
    /// numbers outside `1..=natts` read as NULL.
    ///
    /// # Safety
    ///
    /// `tuple` must be a live tuple described by `desc`.
    unsafe fn heap_getattr(
        &self,
        tuple: HeapTuple,
        desc: TupleDesc,
        attnum: c_int,
    ) -> (Datum, bool);

    /// `elog(level, "%s", message)`. Best effort, never aborts.
    fn emit(&self, level: ElogLevel, message: &CStr);

    /// The `NodeTag` of a `TriggerData`, when known.
    fn trigger_data_tag(&self) -> Option<NodeTag>;

    /// `SPI_connect()`
    ///
    /// # Safety
    ///
    /// Must be called from inside a function invocation.
    unsafe fn spi_connect(&self) -> c_int;

    /// `SPI_finish()`
    ///
    /// # Safety
    ///
    /// Invalidates every tuple table and plan of the connection.
    unsafe fn spi_finish(&self) -> c_int;

    /// `SPI_prepare(query, argtypes.len(), argtypes)`. Null on failure, with
    /// the reason in [`Backend::spi_result`].
    ///
    /// # Safety
    ///
    /// Requires an open SPI connection.
    unsafe fn spi_prepare(&self, query: &CStr, argtypes: &[Oid]) -> SPIPlanPtr;

    /// `SPI_execute_plan(plan, values, nulls, read_only, count)`. `nulls`
    /// holds [`SPI_NULL`](crate::SPI_NULL) or
    /// [`SPI_NOT_NULL`](crate::SPI_NOT_NULL) per value.
    ///
    /// # Safety
    ///
    /// `plan` must come from [`Backend::spi_prepare`] on the open connection,
    /// and `values` and `nulls` must have one entry per plan argument.
    unsafe fn spi_execute_plan(
        &self,
        plan: SPIPlanPtr,
        values: &[Datum],
        nulls: &[c_char],
        read_only: bool,
        count: i64,
    ) -> c_int;

    /// `SPI_result`
    fn spi_result(&self) -> c_int;

    /// `SPI_processed`
    fn spi_processed(&self) -> u64;

    /// `SPI_tuptable`
    fn spi_tuptable(&self) -> *mut SPITupleTable;

    /// `construct_md_array` for a one-dimensional array of `elems` with
    /// lower bound 1 and no NULL elements, allocated in the current memory
    /// context.
    ///
    /// # Safety
    ///
    /// Every element must be a valid datum of type `elem_type`.
    unsafe fn construct_array(&self, elems: &[Datum], elem_type: Oid) -> *mut ArrayType;

    /// `deconstruct_array`: the elements of `array` in a fresh allocation
    /// in the current memory context, and their count. NULL elements read
    /// as the zero datum.
    ///
    /// # Safety
    ///
    /// `array` must point to a detoasted array.
    unsafe fn deconstruct_array(&self, array: *mut ArrayType) -> (*mut Datum, usize);
}

thread_local! {
    static ENTERED: Cell<Option<*const dyn Backend>> = const { Cell::new(None) };
}

struct Restore(Option<*const dyn Backend>);

impl Drop for Restore {
    fn drop(&mut self) {
        ENTERED.with(|slot| slot.set(self.0));
    }
}

/// Run `f` with `backend` as this thread's backend. Nested calls stack, and
/// the previous backend is restored when `f` returns or unwinds.
pub fn enter<B, R>(backend: &B, f: impl FnOnce() -> R) -> R
where
    B: Backend + 'static,
{
    let ptr: *const dyn Backend = backend;
    let _restore = Restore(ENTERED.with(|slot| slot.replace(Some(ptr))));
    f()
}

/// Whether a backend is reachable from this thread.
pub fn is_available() -> bool {
    cfg!(feature = "postgres") || ENTERED.with(|slot| slot.get().is_some())
}

/// Call `f` with this thread's backend.
///
/// # Panics
///
/// When no backend was [`enter`]ed on this thread and the `postgres`
/// feature is disabled.
pub fn with<R>(f: impl FnOnce(&dyn Backend) -> R) -> R {
    match ENTERED.with(|slot| slot.get()) {
        // SAFETY: `enter` keeps the pointee borrowed until the slot is restored
        Some(ptr) => f(unsafe { &*ptr }),
        None => fallback(f),
    }
}

#[cfg(feature = "postgres")]
fn fallback<R>(f: impl FnOnce(&dyn Backend) -> R) -> R {
    f(&PgBackend)
}

#[cfg(not(feature = "postgres"))]
fn fallback<R>(_f: impl FnOnce(&dyn Backend) -> R) -> R {
    panic!("no plshim backend entered on this thread; enable the `postgres` feature or call `backend::enter`")
}
