//! # Memory management
//!
//! Everything `plshim` hands back to Postgres is allocated in a Postgres
//! memory context and is reclaimed when that context is reset. Nothing here
//! ever frees.
//!
//! A [`MemCx<'mcx>`] is a borrowed memory context. Allocations made through it
//! are tied to `'mcx`, and it is forbidden to reset or delete a context while
//! a `MemCx` for it exists. The current context is the only one that safe
//! code may borrow, via [`current_context`], and only for the extent of a
//! closure.
//!
//! Functions that allocate for their caller take the `&MemCx` explicitly.
//! The C ABI exports in [`crate::ffi`] are the exception: their callers have
//! no way to name a context, so they use the current one.

use crate::pg_sys::{MemoryContextData, RawMemCtx};
use core::{ffi::c_void, marker::PhantomData, ptr::NonNull};

/// A borrowed memory context.
pub struct MemCx<'mcx> {
    raw: RawMemCtx,
    _marker: PhantomData<&'mcx MemoryContextData>,
}

impl<'mcx> MemCx<'mcx> {
    /// # Safety
    ///
    /// The context must stay live, and must not be reset, for all of `'mcx`.
    #[inline]
    pub unsafe fn from_raw(raw: RawMemCtx) -> MemCx<'mcx> {
        MemCx { raw, _marker: PhantomData }
    }

    #[inline]
    pub fn raw(&self) -> RawMemCtx {
        self.raw
    }

    /// Uninitialized memory from this context.
    #[inline]
    pub fn alloc_bytes(&self, size: usize) -> NonNull<u8> {
        // SAFETY: a MemCx only exists while its context is live
        unsafe { self.raw.alloc(size).cast() }
    }

    /// A copy of `bytes` living in this context.
    #[inline]
    pub fn copy_bytes(&self, bytes: &[u8]) -> &'mcx mut [u8] {
        unsafe {
            let dst = self.raw.copy_in(bytes.as_ptr(), bytes.len());
            core::slice::from_raw_parts_mut(dst.as_ptr(), bytes.len())
        }
    }

    /// `ret(value, size)`: copy `bytes` into a fresh allocation and return
    /// the copy, which is never the same pointer as the input. Ownership
    /// passes to the context.
    #[inline]
    pub fn ret(&self, bytes: &[u8]) -> NonNull<u8> {
        let dst = self.copy_bytes(bytes);
        tracing::trace!(size = bytes.len(), "ret");
        // SAFETY: derived from a slice
        unsafe { NonNull::new_unchecked(dst.as_mut_ptr()) }
    }

    /// [`MemCx::ret`] for a plain-old-data value.
    #[inline]
    pub fn ret_value<T: bytemuck::Pod>(&self, value: &T) -> NonNull<T> {
        self.ret(bytemuck::bytes_of(value)).cast()
    }
}

/// Borrow `CurrentMemoryContext` for the duration of `f`.
///
/// # Panics
///
/// When no backend is available on this thread.
pub fn current_context<R>(f: impl for<'mcx> FnOnce(&MemCx<'mcx>) -> R) -> R {
    // SAFETY: the context cannot be reset while `f` runs, since only Postgres
    // resets contexts and it is waiting on us
    let mcx = unsafe { MemCx::from_raw(RawMemCtx::current()) };
    f(&mcx)
}

/// `ret` over raw pointers, allocating in the current memory context.
///
/// # Safety
///
/// `value` must be valid for `size` bytes of reads (it may be null when
/// `size` is zero).
pub unsafe fn ret(value: *const c_void, size: usize) -> *mut c_void {
    RawMemCtx::current().copy_in(value.cast(), size).as_ptr().cast()
}
