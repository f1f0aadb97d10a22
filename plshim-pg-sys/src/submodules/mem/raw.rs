//! Low level, unsafe memory context operations.
//!
//! This exists to share code between the safe `MemCx` wrapper and the C ABI
//! exports, which both end up allocating through the backend.

use crate::{backend, MemoryContext, MemoryContextData};
use core::{ffi::c_void, ptr::NonNull};

/// This is a wrapper around a raw [`MemoryContext`].
///
/// It offers slightly more guarantees than a raw pointer (it is never null),
/// but nothing ties its use to the lifetime of the context. That is the job
/// of `plshim::mem::MemCx`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMemCtx {
    ptr: NonNull<MemoryContextData>,
}

impl RawMemCtx {
    /// # Safety
    ///
    /// `p` must be a live memory context, and must stay live for as long as
    /// the returned value is used.
    #[inline]
    #[track_caller]
    pub unsafe fn from_raw(p: MemoryContext) -> Self {
        debug_assert!(!p.is_null(), "null MemoryContext");
        Self { ptr: NonNull::new_unchecked(p) }
    }

    /// The backend's `CurrentMemoryContext`.
    ///
    /// # Safety
    ///
    /// The result must not be used after that context is reset or deleted.
    #[inline]
    pub unsafe fn current() -> Self {
        Self::from_raw(backend::with(|b| b.current_memory_context()))
    }

    #[inline]
    pub fn as_ptr(&self) -> MemoryContext {
        self.ptr.as_ptr()
    }

    /// `MemoryContextAlloc(self, sz)`
    ///
    /// # Safety
    ///
    /// The context must still be live.
    #[inline]
    pub unsafe fn alloc(&self, sz: usize) -> NonNull<c_void> {
        let p = backend::with(|b| b.alloc(self.as_ptr(), sz));
        tracing::trace!(size = sz, ptr = ?p, "palloc");
        // the backend aborts the call instead of returning null
        NonNull::new_unchecked(p)
    }

    /// Allocate `len` bytes and copy them from `src`.
    ///
    /// # Safety
    ///
    /// The context must still be live, and `src` must be valid for `len`
    /// bytes of reads. `src` may be null when `len` is zero.
    #[inline]
    pub unsafe fn copy_in(&self, src: *const u8, len: usize) -> NonNull<u8> {
        let dst = self.alloc(len).cast::<u8>();
        if len > 0 {
            core::ptr::copy_nonoverlapping(src, dst.as_ptr(), len);
        }
        dst
    }
}
