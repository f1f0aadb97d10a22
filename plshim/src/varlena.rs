//! Variable-length (`text`, `bytea`, ...) values.

use crate::mem::MemCx;
use crate::pg_sys::{self, varlena, VARHDRSZ};
use core::ptr::NonNull;

/// `VARSIZE(value)`: the stored total size of a 4-byte-header varlena,
/// header included.
///
/// # Safety
///
/// `value` must point to a varlena with a 4-byte header, such as anything
/// that has been through [`detoast`].
#[inline]
pub unsafe fn varsize(value: *const varlena) -> usize {
    pg_sys::VARSIZE(value)
}

/// Total size of an inline or TOAST-pointer varlena, whatever its header.
///
/// # Safety
///
/// `value` must point to a readable varlena header.
#[inline]
pub unsafe fn varsize_any(value: *const varlena) -> usize {
    pg_sys::VARSIZE_ANY(value)
}

/// Payload size of an inline varlena, header excluded.
///
/// # Safety
///
/// `value` must point to a readable varlena header.
#[inline]
pub unsafe fn vardata_len(value: *const varlena) -> usize {
    pg_sys::VARSIZE_ANY_EXHDR(value)
}

/// `pg_detoast_datum`: an uncompressed, 4-byte-header version of `value`.
/// Returns `value` itself when it already is one.
///
/// # Safety
///
/// `value` must point to a valid varlena.
#[inline]
pub unsafe fn detoast(value: *mut varlena) -> *mut varlena {
    if !pg_sys::VARATT_IS_EXTENDED(value) {
        return value;
    }
    pg_sys::backend::with(|b| b.detoast(value))
}

/// The payload of an inline varlena.
///
/// # Safety
///
/// `value` must point to an uncompressed inline varlena (any header size)
/// which outlives `'a`.
#[inline]
pub unsafe fn as_bytes<'a>(value: *const varlena) -> &'a [u8] {
    debug_assert!(!pg_sys::VARATT_IS_1B_E(value), "TOAST pointer must be detoasted first");
    core::slice::from_raw_parts(pg_sys::VARDATA_ANY(value), vardata_len(value))
}

/// A new varlena holding `payload`, allocated in `mcx`. This is
/// `cstring_to_text_with_len` for text and the usual way to build a `bytea`.
pub fn alloc_varlena<'mcx>(mcx: &MemCx<'mcx>, payload: &[u8]) -> NonNull<varlena> {
    let total = VARHDRSZ + payload.len();
    let ptr = mcx.alloc_bytes(total).cast::<varlena>();
    unsafe {
        pg_sys::SET_VARSIZE(ptr.as_ptr(), total);
        core::ptr::copy_nonoverlapping(
            payload.as_ptr(),
            ptr.as_ptr().cast::<u8>().add(VARHDRSZ),
            payload.len(),
        );
    }
    ptr
}
