//! Tests for `plshim`, run against [`SimBackend`] instead of a live Postgres.

mod framework;
#[cfg(test)]
mod tests;

pub use framework::*;

use plshim::pg_sys::{self, varlena, Datum};

/// A short-header (`VARATT_IS_1B`) varlena, the way Postgres stores small
/// values inside tuples. The returned buffer owns the bytes.
pub fn short_varlena(payload: &[u8]) -> Box<[u8]> {
    let total = pg_sys::VARHDRSZ_SHORT + payload.len();
    assert!(total <= pg_sys::VARATT_SHORT_MAX, "{} bytes do not fit a short header", payload.len());
    let mut buf = vec![0u8; total].into_boxed_slice();
    unsafe { pg_sys::SET_VARSIZE_SHORT(buf.as_mut_ptr().cast::<varlena>(), total) };
    buf[pg_sys::VARHDRSZ_SHORT..].copy_from_slice(payload);
    buf
}

/// A pointer datum for a buffer built by [`short_varlena`].
pub fn short_varlena_datum(buf: &mut [u8]) -> Datum {
    Datum::from(buf.as_mut_ptr())
}

/// The payload of the 4-byte-header varlena `datum` points to.
///
/// # Safety
///
/// `datum` must point to a live, uncompressed varlena with a 4-byte header.
pub unsafe fn varlena_payload<'a>(datum: Datum) -> &'a [u8] {
    let ptr = datum.cast_mut_ptr::<varlena>();
    assert!(!ptr.is_null(), "null varlena");
    let len = pg_sys::VARSIZE(ptr) - pg_sys::VARHDRSZ;
    std::slice::from_raw_parts(pg_sys::VARDATA(ptr), len)
}
