//! Conversions between Rust values and [`Datum`]s.
//!
//! Fixed-width values are encoded by value and never allocate. Text and byte
//! sequences are encoded as varlenas allocated in the memory context the
//! caller passes in.

use crate::error::AdapterError;
use crate::mem::MemCx;
use crate::pg_sys::{self, varlena, Datum, Oid};
use crate::varlena::{alloc_varlena, as_bytes, detoast};
use core::ffi::{c_char, CStr};
use core::ptr::NonNull;

/// Conversion of a Rust value into a `Datum` to hand back to Postgres.
///
/// `None` means SQL `NULL`.
pub trait IntoDatum {
    fn into_datum(self, mcx: &MemCx<'_>) -> Option<Datum>;

    /// The SQL type whose `Datum` representation `into_datum` produces.
    fn type_oid() -> Oid;
}

/// Conversion of a `Datum` received from Postgres into a Rust value.
pub trait FromDatum: Sized {
    /// Returns `None` when `is_null` is set.
    ///
    /// # Safety
    ///
    /// Unless `is_null` is set, `datum` must hold a value of the SQL type
    /// this implementation decodes. Nothing checks that it does.
    unsafe fn from_datum(datum: Datum, is_null: bool) -> Option<Self>;
}

macro_rules! by_value {
    ($($t:ty => $oid:ident, $get:ident, $put:ident;)*) => {$(
        impl IntoDatum for $t {
            #[inline]
            fn into_datum(self, _mcx: &MemCx<'_>) -> Option<Datum> {
                Some(pg_sys::$put(self))
            }

            #[inline]
            fn type_oid() -> Oid {
                pg_sys::$oid
            }
        }

        impl FromDatum for $t {
            #[inline]
            unsafe fn from_datum(datum: Datum, is_null: bool) -> Option<$t> {
                if is_null { None } else { Some(pg_sys::$get(datum)) }
            }
        }
    )*};
}

// Postgres has no unsigned integers. Unsigned values are zero-extended into
// the word, so they decode correctly as the next wider signed type.
by_value! {
    bool => BOOLOID, DatumGetBool, BoolGetDatum;
    i16 => INT2OID, DatumGetInt16, Int16GetDatum;
    u16 => INT4OID, DatumGetUInt16, UInt16GetDatum;
    i32 => INT4OID, DatumGetInt32, Int32GetDatum;
    u32 => INT8OID, DatumGetUInt32, UInt32GetDatum;
    i64 => INT8OID, DatumGetInt64, Int64GetDatum;
    f32 => FLOAT4OID, DatumGetFloat4, Float4GetDatum;
    f64 => FLOAT8OID, DatumGetFloat8, Float8GetDatum;
}

impl IntoDatum for () {
    #[inline]
    fn into_datum(self, _mcx: &MemCx<'_>) -> Option<Datum> {
        Some(void_datum())
    }

    fn type_oid() -> Oid {
        pg_sys::VOIDOID
    }
}

impl<T: IntoDatum> IntoDatum for Option<T> {
    #[inline]
    fn into_datum(self, mcx: &MemCx<'_>) -> Option<Datum> {
        self.and_then(|v| v.into_datum(mcx))
    }

    fn type_oid() -> Oid {
        T::type_oid()
    }
}

impl IntoDatum for &str {
    fn into_datum(self, mcx: &MemCx<'_>) -> Option<Datum> {
        Some(str_to_datum(mcx, self))
    }

    fn type_oid() -> Oid {
        pg_sys::TEXTOID
    }
}

impl IntoDatum for String {
    fn into_datum(self, mcx: &MemCx<'_>) -> Option<Datum> {
        self.as_str().into_datum(mcx)
    }

    fn type_oid() -> Oid {
        pg_sys::TEXTOID
    }
}

impl IntoDatum for &[u8] {
    fn into_datum(self, mcx: &MemCx<'_>) -> Option<Datum> {
        Some(bytes_to_datum(mcx, self))
    }

    fn type_oid() -> Oid {
        pg_sys::BYTEAOID
    }
}

impl IntoDatum for Vec<u8> {
    fn into_datum(self, mcx: &MemCx<'_>) -> Option<Datum> {
        self.as_slice().into_datum(mcx)
    }

    fn type_oid() -> Oid {
        pg_sys::BYTEAOID
    }
}

/// Errors are returned to SQL as their message text.
impl IntoDatum for AdapterError {
    fn into_datum(self, mcx: &MemCx<'_>) -> Option<Datum> {
        self.to_string().into_datum(mcx)
    }

    fn type_oid() -> Oid {
        pg_sys::TEXTOID
    }
}

/// Text is copied out of Postgres memory. Invalid UTF-8 is replaced rather
/// than rejected; use [`datum_to_string`] to reject it.
impl FromDatum for String {
    unsafe fn from_datum(datum: Datum, is_null: bool) -> Option<String> {
        if is_null {
            return None;
        }
        let bytes = as_bytes(detoast(datum.cast_mut_ptr()));
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}

impl FromDatum for Vec<u8> {
    unsafe fn from_datum(datum: Datum, is_null: bool) -> Option<Vec<u8>> {
        if is_null {
            return None;
        }
        Some(as_bytes(detoast(datum.cast_mut_ptr())).to_vec())
    }
}

/// `PG_RETURN_VOID()`
#[inline]
pub fn void_datum() -> Datum {
    Datum::null()
}

/// `CStringGetDatum(cstring_to_text(value))`: a `text` allocated in `mcx`.
pub fn cstring_to_datum(mcx: &MemCx<'_>, value: &CStr) -> Datum {
    bytes_to_datum(mcx, value.to_bytes())
}

/// A `text` allocated in `mcx`.
pub fn str_to_datum(mcx: &MemCx<'_>, value: &str) -> Datum {
    bytes_to_datum(mcx, value.as_bytes())
}

/// A `bytea` (or `text`, the layout is the same) allocated in `mcx`.
pub fn bytes_to_datum(mcx: &MemCx<'_>, value: &[u8]) -> Datum {
    Datum::from(alloc_varlena(mcx, value).as_ptr())
}

/// `text_to_cstring`: a NUL-terminated copy of a `text` datum, allocated in
/// `mcx`.
///
/// # Safety
///
/// `datum` must point to a valid `text`.
pub unsafe fn datum_to_cstring(mcx: &MemCx<'_>, datum: Datum) -> NonNull<c_char> {
    let text = detoast(datum.cast_mut_ptr::<varlena>());
    let bytes = as_bytes(text);
    let dst = mcx.alloc_bytes(bytes.len() + 1);
    core::ptr::copy_nonoverlapping(bytes.as_ptr(), dst.as_ptr(), bytes.len());
    dst.as_ptr().add(bytes.len()).write(0);
    dst.cast()
}

/// An owned copy of a `text` datum.
///
/// # Safety
///
/// `datum` must point to a valid `text`.
pub unsafe fn datum_to_string(datum: Datum) -> Result<String, AdapterError> {
    let bytes = as_bytes(detoast(datum.cast_mut_ptr::<varlena>()));
    Ok(core::str::from_utf8(bytes)?.to_owned())
}

/// An owned copy of a `bytea` datum.
///
/// # Safety
///
/// `datum` must point to a valid `bytea`.
pub unsafe fn datum_to_bytes(datum: Datum) -> Vec<u8> {
    as_bytes(detoast(datum.cast_mut_ptr::<varlena>())).to_vec()
}
