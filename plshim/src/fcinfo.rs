//! Argument access for functions called through the V1 calling convention.
//!
//! Indices are zero-based. The `get_*` accessors are the `PG_GETARG_*`
//! macros: they check neither the index nor the null flag, and they decode
//! the argument as whatever type they are named after. Registration code
//! that has not already enforced arity and strictness should go through
//! [`FcInfo::try_arg`] instead.

use crate::datum::{datum_to_bytes, datum_to_string, FromDatum, IntoDatum};
use crate::error::AdapterError;
use crate::mem::MemCx;
use crate::pg_sys::{self, bytea, text, Datum, FunctionCallInfo, FunctionCallInfoBaseData};
use crate::varlena::detoast;
use core::{marker::PhantomData, ptr::NonNull};

/// A borrowed `FunctionCallInfo`.
pub struct FcInfo<'fcx> {
    ptr: NonNull<FunctionCallInfoBaseData>,
    _marker: PhantomData<&'fcx mut FunctionCallInfoBaseData>,
}

impl<'fcx> FcInfo<'fcx> {
    /// # Safety
    ///
    /// `fcinfo` must be the call block Postgres passed to the current
    /// function, and must carry `nargs` initialized argument slots.
    #[inline]
    pub unsafe fn from_ptr(fcinfo: FunctionCallInfo) -> FcInfo<'fcx> {
        debug_assert!(!fcinfo.is_null(), "null FunctionCallInfo");
        FcInfo { ptr: NonNull::new_unchecked(fcinfo), _marker: PhantomData }
    }

    #[inline]
    pub fn as_ptr(&self) -> FunctionCallInfo {
        self.ptr.as_ptr()
    }

    /// `PG_NARGS()`
    #[inline]
    pub fn nargs(&self) -> usize {
        unsafe { pg_sys::PG_NARGS(self.as_ptr()) }
    }

    /// `PG_GETARG_DATUM(i)`
    ///
    /// # Safety
    ///
    /// `i` must be less than [`FcInfo::nargs`].
    #[inline]
    pub unsafe fn arg_datum(&self, i: usize) -> Datum {
        pg_sys::PG_GETARG_DATUM(self.as_ptr(), i)
    }

    /// `PG_ARGISNULL(i)`
    ///
    /// # Safety
    ///
    /// `i` must be less than [`FcInfo::nargs`].
    #[inline]
    pub unsafe fn arg_is_null(&self, i: usize) -> bool {
        pg_sys::PG_ARGISNULL(self.as_ptr(), i)
    }

    /// The raw datum of argument `i`, after checking that it exists and is
    /// not NULL.
    pub fn try_arg(&self, i: usize) -> Result<Datum, AdapterError> {
        let nargs = self.nargs();
        if i >= nargs {
            return Err(AdapterError::ArgumentOutOfRange { index: i, nargs });
        }
        unsafe {
            if self.arg_is_null(i) {
                return Err(AdapterError::NullArgument(i));
            }
            Ok(self.arg_datum(i))
        }
    }

    /// Argument `i` decoded as `T`, or `None` when it is NULL.
    ///
    /// # Safety
    ///
    /// `i` must be less than [`FcInfo::nargs`], and the argument's SQL type
    /// must be the one `T` decodes.
    #[inline]
    pub unsafe fn get<T: FromDatum>(&self, i: usize) -> Option<T> {
        T::from_datum(self.arg_datum(i), self.arg_is_null(i))
    }

    /// `PG_GETARG_INT16(i)`
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `int2` argument.
    #[inline]
    pub unsafe fn get_int16(&self, i: usize) -> i16 {
        pg_sys::DatumGetInt16(self.arg_datum(i))
    }

    /// `PG_GETARG_UINT16(i)`
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL argument holding a 16-bit value.
    #[inline]
    pub unsafe fn get_uint16(&self, i: usize) -> u16 {
        pg_sys::DatumGetUInt16(self.arg_datum(i))
    }

    /// `PG_GETARG_INT32(i)`
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `int4` argument.
    #[inline]
    pub unsafe fn get_int32(&self, i: usize) -> i32 {
        pg_sys::DatumGetInt32(self.arg_datum(i))
    }

    /// `PG_GETARG_UINT32(i)`
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL argument holding a 32-bit value.
    #[inline]
    pub unsafe fn get_uint32(&self, i: usize) -> u32 {
        pg_sys::DatumGetUInt32(self.arg_datum(i))
    }

    /// `PG_GETARG_INT64(i)`
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `int8` argument.
    #[inline]
    pub unsafe fn get_int64(&self, i: usize) -> i64 {
        pg_sys::DatumGetInt64(self.arg_datum(i))
    }

    /// `PG_GETARG_BOOL(i)`
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `bool` argument.
    #[inline]
    pub unsafe fn get_bool(&self, i: usize) -> bool {
        pg_sys::DatumGetBool(self.arg_datum(i))
    }

    /// `PG_GETARG_FLOAT4(i)`
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `float4` argument.
    #[inline]
    pub unsafe fn get_float4(&self, i: usize) -> f32 {
        pg_sys::DatumGetFloat4(self.arg_datum(i))
    }

    /// `PG_GETARG_FLOAT8(i)`
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `float8` argument.
    #[inline]
    pub unsafe fn get_float8(&self, i: usize) -> f64 {
        pg_sys::DatumGetFloat8(self.arg_datum(i))
    }

    /// `PG_GETARG_TEXT_P(i)`: the argument with a 4-byte header,
    /// detoasted if it needed to be.
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `text` argument.
    #[inline]
    pub unsafe fn get_text_p(&self, i: usize) -> *mut text {
        detoast(self.arg_datum(i).cast_mut_ptr())
    }

    /// `PG_GETARG_BYTEA_P(i)`
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `bytea` argument.
    #[inline]
    pub unsafe fn get_bytea_p(&self, i: usize) -> *mut bytea {
        detoast(self.arg_datum(i).cast_mut_ptr())
    }

    /// A `text` argument copied into a `String`.
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `text` argument.
    pub unsafe fn get_text(&self, i: usize) -> Result<String, AdapterError> {
        datum_to_string(self.arg_datum(i))
    }

    /// A `bytea` argument's payload, `VARSIZE - VARHDRSZ` bytes of it.
    ///
    /// # Safety
    ///
    /// `i` must be a non-NULL `bytea` argument.
    pub unsafe fn get_bytes(&self, i: usize) -> Vec<u8> {
        datum_to_bytes(self.arg_datum(i))
    }

    /// `PG_RETURN_NULL()`
    #[inline]
    pub fn return_null(&mut self) -> Datum {
        unsafe { (*self.as_ptr()).isnull = true };
        Datum::null()
    }

    /// Encode `value` as this call's result, flagging the call block when it
    /// encodes to NULL.
    pub fn return_value<T: IntoDatum>(&mut self, mcx: &MemCx<'_>, value: T) -> Datum {
        match value.into_datum(mcx) {
            Some(datum) => datum,
            None => self.return_null(),
        }
    }
}
