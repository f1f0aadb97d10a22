//! One-dimensional arrays, built and taken apart through the backend.

use crate::Oid;
use core::ffi::c_int;

/// The header of an `ArrayType` varlena. The dimensions, lower bounds,
/// null bitmap and element data follow it.
#[repr(C)]
pub struct ArrayType {
    pub vl_len_: i32,
    pub ndim: c_int,
    pub dataoffset: i32,
    pub elemtype: Oid,
}

/// `ARR_NDIM(a)`
///
/// # Safety
///
/// `a` must point to a detoasted array.
#[inline]
pub unsafe fn ARR_NDIM(a: *const ArrayType) -> c_int {
    (*a).ndim
}

/// `ARR_HASNULL(a)`
///
/// # Safety
///
/// `a` must point to a detoasted array.
#[inline]
pub unsafe fn ARR_HASNULL(a: *const ArrayType) -> bool {
    (*a).dataoffset != 0
}

/// `ARR_ELEMTYPE(a)`
///
/// # Safety
///
/// `a` must point to a detoasted array.
#[inline]
pub unsafe fn ARR_ELEMTYPE(a: *const ArrayType) -> Oid {
    (*a).elemtype
}

/// `ARR_DIMS(a)`: `ndim` ints right after the header.
///
/// # Safety
///
/// `a` must point to a detoasted array.
#[inline]
pub unsafe fn ARR_DIMS(a: *mut ArrayType) -> *mut c_int {
    a.add(1).cast()
}

/// `ARR_LBOUND(a)`: `ndim` ints right after the dimensions.
///
/// # Safety
///
/// `a` must point to a detoasted array.
#[inline]
pub unsafe fn ARR_LBOUND(a: *mut ArrayType) -> *mut c_int {
    ARR_DIMS(a).add(ARR_NDIM(a) as usize)
}
