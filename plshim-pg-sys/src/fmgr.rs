//! The V1 function-manager calling convention.

use crate::{Datum, Node, NullableDatum, Oid};
use core::ptr::addr_of;

/// Opaque `FmgrInfo`. Only ever handled by pointer.
#[repr(C)]
pub struct FmgrInfo {
    _private: [u8; 0],
}

/// `FunctionCallInfoBaseData`, followed in memory by `nargs` [`NullableDatum`]s.
#[repr(C)]
pub struct FunctionCallInfoBaseData {
    pub flinfo: *mut FmgrInfo,
    pub context: *mut Node,
    pub resultinfo: *mut Node,
    pub fncollation: Oid,
    pub isnull: bool,
    pub nargs: i16,
    pub args: [NullableDatum; 0],
}

pub type FunctionCallInfo = *mut FunctionCallInfoBaseData;

/// `SizeForFunctionCallInfo(nargs)`: bytes needed for a call block carrying
/// `nargs` arguments.
#[inline]
pub fn SizeForFunctionCallInfo(nargs: usize) -> usize {
    memoffset::offset_of!(FunctionCallInfoBaseData, args)
        + core::mem::size_of::<NullableDatum>() * nargs
}

/// Pointer to `fcinfo->args[n]`.
///
/// # Safety
///
/// `fcinfo` must point to a live call block and `n` must be less than the
/// number of argument slots it was allocated with.
#[inline]
pub unsafe fn fcinfo_arg(fcinfo: FunctionCallInfo, n: usize) -> *mut NullableDatum {
    addr_of!((*fcinfo).args).cast::<NullableDatum>().cast_mut().add(n)
}

/// `PG_GETARG_DATUM(n)`
///
/// # Safety
///
/// Same as [`fcinfo_arg`].
#[inline]
pub unsafe fn PG_GETARG_DATUM(fcinfo: FunctionCallInfo, n: usize) -> Datum {
    (*fcinfo_arg(fcinfo, n)).value
}

/// `PG_ARGISNULL(n)`
///
/// # Safety
///
/// Same as [`fcinfo_arg`].
#[inline]
pub unsafe fn PG_ARGISNULL(fcinfo: FunctionCallInfo, n: usize) -> bool {
    (*fcinfo_arg(fcinfo, n)).isnull
}

/// `PG_NARGS()`
///
/// # Safety
///
/// `fcinfo` must point to a live call block.
#[inline]
pub unsafe fn PG_NARGS(fcinfo: FunctionCallInfo) -> usize {
    (*fcinfo).nargs as usize
}
