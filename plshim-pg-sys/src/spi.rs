//! SPI session types and result codes.

use core::ffi::{c_char, c_int, CStr};

/// Opaque `_SPI_plan`.
#[repr(C)]
pub struct _SPI_plan {
    _private: [u8; 0],
}

pub type SPIPlanPtr = *mut _SPI_plan;

pub const SPI_ERROR_CONNECT: c_int = -1;
pub const SPI_ERROR_COPY: c_int = -2;
pub const SPI_ERROR_OPUNKNOWN: c_int = -3;
pub const SPI_ERROR_UNCONNECTED: c_int = -4;
pub const SPI_ERROR_CURSOR: c_int = -5;
pub const SPI_ERROR_ARGUMENT: c_int = -6;
pub const SPI_ERROR_PARAM: c_int = -7;
pub const SPI_ERROR_TRANSACTION: c_int = -8;
pub const SPI_ERROR_NOATTRIBUTE: c_int = -9;
pub const SPI_ERROR_NOOUTFUNC: c_int = -10;
pub const SPI_ERROR_TYPUNKNOWN: c_int = -11;
pub const SPI_ERROR_REL_DUPLICATE: c_int = -12;
pub const SPI_ERROR_REL_NOT_FOUND: c_int = -13;

pub const SPI_OK_CONNECT: c_int = 1;
pub const SPI_OK_FINISH: c_int = 2;
pub const SPI_OK_FETCH: c_int = 3;
pub const SPI_OK_UTILITY: c_int = 4;
pub const SPI_OK_SELECT: c_int = 5;
pub const SPI_OK_SELINTO: c_int = 6;
pub const SPI_OK_INSERT: c_int = 7;
pub const SPI_OK_DELETE: c_int = 8;
pub const SPI_OK_UPDATE: c_int = 9;
pub const SPI_OK_CURSOR: c_int = 10;
pub const SPI_OK_INSERT_RETURNING: c_int = 11;
pub const SPI_OK_DELETE_RETURNING: c_int = 12;
pub const SPI_OK_UPDATE_RETURNING: c_int = 13;
pub const SPI_OK_REWRITTEN: c_int = 14;
pub const SPI_OK_REL_REGISTER: c_int = 15;
pub const SPI_OK_REL_UNREGISTER: c_int = 16;
pub const SPI_OK_TD_REGISTER: c_int = 17;

/// `nulls[i]` for a non-NULL parameter of `SPI_execute_plan`.
pub const SPI_NOT_NULL: c_char = b' ' as c_char;
/// `nulls[i]` for a NULL parameter of `SPI_execute_plan`.
pub const SPI_NULL: c_char = b'n' as c_char;

/// `SPI_result_code_string(code)`, computed locally so that it works without
/// a server. Unknown codes read as `"unrecognized SPI result code"`.
pub fn SPI_result_code_string(code: c_int) -> &'static CStr {
    match code {
        SPI_ERROR_CONNECT => c"SPI_ERROR_CONNECT",
        SPI_ERROR_COPY => c"SPI_ERROR_COPY",
        SPI_ERROR_OPUNKNOWN => c"SPI_ERROR_OPUNKNOWN",
        SPI_ERROR_UNCONNECTED => c"SPI_ERROR_UNCONNECTED",
        SPI_ERROR_CURSOR => c"SPI_ERROR_CURSOR",
        SPI_ERROR_ARGUMENT => c"SPI_ERROR_ARGUMENT",
        SPI_ERROR_PARAM => c"SPI_ERROR_PARAM",
        SPI_ERROR_TRANSACTION => c"SPI_ERROR_TRANSACTION",
        SPI_ERROR_NOATTRIBUTE => c"SPI_ERROR_NOATTRIBUTE",
        SPI_ERROR_NOOUTFUNC => c"SPI_ERROR_NOOUTFUNC",
        SPI_ERROR_TYPUNKNOWN => c"SPI_ERROR_TYPUNKNOWN",
        SPI_ERROR_REL_DUPLICATE => c"SPI_ERROR_REL_DUPLICATE",
        SPI_ERROR_REL_NOT_FOUND => c"SPI_ERROR_REL_NOT_FOUND",
        SPI_OK_CONNECT => c"SPI_OK_CONNECT",
        SPI_OK_FINISH => c"SPI_OK_FINISH",
        SPI_OK_FETCH => c"SPI_OK_FETCH",
        SPI_OK_UTILITY => c"SPI_OK_UTILITY",
        SPI_OK_SELECT => c"SPI_OK_SELECT",
        SPI_OK_SELINTO => c"SPI_OK_SELINTO",
        SPI_OK_INSERT => c"SPI_OK_INSERT",
        SPI_OK_DELETE => c"SPI_OK_DELETE",
        SPI_OK_UPDATE => c"SPI_OK_UPDATE",
        SPI_OK_CURSOR => c"SPI_OK_CURSOR",
        SPI_OK_INSERT_RETURNING => c"SPI_OK_INSERT_RETURNING",
        SPI_OK_DELETE_RETURNING => c"SPI_OK_DELETE_RETURNING",
        SPI_OK_UPDATE_RETURNING => c"SPI_OK_UPDATE_RETURNING",
        SPI_OK_REWRITTEN => c"SPI_OK_REWRITTEN",
        SPI_OK_REL_REGISTER => c"SPI_OK_REL_REGISTER",
        SPI_OK_REL_UNREGISTER => c"SPI_OK_REL_UNREGISTER",
        SPI_OK_TD_REGISTER => c"SPI_OK_TD_REGISTER",
        _ => c"unrecognized SPI result code",
    }
}
