//! The C ABI surface.
//!
//! One exported symbol per macro a foreign runtime would otherwise need the C
//! preprocessor for. Arguments are passed exactly as the corresponding macro
//! takes them; nothing is checked. Anything that allocates does so in
//! `CurrentMemoryContext`.

use crate::pg_sys::{
    self, bytea, text, varlena, Datum, ElogLevel, FunctionCallInfo, HeapTuple, NodeTag, Oid,
    TriggerEvent, TupleDesc,
};
use crate::{array, datum, mem, spi, varlena as var, FcInfo};
use core::ffi::CStr;
use libc::{c_char, c_int, c_uint, c_void};

/// `ht[i]`
#[no_mangle]
pub unsafe extern "C" fn get_heap_tuple(ht: *mut HeapTuple, i: c_uint) -> HeapTuple {
    spi::heap_tuple_at(ht, i as usize)
}

/// `VARSIZE(var)`
#[no_mangle]
pub unsafe extern "C" fn varsize(var: *mut c_void) -> c_int {
    var::varsize(var.cast::<varlena>()) as c_int
}

/// `elog(NOTICE, "%s", string)`. A null `string` reports an empty message.
#[no_mangle]
pub unsafe extern "C" fn notice(string: *const c_char) {
    let message = if string.is_null() { c"" } else { CStr::from_ptr(string) };
    pg_sys::backend::with(|b| b.emit(ElogLevel::Notice, message));
}

/// Same as [`notice`].
#[no_mangle]
pub unsafe extern "C" fn elog_notice(string: *const c_char) {
    notice(string)
}

/// `SPI_getbinval(ht[rownumber], td, colnumber + 1, &isnull)`, with NULL
/// returned as the void datum.
#[no_mangle]
pub unsafe extern "C" fn get_col_as_datum(
    ht: *mut HeapTuple,
    td: TupleDesc,
    rownumber: u32,
    colnumber: c_int,
) -> Datum {
    debug_assert!(colnumber >= 0, "negative column {colnumber}");
    spi::column_datum(ht, td, rownumber as usize, colnumber as usize).unwrap_or_else(Datum::null)
}

/// `heap_getattr(ht, i, td, &isnull)`, with NULL returned as the void
/// datum. Unlike [`get_col_as_datum`], `i` is the one-based attribute
/// number.
#[no_mangle]
pub unsafe extern "C" fn get_heap_getattr(ht: HeapTuple, i: c_uint, td: TupleDesc) -> Datum {
    let (datum, isnull) = pg_sys::backend::with(|b| b.heap_getattr(ht, td, i as c_int));
    if isnull {
        Datum::null()
    } else {
        datum
    }
}

/// `PG_GETARG_DATUM(i)`
#[no_mangle]
pub unsafe extern "C" fn get_arg(fcinfo: FunctionCallInfo, i: c_uint) -> Datum {
    FcInfo::from_ptr(fcinfo).arg_datum(i as usize)
}

/// `PG_GETARG_TEXT_P(i)`
#[no_mangle]
pub unsafe extern "C" fn get_arg_text_p(fcinfo: FunctionCallInfo, i: c_uint) -> *mut text {
    FcInfo::from_ptr(fcinfo).get_text_p(i as usize)
}

/// `PG_GETARG_BYTEA_P(i)`
#[no_mangle]
pub unsafe extern "C" fn get_arg_bytea_p(fcinfo: FunctionCallInfo, i: c_uint) -> *mut bytea {
    FcInfo::from_ptr(fcinfo).get_bytea_p(i as usize)
}

/// `PG_GETARG_INT16(i)`
#[no_mangle]
pub unsafe extern "C" fn get_arg_int16(fcinfo: FunctionCallInfo, i: c_uint) -> i16 {
    FcInfo::from_ptr(fcinfo).get_int16(i as usize)
}

/// `PG_GETARG_UINT16(i)`
// Callers that read this as `(uint16) PG_GETARG_UINT32(i)` get the same
// value: both keep only the low 16 bits of the datum.
#[no_mangle]
pub unsafe extern "C" fn get_arg_uint16(fcinfo: FunctionCallInfo, i: c_uint) -> u16 {
    FcInfo::from_ptr(fcinfo).get_uint16(i as usize)
}

/// `PG_GETARG_INT32(i)`
#[no_mangle]
pub unsafe extern "C" fn get_arg_int32(fcinfo: FunctionCallInfo, i: c_uint) -> i32 {
    FcInfo::from_ptr(fcinfo).get_int32(i as usize)
}

/// `PG_GETARG_UINT32(i)`
#[no_mangle]
pub unsafe extern "C" fn get_arg_uint32(fcinfo: FunctionCallInfo, i: c_uint) -> u32 {
    FcInfo::from_ptr(fcinfo).get_uint32(i as usize)
}

/// `PG_GETARG_INT64(i)`
#[no_mangle]
pub unsafe extern "C" fn get_arg_int64(fcinfo: FunctionCallInfo, i: c_uint) -> i64 {
    FcInfo::from_ptr(fcinfo).get_int64(i as usize)
}

/// `PG_RETURN_VOID()`
#[no_mangle]
pub extern "C" fn void_datum() -> Datum {
    datum::void_datum()
}

/// `CStringGetDatum(cstring_to_text(val))`
#[no_mangle]
pub unsafe extern "C" fn cstring_to_datum(val: *const c_char) -> Datum {
    let val = CStr::from_ptr(val);
    mem::current_context(|mcx| datum::cstring_to_datum(mcx, val))
}

/// `DatumGetCString(text_to_cstring(val))`
#[no_mangle]
pub unsafe extern "C" fn datum_to_cstring(val: Datum) -> *mut c_char {
    mem::current_context(|mcx| datum::datum_to_cstring(mcx, val).as_ptr())
}

/// `PointerGetDatum(val)`
#[no_mangle]
pub extern "C" fn pointer_get_datum(val: *mut c_void) -> Datum {
    pg_sys::PointerGetDatum(val)
}

/// `DatumGetPointer(val)`
#[no_mangle]
pub extern "C" fn datum_to_pointer(val: Datum) -> *mut c_void {
    pg_sys::DatumGetPointer(val)
}

/// `DatumGetPointer(val)` typed for an argument of type `unknown`, which is
/// stored as a C string.
#[no_mangle]
pub extern "C" fn unknown_to_char(val: Datum) -> *mut c_char {
    val.cast_mut_ptr()
}

/// `HeapTupleGetDatum`-style pointer conversion, as trigger functions use
/// to return a row.
#[no_mangle]
pub extern "C" fn heap_tuple_to_datum(val: HeapTuple) -> Datum {
    pg_sys::PointerGetDatum(val)
}

/// The `HeapTuple` a pointer datum refers to.
#[no_mangle]
pub extern "C" fn datum_to_heap_tuple(val: Datum) -> HeapTuple {
    val.cast_mut_ptr()
}

/// A one-dimensional array of the `size` datums at `vals`, all of type
/// `elem_type`.
#[no_mangle]
pub unsafe extern "C" fn array_to_datum(elem_type: Oid, vals: *const Datum, size: c_int) -> Datum {
    let elems: &[Datum] = match size {
        n if n > 0 => core::slice::from_raw_parts(vals, n as usize),
        _ => &[],
    };
    array::array_to_datum(elem_type, elems)
}

/// The elements of the array `val`, allocated in `CurrentMemoryContext`.
/// Their count is stored in `*nelems`.
#[no_mangle]
pub unsafe extern "C" fn datum_to_array(val: Datum, nelems: *mut c_int) -> *mut Datum {
    let (elems, n) = array::datum_to_array_raw(val);
    nelems.write(n as c_int);
    elems
}

/// `CALLED_AS_TRIGGER(fcinfo)`
#[no_mangle]
pub unsafe extern "C" fn called_as_trigger(fcinfo: FunctionCallInfo) -> bool {
    FcInfo::from_ptr(fcinfo).called_as_trigger()
}

/// Record the server's `T_TriggerData`. Call once from `_PG_init`, before
/// [`called_as_trigger`] is used.
#[no_mangle]
pub extern "C" fn set_trigger_data_tag(tag: NodeTag) {
    pg_sys::set_trigger_data_tag(tag)
}

macro_rules! trigger_exports {
    ($($name:ident => $test:ident;)*) => {$(
        #[doc = concat!("`", stringify!($test), "(tg_event)`")]
        #[no_mangle]
        pub extern "C" fn $name(tg_event: TriggerEvent) -> bool {
            pg_sys::$test(tg_event)
        }
    )*};
}

trigger_exports! {
    trigger_fired_before => TRIGGER_FIRED_BEFORE;
    trigger_fired_after => TRIGGER_FIRED_AFTER;
    trigger_fired_instead => TRIGGER_FIRED_INSTEAD;
    trigger_fired_for_row => TRIGGER_FIRED_FOR_ROW;
    trigger_fired_for_statement => TRIGGER_FIRED_FOR_STATEMENT;
    trigger_fired_by_insert => TRIGGER_FIRED_BY_INSERT;
    trigger_fired_by_update => TRIGGER_FIRED_BY_UPDATE;
    trigger_fired_by_delete => TRIGGER_FIRED_BY_DELETE;
    trigger_fired_by_truncate => TRIGGER_FIRED_BY_TRUNCATE;
}

/// Copy `size` bytes of `value` into `CurrentMemoryContext`.
#[no_mangle]
pub unsafe extern "C" fn ret(value: *const c_void, size: usize) -> *mut c_void {
    mem::ret(value, size)
}

macro_rules! by_value_exports {
    ($($t:ty: $to:ident => $put:ident, $from:ident => $get:ident;)*) => {$(
        #[doc = concat!("`", stringify!($put), "(val)`")]
        #[no_mangle]
        pub extern "C" fn $to(val: $t) -> Datum {
            pg_sys::$put(val)
        }

        #[doc = concat!("`", stringify!($get), "(val)`")]
        #[no_mangle]
        pub extern "C" fn $from(val: Datum) -> $t {
            pg_sys::$get(val)
        }
    )*};
}

by_value_exports! {
    i16: int16_to_datum => Int16GetDatum, datum_to_int16 => DatumGetInt16;
    u16: uint16_to_datum => UInt16GetDatum, datum_to_uint16 => DatumGetUInt16;
    i32: int32_to_datum => Int32GetDatum, datum_to_int32 => DatumGetInt32;
    u32: uint32_to_datum => UInt32GetDatum, datum_to_uint32 => DatumGetUInt32;
    i64: int64_to_datum => Int64GetDatum, datum_to_int64 => DatumGetInt64;
    bool: bool_to_datum => BoolGetDatum, datum_to_bool => DatumGetBool;
    f32: float4_to_datum => Float4GetDatum, datum_to_float4 => DatumGetFloat4;
    f64: float8_to_datum => Float8GetDatum, datum_to_float8 => DatumGetFloat8;
    i32: date_to_datum => DateADTGetDatum, datum_to_date => DatumGetDateADT;
    i64: time_to_datum => TimeADTGetDatum, datum_to_time => DatumGetTimeADT;
    i64: timestamp_to_datum => TimestampGetDatum, datum_to_timestamp => DatumGetTimestamp;
}

// `timetz` in these two names is `timestamptz`, not the by-reference
// `time with time zone`.
by_value_exports! {
    i64: timetz_to_datum => TimestampTzGetDatum, datum_to_timetz => DatumGetTimestampTz;
}
