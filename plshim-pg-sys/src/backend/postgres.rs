use super::Backend;
use crate::{
    varlena, ArrayType, Datum, ElogLevel, HeapTuple, MemoryContext, NodeTag, Oid, SPIPlanPtr,
    SPITupleTable, Size, TupleDesc,
};
use core::ffi::{c_char, c_int, c_long, c_void, CStr};
use core::ptr::{addr_of, null_mut};

extern "C" {
    static mut CurrentMemoryContext: MemoryContext;
    static mut SPI_processed: u64;
    static mut SPI_tuptable: *mut SPITupleTable;
    static mut SPI_result: c_int;

    fn MemoryContextAlloc(context: MemoryContext, size: Size) -> *mut c_void;
    fn pg_detoast_datum(datum: *mut varlena) -> *mut varlena;
    fn SPI_getbinval(
        tuple: HeapTuple,
        tupdesc: TupleDesc,
        fnumber: c_int,
        isnull: *mut bool,
    ) -> Datum;

    fn SPI_connect() -> c_int;
    fn SPI_finish() -> c_int;
    fn SPI_prepare(src: *const c_char, nargs: c_int, argtypes: *mut Oid) -> SPIPlanPtr;
    fn SPI_execute_plan(
        plan: SPIPlanPtr,
        values: *mut Datum,
        nulls: *const c_char,
        read_only: bool,
        tcount: c_long,
    ) -> c_int;

    fn get_typlenbyvalalign(typid: Oid, typlen: *mut i16, typbyval: *mut bool, typalign: *mut c_char);
    fn construct_md_array(
        elems: *mut Datum,
        nulls: *mut bool,
        ndims: c_int,
        dims: *mut c_int,
        lbs: *mut c_int,
        elmtype: Oid,
        elmlen: c_int,
        elmbyval: bool,
        elmalign: c_char,
    ) -> *mut ArrayType;
    fn deconstruct_array(
        array: *mut ArrayType,
        elmtype: Oid,
        elmlen: c_int,
        elmbyval: bool,
        elmalign: c_char,
        elemsp: *mut *mut Datum,
        nullsp: *mut *mut bool,
        nelemsp: *mut c_int,
    );

    fn errstart(elevel: c_int, domain: *const c_char) -> bool;
    fn errmsg_internal(fmt: *const c_char, ...) -> c_int;
    fn errfinish(filename: *const c_char, lineno: c_int, funcname: *const c_char);
}

struct TypeInfo {
    len: i16,
    byval: bool,
    align: c_char,
}

unsafe fn type_info(typid: Oid) -> TypeInfo {
    let mut info = TypeInfo { len: 0, byval: false, align: 0 };
    get_typlenbyvalalign(typid, &mut info.len, &mut info.byval, &mut info.align);
    info
}

/// The backend that the server process itself provides.
///
/// None of these calls is wrapped in a `sigsetjmp` guard. An `ERROR` raised
/// inside the server (out of memory, a failing SPI statement) unwinds
/// straight to the fmgr entry point, so no frame between here and there may
/// own a destructor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgBackend;

impl Backend for PgBackend {
    fn current_memory_context(&self) -> MemoryContext {
        unsafe { addr_of!(CurrentMemoryContext).read() }
    }

    unsafe fn alloc(&self, cx: MemoryContext, size: usize) -> *mut c_void {
        MemoryContextAlloc(cx, size)
    }

    unsafe fn detoast(&self, ptr: *mut varlena) -> *mut varlena {
        pg_detoast_datum(ptr)
    }

    // `heap_getattr` is inline in the server headers. `SPI_getbinval` is its
    // exported wrapper: it range-checks `attnum` and needs no SPI connection.
    unsafe fn heap_getattr(
        &self,
        tuple: HeapTuple,
        desc: TupleDesc,
        attnum: c_int,
    ) -> (Datum, bool) {
        let mut isnull = true;
        let datum = SPI_getbinval(tuple, desc, attnum, &mut isnull);
        (datum, isnull)
    }

    fn emit(&self, level: ElogLevel, message: &CStr) {
        unsafe {
            if errstart(level.as_c_int(), core::ptr::null()) {
                errmsg_internal(c"%s".as_ptr(), message.as_ptr());
                errfinish(c"plshim".as_ptr(), line!() as c_int, c"emit".as_ptr());
            }
        }
    }

    fn trigger_data_tag(&self) -> Option<NodeTag> {
        crate::trigger::trigger_data_tag()
    }

    unsafe fn spi_connect(&self) -> c_int {
        SPI_connect()
    }

    unsafe fn spi_finish(&self) -> c_int {
        SPI_finish()
    }

    unsafe fn spi_prepare(&self, query: &CStr, argtypes: &[Oid]) -> SPIPlanPtr {
        // SPI_prepare copies the type array and never writes through it
        SPI_prepare(query.as_ptr(), argtypes.len() as c_int, argtypes.as_ptr().cast_mut())
    }

    unsafe fn spi_execute_plan(
        &self,
        plan: SPIPlanPtr,
        values: &[Datum],
        nulls: &[c_char],
        read_only: bool,
        count: i64,
    ) -> c_int {
        debug_assert_eq!(values.len(), nulls.len());
        SPI_execute_plan(plan, values.as_ptr().cast_mut(), nulls.as_ptr(), read_only, count as c_long)
    }

    fn spi_result(&self) -> c_int {
        unsafe { addr_of!(SPI_result).read() }
    }

    fn spi_processed(&self) -> u64 {
        unsafe { addr_of!(SPI_processed).read() }
    }

    fn spi_tuptable(&self) -> *mut SPITupleTable {
        unsafe { addr_of!(SPI_tuptable).read() }
    }

    unsafe fn construct_array(&self, elems: &[Datum], elem_type: Oid) -> *mut ArrayType {
        let info = type_info(elem_type);
        let mut dims = [elems.len() as c_int];
        let mut lbs = [1 as c_int];
        construct_md_array(
            elems.as_ptr().cast_mut(),
            null_mut(),
            1,
            dims.as_mut_ptr(),
            lbs.as_mut_ptr(),
            elem_type,
            info.len as c_int,
            info.byval,
            info.align,
        )
    }

    unsafe fn deconstruct_array(&self, array: *mut ArrayType) -> (*mut Datum, usize) {
        let elem_type = crate::ARR_ELEMTYPE(array);
        let info = type_info(elem_type);
        let mut elems = null_mut();
        let mut nulls = null_mut();
        let mut n: c_int = 0;
        deconstruct_array(
            array,
            elem_type,
            info.len as c_int,
            info.byval,
            info.align,
            &mut elems,
            &mut nulls,
            &mut n,
        );
        (elems, n as usize)
    }
}
