//! An in-process stand-in for the parts of a Postgres backend that `plshim`
//! talks to.
//!
//! - memory contexts are arenas of 8-byte-aligned chunks which are only ever
//!   released by [`SimBackend::reset`] or by dropping the backend;
//! - messages passed to `elog` are recorded instead of sent anywhere;
//! - tuples are [`SimRow`]s, whose pointers stand in for `HeapTuple`s;
//! - SPI statements are not parsed or run: each prepared query string is
//!   answered with the [`SimResponse`] registered for it by
//!   [`SimBackend::respond`];
//! - arrays are a header, one dimension and the raw element datums, which
//!   is all the adapter ever reads back.
//!
//! Everything is single-threaded. Enter the backend on the thread that runs
//! the code under test, with [`SimBackend::enter`].

use plshim::pg_sys::{
    self, backend, varlena, ArrayType, Backend, Datum, ElogLevel, FunctionCallInfo,
    FunctionCallInfoBaseData, HeapTuple, MemoryContext, MemoryContextData, Node, NodeTag,
    NullableDatum, Oid, SPIPlanPtr, SPITupleTable, TriggerData, TriggerEvent, TupleDesc,
    TupleDescData,
};
use plshim::FcInfo;
use std::cell::{Cell, RefCell};
use std::ffi::{c_char, c_int, c_void, CStr};
use std::ptr::NonNull;

/// Bytes written into fresh allocations, so reads of uninitialized memory
/// stand out.
const CLOBBER: u64 = 0x7F7F_7F7F_7F7F_7F7F;

/// `DEFAULT_COLLATION_OID`
const DEFAULT_COLLATION_OID: pg_sys::Oid = 100;

struct Chunk {
    ptr: NonNull<[u64]>,
    len: usize,
}

impl Chunk {
    fn new(len: usize) -> Chunk {
        let words = len.div_ceil(8).max(1);
        let ptr = Box::into_raw(vec![CLOBBER; words].into_boxed_slice());
        // SAFETY: Box::into_raw never returns null
        Chunk { ptr: unsafe { NonNull::new_unchecked(ptr) }, len }
    }

    fn start(&self) -> *mut u8 {
        self.ptr.as_ptr().cast()
    }

    fn contains(&self, p: *const u8, len: usize) -> bool {
        let start = self.start() as usize;
        let p = p as usize;
        p >= start && p + len <= start + self.len
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: created by Box::into_raw in Chunk::new
        unsafe { drop(Box::from_raw(self.ptr.as_ptr())) }
    }
}

struct SimContext {
    name: String,
    // stands in for the MemoryContextData; only its address matters
    header: Box<u64>,
    chunks: Vec<Chunk>,
}

impl SimContext {
    fn new(name: &str) -> SimContext {
        SimContext { name: name.to_owned(), header: Box::new(0), chunks: Vec::new() }
    }

    fn as_ptr(&self) -> MemoryContext {
        (&*self.header as *const u64).cast::<MemoryContextData>().cast_mut()
    }
}

/// What an SPI statement returns when the simulated backend runs it.
pub struct SimResponse {
    code: c_int,
    processed: u64,
    table: Option<SimTupleTable>,
}

impl SimResponse {
    /// A `SELECT` returning every row of `table`.
    pub fn select(table: SimTupleTable) -> SimResponse {
        let processed = table.table.numvals;
        SimResponse { code: pg_sys::SPI_OK_SELECT, processed, table: Some(table) }
    }

    /// A statement without a result set that touched `processed` rows.
    pub fn command(code: c_int, processed: u64) -> SimResponse {
        SimResponse { code, processed, table: None }
    }

    /// A statement that fails with `code`.
    pub fn error(code: c_int) -> SimResponse {
        debug_assert!(code < 0, "{code} is not an SPI error code");
        SimResponse { code, processed: 0, table: None }
    }
}

/// One `SPI_execute_plan` call, as the simulated backend saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct SimExecution {
    pub query: String,
    pub args: Vec<Option<Datum>>,
    pub read_only: bool,
    pub count: i64,
}

struct SimPlan {
    query: String,
    argtypes: Vec<Oid>,
}

/// `dims[0]` and `lbs[0]` of a one-dimensional array follow the header.
const SIM_ARRAY_DATA: usize = std::mem::size_of::<ArrayType>() + 8;

/// The simulated backend.
pub struct SimBackend {
    contexts: RefCell<Vec<SimContext>>,
    current: Cell<MemoryContext>,
    messages: RefCell<Vec<(ElogLevel, String)>>,
    trigger_tag: Cell<Option<NodeTag>>,
    spi_depth: Cell<u32>,
    spi_result: Cell<c_int>,
    processed: Cell<u64>,
    tuptable: Cell<*mut SPITupleTable>,
    plans: RefCell<Vec<Box<SimPlan>>>,
    responses: RefCell<Vec<(String, SimResponse)>>,
    executions: RefCell<Vec<SimExecution>>,
}

impl Default for SimBackend {
    fn default() -> SimBackend {
        SimBackend::new()
    }
}

impl SimBackend {
    /// A backend whose current memory context is a fresh
    /// `"CurrentMemoryContext"`.
    pub fn new() -> SimBackend {
        let top = SimContext::new("CurrentMemoryContext");
        let current = Cell::new(top.as_ptr());
        SimBackend {
            contexts: RefCell::new(vec![top]),
            current,
            messages: RefCell::new(Vec::new()),
            trigger_tag: Cell::new(Some(SimBackend::TRIGGER_DATA_TAG)),
            spi_depth: Cell::new(0),
            spi_result: Cell::new(0),
            processed: Cell::new(0),
            tuptable: Cell::new(std::ptr::null_mut()),
            plans: RefCell::new(Vec::new()),
            responses: RefCell::new(Vec::new()),
            executions: RefCell::new(Vec::new()),
        }
    }

    /// The `NodeTag` this backend gives `TriggerData` nodes.
    pub const TRIGGER_DATA_TAG: NodeTag = 0x5452;

    /// Forget (`None`) or change the `TriggerData` tag.
    pub fn set_trigger_data_tag(&self, tag: Option<NodeTag>) {
        self.trigger_tag.set(tag);
    }

    /// Answer every later execution of `query` with `response`.
    pub fn respond(&self, query: &str, response: SimResponse) {
        self.responses.borrow_mut().push((query.to_owned(), response));
    }

    /// Every `SPI_execute_plan` call so far, oldest first.
    pub fn executions(&self) -> Vec<SimExecution> {
        self.executions.borrow().clone()
    }

    /// Number of `SPI_connect` calls not yet matched by `SPI_finish`.
    pub fn spi_depth(&self) -> u32 {
        self.spi_depth.get()
    }

    /// Run `f` with this as the thread's backend.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        backend::enter(self, f)
    }

    /// `CurrentMemoryContext`
    pub fn current(&self) -> MemoryContext {
        self.current.get()
    }

    /// A new, empty memory context.
    pub fn create_context(&self, name: &str) -> MemoryContext {
        let cx = SimContext::new(name);
        let ptr = cx.as_ptr();
        self.contexts.borrow_mut().push(cx);
        ptr
    }

    /// `MemoryContextSwitchTo(cx)`
    pub fn switch_to(&self, cx: MemoryContext) -> MemoryContext {
        self.context_index(cx);
        self.current.replace(cx)
    }

    /// `MemoryContextReset(cx)`: everything allocated in `cx` is released.
    pub fn reset(&self, cx: MemoryContext) {
        let i = self.context_index(cx);
        let mut contexts = self.contexts.borrow_mut();
        tracing::debug!(context = %contexts[i].name, chunks = contexts[i].chunks.len(), "reset");
        contexts[i].chunks.clear();
    }

    /// Number of live allocations in `cx`.
    pub fn allocations(&self, cx: MemoryContext) -> usize {
        let i = self.context_index(cx);
        self.contexts.borrow()[i].chunks.len()
    }

    /// Whether `len` bytes starting at `p` lie inside a single allocation
    /// made in `cx`.
    pub fn owns(&self, cx: MemoryContext, p: *const u8, len: usize) -> bool {
        let i = self.context_index(cx);
        self.contexts.borrow()[i].chunks.iter().any(|c| c.contains(p, len))
    }

    /// The size requested for the allocation starting exactly at `p`.
    pub fn allocation_size(&self, p: *const u8) -> Option<usize> {
        self.contexts
            .borrow()
            .iter()
            .flat_map(|cx| cx.chunks.iter())
            .find(|c| c.start().cast_const() == p)
            .map(|c| c.len)
    }

    /// Every message reported so far, oldest first.
    pub fn messages(&self) -> Vec<(ElogLevel, String)> {
        self.messages.borrow().clone()
    }

    /// The messages reported at `NOTICE`, oldest first.
    pub fn notices(&self) -> Vec<String> {
        self.messages
            .borrow()
            .iter()
            .filter(|(level, _)| *level == ElogLevel::Notice)
            .map(|(_, m)| m.clone())
            .collect()
    }

    fn context_index(&self, cx: MemoryContext) -> usize {
        self.contexts
            .borrow()
            .iter()
            .position(|c| c.as_ptr() == cx)
            .unwrap_or_else(|| panic!("{cx:p} is not a memory context of this backend"))
    }
}

impl Backend for SimBackend {
    fn current_memory_context(&self) -> MemoryContext {
        self.current.get()
    }

    unsafe fn alloc(&self, cx: MemoryContext, size: usize) -> *mut c_void {
        let i = self.context_index(cx);
        let chunk = Chunk::new(size);
        let p = chunk.start();
        self.contexts.borrow_mut()[i].chunks.push(chunk);
        p.cast()
    }

    unsafe fn detoast(&self, ptr: *mut varlena) -> *mut varlena {
        if pg_sys::VARATT_IS_4B_U(ptr) {
            return ptr;
        }
        assert!(
            pg_sys::VARATT_IS_1B(ptr) && !pg_sys::VARATT_IS_1B_E(ptr),
            "the simulated backend only detoasts short inline values"
        );
        let len = pg_sys::VARSIZE_ANY_EXHDR(ptr);
        let dst = self.alloc(self.current.get(), pg_sys::VARHDRSZ + len).cast::<varlena>();
        pg_sys::SET_VARSIZE(dst, pg_sys::VARHDRSZ + len);
        std::ptr::copy_nonoverlapping(
            pg_sys::VARDATA_ANY(ptr),
            dst.cast::<u8>().add(pg_sys::VARHDRSZ),
            len,
        );
        dst
    }

    unsafe fn heap_getattr(
        &self,
        tuple: HeapTuple,
        desc: TupleDesc,
        attnum: c_int,
    ) -> (Datum, bool) {
        let row = &*tuple.cast::<SimRow>();
        let natts = (*desc).natts;
        if attnum < 1 || attnum > natts {
            return (Datum::null(), true);
        }
        match row.values.get(attnum as usize - 1).copied().flatten() {
            Some(datum) => (datum, false),
            None => (Datum::null(), true),
        }
    }

    fn emit(&self, level: ElogLevel, message: &CStr) {
        self.messages.borrow_mut().push((level, message.to_string_lossy().into_owned()));
    }

    fn trigger_data_tag(&self) -> Option<NodeTag> {
        self.trigger_tag.get()
    }

    unsafe fn spi_connect(&self) -> c_int {
        self.spi_depth.set(self.spi_depth.get() + 1);
        pg_sys::SPI_OK_CONNECT
    }

    unsafe fn spi_finish(&self) -> c_int {
        match self.spi_depth.get() {
            0 => pg_sys::SPI_ERROR_UNCONNECTED,
            depth => {
                self.spi_depth.set(depth - 1);
                self.processed.set(0);
                self.tuptable.set(std::ptr::null_mut());
                pg_sys::SPI_OK_FINISH
            }
        }
    }

    unsafe fn spi_prepare(&self, query: &CStr, argtypes: &[Oid]) -> SPIPlanPtr {
        let failure = if self.spi_depth.get() == 0 {
            Some(pg_sys::SPI_ERROR_UNCONNECTED)
        } else if query.is_empty() || argtypes.contains(&pg_sys::InvalidOid) {
            Some(pg_sys::SPI_ERROR_ARGUMENT)
        } else {
            None
        };
        if let Some(code) = failure {
            self.spi_result.set(code);
            return std::ptr::null_mut();
        }
        let mut plan = Box::new(SimPlan {
            query: query.to_string_lossy().into_owned(),
            argtypes: argtypes.to_vec(),
        });
        let ptr: SPIPlanPtr = (&mut *plan as *mut SimPlan).cast();
        self.plans.borrow_mut().push(plan);
        ptr
    }

    unsafe fn spi_execute_plan(
        &self,
        plan: SPIPlanPtr,
        values: &[Datum],
        nulls: &[c_char],
        read_only: bool,
        count: i64,
    ) -> c_int {
        if self.spi_depth.get() == 0 {
            return pg_sys::SPI_ERROR_UNCONNECTED;
        }
        let plan = &*plan.cast::<SimPlan>();
        assert_eq!(values.len(), plan.argtypes.len(), "wrong number of values for {:?}", plan.query);
        assert_eq!(nulls.len(), values.len());
        let args = values
            .iter()
            .zip(nulls)
            .map(|(&value, &null)| (null != pg_sys::SPI_NULL).then_some(value))
            .collect();
        self.executions.borrow_mut().push(SimExecution {
            query: plan.query.clone(),
            args,
            read_only,
            count,
        });

        let mut responses = self.responses.borrow_mut();
        let Some((_, response)) = responses.iter_mut().rev().find(|(q, _)| *q == plan.query)
        else {
            return pg_sys::SPI_ERROR_OPUNKNOWN;
        };
        let processed = match count {
            n if n > 0 => response.processed.min(n as u64),
            _ => response.processed,
        };
        self.processed.set(processed);
        self.tuptable
            .set(response.table.as_mut().map_or(std::ptr::null_mut(), SimTupleTable::as_ptr));
        response.code
    }

    fn spi_result(&self) -> c_int {
        self.spi_result.get()
    }

    fn spi_processed(&self) -> u64 {
        self.processed.get()
    }

    fn spi_tuptable(&self) -> *mut SPITupleTable {
        self.tuptable.get()
    }

    unsafe fn construct_array(&self, elems: &[Datum], elem_type: Oid) -> *mut ArrayType {
        let total = SIM_ARRAY_DATA + std::mem::size_of_val(elems);
        let array = self.alloc(self.current.get(), total).cast::<ArrayType>();
        pg_sys::SET_VARSIZE(array.cast::<varlena>(), total);
        (*array).ndim = 1;
        (*array).dataoffset = 0;
        (*array).elemtype = elem_type;
        pg_sys::ARR_DIMS(array).write(elems.len() as c_int);
        pg_sys::ARR_LBOUND(array).write(1);
        let data = array.cast::<u8>().add(SIM_ARRAY_DATA).cast::<Datum>();
        std::ptr::copy_nonoverlapping(elems.as_ptr(), data, elems.len());
        array
    }

    unsafe fn deconstruct_array(&self, array: *mut ArrayType) -> (*mut Datum, usize) {
        assert_eq!(pg_sys::ARR_NDIM(array), 1, "the simulated backend only builds 1-D arrays");
        let n = *pg_sys::ARR_DIMS(array) as usize;
        let size = std::mem::size_of::<Datum>() * n;
        let elems = self.alloc(self.current.get(), size).cast::<Datum>();
        let data = array.cast::<u8>().add(SIM_ARRAY_DATA).cast::<Datum>();
        std::ptr::copy_nonoverlapping(data, elems, n);
        (elems, n)
    }
}

/// A heap-allocated `FunctionCallInfoBaseData` with its argument slots.
pub struct SimFcInfo {
    buf: Box<[u64]>,
}

impl SimFcInfo {
    /// A call block for `args`, where `None` is a NULL argument.
    pub fn new(args: impl IntoIterator<Item = Option<Datum>>) -> SimFcInfo {
        let args: Vec<NullableDatum> = args
            .into_iter()
            .map(|a| a.map_or_else(NullableDatum::null, NullableDatum::new))
            .collect();
        let words = pg_sys::SizeForFunctionCallInfo(args.len()).div_ceil(8);
        let mut this = SimFcInfo { buf: vec![0u64; words].into_boxed_slice() };
        let fcinfo = this.as_ptr();
        unsafe {
            fcinfo.write(FunctionCallInfoBaseData {
                flinfo: std::ptr::null_mut(),
                context: std::ptr::null_mut(),
                resultinfo: std::ptr::null_mut(),
                fncollation: DEFAULT_COLLATION_OID,
                isnull: false,
                nargs: args.len() as i16,
                args: [],
            });
            for (i, arg) in args.into_iter().enumerate() {
                pg_sys::fcinfo_arg(fcinfo, i).write(arg);
            }
        }
        this
    }

    /// Set `fcinfo->context`, as the executor does for trigger and
    /// aggregate calls.
    pub fn with_context(mut self, context: *mut Node) -> SimFcInfo {
        unsafe { (*self.as_ptr()).context = context };
        self
    }

    pub fn as_ptr(&mut self) -> FunctionCallInfo {
        self.buf.as_mut_ptr().cast()
    }

    pub fn fcinfo(&mut self) -> FcInfo<'_> {
        unsafe { FcInfo::from_ptr(self.as_ptr()) }
    }

    /// `fcinfo->isnull`
    pub fn isnull(&self) -> bool {
        unsafe { (*self.buf.as_ptr().cast::<FunctionCallInfoBaseData>()).isnull }
    }
}

/// A simulated tuple: its column values, `None` for NULL.
pub struct SimRow {
    values: Vec<Option<Datum>>,
}

/// A simulated `SPITupleTable` with its descriptor and rows.
pub struct SimTupleTable {
    table: Box<SPITupleTable>,
    _desc: Box<TupleDescData>,
    _rows: Vec<Box<SimRow>>,
    tuples: Vec<HeapTuple>,
}

impl SimTupleTable {
    /// A table with `natts` columns. Rows shorter than `natts` read as NULL
    /// in their missing columns.
    pub fn new(natts: usize, rows: Vec<Vec<Option<Datum>>>) -> SimTupleTable {
        let mut desc = Box::new(TupleDescData {
            natts: natts as c_int,
            tdtypeid: pg_sys::InvalidOid,
            tdtypmod: -1,
            tdrefcount: -1,
            constr: std::ptr::null_mut(),
        });
        let mut rows: Vec<Box<SimRow>> =
            rows.into_iter().map(|values| Box::new(SimRow { values })).collect();
        let mut vals: Vec<HeapTuple> =
            rows.iter_mut().map(|r| (&mut **r as *mut SimRow).cast()).collect();
        let table = Box::new(SPITupleTable {
            tupdesc: &mut *desc,
            vals: vals.as_mut_ptr(),
            numvals: vals.len() as u64,
        });
        SimTupleTable { table, _desc: desc, _rows: rows, tuples: vals }
    }

    /// A single-column table of `int4`s.
    pub fn int4_column(values: impl IntoIterator<Item = Option<i32>>) -> SimTupleTable {
        let rows = values.into_iter().map(|v| vec![v.map(pg_sys::Int32GetDatum)]).collect();
        SimTupleTable::new(1, rows)
    }

    pub fn as_ptr(&mut self) -> *mut SPITupleTable {
        &mut *self.table
    }

    /// The `HeapTuple` of row `row`.
    pub fn tuple(&self, row: usize) -> HeapTuple {
        self.tuples[row]
    }

    pub fn vals(&self) -> *mut HeapTuple {
        self.table.vals
    }

    pub fn tupdesc(&self) -> TupleDesc {
        self.table.tupdesc
    }
}

/// A `TriggerData` node tagged the way [`SimBackend`] expects.
pub struct SimTriggerData {
    data: Box<TriggerData>,
}

impl SimTriggerData {
    /// A trigger call for `event` with the given old and new rows (either
    /// may be null, as for statement-level triggers).
    pub fn new(event: TriggerEvent, trigtuple: HeapTuple, newtuple: HeapTuple) -> SimTriggerData {
        let data = Box::new(TriggerData {
            type_: SimBackend::TRIGGER_DATA_TAG,
            tg_event: event,
            tg_relation: std::ptr::null_mut(),
            tg_trigtuple: trigtuple,
            tg_newtuple: newtuple,
            tg_trigger: std::ptr::null_mut(),
        });
        SimTriggerData { data }
    }

    pub fn as_node(&mut self) -> *mut Node {
        (&mut *self.data as *mut TriggerData).cast()
    }
}

/// Some other node, such as the `AggState` an aggregate's transition
/// function finds in its context.
pub struct SimNode {
    tag: Box<NodeTag>,
}

impl SimNode {
    pub fn new(tag: NodeTag) -> SimNode {
        SimNode { tag: Box::new(tag) }
    }

    pub fn as_node(&mut self) -> *mut Node {
        (&mut *self.tag as *mut NodeTag).cast()
    }
}
