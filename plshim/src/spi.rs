//! SPI: running prepared statements, and read-only access to the rows they
//! return.
//!
//! Columns are numbered from zero here and translated to Postgres'
//! one-based attribute numbers (`column + 1`) on the way down. That shift is
//! the whole point of the translation; do not "fix" it.
//!
//! A session is an [`SpiConnection`]: `SPI_connect` when it opens,
//! `SPI_finish` when it is closed. Statements are prepared on it as
//! [`SpiPlan`]s and their results borrow the connection, since `SPI_finish`
//! frees them.

use crate::datum::FromDatum;
use crate::error::AdapterError;
use crate::pg_sys::{self, backend, Datum, HeapTuple, Oid, SPITupleTable, TupleDesc, _SPI_plan};
use core::ffi::{c_char, c_int, CStr};
use core::{marker::PhantomData, ptr::NonNull};

/// `vals[row]`
///
/// # Safety
///
/// `vals` must be an SPI tuple array with more than `row` entries.
#[inline]
pub unsafe fn heap_tuple_at(vals: *const HeapTuple, row: usize) -> HeapTuple {
    *vals.add(row)
}

/// Zero-based column number to attribute number.
#[inline]
pub fn attnum(column: usize) -> c_int {
    column as c_int + 1
}

/// Column `column` of tuple `tuple`, `None` for SQL NULL.
///
/// # Safety
///
/// `tuple` and `desc` must belong to the same live SPI result.
#[inline]
pub unsafe fn tuple_datum(tuple: HeapTuple, desc: TupleDesc, column: usize) -> Option<Datum> {
    let (datum, isnull) = backend::with(|b| b.heap_getattr(tuple, desc, attnum(column)));
    tracing::trace!(column, isnull, "heap_getattr");
    (!isnull).then_some(datum)
}

/// Column `column` of row `row`, `None` for SQL NULL.
///
/// # Safety
///
/// `vals` and `desc` must belong to the same live SPI result, and `row` must
/// be less than its number of rows.
#[inline]
pub unsafe fn column_datum(
    vals: *const HeapTuple,
    desc: TupleDesc,
    row: usize,
    column: usize,
) -> Option<Datum> {
    tuple_datum(heap_tuple_at(vals, row), desc, column)
}

/// The rows of an SPI tuple table, borrowed for `'spi`.
pub struct SpiRows<'spi> {
    table: NonNull<SPITupleTable>,
    processed: usize,
    next: usize,
    _marker: PhantomData<&'spi SPITupleTable>,
}

/// One row of an [`SpiRows`].
#[derive(Clone, Copy)]
pub struct SpiRow<'spi> {
    tuple: HeapTuple,
    desc: TupleDesc,
    index: usize,
    _marker: PhantomData<&'spi SPITupleTable>,
}

impl<'spi> SpiRows<'spi> {
    /// Rows `0..processed` of `table`. `processed` is usually
    /// `SPI_processed`, which may be smaller than the table's `numvals`.
    ///
    /// # Safety
    ///
    /// `table` must be a live SPI tuple table with at least `processed`
    /// rows, and must outlive `'spi`.
    pub unsafe fn from_raw(table: *mut SPITupleTable, processed: u64) -> SpiRows<'spi> {
        debug_assert!(!table.is_null(), "null SPITupleTable");
        debug_assert!(processed <= (*table).numvals);
        SpiRows {
            table: NonNull::new_unchecked(table),
            processed: processed as usize,
            next: 0,
            _marker: PhantomData,
        }
    }

    /// All of `table`'s rows.
    ///
    /// # Safety
    ///
    /// As for [`SpiRows::from_raw`].
    pub unsafe fn from_table(table: *mut SPITupleTable) -> SpiRows<'spi> {
        SpiRows::from_raw(table, (*table).numvals)
    }

    /// `SPI_processed`: rows in the whole result, however many have been
    /// iterated over. [`ExactSizeIterator::len`] counts the rows left.
    #[inline]
    pub fn processed(&self) -> usize {
        self.processed
    }

    #[inline]
    pub fn tupdesc(&self) -> TupleDesc {
        unsafe { self.table.as_ref().tupdesc }
    }

    /// Number of columns in the result.
    #[inline]
    pub fn natts(&self) -> usize {
        unsafe { (*self.tupdesc()).natts as usize }
    }

    /// Random access to row `row`.
    pub fn row(&self, row: usize) -> Result<SpiRow<'spi>, AdapterError> {
        if row >= self.processed {
            return Err(AdapterError::RowOutOfRange { row, processed: self.processed });
        }
        Ok(SpiRow {
            tuple: unsafe { heap_tuple_at(self.table.as_ref().vals, row) },
            desc: self.tupdesc(),
            index: row,
            _marker: PhantomData,
        })
    }

    /// Column `column` of row `row`, with both checked.
    pub fn get_datum(&self, row: usize, column: usize) -> Result<Option<Datum>, AdapterError> {
        self.row(row)?.datum(column)
    }
}

impl<'spi> Iterator for SpiRows<'spi> {
    type Item = SpiRow<'spi>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.row(self.next).ok()?;
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.processed.saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for SpiRows<'_> {}

impl<'spi> SpiRow<'spi> {
    /// Zero-based position of this row in the result.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn heap_tuple(&self) -> HeapTuple {
        self.tuple
    }

    #[inline]
    pub fn natts(&self) -> usize {
        unsafe { (*self.desc).natts as usize }
    }

    /// Column `column`, `None` for SQL NULL.
    pub fn datum(&self, column: usize) -> Result<Option<Datum>, AdapterError> {
        let natts = self.natts();
        if column >= natts {
            return Err(AdapterError::ColumnOutOfRange { column, natts });
        }
        Ok(unsafe { tuple_datum(self.tuple, self.desc, column) })
    }

    /// Column `column` decoded as `T`.
    ///
    /// # Safety
    ///
    /// The column's SQL type must be the one `T` decodes.
    pub unsafe fn get<T: FromDatum>(&self, column: usize) -> Result<Option<T>, AdapterError> {
        let datum = self.datum(column)?;
        Ok(T::from_datum(datum.unwrap_or_else(Datum::null), datum.is_none()))
    }
}


/// An open SPI connection.
pub struct SpiConnection {
    // SPI state is per backend process
    _not_send: PhantomData<*mut ()>,
}

/// A statement prepared on an [`SpiConnection`].
pub struct SpiPlan<'conn> {
    plan: NonNull<_SPI_plan>,
    nargs: usize,
    _marker: PhantomData<&'conn SpiConnection>,
}

fn spi_error(operation: &'static str, code: c_int) -> AdapterError {
    tracing::debug!(operation, code, "SPI failure");
    AdapterError::Spi { operation, code }
}

impl SpiConnection {
    /// `SPI_connect()`
    pub fn open() -> Result<SpiConnection, AdapterError> {
        // SAFETY: connecting has no precondition beyond running in a backend
        let code = unsafe { backend::with(|b| b.spi_connect()) };
        if code != pg_sys::SPI_OK_CONNECT {
            return Err(spi_error("SPI_connect", code));
        }
        Ok(SpiConnection { _not_send: PhantomData })
    }

    /// `SPI_finish()`. Every plan and result of this connection is freed.
    pub fn close(self) -> Result<(), AdapterError> {
        let code = unsafe { backend::with(|b| b.spi_finish()) };
        if code != pg_sys::SPI_OK_FINISH {
            return Err(spi_error("SPI_finish", code));
        }
        Ok(())
    }

    /// `SPI_prepare(query, argtypes.len(), argtypes)`
    pub fn prepare(&self, query: &CStr, argtypes: &[Oid]) -> Result<SpiPlan<'_>, AdapterError> {
        let (plan, code) = backend::with(|b| unsafe {
            let plan = b.spi_prepare(query, argtypes);
            (plan, b.spi_result())
        });
        tracing::trace!(?query, nargs = argtypes.len(), "SPI_prepare");
        match NonNull::new(plan) {
            Some(plan) => Ok(SpiPlan { plan, nargs: argtypes.len(), _marker: PhantomData }),
            None => Err(spi_error("SPI_prepare", code)),
        }
    }
}

/// Open a connection, run `f` on it, and close it again, even when `f`
/// fails. An error from `f` wins over one from closing.
pub fn connect<R>(
    f: impl FnOnce(&SpiConnection) -> Result<R, AdapterError>,
) -> Result<R, AdapterError> {
    let conn = SpiConnection::open()?;
    let result = f(&conn);
    let closed = conn.close();
    let value = result?;
    closed.map(|()| value)
}

impl<'conn> SpiPlan<'conn> {
    /// Number of parameters the statement was prepared with.
    #[inline]
    pub fn nargs(&self) -> usize {
        self.nargs
    }

    fn execute(
        &self,
        args: &[Option<Datum>],
        read_only: bool,
        count: i64,
    ) -> Result<c_int, AdapterError> {
        if args.len() != self.nargs {
            return Err(AdapterError::ArgumentCount { expected: self.nargs, given: args.len() });
        }
        let values: Vec<Datum> = args.iter().map(|a| a.unwrap_or_else(Datum::null)).collect();
        let nulls: Vec<c_char> = args
            .iter()
            .map(|a| if a.is_some() { pg_sys::SPI_NOT_NULL } else { pg_sys::SPI_NULL })
            .collect();
        // SAFETY: the plan belongs to the open connection `'conn` borrows,
        // and there is one value and one null flag per parameter
        let code = unsafe {
            backend::with(|b| {
                b.spi_execute_plan(self.plan.as_ptr(), &values, &nulls, read_only, count)
            })
        };
        tracing::trace!(code, read_only, count, "SPI_execute_plan");
        if code < 0 {
            return Err(spi_error("SPI_execute_plan", code));
        }
        Ok(code)
    }

    /// Run the statement read-only and return all of its rows. Anything but
    /// a `SELECT` is an error.
    pub fn query(&self, args: &[Option<Datum>]) -> Result<SpiRows<'conn>, AdapterError> {
        let code = self.execute(args, true, 0)?;
        if code != pg_sys::SPI_OK_SELECT {
            return Err(spi_error("SPI_execute_plan", code));
        }
        current_result().ok_or_else(|| spi_error("SPI_execute_plan", code))
    }

    /// Run the statement for at most one row, which must exist.
    pub fn query_row(&self, args: &[Option<Datum>]) -> Result<SpiRow<'conn>, AdapterError> {
        let code = self.execute(args, false, 1)?;
        let rows = current_result().ok_or_else(|| spi_error("SPI_execute_plan", code))?;
        match rows.processed() {
            1 => rows.row(0),
            n => Err(AdapterError::NotOneRow(n)),
        }
    }

    /// Run the statement for its side effects. Returns `SPI_processed`.
    pub fn exec(&self, args: &[Option<Datum>]) -> Result<u64, AdapterError> {
        self.execute(args, false, 0)?;
        Ok(backend::with(|b| b.spi_processed()))
    }
}

/// `SPI_tuptable` and `SPI_processed` of the last statement, if it
/// returned rows.
fn current_result<'conn>() -> Option<SpiRows<'conn>> {
    let (table, processed) = backend::with(|b| (b.spi_tuptable(), b.spi_processed()));
    if table.is_null() {
        return None;
    }
    // SAFETY: SPI keeps the table until SPI_finish, which needs the
    // connection `'conn` borrows
    Some(unsafe { SpiRows::from_raw(table, processed) })
}
