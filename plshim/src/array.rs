//! One-dimensional arrays of any element type.
//!
//! Building and taking apart an array needs the element type's storage
//! properties from the catalogs, so both directions go through the backend
//! and allocate in `CurrentMemoryContext`.

use crate::pg_sys::{self, backend, ArrayType, Datum, Oid};
use crate::varlena::detoast;

/// `DatumGetArrayTypeP(datum)`
///
/// # Safety
///
/// `datum` must point to an array.
#[inline]
pub unsafe fn datum_get_array(datum: Datum) -> *mut ArrayType {
    detoast(datum.cast_mut_ptr()).cast()
}

/// A one-dimensional array of `elems` with lower bound 1 and no NULLs,
/// as a `Datum`.
///
/// # Safety
///
/// Every element must be a valid datum of type `elem_type`.
pub unsafe fn array_to_datum(elem_type: Oid, elems: &[Datum]) -> Datum {
    let array = backend::with(|b| b.construct_array(elems, elem_type));
    tracing::trace!(elem_type, len = elems.len(), "construct_array");
    Datum::from(array)
}

/// The element type of the array `datum` points to.
///
/// # Safety
///
/// `datum` must point to an array.
pub unsafe fn array_elem_type(datum: Datum) -> Oid {
    pg_sys::ARR_ELEMTYPE(datum_get_array(datum))
}

/// The elements of the array `datum` points to, in storage order. NULL
/// elements read as the zero datum.
///
/// # Safety
///
/// `datum` must point to an array.
pub unsafe fn datum_to_array_raw(datum: Datum) -> (*mut Datum, usize) {
    let array = datum_get_array(datum);
    let (elems, n) = backend::with(|b| b.deconstruct_array(array));
    tracing::trace!(len = n, "deconstruct_array");
    (elems, n)
}

/// [`datum_to_array_raw`], copied out of the memory context.
///
/// # Safety
///
/// As for [`datum_to_array_raw`].
pub unsafe fn datum_to_array(datum: Datum) -> Vec<Datum> {
    let (elems, n) = datum_to_array_raw(datum);
    if n == 0 {
        return Vec::new();
    }
    core::slice::from_raw_parts(elems, n).to_vec()
}
