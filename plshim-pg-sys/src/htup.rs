//! Tuples and tuple descriptors, as handed out by SPI.

use crate::Oid;
use core::ffi::c_int;

/// Opaque `HeapTupleData`. Attributes are only ever read through
/// [`Backend::heap_getattr`](crate::Backend::heap_getattr).
#[repr(C)]
pub struct HeapTupleData {
    _private: [u8; 0],
}

pub type HeapTuple = *mut HeapTupleData;

/// Opaque `TupleConstr`.
#[repr(C)]
pub struct TupleConstr {
    _private: [u8; 0],
}

/// The fixed prefix of `TupleDescData`. The `attrs` array follows it in
/// memory and is not described here.
#[repr(C)]
pub struct TupleDescData {
    pub natts: c_int,
    pub tdtypeid: Oid,
    pub tdtypmod: i32,
    pub tdrefcount: c_int,
    pub constr: *mut TupleConstr,
}

pub type TupleDesc = *mut TupleDescData;

/// The public prefix of `SPITupleTable` (Postgres 13+ layout). The private
/// bookkeeping fields that follow are not described here.
#[repr(C)]
pub struct SPITupleTable {
    pub tupdesc: TupleDesc,
    pub vals: *mut HeapTuple,
    pub numvals: u64,
}
