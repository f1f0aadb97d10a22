//! Trigger functions.
//!
//! A function is running as a trigger when the executor left a
//! `TriggerData` node in `fcinfo->context`. [`FcInfo::trigger`] hands that
//! node out as a [`TriggerCall`], which answers the `TRIGGER_FIRED_*`
//! questions about the event and gives access to the affected rows.

use crate::error::AdapterError;
use crate::fcinfo::FcInfo;
use crate::pg_sys::{self, HeapTuple, TriggerData, TriggerEvent};
use core::{fmt, marker::PhantomData, ptr::NonNull};

/// `BEFORE`, `AFTER` or `INSTEAD OF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerWhen {
    Before,
    After,
    InsteadOf,
}

/// `FOR EACH ROW` or `FOR EACH STATEMENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerLevel {
    Row,
    Statement,
}

/// The statement that fired the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOp {
    Insert,
    Update,
    Delete,
    Truncate,
}

impl fmt::Display for TriggerWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriggerWhen::Before => "BEFORE",
            TriggerWhen::After => "AFTER",
            TriggerWhen::InsteadOf => "INSTEAD OF",
        })
    }
}

impl fmt::Display for TriggerOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriggerOp::Insert => "INSERT",
            TriggerOp::Update => "UPDATE",
            TriggerOp::Delete => "DELETE",
            TriggerOp::Truncate => "TRUNCATE",
        })
    }
}

/// The `TriggerData` of the current call.
#[derive(Clone, Copy)]
pub struct TriggerCall<'fcx> {
    data: NonNull<TriggerData>,
    _marker: PhantomData<&'fcx TriggerData>,
}

impl<'fcx> TriggerCall<'fcx> {
    /// # Safety
    ///
    /// `data` must be the live `TriggerData` of the current call.
    pub unsafe fn from_ptr(data: *mut TriggerData) -> TriggerCall<'fcx> {
        debug_assert!(!data.is_null(), "null TriggerData");
        TriggerCall { data: NonNull::new_unchecked(data), _marker: PhantomData }
    }

    #[inline]
    pub fn as_ptr(&self) -> *mut TriggerData {
        self.data.as_ptr()
    }

    /// `tg_event`
    #[inline]
    pub fn event(&self) -> TriggerEvent {
        unsafe { self.data.as_ref().tg_event }
    }

    pub fn when(&self) -> TriggerWhen {
        let event = self.event();
        if pg_sys::TRIGGER_FIRED_BEFORE(event) {
            TriggerWhen::Before
        } else if pg_sys::TRIGGER_FIRED_INSTEAD(event) {
            TriggerWhen::InsteadOf
        } else {
            TriggerWhen::After
        }
    }

    pub fn level(&self) -> TriggerLevel {
        if pg_sys::TRIGGER_FIRED_FOR_ROW(self.event()) {
            TriggerLevel::Row
        } else {
            TriggerLevel::Statement
        }
    }

    pub fn op(&self) -> TriggerOp {
        let event = self.event();
        if pg_sys::TRIGGER_FIRED_BY_INSERT(event) {
            TriggerOp::Insert
        } else if pg_sys::TRIGGER_FIRED_BY_UPDATE(event) {
            TriggerOp::Update
        } else if pg_sys::TRIGGER_FIRED_BY_DELETE(event) {
            TriggerOp::Delete
        } else {
            TriggerOp::Truncate
        }
    }

    /// `tg_trigtuple`: the inserted row, the deleted row, or the old version
    /// of an updated row. `None` for statement-level triggers.
    #[inline]
    pub fn trigtuple(&self) -> Option<HeapTuple> {
        let tuple = unsafe { self.data.as_ref().tg_trigtuple };
        (!tuple.is_null()).then_some(tuple)
    }

    /// `tg_newtuple`: the new version of an updated row.
    #[inline]
    pub fn newtuple(&self) -> Option<HeapTuple> {
        let tuple = unsafe { self.data.as_ref().tg_newtuple };
        (!tuple.is_null()).then_some(tuple)
    }
}

impl<'fcx> FcInfo<'fcx> {
    /// `CALLED_AS_TRIGGER(fcinfo)`
    ///
    /// # Panics
    ///
    /// When the call has a context node and the backend does not know the
    /// `TriggerData` tag.
    #[inline]
    pub fn called_as_trigger(&self) -> bool {
        // SAFETY: an FcInfo's context is null or a live node
        unsafe { pg_sys::CALLED_AS_TRIGGER(self.as_ptr()) }
    }

    /// The call's `TriggerData`, or [`AdapterError::NotATrigger`].
    pub fn trigger(&self) -> Result<TriggerCall<'fcx>, AdapterError> {
        if !self.called_as_trigger() {
            return Err(AdapterError::NotATrigger);
        }
        let data = unsafe { (*self.as_ptr()).context.cast::<TriggerData>() };
        let call = unsafe { TriggerCall::from_ptr(data) };
        tracing::trace!(event = call.event(), "trigger call");
        Ok(call)
    }
}
