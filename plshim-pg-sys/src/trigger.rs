//! Trigger calls: the `TriggerData` node a trigger function finds in
//! `fcinfo->context`, and the `TRIGGER_FIRED_*` tests on its event word.
//!
//! `NodeTag` values are renumbered between server major versions, so the
//! tag that marks a `TriggerData` is not a constant here. It comes from the
//! [`Backend`](crate::Backend), and `PgBackend` reads it
//! from [`set_trigger_data_tag`], which the extension calls once at load
//! time with `T_TriggerData` from the server headers it was built against.

use crate::{backend, FunctionCallInfo, HeapTuple, Node};
use core::sync::atomic::{AtomicU32, Ordering};

/// `NodeTag`, a C enum.
pub type NodeTag = u32;

pub const T_Invalid: NodeTag = 0;

/// `TriggerEvent`
pub type TriggerEvent = u32;

pub const TRIGGER_EVENT_INSERT: TriggerEvent = 0x0;
pub const TRIGGER_EVENT_DELETE: TriggerEvent = 0x1;
pub const TRIGGER_EVENT_UPDATE: TriggerEvent = 0x2;
pub const TRIGGER_EVENT_TRUNCATE: TriggerEvent = 0x3;
pub const TRIGGER_EVENT_OPMASK: TriggerEvent = 0x3;

pub const TRIGGER_EVENT_ROW: TriggerEvent = 0x4;

pub const TRIGGER_EVENT_BEFORE: TriggerEvent = 0x8;
pub const TRIGGER_EVENT_AFTER: TriggerEvent = 0x0;
pub const TRIGGER_EVENT_INSTEAD: TriggerEvent = 0x10;
pub const TRIGGER_EVENT_TIMINGMASK: TriggerEvent = 0x18;

/// Opaque `RelationData`.
#[repr(C)]
pub struct RelationData {
    _private: [u8; 0],
}

pub type Relation = *mut RelationData;

/// Opaque `Trigger`.
#[repr(C)]
pub struct Trigger {
    _private: [u8; 0],
}

/// The leading fields of `TriggerData`, identical in every supported
/// version. The transition tables and column bitmaps that follow are not
/// described here.
#[repr(C)]
pub struct TriggerData {
    pub type_: NodeTag,
    pub tg_event: TriggerEvent,
    pub tg_relation: Relation,
    pub tg_trigtuple: HeapTuple,
    pub tg_newtuple: HeapTuple,
    pub tg_trigger: *mut Trigger,
}

/// `nodeTag(node)`: the tag every `Node` starts with.
///
/// # Safety
///
/// `node` must point to a live `Node`.
#[inline]
pub unsafe fn nodeTag(node: *const Node) -> NodeTag {
    node.cast::<NodeTag>().read()
}

/// `CALLED_AS_TRIGGER(fcinfo)`
///
/// # Safety
///
/// `fcinfo` must point to a live call block whose `context` is null or a
/// live `Node`.
///
/// # Panics
///
/// When `context` is set and the backend does not know the `TriggerData`
/// tag (see [`set_trigger_data_tag`]).
#[inline]
pub unsafe fn CALLED_AS_TRIGGER(fcinfo: FunctionCallInfo) -> bool {
    let context = (*fcinfo).context;
    if context.is_null() {
        return false;
    }
    let tag = backend::with(|b| b.trigger_data_tag()).unwrap_or_else(|| {
        panic!("the TriggerData node tag is unknown; call `set_trigger_data_tag` at load time")
    });
    nodeTag(context) == tag
}

#[inline]
pub fn TRIGGER_FIRED_BY_INSERT(event: TriggerEvent) -> bool {
    event & TRIGGER_EVENT_OPMASK == TRIGGER_EVENT_INSERT
}

#[inline]
pub fn TRIGGER_FIRED_BY_DELETE(event: TriggerEvent) -> bool {
    event & TRIGGER_EVENT_OPMASK == TRIGGER_EVENT_DELETE
}

#[inline]
pub fn TRIGGER_FIRED_BY_UPDATE(event: TriggerEvent) -> bool {
    event & TRIGGER_EVENT_OPMASK == TRIGGER_EVENT_UPDATE
}

#[inline]
pub fn TRIGGER_FIRED_BY_TRUNCATE(event: TriggerEvent) -> bool {
    event & TRIGGER_EVENT_OPMASK == TRIGGER_EVENT_TRUNCATE
}

#[inline]
pub fn TRIGGER_FIRED_FOR_ROW(event: TriggerEvent) -> bool {
    event & TRIGGER_EVENT_ROW != 0
}

#[inline]
pub fn TRIGGER_FIRED_FOR_STATEMENT(event: TriggerEvent) -> bool {
    !TRIGGER_FIRED_FOR_ROW(event)
}

#[inline]
pub fn TRIGGER_FIRED_BEFORE(event: TriggerEvent) -> bool {
    event & TRIGGER_EVENT_TIMINGMASK == TRIGGER_EVENT_BEFORE
}

#[inline]
pub fn TRIGGER_FIRED_AFTER(event: TriggerEvent) -> bool {
    event & TRIGGER_EVENT_TIMINGMASK == TRIGGER_EVENT_AFTER
}

#[inline]
pub fn TRIGGER_FIRED_INSTEAD(event: TriggerEvent) -> bool {
    event & TRIGGER_EVENT_TIMINGMASK == TRIGGER_EVENT_INSTEAD
}

static TRIGGER_DATA_TAG: AtomicU32 = AtomicU32::new(T_Invalid);

/// Record the server's `T_TriggerData`. Later calls overwrite earlier ones.
pub fn set_trigger_data_tag(tag: NodeTag) {
    TRIGGER_DATA_TAG.store(tag, Ordering::Relaxed);
}

/// The tag recorded by [`set_trigger_data_tag`], if any.
pub fn trigger_data_tag() -> Option<NodeTag> {
    match TRIGGER_DATA_TAG.load(Ordering::Relaxed) {
        T_Invalid => None,
        tag => Some(tag),
    }
}
