//! # Widget Events
//!
//! Event codes, subscriptions and the native event record handed to the
//! dispatch engine.

use crate::handle::Handle;
use crate::widgets::ObjId;
use std::fmt;

/// Numeric event code, mirroring `lv_event_code_t`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventCode(pub i32);

impl EventCode {
    /// Wildcard: matches any event code for an object during lookup.
    pub const ALL: EventCode = EventCode(0);
    pub const PRESSED: EventCode = EventCode(1);
    pub const PRESSING: EventCode = EventCode(2);
    pub const PRESS_LOST: EventCode = EventCode(3);
    pub const SHORT_CLICKED: EventCode = EventCode(4);
    pub const LONG_PRESSED: EventCode = EventCode(8);
    pub const CLICKED: EventCode = EventCode(10);
    pub const RELEASED: EventCode = EventCode(11);
    pub const FOCUSED: EventCode = EventCode(19);
    pub const DEFOCUSED: EventCode = EventCode(20);
    pub const VALUE_CHANGED: EventCode = EventCode(35);
    pub const READY: EventCode = EventCode(38);
    pub const CANCEL: EventCode = EventCode(39);
    pub const DELETE: EventCode = EventCode(41);
    pub const SIZE_CHANGED: EventCode = EventCode(49);

    pub fn is_wildcard(self) -> bool {
        self == Self::ALL
    }
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who receives the events of a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Listener {
    /// The single per-key subscription that forwards into script callbacks.
    Trampoline,
    /// Observes `DELETE` of the object and of every descendant.
    DestroyHook,
}

/// One entry of an object's native event subscription list.
#[derive(Clone, Debug, PartialEq)]
pub struct Subscription {
    pub filter: EventCode,
    pub user_data: Option<Handle>,
    pub listener: Listener,
}

/// A fired event, as delivered by the toolkit to the trampoline.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeEvent {
    pub target: ObjId,
    pub code: EventCode,
    pub user_data: Option<Handle>,
}

/// Produced for every object taken down by a deletion.
#[derive(Clone, Debug, PartialEq)]
pub struct DestroyNotice {
    pub obj: ObjId,
    /// The `DELETE` event for the object's trampoline, if it has one.
    pub delete_event: Option<NativeEvent>,
    /// Whether a destroy hook on the object or one of its ancestors saw it.
    pub observed: bool,
}
