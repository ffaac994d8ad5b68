//! # Widgets Module
//!
//! The native retained-mode object graph scripts manipulate.
//!
//! ## Responsibilities
//! - **Arena**: Generation-tagged slots; freed ids stop resolving.
//! - **Hierarchy**: Screens, parents and children.
//! - **Events**: Per-object subscriptions and the pending event queue.
//! - **Deletion**: Two-phase delete with `DELETE` notices, children first.
//!
//! ## Module Structure
//! - `tree`: `WidgetTree` and `ObjId`
//! - `object`: `Widget`, `WidgetClass`, colors and style properties
//! - `event`: Event codes, subscriptions and native event records

pub mod event;
pub mod object;
pub mod tree;

pub use event::{DestroyNotice, EventCode, Listener, NativeEvent, Subscription};
pub use object::{Alignment, Rgb, StyleProp, StyleValue, Widget, WidgetClass};
pub use tree::{ObjId, WidgetTree};
