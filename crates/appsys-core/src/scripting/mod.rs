//! # Scripting Module
//!
//! Rhai bindings for the widget toolkit.
//!
//! ## Responsibilities
//! - **Handle Type**: Registers `Handle` with `ptr`, `kind` and `class`
//!   getters, equality and `to_map`.
//! - **Catalogue**: Installs the function entry tables of `api/`.
//! - **Constants**: `lvgl_enum` and `lv_font` static modules.
//! - **Output**: Routes script `print`/`debug` into `tracing`.
//!
//! ## Pattern
//! Every catalogue function is a `FuncEntry` whose wrapper receives a
//! `Call`; see `entry`.
//!
//! ## Module Structure
//! - `entry`: `FuncEntry`, `Call` and per-arity installation
//! - `api/`: Sub-modules for events, objects, widgets, natives and constants

pub mod api;
pub mod entry;

pub use entry::{Call, FuncEntry};

use crate::bridge::BridgeRef;
use crate::handle::Handle;
use rhai::{Dynamic, Engine, INT};

/// Registers the toolkit API into `engine`, bound to `bridge`.
///
/// Several engines may be bound to separate bridges in one process.
pub fn register_rhai_api(engine: &mut Engine, bridge: &BridgeRef) {
    register_handle_type(engine);
    api::register_all(engine, bridge);
}

fn register_handle_type(engine: &mut Engine) {
    engine.register_type_with_name::<Handle>("Handle");
    engine.register_get("ptr", |h: &mut Handle| -> INT { h.raw() });
    engine.register_get("kind", |h: &mut Handle| h.kind().tag().to_string());
    engine.register_get("class", |h: &mut Handle| h.class_name().to_string());
    engine.register_fn("==", |a: Handle, b: Handle| a == b);
    engine.register_fn("!=", |a: Handle, b: Handle| a != b);
    engine.register_fn("to_string", |h: &mut Handle| h.to_string());
    engine.register_fn("to_debug", |h: &mut Handle| format!("Handle({h})"));
    engine.register_fn("to_map", |h: &mut Handle| Dynamic::from_map(h.to_map()));
}
