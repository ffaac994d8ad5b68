//! # API Module
//!
//! Aggregates the catalogue sub-modules and provides a single registration
//! point.
//!
//! ## Sub-modules
//! - **events**: Handler registration, event accessors, event delivery
//! - **objects**: Screens, hierarchy, geometry, flags, states and styles
//! - **widgets**: Per-class constructors, setters and getters
//! - **natives**: `delay`, `lv_delay_ms` and script output routing
//! - **constants**: `lvgl_enum` and `lv_font` static modules

pub mod constants;
pub mod events;
pub mod natives;
pub mod objects;
pub mod widgets;

use super::entry::install;
use crate::bridge::BridgeRef;
use rhai::Engine;

/// Register all API functions with the Rhai engine.
pub fn register_all(engine: &mut Engine, bridge: &BridgeRef) {
    install(engine, bridge, events::ENTRIES);
    install(engine, bridge, objects::ENTRIES);
    install(engine, bridge, widgets::ENTRIES);
    natives::register(engine);
    constants::register(engine);
}
