//! # Events API
//!
//! Callback registration and event delivery for Rhai scripts.
//!
//! ## Responsibilities
//! - **Registration**: `register_event_handler(obj, code, fn, [user_data])`,
//!   `unregister_event_handler(obj, code)`
//! - **Event Accessors**: `lv_event_get_target`, `lv_event_get_code`,
//!   `lv_event_get_user_data`
//! - **Delivery**: `lv_obj_send_event` (synchronous), `lv_timer_handler`
//!   (drains queued events)

use crate::bridge;
use crate::errors::BridgeError;
use crate::handle::{decode_handle, decode_object, decode_user_data};
use crate::scripting::entry::{Call, FuncEntry};
use crate::widgets::EventCode;
use rhai::{Dynamic, FnPtr, Map, INT};

pub const ENTRIES: &[FuncEntry] = &[
    FuncEntry::new("register_event_handler", 3, 1, register_event_handler),
    FuncEntry::new("register_lv_event_handler", 3, 1, register_event_handler),
    FuncEntry::new("unregister_event_handler", 2, 0, unregister_event_handler),
    FuncEntry::new("unregister_lv_event_handler", 2, 0, unregister_event_handler),
    FuncEntry::new("lv_event_get_target", 1, 0, event_get_target),
    FuncEntry::new("lv_event_get_code", 1, 0, event_get_code),
    FuncEntry::new("lv_event_get_user_data", 1, 0, event_get_user_data),
    FuncEntry::new("lv_obj_send_event", 2, 0, obj_send_event),
    FuncEntry::new("lv_timer_handler", 0, 0, timer_handler),
];

fn register_event_handler(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let code = EventCode(call.i32(1)?);
    let callback_arg = call.arg(2)?;
    let callback = callback_arg
        .clone()
        .try_cast::<FnPtr>()
        .ok_or_else(|| BridgeError::arg_type(2, "a function", callback_arg.type_name()))?;
    let user_data = decode_user_data(call.opt(3), 3)?;

    call.bridge
        .borrow_mut()
        .register_handler(obj, code, callback, user_data)?;
    Ok(Dynamic::UNIT)
}

fn unregister_event_handler(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    // Liveness is not checked: unregistering from a deleted object is a no-op.
    let obj = decode_object(call.arg(0)?, 0)?;
    let code = EventCode(call.i32(1)?);
    call.bridge.borrow_mut().unregister_handler(obj, code);
    Ok(Dynamic::UNIT)
}

fn event_map(call: &Call<'_, '_>) -> Result<Map, BridgeError> {
    let value = call.arg(0)?;
    value
        .clone()
        .try_cast::<Map>()
        .ok_or_else(|| BridgeError::arg_type(0, "an event object", value.type_name()))
}

fn event_get_target(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let event = event_map(call)?;
    let target = event
        .get("target")
        .ok_or_else(|| BridgeError::arg_type(0, "an event object with a target", "object"))?;
    Ok(decode_handle(target, 0)?.to_dynamic())
}

fn event_get_code(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let event = event_map(call)?;
    event
        .get("code")
        .and_then(|c| c.as_int().ok())
        .map(Dynamic::from_int)
        .ok_or_else(|| BridgeError::arg_type(0, "an event object with a code", "object"))
}

fn event_get_user_data(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let event = event_map(call)?;
    Ok(event.get("user_data").cloned().unwrap_or(Dynamic::UNIT))
}

fn obj_send_event(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let obj = call.object(0)?;
    let code = EventCode(call.i32(1)?);
    let report = bridge::send_event(call.bridge, obj, code, &mut call.invoker())?;
    Ok(Dynamic::from_int(report.invoked as INT))
}

/// Delivers the queued events; returns how many callbacks ran.
fn timer_handler(call: &Call<'_, '_>) -> Result<Dynamic, BridgeError> {
    let report = bridge::pump(call.bridge, &mut call.invoker())?;
    Ok(Dynamic::from_int(report.invoked as INT))
}
