//! # Event Dispatch
//!
//! Runs the script callbacks of one fired event.
//!
//! ## Responsibilities
//! - **Event object**: `#{ code, type, target, user_data }` built from handles.
//! - **Invocation**: Calls every callback of the snapshot in order with the
//!   event object as the sole argument; return values are discarded.
//! - **Failures**: A throwing callback is logged and skipped under
//!   `Continue`; under `Abort` the pass stops and the failure surfaces.
//!
//! ## Invokers
//! - `ContextInvoker`: from inside a native function call.
//! - `EngineInvoker`: from the host, outside any script call.

use crate::errors::BridgeError;
use crate::handle::Handle;
use crate::widgets::EventCode;
use rhai::{Dynamic, Engine, FnPtr, Map, NativeCallContext, AST};
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

/// What happens to the rest of a pass when a callback throws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchErrorPolicy {
    #[default]
    Continue,
    Abort,
}

/// Calls one script callback with an event object.
pub trait ScriptInvoker<F> {
    fn invoke(&mut self, callback: &F, event: &Dynamic) -> Result<(), String>;
}

/// Invokes callbacks through the context of the native call in progress.
pub struct ContextInvoker<'a, 'c> {
    ctx: &'a NativeCallContext<'c>,
}

impl<'a, 'c> ContextInvoker<'a, 'c> {
    pub fn new(ctx: &'a NativeCallContext<'c>) -> Self {
        Self { ctx }
    }
}

impl ScriptInvoker<FnPtr> for ContextInvoker<'_, '_> {
    fn invoke(&mut self, callback: &FnPtr, event: &Dynamic) -> Result<(), String> {
        callback
            .call_within_context::<Dynamic>(self.ctx, (event.clone(),))
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Invokes callbacks from the host with the engine and the app's AST.
pub struct EngineInvoker<'a> {
    engine: &'a Engine,
    ast: &'a AST,
}

impl<'a> EngineInvoker<'a> {
    pub fn new(engine: &'a Engine, ast: &'a AST) -> Self {
        Self { engine, ast }
    }
}

impl ScriptInvoker<FnPtr> for EngineInvoker<'_> {
    fn invoke(&mut self, callback: &FnPtr, event: &Dynamic) -> Result<(), String> {
        callback
            .call::<Dynamic>(self.engine, self.ast, (event.clone(),))
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Outcome of one dispatch pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub invoked: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn merge(&mut self, other: DispatchReport) {
        self.invoked += other.invoked;
        self.failed += other.failed;
    }
}

/// Builds the script-visible event object.
pub fn event_object(target: Handle, code: EventCode, user_data: Option<Handle>) -> Dynamic {
    let mut map = Map::new();
    map.insert("code".into(), Dynamic::from_int(code.0 as i64));
    map.insert("type".into(), Dynamic::from_int(code.0 as i64));
    map.insert("target".into(), target.to_dynamic());
    if let Some(user_data) = user_data {
        map.insert("user_data".into(), user_data.to_dynamic());
    }
    Dynamic::from_map(map)
}

/// Invokes `callbacks` in order.
///
/// The slice is the snapshot taken before the pass; no registry borrow may
/// be held while this runs.
pub fn run_callbacks<F, I>(
    callbacks: &[F],
    event: &Dynamic,
    invoker: &mut I,
    policy: DispatchErrorPolicy,
) -> Result<DispatchReport, BridgeError>
where
    I: ScriptInvoker<F> + ?Sized,
{
    let mut report = DispatchReport::default();
    for (position, callback) in callbacks.iter().enumerate() {
        trace!(position, total = callbacks.len(), "invoking event callback");
        report.invoked += 1;
        if let Err(message) = invoker.invoke(callback, event) {
            report.failed += 1;
            match policy {
                DispatchErrorPolicy::Continue => {
                    error!(position, %message, "event callback threw; continuing");
                }
                DispatchErrorPolicy::Abort => {
                    error!(position, %message, "event callback threw; aborting pass");
                    return Err(BridgeError::Callback(message));
                }
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::ObjId;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        codes: Vec<i64>,
    }

    impl ScriptInvoker<&'static str> for Recorder {
        fn invoke(&mut self, callback: &&'static str, event: &Dynamic) -> Result<(), String> {
            self.calls.push(*callback);
            let map = event.clone().cast::<Map>();
            self.codes.push(map["code"].as_int().unwrap());
            if callback.starts_with("throw") {
                Err(format!("{callback} failed"))
            } else {
                Ok(())
            }
        }
    }

    fn target() -> Handle {
        Handle::object(
            ObjId {
                index: 0x1000,
                generation: 0,
            },
            crate::widgets::WidgetClass::Button,
        )
    }

    #[test]
    fn callbacks_run_in_registration_order() {
        let event = event_object(target(), EventCode::CLICKED, None);
        let mut recorder = Recorder::default();
        let report = run_callbacks(&["a", "b", "c"], &event, &mut recorder, DispatchErrorPolicy::Continue).unwrap();

        assert_eq!(recorder.calls, vec!["a", "b", "c"]);
        assert_eq!(recorder.codes, vec![10, 10, 10]);
        assert_eq!(report, DispatchReport { invoked: 3, failed: 0 });
    }

    #[test]
    fn continue_policy_runs_remaining_callbacks() {
        let event = event_object(target(), EventCode::CLICKED, None);
        let mut recorder = Recorder::default();
        let report = run_callbacks(&["a", "throw", "c"], &event, &mut recorder, DispatchErrorPolicy::Continue).unwrap();

        assert_eq!(recorder.calls, vec!["a", "throw", "c"]);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn abort_policy_stops_the_pass() {
        let event = event_object(target(), EventCode::CLICKED, None);
        let mut recorder = Recorder::default();
        let err = run_callbacks(&["a", "throw", "c"], &event, &mut recorder, DispatchErrorPolicy::Abort).unwrap_err();

        assert_eq!(recorder.calls, vec!["a", "throw"]);
        assert_eq!(err, BridgeError::Callback("throw failed".into()));
    }

    #[test]
    fn event_object_carries_handles() {
        let user = Handle::Pointer(0x42);
        let map = event_object(target(), EventCode::VALUE_CHANGED, Some(user)).cast::<Map>();

        assert_eq!(map["code"].as_int().unwrap(), 35);
        assert_eq!(map["target"].clone().cast::<Handle>(), target());
        assert_eq!(map["user_data"].clone().cast::<Handle>(), user);

        let bare = event_object(target(), EventCode::CLICKED, None).cast::<Map>();
        assert!(!bare.contains_key("user_data"));
    }
}
