//! # Bridge Context
//!
//! The per-interpreter state every installed wrapper shares: the widget
//! tree, the callback registry, the lifecycle hook and the configuration.
//!
//! ## Responsibilities
//! - **Registration**: `register_handler` / `unregister_handler`, with the
//!   trampoline installed once per key.
//! - **Delivery**: `deliver`, `send_event` and `pump` run dispatch passes
//!   without holding a borrow of the bridge while callbacks execute.
//! - **Deletion**: `delete_object` / `clean_object` deliver `DELETE`, purge
//!   the registry through the lifecycle hook and free the slots.
//! - **Teardown**: Releases every callback reference.
//!
//! Bridges are shared as `BridgeRef` (`Rc<RefCell<Bridge>>`). Script values
//! are not `Send`, so neither is the bridge.

use crate::config::BridgeConfig;
use crate::dispatch::{event_object, run_callbacks, DispatchReport, ScriptInvoker};
use crate::errors::BridgeError;
use crate::handle::Handle;
use crate::lifecycle::LifecycleHook;
use crate::registry::{CallbackKey, CallbackRegistry, Registration};
use crate::widgets::{
    DestroyNotice, EventCode, Listener, NativeEvent, ObjId, Subscription, WidgetClass, WidgetTree,
};
use rhai::FnPtr;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, trace, warn};

pub type BridgeRef = Rc<RefCell<Bridge>>;

pub struct Bridge {
    pub tree: WidgetTree,
    pub registry: CallbackRegistry<FnPtr>,
    hook: LifecycleHook,
    config: BridgeConfig,
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        let mut bridge = Self {
            tree: WidgetTree::new(config.display.width, config.display.height),
            registry: CallbackRegistry::new(config.max_callbacks_per_key),
            hook: LifecycleHook::new(),
            config,
        };
        bridge.ensure_root_hook();
        bridge
    }

    pub fn shared(config: BridgeConfig) -> BridgeRef {
        Rc::new(RefCell::new(Self::new(config)))
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    fn ensure_root_hook(&mut self) {
        let root = self.tree.root();
        if let Err(e) = self.hook.install(&mut self.tree, root) {
            warn!(error = %e, "failed to install lifecycle hook on active screen");
        }
    }

    /// The object handle of a live id.
    pub fn handle_of(&self, id: ObjId) -> Result<Handle, BridgeError> {
        Ok(Handle::object(id, self.tree.get(id)?.class))
    }

    /// Creates an object; parentless objects are screens and get the
    /// lifecycle hook.
    pub fn create_object(&mut self, class: WidgetClass, parent: Option<ObjId>) -> Result<ObjId, BridgeError> {
        let id = self.tree.create(class, parent)?;
        if parent.is_none() {
            self.hook.install(&mut self.tree, id)?;
        }
        trace!(obj = id.to_raw(), class = class.name(), "created object");
        Ok(id)
    }

    /// Appends `callback` for `(obj, code)`.
    ///
    /// The first registration for a key subscribes the trampoline, carrying
    /// `user_data` or, when absent, the object's own handle.
    pub fn register_handler(
        &mut self,
        obj: ObjId,
        code: EventCode,
        callback: FnPtr,
        user_data: Option<Handle>,
    ) -> Result<Registration, BridgeError> {
        let widget = self.tree.get(obj)?;
        if widget.deleting {
            return Err(BridgeError::ExpiredHandle { raw: obj.to_raw() });
        }
        let class = widget.class;

        let outcome = self.registry.register(CallbackKey::new(obj, code), callback)?;
        if outcome == Registration::Created {
            self.tree.add_subscription(
                obj,
                Subscription {
                    filter: code,
                    user_data: Some(user_data.unwrap_or(Handle::object(obj, class))),
                    listener: Listener::Trampoline,
                },
            )?;
            debug!(obj = obj.to_raw(), code = code.0, "installed trampoline");
        }
        Ok(outcome)
    }

    /// Drops every callback of the exact key. Absent keys are a no-op.
    pub fn unregister_handler(&mut self, obj: ObjId, code: EventCode) -> bool {
        let removed = self.registry.unregister(CallbackKey::new(obj, code)).is_some();
        if removed {
            self.tree.remove_subscription(obj, code, Listener::Trampoline);
        }
        removed
    }

    /// Releases every callback reference; returns how many were held.
    pub fn teardown(&mut self) -> usize {
        let released = self.registry.drain();
        info!(released, "bridge torn down");
        released
    }
}

/// Runs one dispatch pass for a fired event.
///
/// Events whose target has no registry entry, or is gone, are ignored.
pub fn deliver<I>(bridge: &BridgeRef, event: &NativeEvent, invoker: &mut I) -> Result<DispatchReport, BridgeError>
where
    I: ScriptInvoker<FnPtr> + ?Sized,
{
    let (callbacks, event_obj, policy) = {
        let b = bridge.borrow();
        let Some(callbacks) = b.registry.snapshot(event.target, event.code) else {
            trace!(obj = event.target.to_raw(), code = event.code.0, "no callbacks for event");
            return Ok(DispatchReport::default());
        };
        let Ok(target) = b.handle_of(event.target) else {
            return Ok(DispatchReport::default());
        };
        (
            callbacks,
            event_object(target, event.code, event.user_data),
            b.config.dispatch_errors,
        )
    };
    trace!(obj = event.target.to_raw(), code = event.code.0, callbacks = callbacks.len(), "dispatching event");
    run_callbacks(&callbacks, &event_obj, invoker, policy)
}

/// Fires `code` on `obj` and delivers it immediately.
pub fn send_event<I>(bridge: &BridgeRef, obj: ObjId, code: EventCode, invoker: &mut I) -> Result<DispatchReport, BridgeError>
where
    I: ScriptInvoker<FnPtr> + ?Sized,
{
    let event = {
        let b = bridge.borrow();
        b.tree.get(obj)?;
        b.tree.trampoline_event(obj, code)
    };
    match event {
        Some(event) => deliver(bridge, &event, invoker),
        None => Ok(DispatchReport::default()),
    }
}

/// Delivers every event queued so far. Events queued by the callbacks wait
/// for the next round.
pub fn pump<I>(bridge: &BridgeRef, invoker: &mut I) -> Result<DispatchReport, BridgeError>
where
    I: ScriptInvoker<FnPtr> + ?Sized,
{
    let events = bridge.borrow_mut().tree.take_pending();
    let mut report = DispatchReport::default();
    for event in &events {
        report.merge(deliver(bridge, event, invoker)?);
    }
    Ok(report)
}

/// Deletes `obj` and its descendants, children first.
///
/// Each object's `DELETE` callbacks run while it is still readable; the
/// slots are freed afterwards even if a callback failed.
pub fn delete_object<I>(bridge: &BridgeRef, obj: ObjId, invoker: &mut I) -> Result<DispatchReport, BridgeError>
where
    I: ScriptInvoker<FnPtr> + ?Sized,
{
    let notices = bridge.borrow_mut().tree.begin_delete(obj)?;
    finish(bridge, notices, invoker)
}

/// Deletes every child of `obj`.
pub fn clean_object<I>(bridge: &BridgeRef, obj: ObjId, invoker: &mut I) -> Result<DispatchReport, BridgeError>
where
    I: ScriptInvoker<FnPtr> + ?Sized,
{
    let notices = bridge.borrow_mut().tree.begin_clean(obj)?;
    finish(bridge, notices, invoker)
}

fn finish<I>(
    bridge: &BridgeRef,
    notices: Vec<DestroyNotice>,
    invoker: &mut I,
) -> Result<DispatchReport, BridgeError>
where
    I: ScriptInvoker<FnPtr> + ?Sized,
{
    let mut report = DispatchReport::default();
    let mut failure = None;
    for notice in &notices {
        if let Some(event) = &notice.delete_event {
            match deliver(bridge, event, invoker) {
                Ok(r) => report.merge(r),
                Err(e) => {
                    failure.get_or_insert(e);
                }
            }
        }
        if notice.observed {
            let mut b = bridge.borrow_mut();
            let Bridge { hook, registry, .. } = &mut *b;
            hook.on_destroyed(registry, notice.obj);
        }
    }

    {
        let mut b = bridge.borrow_mut();
        b.tree.finish_delete(&notices);
        b.ensure_root_hook();
    }
    debug!(deleted = notices.len(), "deleted objects");
    match failure {
        Some(e) => Err(e),
        None => Ok(report),
    }
}
