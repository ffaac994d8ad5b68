//! # Lifecycle Cleanup Hook
//!
//! A privileged `DELETE` listener on each screen. It observes the
//! destruction of the screen and every descendant, and purges the registry
//! entries of each destroyed object whatever their event code.
//!
//! The object's own trampoline subscriptions are not removed; they go away
//! with the object's slot.

use crate::errors::BridgeError;
use crate::registry::CallbackRegistry;
use crate::widgets::{EventCode, Listener, ObjId, Subscription, WidgetTree};
use tracing::debug;

#[derive(Debug, Default)]
pub struct LifecycleHook {
    screens: Vec<ObjId>,
}

impl LifecycleHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes the hook on `screen`. Installing twice is a no-op.
    pub fn install(&mut self, tree: &mut WidgetTree, screen: ObjId) -> Result<(), BridgeError> {
        if self.is_installed(screen) {
            return Ok(());
        }
        tree.add_subscription(
            screen,
            Subscription {
                filter: EventCode::DELETE,
                user_data: None,
                listener: Listener::DestroyHook,
            },
        )?;
        self.screens.push(screen);
        debug!(screen = screen.to_raw(), "installed lifecycle hook");
        Ok(())
    }

    pub fn is_installed(&self, screen: ObjId) -> bool {
        self.screens.contains(&screen)
    }

    /// Runs when an observed object is destroyed; returns the callbacks
    /// released.
    pub fn on_destroyed<F: Clone>(&mut self, registry: &mut CallbackRegistry<F>, obj: ObjId) -> usize {
        self.screens.retain(|&s| s != obj);
        registry.purge_object(obj)
    }
}
