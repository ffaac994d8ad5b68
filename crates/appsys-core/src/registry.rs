//! # Callback Registry
//!
//! Maps `(object, event code)` keys to the ordered script callbacks
//! registered for them.
//!
//! ## Responsibilities
//! - **Register**: Creates the entry on first use (the caller then installs
//!   the native trampoline) and appends up to the capacity limit.
//! - **Unregister**: Drops the whole entry for an exact key; absent keys
//!   are a no-op.
//! - **Lookup**: Exact key first, then the object's wildcard key.
//! - **Purge**: Drops every entry of a destroyed object.
//!
//! The registry is generic over the callback type so it can hold Rhai
//! function pointers in the bridge and plain values in tests.

use crate::errors::BridgeError;
use crate::widgets::{EventCode, ObjId};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Composite key: the object plus a concrete or wildcard event code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackKey {
    pub obj: ObjId,
    pub code: EventCode,
}

impl CallbackKey {
    pub fn new(obj: ObjId, code: EventCode) -> Self {
        Self { obj, code }
    }

    pub fn wildcard(obj: ObjId) -> Self {
        Self::new(obj, EventCode::ALL)
    }
}

/// Callbacks registered for one key, in registration order.
#[derive(Clone, Debug)]
pub struct CallbackEntry<F> {
    pub key: CallbackKey,
    callbacks: Vec<F>,
}

impl<F> CallbackEntry<F> {
    pub fn callbacks(&self) -> &[F] {
        &self.callbacks
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// What a successful registration did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// First callback for the key; a trampoline must be installed.
    Created,
    /// Appended to an existing entry.
    Appended,
}

#[derive(Debug)]
pub struct CallbackRegistry<F> {
    entries: HashMap<CallbackKey, CallbackEntry<F>>,
    limit: usize,
}

impl<F: Clone> CallbackRegistry<F> {
    /// Creates an empty registry holding at most `limit` callbacks per key.
    pub fn new(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Appends `callback` to the entry for `key`, creating it if needed.
    ///
    /// A full entry rejects the callback and is left untouched.
    pub fn register(&mut self, key: CallbackKey, callback: F) -> Result<Registration, BridgeError> {
        let held = self.entries.get(&key).map_or(0, CallbackEntry::len);
        if held >= self.limit {
            warn!(obj = key.obj.to_raw(), code = key.code.0, limit = self.limit, "callback capacity reached");
            return Err(BridgeError::Capacity {
                code: key.code.0 as i64,
                limit: self.limit,
            });
        }

        let outcome = match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.callbacks.push(callback);
                Registration::Appended
            }
            None => {
                self.entries.insert(
                    key,
                    CallbackEntry {
                        key,
                        callbacks: vec![callback],
                    },
                );
                Registration::Created
            }
        };
        debug!(obj = key.obj.to_raw(), code = key.code.0, ?outcome, "registered callback");
        Ok(outcome)
    }

    /// Removes the entry for exactly `key`, wildcard or not.
    pub fn unregister(&mut self, key: CallbackKey) -> Option<CallbackEntry<F>> {
        let removed = self.entries.remove(&key);
        if let Some(entry) = &removed {
            debug!(obj = key.obj.to_raw(), code = key.code.0, released = entry.len(), "unregistered callbacks");
        }
        removed
    }

    /// The entry an event `(obj, code)` dispatches to.
    pub fn lookup_for_dispatch(&self, obj: ObjId, code: EventCode) -> Option<&CallbackEntry<F>> {
        self.entries
            .get(&CallbackKey::new(obj, code))
            .or_else(|| self.entries.get(&CallbackKey::wildcard(obj)))
    }

    /// Copies the callback list for a dispatch pass.
    ///
    /// Registrations made while the pass runs do not affect the copy.
    pub fn snapshot(&self, obj: ObjId, code: EventCode) -> Option<Vec<F>> {
        self.lookup_for_dispatch(obj, code)
            .map(|entry| entry.callbacks.clone())
    }

    /// Drops every entry keyed to `obj`; returns the callbacks released.
    pub fn purge_object(&mut self, obj: ObjId) -> usize {
        let mut released = 0;
        self.entries.retain(|key, entry| {
            if key.obj == obj {
                released += entry.len();
                false
            } else {
                true
            }
        });
        if released > 0 {
            debug!(obj = obj.to_raw(), released, "purged callbacks of destroyed object");
        }
        released
    }

    /// Releases every callback; returns how many were held.
    pub fn drain(&mut self) -> usize {
        let released = self.callback_count();
        self.entries.clear();
        released
    }

    pub fn get(&self, key: CallbackKey) -> Option<&CallbackEntry<F>> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: CallbackKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of entries (keys).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of callbacks across all entries.
    pub fn callback_count(&self) -> usize {
        self.entries.values().map(CallbackEntry::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJ: ObjId = ObjId {
        index: 0x1000,
        generation: 0,
    };
    const OTHER: ObjId = ObjId {
        index: 0x2000,
        generation: 0,
    };

    #[test]
    fn ninth_callback_is_rejected() {
        let mut registry = CallbackRegistry::new(8);
        let key = CallbackKey::new(OBJ, EventCode::CLICKED);
        assert_eq!(registry.register(key, 0).unwrap(), Registration::Created);
        for i in 1..8 {
            assert_eq!(registry.register(key, i).unwrap(), Registration::Appended);
        }

        let err = registry.register(key, 8).unwrap_err();
        assert_eq!(err, BridgeError::Capacity { code: 10, limit: 8 });
        assert!(err.to_string().starts_with("RangeError"));
        assert_eq!(registry.get(key).unwrap().callbacks(), &[0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn limit_is_a_policy_value() {
        let mut registry = CallbackRegistry::new(2);
        let key = CallbackKey::new(OBJ, EventCode::PRESSED);
        registry.register(key, "a").unwrap();
        registry.register(key, "b").unwrap();
        assert!(registry.register(key, "c").is_err());
    }

    #[test]
    fn exact_key_shadows_wildcard() {
        let mut registry = CallbackRegistry::new(8);
        registry.register(CallbackKey::new(OBJ, EventCode::CLICKED), "clicked").unwrap();
        registry.register(CallbackKey::wildcard(OBJ), "any").unwrap();

        assert_eq!(registry.snapshot(OBJ, EventCode::CLICKED).unwrap(), vec!["clicked"]);
        assert_eq!(registry.snapshot(OBJ, EventCode::RELEASED).unwrap(), vec!["any"]);
        assert!(registry.snapshot(OTHER, EventCode::CLICKED).is_none());
    }

    #[test]
    fn unregister_is_exact_and_idempotent() {
        let mut registry = CallbackRegistry::new(8);
        registry.register(CallbackKey::new(OBJ, EventCode::CLICKED), 1).unwrap();
        registry.register(CallbackKey::wildcard(OBJ), 2).unwrap();

        assert!(registry.unregister(CallbackKey::new(OBJ, EventCode::CLICKED)).is_some());
        assert!(registry.unregister(CallbackKey::new(OBJ, EventCode::CLICKED)).is_none());
        assert!(registry.contains(CallbackKey::wildcard(OBJ)));
    }

    #[test]
    fn purge_removes_every_code_of_the_object() {
        let mut registry = CallbackRegistry::new(8);
        registry.register(CallbackKey::new(OBJ, EventCode::CLICKED), 1).unwrap();
        registry.register(CallbackKey::new(OBJ, EventCode::CLICKED), 2).unwrap();
        registry.register(CallbackKey::new(OBJ, EventCode::VALUE_CHANGED), 3).unwrap();
        registry.register(CallbackKey::new(OTHER, EventCode::CLICKED), 4).unwrap();

        assert_eq!(registry.purge_object(OBJ), 3);
        assert!(registry.lookup_for_dispatch(OBJ, EventCode::CLICKED).is_none());
        assert!(registry.lookup_for_dispatch(OBJ, EventCode::VALUE_CHANGED).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn snapshot_is_detached_from_later_registrations() {
        let mut registry = CallbackRegistry::new(8);
        let key = CallbackKey::new(OBJ, EventCode::CLICKED);
        registry.register(key, 1).unwrap();
        let snapshot = registry.snapshot(OBJ, EventCode::CLICKED).unwrap();
        registry.register(key, 2).unwrap();
        assert_eq!(snapshot, vec![1]);
        assert_eq!(registry.drain(), 2);
        assert!(registry.is_empty());
    }
}
