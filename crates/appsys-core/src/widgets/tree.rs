use crate::errors::BridgeError;
use crate::widgets::event::{DestroyNotice, EventCode, Listener, NativeEvent, Subscription};
use crate::widgets::object::{Widget, WidgetClass};
use std::collections::VecDeque;
use tracing::debug;

/// Identifier of a native object: an arena slot plus the generation it was
/// allocated in.
///
/// Freeing a slot bumps its generation, so ids held past the object's
/// destruction no longer resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjId {
    pub index: u32,
    pub generation: u32,
}

impl ObjId {
    /// Packs the id into a single script integer, `generation << 32 | index`.
    pub fn to_raw(self) -> i64 {
        (((self.generation as u64) << 32) | self.index as u64) as i64
    }

    pub fn from_raw(raw: i64) -> Self {
        let bits = raw as u64;
        Self {
            index: (bits & 0xffff_ffff) as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

struct Slot {
    generation: u32,
    widget: Option<Widget>,
}

/// The retained-mode object graph.
///
/// Manages the arena of widgets, their parent/child relationships, their
/// event subscriptions and the queue of fired-but-undelivered events.
pub struct WidgetTree {
    slots: Vec<Slot>,
    /// Indices of freed slots, reused by later allocations.
    free_indices: Vec<u32>,
    root: ObjId,
    pending: VecDeque<(ObjId, EventCode)>,
    display: (i32, i32),
}

impl WidgetTree {
    /// Creates a tree holding one screen sized to the display.
    pub fn new(width: i32, height: i32) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free_indices: Vec::new(),
            root: ObjId {
                index: 0,
                generation: 0,
            },
            pending: VecDeque::new(),
            display: (width, height),
        };
        tree.root = tree.new_screen();
        tree
    }

    /// The active screen.
    pub fn root(&self) -> ObjId {
        self.root
    }

    fn alloc(&mut self, widget: Widget) -> ObjId {
        if let Some(index) = self.free_indices.pop() {
            let slot = &mut self.slots[index as usize];
            slot.widget = Some(widget);
            ObjId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                widget: Some(widget),
            });
            ObjId {
                index,
                generation: 0,
            }
        }
    }

    fn new_screen(&mut self) -> ObjId {
        let mut screen = Widget::new(WidgetClass::Obj, None);
        screen.width = self.display.0;
        screen.height = self.display.1;
        self.alloc(screen)
    }

    /// Creates an object of `class`. Without a parent the object is a screen.
    pub fn create(&mut self, class: WidgetClass, parent: Option<ObjId>) -> Result<ObjId, BridgeError> {
        let Some(parent) = parent else {
            let id = self.new_screen();
            if let Some(w) = self.slot_mut(id) {
                w.class = class;
            }
            return Ok(id);
        };
        // A parent mid-deletion would never free the new child.
        if self.get(parent)?.deleting {
            return Err(BridgeError::ExpiredHandle { raw: parent.to_raw() });
        }
        let id = self.alloc(Widget::new(class, Some(parent)));
        if let Some(p) = self.slot_mut(parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    fn slot_mut(&mut self, id: ObjId) -> Option<&mut Widget> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.widget.as_mut())
    }

    pub fn contains(&self, id: ObjId) -> bool {
        self.get(id).is_ok()
    }

    /// Resolves `id`, failing for ids whose object has been freed.
    pub fn get(&self, id: ObjId) -> Result<&Widget, BridgeError> {
        self.slots
            .get(id.index as usize)
            .filter(|s| s.generation == id.generation)
            .and_then(|s| s.widget.as_ref())
            .ok_or(BridgeError::ExpiredHandle { raw: id.to_raw() })
    }

    pub fn get_mut(&mut self, id: ObjId) -> Result<&mut Widget, BridgeError> {
        self.slot_mut(id)
            .ok_or(BridgeError::ExpiredHandle { raw: id.to_raw() })
    }

    /// Number of live objects, screens included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.widget.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add_subscription(&mut self, id: ObjId, sub: Subscription) -> Result<(), BridgeError> {
        debug!(obj = id.to_raw(), filter = sub.filter.0, listener = ?sub.listener, "add event subscription");
        self.get_mut(id)?.subscriptions.push(sub);
        Ok(())
    }

    /// Removes the subscriptions of `listener` for exactly `filter`.
    pub fn remove_subscription(&mut self, id: ObjId, filter: EventCode, listener: Listener) {
        if let Some(widget) = self.slot_mut(id) {
            widget
                .subscriptions
                .retain(|s| !(s.filter == filter && s.listener == listener));
        }
    }

    /// The event the trampoline receives when `code` fires on `id`.
    ///
    /// The exact-code subscription wins over the wildcard one, so a fired
    /// event reaches the trampoline at most once.
    pub fn trampoline_event(&self, id: ObjId, code: EventCode) -> Option<NativeEvent> {
        let widget = self.get(id).ok()?;
        let trampolines = || {
            widget
                .subscriptions
                .iter()
                .filter(|s| s.listener == Listener::Trampoline)
        };
        let sub = trampolines()
            .find(|s| s.filter == code)
            .or_else(|| trampolines().find(|s| s.filter.is_wildcard()))?;
        Some(NativeEvent {
            target: id,
            code,
            user_data: sub.user_data,
        })
    }

    /// Fires `code` on `id`; delivery happens on the next `take_pending`.
    pub fn queue_event(&mut self, id: ObjId, code: EventCode) -> Result<(), BridgeError> {
        self.get(id)?;
        self.pending.push_back((id, code));
        Ok(())
    }

    /// Queues the press/release/click sequence of a pointer click.
    pub fn simulate_click(&mut self, id: ObjId) -> Result<(), BridgeError> {
        for code in [EventCode::PRESSED, EventCode::RELEASED, EventCode::CLICKED] {
            self.queue_event(id, code)?;
        }
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drains the fired events that some trampoline subscribes to.
    pub fn take_pending(&mut self) -> Vec<NativeEvent> {
        let queued: Vec<_> = self.pending.drain(..).collect();
        queued
            .into_iter()
            .filter_map(|(id, code)| self.trampoline_event(id, code))
            .collect()
    }

    fn observed_by_hook(&self, id: ObjId) -> bool {
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            let Ok(widget) = self.get(cur) else {
                return false;
            };
            if widget
                .subscriptions
                .iter()
                .any(|s| s.listener == Listener::DestroyHook)
            {
                return true;
            }
            cursor = widget.parent;
        }
        false
    }

    fn collect_post_order(&self, id: ObjId, out: &mut Vec<ObjId>) {
        if let Ok(widget) = self.get(id) {
            for &child in &widget.children {
                self.collect_post_order(child, out);
            }
            out.push(id);
        }
    }

    /// First phase of deletion: marks `id` and its descendants as deleting
    /// and reports them children-first.
    ///
    /// Objects stay resolvable until `finish_delete`, so `DELETE` handlers
    /// can still read them. Deleting an object already being deleted yields
    /// no notices.
    pub fn begin_delete(&mut self, id: ObjId) -> Result<Vec<DestroyNotice>, BridgeError> {
        if self.get(id)?.deleting {
            return Ok(Vec::new());
        }
        let mut doomed = Vec::new();
        self.collect_post_order(id, &mut doomed);
        // Descendants already under an outer deletion are reported there.
        doomed.retain(|&obj| self.get(obj).is_ok_and(|w| !w.deleting));

        let notices: Vec<DestroyNotice> = doomed
            .iter()
            .map(|&obj| DestroyNotice {
                obj,
                delete_event: self.trampoline_event(obj, EventCode::DELETE),
                observed: self.observed_by_hook(obj),
            })
            .collect();
        for &obj in &doomed {
            if let Some(w) = self.slot_mut(obj) {
                w.deleting = true;
            }
        }
        Ok(notices)
    }

    /// First phase of deleting every child of `id`.
    pub fn begin_clean(&mut self, id: ObjId) -> Result<Vec<DestroyNotice>, BridgeError> {
        let children = self.get(id)?.children.clone();
        let mut notices = Vec::new();
        for child in children {
            notices.extend(self.begin_delete(child)?);
        }
        Ok(notices)
    }

    /// Second phase of deletion: detaches and frees the reported objects.
    ///
    /// If the active screen went away a fresh one replaces it.
    pub fn finish_delete(&mut self, notices: &[DestroyNotice]) {
        for notice in notices {
            let parent = self.get(notice.obj).ok().and_then(|w| w.parent);
            if let Some(p) = parent.and_then(|p| self.slot_mut(p)) {
                p.children.retain(|&c| c != notice.obj);
            }
            if let Some(slot) = self.slots.get_mut(notice.obj.index as usize) {
                if slot.generation == notice.obj.generation && slot.widget.take().is_some() {
                    slot.generation = slot.generation.wrapping_add(1);
                    self.free_indices.push(notice.obj.index);
                }
            }
        }
        self.pending.retain(|(id, _)| {
            self.slots
                .get(id.index as usize)
                .is_some_and(|s| s.generation == id.generation && s.widget.is_some())
        });
        if !self.contains(self.root) {
            self.root = self.new_screen();
        }
    }
}
