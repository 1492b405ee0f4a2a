//! Event Registry
//!
//! Target → event name → registered callbacks, in registration order.
//! Entries are shared with in-flight dispatches through `Rc`; removal marks
//! an entry so a dispatch holding a snapshot skips it, while re-registration
//! updates the same entry so that snapshot still sees it.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::{
    Callback, ConditionalConfig, EventName, EventTarget, ListenerConfig, SubscriptionKey,
};

/// One registered callback
#[derive(Debug)]
pub struct EventData {
    pub target: EventTarget,
    pub event_name: EventName,
    pub callback: Callback,
    conditional_config: RefCell<Rc<ConditionalConfig>>,
    listener_config: Cell<ListenerConfig>,
    active: Cell<bool>,
    removed: Cell<bool>,
}

impl EventData {
    /// Lazy registrations start inactive
    pub fn new(
        target: EventTarget,
        event_name: EventName,
        callback: Callback,
        conditional_config: ConditionalConfig,
        listener_config: ListenerConfig,
    ) -> Self {
        Self {
            target,
            event_name,
            callback,
            conditional_config: RefCell::new(Rc::new(conditional_config)),
            listener_config: Cell::new(listener_config),
            active: Cell::new(!listener_config.lazy),
            removed: Cell::new(false),
        }
    }

    /// Current conditions; a later re-registration does not affect the
    /// returned value
    pub fn conditional_config(&self) -> Rc<ConditionalConfig> {
        self.conditional_config.borrow().clone()
    }

    pub fn listener_config(&self) -> ListenerConfig {
        self.listener_config.get()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn is_removed(&self) -> bool {
        self.removed.get()
    }

    pub(crate) fn activate(&self) {
        self.active.set(true);
    }

    pub(crate) fn mark_removed(&self) {
        self.removed.set(true);
    }

    /// Take over the configs of a re-registration of the same callback
    fn reconfigure(&self, other: EventData) {
        let listener_config = other.listener_config.get();
        *self.conditional_config.borrow_mut() = other.conditional_config.into_inner();
        self.listener_config.set(listener_config);
        self.active.set(!listener_config.lazy);
    }
}

#[derive(Debug, Default)]
struct EventStorageData {
    /// Native subscription held for this pair, if any
    attached: Option<SubscriptionKey>,
    callbacks: Vec<Rc<EventData>>,
}

/// Two-level side table of registrations
#[derive(Debug, Default)]
pub struct EventStorage {
    targets: HashMap<EventTarget, HashMap<EventName, EventStorageData>>,
}

impl EventStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a registration. An existing entry for the same callback on the
    /// same pair takes over the new configs in place; returns true in that
    /// case. An entry already marked removed (a `once` listener in flight)
    /// is swapped for a fresh one at the same position instead.
    pub fn insert(&mut self, data: EventData) -> bool {
        let slot = self
            .targets
            .entry(data.target)
            .or_default()
            .entry(data.event_name)
            .or_default();

        match slot.callbacks.iter_mut().find(|d| d.callback.ptr_eq(&data.callback)) {
            Some(existing) if existing.is_removed() => {
                *existing = Rc::new(data);
                true
            }
            Some(existing) => {
                existing.reconfigure(data);
                true
            }
            None => {
                slot.callbacks.push(Rc::new(data));
                false
            }
        }
    }

    /// Snapshot of the callbacks of a pair, in registration order
    pub fn listeners(&self, target: EventTarget, event_name: EventName) -> Vec<Rc<EventData>> {
        self.slot(target, event_name)
            .map(|slot| slot.callbacks.clone())
            .unwrap_or_default()
    }

    pub fn find(
        &self,
        target: EventTarget,
        event_name: EventName,
        callback: &Callback,
    ) -> Option<Rc<EventData>> {
        self.slot(target, event_name)?
            .callbacks
            .iter()
            .find(|d| d.callback.ptr_eq(callback))
            .cloned()
    }

    pub fn contains_pair(&self, target: EventTarget, event_name: EventName) -> bool {
        self.slot(target, event_name).is_some()
    }

    /// Whether any callback of the pair is active (not lazy-dormant)
    pub fn has_active(&self, target: EventTarget, event_name: EventName) -> bool {
        self.slot(target, event_name)
            .is_some_and(|slot| slot.callbacks.iter().any(|d| d.is_active()))
    }

    /// Remove every registration matching all given filters.
    /// Returns the pairs that lost at least one callback.
    pub fn remove_matching(
        &mut self,
        event_name: Option<EventName>,
        target: Option<EventTarget>,
        callback: Option<&Callback>,
    ) -> Vec<(EventTarget, EventName)> {
        let mut touched = Vec::new();
        for (&t, names) in &mut self.targets {
            if target.is_some_and(|wanted| wanted != t) {
                continue;
            }
            for (&name, slot) in names.iter_mut() {
                if event_name.is_some_and(|wanted| wanted != name) {
                    continue;
                }
                let before = slot.callbacks.len();
                slot.callbacks.retain(|d| {
                    let matched = callback.is_none_or(|cb| d.callback.ptr_eq(cb));
                    if matched {
                        d.mark_removed();
                    }
                    !matched
                });
                if slot.callbacks.len() != before {
                    touched.push((t, name));
                }
            }
        }
        touched
    }

    /// Remove one specific registration (not a replacement of it)
    pub fn remove_entry(&mut self, data: &Rc<EventData>) -> bool {
        data.mark_removed();
        let Some(slot) = self.slot_mut(data.target, data.event_name) else {
            return false;
        };
        let before = slot.callbacks.len();
        slot.callbacks.retain(|d| !Rc::ptr_eq(d, data));
        slot.callbacks.len() != before
    }

    pub fn attached(&self, target: EventTarget, event_name: EventName) -> Option<SubscriptionKey> {
        self.slot(target, event_name).and_then(|slot| slot.attached)
    }

    pub(crate) fn set_attached(
        &mut self,
        target: EventTarget,
        event_name: EventName,
        key: Option<SubscriptionKey>,
    ) {
        if let Some(slot) = self.slot_mut(target, event_name) {
            slot.attached = key;
        }
    }

    /// Forget every attachment, returning the pairs that had one
    pub(crate) fn clear_attached(&mut self) -> Vec<(EventTarget, EventName)> {
        let mut pairs = Vec::new();
        for (&target, names) in &mut self.targets {
            for (&name, slot) in names.iter_mut() {
                if slot.attached.take().is_some() {
                    pairs.push((target, name));
                }
            }
        }
        pairs
    }

    /// Every registered pair
    pub fn pairs(&self) -> Vec<(EventTarget, EventName)> {
        self.targets
            .iter()
            .flat_map(|(&target, names)| names.keys().map(move |&name| (target, name)))
            .collect()
    }

    /// Drop a pair once it has no callbacks left and no attachment, and the
    /// target once it has no pairs. Returns true if the target is gone.
    pub(crate) fn prune(&mut self, target: EventTarget, event_name: EventName) -> bool {
        let Some(names) = self.targets.get_mut(&target) else {
            return true;
        };
        if names
            .get(&event_name)
            .is_some_and(|slot| slot.callbacks.is_empty() && slot.attached.is_none())
        {
            names.remove(&event_name);
        }
        if names.is_empty() {
            self.targets.remove(&target);
            return true;
        }
        false
    }

    pub fn has_target(&self, target: EventTarget) -> bool {
        self.targets.contains_key(&target)
    }

    /// Total number of registrations
    pub fn len(&self) -> usize {
        self.targets
            .values()
            .flat_map(HashMap::values)
            .map(|slot| slot.callbacks.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, target: EventTarget, event_name: EventName) -> Option<&EventStorageData> {
        self.targets.get(&target)?.get(&event_name)
    }

    fn slot_mut(
        &mut self,
        target: EventTarget,
        event_name: EventName,
    ) -> Option<&mut EventStorageData> {
        self.targets.get_mut(&target)?.get_mut(&event_name)
    }
}
