//! Dispatch Engine
//!
//! `ConditionalEvents` ties the registry, the observer controllers and the
//! adapters together. The host feeds it mutation records and layout
//! snapshots; every synthesized event is fanned out to the listeners of its
//! (target, event name) pair whose conditions pass.
//!
//! The handle is cheap to clone and callbacks may call back into it (add,
//! remove, activate). No borrow of the engine state is held while user code
//! runs.

use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use fos_dom::{DomTree, LayoutSnapshot, MutationRecord, NodeId};

use crate::adapter::{IntersectionAdapter, ResizeAdapter, normalize_mutation};
use crate::controllers::ObserverControllers;
use crate::{
    Callback, ConditionContext, ConditionalConfig, ConditionalError, ConditionalEvent,
    ConditionalEventsOptions, EventData, EventDetail, EventName, EventStorage, EventTarget,
    ListenerConfig, MediaEnvironment, SubscriptionKey, failing_field,
};

/// Conditional event listener engine
#[derive(Debug, Clone)]
pub struct ConditionalEvents {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Debug)]
struct Inner {
    options: ConditionalEventsOptions,
    storage: EventStorage,
    controllers: ObserverControllers,
    resize: ResizeAdapter,
    intersection: IntersectionAdapter,
    media: MediaEnvironment,
    custom_events: Vec<ConditionalEvent>,
}

impl Inner {
    /// Attach the pair's native subscription while it has an active
    /// listener, detach it otherwise, and drop state of emptied targets.
    fn sync_pair(&mut self, target: EventTarget, event_name: EventName) {
        let wanted = self.storage.has_active(target, event_name);
        match (wanted, self.storage.attached(target, event_name)) {
            (true, None) => {
                let options = &self.options.mutation_observer_options;
                if let Some(key) = SubscriptionKey::for_pair(target, event_name, options) {
                    self.controllers.attach(key);
                    self.storage.set_attached(target, event_name, Some(key));
                }
            }
            (false, Some(key)) => {
                self.controllers.detach(key);
                self.storage.set_attached(target, event_name, None);
            }
            _ => {}
        }

        if self.storage.prune(target, event_name) {
            self.resize.forget(target);
            if let Some(node) = target.element() {
                self.intersection.forget(node);
            }
        }
    }
}

impl ConditionalEvents {
    pub fn new(options: ConditionalEventsOptions) -> Self {
        let controllers = ObserverControllers::new(&options);
        Self {
            inner: Rc::new(RefCell::new(Inner {
                options,
                storage: EventStorage::new(),
                controllers,
                resize: ResizeAdapter::new(),
                intersection: IntersectionAdapter::new(),
                media: MediaEnvironment::new(),
                custom_events: Vec::new(),
            })),
        }
    }

    /// Register `callback` for `event_name` on `target`.
    ///
    /// Registering the same callback again on the same pair replaces its
    /// configs, keeping its place in dispatch order.
    pub fn add_conditional_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event_name: EventName,
        callback: &Callback,
        conditional_config: ConditionalConfig,
        listener_config: ListenerConfig,
    ) -> Result<(), ConditionalError> {
        let target = target.into();
        let mut inner = self.inner.borrow_mut();
        let options = &inner.options.mutation_observer_options;
        if SubscriptionKey::for_pair(target, event_name, options).is_none() {
            return Err(ConditionalError::UnsupportedTarget { target, event_name });
        }

        let replaced = inner.storage.insert(EventData::new(
            target,
            event_name,
            callback.clone(),
            conditional_config,
            listener_config,
        ));
        tracing::debug!(
            ?target,
            %event_name,
            replaced,
            lazy = listener_config.lazy,
            "listener added"
        );
        inner.sync_pair(target, event_name);
        Ok(())
    }

    /// Remove one registration; false if it did not exist
    pub fn remove_conditional_event_listener(
        &self,
        target: impl Into<EventTarget>,
        event_name: EventName,
        callback: &Callback,
    ) -> bool {
        self.remove_events(Some(event_name), Some(target.into()), Some(callback)) > 0
    }

    /// Remove every registration matching all given filters; `None` matches
    /// anything. Returns how many were removed.
    pub fn remove_events(
        &self,
        event_name: Option<EventName>,
        target: Option<EventTarget>,
        callback: Option<&Callback>,
    ) -> usize {
        let mut inner = self.inner.borrow_mut();
        let before = inner.storage.len();
        for (target, event_name) in inner.storage.remove_matching(event_name, target, callback) {
            inner.sync_pair(target, event_name);
        }
        let removed = before - inner.storage.len();
        tracing::debug!(?event_name, ?target, removed, "listeners removed");
        removed
    }

    /// Wake a lazy registration. False if no such registration exists.
    pub fn activate(
        &self,
        target: impl Into<EventTarget>,
        event_name: EventName,
        callback: &Callback,
    ) -> bool {
        let target = target.into();
        let mut inner = self.inner.borrow_mut();
        let Some(data) = inner.storage.find(target, event_name, callback) else {
            return false;
        };
        if !data.is_active() {
            data.activate();
            tracing::debug!(?target, %event_name, "lazy listener activated");
            inner.sync_pair(target, event_name);
        }
        true
    }

    pub fn has_listener(
        &self,
        target: impl Into<EventTarget>,
        event_name: EventName,
        callback: &Callback,
    ) -> bool {
        self.inner
            .borrow()
            .storage
            .find(target.into(), event_name, callback)
            .is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().storage.len()
    }

    /// Whether a native subscription is currently held
    pub fn is_subscribed(&self, key: &SubscriptionKey) -> bool {
        self.inner.borrow().controllers.is_subscribed(key)
    }

    /// Number of distinct native subscriptions held
    pub fn subscription_count(&self) -> usize {
        self.inner.borrow().controllers.subscription_count()
    }

    pub fn options(&self) -> ConditionalEventsOptions {
        self.inner.borrow().options.clone()
    }

    /// Replace the options, rebuild the native observers and re-attach
    /// every active pair under the new options.
    pub fn set_options(&self, options: ConditionalEventsOptions) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        inner.storage.clear_attached();
        inner.controllers = ObserverControllers::new(&options);
        inner.options = options;
        for (target, event_name) in inner.storage.pairs() {
            inner.sync_pair(target, event_name);
        }
        tracing::debug!(subscriptions = inner.controllers.subscription_count(), "options replaced");
    }

    pub fn media_environment(&self) -> MediaEnvironment {
        self.inner.borrow().media.clone()
    }

    /// Viewport width/height are still refreshed by each layout delivery
    pub fn set_media_environment(&self, media: MediaEnvironment) {
        self.inner.borrow_mut().media = media;
    }

    /// Drain events queued by the `custom_events` option
    pub fn take_custom_events(&self) -> Vec<ConditionalEvent> {
        std::mem::take(&mut self.inner.borrow_mut().custom_events)
    }

    /// Feed attribute mutations (as drained from the DOM) through the
    /// mutation observer and dispatch the resulting events.
    pub fn deliver_mutations(
        &self,
        dom: &DomTree,
        records: impl IntoIterator<Item = MutationRecord>,
    ) {
        let records = {
            let mut inner = self.inner.borrow_mut();
            for record in records {
                inner.controllers.mutation.record(record, dom);
            }
            inner.controllers.mutation.take_records()
        };

        for record in &records {
            for detail in normalize_mutation(record, dom) {
                let recipients = self.mutation_recipients(dom, record.target, detail.event_name());
                self.fire(dom, EventTarget::Element(record.target), &recipients, detail);
            }
        }
    }

    /// Run resize and intersection observation over a new layout and
    /// dispatch the resulting events.
    pub fn deliver_layout(&self, dom: &DomTree, layout: &LayoutSnapshot) {
        let (viewport, resize_entries, intersection_entries) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            inner.media.width = layout.viewport.width;
            inner.media.height = layout.viewport.height;

            let viewport = if inner.controllers.is_subscribed(&SubscriptionKey::Viewport) {
                inner.resize.normalize_viewport(layout.viewport)
            } else {
                None
            };
            inner.controllers.resize.check_sizes(layout);
            inner.controllers.intersection.check_intersections(layout);
            (
                viewport,
                inner.controllers.resize.take_entries(),
                inner.controllers.intersection.take_entries(),
            )
        };

        if let Some(detail) = viewport {
            let recipients = self.direct_recipients(EventTarget::Window, EventName::Resize);
            self.fire(dom, EventTarget::Window, &recipients, detail);
            self.commit_resize(EventTarget::Window, layout.viewport);
        }

        for entry in &resize_entries {
            let target = EventTarget::Element(entry.target);
            let detail = self.inner.borrow().resize.normalize_entry(entry);
            let recipients = self.direct_recipients(target, EventName::Resize);
            self.fire(dom, target, &recipients, detail);
            self.commit_resize(target, entry.content_rect);
        }

        for entry in &intersection_entries {
            let target = EventTarget::Element(entry.target);
            let details = self.inner.borrow().intersection.normalize_entry(entry);
            for detail in details {
                let recipients = self.direct_recipients(target, detail.event_name());
                self.fire(dom, target, &recipients, detail);
            }

            let mut inner = self.inner.borrow_mut();
            if inner.storage.has_target(target) {
                inner.intersection.commit(entry);
            }
        }
    }

    fn commit_resize(&self, target: EventTarget, rect: fos_dom::DOMRect) {
        let mut inner = self.inner.borrow_mut();
        if inner.storage.has_target(target) {
            inner.resize.commit(target, rect);
        }
    }

    /// The target itself, if its pair holds a subscription
    fn direct_recipients(&self, target: EventTarget, event_name: EventName) -> Vec<EventTarget> {
        let inner = self.inner.borrow();
        if inner.storage.attached(target, event_name).is_some() {
            vec![target]
        } else {
            Vec::new()
        }
    }

    /// `node`, then registered ancestors nearest first (with `subtree`),
    /// then the document; each only if its subscription covers `node`.
    fn mutation_recipients(
        &self,
        dom: &DomTree,
        node: NodeId,
        event_name: EventName,
    ) -> Vec<EventTarget> {
        let inner = self.inner.borrow();
        let ancestors: Vec<NodeId> = if inner.options.mutation_observer_options.subtree {
            dom.ancestors(node).collect()
        } else {
            Vec::new()
        };

        std::iter::once(node)
            .chain(ancestors)
            .map(EventTarget::Element)
            .chain(std::iter::once(EventTarget::Document))
            .filter(|&target| {
                inner
                    .storage
                    .attached(target, event_name)
                    .is_some_and(|key| key.covers(node, dom))
            })
            .collect()
    }

    fn fire(
        &self,
        dom: &DomTree,
        target: EventTarget,
        recipients: &[EventTarget],
        detail: EventDetail,
    ) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.options.custom_events {
                inner.custom_events.push(ConditionalEvent {
                    target,
                    current_target: target,
                    detail: detail.clone(),
                });
            }
        }

        for &current_target in recipients {
            let event = ConditionalEvent {
                target,
                current_target,
                detail: detail.clone(),
            };
            self.dispatch(dom, &event);
        }
    }

    /// Invoke the listeners of `event.current_target` whose conditions pass,
    /// in registration order. Works on a snapshot so removals made by
    /// callbacks never skip or repeat a sibling.
    fn dispatch(&self, dom: &DomTree, event: &ConditionalEvent) {
        let event_name = event.event_name();
        let (listeners, media) = {
            let inner = self.inner.borrow();
            (inner.storage.listeners(event.current_target, event_name), inner.media.clone())
        };
        let ctx = ConditionContext { dom, media: &media };

        for data in listeners {
            if data.is_removed() || !data.is_active() {
                continue;
            }

            let config = data.conditional_config();
            match catch_unwind(AssertUnwindSafe(|| failing_field(&ctx, &config, event))) {
                Ok(None) => {}
                Ok(Some(field)) => {
                    tracing::trace!(
                        ?event.current_target,
                        %event_name,
                        ?field,
                        "condition not met"
                    );
                    continue;
                }
                Err(_) => {
                    tracing::error!(
                        ?event.current_target,
                        %event_name,
                        "condition predicate panicked"
                    );
                    continue;
                }
            }

            let once = data.listener_config().once;
            if once {
                data.mark_removed();
            }

            tracing::trace!(?event.target, ?event.current_target, %event_name, "invoking listener");
            if catch_unwind(AssertUnwindSafe(|| data.callback.call(event))).is_err() {
                tracing::error!(?event.current_target, %event_name, "listener panicked");
            }

            if once {
                let mut inner = self.inner.borrow_mut();
                inner.storage.remove_entry(&data);
                inner.sync_pair(data.target, data.event_name);
            }
        }
    }
}

impl Default for ConditionalEvents {
    fn default() -> Self {
        Self::new(ConditionalEventsOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use fos_dom::DOMRect;

    fn counter() -> (Rc<Cell<usize>>, Callback) {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        (count, Callback::new(move |_| seen.set(seen.get() + 1)))
    }

    #[test]
    fn test_unsupported_target() {
        let events = ConditionalEvents::default();
        let (_, callback) = counter();
        let err = events
            .add_conditional_event_listener(
                EventTarget::Window,
                EventName::Visible,
                &callback,
                ConditionalConfig::new(),
                ListenerConfig::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ConditionalError::UnsupportedTarget { .. }));
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_subscription_follows_listeners() {
        let events = ConditionalEvents::default();
        let node = NodeId::from_raw(1);
        let (_, a) = counter();
        let (_, b) = counter();
        let key = SubscriptionKey::Resize(node);

        for callback in [&a, &b] {
            events
                .add_conditional_event_listener(
                    node,
                    EventName::Resize,
                    callback,
                    ConditionalConfig::new(),
                    ListenerConfig::default(),
                )
                .unwrap();
        }
        assert!(events.is_subscribed(&key));
        assert_eq!(events.subscription_count(), 1);

        assert!(events.remove_conditional_event_listener(node, EventName::Resize, &a));
        assert!(events.is_subscribed(&key));
        assert!(events.remove_conditional_event_listener(node, EventName::Resize, &b));
        assert!(!events.is_subscribed(&key));

        // Idempotent
        assert!(!events.remove_conditional_event_listener(node, EventName::Resize, &b));
    }

    #[test]
    fn test_window_resize() {
        let events = ConditionalEvents::default();
        let dom = DomTree::new();
        let rects = Rc::new(RefCell::new(Vec::new()));
        let seen = rects.clone();
        let callback = Callback::new(move |event| {
            if let EventDetail::Resize(detail) = &event.detail {
                seen.borrow_mut().push((detail.prev_rect.width, detail.rect.width));
            }
        });
        events
            .add_conditional_event_listener(
                EventTarget::Window,
                EventName::Resize,
                &callback,
                ConditionalConfig::new(),
                ListenerConfig::default(),
            )
            .unwrap();

        let small = LayoutSnapshot::new(DOMRect::from_xywh(0.0, 0.0, 400.0, 300.0));
        let large = LayoutSnapshot::new(DOMRect::from_xywh(0.0, 0.0, 900.0, 300.0));
        events.deliver_layout(&dom, &small);
        events.deliver_layout(&dom, &small);
        events.deliver_layout(&dom, &large);

        assert_eq!(*rects.borrow(), vec![(0.0, 400.0), (400.0, 900.0)]);
        assert_eq!(events.media_environment().width, 900.0);
    }
}
