//! Observer Controllers
//!
//! Own the three native observers and reference-count the subscriptions
//! registered pairs hold on them. A node is observed while at least one
//! subscription needs it.

use std::collections::HashMap;

use fos_dom::observer::{
    IntersectionObserver, MutationObserver, ResizeObserver, ResizeObserverBoxOptions,
};
use fos_dom::{DomTree, NodeId};

use crate::{ConditionalEventsOptions, EventName, EventTarget, MutationOptions, ObserverKind};

/// Native subscription a (target, event name) pair needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionKey {
    /// Attribute mutations of `node`, and of its descendants with `subtree`
    Mutation { node: NodeId, subtree: bool },
    Resize(NodeId),
    /// Viewport size changes, for `Window`
    Viewport,
    Intersection(NodeId),
}

impl SubscriptionKey {
    /// None when the event cannot be observed on the target
    pub fn for_pair(
        target: EventTarget,
        event_name: EventName,
        options: &MutationOptions,
    ) -> Option<Self> {
        match (target, event_name.observer_kind()) {
            (EventTarget::Element(node), ObserverKind::Mutation) => {
                Some(if options.global_single_listener {
                    Self::Mutation {
                        node: options.root_element.unwrap_or(NodeId::ROOT),
                        subtree: true,
                    }
                } else {
                    Self::Mutation {
                        node,
                        subtree: options.subtree,
                    }
                })
            }
            (EventTarget::Element(node), ObserverKind::Resize) => Some(Self::Resize(node)),
            (EventTarget::Element(node), ObserverKind::Intersection) => {
                Some(Self::Intersection(node))
            }
            (EventTarget::Document, ObserverKind::Mutation) => Some(Self::Mutation {
                node: NodeId::ROOT,
                subtree: true,
            }),
            (EventTarget::Window, ObserverKind::Resize) => Some(Self::Viewport),
            _ => None,
        }
    }

    /// Whether a mutation of `node` is seen through this subscription
    pub fn covers(&self, node: NodeId, dom: &DomTree) -> bool {
        match *self {
            Self::Mutation { node: observed, subtree } => {
                observed == node || (subtree && dom.is_descendant_of(node, observed))
            }
            Self::Resize(observed) | Self::Intersection(observed) => observed == node,
            Self::Viewport => false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ObserverControllers {
    pub(crate) mutation: MutationObserver,
    pub(crate) resize: ResizeObserver,
    pub(crate) intersection: IntersectionObserver,
    mutation_options: MutationOptions,
    box_options: ResizeObserverBoxOptions,
    refs: HashMap<SubscriptionKey, usize>,
}

impl ObserverControllers {
    pub(crate) fn new(options: &ConditionalEventsOptions) -> Self {
        Self {
            mutation: MutationObserver::new(),
            resize: ResizeObserver::new(),
            intersection: IntersectionObserver::new(
                (&options.intersection_observer_options).into(),
            ),
            mutation_options: options.mutation_observer_options,
            box_options: options.resize_observer_options.box_model.into(),
            refs: HashMap::new(),
        }
    }

    /// Native observer serving `key`; the viewport has none
    pub(crate) fn observer_id(&self, key: SubscriptionKey) -> Option<u64> {
        match key {
            SubscriptionKey::Mutation { .. } => Some(self.mutation.id()),
            SubscriptionKey::Resize(_) => Some(self.resize.id()),
            SubscriptionKey::Intersection(_) => Some(self.intersection.id()),
            SubscriptionKey::Viewport => None,
        }
    }

    pub(crate) fn attach(&mut self, key: SubscriptionKey) {
        let count = self.refs.entry(key).or_insert(0);
        *count += 1;
        if *count > 1 {
            return;
        }

        tracing::debug!(?key, observer = ?self.observer_id(key), "attaching observer");
        match key {
            SubscriptionKey::Mutation { node, .. } => self.sync_mutation(node),
            SubscriptionKey::Resize(node) => self.resize.observe(node, self.box_options),
            SubscriptionKey::Intersection(node) => self.intersection.observe(node),
            SubscriptionKey::Viewport => {}
        }
    }

    pub(crate) fn detach(&mut self, key: SubscriptionKey) {
        let Some(count) = self.refs.get_mut(&key) else {
            return;
        };
        *count -= 1;
        if *count > 0 {
            return;
        }
        self.refs.remove(&key);

        tracing::debug!(?key, observer = ?self.observer_id(key), "detaching observer");
        match key {
            SubscriptionKey::Mutation { node, .. } => self.sync_mutation(node),
            SubscriptionKey::Resize(node) => self.resize.unobserve(node),
            SubscriptionKey::Intersection(node) => self.intersection.unobserve(node),
            SubscriptionKey::Viewport => {}
        }
    }

    pub(crate) fn is_subscribed(&self, key: &SubscriptionKey) -> bool {
        self.refs.contains_key(key)
    }

    pub(crate) fn subscription_count(&self) -> usize {
        self.refs.len()
    }

    /// One native observation per node; it takes `subtree` if any live key
    /// on that node asks for it.
    fn sync_mutation(&mut self, node: NodeId) {
        let mut live = false;
        let mut subtree = false;
        for key in self.refs.keys() {
            if let SubscriptionKey::Mutation { node: n, subtree: s } = *key {
                if n == node {
                    live = true;
                    subtree |= s;
                }
            }
        }

        if live {
            self.mutation.observe(node, self.mutation_options.observer_init(subtree));
        } else {
            self.mutation.unobserve(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(raw: u32) -> NodeId {
        NodeId::from_raw(raw)
    }

    #[test]
    fn test_keys_per_target() {
        let options = MutationOptions::default();
        let element = EventTarget::Element(node(3));

        assert_eq!(
            SubscriptionKey::for_pair(element, EventName::AddAttribute, &options),
            Some(SubscriptionKey::Mutation { node: node(3), subtree: false })
        );
        assert_eq!(
            SubscriptionKey::for_pair(element, EventName::Hidden, &options),
            Some(SubscriptionKey::Intersection(node(3)))
        );
        assert_eq!(
            SubscriptionKey::for_pair(EventTarget::Document, EventName::ChangeAttribute, &options),
            Some(SubscriptionKey::Mutation { node: NodeId::ROOT, subtree: true })
        );
        assert_eq!(
            SubscriptionKey::for_pair(EventTarget::Window, EventName::Resize, &options),
            Some(SubscriptionKey::Viewport)
        );
        let key = |target, name| SubscriptionKey::for_pair(target, name, &options);
        assert_eq!(key(EventTarget::Window, EventName::Visible), None);
        assert_eq!(key(EventTarget::Document, EventName::Resize), None);
    }

    #[test]
    fn test_global_single_listener_key() {
        let options = MutationOptions {
            global_single_listener: true,
            root_element: Some(node(2)),
            ..MutationOptions::default()
        };
        let key =
            |raw, name| SubscriptionKey::for_pair(EventTarget::Element(node(raw)), name, &options);
        let a = key(5, EventName::AddAttribute);
        let b = key(6, EventName::DeleteAttribute);
        assert_eq!(a, b);
        assert_eq!(a, Some(SubscriptionKey::Mutation { node: node(2), subtree: true }));
    }

    #[test]
    fn test_covers() {
        let mut dom = DomTree::new();
        let parent = dom.append_element(dom.root(), "div").unwrap();
        let child = dom.append_element(parent, "span").unwrap();

        let shallow = SubscriptionKey::Mutation { node: parent, subtree: false };
        let deep = SubscriptionKey::Mutation { node: parent, subtree: true };
        assert!(shallow.covers(parent, &dom));
        assert!(!shallow.covers(child, &dom));
        assert!(deep.covers(child, &dom));
        assert!(!SubscriptionKey::Resize(parent).covers(child, &dom));
    }

    #[test]
    fn test_observer_ids() {
        let controllers = ObserverControllers::new(&ConditionalEventsOptions::default());
        let mutation = controllers.observer_id(SubscriptionKey::Mutation {
            node: node(1),
            subtree: false,
        });
        let resize = controllers.observer_id(SubscriptionKey::Resize(node(1)));
        let intersection = controllers.observer_id(SubscriptionKey::Intersection(node(1)));

        assert_eq!(resize, controllers.observer_id(SubscriptionKey::Resize(node(2))));
        assert_ne!(mutation, resize);
        assert_ne!(resize, intersection);
        assert_eq!(controllers.observer_id(SubscriptionKey::Viewport), None);
    }

    #[test]
    fn test_reference_counting() {
        let mut controllers = ObserverControllers::new(&ConditionalEventsOptions::default());
        let key = SubscriptionKey::Resize(node(1));

        controllers.attach(key);
        controllers.attach(key);
        assert!(controllers.resize.is_observing(node(1)));

        controllers.detach(key);
        assert!(controllers.resize.is_observing(node(1)));
        controllers.detach(key);
        assert!(!controllers.resize.is_observing(node(1)));
        assert!(!controllers.is_subscribed(&key));

        // Detaching an unknown key is a no-op
        controllers.detach(key);
        assert_eq!(controllers.subscription_count(), 0);
    }

    #[test]
    fn test_shared_mutation_node() {
        let mut controllers = ObserverControllers::new(&ConditionalEventsOptions::default());
        let shallow = SubscriptionKey::Mutation { node: node(1), subtree: false };
        let deep = SubscriptionKey::Mutation { node: node(1), subtree: true };

        controllers.attach(shallow);
        controllers.attach(deep);
        controllers.detach(deep);
        assert!(controllers.mutation.is_observing(node(1)));
        controllers.detach(shallow);
        assert!(!controllers.mutation.is_observing(node(1)));
    }
}
