//! Event names, targets and the synthesized event handed to callbacks.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use fos_dom::NodeId;

use crate::{ConditionalError, EventDetail};

/// Semantic event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    Resize,
    ChangeAttribute,
    AddAttribute,
    DeleteAttribute,
    AddClassName,
    DeleteClassName,
    Visibility,
    Visible,
    Hidden,
}

/// Which native observer feeds an event name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserverKind {
    Mutation,
    Resize,
    Intersection,
}

impl EventName {
    pub const ALL: [EventName; 9] = [
        Self::Resize,
        Self::ChangeAttribute,
        Self::AddAttribute,
        Self::DeleteAttribute,
        Self::AddClassName,
        Self::DeleteClassName,
        Self::Visibility,
        Self::Visible,
        Self::Hidden,
    ];

    /// Wire name (`onResize`, `onAddAttribute`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resize => "onResize",
            Self::ChangeAttribute => "onChangeAttribute",
            Self::AddAttribute => "onAddAttribute",
            Self::DeleteAttribute => "onDeleteAttribute",
            Self::AddClassName => "onAddClassName",
            Self::DeleteClassName => "onDeleteClassName",
            Self::Visibility => "onVisibility",
            Self::Visible => "onVisible",
            Self::Hidden => "onHidden",
        }
    }

    pub fn observer_kind(self) -> ObserverKind {
        match self {
            Self::Resize => ObserverKind::Resize,
            Self::ChangeAttribute
            | Self::AddAttribute
            | Self::DeleteAttribute
            | Self::AddClassName
            | Self::DeleteClassName => ObserverKind::Mutation,
            Self::Visibility | Self::Visible | Self::Hidden => ObserverKind::Intersection,
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = ConditionalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ConditionalError::UnknownEventName(s.to_string()))
    }
}

/// Subject a listener is registered on, keyed by identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Element(NodeId),
    Document,
    Window,
}

impl EventTarget {
    /// Element node, if this target is an element
    pub fn element(self) -> Option<NodeId> {
        match self {
            Self::Element(node) => Some(node),
            _ => None,
        }
    }
}

impl From<NodeId> for EventTarget {
    fn from(node: NodeId) -> Self {
        Self::Element(node)
    }
}

/// Event delivered to callbacks
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalEvent {
    /// Subject the change happened on
    pub target: EventTarget,
    /// Subject the listener was registered on
    pub current_target: EventTarget,
    pub detail: EventDetail,
}

impl ConditionalEvent {
    pub fn event_name(&self) -> EventName {
        self.detail.event_name()
    }
}

/// Listener callback. Clones share identity, so the same `Callback`
/// value is what removal looks up.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&ConditionalEvent)>);

impl Callback {
    pub fn new(f: impl Fn(&ConditionalEvent) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    pub(crate) fn call(&self, event: &ConditionalEvent) {
        (self.0)(event)
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_round_trip() {
        for name in EventName::ALL {
            assert_eq!(name.as_str().parse::<EventName>().unwrap(), name);
        }
    }

    #[test]
    fn test_unknown_event_name() {
        let err = "onScroll".parse::<EventName>().unwrap_err();
        assert!(matches!(err, ConditionalError::UnknownEventName(ref n) if n == "onScroll"));
    }

    #[test]
    fn test_observer_kinds() {
        assert_eq!(EventName::Resize.observer_kind(), ObserverKind::Resize);
        assert_eq!(EventName::DeleteClassName.observer_kind(), ObserverKind::Mutation);
        assert_eq!(EventName::Hidden.observer_kind(), ObserverKind::Intersection);
    }

    #[test]
    fn test_callback_identity() {
        let a = Callback::new(|_| {});
        let b = Callback::new(|_| {});
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
