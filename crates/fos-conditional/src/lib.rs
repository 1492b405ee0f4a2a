//! fOS Conditional Events
//!
//! Event-listener style subscriptions over the DOM observers that only fire
//! when a declarative condition holds.
//!
//! Native observer records (mutation, resize, intersection) are normalized
//! by the adapters into semantic events (`onAddAttribute`, `onVisible`, ...)
//! with a detail payload, then fanned out to the callbacks registered for
//! the (target, event name) pair whose [`ConditionalConfig`] passes.
//!
//! ```ignore
//! let events = ConditionalEvents::new(ConditionalEventsOptions::default());
//! let on_open = Callback::new(|event| println!("{:?}", event.detail));
//! events.add_conditional_event_listener(
//!     menu,
//!     EventName::AddClassName,
//!     &on_open,
//!     ConditionalConfig::new().selector("nav > ul")?,
//!     ListenerConfig::default(),
//! )?;
//!
//! dom.set_attribute(menu, "class", "open")?;
//! let records = dom.take_mutations();
//! events.deliver_mutations(&dom, records);
//! ```

pub mod adapter;
mod condition;
mod config;
mod controllers;
mod detail;
mod dispatch;
mod event;
mod media;
mod options;
mod pattern;
mod registry;

pub use condition::{ConditionContext, ConditionField, evaluate, failing_field};
pub use config::{ConditionalConfig, ListenerConfig, Predicate};
pub use controllers::SubscriptionKey;
pub use detail::{
    AddAttributeDetail, ChangeAttributeDetail, ClassNameDetail, DeleteAttributeDetail, EventDetail,
    JsonValue, ResizeDetail, VisibilityDetail, VisibleDetail,
};
pub use dispatch::ConditionalEvents;
pub use event::{Callback, ConditionalEvent, EventName, EventTarget, ObserverKind};
pub use media::{ColorSchemePreference, MediaEnvironment, MediaType};
pub use options::{
    ConditionalEventsOptions, IntersectionOptions, MutationOptions, ResizeBox, ResizeOptions,
};
pub use pattern::{Matcher, Matchers};
pub use registry::{EventData, EventStorage};

/// Conditional events errors
#[derive(Debug, thiserror::Error)]
pub enum ConditionalError {
    #[error("Unknown event name: {0}")]
    UnknownEventName(String),

    #[error("{event_name} cannot be observed on {target:?}")]
    UnsupportedTarget {
        target: EventTarget,
        event_name: EventName,
    },

    #[error("Invalid selector: {0}")]
    Selector(#[from] fos_dom::DomError),

    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid options: {0}")]
    Options(#[from] serde_json::Error),
}
