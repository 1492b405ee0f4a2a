//! Conditional and listener configuration.

use std::fmt;
use std::rc::Rc;

use fos_dom::Selector;
use serde::Deserialize;

use crate::{ConditionalError, ConditionalEvent, Matchers};

/// Arbitrary condition over the full event
pub type Predicate = Rc<dyn Fn(&ConditionalEvent) -> bool>;

/// Conditions a callback requires. Every populated field must hold;
/// an empty config always passes.
#[derive(Clone, Default)]
pub struct ConditionalConfig {
    pub selector: Option<Selector>,
    /// Media query lists; passes if any matches
    pub media: Option<Vec<String>>,
    pub attr_name_contains: Option<Matchers>,
    pub value_contains: Option<Matchers>,
    pub old_value_contains: Option<Matchers>,
    pub is_fully_visible: Option<bool>,
    pub is_visible: Option<bool>,
    pub is_focused: Option<bool>,
    pub is_checked: Option<bool>,
    pub is_disabled: Option<bool>,
    pub is: Option<Predicate>,
}

impl ConditionalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selector(mut self, selector: &str) -> Result<Self, ConditionalError> {
        self.selector = Some(Selector::parse(selector)?);
        Ok(self)
    }

    pub fn media<I, S>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media = Some(queries.into_iter().map(Into::into).collect());
        self
    }

    pub fn attr_name_contains(mut self, matchers: impl Into<Matchers>) -> Self {
        self.attr_name_contains = Some(matchers.into());
        self
    }

    pub fn value_contains(mut self, matchers: impl Into<Matchers>) -> Self {
        self.value_contains = Some(matchers.into());
        self
    }

    pub fn old_value_contains(mut self, matchers: impl Into<Matchers>) -> Self {
        self.old_value_contains = Some(matchers.into());
        self
    }

    pub fn fully_visible(mut self, flag: bool) -> Self {
        self.is_fully_visible = Some(flag);
        self
    }

    pub fn visible(mut self, flag: bool) -> Self {
        self.is_visible = Some(flag);
        self
    }

    pub fn focused(mut self, flag: bool) -> Self {
        self.is_focused = Some(flag);
        self
    }

    pub fn checked(mut self, flag: bool) -> Self {
        self.is_checked = Some(flag);
        self
    }

    pub fn disabled(mut self, flag: bool) -> Self {
        self.is_disabled = Some(flag);
        self
    }

    pub fn is(mut self, predicate: impl Fn(&ConditionalEvent) -> bool + 'static) -> Self {
        self.is = Some(Rc::new(predicate));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.selector.is_none()
            && self.media.is_none()
            && self.attr_name_contains.is_none()
            && self.value_contains.is_none()
            && self.old_value_contains.is_none()
            && self.is_fully_visible.is_none()
            && self.is_visible.is_none()
            && self.is_focused.is_none()
            && self.is_checked.is_none()
            && self.is_disabled.is_none()
            && self.is.is_none()
    }
}

impl fmt::Debug for ConditionalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalConfig")
            .field("selector", &self.selector.as_ref().map(Selector::as_str))
            .field("media", &self.media)
            .field("attr_name_contains", &self.attr_name_contains)
            .field("value_contains", &self.value_contains)
            .field("old_value_contains", &self.old_value_contains)
            .field("is_fully_visible", &self.is_fully_visible)
            .field("is_visible", &self.is_visible)
            .field("is_focused", &self.is_focused)
            .field("is_checked", &self.is_checked)
            .field("is_disabled", &self.is_disabled)
            .field("is", &self.is.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Listener options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Remove the listener after its first invocation
    pub once: bool,
    /// Stay dormant (no dispatch, no native subscription) until activated
    pub lazy: bool,
}

impl ListenerConfig {
    pub fn once() -> Self {
        Self {
            once: true,
            ..Self::default()
        }
    }

    pub fn lazy() -> Self {
        Self {
            lazy: true,
            ..Self::default()
        }
    }
}
