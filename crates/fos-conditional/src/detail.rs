//! Detail payloads, one per event kind.
//!
//! Details are snapshots built from a single observer record at fire time
//! and never outlive the dispatch they belong to.

use fos_dom::observer::{IntersectionObserverEntry, ResizeObserverEntry};
use fos_dom::{DOMRect, MutationRecord};

use crate::EventName;

/// Best-effort JSON decode of an attribute value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsonValue {
    /// Absent or not valid JSON
    #[default]
    Empty,
    Parsed(serde_json::Value),
}

impl JsonValue {
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::Empty;
        };
        match serde_json::from_str(raw) {
            Ok(value) => Self::Parsed(value),
            Err(err) => {
                tracing::trace!(%raw, %err, "attribute value is not JSON");
                Self::Empty
            }
        }
    }

    pub fn as_value(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Parsed(value) => Some(value),
            Self::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeDetail {
    /// None for viewport (window) resizes
    pub entry: Option<ResizeObserverEntry>,
    pub rect: DOMRect,
    /// Rect reported by the previous dispatch, zero-sized on the first one
    pub prev_rect: DOMRect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeAttributeDetail {
    pub entry: MutationRecord,
    pub attribute_name: String,
    pub value: String,
    pub old_value: String,
    pub value_json: JsonValue,
    pub old_value_json: JsonValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddAttributeDetail {
    pub entry: MutationRecord,
    pub attribute_name: String,
    pub value: String,
    pub value_json: JsonValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteAttributeDetail {
    pub entry: MutationRecord,
    pub attribute_name: String,
    pub old_value: Option<String>,
    pub old_value_json: JsonValue,
}

/// Shared by `onAddClassName` and `onDeleteClassName`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNameDetail {
    pub entry: MutationRecord,
    /// Tokens added (or removed, for deletions) by this mutation
    pub changed_class_list: Vec<String>,
    pub old_class_list: Vec<String>,
    pub current_class_list: Vec<String>,
    /// Current `class` attribute value
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityDetail {
    pub entry: IntersectionObserverEntry,
    pub is_fully_visible: bool,
    pub is_visible: bool,
    pub is_hidden: bool,
}

/// Shared by `onVisible` and `onHidden`
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleDetail {
    pub entry: IntersectionObserverEntry,
    pub is_visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
    Resize(ResizeDetail),
    ChangeAttribute(ChangeAttributeDetail),
    AddAttribute(AddAttributeDetail),
    DeleteAttribute(DeleteAttributeDetail),
    AddClassName(ClassNameDetail),
    DeleteClassName(ClassNameDetail),
    Visibility(VisibilityDetail),
    Visible(VisibleDetail),
    Hidden(VisibleDetail),
}

/// Visible when the intersection rect has any positive component,
/// fully visible when it equals the bounding rect.
pub(crate) fn visibility_of(entry: &IntersectionObserverEntry) -> (bool, bool) {
    let is_visible = entry.intersection_rect.has_positive_component();
    let is_fully_visible = entry.intersection_rect == entry.bounding_client_rect;
    (is_visible, is_fully_visible)
}

impl EventDetail {
    pub fn event_name(&self) -> EventName {
        match self {
            Self::Resize(_) => EventName::Resize,
            Self::ChangeAttribute(_) => EventName::ChangeAttribute,
            Self::AddAttribute(_) => EventName::AddAttribute,
            Self::DeleteAttribute(_) => EventName::DeleteAttribute,
            Self::AddClassName(_) => EventName::AddClassName,
            Self::DeleteClassName(_) => EventName::DeleteClassName,
            Self::Visibility(_) => EventName::Visibility,
            Self::Visible(_) => EventName::Visible,
            Self::Hidden(_) => EventName::Hidden,
        }
    }

    pub fn attribute_name(&self) -> Option<&str> {
        match self {
            Self::ChangeAttribute(d) => Some(&d.attribute_name),
            Self::AddAttribute(d) => Some(&d.attribute_name),
            Self::DeleteAttribute(d) => Some(&d.attribute_name),
            Self::AddClassName(_) | Self::DeleteClassName(_) => Some("class"),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::ChangeAttribute(d) => Some(&d.value),
            Self::AddAttribute(d) => Some(&d.value),
            Self::AddClassName(d) | Self::DeleteClassName(d) => Some(&d.value),
            _ => None,
        }
    }

    pub fn old_value(&self) -> Option<&str> {
        match self {
            Self::ChangeAttribute(d) => Some(&d.old_value),
            Self::DeleteAttribute(d) => d.old_value.as_deref(),
            Self::AddClassName(d) | Self::DeleteClassName(d) => d.entry.old_value.as_deref(),
            _ => None,
        }
    }

    /// Mutation record behind attribute and class events
    pub fn mutation(&self) -> Option<&MutationRecord> {
        match self {
            Self::ChangeAttribute(d) => Some(&d.entry),
            Self::AddAttribute(d) => Some(&d.entry),
            Self::DeleteAttribute(d) => Some(&d.entry),
            Self::AddClassName(d) | Self::DeleteClassName(d) => Some(&d.entry),
            _ => None,
        }
    }

    pub fn is_visible(&self) -> Option<bool> {
        match self {
            Self::Visibility(d) => Some(d.is_visible),
            Self::Visible(d) | Self::Hidden(d) => Some(d.is_visible),
            _ => None,
        }
    }

    pub fn is_fully_visible(&self) -> Option<bool> {
        match self {
            Self::Visibility(d) => Some(d.is_fully_visible),
            Self::Visible(d) | Self::Hidden(d) => Some(visibility_of(&d.entry).1),
            _ => None,
        }
    }
}
