//! Condition Evaluator
//!
//! Pure checks of one config field at a time against an event. Fields whose
//! data the event kind does not carry (e.g. `value_contains` on a resize)
//! fail rather than pass.

use fos_dom::DomTree;

use crate::{ConditionalConfig, ConditionalEvent, MediaEnvironment};

/// Read-only state conditions are evaluated against
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    pub dom: &'a DomTree,
    pub media: &'a MediaEnvironment,
}

/// Config fields, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionField {
    Selector,
    Media,
    AttrNameContains,
    ValueContains,
    OldValueContains,
    IsFullyVisible,
    IsVisible,
    IsFocused,
    IsChecked,
    IsDisabled,
    Is,
}

/// True when every populated field holds
pub fn evaluate(
    ctx: &ConditionContext<'_>,
    config: &ConditionalConfig,
    event: &ConditionalEvent,
) -> bool {
    failing_field(ctx, config, event).is_none()
}

/// First populated field that does not hold, if any
pub fn failing_field(
    ctx: &ConditionContext<'_>,
    config: &ConditionalConfig,
    event: &ConditionalEvent,
) -> Option<ConditionField> {
    let detail = &event.detail;
    let element = event.target.element();
    let element_state = |flag: bool, state: fn(&DomTree, fos_dom::NodeId) -> bool| {
        element.is_some_and(|node| state(ctx.dom, node)) == flag
    };

    if let Some(selector) = &config.selector {
        if !element.is_some_and(|node| ctx.dom.matches(node, selector)) {
            return Some(ConditionField::Selector);
        }
    }
    if let Some(queries) = &config.media {
        if !queries.iter().any(|q| ctx.media.matches(q)) {
            return Some(ConditionField::Media);
        }
    }
    if let Some(matchers) = &config.attr_name_contains {
        if !detail.attribute_name().is_some_and(|name| matchers.any_matches(name)) {
            return Some(ConditionField::AttrNameContains);
        }
    }
    if let Some(matchers) = &config.value_contains {
        if !detail.value().is_some_and(|value| matchers.any_matches(value)) {
            return Some(ConditionField::ValueContains);
        }
    }
    if let Some(matchers) = &config.old_value_contains {
        if !detail.old_value().is_some_and(|value| matchers.any_matches(value)) {
            return Some(ConditionField::OldValueContains);
        }
    }
    if let Some(flag) = config.is_fully_visible {
        if detail.is_fully_visible() != Some(flag) {
            return Some(ConditionField::IsFullyVisible);
        }
    }
    if let Some(flag) = config.is_visible {
        if detail.is_visible() != Some(flag) {
            return Some(ConditionField::IsVisible);
        }
    }
    if let Some(flag) = config.is_focused {
        if !element_state(flag, DomTree::is_focused) {
            return Some(ConditionField::IsFocused);
        }
    }
    if let Some(flag) = config.is_checked {
        if !element_state(flag, DomTree::is_checked) {
            return Some(ConditionField::IsChecked);
        }
    }
    if let Some(flag) = config.is_disabled {
        if !element_state(flag, DomTree::is_disabled) {
            return Some(ConditionField::IsDisabled);
        }
    }
    if let Some(predicate) = &config.is {
        if !predicate(event) {
            return Some(ConditionField::Is);
        }
    }
    None
}
