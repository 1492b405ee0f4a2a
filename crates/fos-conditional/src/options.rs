//! Engine options.
//!
//! Plain structs with `Default`; hosts can load them from JSON with
//! camelCase keys (`customEvents`, `mutationObserverOptions`, ...).

use fos_dom::NodeId;
use fos_dom::observer::{
    IntersectionObserverOptions, MutationObserverInit, ResizeObserverBoxOptions,
};
use serde::Deserialize;

use crate::ConditionalError;

/// Options of a `ConditionalEvents` engine
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConditionalEventsOptions {
    /// Also queue every synthesized event as a plain custom event
    pub custom_events: bool,
    pub resize_observer_options: ResizeOptions,
    pub mutation_observer_options: MutationOptions,
    pub intersection_observer_options: IntersectionOptions,
}

impl ConditionalEventsOptions {
    pub fn from_json(json: &str) -> Result<Self, ConditionalError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Box model reported by resize observation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeBox {
    #[default]
    ContentBox,
    BorderBox,
    DevicePixelContentBox,
}

impl From<ResizeBox> for ResizeObserverBoxOptions {
    fn from(box_model: ResizeBox) -> Self {
        match box_model {
            ResizeBox::ContentBox => Self::ContentBox,
            ResizeBox::BorderBox => Self::BorderBox,
            ResizeBox::DevicePixelContentBox => Self::DevicePixelContentBox,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResizeOptions {
    #[serde(rename = "box")]
    pub box_model: ResizeBox,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MutationOptions {
    /// Element listeners also hear mutations of descendants
    pub subtree: bool,
    /// One shared subscription rooted at `root_element` instead of one
    /// per registered element
    pub global_single_listener: bool,
    /// Root of the shared subscription; the document when unset
    #[serde(skip)]
    pub root_element: Option<NodeId>,
}

impl MutationOptions {
    pub(crate) fn observer_init(&self, subtree: bool) -> MutationObserverInit {
        MutationObserverInit {
            attributes: true,
            attribute_old_value: true,
            subtree,
            ..MutationObserverInit::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntersectionOptions {
    /// CSS px shorthand, e.g. `"10px 0px"`
    pub root_margin: String,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            root_margin: "0px".to_string(),
        }
    }
}

impl From<&IntersectionOptions> for IntersectionObserverOptions {
    fn from(options: &IntersectionOptions) -> Self {
        Self {
            root_margin: options.root_margin.clone(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConditionalEventsOptions::default();
        assert!(!options.custom_events);
        assert_eq!(options.resize_observer_options.box_model, ResizeBox::ContentBox);
        assert_eq!(options.intersection_observer_options.root_margin, "0px");
        assert_eq!(options.mutation_observer_options.root_element, None);
    }

    #[test]
    fn test_from_json() {
        let options = ConditionalEventsOptions::from_json(
            r#"{
                "customEvents": true,
                "resizeObserverOptions": { "box": "border-box" },
                "mutationObserverOptions": { "subtree": true, "globalSingleListener": true },
                "intersectionObserverOptions": { "rootMargin": "10px" }
            }"#,
        )
        .unwrap();

        assert!(options.custom_events);
        assert_eq!(options.resize_observer_options.box_model, ResizeBox::BorderBox);
        assert!(options.mutation_observer_options.subtree);
        assert!(options.mutation_observer_options.global_single_listener);
        assert_eq!(options.intersection_observer_options.root_margin, "10px");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"mutationObserverOptions": {}}"#;
        let options = ConditionalEventsOptions::from_json(json).unwrap();
        assert_eq!(options, ConditionalEventsOptions::default());
    }

    #[test]
    fn test_invalid_json() {
        let json = r#"{"resizeObserverOptions": {"box": "margin-box"}}"#;
        let err = ConditionalEventsOptions::from_json(json).unwrap_err();
        assert!(matches!(err, ConditionalError::Options(_)));
    }

    #[test]
    fn test_observer_options() {
        let init = MutationOptions::default().observer_init(true);
        assert!(init.attributes && init.attribute_old_value && init.subtree);
        assert!(!init.child_list);

        let native = IntersectionObserverOptions::from(&IntersectionOptions {
            root_margin: "5px".to_string(),
        });
        assert_eq!(native.root_margin, "5px");
        assert_eq!(native.threshold, vec![0.0]);
    }
}
