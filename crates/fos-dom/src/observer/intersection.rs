//! Intersection Observer API
//!
//! Observe element visibility and intersection with the viewport.

use std::collections::HashMap;

use crate::{DOMRect, LayoutSnapshot, NodeId};

/// Intersection observer options
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverOptions {
    /// Root margin, CSS shorthand of one to four `px` values
    pub root_margin: String,
    /// Thresholds to trigger callback
    pub threshold: Vec<f64>,
}

impl Default for IntersectionObserverOptions {
    fn default() -> Self {
        Self {
            root_margin: "0px".to_string(),
            threshold: vec![0.0],
        }
    }
}

/// Intersection observer entry
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverEntry {
    pub target: NodeId,
    pub bounding_client_rect: DOMRect,
    pub intersection_rect: DOMRect,
    pub root_bounds: DOMRect,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
    pub time: f64,
}

#[derive(Debug, Clone, Copy)]
struct LastState {
    ratio: f64,
    is_intersecting: bool,
}

/// Intersection observer (root is always the viewport)
#[derive(Debug)]
pub struct IntersectionObserver {
    id: u64,
    options: IntersectionObserverOptions,
    margins: [f64; 4],
    observed: HashMap<NodeId, Option<LastState>>,
    pending_entries: Vec<IntersectionObserverEntry>,
}

impl IntersectionObserver {
    pub fn new(options: IntersectionObserverOptions) -> Self {
        let margins = parse_root_margin(&options.root_margin).unwrap_or_else(|| {
            tracing::warn!(root_margin = %options.root_margin, "invalid root margin, using 0px");
            [0.0; 4]
        });
        Self {
            id: super::next_observer_id(),
            options,
            margins,
            observed: HashMap::new(),
            pending_entries: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn options(&self) -> &IntersectionObserverOptions {
        &self.options
    }

    /// Observe an element
    pub fn observe(&mut self, target: NodeId) {
        self.observed.insert(target, None);
    }

    /// Stop observing
    pub fn unobserve(&mut self, target: NodeId) {
        self.observed.remove(&target);
    }

    /// Disconnect all
    pub fn disconnect(&mut self) {
        self.observed.clear();
        self.pending_entries.clear();
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.observed.contains_key(&node)
    }

    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Check intersections against the (margin-expanded) viewport.
    ///
    /// An entry is queued on first observation, when `is_intersecting`
    /// flips, or when the ratio crosses a threshold.
    pub fn check_intersections(&mut self, layout: &LayoutSnapshot) {
        let root = layout.viewport.expand(self.margins);
        let mut targets: Vec<_> = self.observed.keys().copied().collect();
        targets.sort();

        for node in targets {
            let Some(rect) = layout.border_box(node) else {
                continue;
            };
            let intersection = rect.intersection(&root);
            let is_intersecting = intersection.is_some();
            let ratio = match intersection {
                Some(i) if rect.area() > 0.0 => i.area() / rect.area(),
                Some(_) => 1.0,
                None => 0.0,
            };

            let Some(last) = self.observed.get_mut(&node) else {
                continue;
            };
            let should_notify = match *last {
                Some(prev) => {
                    prev.is_intersecting != is_intersecting
                        || self
                            .options
                            .threshold
                            .iter()
                            .any(|&t| (prev.ratio < t) != (ratio < t))
                }
                None => true,
            };

            if should_notify {
                *last = Some(LastState { ratio, is_intersecting });
                self.pending_entries.push(IntersectionObserverEntry {
                    target: node,
                    bounding_client_rect: rect,
                    intersection_rect: intersection.unwrap_or_default(),
                    root_bounds: root,
                    intersection_ratio: ratio,
                    is_intersecting,
                    time: layout.time,
                });
            }
        }
    }

    /// Take pending entries
    pub fn take_entries(&mut self) -> Vec<IntersectionObserverEntry> {
        std::mem::take(&mut self.pending_entries)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_entries.is_empty()
    }
}

/// Parse `"10px"`, `"10px 20px"`, `"1px 2px 3px"` or `"1px 2px 3px 4px"`
/// into (top, right, bottom, left).
fn parse_root_margin(margin: &str) -> Option<[f64; 4]> {
    let values = margin
        .split_whitespace()
        .map(|part| {
            let number = part.strip_suffix("px").unwrap_or(part);
            number.parse::<f64>().ok()
        })
        .collect::<Option<Vec<_>>>()?;

    match values.as_slice() {
        [all] => Some([*all; 4]),
        [v, h] => Some([*v, *h, *v, *h]),
        [t, h, b] => Some([*t, *h, *b, *h]),
        [t, r, b, l] => Some([*t, *r, *b, *l]),
        _ => None,
    }
}
