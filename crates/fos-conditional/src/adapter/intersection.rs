//! Intersection entries → `onVisibility` / `onVisible` / `onHidden`.

use std::collections::HashMap;

use fos_dom::observer::IntersectionObserverEntry;
use fos_dom::NodeId;

use crate::detail::visibility_of;
use crate::{EventDetail, VisibilityDetail, VisibleDetail};

/// Remembers whether each target was visible at its last dispatch.
/// Targets start out not visible.
#[derive(Debug, Default)]
pub struct IntersectionAdapter {
    prev_visible: HashMap<NodeId, bool>,
}

impl IntersectionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `onVisibility` always, then `onVisible` / `onHidden` on a transition
    pub fn normalize_entry(&self, entry: &IntersectionObserverEntry) -> Vec<EventDetail> {
        let (is_visible, is_fully_visible) = visibility_of(entry);
        let was_visible = self.was_visible(entry.target);

        let mut details = vec![EventDetail::Visibility(VisibilityDetail {
            entry: entry.clone(),
            is_fully_visible,
            is_visible,
            is_hidden: !is_visible,
        })];

        let transition = VisibleDetail {
            entry: entry.clone(),
            is_visible,
        };
        match (was_visible, is_visible) {
            (false, true) => details.push(EventDetail::Visible(transition)),
            (true, false) => details.push(EventDetail::Hidden(transition)),
            _ => {}
        }
        details
    }

    pub fn was_visible(&self, target: NodeId) -> bool {
        self.prev_visible.get(&target).copied().unwrap_or(false)
    }

    /// Record the visibility derived from `entry`
    pub fn commit(&mut self, entry: &IntersectionObserverEntry) {
        let (is_visible, _) = visibility_of(entry);
        self.prev_visible.insert(entry.target, is_visible);
    }

    pub fn forget(&mut self, target: NodeId) {
        self.prev_visible.remove(&target);
    }
}
