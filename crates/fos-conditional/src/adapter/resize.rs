//! Resize entries → `onResize`.

use std::collections::HashMap;

use fos_dom::observer::ResizeObserverEntry;
use fos_dom::DOMRect;

use crate::{EventDetail, EventTarget, ResizeDetail};

/// Remembers the last dispatched rect per target
#[derive(Debug, Default)]
pub struct ResizeAdapter {
    prev_rects: HashMap<EventTarget, DOMRect>,
}

impl ResizeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize_entry(&self, entry: &ResizeObserverEntry) -> EventDetail {
        let target = EventTarget::Element(entry.target);
        EventDetail::Resize(ResizeDetail {
            entry: Some(entry.clone()),
            rect: entry.content_rect,
            prev_rect: self.prev_rect(target),
        })
    }

    /// Viewport resize for `Window` listeners; None if the viewport did not change
    pub fn normalize_viewport(&self, viewport: DOMRect) -> Option<EventDetail> {
        let prev = self.prev_rects.get(&EventTarget::Window).copied();
        if prev == Some(viewport) {
            return None;
        }
        Some(EventDetail::Resize(ResizeDetail {
            entry: None,
            rect: viewport,
            prev_rect: prev.unwrap_or_default(),
        }))
    }

    pub fn prev_rect(&self, target: EventTarget) -> DOMRect {
        self.prev_rects.get(&target).copied().unwrap_or_default()
    }

    pub fn commit(&mut self, target: EventTarget, rect: DOMRect) {
        self.prev_rects.insert(target, rect);
    }

    pub fn forget(&mut self, target: EventTarget) {
        self.prev_rects.remove(&target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::observer::ResizeObserverSize;
    use fos_dom::NodeId;

    fn entry(node: NodeId, width: f64) -> ResizeObserverEntry {
        let size = ResizeObserverSize { inline_size: width, block_size: 10.0 };
        ResizeObserverEntry {
            target: node,
            content_rect: DOMRect::from_xywh(0.0, 0.0, width, 10.0),
            content_box_size: size,
            border_box_size: size,
            device_pixel_content_box_size: size,
        }
    }

    #[test]
    fn test_prev_rect_tracking() {
        let mut adapter = ResizeAdapter::new();
        let node = NodeId::from_raw(1);

        let EventDetail::Resize(first) = adapter.normalize_entry(&entry(node, 100.0)) else {
            panic!("expected resize");
        };
        assert_eq!(first.prev_rect, DOMRect::default());
        adapter.commit(EventTarget::Element(node), first.rect);

        let EventDetail::Resize(second) = adapter.normalize_entry(&entry(node, 150.0)) else {
            panic!("expected resize");
        };
        assert_eq!(second.prev_rect.width, 100.0);
        assert_eq!(second.rect.width, 150.0);
    }

    #[test]
    fn test_viewport_changes_only() {
        let mut adapter = ResizeAdapter::new();
        let viewport = DOMRect::from_xywh(0.0, 0.0, 800.0, 600.0);

        assert!(adapter.normalize_viewport(viewport).is_some());
        adapter.commit(EventTarget::Window, viewport);
        assert!(adapter.normalize_viewport(viewport).is_none());
        assert!(adapter
            .normalize_viewport(DOMRect::from_xywh(0.0, 0.0, 1024.0, 600.0))
            .is_some());
    }
}
