//! Resize Observer API
//!
//! Observe element size changes.

use std::collections::HashMap;

use crate::{DOMRect, LayoutSnapshot, NodeId};

/// Observed element size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeObserverSize {
    pub inline_size: f64,
    pub block_size: f64,
}

/// Which box the observer watches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizeObserverBoxOptions {
    #[default]
    ContentBox,
    BorderBox,
    DevicePixelContentBox,
}

/// Resize observer entry
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeObserverEntry {
    pub target: NodeId,
    pub content_rect: DOMRect,
    pub content_box_size: ResizeObserverSize,
    pub border_box_size: ResizeObserverSize,
    pub device_pixel_content_box_size: ResizeObserverSize,
}

#[derive(Debug)]
struct ObservedElement {
    box_options: ResizeObserverBoxOptions,
    last_size: Option<(f64, f64)>,
}

/// Resize observer
#[derive(Debug)]
pub struct ResizeObserver {
    id: u64,
    observed: HashMap<NodeId, ObservedElement>,
    pending_entries: Vec<ResizeObserverEntry>,
}

impl ResizeObserver {
    pub fn new() -> Self {
        Self {
            id: super::next_observer_id(),
            observed: HashMap::new(),
            pending_entries: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Observe an element; the next size check always reports it
    pub fn observe(&mut self, target: NodeId, options: ResizeObserverBoxOptions) {
        self.observed.insert(
            target,
            ObservedElement {
                box_options: options,
                last_size: None,
            },
        );
    }

    /// Stop observing an element
    pub fn unobserve(&mut self, target: NodeId) {
        self.observed.remove(&target);
    }

    /// Disconnect all observations
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

    /// Compare the watched box of every observed element against the last
    /// reported size and queue entries for those that changed.
    pub fn check_sizes(&mut self, layout: &LayoutSnapshot) {
        let mut targets: Vec<_> = self.observed.keys().copied().collect();
        targets.sort();

        for node in targets {
            let Some(content) = layout.content_box(node) else {
                continue;
            };
            let border = layout.border_box(node).unwrap_or(content);
            let dpr = layout.device_pixel_ratio;

            let content_size = size_of(content, 1.0);
            let border_size = size_of(border, 1.0);
            let device_size = size_of(content, dpr);

            let Some(observed) = self.observed.get_mut(&node) else {
                continue;
            };
            let watched = match observed.box_options {
                ResizeObserverBoxOptions::ContentBox => content_size,
                ResizeObserverBoxOptions::BorderBox => border_size,
                ResizeObserverBoxOptions::DevicePixelContentBox => device_size,
            };
            let (width, height) = (watched.inline_size, watched.block_size);

            let changed = match observed.last_size {
                Some((lw, lh)) => (lw - width).abs() > 0.01 || (lh - height).abs() > 0.01,
                None => true,
            };

            if changed {
                observed.last_size = Some((width, height));
                self.pending_entries.push(ResizeObserverEntry {
                    target: node,
                    content_rect: content,
                    content_box_size: content_size,
                    border_box_size: border_size,
                    device_pixel_content_box_size: device_size,
                });
            }
        }
    }

    /// Get pending entries and clear
    pub fn take_entries(&mut self) -> Vec<ResizeObserverEntry> {
        std::mem::take(&mut self.pending_entries)
    }

    /// Check if has pending entries
    pub fn has_pending(&self) -> bool {
        !self.pending_entries.is_empty()
    }
}

impl Default for ResizeObserver {
    fn default() -> Self {
        Self::new()
    }
}

fn size_of(rect: DOMRect, scale: f64) -> ResizeObserverSize {
    ResizeObserverSize {
        inline_size: rect.width * scale,
        block_size: rect.height * scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> DOMRect {
        DOMRect::from_xywh(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn test_resize_observer() {
        let mut observer = ResizeObserver::new();
        let node = NodeId::from_raw(1);
        observer.observe(node, ResizeObserverBoxOptions::ContentBox);

        let layout = LayoutSnapshot::new(viewport())
            .with_box(node, DOMRect::from_xywh(0.0, 0.0, 100.0, 200.0));

        observer.check_sizes(&layout);
        assert!(observer.has_pending());

        let entries = observer.take_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content_rect.width, 100.0);

        // Same size again: nothing new
        observer.check_sizes(&layout);
        assert!(!observer.has_pending());
    }

    #[test]
    fn test_border_box_option() {
        let mut observer = ResizeObserver::new();
        let node = NodeId::from_raw(1);
        observer.observe(node, ResizeObserverBoxOptions::BorderBox);

        let content = DOMRect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let first = LayoutSnapshot::new(viewport())
            .with_box(node, content)
            .with_border_box(node, DOMRect::from_xywh(0.0, 0.0, 110.0, 110.0));
        observer.check_sizes(&first);
        observer.take_entries();

        // Border grows while the content box stays put
        let second = LayoutSnapshot::new(viewport())
            .with_box(node, content)
            .with_border_box(node, DOMRect::from_xywh(0.0, 0.0, 120.0, 110.0));
        observer.check_sizes(&second);

        let entries = observer.take_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].border_box_size.inline_size, 120.0);
    }

    #[test]
    fn test_unobserved_nodes_are_ignored() {
        let mut observer = ResizeObserver::new();
        let node = NodeId::from_raw(1);
        observer.observe(node, ResizeObserverBoxOptions::default());
        observer.unobserve(node);

        let layout = LayoutSnapshot::new(viewport())
            .with_box(node, DOMRect::from_xywh(0.0, 0.0, 10.0, 10.0));
        observer.check_sizes(&layout);
        assert!(!observer.has_pending());
    }
}
