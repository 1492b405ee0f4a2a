//! Geometry APIs
//!
//! DOMRect and the per-frame layout snapshot observers read from.

use std::collections::HashMap;

use crate::NodeId;

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create empty rect
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check if rects intersect (touching edges count)
    pub fn intersects(&self, other: &DOMRect) -> bool {
        !(self.right() < other.x
            || self.x > other.right()
            || self.bottom() < other.y
            || self.y > other.bottom())
    }

    /// Get intersection rect
    pub fn intersection(&self, other: &DOMRect) -> Option<DOMRect> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Some(DOMRect::from_xywh(x, y, right - x, bottom - y))
    }

    /// Grow the rect by CSS-order margins (top, right, bottom, left)
    pub fn expand(&self, margins: [f64; 4]) -> DOMRect {
        let [top, right, bottom, left] = margins;
        DOMRect::from_xywh(
            self.x - left,
            self.y - top,
            (self.width + left + right).max(0.0),
            (self.height + top + bottom).max(0.0),
        )
    }

    /// True when any of x, y, width, height, top, right, bottom, left is positive
    pub fn has_positive_component(&self) -> bool {
        [
            self.x,
            self.y,
            self.width,
            self.height,
            self.top(),
            self.right(),
            self.bottom(),
            self.left(),
        ]
        .iter()
        .any(|&v| v > 0.0)
    }
}

/// Layout result for one frame, as seen by resize and intersection observers.
///
/// Rects are in viewport coordinates. Nodes without a border box fall back
/// to their content box.
#[derive(Debug, Clone, Default)]
pub struct LayoutSnapshot {
    pub viewport: DOMRect,
    pub content_boxes: HashMap<NodeId, DOMRect>,
    pub border_boxes: HashMap<NodeId, DOMRect>,
    pub device_pixel_ratio: f64,
    /// Frame timestamp in milliseconds
    pub time: f64,
}

impl LayoutSnapshot {
    pub fn new(viewport: DOMRect) -> Self {
        Self {
            viewport,
            device_pixel_ratio: 1.0,
            ..Default::default()
        }
    }

    /// Set both boxes of a node to the same rect
    pub fn with_box(mut self, node: NodeId, rect: DOMRect) -> Self {
        self.content_boxes.insert(node, rect);
        self.border_boxes.insert(node, rect);
        self
    }

    pub fn with_border_box(mut self, node: NodeId, rect: DOMRect) -> Self {
        self.border_boxes.insert(node, rect);
        self
    }

    pub fn at_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn content_box(&self, node: NodeId) -> Option<DOMRect> {
        self.content_boxes.get(&node).copied()
    }

    pub fn border_box(&self, node: NodeId) -> Option<DOMRect> {
        self.border_boxes
            .get(&node)
            .or_else(|| self.content_boxes.get(&node))
            .copied()
    }
}
