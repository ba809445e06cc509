//! Hover preview controller: which slot is under the pointer and where the
//! thumbnail overlay is anchored.

use crate::config::PreviewConfig;

/// Overlay placement relative to the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOffset {
    pub x: f64,
    pub y: f64,
}

impl From<&PreviewConfig> for PreviewOffset {
    fn from(cfg: &PreviewConfig) -> Self {
        Self { x: cfg.offset_x, y: cfg.offset_y }
    }
}

impl Default for PreviewOffset {
    fn default() -> Self {
        Self::from(&PreviewConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoverState {
    offset: PreviewOffset,
    hovered: Option<usize>,
    anchor: (f64, f64),
}

impl HoverState {
    pub fn new(offset: PreviewOffset) -> Self {
        Self { offset, hovered: None, anchor: (0.0, 0.0) }
    }

    /// Pointer entered (or moved within) `slot` at viewport position `(x, y)`.
    /// Always recomputes, even for the slot already hovered, so the anchor
    /// follows the pointer.
    pub fn enter(&mut self, slot: usize, x: f64, y: f64) {
        self.hovered = Some(slot);
        self.anchor = (x - self.offset.x, y - self.offset.y);
    }

    /// Pointer left the grid. The anchor is kept; the overlay is hidden
    /// because nothing is hovered.
    pub fn leave(&mut self) {
        self.hovered = None;
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn anchor(&self) -> (f64, f64) {
        self.anchor
    }

    pub fn is_visible(&self) -> bool {
        self.hovered.is_some()
    }
}

impl Default for HoverState {
    fn default() -> Self {
        Self::new(PreviewOffset::default())
    }
}
