// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Segment grid — maps the sparse set of recorded chunk indices onto a dense
//! timeline of `total_slots` slots.
//!
//! ```text
//! existing = {0, 1, 5, 2160}          total_slots = 2160
//!
//! slot    0   1   2   3   4   5   6  …  2159
//!       [ C | C | . | . | . | C | . | … | . ]      C = camera colour
//!                                                  . = Color::MISSING
//! ```
//!
//! The grid is never mutated in place; it is rebuilt from its inputs whenever
//! the existing set or the selected camera colour changes.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::camera::Color;
use crate::config::TimelineConfig;

/// Fixed geometry of one recording block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    total_slots: usize,
    segment_duration: Duration,
}

impl Timeline {
    pub fn new(total_slots: usize, segment_duration: Duration) -> Self {
        Self { total_slots, segment_duration }
    }

    pub fn from_config(cfg: &TimelineConfig) -> Self {
        Self::new(cfg.total_slots(), cfg.segment_duration())
    }

    pub fn total_slots(&self) -> usize {
        self.total_slots
    }

    pub fn segment_duration(&self) -> Duration {
        self.segment_duration
    }

    /// Start offset of `slot` within the block.
    pub fn slot_offset(&self, slot: usize) -> Duration {
        self.segment_duration * slot as u32
    }

    /// Slot containing `offset`, or `None` past the end of the window.
    pub fn slot_at(&self, offset: Duration) -> Option<usize> {
        if self.segment_duration.is_zero() {
            return None;
        }
        let slot = (offset.as_millis() / self.segment_duration.as_millis()) as usize;
        (slot < self.total_slots).then_some(slot)
    }

    /// Build the dense grid for `existing`, tinting recorded slots with `color`.
    /// Indices at or beyond `total_slots` are ignored.
    pub fn build_grid(&self, existing: &ExistingSegments, color: &Color) -> SegmentGrid {
        let mut slots = vec![SlotState::Missing; self.total_slots];
        for idx in existing.iter().filter(|&i| i < self.total_slots) {
            slots[idx] = SlotState::Recorded;
        }
        SegmentGrid { slots, color: color.clone() }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::from_config(&TimelineConfig::default())
    }
}

/// Chunk indices that exist on disk for one (camera, date, segment).
///
/// Decodes from the recorder's JSON, which is either an array of integers or
/// `null`. Negative values cannot be slot indices and are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingSegments(BTreeSet<usize>);

impl ExistingSegments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.0.contains(&idx)
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<usize> for ExistingSegments {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for ExistingSegments {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let raw = Option::<Vec<i64>>::deserialize(de)?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|i| usize::try_from(i).ok())
            .collect())
    }
}

static MISSING: Color = Color::MISSING;

/// Visual state of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Missing,
    Recorded,
}

/// Dense, ordered per-slot states plus the colour recorded slots resolve to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentGrid {
    slots: Vec<SlotState>,
    color: Color,
}

impl SegmentGrid {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn state(&self, slot: usize) -> Option<SlotState> {
        self.slots.get(slot).copied()
    }

    /// Colour of `slot`; out-of-range slots read as missing.
    pub fn color_at(&self, slot: usize) -> &Color {
        match self.state(slot) {
            Some(SlotState::Recorded) => &self.color,
            _ => &MISSING,
        }
    }

    pub fn colors(&self) -> impl Iterator<Item = &Color> + '_ {
        (0..self.slots.len()).map(move |i| self.color_at(i))
    }

    pub fn recorded_count(&self) -> usize {
        self.slots.iter().filter(|s| **s == SlotState::Recorded).count()
    }

    /// Fold the grid into `columns` buckets, each holding the fraction of
    /// recorded slots it covers. Used for compact terminal rendering.
    pub fn summarize(&self, columns: usize) -> Vec<f32> {
        if columns == 0 || self.slots.is_empty() {
            return Vec::new();
        }
        let columns = columns.min(self.slots.len());
        (0..columns)
            .map(|c| {
                let lo = c * self.slots.len() / columns;
                let hi = (c + 1) * self.slots.len() / columns;
                let bucket = &self.slots[lo..hi];
                let recorded = bucket.iter().filter(|s| **s == SlotState::Recorded).count();
                recorded as f32 / bucket.len() as f32
            })
            .collect()
    }
}
