//! Per-camera availability as reported by `GET /api/camera/{id}`.
//!
//! The recorder splits each day into 6-hour blocks stored under
//! `{camera}/{YYYY-MM-DD}/{HH-HH}/`. Each block holds one or more HLS
//! recordings (one per recorder restart).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One recorded day. The recorder reports local midnight with its UTC
/// offset; the offset is kept so the date key is the recorder's local date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: DateTime<FixedOffset>,
    #[serde(rename = "segments", default)]
    pub blocks: Vec<Block>,
}

impl DayAvailability {
    /// Date component used in API and media paths.
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn recording_count(&self) -> usize {
        self.blocks.iter().map(|b| b.recordings.len()).sum()
    }
}

/// A fixed block of the day, `start..end` in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub start: u32,
    pub end: u32,
    #[serde(rename = "segments", default)]
    pub recordings: Vec<Recording>,
}

impl Block {
    /// Segment component used in API and media paths, e.g. `06-12`.
    pub fn key(&self) -> String {
        format!("{:02}-{:02}", self.start, self.end)
    }
}

/// One continuous HLS recording inside a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    #[serde(rename = "ts_count", default)]
    pub chunk_count: u32,
}

impl Recording {
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}
