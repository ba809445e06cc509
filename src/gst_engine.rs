//! Streaming engine backed by a GStreamer `playbin`.
//!
//! `playbin` handles HLS (via `hlsdemux`) and decoding on its own, so one
//! engine instance maps to one `playbin` element:
//!
//!   playbin uri=<manifest> video-sink=<output sink>
//!
//! The media output owns the video sink. Attaching hands the sink to
//! `playbin` and gives the output a handle to the pipeline for seeking.

use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{info, warn};

use crate::error::{Result, ViewerError};
use crate::playback::{EngineFactory, MediaOutput, StreamEngine};

/// Creates one `playbin` per selected segment.
#[derive(Debug, Clone, Copy, Default)]
pub struct GstFactory;

impl EngineFactory for GstFactory {
    type Engine = GstEngine;

    fn is_supported(&self) -> bool {
        gst::init().is_ok() && gst::ElementFactory::find("playbin").is_some()
    }

    fn create(&self) -> Result<GstEngine> {
        gst::init().map_err(|e| ViewerError::Playback(format!("gst::init: {e}")))?;
        let playbin = gst::ElementFactory::make("playbin")
            .build()
            .map_err(|e| ViewerError::Playback(format!("playbin: {e}")))?;
        Ok(GstEngine { playbin })
    }
}

pub struct GstEngine {
    playbin: gst::Element,
}

impl StreamEngine for GstEngine {
    type Media = GstVideoOutput;

    fn load_source(&mut self, source: &str) -> Result<()> {
        self.playbin.set_property("uri", source);
        Ok(())
    }

    fn attach_media(&mut self, media: &mut GstVideoOutput) -> Result<()> {
        if let Some(sink) = &media.sink {
            self.playbin.set_property("video-sink", sink);
        }
        self.playbin
            .set_state(gst::State::Playing)
            .map_err(|e| ViewerError::Playback(format!("set_state Playing: {e}")))?;
        media.pipeline = Some(self.playbin.clone());
        info!("playbin started");
        Ok(())
    }

    fn destroy(&mut self) {
        let _ = self.playbin.set_state(gst::State::Null);
        info!("playbin stopped");
    }
}

/// Video surface. Without an explicit sink `playbin` picks the platform
/// default window.
#[derive(Default)]
pub struct GstVideoOutput {
    sink: Option<gst::Element>,
    pipeline: Option<gst::Element>,
}

impl GstVideoOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: gst::Element) -> Self {
        Self { sink: Some(sink), pipeline: None }
    }
}

impl MediaOutput for GstVideoOutput {
    /// Playback always goes through `playbin`.
    fn can_play_type(&self, _mime: &str) -> bool {
        false
    }

    fn set_source(&mut self, source: &str) {
        if source.is_empty() {
            self.pipeline = None;
        }
    }

    fn set_current_time(&mut self, secs: f64) {
        let Some(pipeline) = &self.pipeline else {
            return;
        };
        // A seek issued before preroll completes is dropped by playbin.
        let (res, _, _) = pipeline.state(gst::ClockTime::from_seconds(5));
        if let Err(e) = res {
            warn!(secs, error = %e, "Pipeline did not preroll, skipping seek");
            return;
        }
        let target = gst::ClockTime::from_nseconds((secs.max(0.0) * 1e9) as u64);
        if let Err(e) = pipeline.seek_simple(gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT, target) {
            warn!(secs, error = %e, "Seek failed");
        }
    }
}
