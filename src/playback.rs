// This software is provided for non-commercial use only.
// Commercial use is strictly prohibited.
// If you use, modify, or redistribute this software, you must provide proper attribution to the original author.
// (c) 2026 Onur Tuna. All rights reserved.

//! Playback binder: attaches the selected segment's HLS manifest to the
//! session's single media output.
//!
//! On every change of the stream source the binder:
//!  1. Destroys the previous streaming engine, if any.
//!  2. If an adaptive engine is available, creates one, loads the source and
//!     attaches it to the media output.
//!  3. Otherwise hands the source straight to the media output when it can
//!     play HLS natively.
//!  4. Otherwise gives up; nothing plays.
//!
//! The binder exclusively owns both the engine and the media output, so
//! seeking and source changes can only happen through it.

use std::marker::PhantomData;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Result, ViewerError};

/// MIME type a media output must accept for native HLS playback.
pub const HLS_MIME: &str = "application/vnd.apple.mpegurl";

/// The surface video is rendered to.
pub trait MediaOutput {
    /// Whether the output can play `mime` without a streaming engine.
    fn can_play_type(&self, mime: &str) -> bool;
    /// Native playback: point the output directly at `source`. An empty
    /// source stops the output and drops anything attached to it.
    fn set_source(&mut self, source: &str);
    /// Jump to `secs` within the loaded stream.
    fn set_current_time(&mut self, secs: f64);
}

/// An adaptive-bitrate streaming engine instance.
pub trait StreamEngine {
    type Media: MediaOutput;

    fn load_source(&mut self, source: &str) -> Result<()>;
    fn attach_media(&mut self, media: &mut Self::Media) -> Result<()>;
    /// Release decoders and network resources. Called exactly once per
    /// instance before it is dropped.
    fn destroy(&mut self);
}

/// Host capability probe plus constructor for engines.
pub trait EngineFactory {
    type Engine: StreamEngine;

    fn is_supported(&self) -> bool;
    fn create(&self) -> Result<Self::Engine>;
}

/// Media output type driven by factory `F`.
pub type MediaOf<F> = <<F as EngineFactory>::Engine as StreamEngine>::Media;

/// What the binder is currently doing with its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    /// No source selected.
    Idle,
    /// Source selected but no media output bound yet.
    AwaitingMedia,
    /// Streaming engine attached.
    Adaptive,
    /// Media output plays the manifest itself.
    Native,
    /// Neither engine nor native support; nothing plays.
    Unsupported,
}

pub struct PlaybackBinder<F: EngineFactory> {
    factory: F,
    media: Option<MediaOf<F>>,
    engine: Option<F::Engine>,
    source: String,
    mode: PlaybackMode,
    segment_duration: Duration,
}

impl<F: EngineFactory> PlaybackBinder<F> {
    pub fn new(factory: F, segment_duration: Duration) -> Self {
        Self {
            factory,
            media: None,
            engine: None,
            source: String::new(),
            mode: PlaybackMode::Idle,
            segment_duration,
        }
    }

    /// Bind the media output. Any previous output is returned after its
    /// engine has been torn down; a pending source is attached right away.
    pub fn bind_media(&mut self, media: MediaOf<F>) -> Option<MediaOf<F>> {
        self.release_playback();
        let previous = self.media.replace(media);
        if self.source.is_empty() {
            self.mode = PlaybackMode::Idle;
        } else {
            self.attach();
        }
        previous
    }

    /// Unbind the media output. It is handed back stopped, with no engine
    /// attached and no source of its own.
    pub fn unbind_media(&mut self) -> Option<MediaOf<F>> {
        self.release_playback();
        self.mode = if self.source.is_empty() {
            PlaybackMode::Idle
        } else {
            PlaybackMode::AwaitingMedia
        };
        self.media.take()
    }

    /// React to a new stream source. Does nothing when `source` equals the
    /// current one.
    pub fn set_source(&mut self, source: &str) -> PlaybackMode {
        if source == self.source {
            return self.mode;
        }
        self.release_playback();
        self.source = source.to_owned();

        if self.source.is_empty() {
            self.mode = PlaybackMode::Idle;
            info!("Playback source cleared");
            return self.mode;
        }
        self.attach()
    }

    /// Seek to the start of grid slot `slot` within the loaded stream.
    /// Returns the target position, or `None` when no media output is bound.
    pub fn seek(&mut self, slot: usize) -> Option<f64> {
        let media = self.media.as_mut()?;
        let secs = slot as f64 * self.segment_duration.as_secs_f64();
        media.set_current_time(secs);
        debug!(slot, secs, "Seek");
        Some(secs)
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub fn media(&self) -> Option<&MediaOf<F>> {
        self.media.as_ref()
    }

    fn attach(&mut self) -> PlaybackMode {
        let Some(media) = self.media.as_mut() else {
            debug!(source = self.source, "No media output bound, deferring attach");
            self.mode = PlaybackMode::AwaitingMedia;
            return self.mode;
        };

        self.mode = if self.factory.is_supported() {
            match start_engine(&self.factory, media, &self.source) {
                Ok(engine) => {
                    self.engine = Some(engine);
                    info!(source = self.source, "Streaming engine attached");
                    PlaybackMode::Adaptive
                }
                Err(e) => {
                    warn!(source = self.source, error = %e, "Streaming engine failed to start");
                    PlaybackMode::Unsupported
                }
            }
        } else if media.can_play_type(HLS_MIME) {
            media.set_source(&self.source);
            info!(source = self.source, "Native HLS playback");
            PlaybackMode::Native
        } else {
            warn!(source = self.source, "No HLS playback capability, stream will not play");
            PlaybackMode::Unsupported
        };
        self.mode
    }

    /// Stop whatever is playing on the media output: destroy the engine and
    /// clear the output's source so it drops any handle it still holds.
    fn release_playback(&mut self) {
        let playing = matches!(self.mode, PlaybackMode::Adaptive | PlaybackMode::Native);
        self.release_engine();
        if playing {
            if let Some(media) = self.media.as_mut() {
                media.set_source("");
            }
        }
    }

    fn release_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
            debug!("Streaming engine released");
        }
    }
}

impl<F: EngineFactory> Drop for PlaybackBinder<F> {
    fn drop(&mut self) {
        self.release_engine();
    }
}

fn start_engine<F: EngineFactory>(
    factory: &F,
    media: &mut MediaOf<F>,
    source: &str,
) -> Result<F::Engine> {
    let mut engine = factory.create()?;
    let attached = engine
        .load_source(source)
        .and_then(|()| engine.attach_media(media));
    if let Err(e) = attached {
        engine.destroy();
        return Err(e);
    }
    Ok(engine)
}

// ──────────────── built-in implementations ─────────────────────────────────

/// Factory for hosts without an adaptive engine. Playback falls back to the
/// media output's native support.
pub struct NativeOnly<M>(PhantomData<fn() -> M>);

impl<M> NativeOnly<M> {
    pub fn new() -> Self {
        NativeOnly(PhantomData)
    }
}

impl<M> Default for NativeOnly<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MediaOutput> EngineFactory for NativeOnly<M> {
    type Engine = NoEngine<M>;

    fn is_supported(&self) -> bool {
        false
    }

    fn create(&self) -> Result<NoEngine<M>> {
        Err(ViewerError::Playback("no adaptive streaming engine available".into()))
    }
}

/// Engine type of [`NativeOnly`]; never constructed.
pub struct NoEngine<M>(PhantomData<fn() -> M>);

impl<M: MediaOutput> StreamEngine for NoEngine<M> {
    type Media = M;

    fn load_source(&mut self, _source: &str) -> Result<()> {
        Ok(())
    }

    fn attach_media(&mut self, _media: &mut M) -> Result<()> {
        Ok(())
    }

    fn destroy(&mut self) {}
}

/// Media output that records what it was asked to play instead of
/// rendering it, so the URL and position can be handed to an external
/// player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkOutput {
    pub source: String,
    pub position_secs: f64,
}

impl MediaOutput for LinkOutput {
    fn can_play_type(&self, mime: &str) -> bool {
        mime == HLS_MIME
    }

    fn set_source(&mut self, source: &str) {
        self.source = source.to_owned();
        self.position_secs = 0.0;
    }

    fn set_current_time(&mut self, secs: f64) {
        self.position_secs = secs;
    }
}
