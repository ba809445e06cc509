//! Viewing session — the single owner of all viewer state.
//!
//! The session is a plain state machine: [`Session::handle`] applies one
//! [`Event`] and returns the [`Fetch`]es the caller must run against the
//! backend. Fetch results come back as further events, so network I/O never
//! blocks hover or seek handling and the session itself never awaits.
//!
//! Existing-segments responses carry the [`FetchTicket`] issued when they
//! were requested and are dropped if the selection has moved on since.

use tracing::{debug, error, info, warn};

use crate::availability::DayAvailability;
use crate::backend::media_url;
use crate::camera::{Camera, CameraList, Color};
use crate::config::Config;
use crate::error::Result;
use crate::hover::{HoverState, PreviewOffset};
use crate::playback::{EngineFactory, PlaybackBinder, PlaybackMode};
use crate::selection::{FetchTicket, Selection};
use crate::timeline::{ExistingSegments, SegmentGrid, Timeline};

/// Something that happened: a user action or a backend response.
#[derive(Debug)]
pub enum Event {
    CamerasLoaded(Result<Vec<Camera>>),
    SelectCamera(String),
    AvailabilityLoaded {
        camera: String,
        result: Result<Vec<DayAvailability>>,
    },
    SelectSegment {
        date: String,
        segment: String,
    },
    ExistingSegmentsLoaded {
        ticket: FetchTicket,
        result: Result<ExistingSegments>,
    },
    HoverEnter {
        slot: usize,
        x: f64,
        y: f64,
    },
    HoverLeave,
    Seek {
        slot: usize,
    },
}

/// A backend request the session wants issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    Cameras,
    Availability {
        camera: String,
    },
    ExistingSegments {
        ticket: FetchTicket,
        camera: String,
        date: String,
        segment: String,
    },
}

/// Read-only view of the session published after every event.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub camera: Option<String>,
    pub date: Option<String>,
    pub segment: Option<String>,
    pub camera_count: usize,
    pub availability_days: usize,
    pub existing: ExistingSegments,
    pub recorded_slots: usize,
    pub stream_url: String,
    pub thumbnail_url: String,
    pub hovered: Option<usize>,
    pub anchor: (f64, f64),
    pub playback: PlaybackMode,
}

pub struct Session<F: EngineFactory> {
    timeline: Timeline,
    media_base: String,
    cameras: CameraList,
    availability: Vec<DayAvailability>,
    selection: Selection,
    existing: ExistingSegments,
    hover: HoverState,
    binder: PlaybackBinder<F>,
}

impl<F: EngineFactory> Session<F> {
    pub fn new(config: &Config, factory: F) -> Self {
        let timeline = Timeline::from_config(&config.timeline);
        Self {
            timeline,
            media_base: config.backend.base_url.trim_end_matches('/').to_owned(),
            cameras: CameraList::default(),
            availability: Vec::new(),
            selection: Selection::new(),
            existing: ExistingSegments::new(),
            hover: HoverState::new(PreviewOffset::from(&config.preview)),
            binder: PlaybackBinder::new(factory, timeline.segment_duration()),
        }
    }

    /// Fetches to issue when the session starts.
    pub fn start(&self) -> Vec<Fetch> {
        vec![Fetch::Cameras]
    }

    /// Apply one event. Returns the fetches it triggered.
    pub fn handle(&mut self, event: Event) -> Vec<Fetch> {
        let fetches = match event {
            Event::CamerasLoaded(result) => {
                match result {
                    Ok(cameras) => {
                        info!(count = cameras.len(), "Cameras loaded");
                        self.cameras = CameraList::new(cameras);
                    }
                    Err(e) => error!(error = %e, "Failed to load cameras"),
                }
                Vec::new()
            }
            Event::SelectCamera(camera) => self.select_camera(camera),
            Event::AvailabilityLoaded { camera, result } => {
                if self.selection.camera() != Some(camera.as_str()) {
                    debug!(camera, "Discarding availability for deselected camera");
                } else {
                    match result {
                        Ok(days) => {
                            info!(camera, days = days.len(), "Availability loaded");
                            self.availability = days;
                        }
                        Err(e) => error!(camera, error = %e, "Failed to load availability"),
                    }
                }
                Vec::new()
            }
            Event::SelectSegment { date, segment } => self.select_segment(date, segment),
            Event::ExistingSegmentsLoaded { ticket, result } => {
                self.apply_existing(ticket, result);
                Vec::new()
            }
            Event::HoverEnter { slot, x, y } => {
                self.hover.enter(slot, x, y);
                Vec::new()
            }
            Event::HoverLeave => {
                self.hover.leave();
                Vec::new()
            }
            Event::Seek { slot } => {
                if self.binder.seek(slot).is_none() {
                    debug!(slot, "Seek ignored, no media output bound");
                }
                Vec::new()
            }
        };
        self.sync_playback();
        fetches
    }

    fn select_camera(&mut self, camera: String) -> Vec<Fetch> {
        info!(camera, "Camera selected");
        let ticket = self.selection.select_camera(camera.clone());
        self.availability.clear();
        let mut fetches = vec![Fetch::Availability { camera: camera.clone() }];
        if let (Some(date), Some(segment)) = (self.selection.date(), self.selection.segment()) {
            fetches.push(Fetch::ExistingSegments {
                ticket,
                camera,
                date: date.to_owned(),
                segment: segment.to_owned(),
            });
        }
        fetches
    }

    fn select_segment(&mut self, date: String, segment: String) -> Vec<Fetch> {
        let Some(camera) = self.selection.camera().map(str::to_owned) else {
            warn!(date, segment, "Segment selected before any camera, ignoring");
            return Vec::new();
        };
        info!(camera, date, segment, "Segment selected");
        let ticket = self.selection.select_segment(date.clone(), segment.clone());
        // The grid keeps showing the previous set until the fetch resolves.
        vec![Fetch::ExistingSegments { ticket, camera, date, segment }]
    }

    fn apply_existing(&mut self, ticket: FetchTicket, result: Result<ExistingSegments>) {
        if !self.selection.is_current(ticket) {
            debug!(?ticket, current = ?self.selection.ticket(), "Discarding stale existing-segments response");
            return;
        }
        match result {
            Ok(existing) => {
                debug!(count = existing.len(), "Existing segments loaded");
                self.existing = existing;
            }
            Err(e) => error!(error = %e, "Failed to load existing segments, keeping previous grid"),
        }
    }

    fn sync_playback(&mut self) {
        let url = media_url(&self.media_base, &self.selection.stream_source());
        self.binder.set_source(&url);
    }

    // ──────────────── derived values ──────────────────────────────────────

    /// Colour of the selected camera.
    pub fn selected_color(&self) -> Color {
        self.selection
            .camera()
            .map(|id| self.cameras.color_of(id))
            .unwrap_or_default()
    }

    /// Dense grid for the current existing set and camera colour.
    pub fn grid(&self) -> SegmentGrid {
        self.timeline.build_grid(&self.existing, &self.selected_color())
    }

    pub fn stream_source(&self) -> String {
        self.selection.stream_source()
    }

    pub fn thumbnail_source(&self) -> String {
        self.selection.thumbnail_source(self.hover.hovered())
    }

    pub fn stream_url(&self) -> String {
        media_url(&self.media_base, &self.stream_source())
    }

    pub fn thumbnail_url(&self) -> String {
        media_url(&self.media_base, &self.thumbnail_source())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            camera: self.selection.camera().map(str::to_owned),
            date: self.selection.date().map(str::to_owned),
            segment: self.selection.segment().map(str::to_owned),
            camera_count: self.cameras.len(),
            availability_days: self.availability.len(),
            existing: self.existing.clone(),
            recorded_slots: self.grid().recorded_count(),
            stream_url: self.stream_url(),
            thumbnail_url: self.thumbnail_url(),
            hovered: self.hover.hovered(),
            anchor: self.hover.anchor(),
            playback: self.binder.mode(),
        }
    }

    // ──────────────── accessors ───────────────────────────────────────────

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn cameras(&self) -> &CameraList {
        &self.cameras
    }

    pub fn availability(&self) -> &[DayAvailability] {
        &self.availability
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn existing(&self) -> &ExistingSegments {
        &self.existing
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn binder(&self) -> &PlaybackBinder<F> {
        &self.binder
    }

    /// For binding or unbinding the media output.
    pub fn binder_mut(&mut self) -> &mut PlaybackBinder<F> {
        &mut self.binder
    }
}
