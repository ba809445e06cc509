//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use nvr_viewer::availability::DayAvailability;
use nvr_viewer::backend::Backend;
use nvr_viewer::camera::Camera;
use nvr_viewer::error::{Result, ViewerError};
use nvr_viewer::playback::{EngineFactory, MediaOutput, StreamEngine};
use nvr_viewer::timeline::ExistingSegments;

// ──────────────── engine ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct EngineLog {
    pub calls: Vec<String>,
    pub created: usize,
    pub active: usize,
    pub max_active: usize,
}

#[derive(Clone)]
pub struct FakeFactory {
    pub supported: bool,
    pub fail_load: bool,
    pub log: Arc<Mutex<EngineLog>>,
}

impl FakeFactory {
    pub fn supported() -> Self {
        Self { supported: true, fail_load: false, log: Arc::default() }
    }

    pub fn unsupported() -> Self {
        Self { supported: false, ..Self::supported() }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().calls.clone()
    }

    pub fn active(&self) -> usize {
        self.log.lock().active
    }

    pub fn max_active(&self) -> usize {
        self.log.lock().max_active
    }
}

impl EngineFactory for FakeFactory {
    type Engine = FakeEngine;

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self) -> Result<FakeEngine> {
        let mut log = self.log.lock();
        log.created += 1;
        log.active += 1;
        log.max_active = log.max_active.max(log.active);
        let id = log.created;
        log.calls.push(format!("create#{id}"));
        Ok(FakeEngine { id, fail_load: self.fail_load, log: self.log.clone() })
    }
}

pub struct FakeEngine {
    id: usize,
    fail_load: bool,
    log: Arc<Mutex<EngineLog>>,
}

impl StreamEngine for FakeEngine {
    type Media = FakeMedia;

    fn load_source(&mut self, source: &str) -> Result<()> {
        self.log.lock().calls.push(format!("load#{} {source}", self.id));
        if self.fail_load {
            return Err(ViewerError::Playback("manifest rejected".into()));
        }
        Ok(())
    }

    fn attach_media(&mut self, media: &mut FakeMedia) -> Result<()> {
        self.log.lock().calls.push(format!("attach#{}", self.id));
        media.state.lock().attached_engine = Some(self.id);
        Ok(())
    }

    fn destroy(&mut self) {
        let mut log = self.log.lock();
        log.active -= 1;
        log.calls.push(format!("destroy#{}", self.id));
    }
}

// ──────────────── media output ────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MediaState {
    pub source: String,
    pub position: Option<f64>,
    pub attached_engine: Option<usize>,
    /// Times the output was told to stop via an empty source.
    pub stops: usize,
}

/// Media output whose state stays observable after the binder takes it.
pub struct FakeMedia {
    pub native_hls: bool,
    pub state: Arc<Mutex<MediaState>>,
}

impl FakeMedia {
    pub fn new(native_hls: bool) -> (Self, Arc<Mutex<MediaState>>) {
        let state = Arc::new(Mutex::new(MediaState::default()));
        (Self { native_hls, state: state.clone() }, state)
    }
}

impl MediaOutput for FakeMedia {
    fn can_play_type(&self, mime: &str) -> bool {
        self.native_hls && mime == nvr_viewer::playback::HLS_MIME
    }

    fn set_source(&mut self, source: &str) {
        let mut state = self.state.lock();
        if source.is_empty() {
            state.stops += 1;
            state.attached_engine = None;
        }
        state.source = source.to_owned();
    }

    fn set_current_time(&mut self, secs: f64) {
        self.state.lock().position = Some(secs);
    }
}

// ──────────────── backend ─────────────────────────────────────────────────

/// In-memory recorder. Existing-segment responses for a key registered with
/// [`FakeBackend::gate`] are held back until the gate is opened.
#[derive(Default)]
pub struct FakeBackend {
    pub cameras: Vec<Camera>,
    pub availability: HashMap<String, Vec<DayAvailability>>,
    pub existing: HashMap<String, Vec<usize>>,
    pub failing: Vec<String>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub requests: Mutex<Vec<String>>,
}

pub fn key(camera: &str, date: &str, segment: &str) -> String {
    format!("{camera}/{date}/{segment}")
}

impl FakeBackend {
    pub fn new(cameras: Vec<Camera>) -> Self {
        Self { cameras, ..Self::default() }
    }

    pub fn with_existing(mut self, key: String, slots: Vec<usize>) -> Self {
        self.existing.insert(key, slots);
        self
    }

    pub fn with_failure(mut self, key: String) -> Self {
        self.failing.push(key);
        self
    }

    /// Hold responses for `key` until [`Notify::notify_one`] is called on the
    /// returned handle.
    pub fn gate(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().insert(key.to_owned(), notify.clone());
        notify
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl Backend for FakeBackend {
    async fn cameras(&self) -> Result<Vec<Camera>> {
        self.requests.lock().push("cameras".into());
        Ok(self.cameras.clone())
    }

    async fn availability(&self, camera: &str) -> Result<Vec<DayAvailability>> {
        self.requests.lock().push(format!("availability {camera}"));
        Ok(self.availability.get(camera).cloned().unwrap_or_default())
    }

    async fn existing_segments(
        &self,
        camera: &str,
        date: &str,
        segment: &str,
    ) -> Result<ExistingSegments> {
        let k = key(camera, date, segment);
        self.requests.lock().push(format!("existing {k}"));
        let gate = self.gates.lock().get(&k).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing.contains(&k) {
            return Err(ViewerError::Decode { path: k, reason: "backend unavailable".into() });
        }
        Ok(self.existing.get(&k).cloned().unwrap_or_default().into_iter().collect())
    }
}

pub fn cameras() -> Vec<Camera> {
    vec![Camera::new("front", "#ff0000"), Camera::new("back", "#0000ff")]
}
