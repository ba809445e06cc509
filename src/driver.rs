//! Event queue that drives a [`Session`].
//!
//! ```text
//! UI / CLI ──Event──┐
//!                   ▼
//!              mpsc channel ──→ session task ──→ Session::handle
//!                   ▲                 │
//!                   │                 ▼ Fetch
//!                   └──Event── fetch task (one per request, Backend)
//! ```
//!
//! The session task is the only owner of the session, so events are applied
//! strictly one at a time. Fetches run as separate tasks and report back
//! through the same queue. A [`SessionSnapshot`] is published after every
//! event for status readers.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::backend::Backend;
use crate::playback::{EngineFactory, MediaOf};
use crate::session::{Event, Fetch, Session, SessionSnapshot};

/// Shared handle through which the CLI and tests read session state.
pub type SharedSnapshot = Arc<RwLock<SessionSnapshot>>;

/// Run one fetch against `backend` and wrap the result as the event that
/// reports it.
pub async fn run_fetch<B: Backend>(backend: &B, fetch: Fetch) -> Event {
    debug!(?fetch, "Fetching");
    match fetch {
        Fetch::Cameras => Event::CamerasLoaded(backend.cameras().await),
        Fetch::Availability { camera } => {
            let result = backend.availability(&camera).await;
            Event::AvailabilityLoaded { camera, result }
        }
        Fetch::ExistingSegments { ticket, camera, date, segment } => Event::ExistingSegmentsLoaded {
            ticket,
            result: backend.existing_segments(&camera, &date, &segment).await,
        },
    }
}

/// Run `fetches` and everything they trigger, one at a time, until the
/// session has nothing left to request. For one-shot callers that do not
/// need a background task.
pub async fn settle<B: Backend, F: EngineFactory>(
    session: &mut Session<F>,
    backend: &B,
    fetches: Vec<Fetch>,
) {
    let mut queue: VecDeque<Fetch> = fetches.into();
    while let Some(fetch) = queue.pop_front() {
        let event = run_fetch(backend, fetch).await;
        queue.extend(session.handle(event));
    }
}

/// Handle to a session running in its own task.
pub struct SessionHandle<F: EngineFactory> {
    tx: mpsc::UnboundedSender<Event>,
    snapshot: SharedSnapshot,
    handle: JoinHandle<Session<F>>,
}

impl<F: EngineFactory> SessionHandle<F> {
    /// Queue a user event. Returns `false` if the session task has exited.
    pub fn send(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Copy of the state published after the most recent event.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().clone()
    }

    pub fn shared_snapshot(&self) -> SharedSnapshot {
        self.snapshot.clone()
    }

    /// Close the queue and wait for the session task. In-flight fetches are
    /// abandoned. Returns the session so the caller decides when playback
    /// resources are released.
    pub async fn shutdown(self) -> Option<Session<F>> {
        drop(self.tx);
        self.handle.await.ok()
    }
}

/// Spawn the session task. The initial camera fetch is issued immediately.
pub fn spawn_session<B, F>(session: Session<F>, backend: Arc<B>) -> SessionHandle<F>
where
    B: Backend,
    F: EngineFactory + Send + 'static,
    F::Engine: Send + 'static,
    MediaOf<F>: Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let snapshot = Arc::new(RwLock::new(session.snapshot()));
    let snap_clone = snapshot.clone();

    let handle = tokio::spawn(async move { session_loop(session, backend, rx, snap_clone).await });

    SessionHandle { tx, snapshot, handle }
}

async fn session_loop<B, F>(
    mut session: Session<F>,
    backend: Arc<B>,
    mut rx: mpsc::UnboundedReceiver<Event>,
    snapshot: SharedSnapshot,
) -> Session<F>
where
    B: Backend,
    F: EngineFactory,
{
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel::<Event>();
    for fetch in session.start() {
        dispatch(&backend, &resp_tx, fetch);
    }

    info!("Session started");

    loop {
        // Backend responses and user events share one ordering point; only
        // closing the user queue ends the session.
        let event = tokio::select! {
            ev = rx.recv() => match ev {
                Some(ev) => ev,
                None => break,
            },
            Some(ev) = resp_rx.recv() => ev,
        };

        let fetches = session.handle(event);
        *snapshot.write() = session.snapshot();
        for fetch in fetches {
            dispatch(&backend, &resp_tx, fetch);
        }
    }

    info!("Session closed");
    session
}

fn dispatch<B: Backend>(backend: &Arc<B>, tx: &mpsc::UnboundedSender<Event>, fetch: Fetch) {
    let backend = backend.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = run_fetch(backend.as_ref(), fetch).await;
        // The session may have closed while the request was in flight.
        let _ = tx.send(event);
    });
}
