//! NVR viewer — browse and play recorded footage from the recorder.
//!
//! Usage:
//!   nvr-viewer cameras                                             # list cameras
//!   nvr-viewer dates --camera front                                # recorded days and blocks
//!   nvr-viewer grid  --camera front --date 2025-03-14 --segment 06-12 --hover 7
//!   nvr-viewer play  --camera front --date 2025-03-14 --segment 06-12 --seek 90

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use nvr_viewer::backend::{Backend, HttpBackend};
use nvr_viewer::config::Config;
use nvr_viewer::driver::settle;
use nvr_viewer::error::ViewerError;
use nvr_viewer::playback::{LinkOutput, NativeOnly};
use nvr_viewer::session::{Event, Session};
use nvr_viewer::timeline::SegmentGrid;

#[derive(Parser)]
#[command(name = "nvr-viewer", about = "Browse and play recorded NVR footage", version)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when it is absent.
    #[arg(short, long, default_value = "viewer.toml", global = true)]
    config: PathBuf,
    /// Override `backend.base_url`.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List cameras and their timeline colours.
    Cameras,
    /// List recorded days and 6-hour blocks for a camera.
    Dates {
        #[arg(long)]
        camera: String,
    },
    /// Print the segment grid of one block.
    Grid {
        #[arg(long)]
        camera: String,
        /// Date as `YYYY-MM-DD`.
        #[arg(long)]
        date: String,
        /// Block as `HH-HH`, e.g. `06-12`.
        #[arg(long)]
        segment: String,
        /// Also print the thumbnail URL for this slot.
        #[arg(long)]
        hover: Option<usize>,
        /// Width of the rendered grid in characters.
        #[arg(long, default_value_t = 72)]
        columns: usize,
    },
    /// Play one block (requires the `gstreamer` feature).
    Play {
        #[arg(long)]
        camera: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        segment: String,
        /// Start at this slot.
        #[arg(long)]
        seek: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = ?e, "Command failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut cfg = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(url) = cli.base_url {
        cfg.backend.base_url = url;
        cfg.validate()?;
    }
    let backend = HttpBackend::new(&cfg.backend).context("building HTTP client")?;

    match cli.command {
        Command::Cameras => run_cameras(&backend).await,
        Command::Dates { camera } => run_dates(&backend, &camera).await,
        Command::Grid { camera, date, segment, hover, columns } => {
            run_grid(&cfg, &backend, camera, date, segment, hover, columns).await
        }
        Command::Play { camera, date, segment, seek } => {
            run_play(&cfg, backend, camera, date, segment, seek).await
        }
    }
}

async fn run_cameras(backend: &HttpBackend) -> anyhow::Result<()> {
    let cameras = backend.cameras().await.context("fetching cameras")?;
    println!("=== Cameras ({}) ===", cameras.len());
    for cam in &cameras {
        println!("  {:<20} {}", cam.id, cam.color);
    }
    Ok(())
}

async fn run_dates(backend: &HttpBackend, camera: &str) -> anyhow::Result<()> {
    let days = backend
        .availability(camera)
        .await
        .with_context(|| format!("fetching availability for '{camera}'"))?;
    println!("=== {camera}: {} day(s) ===", days.len());
    for day in &days {
        println!("{}", day.date_key());
        for block in &day.blocks {
            let chunks: u32 = block.recordings.iter().map(|r| r.chunk_count).sum();
            println!(
                "  {}  recordings: {:<3} chunks: {}",
                block.key(),
                block.recordings.len(),
                chunks
            );
        }
    }
    Ok(())
}

async fn run_grid(
    cfg: &Config,
    backend: &HttpBackend,
    camera: String,
    date: String,
    segment: String,
    hover: Option<usize>,
    columns: usize,
) -> anyhow::Result<()> {
    let mut session = Session::new(cfg, NativeOnly::<LinkOutput>::new());
    session.binder_mut().bind_media(LinkOutput::default());

    let initial = session.start();
    settle(&mut session, backend, initial).await;
    if session.cameras().find(&camera).is_none() {
        return Err(ViewerError::CameraNotFound { id: camera }.into());
    }

    let fetches = session.handle(Event::SelectCamera(camera));
    settle(&mut session, backend, fetches).await;
    let fetches = session.handle(Event::SelectSegment { date, segment });
    settle(&mut session, backend, fetches).await;
    if let Some(slot) = hover {
        session.handle(Event::HoverEnter { slot, x: 0.0, y: 0.0 });
    }

    let grid = session.grid();
    let tl = session.timeline();
    println!(
        "=== {} slots of {}s, {} recorded ===",
        tl.total_slots(),
        tl.segment_duration().as_secs(),
        grid.recorded_count()
    );
    println!("[{}]", render_grid(&grid, columns));
    println!("Colour  : {}", session.selected_color());
    if let Some(media) = session.binder().media() {
        println!("Stream  : {}", media.source);
    }
    if hover.is_some() {
        println!("Preview : {}", session.thumbnail_url());
    }
    Ok(())
}

fn render_grid(grid: &SegmentGrid, columns: usize) -> String {
    const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];
    grid.summarize(columns)
        .into_iter()
        .map(|f| SHADES[((f * 4.0).ceil() as usize).min(4)])
        .collect()
}

#[cfg(feature = "gstreamer")]
async fn run_play(
    cfg: &Config,
    backend: HttpBackend,
    camera: String,
    date: String,
    segment: String,
    seek: Option<usize>,
) -> anyhow::Result<()> {
    use std::sync::Arc;
    use std::time::Duration;

    use nvr_viewer::driver::spawn_session;
    use nvr_viewer::gst_engine::{GstFactory, GstVideoOutput};
    use nvr_viewer::playback::PlaybackMode;
    use tracing::{info, warn};

    let mut session = Session::new(cfg, GstFactory);
    session.binder_mut().bind_media(GstVideoOutput::new());
    let handle = spawn_session(session, Arc::new(backend));

    for event in [
        Event::SelectCamera(camera),
        Event::SelectSegment { date, segment },
    ] {
        if !handle.send(event) {
            bail!("session task exited before the selection was applied");
        }
    }

    // The selection is applied as soon as the session task picks it up.
    let mut snap = handle.snapshot();
    for _ in 0..50 {
        if snap.playback != PlaybackMode::Idle {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        snap = handle.snapshot();
    }
    match snap.playback {
        PlaybackMode::Adaptive => info!(url = snap.stream_url, "Playing"),
        other => bail!("stream did not start ({other:?})"),
    }
    if let Some(slot) = seek {
        if !handle.send(Event::Seek { slot }) {
            warn!(slot, "Session closed, seek dropped");
        }
    }

    tokio::signal::ctrl_c().await.context("waiting for CTRL+C")?;
    info!("Received CTRL+C, stopping playback…");
    drop(handle.shutdown().await);
    Ok(())
}

#[cfg(not(feature = "gstreamer"))]
async fn run_play(
    _cfg: &Config,
    _backend: HttpBackend,
    _camera: String,
    _date: String,
    _segment: String,
    _seek: Option<usize>,
) -> anyhow::Result<()> {
    bail!("built without the `gstreamer` feature; use `grid` to get a stream URL for an external player")
}
