//! Session state machine tests: selection protocol, stale responses, hover
//! and playback wiring. No network; fetch results are injected as events.
//!
//! Run with: `cargo test`

mod common;

use common::{cameras, FakeFactory, FakeMedia};
use nvr_viewer::availability::DayAvailability;
use nvr_viewer::camera::Color;
use nvr_viewer::config::Config;
use nvr_viewer::error::ViewerError;
use nvr_viewer::playback::PlaybackMode;
use nvr_viewer::session::{Event, Fetch, Session};
use nvr_viewer::timeline::ExistingSegments;

const BASE: &str = "http://127.0.0.1:8181";

fn session(factory: &FakeFactory) -> Session<FakeFactory> {
    let mut s = Session::new(&Config::default(), factory.clone());
    s.binder_mut().bind_media(FakeMedia::new(false).0);
    s.handle(Event::CamerasLoaded(Ok(cameras())));
    s
}

fn set(slots: &[usize]) -> ExistingSegments {
    slots.iter().copied().collect()
}

fn existing_fetch(fetches: &[Fetch]) -> Fetch {
    fetches
        .iter()
        .find(|f| matches!(f, Fetch::ExistingSegments { .. }))
        .cloned()
        .expect("existing-segments fetch issued")
}

fn loaded(fetch: Fetch, slots: &[usize]) -> Event {
    let Fetch::ExistingSegments { ticket, .. } = fetch else {
        panic!("not an existing-segments fetch: {fetch:?}");
    };
    Event::ExistingSegmentsLoaded { ticket, result: Ok(set(slots)) }
}

#[test]
fn test_start_requests_cameras() {
    let s = Session::new(&Config::default(), FakeFactory::supported());
    assert_eq!(s.start(), vec![Fetch::Cameras]);
}

#[test]
fn test_select_camera_requests_availability() {
    let mut s = session(&FakeFactory::supported());
    let fetches = s.handle(Event::SelectCamera("front".into()));
    assert_eq!(fetches, vec![Fetch::Availability { camera: "front".into() }]);
    assert_eq!(s.selected_color(), Color::new("#ff0000"));
}

#[test]
fn test_select_segment_sets_selection_before_fetch_resolves() {
    let mut s = session(&FakeFactory::supported());
    s.handle(Event::SelectCamera("front".into()));
    let fetches = s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() });

    let Fetch::ExistingSegments { camera, date, segment, .. } = existing_fetch(&fetches) else {
        unreachable!()
    };
    assert_eq!((camera.as_str(), date.as_str(), segment.as_str()), ("front", "2025-03-14", "06-12"));
    assert_eq!(s.selection().date(), Some("2025-03-14"));
    assert_eq!(s.stream_source(), "front/2025-03-14/06-12/stream.m3u8");
}

#[test]
fn test_grid_keeps_previous_set_until_fetch_resolves() {
    let mut s = session(&FakeFactory::supported());
    s.handle(Event::SelectCamera("front".into()));
    let a = existing_fetch(&s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "00-06".into() }));
    s.handle(loaded(a, &[1, 2, 3]));
    assert_eq!(s.grid().recorded_count(), 3);

    let b = existing_fetch(&s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() }));
    assert_eq!(s.grid().recorded_count(), 3, "no optimistic clearing");

    s.handle(loaded(b, &[10]));
    assert_eq!(*s.existing(), set(&[10]));
    assert_eq!(s.grid().recorded_count(), 1);
}

#[test]
fn test_stale_response_does_not_overwrite_newer_selection() {
    let mut s = session(&FakeFactory::supported());
    s.handle(Event::SelectCamera("front".into()));
    let a = existing_fetch(&s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "00-06".into() }));
    let b = existing_fetch(&s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() }));

    // B resolves first, then A arrives late.
    s.handle(loaded(b, &[5, 6]));
    s.handle(loaded(a, &[100, 200, 300]));

    assert_eq!(*s.existing(), set(&[5, 6]));
    assert_eq!(s.selection().segment(), Some("06-12"));
}

#[test]
fn test_fetch_failure_keeps_previous_state() {
    let mut s = session(&FakeFactory::supported());
    s.handle(Event::SelectCamera("front".into()));
    let a = existing_fetch(&s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "00-06".into() }));
    s.handle(loaded(a, &[4]));

    let b = existing_fetch(&s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() }));
    let Fetch::ExistingSegments { ticket, .. } = b else { unreachable!() };
    s.handle(Event::ExistingSegmentsLoaded {
        ticket,
        result: Err(ViewerError::Playback("boom".into())),
    });

    assert_eq!(*s.existing(), set(&[4]));
    assert_eq!(s.selection().segment(), Some("06-12"));
}

#[test]
fn test_failed_camera_load_leaves_list_empty() {
    let mut s = Session::new(&Config::default(), FakeFactory::supported());
    s.handle(Event::CamerasLoaded(Err(ViewerError::Config("down".into()))));
    assert!(s.cameras().is_empty());
}

#[test]
fn test_switching_camera_refetches_and_discards_old_responses() {
    let mut s = session(&FakeFactory::supported());
    s.handle(Event::SelectCamera("front".into()));
    let a = existing_fetch(&s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() }));

    let fetches = s.handle(Event::SelectCamera("back".into()));
    assert!(fetches.contains(&Fetch::Availability { camera: "back".into() }));
    let b = existing_fetch(&fetches);
    let Fetch::ExistingSegments { ref camera, ref segment, .. } = b else { unreachable!() };
    assert_eq!((camera.as_str(), segment.as_str()), ("back", "06-12"));

    s.handle(loaded(a, &[1]));
    assert!(s.existing().is_empty());
    s.handle(loaded(b, &[2, 3]));
    assert_eq!(*s.existing(), set(&[2, 3]));
    assert_eq!(*s.grid().color_at(2), Color::new("#0000ff"));
}

#[test]
fn test_availability_for_deselected_camera_is_dropped() {
    let mut s = session(&FakeFactory::supported());
    s.handle(Event::SelectCamera("front".into()));
    s.handle(Event::SelectCamera("back".into()));
    let day: DayAvailability = serde_json::from_str(r#"{"date": "2025-03-14T00:00:00Z", "segments": []}"#).unwrap();
    s.handle(Event::AvailabilityLoaded { camera: "front".into(), result: Ok(vec![day]) });
    assert!(s.availability().is_empty());
}

#[test]
fn test_segment_without_camera_is_ignored() {
    let mut s = session(&FakeFactory::supported());
    let fetches = s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() });
    assert!(fetches.is_empty());
    assert_eq!(s.stream_source(), "");
}

#[test]
fn test_unknown_camera_colour_is_black() {
    let mut s = session(&FakeFactory::supported());
    s.handle(Event::SelectCamera("attic".into()));
    assert_eq!(s.selected_color(), Color::UNKNOWN_CAMERA);
}

#[test]
fn test_hover_drives_thumbnail_and_anchor() {
    let mut s = session(&FakeFactory::supported());
    s.handle(Event::SelectCamera("front".into()));
    s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() });
    assert_eq!(s.thumbnail_source(), "");

    s.handle(Event::HoverEnter { slot: 7, x: 500.0, y: 400.0 });
    assert_eq!(s.thumbnail_source(), "front/2025-03-14/06-12/thumbnails/007.jpg");
    assert_eq!(s.thumbnail_url(), format!("{BASE}/videos/front/2025-03-14/06-12/thumbnails/007.jpg"));
    assert_eq!(s.hover().anchor(), (400.0, 150.0));

    s.handle(Event::HoverLeave);
    assert_eq!(s.thumbnail_source(), "");
    assert_eq!(s.thumbnail_url(), "");
}

#[test]
fn test_selection_drives_playback_binder() {
    let factory = FakeFactory::supported();
    let mut s = session(&factory);
    s.handle(Event::SelectCamera("front".into()));
    assert_eq!(s.binder().mode(), PlaybackMode::Idle);

    s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "00-06".into() });
    assert_eq!(s.binder().mode(), PlaybackMode::Adaptive);
    assert_eq!(s.binder().source(), format!("{BASE}/videos/front/2025-03-14/00-06/stream.m3u8"));

    s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() });
    assert_eq!(factory.log.lock().created, 2);
    assert_eq!(factory.max_active(), 1);

    // Hover and response events leave the engine alone.
    s.handle(Event::HoverEnter { slot: 3, x: 0.0, y: 0.0 });
    assert_eq!(factory.log.lock().created, 2);
}

#[test]
fn test_seek_event_moves_media_without_reload() {
    let factory = FakeFactory::supported();
    let mut s = Session::new(&Config::default(), factory.clone());
    let (media, state) = FakeMedia::new(false);
    s.binder_mut().bind_media(media);
    s.handle(Event::CamerasLoaded(Ok(cameras())));
    s.handle(Event::SelectCamera("front".into()));
    s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() });

    let fetches = s.handle(Event::Seek { slot: 42 });
    assert!(fetches.is_empty());
    assert_eq!(state.lock().position, Some(420.0));
    assert_eq!(factory.log.lock().created, 1);
    assert_eq!(s.selection().segment(), Some("06-12"));
}

#[test]
fn test_seek_without_media_is_silent() {
    let mut s = Session::new(&Config::default(), FakeFactory::supported());
    assert!(s.handle(Event::Seek { slot: 5 }).is_empty());
}

#[test]
fn test_snapshot_reflects_state() {
    let mut s = session(&FakeFactory::supported());
    s.handle(Event::SelectCamera("front".into()));
    let a = existing_fetch(&s.handle(Event::SelectSegment { date: "2025-03-14".into(), segment: "06-12".into() }));
    s.handle(loaded(a, &[0, 2159, 2160]));
    s.handle(Event::HoverEnter { slot: 1, x: 150.0, y: 300.0 });

    let snap = s.snapshot();
    assert_eq!(snap.camera.as_deref(), Some("front"));
    assert_eq!(snap.camera_count, 2);
    assert_eq!(snap.recorded_slots, 2);
    assert_eq!(snap.hovered, Some(1));
    assert_eq!(snap.anchor, (50.0, 50.0));
    assert_eq!(snap.playback, PlaybackMode::Adaptive);
    assert!(snap.stream_url.ends_with("/videos/front/2025-03-14/06-12/stream.m3u8"));
}
