use super::*;
use crate::audio::PlaybackInfo;
use crate::event::{AudioSource, EventInfo, Marker, MarkerId};
use crate::geo::{Coordinate, UserLocation, distance_meters};
use crate::location::{LocationError, LocationMode, LocationSnapshot};
use crate::venue::{FailOpenReason, GateDecision};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

fn m(id: usize, title: &str, lat: f64, lng: f64) -> Marker {
    Marker {
        id: MarkerId(id),
        track_title: title.into(),
        artist_name: "Artist".into(),
        coordinate: Coordinate::new(lat, lng).unwrap(),
        audio: AudioSource::File(PathBuf::from(format!("{id}.mp3"))),
        icon_url: None,
    }
}

fn app() -> App {
    let markers = vec![
        m(0, "Alpha", 0.0, 0.0),
        m(1, "Beta", 0.0, 0.0001),
        m(2, "Gamma", 0.0, 0.001),
    ];
    App::new(EventInfo::default(), markers, 10.0)
}

fn snap(lat: f64, lng: f64) -> LocationSnapshot {
    LocationSnapshot {
        mode: LocationMode::Live,
        current: Some(Coordinate::new(lat, lng).unwrap().into()),
        error: None,
        watching: true,
    }
}

#[test]
fn cursor_wraps_both_ways() {
    let mut app = app();
    assert_eq!(app.selected, 0);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    app.next();
    app.next();
    assert_eq!(app.selected, 0);
}

#[test]
fn cursor_on_empty_event_stays_put() {
    let mut app = App::new(EventInfo::default(), Vec::new(), 10.0);
    app.next();
    app.prev();
    assert_eq!(app.selected, 0);
    assert!(app.cursor_marker().is_none());
    assert!(app.marker_rows().is_empty());
}

#[test]
fn rows_without_location_have_no_distance() {
    let app = app();
    let rows = app.marker_rows();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| !r.in_range && r.distance_m.is_none() && !r.active));
}

#[test]
fn apply_location_marks_rows_and_reports_changes() {
    let mut app = app();
    let change = app.apply_location(snap(0.0, 0.0)).unwrap();
    assert_eq!(change.current, Some(MarkerId(0)));

    let rows = app.marker_rows();
    assert!(rows[0].in_range && rows[0].active);
    assert!(!rows[1].in_range && !rows[1].active);
    assert_eq!(rows[0].distance_m, Some(0));
    assert_eq!(rows[1].distance_m, Some(11));
    assert_eq!(app.active_marker().unwrap().track_title, "Alpha");

    // Same spot again: no change.
    assert!(app.apply_location(snap(0.0, 0.0)).is_none());
}

#[test]
fn leaving_range_resets_playback_state() {
    let mut app = app();
    app.apply_location(snap(0.0, 0.0));
    app.playback = PlaybackState::Playing;

    let change = app.apply_location(snap(0.0, 0.0005)).unwrap();
    assert_eq!(change.current, None);
    assert_eq!(app.playback, PlaybackState::Stopped);
}

#[test]
fn tapping_and_closing_details() {
    let mut app = app();
    assert!(app.open_details().is_none());

    app.next();
    app.next();
    app.tap_cursor_marker();
    let d = app.open_details().unwrap();
    assert_eq!(d.track_title, "Gamma");
    assert!(!d.playable);

    app.close_details();
    assert!(app.open_details().is_none());
}

#[test]
fn tapping_player_jumps_to_active_marker() {
    let mut app = app();
    assert!(!app.tap_player());

    app.apply_location(snap(0.0, 0.0));
    app.selected = 2;
    assert!(app.tap_player());
    assert_eq!(app.selected, 0);
    assert!(app.open_details().unwrap().playable);
}

#[test]
fn advisory_reflects_location_error() {
    let mut app = app();
    assert_eq!(app.advisory(), None);

    let mut s = snap(0.0, 0.0);
    s.error = Some(LocationError::PermissionDenied);
    app.apply_location(s);
    let text = app.advisory().unwrap();
    assert!(text.contains("denied"), "{text}");
}

#[test]
fn nudging_moves_by_the_step() {
    let start: UserLocation = Coordinate::new(0.0, 0.0).unwrap().into();
    let north = Nudge::North.apply(start, 5.0);
    assert!(north.coordinate.latitude() > 0.0);
    assert!((distance_meters(start.coordinate, north.coordinate) - 5.0).abs() < 0.1);

    let west = Nudge::West.apply(start, 5.0);
    assert!(west.coordinate.longitude() < 0.0);
    assert_eq!(west.coordinate.latitude(), 0.0);
}

#[test]
fn teleport_target_is_the_cursor_marker() {
    let mut app = app();
    app.next();
    let target = app.cursor_location().unwrap();
    assert_eq!(target.coordinate, app.markers[1].coordinate);
    assert_eq!(target.accuracy, None);
}

#[test]
fn gate_outside_blocks_and_fail_open_admits() {
    let mut app = app();
    assert!(!app.is_outside_venue());

    app.set_gate(GateDecision::FailOpen(FailOpenReason::NoVenue));
    assert!(!app.is_outside_venue());

    let far: UserLocation = Coordinate::new(10.0, 10.0).unwrap().into();
    app.set_gate(GateDecision::Outside(far));
    assert!(app.is_outside_venue());
}

#[test]
fn mode_label_flags_a_missing_feed() {
    let mut app = app();
    app.apply_location(snap(0.0, 0.0));
    assert_eq!(app.mode_label(), "Live");

    let mut s = snap(0.0, 0.0);
    s.watching = false;
    app.apply_location(s);
    assert_eq!(app.mode_label(), "Live (no position feed)");

    s.mode = LocationMode::Mock;
    app.apply_location(s);
    assert_eq!(app.mode_label(), "Mock");
}

#[test]
fn sync_playback_reads_shared_info() {
    let mut app = app();
    let handle = Arc::new(Mutex::new(PlaybackInfo::default()));
    app.set_playback_handle(handle.clone());

    app.sync_playback();
    assert_eq!(app.playback, PlaybackState::Stopped);

    {
        let mut info = handle.lock().unwrap();
        info.marker = Some(MarkerId(0));
        info.playing = true;
    }
    app.sync_playback();
    assert_eq!(app.playback, PlaybackState::Playing);

    handle.lock().unwrap().playing = false;
    app.sync_playback();
    assert_eq!(app.playback, PlaybackState::Paused);
}
