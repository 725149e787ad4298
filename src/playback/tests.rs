use std::path::PathBuf;

use super::*;
use crate::audio::AudioCmd;
use crate::event::{AudioSource, Marker, MarkerId};
use crate::geo::{Coordinate, UserLocation};
use crate::proximity::TrackChange;

fn marker(id: usize, lat: f64, lng: f64) -> Marker {
    Marker {
        id: MarkerId(id),
        track_title: format!("Track {id}"),
        artist_name: format!("Artist {id}"),
        coordinate: Coordinate::new(lat, lng).unwrap(),
        audio: AudioSource::File(PathBuf::from(format!("{id}.mp3"))),
        icon_url: None,
    }
}

fn at(lat: f64, lng: f64) -> UserLocation {
    Coordinate::new(lat, lng).unwrap().into()
}

fn two_markers() -> Vec<Marker> {
    vec![marker(0, 0.0, 0.0), marker(1, 0.0, 0.0001)]
}

#[test]
fn starts_with_nothing_active_or_selected() {
    let c = PlaybackCoordinator::new(10.0);
    assert_eq!(c.active_track(), None);
    assert_eq!(c.selected_marker(), None);
    assert!(!c.details_open());
    assert_eq!(c.details(None, &two_markers()), None);
}

#[test]
fn entering_range_reports_a_single_change() {
    let markers = two_markers();
    let mut c = PlaybackCoordinator::new(10.0);

    let change = c.on_location_or_markers_changed(Some(&at(0.0, 0.0)), &markers);
    assert_eq!(
        change,
        Some(TrackChange {
            previous: None,
            current: Some(MarkerId(0)),
        })
    );
    assert_eq!(c.active_track(), Some(MarkerId(0)));

    // Jitter inside the same range must not restart playback.
    assert_eq!(
        c.on_location_or_markers_changed(Some(&at(0.00001, 0.0)), &markers),
        None
    );
    assert_eq!(
        c.on_location_or_markers_changed(Some(&at(0.0, 0.00001)), &markers),
        None
    );
}

#[test]
fn leaving_range_stops_playback() {
    let markers = two_markers();
    let mut c = PlaybackCoordinator::new(10.0);
    c.on_location_or_markers_changed(Some(&at(0.0, 0.0)), &markers);

    let change = c
        .on_location_or_markers_changed(Some(&at(0.0, 0.0002)), &markers)
        .unwrap();
    assert_eq!(change.previous, Some(MarkerId(0)));
    assert_eq!(change.current, None);
    assert_eq!(command_for(&change), AudioCmd::Stop);
    assert_eq!(c.active_track(), None);
}

#[test]
fn losing_location_clears_the_active_track() {
    let markers = two_markers();
    let mut c = PlaybackCoordinator::new(10.0);
    c.on_location_or_markers_changed(Some(&at(0.0, 0.0)), &markers);
    assert!(c.on_location_or_markers_changed(None, &markers).is_some());
    assert_eq!(c.active_track(), None);
}

#[test]
fn switching_between_markers_plays_the_new_one() {
    let markers = two_markers();
    let mut c = PlaybackCoordinator::new(12.0);
    c.on_location_or_markers_changed(Some(&at(0.0, 0.0)), &markers);

    let change = c
        .on_location_or_markers_changed(Some(&at(0.0, 0.0002)), &markers)
        .unwrap();
    assert_eq!(change.previous, Some(MarkerId(0)));
    assert_eq!(change.current, Some(MarkerId(1)));
    assert_eq!(command_for(&change), AudioCmd::Play(MarkerId(1)));
}

#[test]
fn tapping_an_out_of_range_marker_shows_details_without_audio() {
    let markers = vec![marker(0, 0.0, 0.0), marker(1, 0.0, 0.001)];
    let user = at(0.0, 0.0);
    let mut c = PlaybackCoordinator::new(10.0);
    c.on_location_or_markers_changed(Some(&user), &markers);

    c.on_marker_tapped(&markers[1]);
    assert!(c.details_open());
    assert_eq!(c.selected_marker(), Some(MarkerId(1)));

    let d = c.details(Some(&user), &markers).unwrap();
    assert_eq!(d.track_title, "Track 1");
    assert!(!d.in_range);
    assert!(!d.playable);
    // ~111 m at the equator.
    let dist = d.distance_m.unwrap();
    assert!((105..=117).contains(&dist), "{dist}");

    // Selecting does not touch the active track.
    assert_eq!(c.active_track(), Some(MarkerId(0)));
}

#[test]
fn details_follow_the_location() {
    let markers = two_markers();
    let mut c = PlaybackCoordinator::new(10.0);
    c.on_marker_tapped(&markers[0]);

    let far = at(0.0, 0.001);
    assert!(!c.details(Some(&far), &markers).unwrap().in_range);

    let near = at(0.0, 0.0);
    c.on_location_or_markers_changed(Some(&near), &markers);
    let d = c.details(Some(&near), &markers).unwrap();
    assert!(d.in_range);
    assert!(d.playable);
    assert_eq!(d.distance_m, Some(0));

    assert_eq!(c.details(None, &markers).unwrap().distance_m, None);
}

#[test]
fn player_tap_routes_to_the_active_marker() {
    let markers = two_markers();
    let mut c = PlaybackCoordinator::new(10.0);
    assert!(!c.on_player_tapped());
    assert!(!c.details_open());

    c.on_location_or_markers_changed(Some(&at(0.0, 0.0)), &markers);
    c.on_marker_tapped(&markers[1]);
    c.close_details();
    assert!(!c.details_open());

    assert!(c.on_player_tapped());
    assert!(c.details_open());
    assert_eq!(c.selected_marker(), Some(MarkerId(0)));
}
