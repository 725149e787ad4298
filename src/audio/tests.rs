use std::io::Write;
use std::time::Duration;

use super::sink::{SinkError, open_source, track_duration};
use super::*;
use crate::event::MarkerId;

#[test]
fn missing_file_reports_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.mp3");
    assert!(matches!(
        open_source(&path, Duration::ZERO),
        Err(SinkError::Open { .. })
    ));
}

#[test]
fn garbage_file_reports_decode_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"definitely not audio").unwrap();
    file.flush().unwrap();

    let result = open_source(file.path(), Duration::ZERO);
    assert!(matches!(result, Err(SinkError::Decode { .. })));
}

#[test]
fn sink_error_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lost.ogg");
    let Err(err) = open_source(&path, Duration::ZERO) else {
        panic!("expected an error");
    };
    assert!(err.to_string().contains("lost.ogg"));
}

#[test]
fn unreadable_metadata_has_no_duration() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"\0\0\0\0").unwrap();
    assert_eq!(track_duration(file.path()), None);
}

#[test]
fn playback_info_starts_idle() {
    let info = PlaybackInfo::default();
    assert_eq!(info.marker, None);
    assert!(!info.playing);
    assert_eq!(info.elapsed, Duration::ZERO);
}

#[test]
fn commands_compare_by_value() {
    assert_eq!(AudioCmd::Play(MarkerId(2)), AudioCmd::Play(MarkerId(2)));
    assert_ne!(AudioCmd::Play(MarkerId(2)), AudioCmd::Stop);
}
