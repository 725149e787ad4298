//! Utilities for creating `rodio` sinks from marker audio files.
//!
//! The helpers here encapsulate opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use rodio::{Decoder, OutputStream, Sink, Source};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SinkError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
}

/// Open and decode `path`, skipping the first `start_at`.
pub(crate) fn open_source(path: &Path, start_at: Duration) -> Result<impl Source + Send + 'static, SinkError> {
    let file = File::open(path).map_err(|source| SinkError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|source| SinkError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    Ok(source.skip_duration(start_at))
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    handle: &OutputStream,
    path: &Path,
    start_at: Duration,
) -> Result<Sink, SinkError> {
    let source = open_source(path, start_at)?;
    let sink = Sink::connect_new(handle.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

/// Track length from the file's metadata, if it can be read.
pub(crate) fn track_duration(path: &Path) -> Option<Duration> {
    let tagged = lofty::read_from_path(path).ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}
