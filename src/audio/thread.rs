use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use crate::event::{AudioSource, MarkerId};

use super::sink::{create_sink_at, track_duration};
use super::types::{AudioCmd, PlaybackHandle, PlaybackInfo};

/// How often the thread wakes up to refresh elapsed time without commands.
const TICK: Duration = Duration::from_millis(200);

/// Everything the audio thread knows about the loaded track.
#[derive(Default)]
struct Current {
    sink: Option<Sink>,
    marker: Option<MarkerId>,
    paused: bool,
    // Track start time and accumulated elapsed when paused.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl Current {
    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn do_play(
        &mut self,
        id: MarkerId,
        stream: &OutputStream,
        sources: &[AudioSource],
        playback_info: &PlaybackHandle,
    ) {
        // The previous track is fully torn down before anything new starts.
        self.do_stop(playback_info);

        let path = match sources.get(id.0) {
            Some(AudioSource::File(path)) => path,
            Some(AudioSource::Remote(url)) => {
                tracing::warn!(marker = %id, %url, "remote audio is not supported, skipping");
                return;
            }
            None => {
                tracing::warn!(marker = %id, "no audio source for marker");
                return;
            }
        };

        let sink = match create_sink_at(stream, path, Duration::ZERO) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!(marker = %id, error = %e, "cannot play marker audio");
                return;
            }
        };
        sink.play();

        self.sink = Some(sink);
        self.marker = Some(id);
        self.paused = false;
        self.started_at = Some(Instant::now());
        self.accumulated = Duration::ZERO;

        tracing::info!(marker = %id, path = %path.display(), "playing");
        if let Ok(mut info) = playback_info.lock() {
            *info = PlaybackInfo {
                marker: Some(id),
                elapsed: Duration::ZERO,
                total: track_duration(path),
                playing: true,
            };
        }
    }

    fn do_stop(&mut self, playback_info: &PlaybackHandle) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        *self = Self::default();
        if let Ok(mut info) = playback_info.lock() {
            *info = PlaybackInfo::default();
        }
    }

    fn toggle_pause(&mut self, playback_info: &PlaybackHandle) {
        let Some(ref s) = self.sink else {
            return;
        };
        if self.paused {
            s.play();
            self.started_at = Some(Instant::now());
        } else {
            s.pause();
            if let Some(st) = self.started_at.take() {
                self.accumulated += st.elapsed();
            }
        }
        self.paused = !self.paused;
        if let Ok(mut info) = playback_info.lock() {
            info.playing = !self.paused;
            info.elapsed = self.elapsed();
        }
    }

    fn seek_by(
        &mut self,
        secs: i32,
        stream: &OutputStream,
        sources: &[AudioSource],
        playback_info: &PlaybackHandle,
    ) {
        // Scrubbing: rebuild the current sink and skip into the file.
        let Some(id) = self.marker else {
            return;
        };
        let Some(AudioSource::File(path)) = sources.get(id.0) else {
            return;
        };

        let cur = self.elapsed().as_secs() as i64;
        let new_elapsed = Duration::from_secs((cur + secs as i64).max(0) as u64);

        let new_sink = match create_sink_at(stream, path, new_elapsed) {
            Ok(sink) => sink,
            Err(e) => {
                tracing::warn!(marker = %id, error = %e, "seek failed");
                return;
            }
        };
        if let Some(s) = self.sink.take() {
            s.stop();
        }
        if self.paused {
            self.started_at = None;
        } else {
            new_sink.play();
            self.started_at = Some(Instant::now());
        }
        self.sink = Some(new_sink);
        self.accumulated = new_elapsed;

        if let Ok(mut info) = playback_info.lock() {
            info.elapsed = new_elapsed;
        }
    }

    /// Refresh elapsed time and notice when the track ran out.
    fn tick(&mut self, playback_info: &PlaybackHandle) {
        let Some(ref s) = self.sink else {
            return;
        };
        let finished = s.empty();
        if finished && !self.paused {
            if let Some(st) = self.started_at.take() {
                self.accumulated += st.elapsed();
            }
            self.paused = true;
        }
        if let Ok(mut info) = playback_info.lock() {
            info.elapsed = self.elapsed();
            info.playing = !self.paused;
        }
    }
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

pub(super) fn spawn_audio_thread(
    sources: Vec<AudioSource>,
    rx: Receiver<AudioCmd>,
    playback_info: PlaybackHandle,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!(error = %e, "no audio output device, audio disabled");
                // Keep accepting commands so senders never see a closed channel early.
                for cmd in rx {
                    if matches!(cmd, AudioCmd::Quit { .. }) {
                        break;
                    }
                }
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);

        let mut current = Current::default();

        loop {
            match rx.recv_timeout(TICK) {
                Ok(AudioCmd::Play(id)) => current.do_play(id, &stream, &sources, &playback_info),
                Ok(AudioCmd::Stop) => current.do_stop(&playback_info),
                Ok(AudioCmd::TogglePause) => current.toggle_pause(&playback_info),
                Ok(AudioCmd::SeekBy(secs)) => {
                    current.seek_by(secs, &stream, &sources, &playback_info)
                }
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    if let Some(s) = current.sink.as_ref() {
                        if !current.paused {
                            fade_out_sink(s, fade_out_ms);
                        }
                    }
                    current.do_stop(&playback_info);
                    break;
                }
                Err(RecvTimeoutError::Timeout) => current.tick(&playback_info),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
