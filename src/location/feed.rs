//! A position feed read from a file, named pipe or device node.
//!
//! Each newline-terminated line is one of:
//! - `lat,lng` or `lat,lng,accuracy_m`
//! - an NMEA `GGA` sentence (`$GPGGA`, `$GNGGA`, ...); other sentences are skipped
//!
//! Blank lines and lines starting with `#` are ignored.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::geo::{Coordinate, UserLocation};

use super::provider::{LocationProvider, WatchHandle};
use super::types::{LocationError, LocationEvent, LocationMessage, PositionOptions, SubscriptionId};

/// How often to look for appended lines once the end of the feed is reached.
const FOLLOW_POLL: Duration = Duration::from_millis(250);
/// Granularity of cancellable waits in the watch thread.
const SLEEP_SLICE: Duration = Duration::from_millis(25);
/// User equivalent range error used to turn HDOP into meters.
const UERE_M: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixParseError {
    #[error("expected `lat,lng[,accuracy]`, got {0:?}")]
    Malformed(String),
    #[error("NMEA checksum mismatch in {0:?}")]
    Checksum(String),
    #[error("coordinate out of range in {0:?}")]
    OutOfRange(String),
}

type FixCache = Arc<Mutex<Option<(Instant, UserLocation)>>>;

/// What the reader thread hands to its consumer.
enum FeedRead {
    Line(String),
    /// Everything written so far has been read.
    CaughtUp,
    Failed(LocationError),
}

/// Open and read `path` on a detached thread.
///
/// Opening a pipe without a writer, or reading a silent device, blocks
/// indefinitely, so nobody ever joins this thread. It exits on its own at
/// the first send after the receiver is gone.
fn spawn_reader(path: PathBuf) -> Receiver<FeedRead> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot open position feed");
                let _ = tx.send(FeedRead::Failed(LocationError::from_io(&e)));
                return;
            }
        };
        let mut reader = BufReader::new(file);
        let mut line = String::new();
        loop {
            match reader.read_line(&mut line) {
                // End of feed, or a line still being written: follow.
                Ok(_) if !line.ends_with('\n') => {
                    if tx.send(FeedRead::CaughtUp).is_err() {
                        return;
                    }
                    thread::sleep(FOLLOW_POLL);
                }
                Ok(_) => {
                    if tx.send(FeedRead::Line(std::mem::take(&mut line))).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "position feed read failed");
                    let _ = tx.send(FeedRead::Failed(LocationError::from_io(&e)));
                    return;
                }
            }
        }
    });
    rx
}

pub struct FeedProvider {
    path: PathBuf,
    interval: Duration,
    last_fix: FixCache,
}

impl FeedProvider {
    /// `interval` paces delivery while replaying lines already in the feed.
    pub fn new(path: PathBuf, interval: Duration) -> Self {
        Self {
            path,
            interval,
            last_fix: Arc::new(Mutex::new(None)),
        }
    }

    /// True for pipes and device nodes, false for a regular (recorded) file.
    /// Looking at the metadata never blocks, unlike opening the feed.
    fn check_feed(&self) -> Result<bool, LocationError> {
        feed_is_stream(&self.path).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "cannot open position feed");
            LocationError::from_io(&e)
        })
    }
}

fn feed_is_stream(path: &Path) -> std::io::Result<bool> {
    Ok(!fs::metadata(path)?.is_file())
}

fn cached_fix(cache: &FixCache, maximum_age: Duration) -> Option<UserLocation> {
    let guard = cache.lock().ok()?;
    let (at, fix) = (*guard)?;
    (at.elapsed() <= maximum_age).then_some(fix)
}

fn store_fix(cache: &FixCache, fix: UserLocation) {
    if let Ok(mut guard) = cache.lock() {
        *guard = Some((Instant::now(), fix));
    }
}

/// Sleep for `total`, waking early when `cancelled` is set.
/// Returns false when cancelled.
fn sleep_unless_cancelled(total: Duration, cancelled: &AtomicBool) -> bool {
    let deadline = Instant::now() + total;
    loop {
        if cancelled.load(Ordering::SeqCst) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

impl LocationProvider for FeedProvider {
    fn watch(
        &self,
        options: PositionOptions,
        subscription: SubscriptionId,
        tx: Sender<LocationMessage>,
    ) -> Result<WatchHandle, LocationError> {
        self.check_feed()?;
        let lines = spawn_reader(self.path.clone());
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_for_thread = cancelled.clone();
        let cache = self.last_fix.clone();
        let interval = self.interval;

        let send = move |event: LocationEvent| {
            tx.send(LocationMessage {
                subscription,
                event,
            })
            .is_ok()
        };

        // The worker only ever waits on `lines` with a short timeout, so
        // joining it on cancel is quick even while the reader is blocked.
        let join = thread::spawn(move || {
            let cancelled = cancelled_for_thread;

            if let Some(fix) = cached_fix(&cache, options.maximum_age) {
                if !send(LocationEvent::Fix(fix)) {
                    return;
                }
            }

            let mut last_fix_at = Instant::now();
            let mut timed_out = false;

            while !cancelled.load(Ordering::SeqCst) {
                match lines.recv_timeout(SLEEP_SLICE) {
                    Ok(FeedRead::Line(line)) => match parse_fix_line(&line) {
                        Ok(Some(fix)) => {
                            store_fix(&cache, fix);
                            if !send(LocationEvent::Fix(fix)) {
                                return;
                            }
                            last_fix_at = Instant::now();
                            timed_out = false;
                            if !sleep_unless_cancelled(interval, &cancelled) {
                                return;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::debug!(error = %e, "skipping feed line"),
                    },
                    Ok(FeedRead::CaughtUp) | Err(RecvTimeoutError::Timeout) => {
                        if !timed_out && last_fix_at.elapsed() >= options.timeout {
                            timed_out = true;
                            if !send(LocationEvent::Error(LocationError::Timeout)) {
                                return;
                            }
                        }
                    }
                    Ok(FeedRead::Failed(e)) => {
                        let _ = send(LocationEvent::Error(e));
                        return;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        });

        tracing::debug!(
            subscription = subscription.0,
            path = %self.path.display(),
            high_accuracy = options.high_accuracy,
            "feed watch started"
        );
        Ok(WatchHandle::new(cancelled, Some(join)))
    }

    fn current_position(&self, options: PositionOptions) -> Result<UserLocation, LocationError> {
        if let Some(fix) = cached_fix(&self.last_fix, options.maximum_age) {
            return Ok(fix);
        }

        // A stream answers with its next fix. A recorded file answers with its
        // last one, which is known once the reader has caught up.
        let streaming = self.check_feed()?;
        let lines = spawn_reader(self.path.clone());
        let deadline = Instant::now() + options.timeout;
        let mut latest: Option<UserLocation> = None;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let (true, Some(fix)) = (remaining.is_zero(), latest) {
                store_fix(&self.last_fix, fix);
                return Ok(fix);
            }
            match lines.recv_timeout(remaining) {
                Ok(FeedRead::Line(line)) => {
                    if let Ok(Some(fix)) = parse_fix_line(&line) {
                        if streaming {
                            store_fix(&self.last_fix, fix);
                            return Ok(fix);
                        }
                        latest = Some(fix);
                    }
                }
                Ok(FeedRead::CaughtUp) => {
                    if let Some(fix) = latest {
                        store_fix(&self.last_fix, fix);
                        return Ok(fix);
                    }
                }
                Ok(FeedRead::Failed(e)) => return Err(e),
                Err(RecvTimeoutError::Timeout) => {
                    let fix = latest.ok_or(LocationError::Timeout)?;
                    store_fix(&self.last_fix, fix);
                    return Ok(fix);
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(LocationError::Unavailable);
                }
            }
        }
    }
}

/// Parse one feed line. `Ok(None)` means "nothing to report" (comment, blank
/// line, non-GGA sentence, or a GGA without a fix).
pub fn parse_fix_line(line: &str) -> Result<Option<UserLocation>, FixParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if line.starts_with('$') {
        return parse_gga(line);
    }

    let malformed = || FixParseError::Malformed(line.to_string());
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if !(2..=3).contains(&fields.len()) {
        return Err(malformed());
    }
    let lat: f64 = fields[0].parse().map_err(|_| malformed())?;
    let lng: f64 = fields[1].parse().map_err(|_| malformed())?;
    let accuracy = match fields.get(2) {
        Some(a) => Some(a.parse::<f64>().map_err(|_| malformed())?),
        None => None,
    };

    let coordinate =
        Coordinate::new(lat, lng).map_err(|_| FixParseError::OutOfRange(line.to_string()))?;
    Ok(Some(UserLocation::new(coordinate, accuracy)))
}

fn parse_gga(sentence: &str) -> Result<Option<UserLocation>, FixParseError> {
    let malformed = || FixParseError::Malformed(sentence.to_string());

    let body = &sentence[1..];
    let body = match body.split_once('*') {
        Some((body, checksum)) => {
            let expected = u8::from_str_radix(checksum.trim(), 16).map_err(|_| malformed())?;
            let actual = body.bytes().fold(0u8, |acc, b| acc ^ b);
            if actual != expected {
                return Err(FixParseError::Checksum(sentence.to_string()));
            }
            body
        }
        None => body,
    };

    let fields: Vec<&str> = body.split(',').collect();
    if !fields[0].ends_with("GGA") {
        return Ok(None);
    }
    if fields.len() < 9 {
        return Err(malformed());
    }

    // Fix quality 0 (or empty) means "no fix".
    match fields[6].parse::<u8>() {
        Ok(q) if q > 0 => {}
        _ => return Ok(None),
    }

    let lat = nmea_degrees(fields[2], fields[3], 2).ok_or_else(malformed)?;
    let lng = nmea_degrees(fields[4], fields[5], 3).ok_or_else(malformed)?;
    let accuracy = fields[8].parse::<f64>().ok().map(|hdop| hdop * UERE_M);

    let coordinate =
        Coordinate::new(lat, lng).map_err(|_| FixParseError::OutOfRange(sentence.to_string()))?;
    Ok(Some(UserLocation::new(coordinate, accuracy)))
}

/// Convert NMEA `(d)ddmm.mmmm` plus hemisphere into signed decimal degrees.
fn nmea_degrees(value: &str, hemisphere: &str, degree_digits: usize) -> Option<f64> {
    if value.len() <= degree_digits {
        return None;
    }
    let degrees: f64 = value.get(..degree_digits)?.parse().ok()?;
    let minutes: f64 = value.get(degree_digits..)?.parse().ok()?;
    let decimal = degrees + minutes / 60.0;
    match hemisphere {
        "N" | "E" => Some(decimal),
        "S" | "W" => Some(-decimal),
        _ => None,
    }
}
