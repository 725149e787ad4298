use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use crate::config::LocationSettings;
use crate::geo::UserLocation;

use super::feed::FeedProvider;
use super::types::{LocationError, LocationMessage, PositionOptions, SubscriptionId};

/// The host's location API: a continuous watch and a one-shot query.
pub trait LocationProvider {
    /// Start delivering fixes for `subscription` into `tx` until the returned
    /// handle is cancelled or dropped.
    fn watch(
        &self,
        options: PositionOptions,
        subscription: SubscriptionId,
        tx: Sender<LocationMessage>,
    ) -> Result<WatchHandle, LocationError>;

    /// Block until one fix is available or `options.timeout` elapses.
    fn current_position(&self, options: PositionOptions) -> Result<UserLocation, LocationError>;
}

/// Owns a running watch. Cancelling (or dropping) it stops delivery and
/// joins the worker thread, if there is one.
pub struct WatchHandle {
    cancelled: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn new(cancelled: Arc<AtomicBool>, join: Option<JoinHandle<()>>) -> Self {
        Self { cancelled, join }
    }

    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(h) = self.join.take() {
            let _ = h.join();
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The provider chosen from settings.
pub enum DeviceProvider {
    Feed(FeedProvider),
    /// No location capability configured.
    Unsupported,
}

impl DeviceProvider {
    pub fn from_settings(settings: &LocationSettings) -> Self {
        match &settings.feed {
            Some(path) => Self::Feed(FeedProvider::new(
                path.clone(),
                std::time::Duration::from_millis(settings.feed_interval_ms),
            )),
            None => Self::Unsupported,
        }
    }
}

impl LocationProvider for DeviceProvider {
    fn watch(
        &self,
        options: PositionOptions,
        subscription: SubscriptionId,
        tx: Sender<LocationMessage>,
    ) -> Result<WatchHandle, LocationError> {
        match self {
            DeviceProvider::Feed(feed) => feed.watch(options, subscription, tx),
            DeviceProvider::Unsupported => Err(LocationError::Unsupported),
        }
    }

    fn current_position(&self, options: PositionOptions) -> Result<UserLocation, LocationError> {
        match self {
            DeviceProvider::Feed(feed) => feed.current_position(options),
            DeviceProvider::Unsupported => Err(LocationError::Unsupported),
        }
    }
}
