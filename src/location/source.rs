use std::sync::mpsc::{self, Receiver, Sender};

use crate::geo::UserLocation;

use super::provider::{LocationProvider, WatchHandle};
use super::types::{
    LocationError, LocationEvent, LocationMessage, LocationMode, LocationSnapshot,
    PositionOptions, SubscriptionId,
};

struct Subscription {
    id: SubscriptionId,
    handle: WatchHandle,
}

/// Current user location from either a live provider or a mock value.
///
/// At most one live subscription exists at a time; starting a new one or
/// switching to mock mode cancels the previous one first. Dropping the
/// source cancels any outstanding subscription.
pub struct LocationSource<P: LocationProvider> {
    provider: P,
    options: PositionOptions,
    mode: LocationMode,
    current: Option<UserLocation>,
    mock_value: UserLocation,
    error: Option<LocationError>,
    subscription: Option<Subscription>,
    next_subscription: u64,
    tx: Sender<LocationMessage>,
    rx: Receiver<LocationMessage>,
}

impl<P: LocationProvider> LocationSource<P> {
    /// Create an idle source. Nothing is acquired until `start` or `set_mode`.
    pub fn new(
        provider: P,
        options: PositionOptions,
        mode: LocationMode,
        mock_value: UserLocation,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<LocationMessage>();
        Self {
            provider,
            options,
            mode,
            current: None,
            mock_value,
            error: None,
            subscription: None,
            next_subscription: 0,
            tx,
            rx,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn mode(&self) -> LocationMode {
        self.mode
    }

    pub fn mock_value(&self) -> UserLocation {
        self.mock_value
    }

    pub fn snapshot(&self) -> LocationSnapshot {
        LocationSnapshot {
            mode: self.mode,
            current: self.current,
            error: self.error,
            watching: self.subscription.is_some(),
        }
    }

    /// Switch between live and mock input.
    ///
    /// `Mock` cancels the live subscription and takes effect immediately;
    /// any fix still in flight from the old subscription is discarded.
    pub fn set_mode(&mut self, mode: LocationMode) {
        tracing::info!(?mode, "location mode changed");
        self.mode = mode;
        match mode {
            LocationMode::Live => self.start(),
            LocationMode::Mock => {
                self.stop();
                self.error = None;
                self.current = Some(self.mock_value);
            }
        }
    }

    /// Replace the mock value. In mock mode `current` follows synchronously.
    pub fn set_mock_value(&mut self, location: UserLocation) {
        self.mock_value = location;
        if self.mode == LocationMode::Mock {
            self.current = Some(location);
        }
    }

    /// Begin acquiring locations for the current mode, replacing any
    /// existing subscription.
    pub fn start(&mut self) {
        self.stop();

        if self.mode == LocationMode::Mock {
            self.current = Some(self.mock_value);
            return;
        }

        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        match self.provider.watch(self.options, id, self.tx.clone()) {
            Ok(handle) => {
                tracing::debug!(subscription = id.0, "live location subscription started");
                self.subscription = Some(Subscription { id, handle });
            }
            Err(e) => self.fall_back(e),
        }
    }

    /// Cancel the live subscription, if any. Leaves `current` untouched.
    pub fn stop(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.handle.cancel();
            tracing::debug!(subscription = sub.id.0, "live location subscription stopped");
        }
    }

    /// Apply every message delivered since the last call, in arrival order,
    /// handing each snapshot whose location changed to `on_update`.
    /// Returns true when `current` changed overall.
    pub fn poll_with<F: FnMut(LocationSnapshot)>(&mut self, mut on_update: F) -> bool {
        let before = self.current;
        while let Ok(msg) = self.rx.try_recv() {
            let prev = self.current;
            self.apply(msg);
            if self.current != prev {
                on_update(self.snapshot());
            }
        }
        self.current != before
    }

    fn apply(&mut self, msg: LocationMessage) {
        let live_id = self.subscription.as_ref().map(|s| s.id);
        if self.mode != LocationMode::Live || live_id != Some(msg.subscription) {
            tracing::trace!(subscription = msg.subscription.0, "dropping stale location message");
            return;
        }

        match msg.event {
            LocationEvent::Fix(location) => {
                self.current = Some(location);
                self.error = None;
            }
            LocationEvent::Error(e) => self.fall_back(e),
        }
    }

    /// Record `error` and keep the experience usable with the mock location.
    fn fall_back(&mut self, error: LocationError) {
        tracing::warn!(%error, "location unavailable, falling back to mock location");
        self.error = Some(error);
        self.current = Some(self.mock_value);
    }
}

impl<P: LocationProvider> Drop for LocationSource<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
