//! Position provider boundary and subscription lifecycle.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::state::{LocationError, PositionFix};

/// Event pushed by a position provider.
#[derive(Debug, Clone)]
pub enum PositionEvent {
    /// A new raw fix.
    Fix(PositionFix),
    /// The provider failed; no further fixes will arrive on this
    /// subscription.
    Error(LocationError),
}

/// Handle to an active position subscription.
///
/// Receives provider events and releases the underlying subscription
/// exactly once, either on an explicit [`stop`](Self::stop) or on drop.
pub struct PositionSubscription {
    events: mpsc::Receiver<PositionEvent>,
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl PositionSubscription {
    /// Wraps an event receiver together with its release action.
    pub fn new(events: mpsc::Receiver<PositionEvent>, stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            events,
            stop: Some(Box::new(stop)),
        }
    }

    /// Receives the next provider event.
    ///
    /// Returns `None` when the provider has dropped its sender.
    pub async fn recv(&mut self) -> Option<PositionEvent> {
        self.events.recv().await
    }

    /// Stops the subscription, releasing the provider side.
    pub fn stop(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl Drop for PositionSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// External push-based position provider.
pub trait PositionProvider: Send + Sync {
    /// Starts a new subscription.
    ///
    /// Returns [`LocationError::Unavailable`] when the platform has no
    /// location capability.
    fn subscribe(&self) -> Result<PositionSubscription, LocationError>;
}

/// Position provider fed manually over a channel.
///
/// Used by the CLI for scripted scenarios and by tests. Pushes are
/// dropped (returning `false`) once the subscription has been stopped,
/// mirroring a real provider that stops delivering after unsubscribe.
pub struct ChannelPositionProvider {
    capacity: usize,
    sender: Arc<Mutex<Option<mpsc::Sender<PositionEvent>>>>,
}

impl ChannelPositionProvider {
    /// Creates a provider with the given event buffer capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            sender: Arc::new(Mutex::new(None)),
        }
    }

    /// Pushes a fix to the active subscription.
    ///
    /// Returns `false` if there is no active subscription or the buffer
    /// is full.
    pub fn push_fix(&self, fix: PositionFix) -> bool {
        self.push(PositionEvent::Fix(fix))
    }

    /// Pushes a provider error to the active subscription.
    pub fn push_error(&self, error: LocationError) -> bool {
        self.push(PositionEvent::Error(error))
    }

    /// True while a subscription is active.
    pub fn is_subscribed(&self) -> bool {
        self.sender.lock().is_some()
    }

    fn push(&self, event: PositionEvent) -> bool {
        match self.sender.lock().as_ref() {
            Some(sender) => sender.try_send(event).is_ok(),
            None => false,
        }
    }
}

impl PositionProvider for ChannelPositionProvider {
    fn subscribe(&self) -> Result<PositionSubscription, LocationError> {
        let (tx, rx) = mpsc::channel(self.capacity);
        *self.sender.lock() = Some(tx);

        let slot = Arc::clone(&self.sender);
        Ok(PositionSubscription::new(rx, move || {
            *slot.lock() = None;
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;

    fn fix(lat: f64, lon: f64) -> PositionFix {
        PositionFix::new(Coordinate::new(lat, lon).unwrap())
    }

    #[tokio::test]
    async fn test_pushed_fix_is_received() {
        let provider = ChannelPositionProvider::new(8);
        let mut subscription = provider.subscribe().unwrap();

        assert!(provider.push_fix(fix(43.6, 1.4)));

        match subscription.recv().await {
            Some(PositionEvent::Fix(received)) => {
                assert_eq!(received.coordinate.latitude(), 43.6);
            }
            other => panic!("expected a fix, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_push_without_subscription_is_dropped() {
        let provider = ChannelPositionProvider::new(8);
        assert!(!provider.push_fix(fix(0.0, 0.0)));
    }

    #[tokio::test]
    async fn test_stop_releases_subscription() {
        let provider = ChannelPositionProvider::new(8);
        let subscription = provider.subscribe().unwrap();
        assert!(provider.is_subscribed());

        subscription.stop();

        assert!(!provider.is_subscribed());
        assert!(!provider.push_fix(fix(0.0, 0.0)));
    }

    #[tokio::test]
    async fn test_drop_releases_subscription_exactly_once() {
        let provider = ChannelPositionProvider::new(8);
        {
            let _subscription = provider.subscribe().unwrap();
            assert!(provider.is_subscribed());
        }
        assert!(!provider.is_subscribed());
    }

    #[tokio::test]
    async fn test_error_event_is_received() {
        let provider = ChannelPositionProvider::new(8);
        let mut subscription = provider.subscribe().unwrap();

        provider.push_error(LocationError::PermissionDenied);

        match subscription.recv().await {
            Some(PositionEvent::Error(err)) => {
                assert_eq!(err, LocationError::PermissionDenied);
            }
            other => panic!("expected an error event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resubscribe_after_stop() {
        let provider = ChannelPositionProvider::new(8);
        provider.subscribe().unwrap().stop();

        let mut subscription = provider.subscribe().unwrap();
        assert!(provider.push_fix(fix(1.0, 1.0)));
        assert!(matches!(
            subscription.recv().await,
            Some(PositionEvent::Fix(_))
        ));
    }
}
