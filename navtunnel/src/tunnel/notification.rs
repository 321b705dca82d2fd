//! Advisory notifications around animation transitions.
//!
//! A [`NotificationSink`] hears about each transition before it happens and
//! may ask for it to wait by returning [`NotificationResponse::Defer`]. A
//! deferral only delays: the transition proceeds once the deferral is
//! released, dropped, or the manager's notification timeout elapses. Sinks
//! cannot veto a transition.

use tokio::sync::oneshot;

use crate::location::LocationSample;

/// What the manager should do after notifying a sink.
#[derive(Debug)]
pub enum NotificationResponse {
    /// Continue immediately.
    Proceed,
    /// Wait until the deferral is released.
    Defer(Deferral),
}

/// Pending signal that lets a transition continue.
#[derive(Debug)]
pub struct Deferral {
    receiver: oneshot::Receiver<()>,
}

/// Releases a [`Deferral`].
///
/// Dropping the handle releases it as well.
#[derive(Debug)]
pub struct DeferralHandle {
    sender: oneshot::Sender<()>,
}

impl Deferral {
    /// Create a deferral and the handle that releases it.
    pub fn new() -> (Deferral, DeferralHandle) {
        let (sender, receiver) = oneshot::channel();
        (Deferral { receiver }, DeferralHandle { sender })
    }

    /// Wait for release. Returns `true` if released explicitly, `false` if
    /// the handle was dropped.
    pub async fn released(self) -> bool {
        self.receiver.await.is_ok()
    }
}

impl DeferralHandle {
    /// Let the deferred transition continue.
    pub fn release(self) {
        // Receiver gone means the manager stopped waiting
        let _ = self.sender.send(());
    }
}

/// Observer of animation transitions.
///
/// Both hooks default to [`NotificationResponse::Proceed`].
pub trait NotificationSink: Send + Sync {
    /// Simulated animation is about to start at `location`.
    fn will_enable_animation(&self, location: &LocationSample) -> NotificationResponse {
        let _ = location;
        NotificationResponse::Proceed
    }

    /// Simulated animation is about to stop at `location`.
    fn will_disable_animation(&self, location: &LocationSample) -> NotificationResponse {
        let _ = location;
        NotificationResponse::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_deferral_released() {
        let (deferral, handle) = Deferral::new();
        handle.release();
        assert!(deferral.released().await);
    }

    #[tokio::test]
    async fn test_deferral_handle_dropped() {
        let (deferral, handle) = Deferral::new();
        drop(handle);
        assert!(!deferral.released().await);
    }

    #[test]
    fn test_default_hooks_proceed() {
        struct Silent;
        impl NotificationSink for Silent {}

        let sample = LocationSample::new(
            crate::route::Coordinate::new(0.0, 0.0),
            0.0,
            0.0,
            5.0,
            crate::location::SourceKind::Platform,
        );
        assert!(matches!(
            Silent.will_enable_animation(&sample),
            NotificationResponse::Proceed
        ));
        assert!(matches!(
            Silent.will_disable_animation(&sample),
            NotificationResponse::Proceed
        ));
    }
}
