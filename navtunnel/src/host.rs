//! Callbacks into the host navigation loop.
//!
//! The tunnel manager never consumes locations itself. It tells the host
//! which sample is authoritative and when to stop or resume consuming the
//! platform feed.

use crate::location::LocationSample;

/// Host-side hooks driven by animation transitions.
pub trait NavigationHost: Send + Sync {
    /// Publish `sample` as the current authoritative location.
    fn set_current_location(&self, sample: LocationSample);

    /// Stop consuming platform location updates.
    fn suspend_location_updates(&self);

    /// Resume consuming platform location updates.
    fn resume_location_updates(&self);
}
