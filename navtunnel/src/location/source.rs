//! Location source abstraction.
//!
//! Both the platform GPS binding and the simulated feed implement
//! [`LocationSource`]. Stopping a source is asynchronous: the returned future
//! resolves only once the source has fully stopped emitting, which is what
//! lets the tunnel manager guarantee that two sources never drive location
//! consumption at the same time.
//!
//! # Dyn Compatibility
//!
//! Async methods return [`BoxFuture`] so sources can be held as
//! `Arc<dyn LocationSource>`.

use std::future::Future;
use std::pin::Pin;

use super::{LocationSample, SourceKind};

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An already-completed [`BoxFuture`].
///
/// Handy for sources whose stop is synchronous.
pub fn ready<'a, T: Send + 'a>(value: T) -> BoxFuture<'a, T> {
    Box::pin(std::future::ready(value))
}

/// A producer of location samples.
pub trait LocationSource: Send + Sync {
    /// Which kind of source this is.
    fn kind(&self) -> SourceKind;

    /// Start (or resume) delivering samples.
    fn start(&self);

    /// Stop delivering position updates.
    ///
    /// Resolves once no further samples will be produced.
    fn stop(&self) -> BoxFuture<'_, ()>;

    /// Stop delivering heading updates.
    fn stop_heading_updates(&self) -> BoxFuture<'_, ()>;

    /// The most recent sample, if any.
    fn current_location(&self) -> Option<LocationSample>;
}
