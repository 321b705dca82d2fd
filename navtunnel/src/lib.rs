//! navtunnel - Tunnel-aware location hand-off for turn-by-turn navigation
//!
//! GPS degrades or disappears inside tunnels. This library detects when a
//! user is entering or driving through a tunnel section of a route and
//! swaps the platform location feed for a simulated one that keeps
//! navigation moving along the route, then hands back once real fixes are
//! usable again.
//!
//! # Modules
//!
//! - [`route`]: route geometry, intersections and progress snapshots
//! - [`location`]: location samples, sources and quality qualification
//! - [`simulation`]: the simulated location source
//! - [`tunnel`]: detection and the [`TunnelIntersectionManager`]
//! - [`host`]: callbacks into the navigation loop
//! - [`config`]: INI configuration file
//! - [`logging`]: tracing subscriber setup
//!
//! [`TunnelIntersectionManager`]: tunnel::TunnelIntersectionManager

pub mod config;
pub mod host;
pub mod location;
pub mod logging;
pub mod route;
pub mod simulation;
pub mod tunnel;

#[cfg(test)]
mod test_support;

pub use host::NavigationHost;
pub use location::{LocationQualifier, LocationSample, LocationSource, SourceKind};
pub use route::{Route, RouteProgress};
pub use tunnel::{Handoff, SuspendOutcome, TunnelConfig, TunnelIntersectionManager};
