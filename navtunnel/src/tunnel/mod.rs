//! Tunnel detection and the simulated-location hand-off.
//!
//! Inside tunnels GPS degrades or disappears. This module detects when the
//! user is entering or inside a tunnel section of the route and swaps the
//! platform location source for a [`SimulatedLocationSource`] that keeps
//! navigation moving, then swaps back once the platform delivers usable
//! fixes again.
//!
//! # Architecture
//!
//! ```text
//! LocationSample + RouteProgress
//!            │
//!            ▼
//!     ┌──────────────┐   verdict   ┌───────────────────────────┐
//!     │TunnelDetector│ ──────────► │ TunnelIntersectionManager │
//!     └──────────────┘             │  ├─ ExitLocationBuffer    │
//!                                  │  ├─ NotificationSink      │
//!                                  │  └─ TunnelMetrics         │
//!                                  └────────────┬──────────────┘
//!                                               │ enable / suspend
//!                        ┌──────────────────────┴─────────────┐
//!                        ▼                                    ▼
//!               platform LocationSource             SimulatedLocationSource
//! ```
//!
//! [`SimulatedLocationSource`]: crate::simulation::SimulatedLocationSource

mod config;
mod detector;
mod exit_buffer;
mod manager;
mod metrics;
mod notification;
mod status;

pub use config::{
    TunnelConfig, DEFAULT_EXIT_UNQUALIFIED_THRESHOLD,
    DEFAULT_MINIMUM_DISTANCE_TO_TUNNEL_ENTRANCE_M, DEFAULT_MINIMUM_SPEED_AT_TUNNEL_ENTRANCE_MPS,
    DEFAULT_NOTIFICATION_TIMEOUT, MAX_EXIT_UNQUALIFIED_THRESHOLD,
};
pub use detector::TunnelDetector;
pub use exit_buffer::ExitLocationBuffer;
pub use manager::{Handoff, SuspendOutcome, TunnelIntersectionManager};
pub use metrics::{MetricsSnapshot, TunnelMetrics};
pub use notification::{Deferral, DeferralHandle, NotificationResponse, NotificationSink};
pub use status::{AnimationState, ManagerStatus};
