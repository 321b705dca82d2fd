//! Simulated location feed used while GPS is unreliable.
//!
//! The simulated source walks the known route from the point where the user
//! entered the tunnel, emitting a sample per tick at a constant speed seeded
//! from the last platform fix. It runs as a single tokio task that lives from
//! `start()` until `stop()` (or drop).
//!
//! # Lifecycle
//!
//! ```text
//! new() ──► start() ──► tick, tick, ... ──► stop() ──► (dropped)
//!  │                                          ▲
//!  └── current_location() is valid here ──────┘
//! ```
//!
//! A stopped source cannot be restarted; the tunnel manager builds a fresh
//! one for every tunnel.

mod config;
mod source;

pub use config::{
    SimulationConfig, DEFAULT_MAX_SIMULATED_SPEED_MPS, DEFAULT_MIN_SIMULATED_SPEED_MPS,
    DEFAULT_SIMULATED_ACCURACY_M, DEFAULT_SIMULATED_SPEED_MPS, DEFAULT_TICK_INTERVAL,
    DEFAULT_TIME_SCALE,
};
pub use source::SimulatedLocationSource;
