//! Tunnel intersection manager.
//!
//! Owns the hand-off between the platform location source and a simulated
//! source that drives along the route while GPS is unusable.
//!
//! # State Machine
//!
//! ```text
//!                 enable (entrance or in-tunnel)
//!   ┌──────────┐ ─────────────────────────────────► ┌─────────┐
//!   │ Disabled │                                    │ Enabled │ ◄─┐
//!   └──────────┘ ◄───────────────────────────────── └─────────┘   │
//!        ▲          suspend: qualified fix, or          │         │ suspend:
//!        │          > threshold unqualified samples     └─────────┘ debounced
//!        │
//!        └──── teardown (from any state)
//! ```
//!
//! # Ordering
//!
//! Enabling runs in two phases. Phase 1 suspends host consumption and stops
//! the platform source, awaiting both stop calls. Phase 2 builds and starts
//! the simulated source. No simulated sample reaches the host before phase 1
//! has completed.
//!
//! Transitions are serialized by an async gate. [`teardown`] does not wait
//! for the gate: it bumps a generation counter so that an enable still in
//! phase 1 abandons phase 2, and a disable still waiting leaves the platform
//! source stopped.
//!
//! [`teardown`]: TunnelIntersectionManager::teardown

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::host::NavigationHost;
use crate::location::{AccuracyQualifier, LocationQualifier, LocationSample, LocationSource, SourceKind};
use crate::route::RouteProgress;
use crate::simulation::SimulatedLocationSource;

use super::config::TunnelConfig;
use super::detector::TunnelDetector;
use super::exit_buffer::ExitLocationBuffer;
use super::metrics::TunnelMetrics;
use super::notification::{NotificationResponse, NotificationSink};
use super::status::{AnimationState, ManagerStatus};

/// Result of a completed transition.
#[derive(Clone)]
pub struct Handoff {
    /// Whether simulated animation is now driving navigation.
    pub animation_enabled: bool,
    /// The source the host should treat as active.
    pub active_source: Arc<dyn LocationSource>,
}

impl std::fmt::Debug for Handoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handoff")
            .field("animation_enabled", &self.animation_enabled)
            .field("active_source", &self.active_source.kind())
            .finish()
    }
}

/// What a call to [`TunnelIntersectionManager::suspend`] did.
#[derive(Debug)]
pub enum SuspendOutcome {
    /// Animation was not enabled; nothing happened.
    NotAnimating,
    /// The sample was absorbed by the exit buffer; animation continues.
    Debounced {
        /// Unqualified samples now buffered.
        buffered: usize,
    },
    /// Animation was disabled and the platform source restored.
    Disabled(Handoff),
}

impl SuspendOutcome {
    /// The hand-off, if the call disabled animation.
    pub fn into_handoff(self) -> Option<Handoff> {
        match self {
            SuspendOutcome::Disabled(handoff) => Some(handoff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitReason {
    QualifiedFix,
    UnqualifiedThreshold,
}

impl ExitReason {
    fn as_str(self) -> &'static str {
        match self {
            ExitReason::QualifiedFix => "qualified_fix",
            ExitReason::UnqualifiedThreshold => "unqualified_threshold",
        }
    }
}

#[derive(Debug)]
struct ManagerInner {
    state: AnimationState,
    exit_buffer: ExitLocationBuffer,
    simulated: Option<Arc<SimulatedLocationSource>>,
    /// Bumped by teardown; a transition that sees a different value abandons.
    generation: u64,
}

/// Coordinates tunnel detection with the simulated-location hand-off.
///
/// Cheap queries (`detects_*`, [`status`](Self::status)) may be called from
/// anywhere. Transitions are async and serialized internally.
pub struct TunnelIntersectionManager {
    config: TunnelConfig,
    detector: TunnelDetector,
    host: Arc<dyn NavigationHost>,
    notifications: Option<Arc<dyn NotificationSink>>,
    metrics: Arc<TunnelMetrics>,
    transition_gate: tokio::sync::Mutex<()>,
    inner: Mutex<ManagerInner>,
}

impl std::fmt::Debug for TunnelIntersectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TunnelIntersectionManager")
            .field("config", &self.config)
            .field("detector", &self.detector)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl TunnelIntersectionManager {
    /// Create a manager using an [`AccuracyQualifier`] built from
    /// `config.qualification`.
    pub fn new(config: TunnelConfig, host: Arc<dyn NavigationHost>) -> Self {
        let qualifier: Arc<dyn LocationQualifier> =
            Arc::new(AccuracyQualifier::new(config.qualification.clone()));
        let detector = TunnelDetector::new(&config, qualifier);
        let exit_buffer = ExitLocationBuffer::with_capacity(config.exit_buffer_capacity());

        Self {
            config,
            detector,
            host,
            notifications: None,
            metrics: Arc::new(TunnelMetrics::new()),
            transition_gate: tokio::sync::Mutex::new(()),
            inner: Mutex::new(ManagerInner {
                state: AnimationState::Disabled,
                exit_buffer,
                simulated: None,
                generation: 0,
            }),
        }
    }

    /// Replace the signal-quality qualifier.
    pub fn with_qualifier(mut self, qualifier: Arc<dyn LocationQualifier>) -> Self {
        self.detector = TunnelDetector::new(&self.config, qualifier);
        self
    }

    /// Attach a transition observer.
    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notifications = Some(sink);
        self
    }

    /// Record into shared counters instead of private ones.
    pub fn with_metrics(mut self, metrics: Arc<TunnelMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &TunnelConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<TunnelMetrics> {
        &self.metrics
    }

    /// Current animation state.
    pub fn state(&self) -> AnimationState {
        self.inner.lock().state
    }

    /// Whether the simulated source is driving navigation.
    pub fn is_animation_enabled(&self) -> bool {
        self.state().is_enabled()
    }

    /// The simulated source, while one is owned.
    pub fn simulated_source(&self) -> Option<Arc<SimulatedLocationSource>> {
        self.inner.lock().simulated.clone()
    }

    /// Snapshot for logging and display.
    pub fn status(&self) -> ManagerStatus {
        let inner = self.inner.lock();
        ManagerStatus {
            state: inner.state,
            buffered_exit_samples: inner.exit_buffer.len(),
            has_simulated_source: inner.simulated.is_some(),
            simulated_distance_m: inner.simulated.as_ref().map(|s| s.distance_along()),
            metrics: self.metrics.snapshot(),
        }
    }

    /// Whether the current intersection is tagged as a tunnel.
    pub fn detects_tunnel_at_current_intersection(&self, progress: &RouteProgress) -> bool {
        self.detector.detects_tunnel_at_current_intersection(progress)
    }

    /// Whether the user is about to enter a tunnel.
    pub fn is_within_tunnel_entrance_radius(
        &self,
        location: &LocationSample,
        progress: &RouteProgress,
    ) -> bool {
        self.detector.is_within_tunnel_entrance_radius(location, progress)
    }

    /// Composite verdict using the manager's current animation state.
    pub fn detects_tunnel(
        &self,
        location: &LocationSample,
        active_source: SourceKind,
        progress: &RouteProgress,
    ) -> bool {
        self.detector
            .detects_tunnel(location, active_source, self.is_animation_enabled(), progress)
    }

    /// Forward route progress to the simulated source, if any.
    pub fn route_progress_did_change(&self, progress: &RouteProgress) {
        if let Some(simulated) = self.simulated_source() {
            simulated.update_progress(progress);
        }
    }

    /// Switch navigation to a simulated source.
    ///
    /// Returns `None` if animation is already enabled or a teardown overtook
    /// the transition. Otherwise returns the simulated source as the new
    /// active source.
    pub async fn enable(
        &self,
        real_source: Arc<dyn LocationSource>,
        location: &LocationSample,
        progress: &RouteProgress,
        distance_traveled: f64,
    ) -> Option<Handoff> {
        let _gate = self.transition_gate.lock().await;

        let generation = {
            let inner = self.inner.lock();
            if inner.state.is_enabled() {
                debug!("Tunnel animation already enabled");
                return None;
            }
            inner.generation
        };

        if let Some(sink) = &self.notifications {
            let response = sink.will_enable_animation(location);
            self.await_notification(response, "enable").await;
        }

        // Phase 1: silence the platform source
        self.host.suspend_location_updates();
        real_source.stop_heading_updates().await;
        real_source.stop().await;

        // Phase 2: install the simulated source
        let observed_speed = location.has_valid_speed().then_some(location.speed_mps);
        let simulated = Arc::new(SimulatedLocationSource::new(
            Arc::clone(&progress.route),
            distance_traveled,
            observed_speed,
            self.config.simulation.clone(),
        ));

        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                drop(inner);
                self.metrics.enable_abandoned();
                warn!("Tunnel animation enable abandoned after teardown");
                return None;
            }
            inner.state = AnimationState::Enabled;
            inner.exit_buffer.clear();
            inner.simulated = Some(Arc::clone(&simulated));
        }

        simulated.start();
        simulated.update_progress(progress);

        if let Some(sample) = simulated.current_location() {
            if self.detector.qualifier().is_qualified(&sample) {
                self.host.set_current_location(sample);
            }
        }

        self.metrics.animation_enabled();
        info!(
            distance_m = distance_traveled,
            speed_mps = simulated.speed_mps(),
            location = %location.coordinate,
            "Tunnel animation enabled"
        );

        Some(Handoff {
            animation_enabled: true,
            active_source: simulated,
        })
    }

    /// Offer an exit sample while animating.
    ///
    /// A qualified sample disables animation immediately. Unqualified
    /// samples accumulate in the exit buffer and only disable animation once
    /// more than `exit_unqualified_threshold` of them are buffered.
    ///
    /// A teardown that lands while the disable is waiting on the notification
    /// sink or on the simulated source wins: the call returns
    /// [`SuspendOutcome::NotAnimating`] and leaves the platform source and
    /// host consumption untouched.
    pub async fn suspend(
        &self,
        real_source: Arc<dyn LocationSource>,
        location: &LocationSample,
    ) -> SuspendOutcome {
        let _gate = self.transition_gate.lock().await;
        let qualifier = Arc::clone(self.detector.qualifier());
        let qualified = qualifier.is_qualified(location);

        let (reason, generation) = {
            let mut inner = self.inner.lock();
            if !inner.state.is_enabled() {
                return SuspendOutcome::NotAnimating;
            }

            let reason = if qualified {
                ExitReason::QualifiedFix
            } else {
                inner.exit_buffer.push(location.clone());
                inner.exit_buffer.retain_unqualified(qualifier.as_ref());
                let buffered = inner.exit_buffer.len();
                if buffered <= self.config.exit_unqualified_threshold {
                    drop(inner);
                    self.metrics.sample_debounced();
                    debug!(
                        buffered,
                        threshold = self.config.exit_unqualified_threshold,
                        "Tunnel exit debounced"
                    );
                    return SuspendOutcome::Debounced { buffered };
                }
                ExitReason::UnqualifiedThreshold
            };
            (reason, inner.generation)
        };

        if let Some(sink) = &self.notifications {
            let response = sink.will_disable_animation(location);
            self.await_notification(response, "disable").await;
        }

        let simulated = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                debug!("Tunnel animation disable abandoned after teardown");
                return SuspendOutcome::NotAnimating;
            }
            inner.simulated.take()
        };

        self.host.set_current_location(location.clone());

        if let Some(simulated) = &simulated {
            simulated.stop().await;
        }

        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                debug!("Tunnel animation disable abandoned after teardown");
                return SuspendOutcome::NotAnimating;
            }
            inner.state = AnimationState::Disabled;
            inner.exit_buffer.clear();
        }

        real_source.start();
        self.host.resume_location_updates();

        self.metrics
            .animation_disabled(reason == ExitReason::QualifiedFix);
        info!(
            reason = reason.as_str(),
            accuracy_m = location.horizontal_accuracy_m,
            location = %location.coordinate,
            "Tunnel animation disabled"
        );

        SuspendOutcome::Disabled(Handoff {
            animation_enabled: false,
            active_source: real_source,
        })
    }

    /// Stop any simulated source and return to `Disabled`.
    ///
    /// Safe from any state and idempotent. Does not restart the platform
    /// source; the session owner decides what runs next.
    pub async fn teardown(&self) {
        let simulated = {
            let mut inner = self.inner.lock();
            inner.state = AnimationState::Disabled;
            inner.exit_buffer.clear();
            inner.generation = inner.generation.wrapping_add(1);
            inner.simulated.take()
        };

        self.metrics.teardown();
        if let Some(simulated) = simulated {
            simulated.stop().await;
        }
        info!("Tunnel manager torn down");
    }

    /// Run detection on one sample and perform whatever transition it calls
    /// for.
    ///
    /// While animating, simulated samples that the route still places inside
    /// a tunnel keep the animation running; anything else is offered to
    /// [`suspend`](Self::suspend).
    pub async fn handle_location_update(
        &self,
        real_source: Arc<dyn LocationSource>,
        location: &LocationSample,
        progress: &RouteProgress,
    ) -> Option<Handoff> {
        self.route_progress_did_change(progress);
        let enabled = self.is_animation_enabled();

        if self.detects_tunnel(location, location.source, progress) {
            if enabled {
                return None;
            }
            if self.is_within_tunnel_entrance_radius(location, progress) {
                self.metrics.entrance_detected();
            }
            return self
                .enable(real_source, location, progress, progress.distance_traveled)
                .await;
        }

        if !enabled {
            return None;
        }

        if location.source == SourceKind::Simulated
            && self.detects_tunnel_at_current_intersection(progress)
        {
            return None;
        }

        self.suspend(real_source, location).await.into_handoff()
    }

    async fn await_notification(&self, response: NotificationResponse, transition: &'static str) {
        let NotificationResponse::Defer(deferral) = response else {
            return;
        };

        debug!(transition, "Transition deferred by notification sink");
        match tokio::time::timeout(self.config.notification_timeout, deferral.released()).await {
            Ok(true) => debug!(transition, "Deferral released"),
            Ok(false) => debug!(transition, "Deferral handle dropped"),
            Err(_) => warn!(
                transition,
                timeout_ms = self.config.notification_timeout.as_millis() as u64,
                "Notification deferral timed out, proceeding"
            ),
        }
    }
}
