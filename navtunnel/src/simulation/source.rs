//! The simulated location source.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::location::{ready, BoxFuture, LocationSample, LocationSource, SourceKind};
use crate::route::{Route, RouteProgress};

use super::config::SimulationConfig;

/// Mutable position of the simulation along the route.
#[derive(Debug)]
struct SimulationState {
    distance_along: f64,
    speed_mps: f64,
    latest: LocationSample,
    reached_end: bool,
}

/// Synthetic location feed that drives along a route.
///
/// Created already holding a sample at the seeded position, so
/// [`current_location`](LocationSource::current_location) is usable before
/// the first tick.
pub struct SimulatedLocationSource {
    config: SimulationConfig,
    route: Arc<Route>,
    state: Arc<Mutex<SimulationState>>,
    sender: Arc<watch::Sender<Option<LocationSample>>>,
    shutdown: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SimulatedLocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedLocationSource")
            .field("config", &self.config)
            .field("route_length", &self.route.length())
            .field("state", &self.state)
            .field("stopped", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl SimulatedLocationSource {
    /// Create a source positioned `distance_traveled` meters along `route`.
    ///
    /// `observed_speed_mps` is the speed of the last platform fix; it is
    /// clamped (or defaulted) by [`SimulationConfig::seed_speed`].
    pub fn new(
        route: Arc<Route>,
        distance_traveled: f64,
        observed_speed_mps: Option<f64>,
        config: SimulationConfig,
    ) -> Self {
        let distance_along = distance_traveled.clamp(0.0, route.length());
        let speed_mps = config.seed_speed(observed_speed_mps);
        let latest = sample_at(&route, distance_along, speed_mps, &config);
        let (sender, _) = watch::channel(Some(latest.clone()));

        Self {
            config,
            route,
            state: Arc::new(Mutex::new(SimulationState {
                distance_along,
                speed_mps,
                latest,
                reached_end: false,
            })),
            sender: Arc::new(sender),
            shutdown: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    /// Receive every emitted sample.
    pub fn subscribe(&self) -> watch::Receiver<Option<LocationSample>> {
        self.sender.subscribe()
    }

    /// Current distance along the route in meters.
    pub fn distance_along(&self) -> f64 {
        self.state.lock().distance_along
    }

    /// Speed the simulation drives at (m/s).
    pub fn speed_mps(&self) -> f64 {
        self.state.lock().speed_mps
    }

    /// Whether the tick task is running.
    pub fn is_running(&self) -> bool {
        self.task.lock().is_some() && !self.shutdown.is_cancelled()
    }

    /// Feed a route progress update into the simulation.
    ///
    /// If the route tracker places the user further along than the
    /// simulation, the simulation jumps forward and publishes a sample at the
    /// new position. It never moves backwards.
    pub fn update_progress(&self, progress: &RouteProgress) {
        let sample = {
            let mut state = self.state.lock();
            if progress.distance_traveled <= state.distance_along {
                return;
            }
            debug!(
                from_m = state.distance_along,
                to_m = progress.distance_traveled,
                "Simulated source resynced to route progress"
            );
            state.distance_along = progress.distance_traveled.min(self.route.length());
            state.latest = sample_at(
                &self.route,
                state.distance_along,
                state.speed_mps,
                &self.config,
            );
            state.latest.clone()
        };
        self.sender.send_replace(Some(sample));
    }
}

impl LocationSource for SimulatedLocationSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Simulated
    }

    fn start(&self) {
        let mut task = self.task.lock();
        if task.is_some() || self.shutdown.is_cancelled() {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No tokio runtime available - simulated source not started");
            return;
        };

        debug!(
            distance_m = self.distance_along(),
            speed_mps = self.speed_mps(),
            tick_ms = self.config.tick_interval.as_millis() as u64,
            "Simulated source starting"
        );

        *task = Some(runtime.spawn(run_simulation(
            Arc::clone(&self.route),
            Arc::clone(&self.state),
            Arc::clone(&self.sender),
            self.config.clone(),
            self.shutdown.clone(),
        )));
    }

    fn stop(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.shutdown.cancel();
            let handle = { self.task.lock().take() };
            if let Some(handle) = handle {
                if let Err(e) = handle.await {
                    debug!(error = %e, "Simulated source task ended abnormally");
                }
            }
        })
    }

    fn stop_heading_updates(&self) -> BoxFuture<'_, ()> {
        ready(())
    }

    fn current_location(&self) -> Option<LocationSample> {
        Some(self.state.lock().latest.clone())
    }
}

impl Drop for SimulatedLocationSource {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Tick loop: advance along the route until cancelled.
async fn run_simulation(
    route: Arc<Route>,
    state: Arc<Mutex<SimulationState>>,
    sender: Arc<watch::Sender<Option<LocationSample>>>,
    config: SimulationConfig,
    shutdown: CancellationToken,
) {
    let mut interval = tokio::time::interval(config.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    interval.tick().await;

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            _ = interval.tick() => {
                let sample = advance(&route, &state, &config);
                sender.send_replace(Some(sample));
            }
        }
    }

    debug!("Simulated source stopped");
}

fn advance(
    route: &Route,
    state: &Mutex<SimulationState>,
    config: &SimulationConfig,
) -> LocationSample {
    let mut state = state.lock();
    let length = route.length();
    state.distance_along = (state.distance_along + config.step_distance(state.speed_mps)).min(length);

    if state.distance_along >= length && !state.reached_end {
        state.reached_end = true;
        debug!(length_m = length, "Simulated source reached end of route");
    }

    state.latest = sample_at(route, state.distance_along, state.speed_mps, config);
    state.latest.clone()
}

fn sample_at(
    route: &Route,
    distance_along: f64,
    speed_mps: f64,
    config: &SimulationConfig,
) -> LocationSample {
    let geometry = route.geometry();
    LocationSample::new(
        geometry.coordinate_at(distance_along),
        speed_mps,
        geometry.bearing_at(distance_along),
        config.horizontal_accuracy_m,
        SourceKind::Simulated,
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::route::{Coordinate, RouteGeometry};

    fn route(length_m: f64) -> Arc<Route> {
        let geometry =
            RouteGeometry::straight(Coordinate::new(46.5, 7.5), 90.0, length_m).unwrap();
        Arc::new(Route::new(geometry, Vec::new()).unwrap())
    }

    fn source(distance: f64, speed: f64) -> SimulatedLocationSource {
        SimulatedLocationSource::new(route(2_000.0), distance, Some(speed), SimulationConfig::default())
    }

    #[test]
    fn test_new_source_has_seeded_sample() {
        let source = source(100.0, 10.0);

        let sample = source.current_location().unwrap();
        assert_eq!(sample.source, SourceKind::Simulated);
        assert_eq!(sample.speed_mps, 10.0);
        assert_eq!(sample.horizontal_accuracy_m, 5.0);
        assert!((source.distance_along() - 100.0).abs() < 1e-9);
        assert!(!source.is_running());
    }

    #[test]
    fn test_start_without_runtime_is_noop() {
        let source = source(0.0, 10.0);
        source.start();
        assert!(!source.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_advance_along_route() {
        let source = source(100.0, 10.0);
        source.start();
        assert!(source.is_running());

        tokio::time::sleep(Duration::from_millis(3_050)).await;
        source.stop().await;

        assert!(
            (source.distance_along() - 130.0).abs() < 1e-6,
            "distance was {}",
            source.distance_along()
        );
        assert!(!source.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_ticks() {
        let source = source(0.0, 10.0);
        source.start();
        tokio::time::sleep(Duration::from_millis(1_050)).await;
        source.stop().await;

        let stopped_at = source.distance_along();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.distance_along(), stopped_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_after_stop_is_noop() {
        let source = source(0.0, 10.0);
        source.start();
        source.stop().await;
        source.start();
        assert!(!source.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clamps_at_route_end() {
        let source = SimulatedLocationSource::new(
            route(50.0),
            30.0,
            Some(15.0),
            SimulationConfig::default(),
        );
        source.start();
        tokio::time::sleep(Duration::from_millis(5_050)).await;
        source.stop().await;

        let length = source.route.length();
        assert_eq!(source.distance_along(), length);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_receive_samples() {
        let source = source(0.0, 10.0);
        let mut rx = source.subscribe();
        rx.borrow_and_update();

        source.start();
        rx.changed().await.unwrap();
        let sample = rx.borrow().clone().unwrap();
        assert_eq!(sample.source, SourceKind::Simulated);
        source.stop().await;
    }

    #[test]
    fn test_update_progress_only_moves_forward() {
        let source = source(500.0, 10.0);
        let route = Arc::clone(&source.route);

        source.update_progress(&route.progress_at(400.0));
        assert!((source.distance_along() - 500.0).abs() < 1e-9);

        source.update_progress(&route.progress_at(650.0));
        assert!((source.distance_along() - 650.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_progress_refreshes_current_location() {
        let source = source(500.0, 10.0);
        let route = Arc::clone(&source.route);
        let mut rx = source.subscribe();
        rx.borrow_and_update();
        let before = source.current_location().unwrap().coordinate;

        source.update_progress(&route.progress_at(400.0));
        assert!(!rx.has_changed().unwrap());
        assert_eq!(source.current_location().unwrap().coordinate, before);

        source.update_progress(&route.progress_at(900.0));
        let after = source.current_location().unwrap();
        assert_ne!(after.coordinate, before);
        assert_eq!(after.coordinate, route.geometry().coordinate_at(900.0));
        assert_eq!(after.speed_mps, 10.0);

        assert!(rx.has_changed().unwrap());
        let published = rx.borrow_and_update().clone().unwrap();
        assert_eq!(published.coordinate, after.coordinate);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let source = source(0.0, 10.0);
        source.start();
        let shutdown = source.shutdown.clone();
        drop(source);
        assert!(shutdown.is_cancelled());
    }
}
