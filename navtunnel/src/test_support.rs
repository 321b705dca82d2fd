//! Shared test doubles for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::host::NavigationHost;
use crate::location::{BoxFuture, LocationSample, LocationSource, SourceKind};
use crate::route::{
    Coordinate, RoadClass, RoadClassSet, Route, RouteGeometry, RouteIntersection,
};

/// Ordered record of calls across sources and host.
#[derive(Debug, Default, Clone)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.0.lock().iter().any(|e| e == event)
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == event)
    }
}

/// Platform source stand-in that records lifecycle calls.
pub struct MockPlatformSource {
    log: EventLog,
    running: AtomicBool,
    current: Mutex<Option<LocationSample>>,
    stop_delay: Option<Duration>,
}

impl MockPlatformSource {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            running: AtomicBool::new(true),
            current: Mutex::new(None),
            stop_delay: None,
        }
    }

    pub fn with_stop_delay(mut self, delay: Duration) -> Self {
        self.stop_delay = Some(delay);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl LocationSource for MockPlatformSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Platform
    }

    fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.log.push("platform:start");
    }

    fn stop(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Some(delay) = self.stop_delay {
                tokio::time::sleep(delay).await;
            }
            self.running.store(false, Ordering::SeqCst);
            self.log.push("platform:stop");
        })
    }

    fn stop_heading_updates(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.log.push("platform:stop_heading");
        })
    }

    fn current_location(&self) -> Option<LocationSample> {
        self.current.lock().clone()
    }
}

/// Host that records every callback.
pub struct RecordingHost {
    log: EventLog,
    locations: Mutex<Vec<LocationSample>>,
    consuming_platform: AtomicBool,
}

impl RecordingHost {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            locations: Mutex::new(Vec::new()),
            consuming_platform: AtomicBool::new(true),
        }
    }

    pub fn published(&self) -> Vec<LocationSample> {
        self.locations.lock().clone()
    }

    pub fn is_consuming_platform(&self) -> bool {
        self.consuming_platform.load(Ordering::SeqCst)
    }
}

impl NavigationHost for RecordingHost {
    fn set_current_location(&self, sample: LocationSample) {
        self.log
            .push(format!("host:set_current_location:{}", sample.source));
        self.locations.lock().push(sample);
    }

    fn suspend_location_updates(&self) {
        self.consuming_platform.store(false, Ordering::SeqCst);
        self.log.push("host:suspend");
    }

    fn resume_location_updates(&self) {
        self.consuming_platform.store(true, Ordering::SeqCst);
        self.log.push("host:resume");
    }
}

pub const GOOD_ACCURACY: f64 = 5.0;
pub const BAD_ACCURACY: f64 = 500.0;

/// Sample with the given speed/accuracy from `source`.
pub fn sample(speed: f64, accuracy: f64, source: SourceKind) -> LocationSample {
    LocationSample::new(
        Coordinate::new(47.0, 8.0),
        speed,
        90.0,
        accuracy,
        source,
    )
}

/// 2 km route heading east with a tunnel from 1000 m to 1300 m.
pub fn tunnel_route() -> Arc<Route> {
    let geometry = RouteGeometry::straight(Coordinate::new(47.0, 8.0), 90.0, 2_000.0)
        .expect("valid geometry");
    let plain = Some(RoadClassSet::empty());
    let tunnel = Some(RoadClassSet::only(RoadClass::Tunnel));
    let intersections = vec![
        RouteIntersection::new(0.0, plain),
        RouteIntersection::new(500.0, plain),
        RouteIntersection::new(1_000.0, tunnel),
        RouteIntersection::new(1_300.0, plain),
        RouteIntersection::new(1_600.0, plain),
    ];
    Arc::new(Route::new(geometry, intersections).expect("valid route"))
}
