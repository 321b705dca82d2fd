//! Simulate command - replay a scripted drive through a synthetic tunnel.
//!
//! The drive runs on a straight route with one tunnel. Platform fixes are
//! good on the open road and unusable inside the tunnel. Every virtual
//! second the driver feeds one sample to the tunnel manager: a scripted
//! platform fix while GPS drives navigation, or the next simulated tick
//! while animation is enabled.
//!
//! ```text
//!  0 m            tunnel_start        tunnel_end               length
//!  ●────────────────────█████████████████████────────────────────●
//!  platform fixes (±5m)  unusable (±300m)     platform fixes (±5m)
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use console::{style, Term};
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::watch;
use tracing::debug;

use navtunnel::config::ConfigFile;
use navtunnel::location::{ready, BoxFuture};
use navtunnel::route::{Coordinate, RoadClass, RoadClassSet, RouteGeometry, RouteIntersection};
use navtunnel::tunnel::ManagerStatus;
use navtunnel::{
    Handoff, LocationSample, LocationSource, NavigationHost, Route, SourceKind,
    TunnelIntersectionManager,
};

use crate::error::CliError;

/// Accuracy of platform fixes on the open road (m).
const OPEN_ROAD_ACCURACY_M: f64 = 5.0;

/// Accuracy of platform fixes inside the tunnel (m).
const TUNNEL_ACCURACY_M: f64 = 300.0;

/// Spacing of ordinary intersections along the route (m).
const INTERSECTION_SPACING_M: f64 = 200.0;

/// Route origin.
const ORIGIN: Coordinate = Coordinate::new(47.3769, 8.5417);

/// Arguments for `navtunnel simulate`.
#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Vehicle speed in m/s
    #[arg(long, default_value_t = 20.0)]
    pub speed: f64,

    /// Distance from the start to the tunnel portal in meters
    #[arg(long, default_value_t = 800.0)]
    pub tunnel_start: f64,

    /// Tunnel length in meters
    #[arg(long, default_value_t = 600.0)]
    pub tunnel_length: f64,

    /// Road after the tunnel in meters
    #[arg(long, default_value_t = 600.0)]
    pub tail_length: f64,

    /// Replay speed-up over real time
    #[arg(long, default_value_t = 10.0)]
    pub time_scale: f64,

    /// Emit JSON lines instead of styled text
    #[arg(long)]
    pub json: bool,
}

/// Run the simulate command.
pub async fn run(args: SimulateArgs, config: &ConfigFile) -> Result<(), CliError> {
    let scenario = Scenario::from_args(&args)?;
    let mut tunnel_config = config.tunnel_config()?;

    // One tick is one virtual second of driving, replayed time_scale times faster
    let virtual_step = tunnel_config.simulation.tick_interval;
    tunnel_config.simulation.time_scale = args.time_scale;
    tunnel_config.simulation.tick_interval = virtual_step.div_f64(args.time_scale);
    if tunnel_config.simulation.tick_interval.is_zero() {
        return Err(CliError::Scenario(format!(
            "--time-scale {} is too large for a {:?} tick",
            args.time_scale, virtual_step
        )));
    }
    let pacing = Pacing {
        wall_step: tunnel_config.simulation.tick_interval,
        virtual_step_s: virtual_step.as_secs_f64(),
    };

    let host = Arc::new(ConsoleHost::default());
    let gps = Arc::new(ScriptedGps::default());
    let manager =
        TunnelIntersectionManager::new(tunnel_config, Arc::clone(&host) as Arc<dyn NavigationHost>);
    let reporter = Reporter::new(args.json);

    reporter.start(&scenario, &args)?;
    let log = drive(&scenario, &manager, &gps, pacing, &reporter).await?;
    manager.teardown().await;
    reporter.finish(&log, &manager.status(), &host)?;

    Ok(())
}

/// Synthetic route with a single tunnel.
#[derive(Debug)]
struct Scenario {
    route: Arc<Route>,
    speed: f64,
    tunnel_start: f64,
    tunnel_end: f64,
}

impl Scenario {
    fn from_args(args: &SimulateArgs) -> Result<Self, CliError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(value)
            } else {
                Err(CliError::Scenario(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )))
            }
        };

        let speed = positive("--speed", args.speed)?;
        let tunnel_start = positive("--tunnel-start", args.tunnel_start)?;
        let tunnel_length = positive("--tunnel-length", args.tunnel_length)?;
        let tail_length = positive("--tail-length", args.tail_length)?;
        positive("--time-scale", args.time_scale)?;

        let tunnel_end = tunnel_start + tunnel_length;
        let length = tunnel_end + tail_length;

        let plain = Some(RoadClassSet::empty());
        let mut intersections: Vec<RouteIntersection> = (0..)
            .map(|i| i as f64 * INTERSECTION_SPACING_M)
            .take_while(|d| *d < length)
            .filter(|d| *d < tunnel_start - 1.0 || *d > tunnel_end + 1.0)
            .map(|d| RouteIntersection::new(d, plain))
            .collect();
        intersections.push(RouteIntersection::new(
            tunnel_start,
            Some(RoadClassSet::only(RoadClass::Tunnel)),
        ));
        intersections.push(RouteIntersection::new(tunnel_end, plain));
        intersections.sort_by(|a, b| a.distance_along.total_cmp(&b.distance_along));

        let geometry = RouteGeometry::straight(ORIGIN, 0.0, length)?;
        let route = Arc::new(Route::new(geometry, intersections)?);

        Ok(Self {
            route,
            speed,
            tunnel_start,
            tunnel_end,
        })
    }

    fn in_tunnel(&self, distance: f64) -> bool {
        distance >= self.tunnel_start && distance < self.tunnel_end
    }

    fn accuracy_at(&self, distance: f64) -> f64 {
        if self.in_tunnel(distance) {
            TUNNEL_ACCURACY_M
        } else {
            OPEN_ROAD_ACCURACY_M
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pacing {
    wall_step: Duration,
    virtual_step_s: f64,
}

/// A completed hand-off during the drive.
#[derive(Debug, Clone, PartialEq)]
struct Transition {
    time_s: f64,
    distance_m: f64,
    animation_enabled: bool,
}

#[derive(Debug, Default)]
struct DriveLog {
    elapsed_s: f64,
    samples: usize,
    transitions: Vec<Transition>,
}

/// Feed one sample per virtual second until the end of the route.
async fn drive(
    scenario: &Scenario,
    manager: &TunnelIntersectionManager,
    gps: &Arc<ScriptedGps>,
    pacing: Pacing,
    reporter: &Reporter,
) -> Result<DriveLog, CliError> {
    let length = scenario.route.length();
    let mut log = DriveLog::default();
    let mut distance = 0.0;
    let mut ticks: Option<watch::Receiver<Option<LocationSample>>> = None;

    while distance < length {
        let sample = match manager.simulated_source() {
            Some(simulated) => {
                let rx = ticks.get_or_insert_with(|| simulated.subscribe());
                if rx.changed().await.is_err() {
                    break;
                }
                let Some(sample) = rx.borrow_and_update().clone() else {
                    continue;
                };
                distance = simulated.distance_along();
                sample
            }
            None => {
                ticks = None;
                tokio::time::sleep(pacing.wall_step).await;
                distance = (distance + scenario.speed * pacing.virtual_step_s).min(length);
                gps.fix_at(scenario, distance)
            }
        };

        log.elapsed_s += pacing.virtual_step_s;
        log.samples += 1;

        let progress = scenario.route.progress_at(distance);
        let real = Arc::clone(gps) as Arc<dyn LocationSource>;
        if let Some(handoff) = manager
            .handle_location_update(real, &sample, &progress)
            .await
        {
            let transition = Transition {
                time_s: log.elapsed_s,
                distance_m: distance,
                animation_enabled: handoff.animation_enabled,
            };
            reporter.transition(&transition, &sample, &handoff, &manager.status())?;
            log.transitions.push(transition);
        }
    }

    Ok(log)
}

/// Platform source replaying the scenario's GPS quality.
#[derive(Debug)]
struct ScriptedGps {
    running: AtomicBool,
    last_fix: Mutex<Option<LocationSample>>,
}

impl Default for ScriptedGps {
    fn default() -> Self {
        Self {
            running: AtomicBool::new(true),
            last_fix: Mutex::new(None),
        }
    }
}

impl ScriptedGps {
    fn fix_at(&self, scenario: &Scenario, distance: f64) -> LocationSample {
        let geometry = scenario.route.geometry();
        let fix = LocationSample::new(
            geometry.coordinate_at(distance),
            scenario.speed,
            geometry.bearing_at(distance),
            scenario.accuracy_at(distance),
            SourceKind::Platform,
        );
        *self.last_fix.lock() = Some(fix.clone());
        fix
    }
}

impl LocationSource for ScriptedGps {
    fn kind(&self) -> SourceKind {
        SourceKind::Platform
    }

    fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        debug!("Scripted GPS started");
    }

    fn stop(&self) -> BoxFuture<'_, ()> {
        self.running.store(false, Ordering::SeqCst);
        debug!("Scripted GPS stopped");
        ready(())
    }

    fn stop_heading_updates(&self) -> BoxFuture<'_, ()> {
        ready(())
    }

    fn current_location(&self) -> Option<LocationSample> {
        self.last_fix.lock().clone()
    }
}

/// Host that counts what the manager publishes.
#[derive(Debug)]
struct ConsoleHost {
    platform_published: AtomicUsize,
    simulated_published: AtomicUsize,
    consuming_platform: AtomicBool,
}

impl Default for ConsoleHost {
    fn default() -> Self {
        Self {
            platform_published: AtomicUsize::new(0),
            simulated_published: AtomicUsize::new(0),
            consuming_platform: AtomicBool::new(true),
        }
    }
}

impl NavigationHost for ConsoleHost {
    fn set_current_location(&self, sample: LocationSample) {
        let counter = match sample.source {
            SourceKind::Platform => &self.platform_published,
            SourceKind::Simulated => &self.simulated_published,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        debug!(location = %sample, "Host location set");
    }

    fn suspend_location_updates(&self) {
        self.consuming_platform.store(false, Ordering::SeqCst);
        debug!("Host suspended platform updates");
    }

    fn resume_location_updates(&self) {
        self.consuming_platform.store(true, Ordering::SeqCst);
        debug!("Host resumed platform updates");
    }
}

/// Prints drive events as styled text or JSON lines.
struct Reporter {
    term: Term,
    json: bool,
}

impl Reporter {
    fn new(json: bool) -> Self {
        Self {
            term: Term::stdout(),
            json,
        }
    }

    fn start(&self, scenario: &Scenario, args: &SimulateArgs) -> Result<(), CliError> {
        if self.json {
            let line = json!({
                "event": "start",
                "route_length_m": scenario.route.length(),
                "tunnel_start_m": scenario.tunnel_start,
                "tunnel_end_m": scenario.tunnel_end,
                "speed_mps": scenario.speed,
                "time_scale": args.time_scale,
            });
            return self.write_json(&line);
        }

        self.term.write_line(&format!(
            "{} {:.0} m route, tunnel {:.0}..{:.0} m, {:.1} m/s ({}x)",
            style("Simulating").bold(),
            scenario.route.length(),
            scenario.tunnel_start,
            scenario.tunnel_end,
            scenario.speed,
            args.time_scale
        ))?;
        Ok(())
    }

    fn transition(
        &self,
        transition: &Transition,
        sample: &LocationSample,
        handoff: &Handoff,
        status: &ManagerStatus,
    ) -> Result<(), CliError> {
        if self.json {
            let event = if transition.animation_enabled {
                "enabled"
            } else {
                "disabled"
            };
            let line = json!({
                "event": event,
                "time_s": transition.time_s,
                "distance_m": transition.distance_m,
                "trigger_source": sample.source,
                "trigger_accuracy_m": sample.horizontal_accuracy_m,
                "active_source": handoff.active_source.kind(),
                "status": status,
            });
            return self.write_json(&line);
        }

        let label = if transition.animation_enabled {
            style("▶ animation enabled ").green().bold()
        } else {
            style("■ animation disabled").cyan().bold()
        };
        self.term.write_line(&format!(
            "[{:>6.1}s] {:>7.1} m  {}  active: {}  trigger: {}",
            transition.time_s,
            transition.distance_m,
            label,
            handoff.active_source.kind(),
            sample
        ))?;
        Ok(())
    }

    fn finish(
        &self,
        log: &DriveLog,
        status: &ManagerStatus,
        host: &ConsoleHost,
    ) -> Result<(), CliError> {
        let platform = host.platform_published.load(Ordering::Relaxed);
        let simulated = host.simulated_published.load(Ordering::Relaxed);

        if self.json {
            let line = json!({
                "event": "finished",
                "time_s": log.elapsed_s,
                "samples": log.samples,
                "transitions": log.transitions.len(),
                "host_platform_locations": platform,
                "host_simulated_locations": simulated,
                "status": status,
            });
            return self.write_json(&line);
        }

        let metrics = &status.metrics;
        self.term.write_line(&format!(
            "{} {:.1}s virtual, {} samples, {} hand-offs",
            style("Finished").bold(),
            log.elapsed_s,
            log.samples,
            log.transitions.len()
        ))?;
        self.term.write_line(&format!(
            "  enabled {}  disabled {} (qualified {}, forced {})  debounced {}",
            metrics.animations_enabled,
            metrics.animations_disabled,
            metrics.qualified_exits,
            metrics.forced_exits,
            metrics.debounced_samples
        ))?;
        self.term.write_line(&format!(
            "  host locations: {} platform, {} simulated",
            platform, simulated
        ))?;
        Ok(())
    }

    fn write_json(&self, value: &serde_json::Value) -> Result<(), CliError> {
        self.term.write_line(&serde_json::to_string(value)?)?;
        Ok(())
    }
}
