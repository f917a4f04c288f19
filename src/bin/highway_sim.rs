// Closed-loop highway simulation
//
// Drives the planner around a circular three-lane track with randomly placed
// constant-speed traffic. Each tick the car consumes a few points of the last
// path, the rest is handed back as the previous path. The driven trace is
// plotted at the end.
use std::f64::consts::PI;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use highway_planner::behavior::{Lane, PlanningContext, TrackedVehicle};
use highway_planner::common::{FrenetPoint, Path2D, Point2D};
use highway_planner::config::PlannerConfig;
use highway_planner::map::{FrenetConverter, TrackMap, Waypoint};
use highway_planner::planning_cycle::{CycleInput, EgoState, PlanningCycle};
use highway_planner::utils::{colors, PathStyle, PointStyle, Visualizer};
use highway_planner::PlannerResult;

#[derive(Debug, Parser)]
#[command(name = "highway_sim", about = "Closed-loop highway planner simulation")]
struct Args {
    /// Number of planner cycles
    #[arg(long, default_value_t = 600)]
    ticks: usize,

    /// Path points consumed per cycle
    #[arg(long, default_value_t = 5)]
    consumed: usize,

    #[arg(long, default_value_t = 14)]
    cars: usize,

    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Plot file; `.svg` selects SVG output, anything else PNG
    #[arg(long, default_value = "highway_sim.png")]
    output: String,
}

/// Counter-clockwise polygonal ring around the `d` sign reference point
fn ring_track(center: (f64, f64), radius: f64, count: usize) -> PlannerResult<TrackMap> {
    let points: Vec<Point2D> = (0..=count)
        .map(|i| {
            let a = 2.0 * PI * i as f64 / count as f64;
            Point2D::new(center.0 + radius * a.cos(), center.1 + radius * a.sin())
        })
        .collect();
    let mut waypoints = Vec::with_capacity(count);
    let mut s = 0.0;
    for pair in points.windows(2) {
        let p = pair[0];
        waypoints.push(Waypoint::new(
            p.x,
            p.y,
            s,
            (p.x - center.0) / radius,
            (p.y - center.1) / radius,
        ));
        s += p.distance(&pair[1]);
    }
    TrackMap::new(waypoints, s)
}

struct SimCar {
    id: i64,
    s: f64,
    d: f64,
    speed: f64,
}

impl SimCar {
    fn advance(&mut self, dt: f64, max_s: f64) {
        self.s = (self.s + self.speed * dt).rem_euclid(max_s);
    }

    fn observe(&self, conv: &FrenetConverter) -> TrackedVehicle {
        let p = conv.to_cartesian(self.s, self.d);
        let ahead = conv.to_cartesian(self.s + 1.0, self.d);
        let heading = p.bearing_to(&ahead);
        TrackedVehicle::new(
            self.id,
            p.x,
            p.y,
            self.speed * heading.cos(),
            self.speed * heading.sin(),
            self.s,
            self.d,
        )
    }
}

fn run(args: Args) -> PlannerResult<()> {
    let config = PlannerConfig::default();
    let map = Arc::new(ring_track(config.frenet.sign_reference, 700.0, 140)?);
    let max_s = map.max_s();
    let cycle = PlanningCycle::new(map.clone(), &config);
    let conv = cycle.converter();
    let dt = config.trajectory.step_duration;
    let lane_width = config.track.lane_width;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let speeds = Normal::<f64>::new(17.0, 3.0).map_err(|e| {
        highway_planner::PlannerError::InvalidParameter(e.to_string())
    })?;
    let mut cars: Vec<SimCar> = (0..args.cars)
        .map(|i| {
            let lane = Lane::ALL[rng.gen_range(0..Lane::ALL.len())];
            SimCar {
                id: i as i64,
                s: rng.gen_range(60.0..max_s - 30.0),
                d: lane.center_d(lane_width),
                speed: speeds.sample(&mut rng).clamp(8.0, 22.0),
            }
        })
        .collect();

    let start = FrenetPoint::new(10.0, Lane::Middle.center_d(lane_width));
    let start_xy = conv.to_cartesian(start.s, start.d);
    let start_ahead = conv.to_cartesian(start.s + 1.0, start.d);
    let mut ego = EgoState {
        x: start_xy.x,
        y: start_xy.y,
        s: start.s,
        d: start.d,
        heading: start_xy.bearing_to(&start_ahead),
        speed: 0.0,
    };

    let mut ctx = PlanningContext::default();
    let mut previous = Path2D::new();
    let mut trace = Path2D::new();
    let mut last_planned = Path2D::new();
    let mut lane_changes = 0;

    for tick in 0..args.ticks {
        let input = CycleInput {
            ego,
            previous_path: previous.clone(),
            end_path: None,
            traffic: cars.iter().map(|c| c.observe(conv)).collect(),
        };
        let output = cycle.run(&mut ctx, &input)?;
        if output.decision.lane_change_initiated {
            lane_changes += 1;
            info!("tick {}: lane change to {}", tick, output.decision.target_lane);
        }

        // Drive along the first points of the new path
        let consumed = args.consumed.clamp(1, output.path.len());
        let driven = &output.path.points[..consumed];
        let before = if consumed >= 2 {
            driven[consumed - 2]
        } else {
            Point2D::new(ego.x, ego.y)
        };
        let here = driven[consumed - 1];
        let heading = if before.distance(&here) > 1e-6 {
            before.bearing_to(&here)
        } else {
            ego.heading
        };
        match conv.to_frenet(here.x, here.y, heading) {
            Ok(f) => {
                ego.s = f.s;
                ego.d = f.d;
            }
            Err(e) => warn!("tick {}: {}", tick, e),
        }
        ego.speed = before.distance(&here) / dt * config.trajectory.velocity_scale;
        ego.x = here.x;
        ego.y = here.y;
        ego.heading = heading;
        for p in driven {
            trace.push(*p);
        }

        previous = Path2D::from_points(output.path.points[consumed..].to_vec());
        last_planned = output.path;
        for car in cars.iter_mut() {
            car.advance(dt * consumed as f64, max_s);
        }
    }

    info!(
        "finished {} ticks: s={:.1}, lane {}, v_ref {:.1} mph, {} lane changes",
        args.ticks, ego.s, ctx.current_lane, ctx.reference_velocity, lane_changes
    );

    let mut vis = Visualizer::new();
    vis.set_title("Highway planner simulation");
    vis.plot_track(conv, lane_width, 5.0)
        .plot_path(&trace, &PathStyle::new(colors::EGO, "Ego trace"))
        .plot_path(&last_planned, &PathStyle::new(colors::PLANNED, "Last plan").with_line_width(1.0))
        .plot_points(
            &cars.iter().map(|c| conv.to_cartesian(c.s, c.d)).collect::<Vec<_>>(),
            &PointStyle::new(colors::TRAFFIC, "Traffic").with_symbol('S'),
        )
        .plot_points(
            &[Point2D::new(ego.x, ego.y)],
            &PointStyle::new(colors::EGO, "Ego").with_size(2.0),
        );
    let saved = if args.output.ends_with(".svg") {
        vis.save_svg(&args.output, 800, 800)
    } else {
        vis.save_png(&args.output, 800, 800)
    };
    if let Err(e) = saved {
        warn!("could not save plot: {}", e);
    } else {
        info!("plot saved to {}", args.output);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("simulation failed: {}", e);
        std::process::exit(1);
    }
}
