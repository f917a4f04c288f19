// Highway path planner driven by simulator frames
//
// Reads one socket.io text frame per line on stdin and writes the reply
// frame, if any, on stdout. The websocket transport is expected to sit in
// front of this process and forward frames line by line.
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};

use highway_planner::config::PlannerConfig;
use highway_planner::map::TrackMap;
use highway_planner::planning_cycle::PlanningCycle;
use highway_planner::session::PlannerSession;
use highway_planner::PlannerResult;

#[derive(Debug, Parser)]
#[command(name = "highway_planner", about = "Per-cycle highway path planner")]
struct Args {
    /// Waypoint table with `x y s dx dy` rows
    #[arg(long)]
    map: PathBuf,

    /// Track length; overrides the configured value
    #[arg(long)]
    max_s: Option<f64>,

    /// JSON file with planner parameter overrides
    #[arg(long)]
    config: Option<PathBuf>,
}

fn run(args: Args) -> PlannerResult<()> {
    let mut config = match &args.config {
        Some(path) => PlannerConfig::from_json_file(path)?,
        None => PlannerConfig::default(),
    };
    if let Some(max_s) = args.max_s {
        config.track.max_s = max_s;
        config.validate()?;
    }

    let map = Arc::new(TrackMap::from_file(&args.map, config.track.max_s)?);
    let cycle = Arc::new(PlanningCycle::new(map, &config));
    let mut session = PlannerSession::new(cycle);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if let Some(reply) = session.handle_frame(line.trim_end()) {
            writeln!(out, "{}", reply)?;
            out.flush()?;
        }
    }
    info!("input closed");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
