#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod app;
mod controls;

use std::time::Duration;

use anyhow::Result;
use structopt::StructOpt;

use flight::RouteChoice;

use self::app::App;
use self::controls::{Command, TimeControls};

#[derive(StructOpt)]
struct Args {
    /// The path to a route comparison JSON file returned by the routing service
    #[structopt(long)]
    comparison: String,
    /// Show this route instead of the recommended one
    #[structopt(long)]
    route: Option<RouteChoice>,
    /// Playback speed multiplier
    #[structopt(long, default_value = "1")]
    speed: f64,
    /// How long one waypoint lasts at 1x speed
    #[structopt(long, default_value = "100")]
    base_interval_ms: u64,
    /// A file with one control command per line. Without it, the flight just plays through.
    #[structopt(long)]
    script: Option<String>,
}

impl Args {
    fn commands(&self) -> Result<Vec<Command>> {
        match self.script {
            Some(ref path) => controls::parse_script(&fs_err::read_to_string(path)?),
            None => Ok(vec![Command::Play, Command::Finish]),
        }
    }
}

fn main() {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    if let Err(err) = run(args) {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let commands = args.commands()?;
    let raw = fs_err::read_to_string(&args.comparison)?;

    let mut app = App::new(Duration::from_millis(args.base_interval_ms));
    if let Err(err) = app.load_comparison(&raw)? {
        // Nothing to replay, but that's an answer, not a crash
        info!("{err}");
        return Ok(());
    }
    if let Some(route) = args.route {
        app.select(route);
    }

    let mut controls = TimeControls::new(&mut app, args.speed)?;
    for cmd in commands {
        controls.event(&mut app, cmd);
    }

    app.describe_route();
    if let Some(summary) = app.selector.summary() {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
