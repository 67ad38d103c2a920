use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use train_sim::render::{Renderer, CLEAR_SCREEN};
use train_sim::simulation::{
    SimConfig, Simulation, TrackGraph, MAX_STEP_DELAY_SECS, MAX_TRAINS, MIN_STEP_DELAY_SECS,
    REFRESH_INTERVAL, SPAWN_INTERVAL, SPAWN_PROBABILITY, TRAIN_LENGTH,
};
use train_sim::DEFAULT_LAYOUT;

#[derive(Parser)]
#[command(name = "train_sim")]
#[command(about = "Concurrent train simulation on a text track layout")]
struct Cli {
    /// Track layout file (`-`, `/`, `\` and spaces); built-in layout if omitted
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Seed for spawning and branch choices
    #[arg(long)]
    seed: Option<u64>,

    /// How long to run, in seconds
    #[arg(long, default_value = "30")]
    duration: f64,

    /// Time between rendered frames, in milliseconds
    #[arg(long, default_value_t = REFRESH_INTERVAL.as_millis() as u64)]
    refresh_ms: u64,

    /// Time between spawner sweeps, in milliseconds
    #[arg(long, default_value_t = SPAWN_INTERVAL.as_millis() as u64)]
    spawn_interval_ms: u64,

    /// Chance per sweep that an entry cell gets a spawn attempt
    #[arg(long, default_value_t = SPAWN_PROBABILITY)]
    spawn_probability: f64,

    /// Number of cells each train occupies
    #[arg(long, default_value_t = TRAIN_LENGTH)]
    train_length: usize,

    /// Maximum number of trains running at once
    #[arg(long, default_value_t = MAX_TRAINS)]
    max_trains: usize,

    /// Do not draw frames, only log
    #[arg(long)]
    headless: bool,

    /// Do not clear the terminal between frames
    #[arg(long)]
    no_clear: bool,

    /// Colour trains with ANSI escape codes
    #[arg(long)]
    colour: bool,
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            train_length: self.train_length,
            speed_range: MIN_STEP_DELAY_SECS..MAX_STEP_DELAY_SECS,
            spawn_interval: Duration::from_millis(self.spawn_interval_ms),
            spawn_probability: self.spawn_probability,
            max_trains: self.max_trains,
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,train_sim=info"),
    )
    .init();

    let cli = Cli::parse();

    let layout = load_layout(cli.layout.as_deref())?;
    let graph = TrackGraph::parse(&layout).context("Failed to parse track layout")?;
    let run_for = Duration::try_from_secs_f64(cli.duration)
        .context("Duration must be a non-negative number of seconds")?;

    let simulation = Simulation::start(graph, cli.sim_config())?;
    info!("Running for {:.1}s", run_for.as_secs_f64());

    if cli.headless {
        thread::sleep(run_for);
    } else {
        render_until(&simulation, &cli, run_for)?;
    }

    let report = simulation.stop();
    report.log_summary();
    Ok(())
}

fn load_layout(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout {}", path.display())),
        None => Ok(DEFAULT_LAYOUT.to_string()),
    }
}

/// Draw frames at the refresh rate until `run_for` has elapsed
fn render_until(simulation: &Simulation, cli: &Cli, run_for: Duration) -> Result<()> {
    let refresh = Duration::from_millis(cli.refresh_ms.max(1));
    let mut renderer = Renderer::new(cli.colour);
    let started = Instant::now();
    let stdout = io::stdout();

    loop {
        let frame = renderer.render(&simulation.snapshot());
        {
            let mut out = stdout.lock();
            if !cli.no_clear {
                out.write_all(CLEAR_SCREEN.as_bytes())?;
            }
            out.write_all(frame.as_bytes())?;
            let stats = simulation.stats();
            writeln!(
                out,
                "trains: {} running, {} spawned, {} retired",
                stats.live_trains, stats.trains_spawned, stats.trains_retired
            )?;
            out.flush()?;
        }

        let elapsed = started.elapsed();
        if elapsed >= run_for {
            return Ok(());
        }
        thread::sleep(refresh.min(run_for - elapsed));
    }
}
