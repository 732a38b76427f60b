use beeswarm::{bench_collide, GroupingMode, Scenario, ScenarioConfig, Snapshot};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    All,
    Grouped,
}

impl From<ModeArg> for GroupingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::All => GroupingMode::All,
            ModeArg::Grouped => GroupingMode::Grouped,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Force-directed beeswarm layout of referendum results")]
struct Args {
    /// Scenario file; bare names are looked up in `scenarios/`
    #[arg(short, long = "file", default_value = "referendum.yaml")]
    file_name: String,

    /// Override the batch tick budget
    #[arg(long)]
    ticks: Option<usize>,

    /// Override the initial grouping
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// After the static layout, toggle grouping and animate the transition
    #[arg(long)]
    toggle: bool,

    /// Frame cap for the animated transition
    #[arg(long, default_value_t = 600)]
    frames: usize,

    /// Write the final snapshot here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Time the collision pass with and without the quadtree, then exit
    #[arg(long)]
    bench: bool,

    /// Open the interactive window (needs the `viewer` feature)
    #[arg(long)]
    view: bool,
}

// load here to keep main clean
fn load_scenario_config(file_name: &str) -> Result<ScenarioConfig> {
    let direct = PathBuf::from(file_name);
    let config_path = if direct.exists() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    ScenarioConfig::load(&config_path).with_context(|| format!("failed to load scenario {}", config_path.display()))
}

fn write_snapshot(snapshot: &Snapshot, out: Option<&PathBuf>) -> Result<()> {
    let writer: Box<dyn Write> = match out {
        Some(path) => Box::new(File::create(path).with_context(|| format!("cannot create {}", path.display()))?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = BufWriter::new(writer);
    serde_yaml::to_writer(&mut writer, snapshot).context("failed to serialize snapshot")?;
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.bench {
        bench_collide();
        return Ok(());
    }

    let mut scenario_cfg = load_scenario_config(&args.file_name)?;
    if let Some(ticks) = args.ticks {
        scenario_cfg.engine.ticks = ticks;
    }
    if let Some(mode) = args.mode {
        scenario_cfg.layout.initial_mode = mode.into();
    }

    let padding = scenario_cfg.layout.collide_padding;
    let mut scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;

    let mut snapshot = scenario.layout();
    info!(
        markers = snapshot.markers.len(),
        max_overlap = snapshot.max_overlap(padding),
        mode = ?scenario.mode,
        "static layout done"
    );

    if args.view {
        return run_viewer(scenario);
    }

    if args.toggle {
        let handle = scenario.toggle()?;
        let frames = scenario.simulation.drive(handle, args.frames);
        snapshot = scenario.simulation.snapshot();
        info!(frames, mode = ?scenario.mode, max_overlap = snapshot.max_overlap(padding), "transition done");
    }

    write_snapshot(&snapshot, args.out.as_ref())
}

#[cfg(feature = "viewer")]
fn run_viewer(scenario: Scenario) -> Result<()> {
    beeswarm::run_2d(scenario);
    Ok(())
}

#[cfg(not(feature = "viewer"))]
fn run_viewer(_scenario: Scenario) -> Result<()> {
    anyhow::bail!("this build has no viewer, rebuild with `--features viewer`")
}
