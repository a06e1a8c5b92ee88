use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use locomotion::logging::{self, Level, LogConfig};
use locomotion::{ComfortPreset, LocomotionConfig, LocomotionCoordinator, LocomotionEvent};
use serde_json::json;
use tracing::info;

mod scenario;

use scenario::{BUILTIN_DEMOS, Scenario};

#[derive(Parser)]
#[command(name = "locomotion_sim")]
#[command(about = "Drive the locomotion core with scripted controller input")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a JSON scenario file and print emitted events as JSON lines
    Run {
        scenario: PathBuf,

        /// Tuning file (TOML); defaults are used otherwise
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run one of the built-in scenarios (smooth, teleport, mode-switch)
    Demo {
        name: String,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the comfort presets
    Presets,
    /// Load and validate a tuning file, then print the effective values
    CheckConfig { path: PathBuf },
}

fn init_logging(verbose: bool) {
    let config = if verbose {
        let mut config = LogConfig::new();
        config.set_global_level(Level::DEBUG);
        config
    } else {
        LogConfig::from_env("LOCOMOTION_LOG")
    };
    logging::init_logging_with(config);
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { scenario, config } => {
            let scenario = Scenario::load(&scenario)?;
            run_scenario(&scenario, load_config(config.as_deref())?)?;
        }
        Commands::Demo { name, config } => {
            let scenario = Scenario::builtin(&name).ok_or_else(|| {
                anyhow!("Unknown demo '{}', expected one of {:?}", name, BUILTIN_DEMOS)
            })?;
            run_scenario(&scenario, load_config(config.as_deref())?)?;
        }
        Commands::Presets => {
            for preset in ComfortPreset::ALL {
                let line = json!({ "preset": preset.name(), "settings": preset.settings() });
                println!("{}", line);
            }
        }
        Commands::CheckConfig { path } => {
            let config = load_config(Some(&path))?;
            let pretty = serde_json::to_string_pretty(&config)
                .context("Failed to serialize configuration")?;
            println!("{}", pretty);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<LocomotionConfig> {
    match path {
        Some(path) => LocomotionConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(LocomotionConfig::default()),
    }
}

fn event_name(event: &LocomotionEvent) -> &'static str {
    match event {
        LocomotionEvent::MovementStart => "movementStart",
        LocomotionEvent::MovementStop => "movementStop",
        LocomotionEvent::MovementUpdate(_) => "movementUpdate",
        LocomotionEvent::TeleportStart => "teleportStart",
        LocomotionEvent::TeleportEnd => "teleportEnd",
        LocomotionEvent::Teleport { .. } => "teleport",
    }
}

fn run_scenario(scenario: &Scenario, config: LocomotionConfig) -> Result<()> {
    let mut coordinator = LocomotionCoordinator::new(config);

    // Counts come through a listener so the summary sees exactly what a
    // host subscriber would
    let counts = Rc::new(RefCell::new(BTreeMap::<&'static str, u32>::new()));
    let sink = counts.clone();
    coordinator.subscribe(Box::new(move |event: &LocomotionEvent| {
        *sink.borrow_mut().entry(event_name(event)).or_default() += 1;
    }));

    info!(
        "Running scenario '{}' for {} frames",
        scenario.name,
        scenario.total_frames()
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let playback = scenario.play(&mut coordinator, |frame, time, event| {
        let line = json!({ "frame": frame, "time": time, "event": event });
        writeln!(out, "{}", line).context("Failed to write event")
    })?;

    let summary = json!({
        "summary": {
            "scenario": scenario.name,
            "frames": playback.frames,
            "position": playback.rig.position,
            "yaw_degrees": playback.rig.yaw().to_degrees(),
            "settings": coordinator.comfort_settings(),
            "events": counts.borrow().clone(),
        }
    });
    writeln!(out, "{}", summary).context("Failed to write summary")?;

    Ok(())
}
