mod app;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coherence_lab::config::LabConfig;
use coherence_lab::theory::theory;
use coherence_lab::{ExperimentMode, LabError, LabSession, ParamsCell, PhysicsParams, SeededNoise};

#[derive(Parser, Debug)]
#[command(name = "coherence-lab")]
#[command(about = "Coherence experiment dashboard and scripted kernel replay")]
struct Cli {
    /// TOML file with start-up mode, seed and parameters
    #[arg(long, global = true, default_value = "coherence-lab.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive dashboard (default)
    Gui {
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run the kernel for a fixed number of frames and print every sample
    Replay(ReplayArgs),
    /// Describe the available experiments
    Modes,
}

#[derive(clap::Args, Debug)]
struct ReplayArgs {
    /// Experiment letter: A, B or C
    #[arg(long)]
    mode: Option<String>,

    #[arg(long, default_value = "300")]
    frames: usize,

    /// Synthetic frame rate; overrides the config value
    #[arg(long)]
    fps: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "jsonl")]
    format: OutputFormat,

    #[arg(long)]
    propofol: Option<f64>,
    #[arg(long)]
    temperature: Option<f64>,
    #[arg(long)]
    gravity: Option<f64>,
    #[arg(long)]
    isolation: Option<f64>,
    #[arg(long)]
    frequency: Option<f64>,
    #[arg(long)]
    noise_floor: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Jsonl,
    Table,
}

impl ReplayArgs {
    fn apply_overrides(&self, params: &mut PhysicsParams) {
        let overrides = [
            (self.propofol, &mut params.propofol),
            (self.temperature, &mut params.temperature),
            (self.gravity, &mut params.gravity),
            (self.isolation, &mut params.isolation),
            (self.frequency, &mut params.frequency),
            (self.noise_floor, &mut params.noise_floor),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coherence_lab=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    run(Cli::parse())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Only the subcommands that consume the config read it.
    match cli.command {
        None => run_gui(&cli.config, None, None),
        Some(Command::Gui { mode, seed }) => run_gui(&cli.config, mode.as_deref(), seed),
        Some(Command::Replay(args)) => run_replay(&cli.config, &args),
        Some(Command::Modes) => {
            print_modes();
            Ok(())
        }
    }
}

fn resolve_mode(
    config: &LabConfig,
    requested: Option<&str>,
) -> coherence_lab::Result<ExperimentMode> {
    match requested {
        Some(raw) => raw.parse(),
        None => config.experiment_mode(),
    }
}

fn run_gui(config_path: &Path, mode: Option<&str>, seed: Option<u64>) -> anyhow::Result<()> {
    let config = LabConfig::load(config_path)?;
    let mode = resolve_mode(&config, mode)?;
    let seed = seed.or(config.seed);
    let params = config.params;
    info!(%mode, ?seed, "opening dashboard");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 760.0])
            .with_min_inner_size([900.0, 620.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Coherence Protocol Lab",
        options,
        Box::new(move |cc| Ok(Box::new(app::LabApp::new(cc, mode, params, seed)))),
    )
    .map_err(|err| LabError::Dashboard(err.to_string()))?;
    Ok(())
}

fn run_replay(config_path: &Path, args: &ReplayArgs) -> anyhow::Result<()> {
    let config = LabConfig::load(config_path)?;
    let mode = resolve_mode(&config, args.mode.as_deref())?;
    let mut params = config.params;
    args.apply_overrides(&mut params);

    let interval_ms = match args.fps {
        Some(fps) => LabConfig {
            frame_rate_hz: fps,
            ..config.clone()
        }
        .frame_interval_ms(),
        None => config.frame_interval_ms(),
    };
    let noise = match args.seed.or(config.seed) {
        Some(seed) => SeededNoise::new(seed),
        None => SeededNoise::from_entropy(),
    };

    info!(%mode, frames = args.frames, interval_ms, "replaying scenario");

    let mut session = LabSession::new(noise, ParamsCell::new(params), mode);
    session.start();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let OutputFormat::Table = args.format {
        writeln!(out, "{:>10} {:>12} {:>12} {:>10}", "time_ms", "value", "noise", "threshold")?;
    }

    let mut total = 0.0;
    for frame in 0..args.frames {
        let Some(sample) = session.frame(frame as f64 * interval_ms) else {
            continue;
        };
        total += sample.value;
        match args.format {
            OutputFormat::Jsonl => writeln!(out, "{}", serde_json::to_string(&sample)?)?,
            OutputFormat::Table => writeln!(
                out,
                "{:>10.2} {:>12.4} {:>12.4} {:>10.1}",
                sample.time, sample.value, sample.noise, sample.threshold
            )?,
        }
    }

    if args.frames > 0 {
        info!(
            mean_value = total / args.frames as f64,
            window = session.window().len(),
            "replay finished"
        );
    }
    Ok(())
}

fn print_modes() {
    for mode in ExperimentMode::ALL {
        let info = theory(mode);
        println!("{mode}  {}", info.title);
        println!("   {}", info.tagline);
        println!("   equation:  {}", info.equation);
        println!("   mechanism: {}", info.mechanism);
        println!("   citation:  {}", info.citation);
        println!(
            "   reference: {} ({})",
            coherence_lab::kernel::threshold_for(mode),
            info.threshold_label
        );
        println!();
    }
}
