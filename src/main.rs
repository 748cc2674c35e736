//! Proximity monitor: classifies a moving region as approaching, receding or stable.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use proximity_monitor::{
    config::Config,
    debounce::{FlatPolicy, Transition},
    pipeline,
    source::{ExtentFileSource, MeasurementSource},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Debounced approaching/receding detection from a motion region", long_about = None)]
struct Args {
    /// Camera index to use
    #[arg(long)]
    cam: Option<i32>,

    /// Video file to process
    #[arg(short, long, conflicts_with = "cam")]
    video: Option<String>,

    /// Replay extents from a text file ('-' for stdin) instead of video
    #[arg(short, long, conflicts_with_all = ["cam", "video"])]
    replay: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Trend policy as name[:threshold] (delta, split_average, monotonic_run)
    #[arg(short, long)]
    policy: Option<String>,

    /// History window size
    #[arg(short, long)]
    window: Option<usize>,

    /// Consecutive agreeing frames required to confirm a state
    #[arg(long)]
    confirm: Option<usize>,

    /// Behaviour on flat frames while a direction is confirmed (release, hold)
    #[arg(long)]
    flat_policy: Option<String>,

    /// Consecutive flat frames before falling back to Stable
    #[arg(long)]
    release_frames: Option<usize>,

    /// Run without a display window
    #[arg(long)]
    no_gui: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let config = build_config(&args)?;

    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    if let Some(path) = &args.replay {
        return replay(path, &config);
    }

    run_video(&args, config)
}

/// Merge the config file (if any) with command line overrides
fn build_config(args: &Args) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path);
        Config::from_file(config_path).with_context(|| format!("Failed to load config {config_path}"))?
    } else {
        Config::default()
    };

    if let Some(spec) = &args.policy {
        config.trend.set_policy(spec)?;
    }
    if let Some(window) = args.window {
        config.trend.window_size = window;
    }
    if let Some(confirm) = args.confirm {
        config.debounce.confirm_frames = confirm;
    }
    if let Some(flat_policy) = &args.flat_policy {
        config.debounce.flat_policy = flat_policy.parse::<FlatPolicy>()?;
    }
    if let Some(release_frames) = args.release_frames {
        config.debounce.release_frames = release_frames;
    }
    if args.no_gui {
        config.display.gui = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Classify a recorded extent sequence and print every transition
fn replay(path: &str, config: &Config) -> Result<()> {
    let mut source: Box<dyn MeasurementSource> = if path == "-" {
        info!("Replaying extents from stdin");
        Box::new(ExtentFileSource::new(std::io::stdin().lock()))
    } else {
        Box::new(ExtentFileSource::open(path).with_context(|| format!("Failed to open {path}"))?)
    };

    let mut classifier = config.create_classifier()?;
    classifier.subscribe(|t: &Transition| println!("{t}"));

    let summary = pipeline::run(source.as_mut(), &mut classifier)?;
    println!(
        "Processed {} ticks, {} transitions, final state: {}",
        summary.ticks,
        summary.transitions.len(),
        summary.final_state
    );
    Ok(())
}

#[cfg(feature = "opencv")]
fn run_video(args: &Args, config: Config) -> Result<()> {
    use proximity_monitor::app::{ProximityApp, VideoSource};

    let source = match &args.video {
        Some(path) => VideoSource::File(path.clone()),
        None => VideoSource::Camera(args.cam.unwrap_or(0)),
    };

    let mut app = ProximityApp::new(config, source)?;
    let summary = app.run()?;
    info!(
        "Processed {} frames, {} transitions, final state: {}",
        summary.ticks,
        summary.transitions.len(),
        summary.final_state
    );
    Ok(())
}

#[cfg(not(feature = "opencv"))]
fn run_video(_args: &Args, _config: Config) -> Result<()> {
    anyhow::bail!("Camera and video input require building with the `opencv` feature; use --replay for recorded extents")
}
