//! pano - curved panorama views from the command line
//!
//! Wraps stitched panoramas around a virtual cylinder, applies barrel
//! warps, and runs the same effects over whole folders of frames.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pano_ops::{EffectKind, Filter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "pano")]
#[command(author, version, about = "Curved panorama views and image utilities")]
#[command(long_about = "
Curved views for stitched panoramas, plus the small image utilities
needed around them.

Examples:
  pano curve pano.jpg -o curved.jpg                 # Padded cylinder remap
  pano curve pano.jpg -o curved.png --curvature 0.15 --pad 0.2
  pano cylinder pano.jpg -o legacy.jpg --focal 1200 # Legacy forward projection
  pano barrel pano.jpg -o wrap.jpg --strength 0.4
  pano batch -i frames/ -d out/ -e cylinder --suffix _curved
  pano batch -i 'shots/*.png' -d out/ -e barrel --format jpg --max 100
  pano convert frame.bmp frame.png
  pano resize pano.jpg -o small.jpg -s 0.5 -f lanczos -q 85
  pano crop curved.png -o center.png -x 100 -y 50 -w 1920 -H 1080
  pano --config rig.yaml batch -i frames/ -d out/
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log: Option<PathBuf>,

    /// YAML preset with default effect parameters
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JPEG output quality, 1-100 [default: 95]
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap a panorama around a cylinder (padded, auto-scaled)
    #[command(visible_alias = "cv")]
    Curve(CurveArgs),

    /// Legacy forward cylindrical projection (same-size canvas)
    Cylinder(CylinderArgs),

    /// Apply barrel distortion
    Barrel(BarrelArgs),

    /// Apply an effect to every image in a folder or glob
    Batch(BatchArgs),

    /// Convert image format
    #[command(visible_alias = "c")]
    Convert(ConvertArgs),

    /// Resize/scale image
    #[command(visible_alias = "r")]
    Resize(ResizeArgs),

    /// Crop image
    Crop(CropArgs),
}

#[derive(Args)]
struct CurveArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Focal length as a fraction of the padded width [default: 0.2]
    #[arg(long)]
    curvature: Option<f64>,

    /// Black border on each side, as a fraction of the size [default: 0.3]
    #[arg(long)]
    pad: Option<f64>,
}

#[derive(Args)]
struct CylinderArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Focal length in pixels [default: image width]
    #[arg(long)]
    focal: Option<f64>,
}

#[derive(Args)]
struct BarrelArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Distortion strength, 0 = none [default: 0.3]
    #[arg(long)]
    strength: Option<f64>,
}

#[derive(Args)]
struct BatchArgs {
    /// Input folder or glob pattern (e.g., "frames/*.jpg")
    #[arg(short, long)]
    input: String,

    /// Output directory
    #[arg(short = 'd', long)]
    output_dir: PathBuf,

    /// Effect: cylinder, cylinder-forward, barrel
    #[arg(short, long, default_value = "cylinder")]
    effect: EffectKind,

    /// Cylinder curvature factor
    #[arg(long)]
    curvature: Option<f64>,

    /// Cylinder pad ratio
    #[arg(long)]
    pad: Option<f64>,

    /// Forward-projection focal length in pixels
    #[arg(long)]
    focal: Option<f64>,

    /// Barrel strength
    #[arg(long)]
    strength: Option<f64>,

    /// Output format extension (e.g., png); keeps the input format if unset
    #[arg(short, long)]
    format: Option<String>,

    /// Suffix appended to output file names
    #[arg(long)]
    suffix: Option<String>,

    /// Process at most this many images
    #[arg(long)]
    max: Option<usize>,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input image
    input: PathBuf,

    /// Output image (format from extension)
    output: PathBuf,
}

#[derive(Args)]
struct ResizeArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Target width
    #[arg(short, long)]
    width: Option<usize>,

    /// Target height
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Scale factor (e.g., 0.5, 2.0)
    #[arg(short, long, conflicts_with_all = ["width", "height"])]
    scale: Option<f32>,

    /// Filter: nearest, bilinear, bicubic, lanczos
    #[arg(short, long, default_value = "lanczos")]
    filter: Filter,
}

#[derive(Args)]
struct CropArgs {
    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// X offset
    #[arg(short)]
    x: usize,

    /// Y offset
    #[arg(short)]
    y: usize,

    /// Width
    #[arg(short)]
    w: usize,

    /// Height
    #[arg(short = 'H')]
    h: usize,
}

/// Installs the stderr subscriber and, with `--log`, a file writer.
///
/// `RUST_LOG` takes precedence over the `-v` level. The returned guard
/// flushes the file writer when dropped.
fn init_logging(verbose: u8, log_file: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            Ok(None)
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log.as_ref())?;

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let preset = match &cli.config {
        Some(path) => config::Preset::load(path)?,
        None => config::Preset::default(),
    };

    let write = preset.write_options(cli.quality);

    match cli.command {
        Commands::Curve(args) => commands::curve::run(args, &preset, &write, cli.verbose),
        Commands::Cylinder(args) => commands::cylinder::run(args, &preset, &write, cli.verbose),
        Commands::Barrel(args) => commands::barrel::run(args, &preset, &write, cli.verbose),
        Commands::Batch(args) => commands::batch::run(args, &preset, &write, cli.verbose),
        Commands::Convert(args) => commands::convert::run(args, &write, cli.verbose),
        Commands::Resize(args) => commands::resize::run(args, &write, cli.verbose),
        Commands::Crop(args) => commands::crop::run(args, &write, cli.verbose),
    }
}
