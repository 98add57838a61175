//! fillgauge CLI — measure food fill level and volume from a photo.

mod overlay;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use fillgauge::{FillConfig, FillGauge, MeasureRequest, RadiusBounds, UtensilHint};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "fillgauge")]
#[command(about = "Estimate how full a bowl, plate or cup is from a single photo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the rim, segment food and estimate fill / volume.
    Measure(CliMeasureArgs),

    /// Print the default configuration as JSON.
    DefaultConfig,
}

#[derive(Debug, Clone, Args)]
struct CliMeasureArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Utensil type: auto, bowl, plate or cup.
    #[arg(long, default_value = "auto")]
    utensil: UtensilHint,

    /// Known rim diameter in mm; enables the volume estimate.
    #[arg(long)]
    diameter_mm: Option<f64>,

    /// Assumed food height at full fill, in mm (default from config, 15).
    #[arg(long)]
    assumed_height_mm: Option<f64>,

    /// Smallest plausible rim radius in pixels (default: max(30, short side / 8)).
    #[arg(long)]
    min_radius: Option<f64>,

    /// Largest plausible rim radius in pixels (default: max(60, short side / 2)).
    #[arg(long)]
    max_radius: Option<f64>,

    /// JSON config override; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the report (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Path to write the annotated image (PNG).
    #[arg(long)]
    overlay: Option<PathBuf>,

    /// Path to write the binary food mask (PNG).
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Path to write the rim-detection trace (JSON).
    #[arg(long)]
    debug_json: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Measure(args) => run_measure(&args),
        Commands::DefaultConfig => run_default_config(),
    }
}

fn run_default_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&FillConfig::default())?);
    Ok(())
}

fn run_measure(args: &CliMeasureArgs) -> CliResult<()> {
    let config = match &args.config {
        Some(path) => {
            tracing::info!("Loading config: {}", path.display());
            FillConfig::from_json_file(path)?
        }
        None => FillConfig::default(),
    };

    tracing::info!("Loading image: {}", args.image.display());
    let frame = image::open(&args.image)?.to_rgb8();
    let (w, h) = frame.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let mut request = MeasureRequest::new(args.utensil);
    request.diameter_mm = args.diameter_mm;
    request.assumed_height_mm = args.assumed_height_mm;
    if args.min_radius.is_some() || args.max_radius.is_some() {
        let defaults = RadiusBounds::for_frame(w, h);
        request.radius_bounds = Some(RadiusBounds {
            min_radius: args.min_radius.unwrap_or(defaults.min_radius),
            max_radius: args.max_radius.unwrap_or(defaults.max_radius),
        });
    }

    let gauge = FillGauge::new(config);
    let (report, rim_debug) = gauge.measure_with_debug(&frame, &request)?;

    match &report.ellipse {
        Some(e) => tracing::info!(
            "Rim: center ({:.1}, {:.1}), axes {:.1} x {:.1} px, angle {:.1} deg",
            e.cx(),
            e.cy(),
            e.major(),
            e.minor(),
            e.angle_deg()
        ),
        None => tracing::warn!("{}", report.status.message()),
    }
    for line in overlay::summary_lines(&report) {
        tracing::info!("{line}");
    }

    let json = serde_json::to_string_pretty(&report)?;
    match &args.out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }

    if let Some(path) = &args.debug_json {
        std::fs::write(path, serde_json::to_string_pretty(&rim_debug)?)?;
        tracing::info!("Rim trace written to {}", path.display());
    }

    if let Some(path) = &args.mask {
        match &report.mask {
            Some(mask) => {
                mask.as_image().save(path)?;
                tracing::info!("Mask written to {}", path.display());
            }
            None => tracing::warn!("No mask to write ({:?})", report.status),
        }
    }

    if let Some(path) = &args.overlay {
        overlay::render(&frame, &report).save(path)?;
        tracing::info!("Overlay written to {}", path.display());
    }

    Ok(())
}
