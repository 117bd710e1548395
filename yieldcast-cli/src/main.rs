//! Yieldcast CLI — crop yield estimates and per-region yield maps.
//!
//! `predict` and `map` are independent: a missing historical table or region
//! geometry never affects `predict`, and a missing model never affects `map`.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Yieldcast: crop yield estimates from soil and weather readings
#[derive(Parser, Debug)]
#[command(name = "yieldcast", version, about, long_about = None)]
struct Cli {
    /// Workspace directory (relative artifact and data paths resolve here)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Extra configuration file, layered above workspace config and environment
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Estimate yield for one crop from soil and weather readings
    Predict(PredictArgs),
    /// Export mean historical yield for every region, ready for a choropleth
    Map(MapArgs),
    /// List the crops the model understands
    Crops,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
struct PredictArgs {
    /// Crop to estimate (chickpea, cotton, maize, rice)
    #[arg(long)]
    crop: String,

    /// Nitrogen (kg/ha)
    #[arg(short = 'n', long, default_value_t = 90.0)]
    nitrogen: f64,

    /// Phosphorus (kg/ha)
    #[arg(short = 'p', long, default_value_t = 40.0)]
    phosphorus: f64,

    /// Potassium (kg/ha)
    #[arg(short = 'k', long, default_value_t = 40.0)]
    potassium: f64,

    /// Soil pH
    #[arg(long, default_value_t = 6.5)]
    ph: f64,

    /// Rainfall (mm)
    #[arg(long, default_value_t = 1000.0)]
    rainfall: f64,

    /// Temperature (°C)
    #[arg(long, default_value_t = 27.0)]
    temperature: f64,

    /// Relative humidity (%)
    #[arg(long, default_value_t = 75.0)]
    humidity: f64,

    /// Wind speed (m/s)
    #[arg(long, default_value_t = 2.5)]
    wind: f64,

    /// Solar radiation (MJ/m²/day)
    #[arg(long, default_value_t = 18.0)]
    radiation: f64,

    /// Model artifact (overrides `artifacts.model_path`)
    #[arg(long)]
    model: Option<PathBuf>,

    /// Fitted column list, `.json` or `.pkl` (overrides `artifacts.schema_path`)
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Print the prediction as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct MapArgs {
    /// Crop to summarize
    #[arg(long)]
    crop: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = MapFormat::Csv)]
    format: MapFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum MapFormat {
    /// `region,yield` rows
    Csv,
    /// Choropleth payload with title, join key, and color scale
    Json,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create default configuration file
    Init,
    /// Show current configuration
    Show,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "yieldcast", "yieldcast")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "yieldcast.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.config.as_deref())
}
