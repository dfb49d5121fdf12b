//! prism - histogram analysis and color grading from the command line.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use prism_cli::CliConfig;
use prism_cli::commands::{self, grade::GradeArgs, histogram::HistogramArgs, info::InfoArgs};

#[derive(Parser)]
#[command(name = "prism")]
#[command(author, version, about = "Image histograms and brightness/contrast/exposure grading")]
#[command(long_about = "
Count per-channel histograms and apply a simple color grade.

Examples:
  prism info photo.png                        # Dimensions and channel means
  prism histogram photo.png --plot hist.png   # Render the RGB histogram
  prism histogram photo.png --bins 64 --json bins.json
  prism grade photo.png -o out.png --exposure 0.5 --contrast 0.2
  prism grade photo.png -o out.png --preset look.json --linearize --gpu

Environment:
  PRISM_BINS          default histogram bins (256)
  PRISM_PLOT_HEIGHT   default plot height (100)
  PRISM_GPU           set to prefer the GPU path
  RUST_LOG            log filter, overrides -v
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Display image dimensions and channel means
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Count and export the R, G, B histogram
    #[command(visible_alias = "hist")]
    Histogram(HistogramArgs),

    /// Apply brightness, contrast and exposure
    #[command(visible_alias = "g")]
    Grade(GradeArgs),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let config = CliConfig::default();
    tracing::debug!(?config, "resolved configuration");

    match cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Histogram(args) => commands::histogram::run(args, &config),
        Commands::Grade(args) => commands::grade::run(args, &config),
    }
}
