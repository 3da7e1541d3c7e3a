use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

use dataset_prep::{process_dataset, split_dataset, NormalizeConfig, SplitConfig, TargetSize};

/// Prepare an image classification dataset
#[derive(Parser, Debug)]
#[command(name = "dataset-prep", version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Maximum number of worker threads
    #[arg(short = 'j', long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resize, grayscale and intensity-stretch every class image
    Normalize(NormalizeArgs),
    /// Copy each class into train/val/test folders by ratio
    Split(SplitArgs),
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    /// JSON config file (flags below override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input root with one folder per class
    #[arg(long)]
    dataset_dir: Option<PathBuf>,

    /// Output root
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Output width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Accepted extension (repeatable), e.g. --ext png --ext jpg
    #[arg(long = "ext")]
    extensions: Vec<String>,
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// JSON config file (flags below override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input root with one folder per class
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Output root for train/val/test
    #[arg(long)]
    target_dir: Option<PathBuf>,

    #[arg(long)]
    train_ratio: Option<f64>,

    #[arg(long)]
    val_ratio: Option<f64>,

    #[arg(long)]
    test_ratio: Option<f64>,

    /// Shuffle seed for a reproducible split
    #[arg(long)]
    seed: Option<u64>,

    /// Accepted extension (repeatable)
    #[arg(long = "ext")]
    extensions: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Normalize(ref args) => run_normalize(&cli, args),
        Commands::Split(ref args) => run_split(&cli, args),
    }
}

fn run_normalize(cli: &Cli, args: &NormalizeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => NormalizeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => NormalizeConfig::default(),
    };

    if let Some(dir) = &args.dataset_dir {
        config.dataset_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    config.target_size = TargetSize {
        width: args.width.unwrap_or(config.target_size.width),
        height: args.height.unwrap_or(config.target_size.height),
    };
    if !args.extensions.is_empty() {
        config.valid_extensions = args.extensions.clone();
    }
    apply_common(cli, &mut config.max_workers, &mut config.show_progress);

    if !config.dataset_dir.exists() {
        println!("❌ Source directory not found: {}", config.dataset_dir.display());
        return Ok(());
    }

    process_dataset(&config).context("Normalization failed")?;
    Ok(())
}

fn run_split(cli: &Cli, args: &SplitArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SplitConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SplitConfig::default(),
    };

    if let Some(dir) = &args.source_dir {
        config.source_dir = dir.clone();
    }
    if let Some(dir) = &args.target_dir {
        config.target_dir = dir.clone();
    }
    if let Some(r) = args.train_ratio {
        config.train_ratio = r;
    }
    if let Some(r) = args.val_ratio {
        config.val_ratio = r;
    }
    if let Some(r) = args.test_ratio {
        config.test_ratio = r;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if !args.extensions.is_empty() {
        config.valid_extensions = args.extensions.clone();
    }
    apply_common(cli, &mut config.max_workers, &mut config.show_progress);

    // Ratios are a configuration error even when the source is missing
    config.validate().context("Invalid split ratios")?;

    if !config.source_dir.exists() {
        println!("❌ Source directory not found: {}", config.source_dir.display());
        return Ok(());
    }

    split_dataset(&config).context("Split failed")?;
    Ok(())
}

fn apply_common(cli: &Cli, max_workers: &mut Option<usize>, show_progress: &mut bool) {
    if cli.workers.is_some() {
        *max_workers = cli.workers;
    }
    if cli.quiet {
        *show_progress = false;
    }
}
