use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use barcode_locator_lib::{
    run_batch, write_regions_csv, BatchOptions, Config, StagePreview, StepControl,
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "Barcode Locator - finds barcode-like regions in photographs")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Binarization threshold (overwrites config)
    #[clap(short, long)]
    threshold: Option<u8>,

    /// Minimum accepted box area in pixels (overwrites config)
    #[clap(long)]
    min_area: Option<f64>,

    /// Minimum accepted width/height ratio (overwrites config)
    #[clap(long)]
    min_aspect_ratio: Option<f64>,

    /// Enable debug mode (save intermediate images and print more info)
    #[clap(short, long)]
    debug: bool,

    /// Show every stage in a window and wait for SPACE (next) or Q (quit)
    #[clap(short, long)]
    preview: bool,

    /// Process files one after another even if the config enables parallelism
    #[clap(long)]
    sequential: bool,
}

fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Ok(Config::from_file(path)?)
    } else {
        warn!("Config file '{}' not found, using built-in defaults", path);
        Ok(Config::default())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = load_config(&args.config)?;

    // Override config with command-line arguments
    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }
    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }
    if let Some(threshold) = args.threshold {
        config.pipeline.threshold_value = threshold;
    }
    if let Some(min_area) = args.min_area {
        config.pipeline.min_area = min_area;
    }
    if let Some(min_aspect_ratio) = args.min_aspect_ratio {
        config.pipeline.min_aspect_ratio = min_aspect_ratio;
    }
    if args.sequential {
        config.use_parallel = false;
    }

    config.validate()?;
    let pipeline = config.pipeline_config()?;

    let start_time = Instant::now();

    let mut preview = StagePreview::new(config.preview_width);
    let control: Option<&mut dyn StepControl> = if args.preview {
        Some(&mut preview)
    } else {
        None
    };

    let options = BatchOptions { debug: args.debug };
    let report = run_batch(&config, &pipeline, options, control)
        .with_context(|| format!("Batch over '{}' failed", config.input_path))?;

    if config.write_csv_report && !report.outcomes.is_empty() {
        let csv_path = write_regions_csv(&report, &config.output_base_dir)
            .context("Failed to write the region report")?;
        info!("Region report written to {}", csv_path.display());
    }

    info!(
        "{} file(s) processed, {} failed, {} region(s) found in {:.2} seconds",
        report.processed_count(),
        report.failed_count(),
        report.total_regions(),
        start_time.elapsed().as_secs_f64()
    );
    if report.stopped_early {
        info!("Stopped on request before the end of the batch");
    }

    Ok(())
}
