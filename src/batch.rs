// src/batch.rs - Driver: walks the input folder and runs the pipeline once per file

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::config::{Config, PipelineConfig};
use crate::errors::{BarcodeError, Result};
use crate::image_io::{get_image_files_in_dir, load_image, output_path_for, InputImage};
use crate::pipeline::{detect_regions, detect_regions_staged, Detection, StageImages};
use crate::regions::Region;

/// Answer of a [`StepControl`] after each image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Everything produced for one successfully processed file
pub struct ProcessedImage {
    pub input: InputImage,
    pub detection: Detection,
    pub stages: Option<StageImages>,
    pub output_path: PathBuf,
}

/// Gate consulted between images; the pipeline itself never sees it
pub trait StepControl {
    /// Whether intermediate stage images should be kept for [`StepControl::after_image`]
    fn wants_stages(&self) -> bool {
        false
    }

    fn after_image(&mut self, processed: &ProcessedImage) -> Result<Flow>;
}

/// Never pauses, never stops
pub struct Unattended;

impl StepControl for Unattended {
    fn after_image(&mut self, _processed: &ProcessedImage) -> Result<Flow> {
        Ok(Flow::Continue)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Processed {
        path: PathBuf,
        output_path: PathBuf,
        regions: Vec<Region>,
    },
    Failed {
        path: PathBuf,
        error: String,
    },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Processed { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// One entry per attempted file, in input order
    pub outcomes: Vec<FileOutcome>,
    /// Set when a control asked to stop before the last file
    pub stopped_early: bool,
}

impl BatchReport {
    pub fn processed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Processed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.processed_count()
    }

    pub fn total_regions(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                FileOutcome::Processed { regions, .. } => regions.len(),
                FileOutcome::Failed { .. } => 0,
            })
            .sum()
    }
}

/// Per-run switches that do not belong in the configuration file
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Save every intermediate stage under `<output>/debug`
    pub debug: bool,
}

/// Load, detect and save one file
pub fn process_file(
    path: &Path,
    config: &Config,
    pipeline: &PipelineConfig,
    keep_stages: bool,
    options: BatchOptions,
) -> Result<ProcessedImage> {
    let input = load_image(path)?;
    let output_dir = PathBuf::from(&config.output_base_dir);

    let (detection, stages) = if keep_stages || options.debug {
        let (detection, stages) = detect_regions_staged(&input.image, pipeline)?;
        (detection, Some(stages))
    } else {
        (detect_regions(&input.image, pipeline)?, None)
    };

    let output_path = output_path_for(path, &output_dir, &config.output_prefix);
    detection.annotated.save(&output_path)?;

    if options.debug {
        if let Some(stages) = &stages {
            save_stage_images(&input, stages, &output_dir.join("debug"))?;
        }
    }

    info!("{}: {} region(s) found", input.filename, detection.count());

    Ok(ProcessedImage {
        input,
        detection,
        stages: if keep_stages { stages } else { None },
        output_path,
    })
}

fn save_stage_images(input: &InputImage, stages: &StageImages, debug_dir: &Path) -> Result<()> {
    fs::create_dir_all(debug_dir)?;
    for (name, image) in stages.named() {
        let path = debug_dir.join(format!("{}_{}.png", input.stem(), name));
        image.save(&path)?;
        debug!("Saved {}", path.display());
    }
    Ok(())
}

fn outcome_for(path: &Path, result: &Result<ProcessedImage>) -> FileOutcome {
    match result {
        Ok(processed) => FileOutcome::Processed {
            path: path.to_path_buf(),
            output_path: processed.output_path.clone(),
            regions: processed.detection.regions.clone(),
        },
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            FileOutcome::Failed {
                path: path.to_path_buf(),
                error: e.to_string(),
            }
        }
    }
}

/// Find the input files named by the configuration
pub fn collect_inputs(config: &Config) -> Result<Vec<PathBuf>> {
    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        Ok(vec![input_path])
    } else if input_path.is_dir() {
        get_image_files_in_dir(&input_path, &config.extensions, config.recursive)
    } else {
        Err(BarcodeError::InvalidPath(input_path))
    }
}

/// Process files one at a time, asking `control` after each whether to go on.
///
/// A file that cannot be decoded or processed is recorded as failed and the batch moves on.
pub fn run_sequential(
    files: &[PathBuf],
    config: &Config,
    pipeline: &PipelineConfig,
    options: BatchOptions,
    control: &mut dyn StepControl,
) -> Result<BatchReport> {
    let mut report = BatchReport::default();
    let keep_stages = control.wants_stages();

    for (index, path) in files.iter().enumerate() {
        info!("Processing: {}", path.display());
        let result = process_file(path, config, pipeline, keep_stages, options);
        report.outcomes.push(outcome_for(path, &result));

        if let Ok(processed) = result {
            if control.after_image(&processed)? == Flow::Stop {
                report.stopped_early = index + 1 < files.len();
                info!("Stopped after {}", processed.input.filename);
                break;
            }
        }
    }

    Ok(report)
}

/// Process files on the rayon pool; the report keeps input order
pub fn run_parallel(
    files: &[PathBuf],
    config: &Config,
    pipeline: &PipelineConfig,
    options: BatchOptions,
) -> BatchReport {
    let outcomes = files
        .par_iter()
        .map(|path| {
            info!("Processing: {}", path.display());
            let result = process_file(path, config, pipeline, false, options);
            outcome_for(path, &result)
        })
        .collect();

    BatchReport { outcomes, stopped_early: false }
}

/// Run the whole batch described by `config`.
///
/// With `control` set, files are processed one by one and the control decides after each
/// whether to continue; without it files go through rayon when `use_parallel` is set.
pub fn run_batch(
    config: &Config,
    pipeline: &PipelineConfig,
    options: BatchOptions,
    control: Option<&mut dyn StepControl>,
) -> Result<BatchReport> {
    let files = collect_inputs(config)?;
    if files.is_empty() {
        warn!("No images found in {}", config.input_path);
        return Ok(BatchReport::default());
    }
    info!("Found {} image(s)", files.len());

    fs::create_dir_all(&config.output_base_dir)?;

    match control {
        Some(control) => run_sequential(&files, config, pipeline, options, control),
        None if config.use_parallel => Ok(run_parallel(&files, config, pipeline, options)),
        None => run_sequential(&files, config, pipeline, options, &mut Unattended),
    }
}
