// src/lib.rs - Library interface for the barcode locator

pub mod batch;
pub mod binarize;
pub mod config;
pub mod errors;
pub mod gradient;
pub mod image_io;
pub mod morphology;
pub mod output;
pub mod pipeline;
pub mod preview;
pub mod regions;

// Re-export commonly used types and functions
pub use errors::{BarcodeError, Result};
pub use config::{Config, PipelineConfig, PipelineSettings};
pub use pipeline::{detect_regions, detect_regions_staged, Detection, StageImages};
pub use regions::Region;
pub use image_io::{InputImage, load_image, save_image};

// Re-export the driver
pub use batch::{
    run_batch,
    BatchOptions,
    BatchReport,
    FileOutcome,
    Flow,
    StepControl,
    Unattended,
};
pub use preview::StagePreview;
pub use output::write_regions_csv;
