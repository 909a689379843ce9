use thiserror::Error;
use std::io;
use std::path::PathBuf;

/// Custom error types for the barcode locator
#[derive(Error, Debug)]
pub enum BarcodeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Image is {width}x{height} but the pipeline needs at least {min_width}x{min_height}")]
    ImageTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Preview window error: {0}")]
    Preview(String),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, BarcodeError>;
