// src/config.rs - Driver configuration and the validated pipeline parameters

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{BarcodeError, Result};

/// Configuration for the barcode locator, as read from `config.toml`
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_input_path")]
    pub input_path: String,

    #[serde(default = "default_output_base_dir")]
    pub output_base_dir: String,

    /// File extensions (without the dot) picked up from the input folder
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub recursive: bool,

    /// Prepended to the input file name when writing the annotated copy
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Maximum width of a single stage tile in the preview window
    #[serde(default = "default_preview_width")]
    pub preview_width: u32,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    #[serde(default = "default_write_csv_report")]
    pub write_csv_report: bool,

    #[serde(default)]
    pub pipeline: PipelineSettings,
}

/// Raw, unvalidated pipeline parameters.
///
/// Turn these into a [`PipelineConfig`] with `PipelineConfig::try_from`; that is the only
/// place the values are checked, so every image sees the same validated parameters.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    /// Binarization cutoff: blurred gradient values at or above it become foreground
    pub threshold_value: u8,
    /// Box blur extent (width, height), both odd
    pub blur_kernel_size: [u32; 2],
    /// Closing element (width, height); wide and short bridges the gaps between bars
    pub morph_kernel_size: [u32; 2],
    /// Erosion rounds, followed by the same number of dilation rounds
    pub morph_iterations: u32,
    /// Bounding box area must be strictly greater than this
    pub min_area: f64,
    /// Bounding box width/height must be strictly greater than this
    pub min_aspect_ratio: f64,
    pub box_color_rgb: [u8; 3],
    pub box_thickness: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            threshold_value: 225,
            blur_kernel_size: [9, 9],
            morph_kernel_size: [21, 7],
            morph_iterations: 4,
            min_area: 2000.0,
            min_aspect_ratio: 1.5,
            box_color_rgb: [0, 255, 0], // Green
            box_thickness: 3,
        }
    }
}

/// Validated, immutable pipeline parameters
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(try_from = "PipelineSettings", into = "PipelineSettings")]
pub struct PipelineConfig {
    threshold_value: u8,
    blur_kernel_size: [u32; 2],
    morph_kernel_size: [u32; 2],
    morph_iterations: u32,
    min_area: f64,
    min_aspect_ratio: f64,
    box_color_rgb: [u8; 3],
    box_thickness: u32,
}

impl TryFrom<PipelineSettings> for PipelineConfig {
    type Error = BarcodeError;

    fn try_from(settings: PipelineSettings) -> Result<Self> {
        if settings.threshold_value == 0 {
            return Err(BarcodeError::Config(
                "threshold_value must be between 1 and 255".to_string(),
            ));
        }

        let [blur_w, blur_h] = settings.blur_kernel_size;
        if blur_w == 0 || blur_h == 0 || blur_w % 2 == 0 || blur_h % 2 == 0 {
            return Err(BarcodeError::Config(format!(
                "blur_kernel_size must be odd in both dimensions, got {}x{}",
                blur_w, blur_h
            )));
        }

        let [morph_w, morph_h] = settings.morph_kernel_size;
        if morph_w == 0 || morph_h == 0 {
            return Err(BarcodeError::Config(format!(
                "morph_kernel_size must be > 0 in both dimensions, got {}x{}",
                morph_w, morph_h
            )));
        }

        if !settings.min_area.is_finite() || settings.min_area <= 0.0 {
            return Err(BarcodeError::Config(format!(
                "min_area must be a positive number, got {}",
                settings.min_area
            )));
        }

        if !settings.min_aspect_ratio.is_finite() || settings.min_aspect_ratio <= 0.0 {
            return Err(BarcodeError::Config(format!(
                "min_aspect_ratio must be a positive number, got {}",
                settings.min_aspect_ratio
            )));
        }

        if settings.box_thickness == 0 {
            return Err(BarcodeError::Config(
                "box_thickness must be > 0".to_string(),
            ));
        }

        Ok(Self::from_settings_unchecked(settings))
    }
}

impl From<PipelineConfig> for PipelineSettings {
    fn from(config: PipelineConfig) -> Self {
        Self {
            threshold_value: config.threshold_value,
            blur_kernel_size: config.blur_kernel_size,
            morph_kernel_size: config.morph_kernel_size,
            morph_iterations: config.morph_iterations,
            min_area: config.min_area,
            min_aspect_ratio: config.min_aspect_ratio,
            box_color_rgb: config.box_color_rgb,
            box_thickness: config.box_thickness,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        // The built-in defaults are always valid
        Self::from_settings_unchecked(PipelineSettings::default())
    }
}

impl PipelineConfig {
    fn from_settings_unchecked(settings: PipelineSettings) -> Self {
        Self {
            threshold_value: settings.threshold_value,
            blur_kernel_size: settings.blur_kernel_size,
            morph_kernel_size: settings.morph_kernel_size,
            morph_iterations: settings.morph_iterations,
            min_area: settings.min_area,
            min_aspect_ratio: settings.min_aspect_ratio,
            box_color_rgb: settings.box_color_rgb,
            box_thickness: settings.box_thickness,
        }
    }

    pub fn threshold_value(&self) -> u8 {
        self.threshold_value
    }

    pub fn blur_kernel_size(&self) -> [u32; 2] {
        self.blur_kernel_size
    }

    pub fn morph_kernel_size(&self) -> [u32; 2] {
        self.morph_kernel_size
    }

    pub fn morph_iterations(&self) -> u32 {
        self.morph_iterations
    }

    pub fn min_area(&self) -> f64 {
        self.min_area
    }

    pub fn min_aspect_ratio(&self) -> f64 {
        self.min_aspect_ratio
    }

    pub fn box_color_rgb(&self) -> [u8; 3] {
        self.box_color_rgb
    }

    pub fn box_thickness(&self) -> u32 {
        self.box_thickness
    }

    /// Smallest (width, height) an input needs so that every kernel fits inside it
    pub fn min_image_dimensions(&self) -> (u32, u32) {
        (
            self.blur_kernel_size[0].max(self.morph_kernel_size[0]),
            self.blur_kernel_size[1].max(self.morph_kernel_size[1]),
        )
    }
}

fn default_input_path() -> String {
    "./input".to_string()
}

fn default_output_base_dir() -> String {
    "./output".to_string()
}

fn default_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "bmp"].iter().map(|s| s.to_string()).collect()
}

fn default_output_prefix() -> String {
    "processed_".to_string()
}

fn default_preview_width() -> u32 {
    400
}

fn default_parallel() -> bool {
    true
}

fn default_write_csv_report() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_base_dir: default_output_base_dir(),
            extensions: default_extensions(),
            recursive: false,
            output_prefix: default_output_prefix(),
            preview_width: default_preview_width(),
            use_parallel: default_parallel(),
            write_csv_report: default_write_csv_report(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BarcodeError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| BarcodeError::ConfigLoad {
            source: e,
            path: path.to_path_buf(),
        })?;

        Ok(config)
    }

    /// Build the validated pipeline parameters from the `[pipeline]` table
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        PipelineConfig::try_from(self.pipeline)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.pipeline_config()?;

        if self.extensions.is_empty() {
            return Err(BarcodeError::Config(
                "extensions must list at least one file extension".to_string(),
            ));
        }

        if self.preview_width == 0 {
            return Err(BarcodeError::Config(
                "preview_width must be > 0".to_string(),
            ));
        }

        // An empty prefix writing into the input folder would overwrite the originals
        if self.output_prefix.is_empty()
            && PathBuf::from(&self.input_path) == PathBuf::from(&self.output_base_dir)
        {
            return Err(BarcodeError::Config(
                "output_prefix must not be empty when output_base_dir equals input_path".to_string(),
            ));
        }

        Ok(())
    }
}
