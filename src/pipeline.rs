// src/pipeline.rs - The pure detection pipeline: image + configuration -> regions + annotated image

use image::{DynamicImage, GenericImageView, GrayImage, RgbImage};
use log::debug;

use crate::binarize::binarize;
use crate::config::PipelineConfig;
use crate::errors::{BarcodeError, Result};
use crate::gradient::{directional_gradient, to_grayscale};
use crate::morphology::consolidate;
use crate::regions::{annotate, extract_candidates, select_regions, Region};

/// Result of running the pipeline on one image
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Accepted regions, one drawn rectangle each
    pub regions: Vec<Region>,
    /// Copy of the input with the accepted regions outlined
    pub annotated: RgbImage,
    /// External contours examined before filtering
    pub contours_found: usize,
}

impl Detection {
    pub fn count(&self) -> usize {
        self.regions.len()
    }
}

/// Intermediate images, kept only when someone wants to look at them
#[derive(Debug, Clone)]
pub struct StageImages {
    pub grayscale: GrayImage,
    pub gradient: GrayImage,
    pub binary: GrayImage,
    pub consolidated: GrayImage,
}

impl StageImages {
    /// Stage name and image, in pipeline order
    pub fn named(&self) -> [(&'static str, &GrayImage); 4] {
        [
            ("grayscale", &self.grayscale),
            ("gradient", &self.gradient),
            ("binary", &self.binary),
            ("consolidated", &self.consolidated),
        ]
    }
}

fn check_dimensions(image: &DynamicImage, config: &PipelineConfig) -> Result<()> {
    let (min_width, min_height) = config.min_image_dimensions();
    let (width, height) = image.dimensions();
    if width < min_width || height < min_height {
        return Err(BarcodeError::ImageTooSmall { width, height, min_width, min_height });
    }
    Ok(())
}

/// Locate barcode-like regions in `image`.
///
/// Deterministic and free of side effects: the same image and configuration always give
/// the same regions and the same annotated pixels.
pub fn detect_regions(image: &DynamicImage, config: &PipelineConfig) -> Result<Detection> {
    check_dimensions(image, config)?;

    let mask = {
        let gradient = directional_gradient(&to_grayscale(image));
        let binary = binarize(&gradient, config);
        consolidate(&binary, config)
    };

    Ok(finish(image, &mask, config))
}

/// Same as [`detect_regions`], additionally returning every intermediate image
pub fn detect_regions_staged(
    image: &DynamicImage,
    config: &PipelineConfig,
) -> Result<(Detection, StageImages)> {
    check_dimensions(image, config)?;

    let grayscale = to_grayscale(image);
    let gradient = directional_gradient(&grayscale);
    let binary = binarize(&gradient, config);
    let consolidated = consolidate(&binary, config);

    let detection = finish(image, &consolidated, config);
    Ok((detection, StageImages { grayscale, gradient, binary, consolidated }))
}

fn finish(image: &DynamicImage, mask: &GrayImage, config: &PipelineConfig) -> Detection {
    let candidates = extract_candidates(mask);
    let regions = select_regions(&candidates, config);
    debug!(
        "{} external contours, {} accepted (min_area {}, min_aspect_ratio {})",
        candidates.len(),
        regions.len(),
        config.min_area(),
        config.min_aspect_ratio()
    );

    let annotated = annotate(&image.to_rgb8(), &regions, config);

    Detection {
        regions,
        annotated,
        contours_found: candidates.len(),
    }
}
