use image::{GrayImage, Luma};
use imageproc::filter::box_filter;

use crate::config::PipelineConfig;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

/// Box average over an odd `[width, height]` window
pub fn box_blur(image: &GrayImage, kernel_size: [u32; 2]) -> GrayImage {
    let [kernel_w, kernel_h] = kernel_size;
    box_filter(image, kernel_w / 2, kernel_h / 2)
}

/// Global binary threshold: `>= threshold` is foreground
pub fn threshold_mask(image: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = image.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if image.get_pixel(x, y)[0] >= threshold {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Blur the gradient image, then cut it into a foreground/background mask
pub fn binarize(gradient: &GrayImage, config: &PipelineConfig) -> GrayImage {
    let blurred = box_blur(gradient, config.blur_kernel_size());
    threshold_mask(&blurred, config.threshold_value())
}
