use barcode_locator_lib::{PipelineConfig, PipelineSettings};
use image::{DynamicImage, Rgb, RgbImage};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Placement of the synthetic barcode drawn by [`barcode_image`]
pub const BARCODE_X: u32 = 120;
pub const BARCODE_Y: u32 = 80;
pub const BARCODE_WIDTH: u32 = 240;
pub const BARCODE_HEIGHT: u32 = 80;

/// Placement of the solid rectangle drawn by [`rectangle_image`]
pub const RECT_X: u32 = 100;
pub const RECT_Y: u32 = 75;

/// 480x240 white image with 2px black bars every 4px inside the barcode area
pub fn barcode_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(480, 240, |x, y| {
        let inside = x >= BARCODE_X
            && x < BARCODE_X + BARCODE_WIDTH
            && y >= BARCODE_Y
            && y < BARCODE_Y + BARCODE_HEIGHT;
        if inside && (x - BARCODE_X) % 4 < 2 {
            BLACK
        } else {
            WHITE
        }
    }))
}

/// Rows covered by the stripes of [`left_edge_barcode_image`]
pub const EDGE_BARCODE_Y: u32 = 20;
pub const EDGE_BARCODE_WIDTH: u32 = 200;
pub const EDGE_BARCODE_HEIGHT: u32 = 80;

/// 300x120 white image whose bars start in the very first column, as in a cropped photo
pub fn left_edge_barcode_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(300, 120, |x, y| {
        let inside = x < EDGE_BARCODE_WIDTH
            && y >= EDGE_BARCODE_Y
            && y < EDGE_BARCODE_Y + EDGE_BARCODE_HEIGHT;
        if inside && x % 4 < 2 {
            BLACK
        } else {
            WHITE
        }
    }))
}

/// 400x200 black image with one solid white 200x50 rectangle
pub fn rectangle_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(400, 200, |x, y| {
        if (RECT_X..RECT_X + 200).contains(&x) && (RECT_Y..RECT_Y + 50).contains(&y) {
            WHITE
        } else {
            BLACK
        }
    }))
}

/// Uniform mid-gray image
pub fn blank_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(320, 240, Rgb([128, 128, 128])))
}

/// Parameters under which a plain rectangle survives as one outline:
/// a short blur and a low threshold keep its 2px edge band, no smoothing erodes it
pub fn rectangle_config(min_aspect_ratio: f64) -> PipelineConfig {
    PipelineConfig::try_from(PipelineSettings {
        threshold_value: 100,
        blur_kernel_size: [3, 3],
        morph_kernel_size: [21, 7],
        morph_iterations: 0,
        min_aspect_ratio,
        ..Default::default()
    })
    .expect("valid settings")
}

pub fn config_with(settings: PipelineSettings) -> PipelineConfig {
    PipelineConfig::try_from(settings).expect("valid settings")
}
