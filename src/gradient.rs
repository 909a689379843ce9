use image::{DynamicImage, GrayImage, Luma};
use imageproc::gradients::{horizontal_scharr, vertical_scharr};

/// Single-channel intensity view of the input
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Emphasise horizontal bar structure: `|d/dx - d/dy|` saturated to 8 bits.
///
/// Both derivatives come from a 3x3 Scharr operator evaluated in 16-bit signed
/// precision, so nothing wraps before the subtraction. Texture that changes equally in
/// both directions cancels out while the tall, uniform bars of a barcode survive.
pub fn directional_gradient(gray: &GrayImage) -> GrayImage {
    let grad_x = horizontal_scharr(gray);
    let grad_y = vertical_scharr(gray);

    let (width, height) = gray.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let gx = grad_x.get_pixel(x, y)[0] as i32;
        let gy = grad_y.get_pixel(x, y)[0] as i32;
        Luma([(gx - gy).unsigned_abs().min(255) as u8])
    })
}
