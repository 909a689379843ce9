use image::GrayImage;
use rayon::prelude::*;

use crate::config::PipelineConfig;

/// Side of the default square structuring element used for smoothing
pub const SMOOTHING_KERNEL_SIZE: u32 = 3;

#[derive(Clone, Copy)]
enum Extremum {
    Min,
    Max,
}

impl Extremum {
    #[inline]
    fn identity(self) -> u8 {
        match self {
            Extremum::Min => u8::MAX,
            Extremum::Max => u8::MIN,
        }
    }

    #[inline]
    fn pick(self, a: u8, b: u8) -> u8 {
        match self {
            Extremum::Min => a.min(b),
            Extremum::Max => a.max(b),
        }
    }
}

/// Inclusive window `[pos - anchor, pos - anchor + size - 1]` clipped to `0..len`.
/// The anchor sits at `size / 2`, so the window always contains `pos`.
#[inline]
fn window(pos: usize, size: u32, len: usize) -> (usize, usize) {
    let anchor = (size / 2) as usize;
    let lo = pos.saturating_sub(anchor);
    let hi = (pos + size as usize - 1 - anchor).min(len - 1);
    (lo, hi)
}

fn sweep_rows(image: &GrayImage, size: u32, op: Extremum) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || size <= 1 {
        return image.clone();
    }
    let mut result = GrayImage::new(width, height);

    let row_len = width as usize;
    result
        .par_chunks_mut(row_len)
        .zip(image.as_raw().par_chunks(row_len))
        .for_each(|(dst, src)| {
            for x in 0..row_len {
                let (lo, hi) = window(x, size, row_len);
                dst[x] = src[lo..=hi].iter().fold(op.identity(), |acc, &v| op.pick(acc, v));
            }
        });

    result
}

fn sweep_columns(image: &GrayImage, size: u32, op: Extremum) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || size <= 1 {
        return image.clone();
    }
    let mut result = GrayImage::new(width, height);

    let row_len = width as usize;
    let rows = height as usize;
    let src = image.as_raw();
    result
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, dst)| {
            dst.fill(op.identity());
            let (lo, hi) = window(y, size, rows);
            for src_row in src[lo * row_len..(hi + 1) * row_len].chunks(row_len) {
                for (d, &s) in dst.iter_mut().zip(src_row) {
                    *d = op.pick(*d, s);
                }
            }
        });

    result
}

/// Erosion with a `[width, height]` rectangle. Pixels outside the image are ignored.
pub fn erode_rect(mask: &GrayImage, kernel_size: [u32; 2]) -> GrayImage {
    let rows = sweep_rows(mask, kernel_size[0], Extremum::Min);
    sweep_columns(&rows, kernel_size[1], Extremum::Min)
}

/// Dilation with a `[width, height]` rectangle. Pixels outside the image are ignored.
pub fn dilate_rect(mask: &GrayImage, kernel_size: [u32; 2]) -> GrayImage {
    let rows = sweep_rows(mask, kernel_size[0], Extremum::Max);
    sweep_columns(&rows, kernel_size[1], Extremum::Max)
}

/// Morphological closing (dilation followed by erosion)
pub fn close_rect(mask: &GrayImage, kernel_size: [u32; 2]) -> GrayImage {
    let dilated = dilate_rect(mask, kernel_size);
    erode_rect(&dilated, kernel_size)
}

/// `iterations` erosions followed by the same number of dilations with the 3x3 element
pub fn smooth(mask: &GrayImage, iterations: u32) -> GrayImage {
    let kernel = [SMOOTHING_KERNEL_SIZE, SMOOTHING_KERNEL_SIZE];

    let mut current = mask.clone();
    for _ in 0..iterations {
        current = erode_rect(&current, kernel);
    }
    for _ in 0..iterations {
        current = dilate_rect(&current, kernel);
    }
    current
}

/// Merge individual bar edges into one solid blob per barcode
pub fn consolidate(mask: &GrayImage, config: &PipelineConfig) -> GrayImage {
    let closed = close_rect(mask, config.morph_kernel_size());
    smooth(&closed, config.morph_iterations())
}
