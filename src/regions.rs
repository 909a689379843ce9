// src/regions.rs - Contour extraction, geometric filtering and annotation

use image::{imageops, GrayImage, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::config::PipelineConfig;

/// Axis-aligned bounding box of one candidate barcode region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest box enclosing every point; `None` for an empty slice
    pub fn bounding(points: &[Point<i32>]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self {
            x: min_x.max(0) as u32,
            y: min_y.max(0) as u32,
            width: (max_x - min_x + 1) as u32,
            height: (max_y - min_y + 1) as u32,
        })
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Width over height, `None` for a zero-height box
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }

    /// Both bounds are strict; degenerate boxes never pass
    pub fn is_accepted(&self, config: &PipelineConfig) -> bool {
        if self.width == 0 {
            return false;
        }
        match self.aspect_ratio() {
            Some(ratio) => {
                self.area() as f64 > config.min_area() && ratio > config.min_aspect_ratio()
            }
            None => false,
        }
    }
}

/// Copy of `mask` inside a one-pixel background frame
fn framed(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut padded, mask, 1, 1);
    padded
}

/// Outermost boundaries of the foreground; holes and anything nested inside them are dropped.
///
/// Tracing runs on a framed copy so that blobs touching the image border, or a mask that is
/// foreground everywhere, still start from a background pixel and are reported as outer borders.
/// Points are shifted back into the coordinates of `mask`.
pub fn external_contours(mask: &GrayImage) -> Vec<Contour<i32>> {
    find_contours::<i32>(&framed(mask))
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|mut c| {
            for p in c.points.iter_mut() {
                *p = Point::new(p.x - 1, p.y - 1);
            }
            c
        })
        .collect()
}

/// Bounding rectangle of every external contour in the mask
pub fn extract_candidates(mask: &GrayImage) -> Vec<Region> {
    external_contours(mask)
        .iter()
        .filter_map(|contour| Region::bounding(&contour.points))
        .collect()
}

/// Keep the candidates that pass both geometric bounds, preserving their order
pub fn select_regions(candidates: &[Region], config: &PipelineConfig) -> Vec<Region> {
    candidates
        .iter()
        .copied()
        .filter(|region| region.is_accepted(config))
        .collect()
}

/// Copy of `original` with one rectangle outline per region
pub fn annotate(original: &RgbImage, regions: &[Region], config: &PipelineConfig) -> RgbImage {
    let mut annotated = original.clone();
    let color = Rgb(config.box_color_rgb());
    let thickness = config.box_thickness() as i64;

    for region in regions {
        // The outline runs through (x, y) and (x + width, y + height), both corners inclusive.
        // Strokes are centred on it: inner rings shrink, outer rings grow
        for ring in 0..thickness {
            let offset = ring - thickness / 2;
            let width = region.width as i64 + 1 + 2 * offset;
            let height = region.height as i64 + 1 + 2 * offset;
            if width <= 0 || height <= 0 {
                continue;
            }

            let rect = Rect::at((region.x as i64 - offset) as i32, (region.y as i64 - offset) as i32)
                .of_size(width as u32, height as u32);
            draw_hollow_rect_mut(&mut annotated, rect, color);
        }
    }

    annotated
}
