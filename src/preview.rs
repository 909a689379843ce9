// src/preview.rs - Interactive stage viewer: one window per image, space to go on, Q to quit

use std::time::Duration;

use image::{imageops, DynamicImage, RgbImage};
use log::info;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::batch::{Flow, ProcessedImage, StepControl};
use crate::errors::{BarcodeError, Result};

/// Gap between tiles, in pixels
const TILE_GAP: u32 = 10;
const TILE_COLUMNS: u32 = 3;
const BACKGROUND: u32 = 0x0020_2020;

/// Shows the six pipeline stages of every image and waits for a key
pub struct StagePreview {
    tile_width: u32,
}

impl StagePreview {
    pub fn new(tile_width: u32) -> Self {
        Self { tile_width }
    }
}

/// Scale down to `max_width`, keeping the aspect ratio; narrower images are left alone
fn fit_to_width(image: &RgbImage, max_width: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    if width <= max_width {
        return image.clone();
    }
    let scale = max_width as f64 / width as f64;
    let new_height = ((height as f64 * scale) as u32).max(1);
    imageops::resize(image, max_width, new_height, imageops::FilterType::Triangle)
}

/// Original, grayscale, gradient, binary, consolidated, result
pub fn stage_tiles(processed: &ProcessedImage, tile_width: u32) -> Vec<RgbImage> {
    let mut tiles = vec![processed.input.image.to_rgb8()];
    if let Some(stages) = &processed.stages {
        for (_, stage) in stages.named() {
            tiles.push(DynamicImage::ImageLuma8(stage.clone()).to_rgb8());
        }
    }
    tiles.push(processed.detection.annotated.clone());

    tiles.iter().map(|tile| fit_to_width(tile, tile_width)).collect()
}

/// Lay tiles out in rows of three into a 0RGB framebuffer; returns (buffer, width, height)
pub fn compose(tiles: &[RgbImage]) -> (Vec<u32>, usize, usize) {
    let cell_w = tiles.iter().map(|t| t.width()).max().unwrap_or(1);
    let cell_h = tiles.iter().map(|t| t.height()).max().unwrap_or(1);
    let columns = TILE_COLUMNS.min(tiles.len().max(1) as u32);
    let rows = (tiles.len() as u32 + columns - 1) / columns;

    let width = (columns * cell_w + (columns - 1) * TILE_GAP) as usize;
    let height = (rows.max(1) * cell_h + rows.saturating_sub(1) * TILE_GAP) as usize;
    let mut buffer = vec![BACKGROUND; width * height];

    for (index, tile) in tiles.iter().enumerate() {
        let origin_x = (index as u32 % columns) * (cell_w + TILE_GAP);
        let origin_y = (index as u32 / columns) * (cell_h + TILE_GAP);
        for (x, y, pixel) in tile.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            let offset = (origin_y + y) as usize * width + (origin_x + x) as usize;
            buffer[offset] = (r as u32) << 16 | (g as u32) << 8 | b as u32;
        }
    }

    (buffer, width, height)
}

impl StepControl for StagePreview {
    fn wants_stages(&self) -> bool {
        true
    }

    fn after_image(&mut self, processed: &ProcessedImage) -> Result<Flow> {
        let tiles = stage_tiles(processed, self.tile_width);
        let (buffer, width, height) = compose(&tiles);

        let title = format!(
            "{} - {} region(s) (SPACE - next, Q - quit)",
            processed.input.filename,
            processed.detection.count()
        );
        let mut window = Window::new(&title, width, height, WindowOptions::default())
            .map_err(|e| BarcodeError::Preview(format!("Failed to create window: {}", e)))?;
        window.limit_update_rate(Some(Duration::from_millis(50)));

        while window.is_open() {
            for key in window.get_keys_pressed(KeyRepeat::No) {
                match key {
                    Key::Space | Key::Enter => return Ok(Flow::Continue),
                    Key::Q | Key::Escape => return Ok(Flow::Stop),
                    _ => {}
                }
            }

            window
                .update_with_buffer(&buffer, width, height)
                .map_err(|e| BarcodeError::Preview(format!("Failed to update window: {}", e)))?;
        }

        info!("Preview window closed");
        Ok(Flow::Stop)
    }
}
