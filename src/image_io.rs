use std::path::{Path, PathBuf};
use std::fs;
use image::DynamicImage;

use crate::errors::{BarcodeError, Result};

/// Represents an input image with its metadata
pub struct InputImage {
    pub image: DynamicImage,
    pub path: PathBuf,
    /// File name including the extension
    pub filename: String,
}

impl InputImage {
    /// File name without extension, used to name debug artifacts
    pub fn stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }
}

/// Get all image files with one of `extensions` from a directory, sorted by path
pub fn get_image_files_in_dir<P: AsRef<Path>>(
    dir_path: P,
    extensions: &[String],
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(BarcodeError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(BarcodeError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let extensions: Vec<String> = extensions
        .iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut image_files = Vec::new();
    find_image_files(dir_path, &extensions, recursive, &mut image_files)?;
    image_files.sort();

    Ok(image_files)
}

fn find_image_files(
    dir_path: &Path,
    extensions: &[String],
    recursive: bool,
    result: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            if recursive {
                find_image_files(&path, extensions, recursive, result)?;
            }
        } else if path.is_file() && has_extension(&path, extensions) {
            result.push(path);
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|wanted| *wanted == ext)
        })
        .unwrap_or(false)
}

/// Load and decode an image; undecodable content surfaces as `BarcodeError::Image`
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    let filename = path.file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| BarcodeError::InvalidPath(path.to_path_buf()))?
        .to_string();

    let image = image::open(path)?;

    Ok(InputImage {
        image,
        path: path.to_path_buf(),
        filename,
    })
}

/// Save an image, picking the encoder from the file extension
pub fn save_image<P: AsRef<Path>>(image: &DynamicImage, path: P) -> Result<()> {
    let path = path.as_ref();
    // JPEG has no alpha channel and several encoders reject 16-bit data
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => image.save(path)?,
        _ => DynamicImage::ImageRgb8(image.to_rgb8()).save(path)?,
    }

    Ok(())
}

/// Where the annotated copy of `input` is written
pub fn output_path_for(input: &Path, output_dir: &Path, prefix: &str) -> PathBuf {
    let filename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}{}", prefix, filename))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, RgbImage};

    #[test]
    fn finds_images_by_extension_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PNG", "a.jpg", "notes.txt", "c.bmp"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("d.png"), b"x").unwrap();

        let extensions = vec!["png".to_string(), ".jpg".to_string(), "bmp".to_string()];
        let flat = get_image_files_in_dir(dir.path(), &extensions, false).unwrap();
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.bmp"]);

        let deep = get_image_files_in_dir(dir.path(), &extensions, true).unwrap();
        assert_eq!(deep.len(), 4);
    }

    #[test]
    fn missing_directory_is_invalid_path() {
        let result = get_image_files_in_dir("/definitely/not/here", &["png".to_string()], false);
        assert!(matches!(result, Err(BarcodeError::InvalidPath(_))));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();

        assert!(matches!(load_image(&path), Err(BarcodeError::Image(_))));
    }

    #[test]
    fn saves_and_reloads_with_prefixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let input = Path::new("/photos/shelf.png");
        let out = output_path_for(input, dir.path(), "processed_");
        assert_eq!(out, dir.path().join("processed_shelf.png"));

        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 4, image::Rgb([1, 2, 3])));
        save_image(&image, &out).unwrap();

        let loaded = load_image(&out).unwrap();
        assert_eq!(loaded.filename, "processed_shelf.png");
        assert_eq!(loaded.stem(), "processed_shelf");
        assert_eq!(loaded.image.to_rgb8().get_pixel(3, 2).0, [1, 2, 3]);

        let gray = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        save_image(&gray, dir.path().join("gray.bmp")).unwrap();
    }
}
