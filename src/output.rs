use std::fs;
use std::path::{Path, PathBuf};
use csv::Writer;

use crate::batch::{BatchReport, FileOutcome};
use crate::errors::Result;

pub const REPORT_FILENAME: &str = "regions.csv";

/// Write one CSV row per accepted region of every processed file
pub fn write_regions_csv<P: AsRef<Path>>(report: &BatchReport, output_dir: P) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join(REPORT_FILENAME);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(&output_path)?;

    writer.write_record([
        "File",
        "Region_Index",
        "X",
        "Y",
        "Width",
        "Height",
        "Area",
        "Aspect_Ratio",
    ])?;

    for outcome in &report.outcomes {
        let (path, regions) = match outcome {
            FileOutcome::Processed { path, regions, .. } => (path, regions),
            FileOutcome::Failed { .. } => continue,
        };

        for (index, region) in regions.iter().enumerate() {
            writer.write_record(&[
                path.display().to_string(),
                index.to_string(),
                region.x.to_string(),
                region.y.to_string(),
                region.width.to_string(),
                region.height.to_string(),
                region.area().to_string(),
                format!("{:.6}", region.aspect_ratio().unwrap_or(0.0)),
            ])?;
        }
    }

    writer.flush()?;

    Ok(output_path)
}
