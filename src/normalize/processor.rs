/// Single-image normalization
///
/// Decode -> resize to the exact target size -> grayscale -> intensity
/// stretch -> save as PNG. The aspect ratio is not preserved.

use image::{imageops::FilterType, ImageFormat};
use std::path::{Path, PathBuf};

use super::intensity::stretch_intensity;
use crate::config::TargetSize;
use crate::dataset::display_name;
use crate::pipeline::Outcome;

/// Resampling filter for the resize step (bicubic)
const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// One image to normalize
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Source image
    pub source: PathBuf,
    /// Where the PNG is written
    pub output: PathBuf,
    /// Name used in error messages (the source file name)
    pub name: String,
}

impl ImageRecord {
    /// Build the record for `source`, writing into `output_dir`
    pub fn new(source: &Path, output_dir: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            output: output_path(source, output_dir),
            name: display_name(source),
        }
    }
}

/// `<output_dir>/<basename>.png` regardless of the input extension
pub fn output_path(source: &Path, output_dir: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default();
    let mut path = output_dir.join(stem);
    path.set_extension("png");
    path
}

/// Normalize one image and write it to `output`
pub fn normalize_image(source: &Path, output: &Path, size: TargetSize) -> image::ImageResult<()> {
    let img = image::open(source)?;

    let resized = img.resize_exact(size.width, size.height, RESIZE_FILTER);
    let mut gray = resized.to_luma8();
    stretch_intensity(&mut gray);

    gray.save_with_format(output, ImageFormat::Png)
}

/// Worker entry point: never fails, reports errors as data
pub fn process_record(record: &ImageRecord, size: TargetSize) -> Outcome {
    match normalize_image(&record.source, &record.output, size) {
        Ok(()) => {
            tracing::debug!("normalized {} -> {}", record.name, record.output.display());
            Outcome::Success
        }
        Err(e) => {
            tracing::warn!("failed to normalize {}: {}", record.name, e);
            Outcome::Failure(format!("{}: {}", record.name, e))
        }
    }
}
