//! PNG output and file naming

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Category;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot write swatch file: {0}")]
    Io(#[from] io::Error),
    #[error("cannot encode PNG: {0}")]
    Image(#[from] image::ImageError),
    /// Nothing to draw
    #[error("refusing to write an empty image")]
    Empty,
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(OutputError::Empty);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Where `render` writes when no `-o` is given.
///
/// | Argument | Output |
/// |----------|--------|
/// | none | `<category>_swatches.png` |
/// | `-o out.png` | `out.png` |
/// | `-o dir/` | `dir/<category>_swatches.png` |
pub fn swatch_output_path(category: Category, output_arg: Option<&Path>) -> PathBuf {
    let file_name = format!("{}_swatches.png", category.key());
    match output_arg {
        None => PathBuf::from(file_name),
        Some(p) if p.is_dir() || p.to_string_lossy().ends_with('/') => p.join(file_name),
        Some(p) => p.to_path_buf(),
    }
}
