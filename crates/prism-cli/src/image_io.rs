//! Image loading and export for the CLI.

use std::path::Path;

use prism_core::image::PixelBuffer;

/// Decode any format the `image` crate understands into an RGBA8 buffer.
pub fn load_image(path: &Path) -> Result<PixelBuffer, ImageLoadError> {
    let img = image::open(path).map_err(ImageLoadError::Decode)?;
    tracing::debug!(
        path = %path.display(),
        color = ?img.color(),
        width = img.width(),
        height = img.height(),
        "decoded image"
    );
    Ok(PixelBuffer::from(img.to_rgba8()))
}

/// Encode `buffer`, picking the format from the file extension.
pub fn save_image(path: &Path, buffer: PixelBuffer) -> Result<(), ImageLoadError> {
    let rgba: image::RgbaImage = buffer.into();
    save_rgba(path, &rgba)
}

pub fn save_rgba(path: &Path, rgba: &image::RgbaImage) -> Result<(), ImageLoadError> {
    rgba.save(path).map_err(ImageLoadError::Encode)?;
    tracing::debug!(path = %path.display(), "wrote image");
    Ok(())
}

/// Errors that can occur while reading or writing images.
#[derive(Debug, thiserror::Error)]
pub enum ImageLoadError {
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("failed to encode image: {0}")]
    Encode(image::ImageError),
}
