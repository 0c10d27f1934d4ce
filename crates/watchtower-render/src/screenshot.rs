//! Saving captured frames.

use std::path::Path;

use image::{ImageBuffer, Rgba};

/// Saves RGBA8 pixel data to an image file.
///
/// # Arguments
/// * `path` - Output path (supports .png, .jpg, .jpeg)
/// * `data` - Row-major RGBA pixels from the top-left, 4 bytes per pixel
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Errors
/// Returns an error if the file cannot be written or format is unsupported.
pub fn save_image(
    path: impl AsRef<Path>,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ScreenshotError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, data.to_vec())
        .ok_or(ScreenshotError::InvalidImageData)?;

    match extension.as_str() {
        "png" => {
            img.save_with_format(path, image::ImageFormat::Png)?;
        }
        "jpg" | "jpeg" => {
            // JPEG has no alpha channel
            let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();
            rgb_img.save_with_format(path, image::ImageFormat::Jpeg)?;
        }
        _ => {
            return Err(ScreenshotError::UnsupportedFormat(extension));
        }
    }

    log::info!("saved {width}x{height} image to {}", path.display());
    Ok(())
}

/// Encodes RGBA8 pixel data as PNG in memory.
pub fn encode_png(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ScreenshotError> {
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(width, height, data.to_vec())
        .ok_or(ScreenshotError::InvalidImageData)?;

    let mut buffer = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)?;

    Ok(buffer.into_inner())
}

/// Error type for screenshot operations.
#[derive(Debug, thiserror::Error)]
pub enum ScreenshotError {
    #[error("Failed to save image: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid image data")]
    InvalidImageData,
}

impl From<ScreenshotError> for watchtower_core::WatchtowerError {
    fn from(err: ScreenshotError) -> Self {
        match err {
            ScreenshotError::IoError(io) => Self::Io(io),
            other => Self::Render(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_header() {
        let png = encode_png(&[255, 0, 0, 255, 0, 255, 0, 255], 2, 1).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_rejects_short_data() {
        assert!(matches!(
            encode_png(&[0; 7], 2, 1),
            Err(ScreenshotError::InvalidImageData)
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = std::env::temp_dir();
        let result = save_image(dir.join("frame.tga"), &[0; 4], 1, 1);
        assert!(matches!(result, Err(ScreenshotError::UnsupportedFormat(ext)) if ext == "tga"));
    }

    #[test]
    fn test_save_png() {
        let path = std::env::temp_dir().join(format!("watchtower-{}.png", std::process::id()));
        save_image(&path, &[10, 20, 30, 255], 1, 1).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(0, 0).0, [10, 20, 30, 255]);
        let _ = std::fs::remove_file(path);
    }
}
