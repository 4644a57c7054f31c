//! Product image compression.
//!
//! Vendor uploads are downsized and re-encoded as JPEG before they are sent to
//! the backend. Decoding and encoding are CPU bound, so each image runs on the
//! blocking pool; a batch is all-or-nothing.

use std::io::Cursor;

use futures::future::try_join_all;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use thiserror::Error;
use tracing::instrument;

/// Largest accepted input, checked before decoding.
pub const MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// MIME type of every compressed image.
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// Image processing errors.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported or corrupt image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),

    #[error("invalid compression options: {0}")]
    InvalidOptions(String),

    #[error("compression task failed: {0}")]
    Task(String),
}

impl ImageError {
    /// Text shown to the vendor on the product form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::TooLarge { limit, .. } => format!(
                "Chaque image doit peser moins de {} Mo.",
                limit / (1024 * 1024)
            ),
            Self::Decode(_) => "Format d'image non reconnu ou fichier endommagé.".to_string(),
            Self::Encode(_) | Self::InvalidOptions(_) | Self::Task(_) => {
                "Les images n'ont pas pu être traitées, veuillez réessayer.".to_string()
            }
        }
    }
}

/// Target size and quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionOptions {
    /// Longest side of the output, in pixels.
    pub max_dimension: u32,
    /// JPEG quality, 1 to 100.
    pub quality: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_dimension: 1600,
            quality: 80,
        }
    }
}

impl CompressionOptions {
    fn validate(self) -> Result<Self, ImageError> {
        if self.max_dimension == 0 {
            return Err(ImageError::InvalidOptions(
                "max_dimension must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ImageError::InvalidOptions(format!(
                "quality {} is outside 1..=100",
                self.quality
            )));
        }
        Ok(self)
    }
}

/// A re-encoded image.
#[derive(Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for CompressedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressedImage")
            .field("bytes", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Decode, downsize and re-encode one image.
///
/// The aspect ratio is preserved and images already within `max_dimension`
/// keep their size.
///
/// # Errors
///
/// Returns an error if the input is too large, cannot be decoded, or the
/// options are out of range.
pub fn compress_image(
    bytes: &[u8],
    options: CompressionOptions,
) -> Result<CompressedImage, ImageError> {
    let options = options.validate()?;
    if bytes.len() > MAX_INPUT_BYTES {
        return Err(ImageError::TooLarge {
            size: bytes.len(),
            limit: MAX_INPUT_BYTES,
        });
    }

    let decoded = image::load_from_memory(bytes).map_err(|e| ImageError::Decode(e.to_string()))?;

    let resized = if decoded.width().max(decoded.height()) > options.max_dimension {
        decoded.resize(
            options.max_dimension,
            options.max_dimension,
            FilterType::Lanczos3,
        )
    } else {
        decoded
    };

    // JPEG carries no alpha channel.
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut out = Cursor::new(Vec::with_capacity(bytes.len() / 2));
    JpegEncoder::new_with_quality(&mut out, options.quality)
        .encode_image(&rgb)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    Ok(CompressedImage {
        bytes: out.into_inner(),
        width: rgb.width(),
        height: rgb.height(),
    })
}

/// Compress a batch concurrently.
///
/// Results keep the input order. The first failure fails the whole batch.
///
/// # Errors
///
/// Returns the first error encountered.
#[instrument(skip(images), fields(count = images.len()))]
pub async fn compress_all(
    images: Vec<Vec<u8>>,
    options: CompressionOptions,
) -> Result<Vec<CompressedImage>, ImageError> {
    let options = options.validate()?;

    let tasks = images.into_iter().map(|bytes| async move {
        tokio::task::spawn_blocking(move || compress_image(&bytes, options))
            .await
            .map_err(|e| ImageError::Task(e.to_string()))?
    });

    let compressed = try_join_all(tasks).await?;
    tracing::debug!(count = compressed.len(), "Images compressed");
    Ok(compressed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 120, 40, 128]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn small() -> CompressionOptions {
        CompressionOptions {
            max_dimension: 100,
            quality: 75,
        }
    }

    #[test]
    fn test_downsizes_longest_side() {
        let out = compress_image(&png(400, 200), small()).unwrap();
        assert_eq!((out.width, out.height), (100, 50));

        let out = compress_image(&png(120, 300), small()).unwrap();
        assert_eq!((out.width, out.height), (40, 100));
    }

    #[test]
    fn test_never_upscales() {
        let out = compress_image(&png(50, 30), small()).unwrap();
        assert_eq!((out.width, out.height), (50, 30));
    }

    #[test]
    fn test_output_is_jpeg() {
        let out = compress_image(&png(64, 64), small()).unwrap();
        assert_eq!(
            image::guess_format(&out.bytes).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn test_rejects_garbage_and_oversized_input() {
        assert!(matches!(
            compress_image(b"definitely not an image", small()),
            Err(ImageError::Decode(_))
        ));

        let huge = vec![0_u8; MAX_INPUT_BYTES + 1];
        assert!(matches!(
            compress_image(&huge, small()),
            Err(ImageError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_options() {
        let options = CompressionOptions {
            max_dimension: 100,
            quality: 0,
        };
        assert!(matches!(
            compress_image(&png(10, 10), options),
            Err(ImageError::InvalidOptions(_))
        ));
    }

    #[tokio::test]
    async fn test_batch_keeps_input_order() {
        let out = compress_all(vec![png(300, 150), png(20, 10), png(90, 180)], small())
            .await
            .unwrap();

        let sizes: Vec<_> = out.iter().map(|img| (img.width, img.height)).collect();
        assert_eq!(sizes, vec![(100, 50), (20, 10), (50, 100)]);
    }

    #[tokio::test]
    async fn test_one_bad_image_fails_the_batch() {
        let result = compress_all(
            vec![png(30, 30), b"broken".to_vec(), png(40, 40)],
            small(),
        )
        .await;
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        assert!(compress_all(Vec::new(), small()).await.unwrap().is_empty());
    }
}
