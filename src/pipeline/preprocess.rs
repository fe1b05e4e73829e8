//! Upload normalization for the classification service.
//!
//! The image is forced to RGB and stretched to a fixed 224x224 square.
//! Aspect ratio is not preserved.

use std::io::Cursor;

use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat};
use tracing::debug;

use super::PipelineError;

/// Square input size expected by the ViT classifier.
pub const MODEL_INPUT_SIZE: u32 = 224;

/// JPEG quality for the stored/transmitted copy.
pub const JPEG_QUALITY: u8 = 75;

/// Maximum accepted upload size in bytes (20 MB).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Largest decoded image accepted, in pixels. Compressed formats can
/// declare dimensions far beyond what the upload size suggests.
pub const MAX_IMAGE_PIXELS: u64 = 178_956_970;

/// Validation message for uploads over [`MAX_UPLOAD_BYTES`].
pub fn upload_too_large_message() -> String {
    format!("Uploaded file exceeds {} MB", MAX_UPLOAD_BYTES / (1024 * 1024))
}

/// Normalized image in both forms the pipeline needs.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Raw JPEG bytes, sent to the classifier.
    pub jpeg: Vec<u8>,
    /// Base64 of `jpeg`, persisted on the analysis.
    pub base64: String,
}

/// Decode, convert to RGB, resize to 224x224 and re-encode as JPEG.
pub fn prepare_image(bytes: &[u8]) -> Result<PreparedImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::Validation("Uploaded file is empty".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(PipelineError::Validation(upload_too_large_message()));
    }

    let (declared_w, declared_h) = read_dimensions(bytes)?;
    if u64::from(declared_w) * u64::from(declared_h) > MAX_IMAGE_PIXELS {
        return Err(PipelineError::Validation(format!(
            "Image dimensions {declared_w}x{declared_h} exceed the {MAX_IMAGE_PIXELS} pixel limit"
        )));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| PipelineError::Validation(format!("Failed to decode image: {e}")))?;
    let (orig_w, orig_h) = img.dimensions();

    let rgb = img.to_rgb8();
    let resized = image::imageops::resize(
        &rgb,
        MODEL_INPUT_SIZE,
        MODEL_INPUT_SIZE,
        FilterType::CatmullRom,
    );

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(resized)
        .write_to(&mut cursor, ImageOutputFormat::Jpeg(JPEG_QUALITY))
        .map_err(|e| PipelineError::Validation(format!("JPEG encoding failed: {e}")))?;
    let jpeg = cursor.into_inner();

    debug!(
        orig_w,
        orig_h,
        encoded_bytes = jpeg.len(),
        "Normalized upload to {MODEL_INPUT_SIZE}x{MODEL_INPUT_SIZE}"
    );

    let base64 = base64::engine::general_purpose::STANDARD.encode(&jpeg);
    Ok(PreparedImage { jpeg, base64 })
}

/// Read the dimensions from the image header without decoding pixels.
fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), PipelineError> {
    image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PipelineError::Validation(format!("Failed to decode image: {e}")))?
        .into_dimensions()
        .map_err(|e| PipelineError::Validation(format!("Failed to decode image: {e}")))
}

#[cfg(test)]
pub(crate) fn make_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([90u8, 90, 90, 255]));
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageOutputFormat::Png)
        .unwrap();
    cursor.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_224_square_rgb_jpeg() {
        let prepared = prepare_image(&make_test_png(640, 480)).unwrap();

        // JPEG magic bytes
        assert_eq!(&prepared.jpeg[0..3], &[0xFF, 0xD8, 0xFF]);

        let decoded = image::load_from_memory(&prepared.jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (224, 224));
        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn aspect_ratio_is_not_preserved() {
        let prepared = prepare_image(&make_test_png(1000, 100)).unwrap();
        let decoded = image::load_from_memory(&prepared.jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (224, 224));
    }

    #[test]
    fn base64_matches_jpeg_bytes() {
        let prepared = prepare_image(&make_test_png(32, 32)).unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&prepared.base64)
            .unwrap();
        assert_eq!(decoded, prepared.jpeg);
    }

    #[test]
    fn undecodable_bytes_are_validation_error() {
        let result = prepare_image(b"definitely not an image");
        assert!(matches!(result, Err(PipelineError::Validation(_))));
    }

    /// Small JPEG whose frame header claims `width` x `height`.
    fn jpeg_declaring(width: u16, height: u16) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageLuma8(image::GrayImage::new(8, 8))
            .write_to(&mut cursor, ImageOutputFormat::Jpeg(JPEG_QUALITY))
            .unwrap();
        let mut bytes = cursor.into_inner();

        // SOF0: FF C0, length(2), precision(1), height(2), width(2)
        let sof = bytes
            .windows(2)
            .position(|w| w == [0xFF, 0xC0])
            .expect("baseline frame header");
        bytes[sof + 5..sof + 7].copy_from_slice(&height.to_be_bytes());
        bytes[sof + 7..sof + 9].copy_from_slice(&width.to_be_bytes());
        bytes
    }

    #[test]
    fn oversized_dimensions_rejected_before_decoding() {
        let bytes = jpeg_declaring(20_000, 20_000);
        assert!(bytes.len() < 4096);

        match prepare_image(&bytes) {
            Err(PipelineError::Validation(msg)) => {
                assert!(msg.contains("20000x20000"), "unexpected message: {msg}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn dimensions_at_limit_are_read_from_header() {
        let bytes = jpeg_declaring(13_000, 13_000);
        let (w, h) = read_dimensions(&bytes).unwrap();
        assert_eq!((w, h), (13_000, 13_000));
        assert!(u64::from(w) * u64::from(h) <= MAX_IMAGE_PIXELS);
    }

    #[test]
    fn oversize_upload_message_names_limit() {
        let bytes = vec![0u8; MAX_UPLOAD_BYTES + 1];
        match prepare_image(&bytes) {
            Err(PipelineError::Validation(msg)) => assert_eq!(msg, "Uploaded file exceeds 20 MB"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_upload_is_validation_error() {
        assert!(matches!(prepare_image(&[]), Err(PipelineError::Validation(_))));
    }
}
