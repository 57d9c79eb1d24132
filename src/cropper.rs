//! Deterministic "fill and center" crop for uploaded photos.
//!
//! There is no interactive crop region: the source is scaled to cover a box
//! of the target aspect ratio, center-cropped, resized to a fixed output
//! width and re-encoded as JPEG. The try-on pipeline wants its person photos
//! in a predictable portrait shape, and the catalog upload wants squares.

use base64::Engine as _;
use image::imageops::FilterType;
use image::DynamicImage;

pub const OUTPUT_WIDTH: u32 = 1024;
pub const JPEG_QUALITY: u8 = 85;

/// Portrait box used for person photos.
pub const PERSON_ASPECT: f32 = 3.0 / 4.0;
/// Square box used for custom garment uploads.
pub const GARMENT_ASPECT: f32 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("could not encode image: {0}")]
    Encode(String),
}

/// The maximal centered sub-rectangle of `(src_w, src_h)` whose width/height
/// ratio equals `aspect`. Returned as `(x, y, width, height)`.
pub fn cover_crop_rect(src_w: u32, src_h: u32, aspect: f32) -> (u32, u32, u32, u32) {
    let src_aspect = src_w as f32 / src_h as f32;
    if src_aspect > aspect {
        // source is wider than the target box: trim the sides
        let crop_w = (src_h as f32 * aspect).round() as u32;
        let crop_w = crop_w.clamp(1, src_w);
        ((src_w - crop_w) / 2, 0, crop_w, src_h)
    } else {
        // source is taller: trim top and bottom
        let crop_h = (src_w as f32 / aspect).round() as u32;
        let crop_h = crop_h.clamp(1, src_h);
        (0, (src_h - crop_h) / 2, src_w, crop_h)
    }
}

/// Decode `bytes`, cover-crop to `aspect`, resize to `out_width` and encode
/// as JPEG.
pub fn cover_crop_to_jpeg(bytes: &[u8], aspect: f32, out_width: u32) -> Result<Vec<u8>, CropError> {
    let img = image::load_from_memory(bytes).map_err(|e| CropError::Decode(e.to_string()))?;
    let (x, y, w, h) = cover_crop_rect(img.width(), img.height(), aspect);
    let out_height = (out_width as f32 / aspect).round().max(1.0) as u32;

    let cropped = img.crop_imm(x, y, w, h);
    let resized = cropped.resize_exact(out_width, out_height, FilterType::Triangle);
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut out = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| CropError::Encode(e.to_string()))?;
    Ok(out)
}

/// Wrap an encoded JPEG in a data URL, which is what the generation endpoint
/// accepts for images.
pub fn to_jpeg_data_url(jpeg: &[u8]) -> String {
    format!(
        "data:image/jpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(jpeg)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_source_trims_sides() {
        // 200x100 to a square: keep the centered 100x100.
        assert_eq!(cover_crop_rect(200, 100, 1.0), (50, 0, 100, 100));
    }

    #[test]
    fn tall_source_trims_top_and_bottom() {
        // 100x400 to 3:4 portrait: height becomes 133.
        let (x, y, w, h) = cover_crop_rect(100, 400, 3.0 / 4.0);
        assert_eq!((x, w), (0, 100));
        assert_eq!(h, 133);
        assert_eq!(y, (400 - 133) / 2);
    }

    #[test]
    fn matching_aspect_keeps_everything() {
        assert_eq!(cover_crop_rect(300, 400, 3.0 / 4.0), (0, 0, 300, 400));
    }

    #[test]
    fn crop_pipeline_produces_the_requested_shape() {
        // 8x4 checker, cropped to a square at width 16.
        let mut src = image::RgbaImage::new(8, 4);
        for (x, y, p) in src.enumerate_pixels_mut() {
            let on = (x + y) % 2 == 0;
            *p = image::Rgba(if on { [255, 0, 0, 255] } else { [0, 0, 255, 255] });
        }
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(src)
            .write_with_encoder(image::codecs::png::PngEncoder::new(&mut png))
            .unwrap();

        let jpeg = cover_crop_to_jpeg(&png, 1.0, 16).unwrap();
        let out = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((out.width(), out.height()), (16, 16));
    }

    #[test]
    fn data_url_has_the_jpeg_prefix() {
        assert!(to_jpeg_data_url(&[1, 2, 3]).starts_with("data:image/jpeg;base64,"));
    }
}
