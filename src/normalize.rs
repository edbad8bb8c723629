use crate::Result;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, Rgb, RgbImage};
use std::io::Cursor;

pub const CANVAS_SIZE: u32 = 1500;
pub const JPEG_QUALITY: u8 = 95;

const CANVAS_FILL: Rgb<u8> = Rgb([255, 255, 255]);

/// Decodes arbitrary image bytes and re-encodes them centered on a white
/// 1500x1500 RGB canvas as JPEG quality 95.
///
/// Oversized inputs are downscaled (Lanczos3) so both dimensions fit the
/// canvas; smaller inputs are pasted as-is, never upscaled. Fails when the
/// bytes do not decode as a raster image.
pub fn normalize_to_canvas(bytes: &[u8]) -> Result<Vec<u8>> {
    normalize_with_target(bytes, CANVAS_SIZE)
}

fn normalize_with_target(bytes: &[u8], target: u32) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)?.to_rgb8();
    let (width, height) = decoded.dimensions();

    let scaled = if width > target || height > target {
        let scale = (target as f64 / width as f64).min(target as f64 / height as f64);
        let new_width = ((width as f64 * scale) as u32).max(1);
        let new_height = ((height as f64 * scale) as u32).max(1);
        image::imageops::resize(&decoded, new_width, new_height, FilterType::Lanczos3)
    } else {
        decoded
    };

    let (width, height) = scaled.dimensions();
    let mut canvas = RgbImage::from_pixel(target, target, CANVAS_FILL);
    let offset_x = (target - width) / 2;
    let offset_y = (target - height) / 2;
    image::imageops::replace(&mut canvas, &scaled, i64::from(offset_x), i64::from(offset_y));

    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode(canvas.as_raw(), target, target, ExtendedColorType::Rgb8)?;
    Ok(out.into_inner())
}
