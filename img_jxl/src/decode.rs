//! In-process decoding for formats cjxl cannot read directly.
//!
//! Everything funnels into PNG bytes held in memory; the encoder streams
//! them over stdin so no intermediate file ever touches disk.

use crate::config::HEIC_EXTENSIONS;
use crate::error::{ConvertError, Result};
use image::{DynamicImage, ImageFormat};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use std::io::Cursor;
use std::path::Path;

fn decode_heic(path: &Path) -> Result<DynamicImage> {
    let lib_heif = LibHeif::new();

    let ctx = HeifContext::read_from_file(path.to_string_lossy().as_ref()).map_err(|e| {
        ConvertError::DecodeFailure(format!("failed to read HEIC container: {}", e))
    })?;

    let handle = ctx
        .primary_image_handle()
        .map_err(|e| ConvertError::DecodeFailure(format!("no primary image: {}", e)))?;

    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| ConvertError::DecodeFailure(format!("HEVC decode failed: {}", e)))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| ConvertError::DecodeFailure("no interleaved RGB plane".to_string()))?;

    let width = plane.width;
    let height = plane.height;
    let row_bytes = width as usize * 3;
    // Rows may be padded out to the plane stride.
    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_bytes]);
    }

    image::RgbImage::from_raw(width, height, pixels)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| ConvertError::DecodeFailure("RGB buffer size mismatch".to_string()))
}

fn decode_raster(path: &Path) -> Result<DynamicImage> {
    // Guess from content, not extension, so mislabelled files and the
    // jfif/pjpeg aliases decode the same as their canonical forms.
    image::ImageReader::open(path)
        .map_err(|e| ConvertError::DecodeFailure(format!("cannot open image: {}", e)))?
        .with_guessed_format()
        .map_err(|e| ConvertError::DecodeFailure(format!("cannot probe format: {}", e)))?
        .decode()
        .map_err(|e| ConvertError::DecodeFailure(e.to_string()))
}

/// Decode any supported source into PNG bytes suitable for cjxl stdin.
pub fn decode_to_png(path: &Path) -> Result<Vec<u8>> {
    let is_heic = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| HEIC_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    let img = if is_heic {
        decode_heic(path)?
    } else {
        decode_raster(path)?
    };

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ConvertError::DecodeFailure(format!("PNG serialization failed: {}", e)))?;
    Ok(png)
}
