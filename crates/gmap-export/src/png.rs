#![forbid(unsafe_code)]

//! PNG export of the rendered canvas.

use std::io::Cursor;

use chrono::NaiveDate;
use gmap_render::Canvas;
use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::ExportError;
use crate::format::{ExportFile, export_file_name};

pub const PNG_MIME: &str = "image/png";

/// Encode the canvas pixels as PNG bytes.
pub fn to_png(canvas: &Canvas) -> Result<Vec<u8>, ExportError> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(ExportError::EmptyCanvas);
    }
    let buffer = RgbaImage::from_raw(canvas.width(), canvas.height(), canvas.to_rgba8())
        .ok_or(ExportError::EmptyCanvas)?;
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(buffer).write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Export the current canvas as `guardian-map-YYYY-MM-DD.png`.
pub fn export_image(canvas: &Canvas, date: NaiveDate) -> Result<ExportFile, ExportError> {
    let bytes = to_png(canvas)?;
    gmap_core::debug!(
        width = canvas.width(),
        height = canvas.height(),
        bytes = bytes.len(),
        "exported image"
    );
    Ok(ExportFile::new(export_file_name(date, "png"), PNG_MIME, bytes))
}
