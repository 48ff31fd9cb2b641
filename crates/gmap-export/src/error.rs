#![forbid(unsafe_code)]

use std::fmt;

use crate::format::ExportFormat;

/// Errors raised while producing an export file.
#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Json(serde_json::Error),
    Image(image::ImageError),
    /// The canvas has no pixels to encode.
    EmptyCanvas,
    /// No exporter exists for this format.
    Unsupported(ExportFormat),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "csv export error: {err}"),
            Self::Json(err) => write!(f, "json export error: {err}"),
            Self::Image(err) => write!(f, "image encode error: {err}"),
            Self::EmptyCanvas => f.write_str("cannot export an empty canvas"),
            Self::Unsupported(format) => write!(f, "export format not supported: {format}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Image(err) => Some(err),
            Self::EmptyCanvas | Self::Unsupported(_) => None,
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err)
    }
}
