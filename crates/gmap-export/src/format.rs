#![forbid(unsafe_code)]

//! Export formats and the downloadable file they produce.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Prefix shared by every exported file name.
pub const FILE_STEM: &str = "guardian-map";

/// Formats offered by the export menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
    Report,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Csv, Self::Json, Self::Excel, Self::Report];

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Excel => "excel",
            Self::Report => "report",
        }
    }

    /// Parse a format name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }

    /// Whether [`crate::export_data`] can produce this format.
    pub const fn is_data_format(self) -> bool {
        matches!(self, Self::Csv | Self::Json)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `guardian-map-YYYY-MM-DD.{extension}`.
pub fn export_file_name(date: NaiveDate, extension: &str) -> String {
    format!("{FILE_STEM}-{}.{extension}", date.format("%Y-%m-%d"))
}

/// A finished export, ready to hand to the host's download or share hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn new(filename: impl Into<String>, mime_type: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type,
            bytes,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:` URL with a base64 payload.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}
