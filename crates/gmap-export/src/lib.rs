#![forbid(unsafe_code)]

//! Export service: filtered nodes to CSV/JSON, the rendered canvas to PNG.
//!
//! Every exporter returns an [`ExportFile`] named
//! `guardian-map-YYYY-MM-DD.<ext>`. Failures surface once as
//! [`ExportError`]; nothing here retries.

pub mod data;
pub mod error;
pub mod format;
pub mod png;
pub mod report;

pub use data::{export_data, to_csv, to_json};
pub use error::ExportError;
pub use format::{ExportFile, ExportFormat, export_file_name};
pub use png::{export_image, to_png};
pub use report::{NoReports, ReportExporter};
