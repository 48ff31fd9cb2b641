#![forbid(unsafe_code)]

//! Report export seam.
//!
//! Reports are produced by an external service. Hosts that have one plug
//! it in through [`ReportExporter`]; the default refuses.

use chrono::NaiveDate;
use gmap_core::{GuardianNode, MapMetrics};

use crate::error::ExportError;
use crate::format::{ExportFile, ExportFormat};

/// Produces a report document for the filtered set.
pub trait ReportExporter {
    fn export_report(
        &self,
        nodes: &[GuardianNode],
        metrics: &MapMetrics,
        date: NaiveDate,
    ) -> Result<ExportFile, ExportError>;
}

/// Exporter used when the host provides none.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReports;

impl ReportExporter for NoReports {
    fn export_report(
        &self,
        _nodes: &[GuardianNode],
        _metrics: &MapMetrics,
        _date: NaiveDate,
    ) -> Result<ExportFile, ExportError> {
        Err(ExportError::Unsupported(ExportFormat::Report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_exporter_refuses() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let result = NoReports.export_report(&[], &MapMetrics::default(), date);
        assert!(matches!(
            result,
            Err(ExportError::Unsupported(ExportFormat::Report))
        ));
    }
}
