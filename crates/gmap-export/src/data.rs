#![forbid(unsafe_code)]

//! Tabular and document export of the filtered node set.
//!
//! CSV: one row per node, header taken from the first record, every field
//! quoted. List fields are joined with `;`, missing coordinates are empty,
//! timestamps are RFC 3339. An empty node set yields an empty file.
//!
//! JSON: the node records as a pretty-printed array, readable back with
//! `serde_json::from_slice::<Vec<GuardianNode>>`.

use chrono::{NaiveDate, SecondsFormat};
use gmap_core::GuardianNode;
use serde::Serialize;

use crate::error::ExportError;
use crate::format::{ExportFile, ExportFormat, export_file_name};

pub const CSV_MIME: &str = "text/csv";
pub const JSON_MIME: &str = "application/json";

/// Separator for list-valued CSV fields.
const LIST_SEPARATOR: &str = ";";

#[derive(Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    wallet: &'a str,
    latitude: Option<f64>,
    longitude: Option<f64>,
    truth_score: f64,
    capsule_count: u32,
    region: &'a str,
    country: &'a str,
    city: &'a str,
    reputation_tier: &'static str,
    activity_level: &'static str,
    last_active: String,
    specialties: String,
    connections: String,
    influence_radius: f64,
}

impl<'a> From<&'a GuardianNode> for CsvRow<'a> {
    fn from(node: &'a GuardianNode) -> Self {
        Self {
            id: node.id.as_str(),
            wallet: &node.wallet,
            latitude: node.latitude,
            longitude: node.longitude,
            truth_score: node.truth_score,
            capsule_count: node.capsule_count,
            region: &node.region,
            country: &node.country,
            city: &node.city,
            reputation_tier: node.reputation_tier.as_str(),
            activity_level: node.activity_level.as_str(),
            last_active: node.last_active.to_rfc3339_opts(SecondsFormat::Secs, true),
            specialties: node
                .specialties
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
            connections: node
                .connections
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
            influence_radius: node.influence_radius,
        }
    }
}

/// Encode nodes as CSV bytes.
pub fn to_csv(nodes: &[GuardianNode]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    for node in nodes {
        writer.serialize(CsvRow::from(node))?;
    }
    writer
        .into_inner()
        .map_err(|err| ExportError::Csv(err.into_error().into()))
}

/// Encode nodes as a pretty-printed JSON array.
pub fn to_json(nodes: &[GuardianNode]) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(nodes)?)
}

/// Export `nodes` in a data format, naming the file after `date`.
///
/// Only [`ExportFormat::Csv`] and [`ExportFormat::Json`] are produced here;
/// anything else is [`ExportError::Unsupported`].
pub fn export_data(
    nodes: &[GuardianNode],
    format: ExportFormat,
    date: NaiveDate,
) -> Result<ExportFile, ExportError> {
    let (bytes, mime, extension) = match format {
        ExportFormat::Csv => (to_csv(nodes)?, CSV_MIME, "csv"),
        ExportFormat::Json => (to_json(nodes)?, JSON_MIME, "json"),
        other => return Err(ExportError::Unsupported(other)),
    };
    gmap_core::debug!(format = %format, rows = nodes.len(), bytes = bytes.len(), "exported data");
    Ok(ExportFile::new(export_file_name(date, extension), mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gmap_core::{ActivityLevel, NodeId, ReputationTier};
    use pretty_assertions::assert_eq;

    fn node() -> GuardianNode {
        GuardianNode {
            id: NodeId::new("g-1"),
            wallet: "0xabc".into(),
            latitude: Some(48.5),
            longitude: None,
            truth_score: 91.5,
            capsule_count: 7,
            region: "Europe".into(),
            country: "France".into(),
            city: "Paris, 1er".into(),
            reputation_tier: ReputationTier::Veritas,
            activity_level: ActivityLevel::High,
            last_active: Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
            specialties: ["science".to_string(), "history".to_string()].into(),
            connections: vec![NodeId::new("g-2"), NodeId::new("g-3")],
            influence_radius: 12.0,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    #[test]
    fn csv_header_and_quoted_row() {
        let bytes = to_csv(&[node()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "\"id\",\"wallet\",\"latitude\",\"longitude\",\"truth_score\",\"capsule_count\",\
                 \"region\",\"country\",\"city\",\"reputation_tier\",\"activity_level\",\
                 \"last_active\",\"specialties\",\"connections\",\"influence_radius\""
            )
        );
        assert_eq!(
            lines.next(),
            Some(
                "\"g-1\",\"0xabc\",\"48.5\",\"\",\"91.5\",\"7\",\"Europe\",\"France\",\
                 \"Paris, 1er\",\"Veritas\",\"high\",\"2026-03-01T09:30:00Z\",\
                 \"history;science\",\"g-2;g-3\",\"12.0\""
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_input_gives_empty_csv() {
        assert!(to_csv(&[]).unwrap().is_empty());
        let file = export_data(&[], ExportFormat::Csv, date()).unwrap();
        assert!(file.is_empty());
        assert_eq!(file.filename, "guardian-map-2026-03-02.csv");
    }

    #[test]
    fn json_round_trips() {
        let nodes = vec![node(), GuardianNode { id: NodeId::new("g-2"), ..node() }];
        let file = export_data(&nodes, ExportFormat::Json, date()).unwrap();
        assert_eq!(file.mime_type, JSON_MIME);
        assert_eq!(file.filename, "guardian-map-2026-03-02.json");
        let back: Vec<GuardianNode> = serde_json::from_slice(&file.bytes).unwrap();
        assert_eq!(back, nodes);
        assert!(String::from_utf8(file.bytes).unwrap().contains("\n  "));
    }

    #[test]
    fn json_of_empty_set_is_empty_array() {
        assert_eq!(to_json(&[]).unwrap(), b"[]");
    }

    #[test]
    fn excel_and_report_are_unsupported() {
        for format in [ExportFormat::Excel, ExportFormat::Report] {
            let err = export_data(&[node()], format, date()).unwrap_err();
            assert!(matches!(err, ExportError::Unsupported(f) if f == format));
        }
    }
}
