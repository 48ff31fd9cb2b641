//! End-to-end runs of the host-driven program: fetch, filter, click, export.

use core::time::Duration;

use chrono::{TimeZone, Utc};
use gmap_core::{Action, FilterCriteria, Mode, NodeId, ReputationTier};
use gmap_export::ExportFormat;
use gmap_runtime::{
    FetchError, MapConfig, MapProgram, MemoryRepository, RefreshOutcome, RefreshStatus,
    SnapshotPayload, fetch_payload,
};
use pretty_assertions::assert_eq;

const NODES: &str = r#"[
  {"id": "v", "wallet": "0xv", "latitude": 0.0, "longitude": 0.0,
   "truth_score": 95, "capsule_count": 40, "region": "Africa", "country": "Kenya",
   "city": "Nairobi", "reputation_tier": "Veritas", "activity_level": "high",
   "last_active": "2026-03-01T00:00:00Z", "specialties": ["law"],
   "connections": ["g"], "influence_radius": 10},
  {"id": "g", "wallet": "0xg", "latitude": 45.0, "longitude": 90.0,
   "truth_score": 70, "capsule_count": 12, "region": "Asia", "country": "Mongolia",
   "city": "Ulaanbaatar", "reputation_tier": "Gold", "activity_level": "medium",
   "last_active": "2026-02-01T00:00:00Z", "specialties": ["history"],
   "connections": ["v"], "influence_radius": 6},
  {"id": "s", "wallet": "0xs", "latitude": null, "longitude": null,
   "truth_score": 40, "capsule_count": 2, "region": "Europe", "country": "Spain",
   "city": "Madrid", "reputation_tier": "Silver", "activity_level": "low",
   "last_active": "2026-01-01T00:00:00Z", "influence_radius": 3}
]"#;

const CONNECTIONS: &str = r#"[
  {"source": "v", "target": "g", "strength": 0.8,
   "connection_type": "collaboration", "created_at": "2026-01-15T00:00:00Z"},
  {"source": "v", "target": "ghost", "strength": 0.5,
   "connection_type": "mentorship", "created_at": "2026-01-15T00:00:00Z"}
]"#;

fn loaded() -> MapProgram {
    let mut prog = MapProgram::new(MapConfig::default());
    prog.set_wall_epoch(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    let ticket = prog.init().expect("first init");
    let outcome = prog.complete_refresh(ticket, SnapshotPayload::from_json(NODES, CONNECTIONS, None));
    assert_eq!(outcome, RefreshOutcome::Applied { revision: 1 });
    assert!(prog.step().expect("step").rendered);
    prog
}

#[test]
fn json_payload_becomes_snapshot() {
    let prog = loaded();
    let snapshot = prog.snapshot();
    assert_eq!(snapshot.revision(), 1);
    assert_eq!(snapshot.nodes().len(), 3);
    // The dangling "ghost" edge is dropped.
    assert_eq!(snapshot.connections().len(), 1);
    assert_eq!(prog.metrics().total_guardians, 3);
    assert_eq!(prog.filtered().len(), 3);
    // The node without coordinates is filtered in but never drawn.
    assert_eq!(prog.last_paint().nodes_drawn, 2);
    assert_eq!(prog.last_paint().nodes_skipped, 1);
    assert_eq!(prog.refresh_status(), &RefreshStatus::Idle);
}

#[test]
fn connections_mode_draws_edges() {
    let mut prog = loaded();
    assert_eq!(prog.last_paint().connections_drawn, 0);
    prog.dispatch(Action::SetMode(Mode::Connections));
    prog.step().unwrap();
    assert_eq!(prog.last_paint().connections_drawn, 1);
}

#[test]
fn filters_drive_paint_and_export() {
    let mut prog = loaded();
    prog.set_filters(FilterCriteria::new().with_tier(ReputationTier::Gold));
    let result = prog.step().unwrap();
    assert!(result.rendered);
    assert_eq!(prog.filtered().len(), 1);
    assert_eq!(prog.last_paint().nodes_drawn, 1);

    let file = prog.export_data(ExportFormat::Csv).unwrap();
    assert_eq!(file.filename, "guardian-map-2026-03-01.csv");
    let text = String::from_utf8(file.bytes).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("\"Ulaanbaatar\""));
    assert!(!text.contains("\"Nairobi\""));

    let png = prog.export_image().unwrap();
    assert_eq!(png.filename, "guardian-map-2026-03-01.png");
    assert_eq!(&png.bytes[1..4], b"PNG");
}

#[test]
fn filtered_out_nodes_are_not_clickable() {
    let mut prog = loaded();
    // "v" sits at the canvas center.
    prog.click(400.0, 200.0);
    prog.step().unwrap();
    assert_eq!(prog.view().selected, Some(NodeId::new("v")));

    prog.set_filters(FilterCriteria::new().with_tier(ReputationTier::Gold));
    prog.click(400.0, 200.0);
    prog.step().unwrap();
    assert_eq!(prog.view().selected, None);
}

#[test]
fn selection_is_pruned_when_node_disappears() {
    let mut prog = loaded();
    prog.dispatch(Action::Select(Some(NodeId::new("g"))));
    prog.step().unwrap();
    assert_eq!(prog.selected_node().map(|n| n.city.as_str()), Some("Ulaanbaatar"));

    prog.request_refresh();
    let ticket = prog.step().unwrap().refresh.expect("manual refresh");
    let without_g = r#"[{"id": "v", "wallet": "0xv", "latitude": 0.0, "longitude": 0.0,
        "truth_score": 95, "capsule_count": 40, "region": "Africa", "country": "Kenya",
        "city": "Nairobi", "reputation_tier": "Veritas", "activity_level": "high",
        "last_active": "2026-03-01T00:00:00Z", "influence_radius": 10}]"#;
    prog.complete_refresh(ticket, SnapshotPayload::from_json(without_g, "[]", None));
    assert_eq!(prog.view().selected, None);
    assert!(prog.is_dirty());
    assert!(prog.step().unwrap().rendered);
    assert!(!prog.last_paint().selection_drawn);
}

#[test]
fn selection_survives_refresh_when_node_remains() {
    let mut prog = loaded();
    prog.dispatch(Action::Select(Some(NodeId::new("v"))));
    prog.step().unwrap();
    prog.request_refresh();
    let ticket = prog.step().unwrap().refresh.unwrap();
    prog.complete_refresh(ticket, SnapshotPayload::from_json(NODES, "[]", None));
    assert_eq!(prog.view().selected, Some(NodeId::new("v")));
}

#[test]
fn out_of_order_completion_is_discarded() {
    let mut prog = MapProgram::new(MapConfig::default().with_poll_interval(Duration::from_secs(5)));
    let first = prog.init().unwrap();
    prog.request_refresh();
    let second = prog.step().unwrap().refresh.unwrap();

    // The newer fetch lands first.
    let applied = prog.complete_refresh(second, SnapshotPayload::from_json(NODES, "[]", None));
    assert_eq!(applied, RefreshOutcome::Applied { revision: 2 });

    // The older one arrives late and must not overwrite it.
    let late = prog.complete_refresh(first, Ok(SnapshotPayload::default()));
    assert_eq!(late, RefreshOutcome::Stale { seq: 1, latest: 2 });
    assert_eq!(prog.snapshot().revision(), 2);
    assert_eq!(prog.snapshot().nodes().len(), 3);
}

#[test]
fn failure_then_recovery() {
    let mut prog = loaded();
    let offline = MemoryRepository::default().with_failure("connection refused");

    prog.advance_time(Duration::from_secs(30));
    let ticket = prog.step().unwrap().refresh.expect("poll due");
    let outcome = prog.complete_refresh(ticket, fetch_payload(&offline));
    assert_eq!(outcome, RefreshOutcome::Failed);
    assert!(matches!(prog.refresh_status(), RefreshStatus::Failed(msg) if msg.contains("refused")));
    assert_eq!(prog.snapshot().revision(), 1);

    // The next poll retries on schedule.
    prog.advance_time(Duration::from_secs(30));
    let ticket = prog.step().unwrap().refresh.expect("next poll");
    let outcome = prog.complete_refresh(ticket, SnapshotPayload::from_json(NODES, "[]", None));
    assert_eq!(outcome, RefreshOutcome::Applied { revision: 3 });
    assert_eq!(prog.refresh_status(), &RefreshStatus::Idle);
}

#[test]
fn decode_failure_is_reported() {
    let mut prog = MapProgram::new(MapConfig::default());
    let ticket = prog.init().unwrap();
    let result = SnapshotPayload::from_json("not json", "[]", None);
    assert!(matches!(result, Err(FetchError::Decode(_))));
    assert_eq!(prog.complete_refresh(ticket, result), RefreshOutcome::Failed);
    assert!(prog.snapshot().nodes().is_empty());
}

#[test]
fn heatmap_mode_changes_pixels() {
    let mut prog = loaded();
    let before = prog.canvas().to_rgba8();
    prog.dispatch(Action::SetMode(Mode::Heatmap));
    prog.step().unwrap();
    assert_ne!(prog.canvas().to_rgba8(), before);
}
