//! End-to-end export: filter a snapshot, paint it, export data and image.

use chrono::{NaiveDate, TimeZone, Utc};
use gmap_core::{
    ActivityLevel, FilterCriteria, GuardianNode, NodeId, ReputationTier, Snapshot, ViewState,
    apply_filters_at,
};
use gmap_export::{ExportFormat, export_data, export_image};
use gmap_render::{RenderConfig, RenderPipeline};
use pretty_assertions::assert_eq;

fn guardian(id: &str, tier: ReputationTier, lat: Option<f64>) -> GuardianNode {
    GuardianNode {
        id: NodeId::new(id),
        wallet: format!("0x{id}"),
        latitude: lat,
        longitude: Some(10.0),
        truth_score: 70.0,
        capsule_count: 4,
        region: "Europe".into(),
        country: "Italy".into(),
        city: "Rome".into(),
        reputation_tier: tier,
        activity_level: ActivityLevel::High,
        last_active: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        specialties: Default::default(),
        connections: Vec::new(),
        influence_radius: 8.0,
    }
}

#[test]
fn exports_follow_the_filtered_set() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
    let snapshot = Snapshot::new(
        3,
        vec![
            guardian("a", ReputationTier::Gold, Some(41.9)),
            guardian("b", ReputationTier::Bronze, Some(41.9)),
            guardian("c", ReputationTier::Gold, None),
        ],
        Vec::new(),
        None,
        now,
    );
    let criteria = FilterCriteria::default().with_tier(ReputationTier::Gold);
    let filtered = apply_filters_at(snapshot.nodes(), &criteria, now);
    assert_eq!(filtered.len(), 2);

    let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

    // Unrenderable nodes are still exported.
    let csv = export_data(&filtered, ExportFormat::Csv, date).unwrap();
    let text = String::from_utf8(csv.bytes).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert!(text.lines().nth(2).is_some_and(|l| l.starts_with("\"c\",\"0xc\",\"\",")));

    let mut pipeline = RenderPipeline::new(320, 160, RenderConfig::default());
    let stats = pipeline.paint(&snapshot, &filtered, &ViewState::default());
    assert_eq!(stats.nodes_drawn, 1);
    assert_eq!(stats.nodes_skipped, 1);

    let png = export_image(pipeline.canvas(), date).unwrap();
    assert_eq!(png.filename, "guardian-map-2026-03-01.png");
    let decoded = image::load_from_memory(&png.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (320, 160));
    assert_eq!(decoded.as_raw(), &pipeline.canvas().to_rgba8());
}
