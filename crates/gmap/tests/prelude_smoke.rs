//! Drives the map through the facade only.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use gmap::prelude::*;
use gmap::{ActivityLevel, MemoryRepository, RefreshOutcome};

fn guardian(id: &str, lat: f64, long: f64, tier: ReputationTier) -> GuardianNode {
    GuardianNode {
        id: NodeId::new(id),
        wallet: format!("0x{id}"),
        latitude: Some(lat),
        longitude: Some(long),
        truth_score: 60.0,
        capsule_count: 4,
        region: "Americas".into(),
        country: "Peru".into(),
        city: "Lima".into(),
        reputation_tier: tier,
        activity_level: ActivityLevel::Medium,
        last_active: Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
        specialties: Default::default(),
        connections: Vec::new(),
        influence_radius: 4.0,
    }
}

fn run() -> Result<()> {
    let repo = MemoryRepository::new(
        vec![
            guardian("a", -12.0, -77.0, ReputationTier::Bronze),
            guardian("b", 51.5, 0.0, ReputationTier::Veritas),
        ],
        Vec::new(),
    );

    let mut map = MapProgram::new(MapConfig::default().with_size(400, 200));
    let ticket = map.init()?;
    let outcome = map.complete_refresh(ticket, fetch_payload(&repo));
    assert_eq!(outcome, RefreshOutcome::Applied { revision: 1 });

    map.set_filters(FilterCriteria::new().with_tier(ReputationTier::Veritas));
    map.dispatch(Action::SetMode(Mode::Heatmap));
    map.advance_time(Duration::from_millis(16));
    let step: StepResult = map.step()?;
    assert!(step.rendered);
    assert_eq!(map.filtered().len(), 1);

    let file = map.export_data(ExportFormat::Json)?;
    assert_eq!(file.mime_type, "application/json");
    Ok(())
}

#[test]
fn facade_round_trip() {
    run().unwrap();
}

#[test]
fn program_errors_convert() {
    let mut map = MapProgram::new(MapConfig::default());
    let err: Error = map.step().unwrap_err().into();
    assert!(matches!(err, Error::Program(_)));
    assert_eq!(err.to_string(), "map program not initialized");
}

#[test]
fn export_errors_convert() {
    let mut map = MapProgram::new(MapConfig::default());
    map.init().unwrap();
    let err: Error = map.export_data(ExportFormat::Excel).unwrap_err().into();
    assert!(matches!(err, Error::Export(_)));
    assert!(std::error::Error::source(&err).is_some());
}
