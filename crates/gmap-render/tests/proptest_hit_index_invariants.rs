//! Property-based invariant tests for hit-testing and heat accumulation.
//!
//! 1. `HitIndex` agrees with the linear scan at every click point.
//! 2. A hit is always a renderable node whose disc contains the click.
//! 3. Clicking exactly on a lone node's center always hits it.
//! 4. Heat channels stay within `[0, 255]` and vanish outside every kernel.

use chrono::{TimeZone, Utc};
use gmap_core::{ActivityLevel, GuardianNode, NodeId, Point, Projection, ReputationTier};
use gmap_render::heatmap::build_heatmap;
use gmap_render::hit_test::{HitIndex, HitIndexConfig, hit_test_index, node_radius};
use proptest::prelude::*;

fn make_node(i: usize, lat: Option<f64>, long: f64, truth: f64, radius: f64) -> GuardianNode {
    GuardianNode {
        id: NodeId::new(format!("g-{i}")),
        wallet: format!("0x{i:04x}"),
        latitude: lat,
        longitude: Some(long),
        truth_score: truth,
        capsule_count: 0,
        region: String::new(),
        country: String::new(),
        city: String::new(),
        reputation_tier: ReputationTier::Silver,
        activity_level: ActivityLevel::Medium,
        last_active: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        specialties: Default::default(),
        connections: Vec::new(),
        influence_radius: radius,
    }
}

fn nodes_strategy() -> impl Strategy<Value = Vec<GuardianNode>> {
    prop::collection::vec(
        (
            prop::option::weighted(0.9, -90.0f64..=90.0),
            -180.0f64..=180.0,
            0.0f64..=100.0,
            1.0f64..=20.0,
        ),
        0..40,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (lat, long, truth, radius))| make_node(i, lat, long, truth, radius))
            .collect()
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Hit index vs linear scan
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn index_matches_linear_scan(
        nodes in nodes_strategy(),
        zoom in 25.0f64..=100.0,
        (w, h) in (1u32..=640, 1u32..=320),
        bucket in 1u32..=64,
        clicks in prop::collection::vec((-20.0f64..=660.0, -20.0f64..=340.0), 1..30),
    ) {
        let projection = Projection::new(w, h);
        let config = HitIndexConfig::default().with_bucket_size(bucket);
        let index = HitIndex::build(&nodes, zoom, &projection, config);
        for (x, y) in clicks {
            prop_assert_eq!(
                index.hit_test_index(x, y),
                hit_test_index(x, y, &nodes, zoom, &projection),
                "click ({}, {})", x, y
            );
        }
    }

    #[test]
    fn hit_is_renderable_and_contains_click(
        nodes in nodes_strategy(),
        zoom in 25.0f64..=100.0,
        x in 0.0f64..800.0,
        y in 0.0f64..400.0,
    ) {
        let projection = Projection::new(800, 400);
        if let Some(i) = hit_test_index(x, y, &nodes, zoom, &projection) {
            let center = projection.project_node(&nodes[i]);
            prop_assert!(center.is_some());
            if let Some(center) = center {
                let r = node_radius(nodes[i].truth_score, zoom);
                prop_assert!(Point::new(x, y).distance(center) <= r);
            }
        }
    }

    #[test]
    fn lone_node_center_is_hit(
        lat in -90.0f64..=90.0,
        long in -180.0f64..=180.0,
        truth in 0.0f64..=100.0,
        zoom in 25.0f64..=100.0,
    ) {
        let projection = Projection::new(1024, 512);
        let nodes = vec![make_node(0, Some(lat), long, truth, 5.0)];
        let center = projection.project_node(&nodes[0]);
        prop_assert!(center.is_some());
        if let Some(c) = center {
            let index = HitIndex::build(&nodes, zoom, &projection, HitIndexConfig::default());
            prop_assert_eq!(index.hit_test(c.x, c.y), Some(&nodes[0].id));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Heat raster bounds
// ═══════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn heat_channels_stay_in_range(nodes in nodes_strategy()) {
        let raster = build_heatmap(&nodes, 180, 90);
        let (w, h) = raster.size();
        for y in 0..h {
            for x in 0..w {
                for c in raster.sample(x, y) {
                    prop_assert!((0.0..=255.0).contains(&c));
                }
            }
        }
    }

    #[test]
    fn heat_vanishes_outside_all_kernels(nodes in nodes_strategy(), x in 0u32..180, y in 0u32..90) {
        let projection = Projection::new(180, 90);
        let reached = nodes.iter().any(|n| {
            projection.project_node(n).is_some_and(|c| {
                Point::new(f64::from(x), f64::from(y)).distance(c) < n.influence_radius * 2.0
            })
        });
        let raster = build_heatmap(&nodes, 180, 90);
        if !reached {
            prop_assert_eq!(raster.sample(x, y), [0.0; 4]);
        }
    }
}
