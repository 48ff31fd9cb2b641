#![forbid(unsafe_code)]

//! Immutable network snapshot and its aggregate metrics.
//!
//! A [`Snapshot`] is built once per successful fetch and never mutated
//! afterwards; the runtime swaps whole snapshots behind an `Arc`.
//! Connections are validated against the node set on construction.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::filter::RECENT_WINDOW_HOURS;
use crate::model::{GuardianNode, NetworkConnection, NodeId, ReputationTier};

/// Node counts per reputation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierCounts {
    pub bronze: usize,
    pub silver: usize,
    pub gold: usize,
    pub veritas: usize,
}

impl TierCounts {
    /// Count for one tier.
    pub const fn get(&self, tier: ReputationTier) -> usize {
        match tier {
            ReputationTier::Bronze => self.bronze,
            ReputationTier::Silver => self.silver,
            ReputationTier::Gold => self.gold,
            ReputationTier::Veritas => self.veritas,
        }
    }

    fn bump(&mut self, tier: ReputationTier) {
        let slot = match tier {
            ReputationTier::Bronze => &mut self.bronze,
            ReputationTier::Silver => &mut self.silver,
            ReputationTier::Gold => &mut self.gold,
            ReputationTier::Veritas => &mut self.veritas,
        };
        *slot += 1;
    }
}

/// Aggregate network statistics.
///
/// Recomputed (or re-fetched) wholesale for every snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapMetrics {
    pub total_guardians: usize,
    /// Guardians active within the last 24 hours.
    pub active_guardians: usize,
    pub global_truth_score: f64,
    pub average_truth_score: f64,
    /// Percentage of active guardians, `[0, 100]`.
    pub active_rate: f64,
    pub countries_active: usize,
    pub tier_counts: TierCounts,
    pub total_connections: usize,
    /// Nodes without usable coordinates.
    pub unrenderable_nodes: usize,
    /// Region with the most guardians (ties: lexicographically smallest).
    pub busiest_region: Option<String>,
}

impl MapMetrics {
    /// Compute metrics from raw records.
    pub fn compute(
        nodes: &[GuardianNode],
        connections: &[NetworkConnection],
        now: DateTime<Utc>,
    ) -> Self {
        let window = Duration::hours(RECENT_WINDOW_HOURS);
        let mut metrics = MapMetrics {
            total_guardians: nodes.len(),
            total_connections: connections.len(),
            ..MapMetrics::default()
        };

        let mut countries = HashSet::new();
        let mut regions: BTreeMap<&str, usize> = BTreeMap::new();
        for node in nodes {
            if node.active_within(now, window) {
                metrics.active_guardians += 1;
            }
            if !node.is_renderable() {
                metrics.unrenderable_nodes += 1;
            }
            if !node.country.is_empty() {
                countries.insert(node.country.as_str());
            }
            if !node.region.is_empty() {
                *regions.entry(node.region.as_str()).or_default() += 1;
            }
            metrics.global_truth_score += node.truth_score;
            metrics.tier_counts.bump(node.reputation_tier);
        }
        metrics.countries_active = countries.len();

        // BTreeMap iterates in key order; keep the first maximum.
        let mut best: Option<(&str, usize)> = None;
        for (region, count) in regions {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((region, count));
            }
        }
        metrics.busiest_region = best.map(|(r, _)| r.to_owned());

        if !nodes.is_empty() {
            let total = nodes.len() as f64;
            metrics.average_truth_score = metrics.global_truth_score / total;
            metrics.active_rate = metrics.active_guardians as f64 / total * 100.0;
        }
        metrics
    }
}

/// Read-only view of the guardian network at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    revision: u64,
    fetched_at: Option<DateTime<Utc>>,
    nodes: Vec<GuardianNode>,
    connections: Vec<NetworkConnection>,
    metrics: MapMetrics,
    index: HashMap<NodeId, usize>,
}

impl Snapshot {
    /// Build a snapshot, dropping connections that reference unknown nodes
    /// and clamping strengths into `[0, 1]`.
    ///
    /// `metrics` supplied by the repository are used verbatim; otherwise
    /// they are computed from the records.
    pub fn new(
        revision: u64,
        nodes: Vec<GuardianNode>,
        connections: Vec<NetworkConnection>,
        metrics: Option<MapMetrics>,
        now: DateTime<Utc>,
    ) -> Self {
        let index: HashMap<NodeId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let before = connections.len();
        let connections: Vec<NetworkConnection> = connections
            .into_iter()
            .filter(|c| index.contains_key(&c.source) && index.contains_key(&c.target))
            .map(|mut c| {
                c.strength = if c.strength.is_nan() {
                    0.0
                } else {
                    c.strength.clamp(0.0, 1.0)
                };
                c
            })
            .collect();
        let dropped = before - connections.len();
        if dropped > 0 {
            crate::debug!(revision, dropped, "dropped dangling connections");
        }

        let metrics = metrics.unwrap_or_else(|| MapMetrics::compute(&nodes, &connections, now));
        Self {
            revision,
            fetched_at: Some(now),
            nodes,
            connections,
            metrics,
            index,
        }
    }

    /// An empty snapshot (revision 0), shown before the first fetch lands.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    #[inline]
    pub fn nodes(&self) -> &[GuardianNode] {
        &self.nodes
    }

    #[inline]
    pub fn connections(&self) -> &[NetworkConnection] {
        &self.connections
    }

    #[inline]
    pub fn metrics(&self) -> &MapMetrics {
        &self.metrics
    }

    /// Look up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&GuardianNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Whether a node id is present.
    #[inline]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }
}
