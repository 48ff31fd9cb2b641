#![forbid(unsafe_code)]

//! Guardian network records as served by the repository.
//!
//! Field names match the JSON wire shape (snake_case). Coordinates are
//! optional: a node with missing or malformed coordinates is still a valid
//! record, it just has no position on the map (see [`GuardianNode::position`]).

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::GeoPoint;

/// Stable node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Ordinal reputation classification driving node color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReputationTier {
    Bronze,
    Silver,
    Gold,
    Veritas,
}

impl ReputationTier {
    /// All tiers, lowest first.
    pub const ALL: [ReputationTier; 4] = [
        ReputationTier::Bronze,
        ReputationTier::Silver,
        ReputationTier::Gold,
        ReputationTier::Veritas,
    ];

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Veritas => "Veritas",
        }
    }

    /// Parse a tier name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ReputationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recent activity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

impl ActivityLevel {
    /// All levels, lowest first.
    pub const ALL: [ActivityLevel; 3] = [Self::Low, Self::Medium, Self::High];

    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Parse a level name, ignoring ASCII case.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of relationship between two guardians.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Collaboration,
    Verification,
    Influence,
    Mentorship,
}

impl ConnectionType {
    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collaboration => "collaboration",
            Self::Verification => "verification",
            Self::Influence => "influence",
            Self::Mentorship => "mentorship",
        }
    }
}

/// A reputation-scored network participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardianNode {
    pub id: NodeId,
    pub wallet: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Reputation score, nominally `[0, 100]`.
    pub truth_score: f64,
    pub capsule_count: u32,
    pub region: String,
    pub country: String,
    pub city: String,
    pub reputation_tier: ReputationTier,
    pub activity_level: ActivityLevel,
    pub last_active: DateTime<Utc>,
    #[serde(default)]
    pub specialties: BTreeSet<String>,
    /// Ids of connected guardians. Weak references: they may name nodes
    /// that are absent from the current snapshot.
    #[serde(default)]
    pub connections: Vec<NodeId>,
    /// Abstract radius sizing glow and heatmap contribution.
    pub influence_radius: f64,
}

impl GuardianNode {
    /// Validated geographic position, or `None` if the node is unrenderable.
    #[inline]
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::checked(self.latitude, self.longitude)
    }

    /// Whether the node can be drawn and hit-tested.
    #[inline]
    pub fn is_renderable(&self) -> bool {
        self.position().is_some()
    }

    /// Whether `last_active` falls within `window` before `now`.
    ///
    /// Timestamps in the future count as active.
    pub fn active_within(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_active) <= window
    }
}

/// A directed edge between two guardians.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConnection {
    pub source: NodeId,
    pub target: NodeId,
    /// Tie strength in `[0, 1]`.
    pub strength: f64,
    pub connection_type: ConnectionType,
    pub created_at: DateTime<Utc>,
}
