#![forbid(unsafe_code)]

//! Compound filter pipeline over the node snapshot.
//!
//! [`FilterCriteria`] is what the host's search panel edits. It decomposes
//! into independent [`Predicate`]s which are AND-combined, so the order in
//! which they are evaluated never changes the result.
//!
//! # Invariants
//!
//! 1. Output preserves input order.
//! 2. Wildcard / omitted criteria produce no predicate.
//! 3. Inverted or NaN ranges match nothing (empty result, never an error).
//! 4. Renderability is not a criterion: nodes without coordinates pass
//!    through so that exports stay complete.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{ActivityLevel, GuardianNode, ReputationTier};

/// Window for the "recently active" criterion.
pub const RECENT_WINDOW_HOURS: i64 = 24;

/// Upper end of the search panel's truth-score slider.
pub const TRUTH_SCORE_SLIDER_MAX: f64 = 200.0;

/// Upper end of the search panel's capsule-count slider.
pub const CAPSULE_COUNT_SLIDER_MAX: u32 = 50;

/// A range spanning the whole slider constrains nothing. NaN bounds fail
/// the test and stay active.
fn truth_range_active(range: Option<(f64, f64)>) -> Option<(f64, f64)> {
    range.filter(|&(min, max)| !(min <= 0.0 && max >= TRUTH_SCORE_SLIDER_MAX))
}

fn capsule_range_active(range: Option<(u32, u32)>) -> Option<(u32, u32)> {
    range.filter(|&(min, max)| !(min == 0 && max >= CAPSULE_COUNT_SLIDER_MAX))
}

/// Host-editable filter state.
///
/// Deserializes from the search panel's camelCase JSON. The string `"all"`
/// (or a missing field) is the wildcard for `region`, `tier`, and
/// `activityLevel`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Case-insensitive substring over wallet, region, city, country, and specialties.
    pub search_query: String,
    #[serde(with = "wildcard")]
    pub region: Option<String>,
    #[serde(with = "wildcard")]
    pub tier: Option<ReputationTier>,
    #[serde(with = "wildcard")]
    pub activity_level: Option<ActivityLevel>,
    /// Inclusive `[min, max]`; `[0, TRUTH_SCORE_SLIDER_MAX]` or wider is a wildcard.
    pub truth_score_range: Option<(f64, f64)>,
    /// Inclusive `[min, max]`; `[0, CAPSULE_COUNT_SLIDER_MAX]` or wider is a wildcard.
    pub capsule_count_range: Option<(u32, u32)>,
    /// Node passes if it has at least one of these.
    pub specialties: BTreeSet<String>,
    pub has_active_connections: bool,
    pub recently_active: bool,
}

impl FilterCriteria {
    /// Cleared criteria (everything wildcard).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search_query = query.into();
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_tier(mut self, tier: ReputationTier) -> Self {
        self.tier = Some(tier);
        self
    }

    #[must_use]
    pub fn with_activity_level(mut self, level: ActivityLevel) -> Self {
        self.activity_level = Some(level);
        self
    }

    #[must_use]
    pub fn with_truth_score_range(mut self, min: f64, max: f64) -> Self {
        self.truth_score_range = Some((min, max));
        self
    }

    #[must_use]
    pub fn with_capsule_count_range(mut self, min: u32, max: u32) -> Self {
        self.capsule_count_range = Some((min, max));
        self
    }

    #[must_use]
    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialties.insert(specialty.into());
        self
    }

    #[must_use]
    pub fn with_active_connections(mut self, on: bool) -> Self {
        self.has_active_connections = on;
        self
    }

    #[must_use]
    pub fn with_recently_active(mut self, on: bool) -> Self {
        self.recently_active = on;
        self
    }

    /// Add the specialty if absent, remove it if present.
    pub fn toggle_specialty(&mut self, specialty: &str) {
        if !self.specialties.remove(specialty) {
            self.specialties.insert(specialty.to_owned());
        }
    }

    /// Number of non-wildcard criteria (the "N active" badge).
    pub fn active_count(&self) -> usize {
        [
            !self.search_query.is_empty(),
            self.region.is_some(),
            self.tier.is_some(),
            self.activity_level.is_some(),
            truth_range_active(self.truth_score_range).is_some(),
            capsule_range_active(self.capsule_count_range).is_some(),
            !self.specialties.is_empty(),
            self.has_active_connections,
            self.recently_active,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Whether every criterion is a wildcard.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        self.active_count() == 0
    }

    /// Decompose into independent predicates.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut out = Vec::with_capacity(self.active_count());
        if !self.search_query.is_empty() {
            out.push(Predicate::Search(self.search_query.to_lowercase()));
        }
        if let Some(region) = &self.region {
            out.push(Predicate::Region(region.clone()));
        }
        if let Some(tier) = self.tier {
            out.push(Predicate::Tier(tier));
        }
        if let Some(level) = self.activity_level {
            out.push(Predicate::Activity(level));
        }
        if let Some((min, max)) = truth_range_active(self.truth_score_range) {
            out.push(Predicate::TruthScore { min, max });
        }
        if let Some((min, max)) = capsule_range_active(self.capsule_count_range) {
            out.push(Predicate::CapsuleCount { min, max });
        }
        if !self.specialties.is_empty() {
            out.push(Predicate::Specialties(self.specialties.clone()));
        }
        if self.has_active_connections {
            out.push(Predicate::HasConnections);
        }
        if self.recently_active {
            out.push(Predicate::RecentlyActive(Duration::hours(RECENT_WINDOW_HOURS)));
        }
        out
    }
}

/// One independent filter test.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Lowercased needle.
    Search(String),
    Region(String),
    Tier(ReputationTier),
    Activity(ActivityLevel),
    TruthScore { min: f64, max: f64 },
    CapsuleCount { min: u32, max: u32 },
    Specialties(BTreeSet<String>),
    HasConnections,
    RecentlyActive(Duration),
}

impl Predicate {
    /// Evaluate against a node. `now` only matters for `RecentlyActive`.
    pub fn matches(&self, node: &GuardianNode, now: DateTime<Utc>) -> bool {
        match self {
            Self::Search(needle) => {
                let hit = |s: &str| s.to_lowercase().contains(needle.as_str());
                hit(&node.wallet)
                    || hit(&node.region)
                    || hit(&node.city)
                    || hit(&node.country)
                    || node.specialties.iter().any(|s| hit(s))
            }
            Self::Region(region) => node.region == *region,
            Self::Tier(tier) => node.reputation_tier == *tier,
            Self::Activity(level) => node.activity_level == *level,
            // NaN bounds fail both comparisons, so they match nothing.
            Self::TruthScore { min, max } => node.truth_score >= *min && node.truth_score <= *max,
            Self::CapsuleCount { min, max } => {
                node.capsule_count >= *min && node.capsule_count <= *max
            }
            Self::Specialties(wanted) => !node.specialties.is_disjoint(wanted),
            Self::HasConnections => !node.connections.is_empty(),
            Self::RecentlyActive(window) => node.active_within(now, *window),
        }
    }
}

/// Keep nodes matching every predicate, in input order.
pub fn apply_predicates(
    nodes: &[GuardianNode],
    predicates: &[Predicate],
    now: DateTime<Utc>,
) -> Vec<GuardianNode> {
    nodes
        .iter()
        .filter(|node| predicates.iter().all(|p| p.matches(node, now)))
        .cloned()
        .collect()
}

/// Apply `criteria` with an explicit clock.
pub fn apply_filters_at(
    nodes: &[GuardianNode],
    criteria: &FilterCriteria,
    now: DateTime<Utc>,
) -> Vec<GuardianNode> {
    if criteria.is_wildcard() {
        return nodes.to_vec();
    }
    apply_predicates(nodes, &criteria.predicates(), now)
}

/// Apply `criteria` against the wall clock.
pub fn apply_filters(nodes: &[GuardianNode], criteria: &FilterCriteria) -> Vec<GuardianNode> {
    apply_filters_at(nodes, criteria, Utc::now())
}

/// Sorted, de-duplicated specialties across `nodes`.
pub fn all_specialties(nodes: &[GuardianNode]) -> Vec<String> {
    nodes
        .iter()
        .flat_map(|n| n.specialties.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Values that can stand behind an `"all"` wildcard.
pub trait Selector: Sized {
    fn parse_selector(raw: &str) -> Option<Self>;
    fn selector_name(&self) -> &str;
}

impl Selector for String {
    fn parse_selector(raw: &str) -> Option<Self> {
        Some(raw.to_owned())
    }

    fn selector_name(&self) -> &str {
        self
    }
}

impl Selector for ReputationTier {
    fn parse_selector(raw: &str) -> Option<Self> {
        ReputationTier::parse(raw)
    }

    fn selector_name(&self) -> &str {
        self.as_str()
    }
}

impl Selector for ActivityLevel {
    fn parse_selector(raw: &str) -> Option<Self> {
        ActivityLevel::parse(raw)
    }

    fn selector_name(&self) -> &str {
        self.as_str()
    }
}

/// `Option<T>` ⇄ `"all" | T` serde adapter.
mod wildcard {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Selector;

    const ALL: &str = "all";

    pub fn serialize<S: Serializer, T: Selector>(
        value: &Option<T>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(v.selector_name()),
            None => serializer.serialize_str(ALL),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>, T: Selector>(
        deserializer: D,
    ) -> Result<Option<T>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.is_empty() || s.eq_ignore_ascii_case(ALL) => Ok(None),
            Some(s) => T::parse_selector(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("unknown filter value `{s}`"))),
        }
    }
}
