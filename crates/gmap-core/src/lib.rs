#![forbid(unsafe_code)]

//! Core: guardian data model, snapshot metrics, projection, filtering, and
//! the view-state machine.
//!
//! Everything in this crate is pure. The render, export, and runtime crates
//! build on these types and must route every geographic position through
//! [`projection::project`] so that what is drawn is also what is clickable.

pub mod filter;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod projection;
pub mod snapshot;
pub mod view_state;

pub use filter::{
    CAPSULE_COUNT_SLIDER_MAX, FilterCriteria, Predicate, TRUTH_SCORE_SLIDER_MAX, all_specialties,
    apply_filters, apply_filters_at,
};
pub use geometry::{GeoPoint, PixelRect, Point};
pub use model::{
    ActivityLevel, ConnectionType, GuardianNode, NetworkConnection, NodeId, ReputationTier,
};
pub use projection::{Projection, project};
pub use snapshot::{MapMetrics, Snapshot, TierCounts};
pub use view_state::{
    Action, ConnectionOverlay, Layer, LayerStack, Mode, ViewState, layers_for, reduce,
};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
