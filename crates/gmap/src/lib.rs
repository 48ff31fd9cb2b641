#![forbid(unsafe_code)]

//! Guardian Map public facade.
//!
//! Re-exports the types a host needs to embed the map and offers a small
//! prelude. The host supplies the clock, the network, and the pointer; the
//! map supplies pixels, selections, and export files.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use gmap_core::{
    Action, ActivityLevel, ConnectionOverlay, ConnectionType, FilterCriteria, GeoPoint,
    GuardianNode, Layer, MapMetrics, Mode, NetworkConnection, NodeId, Point, Projection,
    ReputationTier, Snapshot, TierCounts, ViewState, all_specialties, apply_filters,
    apply_filters_at, project, reduce,
};

#[cfg(feature = "tracing-json")]
pub use gmap_core::logging::init_json_subscriber;

// --- Render re-exports -----------------------------------------------------

pub use gmap_render::{
    Canvas, HeatmapConfig, HitIndex, HitIndexConfig, PaintStats, RenderConfig, RenderPipeline,
    Rgba, build_heatmap, hit_test, node_radius,
};

// --- Export re-exports -----------------------------------------------------

pub use gmap_export::{ExportError, ExportFile, ExportFormat, NoReports, ReportExporter};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
pub use gmap_runtime::HttpRepository;
pub use gmap_runtime::{
    DeterministicClock, FetchError, FetchTicket, GuardianRepository, MapConfig, MapProgram,
    MemoryRepository, ProgramError, RefreshOutcome, RefreshStatus, SnapshotPayload, StepResult,
    fetch_payload,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for map hosts.
#[derive(Debug)]
pub enum Error {
    /// Fetching or decoding repository data failed.
    Fetch(FetchError),
    /// Producing an export file failed.
    Export(ExportError),
    /// The program was driven out of order.
    Program(ProgramError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
            Self::Program(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(err) => Some(err),
            Self::Export(err) => Some(err),
            Self::Program(err) => Some(err),
        }
    }
}

impl From<FetchError> for Error {
    fn from(err: FetchError) -> Self {
        Self::Fetch(err)
    }
}

impl From<ExportError> for Error {
    fn from(err: ExportError) -> Self {
        Self::Export(err)
    }
}

impl From<ProgramError> for Error {
    fn from(err: ProgramError) -> Self {
        Self::Program(err)
    }
}

/// Standard result type for map APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Action, Error, ExportFormat, FilterCriteria, GuardianNode, GuardianRepository, MapConfig,
        MapProgram, Mode, NodeId, ReputationTier, Result, SnapshotPayload, StepResult,
        fetch_payload,
    };

    pub use crate::{core, export, render, runtime};
}

pub use gmap_core as core;
pub use gmap_export as export;
pub use gmap_render as render;
pub use gmap_runtime as runtime;
