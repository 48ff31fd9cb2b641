#![forbid(unsafe_code)]

//! Host-driven runtime for the Guardian Map.
//!
//! Nothing here spawns threads or blocks. The host owns the event loop, the
//! clock, and the network: it feeds input and fetch results into
//! [`MapProgram`] and calls [`MapProgram::step`] once per frame.

pub mod clock;
pub mod config;
pub mod program;
pub mod refresh;
pub mod repository;

pub use clock::DeterministicClock;
pub use config::{DEFAULT_FETCH_TIMEOUT, DEFAULT_POLL_INTERVAL, MapConfig};
pub use program::{MapProgram, ProgramError, StepResult};
pub use refresh::{FetchTicket, PollTimer, RefreshOutcome, RefreshStatus, RefreshTracker};
#[cfg(all(feature = "http", not(target_arch = "wasm32")))]
pub use repository::HttpRepository;
pub use repository::{
    FetchError, GuardianRepository, MemoryRepository, SnapshotPayload, fetch_payload,
};
