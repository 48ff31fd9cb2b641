#![forbid(unsafe_code)]

//! Host-driven map program.
//!
//! [`MapProgram`] owns the snapshot, filters, view state, canvas and
//! refresh bookkeeping. The host drives it without threads or blocking:
//!
//! 1. Call [`MapProgram::init`] once; fetch the returned ticket's data.
//! 2. Push input via [`MapProgram::dispatch`], [`MapProgram::click`],
//!    [`MapProgram::set_filters`], [`MapProgram::resize`].
//! 3. Advance time via [`MapProgram::advance_time`].
//! 4. Call [`MapProgram::step`] once per animation frame. Queued input is
//!    applied in order and at most one repaint happens, however many
//!    mutations were queued.
//! 5. When a fetch finishes, call [`MapProgram::complete_refresh`].
//!
//! # Example
//!
//! ```
//! use core::time::Duration;
//! use gmap_core::{Action, Mode};
//! use gmap_runtime::{MapConfig, MapProgram, MemoryRepository, fetch_payload};
//!
//! let repo = MemoryRepository::default();
//! let mut prog = MapProgram::new(MapConfig::default());
//! let ticket = prog.init().unwrap();
//! prog.complete_refresh(ticket, fetch_payload(&repo));
//!
//! prog.dispatch(Action::SetMode(Mode::Heatmap));
//! prog.advance_time(Duration::from_millis(16));
//! let result = prog.step().unwrap();
//! assert!(result.rendered);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use core::time::Duration;

use chrono::{DateTime, Utc};
use gmap_core::{
    Action, FilterCriteria, GuardianNode, MapMetrics, NodeId, Snapshot, ViewState,
    apply_filters_at, reduce,
};
use gmap_export::{
    ExportError, ExportFile, ExportFormat, NoReports, ReportExporter, export_data, export_image,
};
use gmap_render::{Canvas, HitIndex, PaintStats, RenderPipeline};
use tracing::{debug, info, warn};

use crate::clock::DeterministicClock;
use crate::config::MapConfig;
use crate::refresh::{FetchTicket, PollTimer, RefreshOutcome, RefreshStatus, RefreshTracker};
use crate::repository::{FetchError, SnapshotPayload};

/// Lifecycle misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramError {
    AlreadyInitialized,
    NotInitialized,
}

impl core::fmt::Display for ProgramError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyInitialized => f.write_str("map program already initialized"),
            Self::NotInitialized => f.write_str("map program not initialized"),
        }
    }
}

impl std::error::Error for ProgramError {}

/// Result of a single [`MapProgram::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether a frame was painted during this step.
    pub rendered: bool,
    /// Number of painted frames so far (monotonically increasing).
    pub frame_idx: u64,
    /// Number of queued inputs applied during this step.
    pub actions_processed: u32,
    /// A fetch the host should start now.
    pub refresh: Option<FetchTicket>,
}

/// Queued host input.
#[derive(Debug, Clone, PartialEq)]
enum Input {
    Action(Action),
    Click { x: f64, y: f64 },
    Filters(FilterCriteria),
    Resize { width: u32, height: u32 },
}

/// Host-driven, non-blocking guardian map.
pub struct MapProgram {
    config: MapConfig,
    clock: DeterministicClock,
    snapshot: Arc<Snapshot>,
    criteria: FilterCriteria,
    filtered: Vec<GuardianNode>,
    view: ViewState,
    pipeline: RenderPipeline,
    hit_index: Option<HitIndex>,
    refresh: RefreshTracker,
    poll: PollTimer,
    inputs: VecDeque<Input>,
    manual_refresh: bool,
    initialized: bool,
    dirty: bool,
    filters_dirty: bool,
    frame_idx: u64,
    last_paint: PaintStats,
    last_export_error: Option<String>,
    reports: Box<dyn ReportExporter>,
}

impl MapProgram {
    /// Create an uninitialized program showing an empty snapshot.
    #[must_use]
    pub fn new(config: MapConfig) -> Self {
        Self::with_clock(config, DeterministicClock::new())
    }

    /// Create a program with an existing clock.
    #[must_use]
    pub fn with_clock(config: MapConfig, clock: DeterministicClock) -> Self {
        Self {
            pipeline: RenderPipeline::new(config.width, config.height, config.render),
            poll: PollTimer::new(config.poll_interval),
            config,
            clock,
            snapshot: Arc::new(Snapshot::empty()),
            criteria: FilterCriteria::default(),
            filtered: Vec::new(),
            view: ViewState::default(),
            hit_index: None,
            refresh: RefreshTracker::new(),
            inputs: VecDeque::new(),
            manual_refresh: false,
            initialized: false,
            dirty: true,
            filters_dirty: true,
            frame_idx: 0,
            last_paint: PaintStats::default(),
            last_export_error: None,
            reports: Box::new(NoReports),
        }
    }

    /// Paint the first frame and issue the initial fetch.
    ///
    /// Must be called exactly once before [`step`](Self::step).
    pub fn init(&mut self) -> Result<FetchTicket, ProgramError> {
        if self.initialized {
            return Err(ProgramError::AlreadyInitialized);
        }
        self.initialized = true;
        self.render_frame();
        let ticket = self.issue_fetch();
        info!(
            width = self.config.width,
            height = self.config.height,
            "map program initialized"
        );
        Ok(ticket)
    }

    /// Apply queued input, schedule fetches, and paint if anything changed.
    pub fn step(&mut self) -> Result<StepResult, ProgramError> {
        if !self.initialized {
            return Err(ProgramError::NotInitialized);
        }

        // 1. Apply every queued input, in order.
        let mut actions_processed: u32 = 0;
        while let Some(input) = self.inputs.pop_front() {
            actions_processed += 1;
            self.apply(input);
        }

        // 2. Manual refresh always fetches; polls wait for the newest fetch
        //    unless it has gone unanswered past the fetch timeout.
        let now = self.clock.now_mono();
        let stalled = self
            .poll
            .since_last(now)
            .is_some_and(|age| age >= self.config.fetch_timeout);
        let refresh = if self.manual_refresh
            || (self.poll.is_due(now) && (!self.refresh.in_flight() || stalled))
        {
            if stalled && self.refresh.in_flight() && !self.manual_refresh {
                warn!(
                    seq = self.refresh.latest_seq(),
                    "fetch unanswered past timeout; superseding"
                );
            }
            self.manual_refresh = false;
            Some(self.issue_fetch())
        } else {
            None
        };

        // 3. One coalesced repaint.
        let rendered = if self.dirty {
            self.render_frame();
            true
        } else {
            false
        };

        Ok(StepResult {
            rendered,
            frame_idx: self.frame_idx,
            actions_processed,
            refresh,
        })
    }

    /// Queue a view-state transition.
    pub fn dispatch(&mut self, action: Action) {
        self.inputs.push_back(Input::Action(action));
    }

    /// Queue a pointer click in canvas pixels.
    ///
    /// Clicks test against the frame on screen when they are applied. A
    /// click on empty space clears the selection.
    pub fn click(&mut self, x: f64, y: f64) {
        self.inputs.push_back(Input::Click { x, y });
    }

    /// Queue a filter change.
    pub fn set_filters(&mut self, criteria: FilterCriteria) {
        self.inputs.push_back(Input::Filters(criteria));
    }

    /// Queue a canvas resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.inputs.push_back(Input::Resize { width, height });
    }

    /// Ask for a fetch on the next step, even if one is outstanding.
    pub fn request_refresh(&mut self) {
        self.manual_refresh = true;
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    /// Re-anchor wall-clock time.
    pub fn set_wall_epoch(&mut self, epoch: DateTime<Utc>) {
        self.clock.set_epoch(epoch);
    }

    /// Hand a finished fetch back to the program.
    ///
    /// Only the newest ticket can replace the snapshot; older completions
    /// are dropped. A failure keeps the last good snapshot on screen.
    pub fn complete_refresh(
        &mut self,
        ticket: FetchTicket,
        result: Result<SnapshotPayload, FetchError>,
    ) -> RefreshOutcome {
        let outcome = match &result {
            Ok(_) => self.refresh.complete(ticket, Ok(())),
            Err(err) => self.refresh.complete(ticket, Err(err.to_string())),
        };
        match (&outcome, result) {
            (RefreshOutcome::Applied { revision }, Ok(payload)) => {
                self.install(*revision, payload);
            }
            (RefreshOutcome::Failed, Err(err)) => {
                warn!(seq = ticket.seq(), error = %err, "refresh failed; keeping last snapshot");
            }
            (RefreshOutcome::Stale { seq, latest }, _) => {
                debug!(seq, latest, "discarded stale refresh");
            }
            _ => {}
        }
        outcome
    }

    fn issue_fetch(&mut self) -> FetchTicket {
        let ticket = self.refresh.issue();
        self.poll.mark(self.clock.now_mono());
        debug!(seq = ticket.seq(), "issued fetch");
        ticket
    }

    fn install(&mut self, revision: u64, payload: SnapshotPayload) {
        let snapshot = Snapshot::new(
            revision,
            payload.nodes,
            payload.connections,
            payload.metrics,
            self.clock.now_utc(),
        );
        if let Some(id) = &self.view.selected
            && !snapshot.contains(id)
        {
            debug!(selected = %id, "selection vanished from snapshot");
            self.view = reduce(&self.view, Action::ClearSelection);
        }
        info!(
            revision,
            nodes = snapshot.nodes().len(),
            connections = snapshot.connections().len(),
            "snapshot replaced"
        );
        self.snapshot = Arc::new(snapshot);
        self.filters_dirty = true;
        self.dirty = true;
    }

    fn apply(&mut self, input: Input) {
        match input {
            Input::Action(action) => self.reduce(action),
            Input::Click { x, y } => {
                let hit = self.hit_test(x, y);
                self.reduce(Action::Select(hit));
            }
            Input::Filters(criteria) => {
                if criteria != self.criteria {
                    self.criteria = criteria;
                    self.filters_dirty = true;
                    self.dirty = true;
                }
            }
            Input::Resize { width, height } => {
                if (width, height) != (self.config.width, self.config.height) {
                    self.config.width = width;
                    self.config.height = height;
                    self.pipeline.resize(width, height);
                    self.hit_index = None;
                    self.dirty = true;
                }
            }
        }
    }

    fn reduce(&mut self, action: Action) {
        let next = reduce(&self.view, action);
        if next == self.view {
            return;
        }
        if next.zoom != self.view.zoom {
            self.hit_index = None;
        }
        self.view = next;
        self.dirty = true;
    }

    fn hit_test(&mut self, x: f64, y: f64) -> Option<NodeId> {
        if self.filters_dirty {
            self.refilter();
        }
        let zoom = self.view.zoom;
        let projection = self.pipeline.projection();
        let config = self.config.hit_index;
        let filtered = &self.filtered;
        self.hit_index
            .get_or_insert_with(|| HitIndex::build(filtered, zoom, &projection, config))
            .hit_test(x, y)
            .cloned()
    }

    fn refilter(&mut self) {
        self.filtered = apply_filters_at(self.snapshot.nodes(), &self.criteria, self.clock.now_utc());
        self.hit_index = None;
        self.filters_dirty = false;
    }

    fn render_frame(&mut self) {
        if self.filters_dirty {
            self.refilter();
        }
        self.last_paint = self.pipeline.paint(&self.snapshot, &self.filtered, &self.view);
        self.dirty = false;
        self.frame_idx += 1;
    }

    // --- Export ---

    fn export_date(&self) -> chrono::NaiveDate {
        self.clock.now_utc().date_naive()
    }

    fn record_export<T>(&mut self, result: Result<T, ExportError>) -> Result<T, ExportError> {
        match &result {
            Ok(_) => self.last_export_error = None,
            Err(err) => {
                warn!(error = %err, "export failed");
                self.last_export_error = Some(err.to_string());
            }
        }
        result
    }

    /// Export the filtered set as CSV or JSON.
    pub fn export_data(&mut self, format: ExportFormat) -> Result<ExportFile, ExportError> {
        if self.filters_dirty {
            self.refilter();
        }
        let result = match format {
            ExportFormat::Report => self.reports.export_report(
                &self.filtered,
                self.snapshot.metrics(),
                self.export_date(),
            ),
            _ => export_data(&self.filtered, format, self.export_date()),
        };
        self.record_export(result)
    }

    /// Export the last painted frame as PNG.
    pub fn export_image(&mut self) -> Result<ExportFile, ExportError> {
        let result = export_image(self.pipeline.canvas(), self.export_date());
        self.record_export(result)
    }

    /// Install a report exporter.
    pub fn set_report_exporter(&mut self, exporter: Box<dyn ReportExporter>) {
        self.reports = exporter;
    }

    /// Message of the most recent failed export, cleared by a success.
    pub fn last_export_error(&self) -> Option<&str> {
        self.last_export_error.as_deref()
    }

    // --- Accessors ---

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether a repaint is pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn clock(&self) -> &DeterministicClock {
        &self.clock
    }

    /// Current snapshot; cheap to clone and hold across refreshes.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn metrics(&self) -> &MapMetrics {
        self.snapshot.metrics()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Nodes passing the filters as of the last paint, click, or export.
    pub fn filtered(&self) -> &[GuardianNode] {
        &self.filtered
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// The selected node, looked up in the current snapshot.
    pub fn selected_node(&self) -> Option<&GuardianNode> {
        self.view.selected.as_ref().and_then(|id| self.snapshot.node(id))
    }

    pub fn refresh_status(&self) -> &RefreshStatus {
        self.refresh.status()
    }

    /// Canvas as of the last paint.
    pub fn canvas(&self) -> &Canvas {
        self.pipeline.canvas()
    }

    pub fn last_paint(&self) -> &PaintStats {
        &self.last_paint
    }
}

impl core::fmt::Debug for MapProgram {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MapProgram")
            .field("revision", &self.snapshot.revision())
            .field("view", &self.view)
            .field("criteria", &self.criteria)
            .field("frame_idx", &self.frame_idx)
            .field("dirty", &self.dirty)
            .field("status", self.refresh.status())
            .finish_non_exhaustive()
    }
}
