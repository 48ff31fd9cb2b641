#![forbid(unsafe_code)]

//! View state and render-mode machine.
//!
//! All UI-mutable fields live in one [`ViewState`] value, updated only
//! through [`reduce`]. Transitions are user-driven; there are no automatic
//! transitions and no terminal state. [`layers_for`] decides which layers
//! take part in a paint without touching a canvas.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::model::NodeId;

/// Minimum zoom level.
pub const ZOOM_MIN: f64 = 25.0;
/// Maximum zoom level.
pub const ZOOM_MAX: f64 = 100.0;
/// Initial zoom level.
pub const ZOOM_DEFAULT: f64 = 50.0;
/// Increment used by [`Action::ZoomIn`] / [`Action::ZoomOut`].
pub const ZOOM_STEP: f64 = 5.0;

/// Render mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Plain node map.
    #[default]
    Standard,
    /// Heat-intensity overlay.
    Heatmap,
    /// Connection graph overlay.
    Connections,
}

impl Mode {
    /// Next mode in toolbar order.
    pub const fn next(self) -> Self {
        match self {
            Self::Standard => Self::Heatmap,
            Self::Heatmap => Self::Connections,
            Self::Connections => Self::Standard,
        }
    }
}

/// Whether the `show_connections` toggle draws edges outside Connections mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionOverlay {
    /// Edges are drawn only in [`Mode::Connections`]; the toggle is carried
    /// as state but does not affect layers.
    #[default]
    ModeOnly,
    /// Edges are drawn in Connections mode, and in any other mode while
    /// `show_connections` is on.
    ModeOrToggle,
}

/// A paint layer, in back-to-front order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Background,
    Connections,
    Heatmap,
    Nodes,
    SelectionRing,
}

/// Ordered layer list for one paint.
pub type LayerStack = SmallVec<[Layer; 5]>;

/// Layers that participate in a paint.
///
/// Background and Nodes always draw; Connections in Connections mode (or
/// per `overlay`); Heatmap in Heatmap mode; SelectionRing when a node is
/// selected.
pub fn layers_for(
    mode: Mode,
    show_connections: bool,
    has_selection: bool,
    overlay: ConnectionOverlay,
) -> LayerStack {
    let mut layers = LayerStack::new();
    layers.push(Layer::Background);
    let connections = match overlay {
        ConnectionOverlay::ModeOnly => mode == Mode::Connections,
        ConnectionOverlay::ModeOrToggle => mode == Mode::Connections || show_connections,
    };
    if connections {
        layers.push(Layer::Connections);
    }
    if mode == Mode::Heatmap {
        layers.push(Layer::Heatmap);
    }
    layers.push(Layer::Nodes);
    if has_selection {
        layers.push(Layer::SelectionRing);
    }
    layers
}

/// Everything the user can change about how the map is viewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub mode: Mode,
    /// Zoom level in `[ZOOM_MIN, ZOOM_MAX]`.
    pub zoom: f64,
    pub show_connections: bool,
    pub selected: Option<NodeId>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            mode: Mode::Standard,
            zoom: ZOOM_DEFAULT,
            show_connections: false,
            selected: None,
        }
    }
}

impl ViewState {
    /// Layers for this state under `overlay`.
    pub fn layers(&self, overlay: ConnectionOverlay) -> LayerStack {
        layers_for(
            self.mode,
            self.show_connections,
            self.selected.is_some(),
            overlay,
        )
    }
}

/// A user-driven transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetMode(Mode),
    CycleMode,
    SetZoom(f64),
    ZoomIn,
    ZoomOut,
    ToggleConnections,
    SetShowConnections(bool),
    Select(Option<NodeId>),
    ClearSelection,
}

/// Clamp a zoom request; NaN keeps `current`.
fn clamp_zoom(requested: f64, current: f64) -> f64 {
    if requested.is_nan() {
        current
    } else {
        requested.clamp(ZOOM_MIN, ZOOM_MAX)
    }
}

/// Apply `action` to `state`, producing the next state.
pub fn reduce(state: &ViewState, action: Action) -> ViewState {
    let mut next = state.clone();
    match action {
        Action::SetMode(mode) => next.mode = mode,
        Action::CycleMode => next.mode = state.mode.next(),
        Action::SetZoom(zoom) => next.zoom = clamp_zoom(zoom, state.zoom),
        Action::ZoomIn => next.zoom = clamp_zoom(state.zoom + ZOOM_STEP, state.zoom),
        Action::ZoomOut => next.zoom = clamp_zoom(state.zoom - ZOOM_STEP, state.zoom),
        Action::ToggleConnections => next.show_connections = !state.show_connections,
        Action::SetShowConnections(on) => next.show_connections = on,
        Action::Select(id) => next.selected = id,
        Action::ClearSelection => next.selected = None,
    }
    next
}
