#![forbid(unsafe_code)]

//! Layered render pipeline.
//!
//! [`RenderPipeline::paint`] fully clears the canvas and redraws it in the
//! order given by [`ViewState::layers`]. It is the only writer of the
//! canvas. Nothing is cached between paints except the pixel buffer itself.

use std::collections::HashMap;

use gmap_core::{
    ConnectionOverlay, GeoPoint, GuardianNode, Layer, LayerStack, NodeId, Point, Projection,
    Snapshot, ViewState,
};

use crate::canvas::Canvas;
use crate::color;
use crate::heatmap::{HeatmapConfig, build_heatmap_with};
use crate::hit_test::node_radius;

/// Glow extends to this multiple of the node radius.
const GLOW_SCALE: f64 = 2.0;
/// Finest graticule spacing in degrees.
const MIN_GRATICULE_STEP: f64 = 1.0;
const BORDER_WIDTH: f64 = 2.0;
const ACTIVITY_DOT_RADIUS: f64 = 2.0;
/// Selection ring radius as a multiple of `influence_radius`.
const SELECTION_SCALE: f64 = 3.0;
const SELECTION_DASH: f64 = 5.0;
const SELECTION_GAP: f64 = 5.0;

/// Paint tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// When the connections layer participates (default: mode only).
    pub overlay: ConnectionOverlay,
    pub heatmap: HeatmapConfig,
    /// Graticule spacing in degrees; non-positive disables it (default: 30).
    pub graticule_step: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            overlay: ConnectionOverlay::ModeOnly,
            heatmap: HeatmapConfig::default(),
            graticule_step: 30.0,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn with_overlay(mut self, overlay: ConnectionOverlay) -> Self {
        self.overlay = overlay;
        self
    }

    #[must_use]
    pub fn with_heatmap(mut self, heatmap: HeatmapConfig) -> Self {
        self.heatmap = heatmap;
        self
    }

    /// Degrees between grid lines. Non-positive or NaN disables the grid;
    /// steps below one degree are drawn at one degree.
    #[must_use]
    pub fn with_graticule_step(mut self, degrees: f64) -> Self {
        self.graticule_step = degrees;
        self
    }
}

/// What one paint did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaintStats {
    pub layers: LayerStack,
    pub nodes_drawn: usize,
    /// Filtered nodes without a usable position.
    pub nodes_skipped: usize,
    pub connections_drawn: usize,
    pub selection_drawn: bool,
}

/// Owns the canvas and paints snapshots onto it.
#[derive(Debug, Clone)]
pub struct RenderPipeline {
    canvas: Canvas,
    config: RenderConfig,
    paints: u64,
}

impl RenderPipeline {
    pub fn new(width: u32, height: u32, config: RenderConfig) -> Self {
        Self {
            canvas: Canvas::new(width, height),
            config,
            paints: 0,
        }
    }

    /// The canvas as of the last paint.
    #[inline]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    /// Resize the canvas. Contents are discarded until the next paint.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
    }

    /// Number of completed paints.
    #[inline]
    pub fn paint_count(&self) -> u64 {
        self.paints
    }

    /// Projection matching the current canvas.
    #[inline]
    pub fn projection(&self) -> Projection {
        Projection::new(self.canvas.width(), self.canvas.height())
    }

    /// Clear and redraw every participating layer.
    ///
    /// `filtered` drives the connections, heatmap and node layers; the
    /// selection ring looks the selected id up in `snapshot`, so a selected
    /// node hidden by filters still gets its ring.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip_all, fields(revision = snapshot.revision()))
    )]
    pub fn paint(
        &mut self,
        snapshot: &Snapshot,
        filtered: &[GuardianNode],
        view: &ViewState,
    ) -> PaintStats {
        let projection = self.projection();
        let mut stats = PaintStats {
            layers: view.layers(self.config.overlay),
            ..PaintStats::default()
        };

        for layer in stats.layers.clone() {
            match layer {
                Layer::Background => self.paint_background(&projection),
                Layer::Connections => {
                    stats.connections_drawn = self.paint_connections(snapshot, filtered, &projection);
                }
                Layer::Heatmap => self.paint_heatmap(filtered),
                Layer::Nodes => {
                    let (drawn, skipped) = self.paint_nodes(filtered, view.zoom, &projection);
                    stats.nodes_drawn = drawn;
                    stats.nodes_skipped = skipped;
                }
                Layer::SelectionRing => {
                    stats.selection_drawn = view
                        .selected
                        .as_ref()
                        .is_some_and(|id| self.paint_selection(snapshot, id, &projection));
                }
            }
        }

        self.paints += 1;
        gmap_core::debug!(
            layers = stats.layers.len(),
            nodes = stats.nodes_drawn,
            skipped = stats.nodes_skipped,
            connections = stats.connections_drawn,
            "painted map"
        );
        stats
    }

    fn paint_background(&mut self, projection: &Projection) {
        self.canvas.clear(color::BACKGROUND);
        let step = self.config.graticule_step;
        if !(step > 0.0) {
            return;
        }
        let step = step.max(MIN_GRATICULE_STEP);
        let parallels = (180.0 / step).floor() as u32;
        for i in 0..=parallels {
            let lat = -90.0 + f64::from(i) * step;
            let from = projection.point(GeoPoint::new(lat, -180.0));
            let to = projection.point(GeoPoint::new(lat, 180.0));
            self.canvas.line_between(from, to, color::GRATICULE);
        }
        let meridians = (360.0 / step).floor() as u32;
        for i in 0..=meridians {
            let long = -180.0 + f64::from(i) * step;
            let from = projection.point(GeoPoint::new(90.0, long));
            let to = projection.point(GeoPoint::new(-90.0, long));
            self.canvas.line_between(from, to, color::GRATICULE);
        }
    }

    fn paint_connections(
        &mut self,
        snapshot: &Snapshot,
        filtered: &[GuardianNode],
        projection: &Projection,
    ) -> usize {
        let positions: HashMap<&NodeId, Point> = filtered
            .iter()
            .filter_map(|n| projection.project_node(n).map(|p| (&n.id, p)))
            .collect();
        let mut drawn = 0;
        for conn in snapshot.connections() {
            let (Some(&from), Some(&to)) = (positions.get(&conn.source), positions.get(&conn.target))
            else {
                continue;
            };
            let stroke = color::connection_color(conn.connection_type).with_opacity(conn.strength);
            self.canvas.line_between(from, to, stroke);
            drawn += 1;
        }
        drawn
    }

    fn paint_heatmap(&mut self, filtered: &[GuardianNode]) {
        let raster = build_heatmap_with(
            filtered,
            self.canvas.width(),
            self.canvas.height(),
            &self.config.heatmap,
        );
        if !raster.is_blank() {
            self.canvas.composite(&raster.upscale());
        }
    }

    fn paint_nodes(
        &mut self,
        filtered: &[GuardianNode],
        zoom: f64,
        projection: &Projection,
    ) -> (usize, usize) {
        let (mut drawn, mut skipped) = (0, 0);
        for node in filtered {
            let Some(center) = projection.project_node(node) else {
                skipped += 1;
                continue;
            };
            let radius = node_radius(node.truth_score, zoom);
            let fill = color::tier_color(node.reputation_tier);
            self.canvas
                .radial_glow(center, radius * GLOW_SCALE, fill.with_alpha(128));
            self.canvas.fill_circle(center, radius, fill);
            self.canvas
                .ring(center, radius, BORDER_WIDTH, color::NODE_BORDER);
            if node.activity_level == gmap_core::ActivityLevel::High {
                let offset = radius * std::f64::consts::FRAC_1_SQRT_2;
                let dot = Point::new(center.x + offset, center.y - offset);
                self.canvas
                    .fill_circle(dot, ACTIVITY_DOT_RADIUS, color::ACTIVITY_DOT);
            }
            drawn += 1;
        }
        (drawn, skipped)
    }

    fn paint_selection(&mut self, snapshot: &Snapshot, id: &NodeId, projection: &Projection) -> bool {
        let Some(node) = snapshot.node(id) else {
            return false;
        };
        let Some(center) = projection.project_node(node) else {
            return false;
        };
        let radius = node.influence_radius * SELECTION_SCALE;
        if !radius.is_finite() || radius <= 0.0 {
            return false;
        }
        self.canvas.dashed_circle(
            center,
            radius,
            BORDER_WIDTH,
            SELECTION_DASH,
            SELECTION_GAP,
            color::SELECTION,
        );
        true
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(800, 400, RenderConfig::default())
    }
}
