#![forbid(unsafe_code)]

//! Equirectangular projection from latitude/longitude to canvas pixels.
//!
//! [`project`] is the single source of truth for node placement. The render
//! pipeline, heatmap accumulator, and hit-tester all call it (directly or via
//! [`Projection`]), so a node is clickable exactly where it is drawn.

use crate::geometry::{GeoPoint, Point};
use crate::model::GuardianNode;

/// Map `(lat, long)` onto a `width × height` canvas.
///
/// `x = (long + 180) / 360 * width`, `y = (90 - lat) / 180 * height`.
/// Total and deterministic; out-of-range inputs extrapolate linearly.
#[inline]
pub fn project(lat: f64, long: f64, width: f64, height: f64) -> (f64, f64) {
    let x = (long + 180.0) / 360.0 * width;
    let y = (90.0 - lat) / 180.0 * height;
    (x, y)
}

/// A projection bound to a fixed canvas size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    width: f64,
    height: f64,
}

impl Projection {
    /// Create a projection for a canvas of the given pixel size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: f64::from(width),
            height: f64::from(height),
        }
    }

    /// Canvas width in pixels.
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Canvas height in pixels.
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Project a geographic point.
    #[inline]
    pub fn point(&self, geo: GeoPoint) -> Point {
        let (x, y) = project(geo.lat, geo.long, self.width, self.height);
        Point::new(x, y)
    }

    /// Project a node's validated position; `None` for unrenderable nodes.
    #[inline]
    pub fn project_node(&self, node: &GuardianNode) -> Option<Point> {
        node.position().map(|geo| self.point(geo))
    }

    /// Inverse of [`Projection::point`].
    ///
    /// A zero-sized canvas maps everything to the map origin `(90, -180)`.
    pub fn unproject(&self, x: f64, y: f64) -> GeoPoint {
        let long = if self.width > 0.0 {
            x / self.width * 360.0 - 180.0
        } else {
            -180.0
        };
        let lat = if self.height > 0.0 {
            90.0 - y / self.height * 180.0
        } else {
            90.0
        };
        GeoPoint::new(lat, long)
    }
}
