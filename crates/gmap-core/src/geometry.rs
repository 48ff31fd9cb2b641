#![forbid(unsafe_code)]

//! Geometric primitives.

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    /// Latitude, `[-90, 90]`.
    pub lat: f64,
    /// Longitude, `[-180, 180]`.
    pub long: f64,
}

impl GeoPoint {
    /// Create a new geographic point (no validation).
    #[inline]
    pub const fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Validate raw coordinates.
    ///
    /// Returns `None` when either coordinate is missing, non-finite, or out of
    /// range. Such nodes stay filterable and exportable but are never drawn.
    pub fn checked(lat: Option<f64>, long: Option<f64>) -> Option<Self> {
        let (lat, long) = (lat?, long?);
        if !lat.is_finite() || !long.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&long) {
            return None;
        }
        Some(Self { lat, long })
    }
}

/// A position on the canvas in (sub-)pixels, origin at top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new canvas point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An integer pixel rectangle used for clipping kernels and buckets.
///
/// Uses canvas coordinates (0-indexed, origin at top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Area in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a pixel is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Compute the intersection with another rectangle, returning `None` if no overlap.
    #[inline]
    pub fn intersection_opt(&self, other: &PixelRect) -> Option<PixelRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(PixelRect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Integer bounding box of a circle, clipped to `bounds`.
    ///
    /// Includes every pixel whose integer coordinate lies within
    /// `[center - radius, center + radius]` on both axes.
    pub fn circle_bounds(center: Point, radius: f64, bounds: PixelRect) -> Option<PixelRect> {
        if !center.x.is_finite() || !center.y.is_finite() || !radius.is_finite() || radius < 0.0 {
            return None;
        }
        let min_x = (center.x - radius).ceil().max(0.0);
        let min_y = (center.y - radius).ceil().max(0.0);
        let max_x = (center.x + radius).floor();
        let max_y = (center.y + radius).floor();
        if max_x < min_x || max_y < min_y {
            return None;
        }
        // Saturating float→int casts keep huge radii bounded by `bounds`.
        let x = min_x as u32;
        let y = min_y as u32;
        let right = (max_x as u64 + 1).min(u32::MAX as u64) as u32;
        let bottom = (max_y as u64 + 1).min(u32::MAX as u64) as u32;
        PixelRect::new(x, y, right - x, bottom - y).intersection_opt(&bounds)
    }
}
