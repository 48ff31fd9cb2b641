#![forbid(unsafe_code)]

//! Heat-intensity accumulation.
//!
//! Each renderable node splats a cone-shaped kernel onto a float raster:
//!
//! ```text
//! intensity = truth_score / 200
//! radius    = influence_radius * 2            (pixels)
//! falloff   = intensity * (1 - d / radius)    for d <= radius
//! R += falloff * 255   G += falloff * 100   B += falloff * 50   A += falloff * 128
//! ```
//!
//! Channels are clamped to `[0, 255]` after every add, so overlapping
//! kernels saturate instead of wrapping. Cost is `O(nodes × radius²)`.
//!
//! With [`HeatmapConfig::downsample`] `k > 1` the raster is `⌈w/k⌉ × ⌈h/k⌉`
//! and centers and radii are scaled by `1/k`; reads at full resolution use
//! nearest-neighbour sampling.

use gmap_core::{GuardianNode, PixelRect, Point, Projection};

use crate::color::Rgba;

/// Per-channel weight of one unit of falloff.
const CHANNEL_WEIGHTS: [f32; 4] = [255.0, 100.0, 50.0, 128.0];

/// Heatmap tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapConfig {
    /// Raster reduction factor: 1, 2 or 4 (default: 1).
    pub downsample: u32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self { downsample: 1 }
    }
}

impl HeatmapConfig {
    /// Set the downsample factor, snapping to the nearest supported value
    /// at or below `factor` (minimum 1).
    #[must_use]
    pub fn with_downsample(mut self, factor: u32) -> Self {
        self.downsample = match factor {
            0 | 1 => 1,
            2 | 3 => 2,
            _ => 4,
        };
        self
    }
}

/// Accumulated heat channels for one canvas size.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatRaster {
    width: u32,
    height: u32,
    full_width: u32,
    full_height: u32,
    scale: u32,
    data: Vec<[f32; 4]>,
}

impl HeatRaster {
    fn new(full_width: u32, full_height: u32, scale: u32) -> Self {
        let scale = scale.max(1);
        let width = full_width.div_ceil(scale);
        let height = full_height.div_ceil(scale);
        Self {
            width,
            height,
            full_width,
            full_height,
            scale,
            data: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    /// Raster size (after downsampling).
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Canvas size the raster was built for.
    #[inline]
    pub fn full_size(&self) -> (u32, u32) {
        (self.full_width, self.full_height)
    }

    #[inline]
    pub fn downsample(&self) -> u32 {
        self.scale
    }

    /// Raw channels at raster coordinates.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// Channels at full-resolution coordinates (nearest neighbour).
    /// Zero outside the canvas.
    pub fn sample(&self, x: u32, y: u32) -> [f32; 4] {
        if x >= self.full_width || y >= self.full_height {
            return [0.0; 4];
        }
        self.pixel(x / self.scale, y / self.scale)
            .unwrap_or([0.0; 4])
    }

    /// Whether no pixel received any heat.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|px| px.iter().all(|&c| c == 0.0))
    }

    /// Raster rounded to 8-bit colors, at raster resolution.
    pub fn to_rgba(&self) -> Vec<Rgba> {
        self.data.iter().map(|&px| quantize(px)).collect()
    }

    /// Raster rounded to 8-bit colors, at full canvas resolution.
    pub fn upscale(&self) -> Vec<Rgba> {
        if self.scale == 1 {
            return self.to_rgba();
        }
        let mut out = Vec::with_capacity(self.full_width as usize * self.full_height as usize);
        for y in 0..self.full_height {
            for x in 0..self.full_width {
                out.push(quantize(self.sample(x, y)));
            }
        }
        out
    }

    fn splat(&mut self, center: Point, radius: f64, intensity: f64) {
        let bounds = PixelRect::from_size(self.width, self.height);
        let Some(rect) = PixelRect::circle_bounds(center, radius, bounds) else {
            return;
        };
        for y in rect.y..rect.bottom() {
            let row = y as usize * self.width as usize;
            for x in rect.x..rect.right() {
                let d = Point::new(f64::from(x), f64::from(y)).distance(center);
                if d > radius {
                    continue;
                }
                let falloff = (intensity * (1.0 - d / radius)) as f32;
                let px = &mut self.data[row + x as usize];
                for (channel, weight) in px.iter_mut().zip(CHANNEL_WEIGHTS) {
                    *channel = (*channel + falloff * weight).clamp(0.0, 255.0);
                }
            }
        }
    }
}

fn quantize(px: [f32; 4]) -> Rgba {
    let [r, g, b, a] = px.map(|c| c.round().clamp(0.0, 255.0) as u8);
    Rgba::rgba(r, g, b, a)
}

/// Build a full-resolution heat raster for `nodes` on a `width × height`
/// canvas.
pub fn build_heatmap(nodes: &[GuardianNode], width: u32, height: u32) -> HeatRaster {
    build_heatmap_with(nodes, width, height, &HeatmapConfig::default())
}

/// Build a heat raster with explicit tuning.
///
/// Unrenderable nodes and nodes with a non-positive or non-finite radius
/// contribute nothing.
pub fn build_heatmap_with(
    nodes: &[GuardianNode],
    width: u32,
    height: u32,
    config: &HeatmapConfig,
) -> HeatRaster {
    let mut raster = HeatRaster::new(width, height, config.downsample);
    let projection = Projection::new(width, height);
    let inv = 1.0 / f64::from(raster.scale);

    for node in nodes {
        let Some(center) = projection.project_node(node) else {
            continue;
        };
        let radius = node.influence_radius * 2.0 * inv;
        if !radius.is_finite() || radius <= 0.0 || !node.truth_score.is_finite() {
            continue;
        }
        let intensity = node.truth_score / 200.0;
        raster.splat(Point::new(center.x * inv, center.y * inv), radius, intensity);
    }
    raster
}
