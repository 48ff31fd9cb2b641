#![forbid(unsafe_code)]

//! Render kernel: RGBA canvas, heatmap accumulation, hit-testing, and the
//! layered paint pipeline.

pub mod canvas;
pub mod color;
pub mod heatmap;
pub mod pipeline;

pub use canvas::Canvas;
pub use color::Rgba;
pub use heatmap::{HeatRaster, HeatmapConfig, build_heatmap, build_heatmap_with};
pub use hit_test::{HitIndex, HitIndexConfig, hit_test, hit_test_index, node_radius};
pub use pipeline::{PaintStats, RenderConfig, RenderPipeline};
