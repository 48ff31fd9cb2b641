#![forbid(unsafe_code)]

//! Runtime configuration.

use core::time::Duration;

use gmap_core::ConnectionOverlay;
use gmap_render::{HeatmapConfig, HitIndexConfig, RenderConfig};

/// Default repository poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default age after which an unanswered fetch no longer blocks polling.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for a [`crate::MapProgram`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Canvas width in pixels (default: 800).
    pub width: u32,
    /// Canvas height in pixels (default: 400).
    pub height: u32,
    /// Time between automatic refreshes (default: 30 s).
    pub poll_interval: Duration,
    /// Age at which an outstanding fetch is treated as abandoned and the
    /// next poll supersedes it (default: 60 s).
    pub fetch_timeout: Duration,
    pub render: RenderConfig,
    pub hit_index: HitIndexConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            render: RenderConfig::default(),
            hit_index: HitIndexConfig::default(),
        }
    }
}

impl MapConfig {
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// When the connections layer is drawn outside Connections mode.
    #[must_use]
    pub fn with_connection_overlay(mut self, overlay: ConnectionOverlay) -> Self {
        self.render.overlay = overlay;
        self
    }

    #[must_use]
    pub fn with_heatmap(mut self, heatmap: HeatmapConfig) -> Self {
        self.render.heatmap = heatmap;
        self
    }

    #[must_use]
    pub fn with_hit_bucket_size(mut self, size: u32) -> Self {
        self.hit_index = self.hit_index.with_bucket_size(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MapConfig::default();
        assert_eq!((config.width, config.height), (800, 400));
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.fetch_timeout, Duration::from_secs(60));
        assert_eq!(config.render.overlay, ConnectionOverlay::ModeOnly);
        assert_eq!(config.hit_index.bucket_size, 32);
    }

    #[test]
    fn builders_compose() {
        let config = MapConfig::default()
            .with_size(1024, 512)
            .with_poll_interval(Duration::from_secs(5))
            .with_connection_overlay(ConnectionOverlay::ModeOrToggle)
            .with_heatmap(HeatmapConfig::default().with_downsample(2))
            .with_hit_bucket_size(0);
        assert_eq!(config.width, 1024);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.render.overlay, ConnectionOverlay::ModeOrToggle);
        assert_eq!(config.render.heatmap.downsample, 2);
        assert_eq!(config.hit_index.bucket_size, 1);
    }
}
