#![forbid(unsafe_code)]

//! Owned RGBA pixel buffer with painter primitives.
//!
//! All drawing blends source-over into the buffer; writes outside the
//! canvas are silently clipped. Shapes take sub-pixel centers and test
//! integer pixel coordinates against them, so a circle drawn at a
//! projected point covers the same pixels the hit-tester considers.
//!
//! # Example
//!
//! ```
//! use gmap_render::canvas::Canvas;
//! use gmap_render::color::Rgba;
//! use gmap_core::Point;
//!
//! let mut canvas = Canvas::new(64, 32);
//! canvas.clear(Rgba::BLACK);
//! canvas.line(0, 0, 63, 31, Rgba::WHITE);
//! canvas.fill_circle(Point::new(32.0, 16.0), 6.0, Rgba::rgb(255, 0, 0));
//! assert_eq!(canvas.get(32, 16), Some(Rgba::rgb(255, 0, 0)));
//! ```

use std::f64::consts::TAU;

use gmap_core::{PixelRect, Point};

use crate::color::Rgba;

/// A `width × height` RGBA8 raster, row-major, origin at top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    /// Create a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Canvas bounds as a rectangle at the origin.
    #[inline]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::from_size(self.width, self.height)
    }

    /// Resize, discarding contents. No-op when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize(width as usize * height as usize, Rgba::TRANSPARENT);
    }

    /// Overwrite every pixel with `color`.
    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Row-major pixel slice.
    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Pixels flattened to `[r, g, b, a, ...]` bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_array()).collect()
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Read one pixel.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(i64::from(x), i64::from(y))
            .map(|idx| self.pixels[idx])
    }

    /// Blend `color` over one pixel.
    #[inline]
    pub fn blend(&mut self, x: i64, y: i64, color: Rgba) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color.over(self.pixels[idx]);
        }
    }

    /// Blend a same-sized row-major layer over the canvas.
    ///
    /// A layer of the wrong length is ignored.
    pub fn composite(&mut self, layer: &[Rgba]) {
        if layer.len() != self.pixels.len() {
            return;
        }
        for (dst, &src) in self.pixels.iter_mut().zip(layer) {
            *dst = src.over(*dst);
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx: i64 = if x0 < x1 { 1 } else { -1 };
        let sy: i64 = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut cx = x0;
        let mut cy = y0;

        loop {
            self.blend(cx, cy, color);

            if cx == x1 && cy == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                if cx == x1 {
                    break;
                }
                err += dy;
                cx += sx;
            }
            if e2 <= dx {
                if cy == y1 {
                    break;
                }
                err += dx;
                cy += sy;
            }
        }
    }

    /// Line between two sub-pixel points, rounded to the pixel grid.
    ///
    /// Non-finite endpoints draw nothing.
    pub fn line_between(&mut self, from: Point, to: Point, color: Rgba) {
        if ![from.x, from.y, to.x, to.y].iter().all(|v| v.is_finite()) {
            return;
        }
        self.line(
            from.x.round() as i64,
            from.y.round() as i64,
            to.x.round() as i64,
            to.y.round() as i64,
            color,
        );
    }

    /// Visit every in-bounds pixel within `reach` of `center` together with
    /// its distance to the center.
    fn for_each_in_disc(
        &mut self,
        center: Point,
        reach: f64,
        mut paint: impl FnMut(f64, f64, f64) -> Option<Rgba>,
    ) {
        let Some(rect) = PixelRect::circle_bounds(center, reach, self.bounds()) else {
            return;
        };
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let dx = f64::from(x) - center.x;
                let dy = f64::from(y) - center.y;
                let d = dx.hypot(dy);
                if d > reach {
                    continue;
                }
                if let Some(color) = paint(d, dx, dy) {
                    let idx = y as usize * self.width as usize + x as usize;
                    self.pixels[idx] = color.over(self.pixels[idx]);
                }
            }
        }
    }

    /// Filled disc of the given radius.
    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.for_each_in_disc(center, radius, |_, _, _| Some(color));
    }

    /// Circle outline `thickness` pixels wide, centered on `radius`.
    pub fn ring(&mut self, center: Point, radius: f64, thickness: f64, color: Rgba) {
        let half = thickness / 2.0;
        self.for_each_in_disc(center, radius + half, |d, _, _| {
            ((d - radius).abs() <= half).then_some(color)
        });
    }

    /// Ring broken into `dash` pixel arcs separated by `gap` pixel arcs,
    /// measured along the circumference clockwise from 3 o'clock.
    pub fn dashed_circle(
        &mut self,
        center: Point,
        radius: f64,
        thickness: f64,
        dash: f64,
        gap: f64,
        color: Rgba,
    ) {
        let period = dash + gap;
        if !(period > 0.0) || !(radius > 0.0) {
            return;
        }
        let half = thickness / 2.0;
        self.for_each_in_disc(center, radius + half, |d, dx, dy| {
            if (d - radius).abs() > half {
                return None;
            }
            let angle = dy.atan2(dx).rem_euclid(TAU);
            let arc = angle * radius;
            (arc % period < dash).then_some(color)
        });
    }

    /// Radial gradient from `color` at the center to transparent at `radius`.
    pub fn radial_glow(&mut self, center: Point, radius: f64, color: Rgba) {
        if !(radius > 0.0) {
            return;
        }
        self.for_each_in_disc(center, radius, |d, _, _| {
            Some(color.with_opacity(1.0 - d / radius))
        });
    }
}
