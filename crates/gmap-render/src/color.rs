#![forbid(unsafe_code)]

//! Packed RGBA colors and the map palette.

use gmap_core::{ConnectionType, ReputationTier};

/// A compact RGBA color.
///
/// - **Layout:** `0xRRGGBBAA` (R in bits 31..24, A in bits 7..0).
///
/// Channels are stored with **straight alpha**. Compositing uses
/// Porter-Duff **SourceOver** (`src over dst`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// Same color with a replaced alpha channel.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::rgba(self.r(), self.g(), self.b(), a)
    }

    /// Scale alpha by `opacity` in `[0.0, 1.0]`; NaN is treated as 0.
    #[inline]
    pub fn with_opacity(self, opacity: f64) -> Self {
        let opacity = if opacity.is_nan() {
            0.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        let a = (f64::from(self.a()) * opacity).round().clamp(0.0, 255.0) as u8;
        self.with_alpha(a)
    }

    /// Channels as `[r, g, b, a]`.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }

    #[inline]
    fn div_round_u8(numer: u64, denom: u64) -> u8 {
        debug_assert!(denom != 0);
        let v = (numer + (denom / 2)) / denom;
        v.min(255) as u8
    }

    /// Porter-Duff SourceOver: `self` over `dst`.
    ///
    /// Exact integer arithmetic in the `255²` domain, rounded once.
    #[inline]
    pub fn over(self, dst: Self) -> Self {
        let s_a = u64::from(self.a());
        if s_a == 255 {
            return self;
        }
        if s_a == 0 {
            return dst;
        }

        let d_a = u64::from(dst.a());
        let inv_s_a = 255 - s_a;

        // numer_a = 255*s_a + d_a*(255 - s_a); out_a = round(numer_a / 255)
        let numer_a = 255 * s_a + d_a * inv_s_a;
        if numer_a == 0 {
            return Self::TRANSPARENT;
        }
        let out_a = Self::div_round_u8(numer_a, 255);

        let channel = |s: u8, d: u8| {
            Self::div_round_u8(
                u64::from(s) * s_a * 255 + u64::from(d) * d_a * inv_s_a,
                numer_a,
            )
        };
        Self::rgba(
            channel(self.r(), dst.r()),
            channel(self.g(), dst.g()),
            channel(self.b(), dst.b()),
            out_a,
        )
    }
}

/// Canvas background (`#0f172a`).
pub const BACKGROUND: Rgba = Rgba::rgb(0x0f, 0x17, 0x2a);
/// Faint graticule lines.
pub const GRATICULE: Rgba = Rgba::rgba(0x94, 0xa3, 0xb8, 28);
/// Node border.
pub const NODE_BORDER: Rgba = Rgba::WHITE;
/// Dot marking highly active nodes.
pub const ACTIVITY_DOT: Rgba = Rgba::rgb(0x22, 0xc5, 0x5e);
/// Dashed ring around the selected node.
pub const SELECTION: Rgba = Rgba::rgb(0x22, 0xd3, 0xee);

/// Fill color for a reputation tier.
pub const fn tier_color(tier: ReputationTier) -> Rgba {
    match tier {
        ReputationTier::Veritas => Rgba::rgb(0xa8, 0x55, 0xf7),
        ReputationTier::Gold => Rgba::rgb(0xea, 0xb3, 0x08),
        ReputationTier::Silver => Rgba::rgb(0x9c, 0xa3, 0xaf),
        ReputationTier::Bronze => Rgba::rgb(0xea, 0x58, 0x0c),
    }
}

/// Stroke color for a connection type.
pub const fn connection_color(kind: ConnectionType) -> Rgba {
    match kind {
        ConnectionType::Collaboration => Rgba::rgb(0x3b, 0x82, 0xf6),
        ConnectionType::Verification => Rgba::rgb(0x22, 0xc5, 0x5e),
        ConnectionType::Influence => Rgba::rgb(0xf5, 0x9e, 0x0b),
        ConnectionType::Mentorship => Rgba::rgb(0xec, 0x48, 0x99),
    }
}
