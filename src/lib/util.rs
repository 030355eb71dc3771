use serde::{Deserialize, Serialize};

/// 8-bit-per-channel RGB color.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const GRAY: Color = Color {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const RED: Color = Color { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255 };
    pub const YELLOW: Color = Color {
        r: 255,
        g: 255,
        b: 0,
    };
    pub const CYAN: Color = Color {
        r: 0,
        g: 255,
        b: 255,
    };
    pub const MAGENTA: Color = Color {
        r: 255,
        g: 0,
        b: 255,
    };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Apply `f` to each pair of matching channels of `self` and `other`, clamping the result.
    #[inline]
    pub fn zip_with<F: Fn(f32, f32) -> f32>(self, other: Color, f: F) -> Color {
        let channel = |a: u8, b: u8| clamp_channel(f(a as f32, b as f32));

        Color {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }

    /// Linear interpolation from `self` towards `other`; `t` is clamped to `[0, 1]`.
    ///
    /// `t == 0` returns `self` and `t == 1` returns `other` exactly.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0., 1.);

        if t <= 0. {
            self
        } else if t >= 1. {
            other
        } else {
            self.zip_with(other, |a, b| a + (b - a) * t)
        }
    }

    /// Multiply every channel by `factor`.
    pub fn scale(self, factor: f32) -> Color {
        self.zip_with(self, |a, _| a * factor)
    }

    /// Per-channel modulation, as if both colors were in `[0, 1]`.
    pub fn multiply(self, other: Color) -> Color {
        self.zip_with(other, |a, b| a * b / 255.)
    }

    pub fn saturating_add(self, other: Color) -> Color {
        Color {
            r: self.r.saturating_add(other.r),
            g: self.g.saturating_add(other.g),
            b: self.b.saturating_add(other.b),
        }
    }

    pub fn saturating_sub(self, other: Color) -> Color {
        Color {
            r: self.r.saturating_sub(other.r),
            g: self.g.saturating_sub(other.g),
            b: self.b.saturating_sub(other.b),
        }
    }

    /// Perceived brightness in `[0, 255]`.
    pub fn luminance(self) -> u8 {
        ((self.r as u32 * 30 + self.g as u32 * 59 + self.b as u32 * 11) / 100) as u8
    }
}

/// Round and clamp a floating-point channel value into the native `u8` range.
#[inline]
pub(crate) fn clamp_channel(v: f32) -> u8 {
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0., 255.) as u8
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_endpoints_are_exact() {
        let a = Color::new(10, 200, 30);
        let b = Color::new(250, 0, 99);

        assert_eq!(a.lerp(b, 0.), a);
        assert_eq!(a.lerp(b, 1.), b);
        assert_eq!(a.lerp(b, 7.), b);
    }

    #[test]
    fn lerp_halfway_rounds_to_midpoint() {
        assert_eq!(Color::RED.lerp(Color::BLUE, 0.5), Color::new(128, 0, 128));
    }

    #[test]
    fn multiply_by_white_is_identity() {
        let c = Color::new(12, 34, 56);

        assert_eq!(c.multiply(Color::WHITE), c);
        assert_eq!(c.multiply(Color::BLACK), Color::BLACK);
    }

    #[test]
    fn saturating_ops_clamp() {
        let c = Color::new(200, 10, 128);

        assert_eq!(c.saturating_add(c), Color::new(255, 20, 255));
        assert_eq!(Color::BLACK.saturating_sub(c), Color::BLACK);
    }
}
