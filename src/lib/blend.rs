use serde::{Deserialize, Serialize};

use crate::util::Color;

/// Per-channel compositing function applied when one color is drawn over another.
///
/// Every mode first combines `src` and `dst` into a blended color, then mixes that over `dst`
/// with the per-call alpha, so an alpha of zero always leaves the destination untouched.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum BlendMode {
    /// Source replaces destination outright whenever alpha is above zero.
    Replace,
    /// Destination is left unchanged.
    Ignore,
    /// `dst + src`.
    Add,
    /// `dst + src * alpha`, without fading the destination.
    AddAlpha,
    /// `dst - src`.
    Subtract,
    /// `dst + src - 255`.
    Burn,
    /// `dst * src`, channels treated as `[0, 1]`.
    Multiply,
    /// `255 - (255 - dst) * (255 - src)`.
    Screen,
    /// Multiply dark destinations and screen bright ones.
    Overlay,
    ColorDodge,
    ColorBurn,
    Darken,
    Lighten,
    /// Linear interpolation from destination to source.
    Alpha,
    /// Standard "over" compositing: `src * alpha + dst * (1 - alpha)`.
    #[default]
    Default,
}

#[inline]
fn mix(src: f32, dst: f32, alpha: f32) -> f32 {
    src * alpha + dst * (1. - alpha)
}

/// Blend `src` onto `dst` with `mode`, with `alpha` clamped into `[0, 1]`.
pub fn blend_color(dst: Color, src: Color, alpha: f32, mode: BlendMode) -> Color {
    let alpha = if alpha.is_nan() {
        0.
    } else {
        alpha.clamp(0., 1.)
    };

    if alpha <= 0. {
        return dst;
    }

    let composite = |combine: fn(f32, f32) -> f32| {
        dst.zip_with(src, |d, s| mix(combine(d, s).clamp(0., 255.), d, alpha))
    };

    match mode {
        BlendMode::Ignore => dst,
        BlendMode::Replace => src,
        BlendMode::Alpha | BlendMode::Default => dst.lerp(src, alpha),
        BlendMode::AddAlpha => dst.zip_with(src, |d, s| d + s * alpha),
        BlendMode::Add => composite(|d, s| d + s),
        BlendMode::Subtract => composite(|d, s| d - s),
        BlendMode::Burn => composite(|d, s| d + s - 255.),
        BlendMode::Multiply => composite(|d, s| d * s / 255.),
        BlendMode::Screen => composite(|d, s| 255. - (255. - d) * (255. - s) / 255.),
        BlendMode::Overlay => composite(|d, s| {
            if d <= 128. {
                2. * d * s / 255.
            } else {
                255. - 2. * (255. - d) * (255. - s) / 255.
            }
        }),
        BlendMode::ColorDodge => composite(|d, s| {
            if s >= 255. {
                255.
            } else {
                d * 255. / (255. - s)
            }
        }),
        BlendMode::ColorBurn => composite(|d, s| {
            if s <= 0. {
                0.
            } else {
                255. - (255. - d) * 255. / s
            }
        }),
        BlendMode::Darken => composite(f32::min),
        BlendMode::Lighten => composite(f32::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MODES: [BlendMode; 15] = [
        BlendMode::Replace,
        BlendMode::Ignore,
        BlendMode::Add,
        BlendMode::AddAlpha,
        BlendMode::Subtract,
        BlendMode::Burn,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::Alpha,
        BlendMode::Default,
    ];

    #[test]
    fn zero_alpha_never_changes_destination() {
        let dst = Color::new(12, 130, 250);
        let src = Color::new(240, 7, 99);

        for mode in ALL_MODES {
            assert_eq!(blend_color(dst, src, 0., mode), dst, "{:?}", mode);
            assert_eq!(blend_color(dst, src, f32::NAN, mode), dst, "{:?}", mode);
        }
    }

    #[test]
    fn full_alpha_replace_and_alpha_copy_source() {
        let dst = Color::new(1, 2, 3);
        let src = Color::new(200, 100, 50);

        assert_eq!(blend_color(dst, src, 1., BlendMode::Replace), src);
        assert_eq!(blend_color(dst, src, 1., BlendMode::Alpha), src);
        assert_eq!(blend_color(dst, src, 0.3, BlendMode::Replace), src);
        assert_eq!(blend_color(dst, src, 1., BlendMode::Ignore), dst);
    }

    #[test]
    fn arithmetic_modes_clamp() {
        let dst = Color::new(200, 50, 0);
        let src = Color::new(100, 100, 100);

        assert_eq!(
            blend_color(dst, src, 1., BlendMode::Add),
            Color::new(255, 150, 100)
        );
        assert_eq!(
            blend_color(dst, src, 1., BlendMode::Subtract),
            Color::new(100, 0, 0)
        );
        assert_eq!(
            blend_color(dst, src, 1., BlendMode::Darken),
            Color::new(100, 50, 0)
        );
        assert_eq!(
            blend_color(dst, src, 1., BlendMode::Lighten),
            Color::new(200, 100, 100)
        );
        assert_eq!(
            blend_color(Color::WHITE, src, 1., BlendMode::Multiply),
            src
        );
        assert_eq!(
            blend_color(Color::BLACK, src, 1., BlendMode::Screen),
            src
        );
    }

    #[test]
    fn every_mode_has_a_blend() {
        let dst = Color::new(200, 50, 0);
        let src = Color::new(100, 100, 100);

        assert_eq!(
            blend_color(dst, src, 1., BlendMode::Burn),
            Color::new(45, 0, 0)
        );
        assert_eq!(
            blend_color(dst, Color::WHITE, 1., BlendMode::ColorDodge),
            Color::WHITE
        );
        assert_eq!(
            blend_color(dst, Color::BLACK, 1., BlendMode::ColorBurn),
            Color::BLACK
        );
        assert_eq!(
            blend_color(Color::new(0, 255, 0), Color::BLACK, 1., BlendMode::Overlay),
            Color::new(0, 255, 0)
        );

        for mode in ALL_MODES {
            let half = blend_color(dst, src, 0.5, mode);
            let full = blend_color(dst, src, 1., mode);

            if mode != BlendMode::AddAlpha {
                // Halfway sits between the destination and the full blend.
                let between = |d: u8, h: u8, f: u8| d.min(f) <= h && h <= d.max(f);
                assert!(between(dst.r, half.r, full.r), "{:?}", mode);
                assert!(between(dst.g, half.g, full.g), "{:?}", mode);
                assert!(between(dst.b, half.b, full.b), "{:?}", mode);
            }
        }
    }

    #[test]
    fn add_alpha_keeps_destination_weight() {
        let dst = Color::new(100, 100, 100);
        let src = Color::new(100, 0, 200);

        assert_eq!(
            blend_color(dst, src, 0.5, BlendMode::AddAlpha),
            Color::new(150, 100, 200)
        );
    }
}
