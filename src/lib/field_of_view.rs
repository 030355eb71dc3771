use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{bitgrid::BitGrid, grid::GridError, BoundedMap};

/// A map-like trait that can be sent into [compute_fov] to calculate a field of view.
pub trait ViewableField {
    /// Returns `true` if the tile at the given coordinates is opaque.
    fn is_opaque(&self, x: i32, y: i32) -> bool;
}

impl ViewableField for BitGrid {
    #[inline]
    fn is_opaque(&self, x: i32, y: i32) -> bool {
        self.get_bit(x, y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FovError {
    #[error("origin ({x}, {y}) is outside of the map")]
    OriginOutOfBounds { x: i32, y: i32 },
    #[error("radius must be non-negative, got {0}")]
    NegativeRadius(i32),
    #[error("visibility grid is {actual:?} but the map is {expected:?}")]
    SizeMismatch {
        expected: (i32, i32),
        actual: (i32, i32),
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Line-of-sight strategy used by [compute_fov].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum FovAlgorithm {
    /// Classic recursive shadow casting with floating-point slopes.  A tile is visible if any
    /// part of it is lit; fast, but not symmetric.
    Shadow,
    /// Restrictive fixed-point shadow casting with center-to-center visibility and
    /// diamond-shaped walls.  Transparent tiles are visible only when their center lies within
    /// a visible slope interval, which makes vision between transparent tiles symmetric.
    #[default]
    Symmetric,
    /// The same scan as [FovAlgorithm::Symmetric], but every tile partially inside a visible
    /// slope interval is visible.  Sees more around corners at the cost of symmetry.
    Permissive,
}

/// Shape of field of view, applied as a distance cutoff on top of the line-of-sight scan.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub enum FovShape {
    /// Square FOV (Chebyshev distance).
    Square,
    /// Diamond FOV (Manhattan distance).
    Diamond,
    /// Exact circular FOV (Euclidean distance).  Creates a bump of vision at the cardinal edges.
    Circle,
    /// Circular FOV extended by half a space to round out the cardinal bumps, though the
    /// additional tiles will not strictly be within range.
    #[default]
    CirclePlus,
}

/// Field of view configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FovSettings {
    /// Maximum view distance; zero means unlimited.
    pub radius: i32,
    /// Whether opaque tiles that stop a line of sight are themselves visible.
    pub light_walls: bool,
    pub algorithm: FovAlgorithm,
    pub shape: FovShape,
}

impl Default for FovSettings {
    fn default() -> Self {
        Self {
            radius: 0,
            light_walls: true,
            algorithm: FovAlgorithm::default(),
            shape: FovShape::default(),
        }
    }
}

impl FovSettings {
    pub fn validate(&self) -> Result<(), FovError> {
        if self.radius < 0 {
            Err(FovError::NegativeRadius(self.radius))
        } else {
            Ok(())
        }
    }
}

/// Rational slope as (dy, dx) with a positive denominator.
type Slope = (i64, i64);

// real_x_from_x, real_x_from_y, real_y_from_x, real_y_from_y, include_edges
const OCTANTS: [(i32, i32, i32, i32, bool); 8] = [
    (1, 0, 0, 1, true),
    (0, 1, 1, 0, false),
    (0, -1, 1, 0, true),
    (-1, 0, 0, 1, false),
    (-1, 0, 0, -1, true),
    (0, -1, -1, 0, false),
    (0, 1, -1, 0, true),
    (1, 0, 0, -1, false),
];

#[inline]
fn slope_lt_or_eq((a_n, a_d): Slope, (b_n, b_d): Slope) -> bool {
    a_n * b_d <= b_n * a_d
}

/// Fixed-point octant scan shared by [FovAlgorithm::Symmetric] and [FovAlgorithm::Permissive].
///
/// Each octant is walked outward column by column; `current` holds the visible slope intervals
/// of the column being scanned and `next` collects the intervals that survive into the next.
fn fixed_point_scan<T, U>(map: &T, origin: (i32, i32), range: i32, permissive: bool, visit: &mut U)
where
    T: BoundedMap + ViewableField,
    U: FnMut(i32, i32),
{
    let (min_x, min_y, max_x, max_y) = map.bounds();
    let in_bounds = |x, y| x >= min_x && x <= max_x && y >= min_y && y <= max_y;

    // Low and high sight slopes for the current scan and next scan using page flipping.
    let mut sights_even: Vec<(Slope, Slope)> = Vec::new();
    let mut sights_odd: Vec<(Slope, Slope)> = Vec::new();

    for &(real_x_from_x, real_x_from_y, real_y_from_x, real_y_from_y, include_edges) in &OCTANTS {
        // Kick off with sight of the full octant.
        sights_odd.clear();
        sights_odd.push(((0, 1), (1, 1)));

        for x in 1..=range {
            let (current, next) = if x % 2 == 0 {
                (&mut sights_even, &mut sights_odd)
            } else {
                (&mut sights_odd, &mut sights_even)
            };

            if current.is_empty() {
                break;
            }
            next.clear();

            let x64 = x as i64;

            for &(low_slope, high_slope) in current.iter() {
                // The low and high tiles whose middle lines are cut by the slopes.  Rounding
                // half up at the low end and half down at the high end skips tiles that only
                // touch a sight at a corner.
                let low_y = (2 * x64 * low_slope.0 / low_slope.1 + 1) / 2;
                let high_y = -((high_slope.1 - 2 * x64 * high_slope.0).div_euclid(2 * high_slope.1));

                // Start of the sight being gathered for the next column.
                let mut low_sight: Option<Slope> = None;

                for y in low_y..=high_y {
                    let real_x = origin.0 + x * real_x_from_x + y as i32 * real_x_from_y;
                    let real_y = origin.1 + x * real_y_from_x + y as i32 * real_y_from_y;

                    // The slope of the center of the bottom edge.
                    let low_mid_slope = (y * 2 - 1, x64 * 2);
                    let opaque = in_bounds(real_x, real_y) && map.is_opaque(real_x, real_y);

                    if opaque {
                        // Finish the current sight when hitting an opaque tile.
                        if let Some(low) = low_sight.take() {
                            next.push((low, low_mid_slope));
                        }
                    } else if low_sight.is_none() {
                        // Begin a new sight with the higher of the bottom center of the current
                        // tile and the low slope.
                        low_sight = if slope_lt_or_eq(low_slope, low_mid_slope) {
                            Some(low_mid_slope)
                        } else {
                            Some(low_slope)
                        };
                    }

                    if (include_edges || (y > 0 && y < x64)) && in_bounds(real_x, real_y) {
                        let centered = slope_lt_or_eq(low_slope, (y, x64))
                            && slope_lt_or_eq((y, x64), high_slope);

                        if permissive || centered || opaque {
                            visit(real_x, real_y);
                        }
                    }
                }

                // Finish any sight left dangling.
                if let Some(low) = low_sight {
                    next.push((low, high_slope));
                }
            }
        }
    }
}

/// Per-octant transform for [shadow_cast]: xx, xy, yx, yy.
const SHADOW_MULT: [(i32, i32, i32, i32); 8] = [
    (1, 0, 0, 1),
    (0, 1, 1, 0),
    (0, -1, 1, 0),
    (-1, 0, 0, 1),
    (-1, 0, 0, -1),
    (0, -1, -1, 0),
    (0, 1, -1, 0),
    (1, 0, 0, -1),
];

struct ShadowCaster<'a, T, U> {
    map: &'a T,
    origin: (i32, i32),
    range: i32,
    bounds: (i32, i32, i32, i32),
    visit: &'a mut U,
}

impl<T, U> ShadowCaster<'_, T, U>
where
    T: BoundedMap + ViewableField,
    U: FnMut(i32, i32),
{
    /// Light one octant from `row` outward between slopes `start` (high) and `end` (low),
    /// recursing into the gaps left between opaque tiles.
    fn cast(&mut self, row: i32, mut start: f64, end: f64, (xx, xy, yx, yy): (i32, i32, i32, i32)) {
        if start < end {
            return;
        }

        let (min_x, min_y, max_x, max_y) = self.bounds;
        let mut next_start = start;

        for depth in row..=self.range {
            let mut blocked = false;

            // Walk from the high edge of the row towards the diagonal-free axis.
            for col in (0..=depth).rev() {
                let d = depth as f64;
                let c = col as f64;
                let high = (c + 0.5) / (d - 0.5);
                let low = (c - 0.5) / (d + 0.5);

                if low > start {
                    continue;
                } else if high < end {
                    break;
                }

                let real_x = self.origin.0 + depth * xx + col * xy;
                let real_y = self.origin.1 + depth * yx + col * yy;
                let in_bounds =
                    real_x >= min_x && real_x <= max_x && real_y >= min_y && real_y <= max_y;
                let opaque = in_bounds && self.map.is_opaque(real_x, real_y);

                if in_bounds {
                    (self.visit)(real_x, real_y);
                }

                if blocked {
                    if opaque {
                        next_start = low;
                    } else {
                        blocked = false;
                        start = next_start;
                    }
                } else if opaque && depth < self.range {
                    blocked = true;
                    self.cast(depth + 1, start, high, (xx, xy, yx, yy));
                    next_start = low;
                }
            }

            if blocked {
                break;
            }
        }
    }
}

fn shadow_cast<T, U>(map: &T, origin: (i32, i32), range: i32, visit: &mut U)
where
    T: BoundedMap + ViewableField,
    U: FnMut(i32, i32),
{
    let mut caster = ShadowCaster {
        map,
        origin,
        range,
        bounds: map.bounds(),
        visit,
    };

    for mult in SHADOW_MULT {
        caster.cast(1, 1., 0., mult);
    }
}

/// Returns `true` if the offset (`dx`, `dy`) lies within `radius` for the given shape.
#[inline]
fn in_shape(shape: FovShape, radius: i32, dx: i32, dy: i32) -> bool {
    let (dx, dy, r) = (dx.abs() as i64, dy.abs() as i64, radius as i64);

    match shape {
        FovShape::Square => dx.max(dy) <= r,
        FovShape::Diamond => dx + dy <= r,
        FovShape::Circle => dx * dx + dy * dy <= r * r,
        FovShape::CirclePlus => dx * dx + dy * dy <= r * (r + 1),
    }
}

/// Calculate the field of view from `origin` on `map`, writing visible tiles into `out`.
///
/// `out` must have the same dimensions as the map and is cleared first; positions are stored
/// relative to the map's minimum bounds.  The origin is always visible, even when opaque.
pub fn compute_fov_into<T>(
    map: &T,
    origin: (i32, i32),
    settings: &FovSettings,
    out: &mut BitGrid,
) -> Result<(), FovError>
where
    T: BoundedMap + ViewableField,
{
    settings.validate()?;

    let (min_x, min_y, max_x, max_y) = map.bounds();
    let width = max_x - min_x + 1;
    let height = max_y - min_y + 1;

    if (out.width(), out.height()) != (width, height) {
        return Err(FovError::SizeMismatch {
            expected: (width, height),
            actual: (out.width(), out.height()),
        });
    }
    if !map.in_bounds(origin.0, origin.1) {
        return Err(FovError::OriginOutOfBounds {
            x: origin.0,
            y: origin.1,
        });
    }

    out.zero_out_bits();

    let unlimited = settings.radius == 0;
    let range = if unlimited {
        width.max(height)
    } else {
        settings.radius
    };
    let FovSettings {
        light_walls, shape, ..
    } = *settings;

    let mut visit = |x: i32, y: i32| {
        if (unlimited || in_shape(shape, range, x - origin.0, y - origin.1))
            && (light_walls || !map.is_opaque(x, y))
        {
            out.set_bit_clipped(x - min_x, y - min_y);
        }
    };

    match settings.algorithm {
        FovAlgorithm::Shadow => shadow_cast(map, origin, range, &mut visit),
        FovAlgorithm::Symmetric => fixed_point_scan(map, origin, range, false, &mut visit),
        FovAlgorithm::Permissive => fixed_point_scan(map, origin, range, true, &mut visit),
    }

    out.set_bit_clipped(origin.0 - min_x, origin.1 - min_y);

    log::debug!(
        "{:?} fov from {:?} with radius {}: {} tiles visible",
        settings.algorithm,
        origin,
        settings.radius,
        out.count_ones(),
    );

    Ok(())
}

/// Calculate the field of view from `origin` on `map` into a freshly allocated visibility grid.
///
/// See [compute_fov_into].
pub fn compute_fov<T>(
    map: &T,
    origin: (i32, i32),
    settings: &FovSettings,
) -> Result<BitGrid, FovError>
where
    T: BoundedMap + ViewableField,
{
    let (min_x, min_y, max_x, max_y) = map.bounds();
    let mut out = BitGrid::new(max_x - min_x + 1, max_y - min_y + 1)?;

    compute_fov_into(map, origin, settings, &mut out)?;

    Ok(out)
}
