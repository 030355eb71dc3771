use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle with inclusive corners.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, Serialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    /// Create a rectangle with its top-left corner at (`x`, `y`).
    ///
    /// Panics if `w` or `h` is not positive.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Rect {
        assert!(w > 0);
        assert!(h > 0);

        Rect {
            x1: x,
            y1: y,
            x2: x + w - 1,
            y2: y + h - 1,
        }
    }

    /// Like [Rect::new], but returns [None] for a non-positive width or height.
    pub fn try_new(x: i32, y: i32, w: i32, h: i32) -> Option<Rect> {
        if w > 0 && h > 0 {
            Some(Rect::new(x, y, w, h))
        } else {
            None
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Returns true if `other` (plus `margin`) overlaps this Rect.
    pub fn intersects(&self, other: &Rect, margin: i32) -> bool {
        other.x2 + margin >= self.x1
            && other.x1 - margin <= self.x2
            && other.y2 + margin >= self.y1
            && other.y1 - margin <= self.y2
    }

    /// The overlapping part of both rectangles, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if self.intersects(other, 0) {
            Some(Rect {
                x1: self.x1.max(other.x1),
                y1: self.y1.max(other.y1),
                x2: self.x2.min(other.x2),
                y2: self.y2.min(other.y2),
            })
        } else {
            None
        }
    }

    pub fn center(&self) -> (i32, i32) {
        (
            (self.x2 - self.x1) / 2 + self.x1,
            (self.y2 - self.y1) / 2 + self.y1,
        )
    }

    /// Every position in the rectangle in row-major order.
    pub fn iter_positions(&self) -> impl Iterator<Item = (i32, i32)> {
        let Rect { x1, y1, x2, y2 } = *self;

        (y1..=y2).flat_map(move |y| (x1..=x2).map(move |x| (x, y)))
    }
}
