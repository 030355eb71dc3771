use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grid::{checked_area, GridError};
use crate::BoundedMap;

/// A width-by-height-sized BitVec for convenient handling of a grid of boolean values.
///
/// Used both as an opacity grid (true = blocks sight) and as the visibility grid produced by
/// field of view calculations.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "RawBitGrid")]
pub struct BitGrid {
    width: i32,
    height: i32,
    #[serde(with = "crate::serde_rle::bit_vec")]
    bv: BitVec,
}

/// A [BitGrid] as decoded, before its size is checked against its bits.
#[derive(Deserialize)]
struct RawBitGrid {
    width: i32,
    height: i32,
    #[serde(with = "crate::serde_rle::bit_vec")]
    bv: BitVec,
}

impl TryFrom<RawBitGrid> for BitGrid {
    type Error = GridError;

    fn try_from(raw: RawBitGrid) -> Result<Self, Self::Error> {
        let expected = checked_area(raw.width, raw.height)?;

        if raw.bv.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                actual: raw.bv.len(),
            });
        }

        Ok(Self {
            width: raw.width,
            height: raw.height,
            bv: raw.bv,
        })
    }
}

impl BitGrid {
    /// Create a new BitGrid with the given width and height, all bits false.
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        let len = checked_area(width, height)?;

        Ok(Self {
            width,
            height,
            bv: bitvec![0; len],
        })
    }

    /// Build a BitGrid from rows of text, where any character in `set_chars` is a true bit.
    ///
    /// All rows must have the same number of characters.
    pub fn from_rows(rows: &[&str], set_chars: &str) -> Result<Self, GridError> {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        let mut grid = Self::new(width, height)?;

        for (y, row) in rows.iter().enumerate() {
            let count = row.chars().count();

            if count != width as usize {
                return Err(GridError::SizeMismatch {
                    expected: width as usize,
                    actual: count,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                if set_chars.contains(ch) {
                    grid.set_bit(x as i32, y as i32, true)?;
                }
            }
        }

        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Reset all elements to false.
    pub fn zero_out_bits(&mut self) {
        self.bv.fill(false);
    }

    /// Get the bool at the given x and y.
    ///
    /// Returns false if out of bounds.
    #[inline]
    pub fn get_bit(&self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(index) => self.bv[index],
            None => false,
        }
    }

    /// Set the bool at the given x and y to value.
    #[inline]
    pub fn set_bit(&mut self, x: i32, y: i32, value: bool) -> Result<(), GridError> {
        match self.index(x, y) {
            Some(index) => {
                self.bv.set(index, value);
                Ok(())
            }
            None => Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            }),
        }
    }

    /// Set a bit that is already known to be in bounds, ignoring any that are not.
    #[inline]
    pub(crate) fn set_bit_clipped(&mut self, x: i32, y: i32) {
        if let Some(index) = self.index(x, y) {
            self.bv.set(index, true);
        }
    }

    /// Number of true bits.
    pub fn count_ones(&self) -> usize {
        self.bv.count_ones()
    }

    /// Iterate over the positions of all true bits in row-major order.
    pub fn iter_ones(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let width = self.width;

        self.bv
            .iter_ones()
            .map(move |i| (i as i32 % width, i as i32 / width))
    }

    /// Apply all true elements of this BitGrid onto another.
    ///
    /// True bits that would fall outside of the other grid, given the offset, are dropped.
    pub fn apply_bits_onto(&self, other: &mut BitGrid, offset_x: i32, offset_y: i32) {
        for (x, y) in self.iter_ones() {
            other.set_bit_clipped(x + offset_x, y + offset_y);
        }
    }
}

impl BoundedMap for BitGrid {
    fn bounds(&self) -> (i32, i32, i32, i32) {
        (0, 0, self.width - 1, self.height - 1)
    }
}
