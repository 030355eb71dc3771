use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BoundedMap;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("({x}, {y}) is outside of the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    #[error("invalid grid size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
    #[error("expected {expected} cells but got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Check grid dimensions and return the number of cells they span.
pub(crate) fn checked_area(width: i32, height: i32) -> Result<usize, GridError> {
    if width < 0 || height < 0 {
        return Err(GridError::InvalidSize { width, height });
    }

    (width as usize)
        .checked_mul(height as usize)
        .filter(|&len| len <= i32::MAX as usize)
        .ok_or(GridError::InvalidSize { width, height })
}

/// A dense, row-major `width` by `height` grid of values with its origin at the top-left.
///
/// A grid with zero width or height is allowed, but no position can be addressed in it.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(
    bound(
        serialize = "T: Copy + PartialEq + Serialize",
        deserialize = "T: Copy + Deserialize<'de>"
    ),
    try_from = "RawGrid<T>"
)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    #[serde(with = "crate::serde_rle::run_length_encoded")]
    cells: Vec<T>,
}

/// A [Grid] as decoded, before its size is checked against its cells.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Copy + Deserialize<'de>"))]
struct RawGrid<T> {
    width: i32,
    height: i32,
    #[serde(with = "crate::serde_rle::run_length_encoded")]
    cells: Vec<T>,
}

impl<T> TryFrom<RawGrid<T>> for Grid<T> {
    type Error = GridError;

    fn try_from(raw: RawGrid<T>) -> Result<Self, Self::Error> {
        Grid::from_vec(raw.width, raw.height, raw.cells)
    }
}

/// Grid of per-cell traversal costs, where a cost of zero marks a blocked cell.
pub type CostGrid = Grid<u32>;

impl<T: Clone> Grid<T> {
    /// Create a new grid with every cell set to `fill`.
    pub fn new(width: i32, height: i32, fill: T) -> Result<Self, GridError> {
        let len = checked_area(width, height)?;

        Ok(Self {
            width,
            height,
            cells: vec![fill; len],
        })
    }

    /// Set every cell to `value`.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Grid<T> {
    /// Wrap row-major `cells` as a grid.
    pub fn from_vec(width: i32, height: i32, cells: Vec<T>) -> Result<Self, GridError> {
        let expected = checked_area(width, height)?;

        if cells.len() != expected {
            return Err(GridError::SizeMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a grid by calling `f` for each position.
    pub fn from_fn<F>(width: i32, height: i32, mut f: F) -> Result<Self, GridError>
    where
        F: FnMut(i32, i32) -> T,
    {
        let len = checked_area(width, height)?;
        let mut cells = Vec::with_capacity(len);

        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }

        Ok(Self {
            width,
            height,
            cells,
        })
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
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Index into the cell vector for an in-bounds position.
    #[inline]
    pub(crate) fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.contains(x, y) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    #[inline]
    fn out_of_bounds(&self, x: i32, y: i32) -> GridError {
        GridError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Result<&T, GridError> {
        match self.index(x, y) {
            Some(i) => Ok(&self.cells[i]),
            None => Err(self.out_of_bounds(x, y)),
        }
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Result<&mut T, GridError> {
        match self.index(x, y) {
            Some(i) => Ok(&mut self.cells[i]),
            None => Err(self.out_of_bounds(x, y)),
        }
    }

    pub fn set(&mut self, x: i32, y: i32, value: T) -> Result<(), GridError> {
        *self.get_mut(x, y)? = value;
        Ok(())
    }

    /// The row-major cell storage.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Iterate over `(x, y, value)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, &T)> + '_ {
        let width = self.width.max(1);

        self.cells
            .iter()
            .enumerate()
            .map(move |(i, v)| (i as i32 % width, i as i32 / width, v))
    }
}

impl<T> BoundedMap for Grid<T> {
    fn bounds(&self) -> (i32, i32, i32, i32) {
        (0, 0, self.width - 1, self.height - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_are_bounds_checked() {
        let mut grid = Grid::new(3, 2, 0u32).unwrap();

        grid.set(2, 1, 7).unwrap();
        assert_eq!(*grid.get(2, 1).unwrap(), 7);
        assert_eq!(grid.cells()[5], 7);
        assert_eq!(
            grid.set(3, 0, 1),
            Err(GridError::OutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 2
            })
        );
        assert!(grid.get(0, -1).is_err());
    }

    #[test]
    fn degenerate_grid_has_no_cells() {
        let grid = Grid::new(0, 5, 1u8).unwrap();

        assert!(grid.cells().is_empty());
        assert!(grid.get(0, 0).is_err());
        assert_eq!(grid.iter().count(), 0);
    }

    #[test]
    fn negative_or_huge_sizes_are_rejected() {
        assert!(Grid::new(-1, 4, 0u8).is_err());
        assert!(Grid::new(i32::MAX, i32::MAX, 0u8).is_err());
        assert_eq!(
            Grid::from_vec(2, 2, vec![1, 2, 3]),
            Err(GridError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn from_fn_and_iter_agree_on_layout() {
        let grid = Grid::from_fn(3, 2, |x, y| x * 10 + y).unwrap();

        for (x, y, v) in grid.iter() {
            assert_eq!(*v, x * 10 + y);
        }
        assert_eq!(grid.bounds(), (0, 0, 2, 1));
    }

    #[test]
    fn serializes_run_length_encoded() {
        let mut grid = Grid::new(4, 1, 1u32).unwrap();
        grid.set(3, 0, 0).unwrap();

        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"{"width":4,"height":1,"cells":[[1,3],[0,1]]}"#);

        let back: Grid<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn decoding_checks_cell_count() {
        let short: Result<Grid<u32>, _> =
            serde_json::from_str(r#"{"width":4,"height":1,"cells":[[1,2]]}"#);
        assert!(short.is_err());

        let negative: Result<Grid<u32>, _> =
            serde_json::from_str(r#"{"width":-1,"height":1,"cells":[]}"#);
        assert!(negative.is_err());
    }
}
