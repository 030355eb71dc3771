#[macro_use]
extern crate bitflags;

mod bitgrid;
mod blend;
mod bsp;
mod console;
mod dijkstra;
mod field_of_view;
mod grid;
pub mod magicnum;
mod noise;
mod path_find;
mod rect;
mod serde_rle;
pub mod util;

pub use bitgrid::BitGrid;
pub use blend::{blend_color, BlendMode};
pub use bsp::{BspError, BspNode, BspSettings, BspTree, BspWalk, NodeId, Order, Split};
pub use console::{blit, blit_keyed, Cell, Console, ConsoleError};
pub use dijkstra::{DistanceMap, Pathfinder};
pub use field_of_view::{
    compute_fov, compute_fov_into, FovAlgorithm, FovError, FovSettings, FovShape, ViewableField,
};
pub use grid::{CostGrid, Grid, GridError};
pub use noise::{
    FractalKind, Noise, NoiseAlgorithm, NoiseError, NoiseSettings, MAX_DIMENSIONS, MAX_OCTAVES,
};
pub use path_find::{
    find_path, AStarSettings, CostMap, Directions, Edge, Neighborhood, Path, PathError,
};
pub use rect::Rect;

/// A trait for a map that has minimum and maximum coordinate bounds.
pub trait BoundedMap {
    /// `min_x`, `min_y`, `max_x`, `max_y`.  Note that the latter two are inclusive.
    fn bounds(&self) -> (i32, i32, i32, i32);

    /// Returns `true` if the given coordinates lie within [BoundedMap::bounds].
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        let (min_x, min_y, max_x, max_y) = self.bounds();

        x >= min_x && x <= max_x && y >= min_y && y <= max_y
    }
}
