use serde::{Deserialize, Serialize};
use std::{
    cmp::{Ordering, Reverse},
    collections::{BinaryHeap, HashMap},
};
use thiserror::Error;

use crate::{
    bitgrid::BitGrid,
    grid::{Grid, GridError},
    BoundedMap,
};

/// A trait for a map that paths can be found in using [find_path] or a
/// [Pathfinder](crate::Pathfinder).
pub trait CostMap {
    /// Cost of stepping onto the tile at the given coordinates; zero means the tile is blocked.
    fn cost(&self, x: i32, y: i32) -> u32;

    /// Cost of moving from one tile to a neighboring one, before the edge multiplier is
    /// applied; zero means the move is not allowed.  Defaults to the cost of the tile entered.
    ///
    /// Override this for costs that depend on the direction of travel, such as one-way doors or
    /// climbing.
    #[inline]
    fn edge_cost(&self, _from: (i32, i32), to: (i32, i32)) -> u32 {
        self.cost(to.0, to.1)
    }
}

impl CostMap for Grid<u32> {
    #[inline]
    fn cost(&self, x: i32, y: i32) -> u32 {
        self.get(x, y).copied().unwrap_or(0)
    }
}

/// A BitGrid used as a walkability grid: true bits cost 1 to enter, false bits are blocked.
impl CostMap for BitGrid {
    #[inline]
    fn cost(&self, x: i32, y: i32) -> u32 {
        self.get_bit(x, y) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("({x}, {y}) is outside of the map")]
    OutOfBounds { x: i32, y: i32 },
    #[error("({x}, {y}) is not walkable")]
    Blocked { x: i32, y: i32 },
    #[error("neighborhood has no edges")]
    EmptyNeighborhood,
    #[error("invalid edge ({dx}, {dy}) with multiplier {multiplier}")]
    InvalidEdge { dx: i32, dy: i32, multiplier: f32 },
    #[error("edge map must be a square with an odd side length, got {rows} rows")]
    MalformedEdgeMap { rows: usize },
    #[error("invalid root distance {0}")]
    InvalidRootDistance(f32),
    #[error("bound pad must be non-negative, got {0}")]
    NegativeBoundPad(i32),
    #[error(transparent)]
    Grid(#[from] GridError),
}

bitflags! {
    /// Set of single-step movement directions used to build a [Neighborhood].
    pub struct Directions: u8 {
        const WEST = 0b00000001;
        const EAST = 0b00000010;
        const NORTH = 0b00000100;
        const SOUTH = 0b00001000;
        const NORTH_WEST = 0b00010000;
        const SOUTH_WEST = 0b00100000;
        const NORTH_EAST = 0b01000000;
        const SOUTH_EAST = 0b10000000;
        const CARDINAL = Self::WEST.bits | Self::EAST.bits | Self::NORTH.bits | Self::SOUTH.bits;
        const DIAGONAL = Self::NORTH_WEST.bits
            | Self::SOUTH_WEST.bits
            | Self::NORTH_EAST.bits
            | Self::SOUTH_EAST.bits;
    }
}

const ADJACENT_TILES: [(Directions, i32, i32); 8] = [
    (Directions::WEST, -1, 0), // cardinals
    (Directions::EAST, 1, 0),
    (Directions::NORTH, 0, -1),
    (Directions::SOUTH, 0, 1),
    (Directions::NORTH_WEST, -1, -1), // diagonals
    (Directions::SOUTH_WEST, -1, 1),
    (Directions::NORTH_EAST, 1, -1),
    (Directions::SOUTH_EAST, 1, 1),
];

/// One possible move: an offset and a multiplier applied to the cost of the tile entered.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Edge {
    pub dx: i32,
    pub dy: i32,
    pub multiplier: f32,
}

impl Edge {
    #[inline]
    fn is_diagonal(&self) -> bool {
        self.dx != 0 && self.dy != 0
    }
}

/// The ordered list of moves available from every tile.
///
/// Edge order is significant: it decides which of several equally good moves wins.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Neighborhood {
    edges: Vec<Edge>,
}

impl Default for Neighborhood {
    fn default() -> Self {
        Self::eight_way(std::f32::consts::SQRT_2)
    }
}

impl Neighborhood {
    /// Four-way movement with unit multipliers.
    pub fn cardinal() -> Self {
        Self::from_directions(Directions::CARDINAL, 1.)
    }

    /// Eight-way movement where diagonal moves cost `diagonal` times as much.
    pub fn eight_way(diagonal: f32) -> Self {
        Self::from_directions(Directions::all(), diagonal)
    }

    /// Movement in each of the given directions, cardinals before diagonals.
    pub fn from_directions(directions: Directions, diagonal: f32) -> Self {
        let edges = ADJACENT_TILES
            .iter()
            .filter(|(dir, _, _)| directions.contains(*dir))
            .map(|&(dir, dx, dy)| Edge {
                dx,
                dy,
                multiplier: if Directions::DIAGONAL.contains(dir) {
                    diagonal
                } else {
                    1.
                },
            })
            .collect();

        Self { edges }
    }

    /// Build a neighborhood from an explicit list of edges.
    pub fn from_edges(edges: Vec<Edge>) -> Result<Self, PathError> {
        let neighborhood = Self { edges };

        neighborhood.validate()?;
        Ok(neighborhood)
    }

    /// Build a neighborhood from a square matrix of multipliers centered on the moving tile.
    ///
    /// Positive entries become edges in row-major order; zero entries and the center are
    /// ignored.  This allows movement patterns such as knight moves or hex grids.
    pub fn from_edge_map(rows: &[&[f32]]) -> Result<Self, PathError> {
        let size = rows.len();

        if size % 2 == 0 || rows.iter().any(|row| row.len() != size) {
            return Err(PathError::MalformedEdgeMap { rows: size });
        }

        let half = (size / 2) as i32;
        let mut edges = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            for (x, &multiplier) in row.iter().enumerate() {
                let (dx, dy) = (x as i32 - half, y as i32 - half);

                if (dx, dy) != (0, 0) && multiplier != 0. {
                    edges.push(Edge { dx, dy, multiplier });
                }
            }
        }

        Self::from_edges(edges)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn validate(&self) -> Result<(), PathError> {
        if self.edges.is_empty() {
            return Err(PathError::EmptyNeighborhood);
        }

        for edge in &self.edges {
            if (edge.dx, edge.dy) == (0, 0) || !edge.multiplier.is_finite() || edge.multiplier <= 0.
            {
                return Err(PathError::InvalidEdge {
                    dx: edge.dx,
                    dy: edge.dy,
                    multiplier: edge.multiplier,
                });
            }
        }

        Ok(())
    }
}

/// Lower bound on the cost of travelling between two tiles given a neighborhood, assuming every
/// tile costs at least 1 to enter.
struct Heuristic {
    /// Cheapest multiplier per unit of Chebyshev distance covered by one move.
    per_chebyshev: f32,
    /// Cheapest multiplier per unit of Manhattan distance covered by one move.
    per_manhattan: f32,
    /// Cardinal and diagonal multipliers when the neighborhood is a plain octile one.
    octile: Option<(f32, f32)>,
}

impl Heuristic {
    fn new(neighborhood: &Neighborhood) -> Self {
        let mut per_chebyshev = f32::INFINITY;
        let mut per_manhattan = f32::INFINITY;
        let mut cardinal = f32::INFINITY;
        let mut diagonal = f32::INFINITY;
        let mut unit_steps = true;

        for edge in neighborhood.edges() {
            let (ax, ay) = (edge.dx.abs(), edge.dy.abs());

            per_chebyshev = per_chebyshev.min(edge.multiplier / ax.max(ay) as f32);
            per_manhattan = per_manhattan.min(edge.multiplier / (ax + ay) as f32);

            if ax > 1 || ay > 1 {
                unit_steps = false;
            } else if edge.is_diagonal() {
                diagonal = diagonal.min(edge.multiplier);
            } else {
                cardinal = cardinal.min(edge.multiplier);
            }
        }

        // Octile distance is only a lower bound when a diagonal is no cheaper than a cardinal
        // and no dearer than two of them.
        let octile = if unit_steps
            && cardinal.is_finite()
            && diagonal.is_finite()
            && diagonal >= cardinal
            && diagonal <= 2. * cardinal
        {
            Some((cardinal, diagonal))
        } else {
            None
        };

        Self {
            per_chebyshev,
            per_manhattan,
            octile,
        }
    }

    fn estimate(&self, (x1, y1): (i32, i32), (x2, y2): (i32, i32)) -> f32 {
        let x_diff = (x1 - x2).abs();
        let y_diff = (y1 - y2).abs();
        let (low_diff, high_diff) = if x_diff < y_diff {
            (x_diff, y_diff)
        } else {
            (y_diff, x_diff)
        };

        match self.octile {
            Some((cardinal, diagonal)) => {
                low_diff as f32 * diagonal + (high_diff - low_diff) as f32 * cardinal
            }
            None => (high_diff as f32 * self.per_chebyshev)
                .max((x_diff + y_diff) as f32 * self.per_manhattan),
        }
    }
}

/// Accumulated path cost with a total order so it can sit in a [BinaryHeap].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Cost(pub f32);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A path found by [find_path] or traced through a [DistanceMap](crate::DistanceMap).
///
/// Positions run from the start of the path to its end, both inclusive.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Path {
    steps: Vec<(i32, i32)>,
    cost: f32,
    fallback: bool,
}

impl Path {
    pub(crate) fn new(steps: Vec<(i32, i32)>, cost: f32, fallback: bool) -> Self {
        Self {
            steps,
            cost,
            fallback,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.steps.iter().copied()
    }

    pub fn steps(&self) -> &[(i32, i32)] {
        &self.steps
    }

    /// Number of positions in the path, counting both ends.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn first(&self) -> Option<(i32, i32)> {
        self.steps.first().copied()
    }

    pub fn last(&self) -> Option<(i32, i32)> {
        self.steps.last().copied()
    }

    /// Total cost of every step taken along the path.
    pub fn cost(&self) -> f32 {
        self.cost
    }

    /// Returns true if this path leads to the closest reachable point to the destination, rather
    /// than the destination itself.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = (i32, i32);
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, (i32, i32)>>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter().copied()
    }
}

/// Options for [find_path].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AStarSettings {
    pub neighborhood: Neighborhood,
    /// If non-zero, confine the search to the rectangle spanned by the start and destination
    /// plus this much padding.
    pub bound_pad: i32,
    /// Give up after expanding this many tiles.
    pub explore_limit: Option<usize>,
    /// If no path reaches the destination, return a path to the closest reachable point instead.
    pub fallback_closest: bool,
}

impl Default for AStarSettings {
    fn default() -> Self {
        Self {
            neighborhood: Neighborhood::default(),
            bound_pad: 0,
            explore_limit: None,
            fallback_closest: false,
        }
    }
}

impl AStarSettings {
    pub fn validate(&self) -> Result<(), PathError> {
        if self.bound_pad < 0 {
            return Err(PathError::NegativeBoundPad(self.bound_pad));
        }
        self.neighborhood.validate()
    }
}

/// Check that a position is inside the map and walkable.
pub(crate) fn check_walkable<T: BoundedMap + CostMap>(
    map: &T,
    (x, y): (i32, i32),
) -> Result<(), PathError> {
    if !map.in_bounds(x, y) {
        Err(PathError::OutOfBounds { x, y })
    } else if map.cost(x, y) == 0 {
        Err(PathError::Blocked { x, y })
    } else {
        Ok(())
    }
}

/// Calculate the cheapest path from `start` to `dest` using the A* algorithm, returning the
/// closest point to `dest` that was reached from `start`, which will be equal to `dest` if a path
/// was found.
///
/// The path data are stored in `came_from` where the keys are positions and the values are the
/// position that they came from; this means that the path is stored in reverse.
fn a_star<T: BoundedMap + CostMap>(
    map: &T,
    start: (i32, i32),
    dest: (i32, i32),
    settings: &AStarSettings,
    came_from: &mut HashMap<(i32, i32), (i32, i32)>,
    cost_so_far: &mut HashMap<(i32, i32), f32>,
) -> (i32, i32) {
    let heuristic = Heuristic::new(&settings.neighborhood);
    let edges = settings.neighborhood.edges();
    // (priority, (x, y))
    let mut frontier: BinaryHeap<(Reverse<Cost>, (i32, i32))> = BinaryHeap::new();
    let (min_x, min_y, max_x, max_y) = if settings.bound_pad == 0 {
        map.bounds()
    } else {
        let bounds = map.bounds();
        let pad = settings.bound_pad;

        (
            bounds.0.max(start.0.min(dest.0).saturating_sub(pad)),
            bounds.1.max(start.1.min(dest.1).saturating_sub(pad)),
            bounds.2.min(start.0.max(dest.0).saturating_add(pad)),
            bounds.3.min(start.1.max(dest.1).saturating_add(pad)),
        )
    };
    let mut closest = start;
    let mut closest_cost = 0.;
    let mut closest_dist = heuristic.estimate(start, dest);
    let mut explored = 0usize;

    frontier.push((Reverse(Cost(closest_dist)), start));
    cost_so_far.insert(start, 0.);

    while let Some((Reverse(Cost(priority)), current)) = frontier.pop() {
        let current_cost = match cost_so_far.get(&current) {
            Some(&cost) => cost,
            None => continue,
        };
        let current_dist = heuristic.estimate(current, dest);

        // Skip stale entries left behind by a later, cheaper visit.
        if priority > current_cost + current_dist {
            continue;
        }

        if current_dist < closest_dist
            || (current_dist == closest_dist && current_cost < closest_cost)
        {
            closest = current;
            closest_cost = current_cost;
            closest_dist = current_dist;
        }

        if current == dest {
            closest = dest;
            break;
        }

        explored += 1;
        if settings.explore_limit.map_or(false, |limit| explored > limit) {
            log::debug!("a* from {:?} to {:?} hit explore limit", start, dest);
            break;
        }

        for edge in edges {
            let next_x = current.0 + edge.dx;
            let next_y = current.1 + edge.dy;

            if next_x >= min_x && next_x <= max_x && next_y >= min_y && next_y <= max_y {
                let next = (next_x, next_y);
                let tile_cost = map.edge_cost(current, next);

                if tile_cost > 0 {
                    let next_cost = current_cost + tile_cost as f32 * edge.multiplier;

                    if next_cost < *cost_so_far.get(&next).unwrap_or(&f32::INFINITY) {
                        let priority = next_cost + heuristic.estimate(next, dest);

                        frontier.push((Reverse(Cost(priority)), next));
                        came_from.insert(next, current);
                        cost_so_far.insert(next, next_cost);
                    }
                }
            }
        }
    }

    closest
}

/// Find the cheapest path from `start` to `dest` on the given map.
///
/// Moving onto a tile costs its [CostMap::edge_cost] times the multiplier of the edge used.  The
/// returned path includes both `start` and `dest`.
///
/// If `bound_pad` is non-zero, confine the search for the path to the rectangle created by the
/// `start` and `dest` points plus a padding of `bound_pad` positions, otherwise search the whole
/// map.
///
/// If a path cannot be found and `fallback_closest` is set, find the closest point to `dest`
/// reachable from `start` (within the `bound_pad` if given) and return the path towards that
/// point instead, otherwise return `None`.
pub fn find_path<T: BoundedMap + CostMap>(
    map: &T,
    start: (i32, i32),
    dest: (i32, i32),
    settings: &AStarSettings,
) -> Result<Option<Path>, PathError> {
    settings.validate()?;
    check_walkable(map, start)?;
    check_walkable(map, dest)?;

    let mut came_from: HashMap<(i32, i32), (i32, i32)> = HashMap::new();
    let mut cost_so_far: HashMap<(i32, i32), f32> = HashMap::new();
    let closest = a_star(map, start, dest, settings, &mut came_from, &mut cost_so_far);

    if closest != dest && !settings.fallback_closest {
        log::debug!("no path from {:?} to {:?}", start, dest);
        return Ok(None);
    }

    let mut steps = vec![closest];
    let mut current = closest;

    while let Some(&prev) = came_from.get(&current) {
        steps.push(prev);
        current = prev;
    }
    steps.reverse();

    let cost = cost_so_far.get(&closest).copied().unwrap_or(0.);

    log::trace!(
        "a* path from {:?} to {:?}: {} steps, cost {}",
        start,
        closest,
        steps.len(),
        cost
    );

    Ok(Some(Path::new(steps, cost, closest != dest)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(width: i32, height: i32) -> Grid<u32> {
        Grid::new(width, height, 1).unwrap()
    }

    fn walls(rows: &[&str]) -> Grid<u32> {
        let height = rows.len() as i32;
        let width = rows[0].len() as i32;

        Grid::from_fn(width, height, |x, y| {
            match rows[y as usize].as_bytes()[x as usize] {
                b'#' => 0,
                b'~' => 5,
                _ => 1,
            }
        })
        .unwrap()
    }

    fn cardinal() -> AStarSettings {
        AStarSettings {
            neighborhood: Neighborhood::cardinal(),
            ..Default::default()
        }
    }

    #[test]
    fn straight_line_includes_both_ends() {
        let map = open(5, 1);
        let path = find_path(&map, (0, 0), (4, 0), &cardinal()).unwrap().unwrap();

        assert_eq!(path.steps(), &[(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
        assert_eq!(path.cost(), 4.);
        assert!(!path.is_fallback());
        assert_eq!(path.first(), Some((0, 0)));
        assert_eq!(path.last(), Some((4, 0)));
    }

    #[test]
    fn start_equals_dest() {
        let map = open(3, 3);
        let path = find_path(&map, (1, 1), (1, 1), &cardinal()).unwrap().unwrap();

        assert_eq!(path.steps(), &[(1, 1)]);
        assert_eq!(path.cost(), 0.);
    }

    #[test]
    fn diagonal_moves_use_multiplier() {
        let map = open(4, 4);
        let path = find_path(&map, (0, 0), (3, 3), &AStarSettings::default())
            .unwrap()
            .unwrap();

        assert_eq!(path.len(), 4);
        assert!((path.cost() - 3. * std::f32::consts::SQRT_2).abs() < 1e-4);
    }

    #[test]
    fn routes_around_walls() {
        let map = walls(&[
            "...#...", //
            ".#.#.#.",
            ".#...#.",
            ".#####~",
            ".......",
        ]);
        let path = find_path(&map, (0, 0), (6, 0), &cardinal()).unwrap().unwrap();

        for (x, y) in &path {
            assert_ne!(map.cost(x, y), 0);
        }
        assert_eq!(path.last(), Some((6, 0)));
        assert_eq!(path.cost(), 10.);
    }

    #[test]
    fn unreachable_destination_is_none_or_fallback() {
        let map = walls(&[
            "..#..", //
            "..#..",
            "..#..",
        ]);

        assert_eq!(find_path(&map, (0, 1), (4, 1), &cardinal()).unwrap(), None);

        let settings = AStarSettings {
            fallback_closest: true,
            ..cardinal()
        };
        let path = find_path(&map, (0, 1), (4, 1), &settings).unwrap().unwrap();

        assert!(path.is_fallback());
        assert_eq!(path.last(), Some((1, 1)));
    }

    #[test]
    fn bound_pad_confines_search() {
        let map = walls(&[
            ".....", //
            ".###.",
            ".#.#.",
            ".....",
        ]);
        let settings = cardinal();
        let path = find_path(&map, (2, 2), (2, 0), &settings).unwrap().unwrap();
        assert_eq!(path.len(), 9);

        // The only way round leaves the padded box.
        let settings = AStarSettings {
            bound_pad: 1,
            ..cardinal()
        };
        assert_eq!(find_path(&map, (2, 2), (2, 0), &settings).unwrap(), None);
    }

    #[test]
    fn explore_limit_stops_search() {
        let map = open(50, 50);
        let settings = AStarSettings {
            explore_limit: Some(5),
            ..cardinal()
        };

        assert_eq!(find_path(&map, (0, 0), (49, 49), &settings).unwrap(), None);
    }

    #[test]
    fn bad_endpoints_are_errors() {
        let map = walls(&[".#."]);

        assert_eq!(
            find_path(&map, (0, 0), (1, 0), &cardinal()),
            Err(PathError::Blocked { x: 1, y: 0 })
        );
        assert_eq!(
            find_path(&map, (-1, 0), (2, 0), &cardinal()),
            Err(PathError::OutOfBounds { x: -1, y: 0 })
        );
    }

    #[test]
    fn knight_moves_from_edge_map() {
        let neighborhood = Neighborhood::from_edge_map(&[
            &[0., 1., 0., 1., 0.],
            &[1., 0., 0., 0., 1.],
            &[0., 0., 0., 0., 0.],
            &[1., 0., 0., 0., 1.],
            &[0., 1., 0., 1., 0.],
        ])
        .unwrap();
        assert_eq!(neighborhood.edges().len(), 8);

        let map = open(8, 8);
        let settings = AStarSettings {
            neighborhood,
            ..Default::default()
        };
        let path = find_path(&map, (0, 0), (1, 2), &settings).unwrap().unwrap();

        assert_eq!(path.steps(), &[(0, 0), (1, 2)]);

        let path = find_path(&map, (0, 0), (7, 7), &settings).unwrap().unwrap();
        assert_eq!(path.cost(), 6.);
    }

    #[test]
    fn malformed_neighborhoods_are_rejected() {
        assert_eq!(
            Neighborhood::from_edge_map(&[&[1., 1.], &[1., 1.]]),
            Err(PathError::MalformedEdgeMap { rows: 2 })
        );
        assert_eq!(
            Neighborhood::from_edges(vec![]),
            Err(PathError::EmptyNeighborhood)
        );
        assert!(Neighborhood::from_edges(vec![Edge {
            dx: 1,
            dy: 0,
            multiplier: -1.
        }])
        .is_err());
        assert!(Neighborhood::eight_way(f32::NAN).validate().is_err());
    }

    #[test]
    fn directions_pick_edges() {
        let n = Neighborhood::from_directions(Directions::EAST | Directions::SOUTH_EAST, 2.);

        assert_eq!(
            n.edges(),
            &[
                Edge {
                    dx: 1,
                    dy: 0,
                    multiplier: 1.
                },
                Edge {
                    dx: 1,
                    dy: 1,
                    multiplier: 2.
                },
            ]
        );
        assert_eq!(Neighborhood::cardinal().edges().len(), 4);
    }

    #[test]
    fn bitgrid_is_walkability() {
        let mut map = BitGrid::new(3, 1).unwrap();
        map.set_bit(0, 0, true).unwrap();
        map.set_bit(1, 0, true).unwrap();

        assert!(find_path(&map, (0, 0), (1, 0), &cardinal()).unwrap().is_some());
        assert_eq!(
            find_path(&map, (0, 0), (2, 0), &cardinal()),
            Err(PathError::Blocked { x: 2, y: 0 })
        );
    }

    /// Walking west costs three times as much, and the door between x = 3 and x = 4 only
    /// opens eastward.
    struct Slope(Grid<u32>);

    impl BoundedMap for Slope {
        fn bounds(&self) -> (i32, i32, i32, i32) {
            self.0.bounds()
        }
    }

    impl CostMap for Slope {
        fn cost(&self, x: i32, y: i32) -> u32 {
            self.0.cost(x, y)
        }

        fn edge_cost(&self, from: (i32, i32), to: (i32, i32)) -> u32 {
            if from.0 == 4 && to.0 == 3 {
                0
            } else if to.0 < from.0 {
                3 * self.cost(to.0, to.1)
            } else {
                self.cost(to.0, to.1)
            }
        }
    }

    #[test]
    fn edge_costs_depend_on_direction() {
        let map = Slope(open(6, 1));

        let east = find_path(&map, (0, 0), (3, 0), &cardinal()).unwrap().unwrap();
        assert_eq!(east.cost(), 3.);
        let west = find_path(&map, (3, 0), (0, 0), &cardinal()).unwrap().unwrap();
        assert_eq!(west.cost(), 9.);

        assert!(find_path(&map, (0, 0), (5, 0), &cardinal()).unwrap().is_some());
        assert_eq!(find_path(&map, (5, 0), (0, 0), &cardinal()).unwrap(), None);

        let mut pathfinder = crate::Pathfinder::new(&map, Neighborhood::cardinal()).unwrap();
        pathfinder.add_root(3, 0).unwrap();
        let distance_map = pathfinder.resolve().unwrap();

        assert_eq!(distance_map.distance(0, 0).unwrap(), Some(9.));
        assert_eq!(distance_map.distance(5, 0).unwrap(), Some(2.));

        pathfinder.clear_roots();
        pathfinder.add_root(5, 0).unwrap();
        assert_eq!(pathfinder.resolve().unwrap().distance(0, 0).unwrap(), None);
    }
}
