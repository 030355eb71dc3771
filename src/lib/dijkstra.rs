use std::{cmp::Reverse, collections::BinaryHeap};

use crate::{
    grid::Grid,
    path_find::{check_walkable, Cost, CostMap, Neighborhood, Path, PathError},
    BoundedMap,
};

const NO_PARENT: u32 = u32::MAX;

/// Minimum accumulated cost from the nearest root to every tile of a map, produced by
/// [Pathfinder::resolve].
///
/// Each reachable tile also remembers the edge it was reached through, for
/// [DistanceMap::trace_path_to].
#[derive(Clone, Debug)]
pub struct DistanceMap {
    min_x: i32,
    min_y: i32,
    distances: Grid<f32>,
    parents: Grid<u32>,
    neighborhood: Neighborhood,
}

impl DistanceMap {
    #[inline]
    fn local(&self, x: i32, y: i32) -> Result<(i32, i32), PathError> {
        let (lx, ly) = (x - self.min_x, y - self.min_y);

        if self.distances.contains(lx, ly) {
            Ok((lx, ly))
        } else {
            Err(PathError::OutOfBounds { x, y })
        }
    }

    /// Distance from the nearest root to the given tile, or `None` if it can't be reached.
    pub fn distance(&self, x: i32, y: i32) -> Result<Option<f32>, PathError> {
        let (lx, ly) = self.local(x, y)?;
        let d = self.distances.get(lx, ly).copied().unwrap_or(f32::INFINITY);

        Ok(if d.is_finite() { Some(d) } else { None })
    }

    /// Number of tiles reachable from any root, roots included.
    pub fn reachable_count(&self) -> usize {
        self.distances
            .cells()
            .iter()
            .filter(|d| d.is_finite())
            .count()
    }

    /// Largest finite distance in the map.
    pub fn max_distance(&self) -> Option<f32> {
        self.distances
            .cells()
            .iter()
            .copied()
            .filter(|d| d.is_finite())
            .reduce(f32::max)
    }

    /// Walk downhill from the given tile to a root, target first.
    ///
    /// Each step moves to the neighbor with the smallest distance below the current one,
    /// where a neighbor is any tile that reaches the current one through a single edge.  Ties
    /// go to the earliest edge of the neighborhood.  The walk ends on a tile with no lower
    /// neighbor, which is a root.  The path's cost is the target's distance.
    pub fn path_from(&self, x: i32, y: i32) -> Result<Option<Path>, PathError> {
        let (mut lx, mut ly) = self.local(x, y)?;
        let cost = match self.distances.get(lx, ly) {
            Ok(&d) if d.is_finite() => d,
            _ => return Ok(None),
        };
        let mut current = cost;
        let mut steps = vec![(x, y)];

        loop {
            let mut lowest: Option<(f32, (i32, i32))> = None;

            for edge in self.neighborhood.edges() {
                let (px, py) = (lx - edge.dx, ly - edge.dy);

                if let Ok(&d) = self.distances.get(px, py) {
                    if d < current && lowest.map_or(true, |(best, _)| d < best) {
                        lowest = Some((d, (px, py)));
                    }
                }
            }

            match lowest {
                Some((d, (px, py))) => {
                    current = d;
                    lx = px;
                    ly = py;
                    steps.push((lx + self.min_x, ly + self.min_y));
                }
                None => break,
            }
        }

        Ok(Some(Path::new(steps, cost, false)))
    }

    /// Walk downhill from the nearest root to the given tile, root first.  See
    /// [DistanceMap::path_from].
    pub fn path_to(&self, x: i32, y: i32) -> Result<Option<Path>, PathError> {
        Ok(self.path_from(x, y)?.map(reversed))
    }

    /// Follow the edges the solver actually relaxed, root first.
    ///
    /// Unlike [DistanceMap::path_to], the steps of this path always add up to the target's
    /// distance, even when diagonal and cardinal moves cost different amounts.
    pub fn trace_path_to(&self, x: i32, y: i32) -> Result<Option<Path>, PathError> {
        let (mut lx, mut ly) = self.local(x, y)?;
        let cost = match self.distances.get(lx, ly) {
            Ok(&d) if d.is_finite() => d,
            _ => return Ok(None),
        };
        let mut steps = vec![(x, y)];

        loop {
            let parent = self.parents.get(lx, ly).copied().unwrap_or(NO_PARENT);
            let edge = match self.neighborhood.edges().get(parent as usize) {
                Some(edge) => edge,
                None => break,
            };

            lx -= edge.dx;
            ly -= edge.dy;
            steps.push((lx + self.min_x, ly + self.min_y));
        }

        Ok(Some(reversed(Path::new(steps, cost, false))))
    }
}

fn reversed(path: Path) -> Path {
    let cost = path.cost();
    let mut steps = path.steps().to_vec();

    steps.reverse();
    Path::new(steps, cost, false)
}

/// Multi-source Dijkstra solver over a borrowed [CostMap].
///
/// The map is borrowed for the life of the pathfinder so it can't change under a cached
/// [DistanceMap]; changing the roots drops the cache until the next [Pathfinder::resolve].
pub struct Pathfinder<'a, M> {
    map: &'a M,
    neighborhood: Neighborhood,
    roots: Vec<((i32, i32), f32)>,
    cache: Option<DistanceMap>,
}

impl<'a, M: BoundedMap + CostMap> Pathfinder<'a, M> {
    pub fn new(map: &'a M, neighborhood: Neighborhood) -> Result<Self, PathError> {
        neighborhood.validate()?;

        Ok(Self {
            map,
            neighborhood,
            roots: Vec::new(),
            cache: None,
        })
    }

    /// Add a root with a starting distance of zero.
    pub fn add_root(&mut self, x: i32, y: i32) -> Result<(), PathError> {
        self.add_root_with(x, y, 0.)
    }

    /// Add a root with the given starting distance.
    pub fn add_root_with(&mut self, x: i32, y: i32, distance: f32) -> Result<(), PathError> {
        check_walkable(self.map, (x, y))?;
        if !distance.is_finite() || distance < 0. {
            return Err(PathError::InvalidRootDistance(distance));
        }

        self.roots.push(((x, y), distance));
        self.cache = None;
        Ok(())
    }

    pub fn clear_roots(&mut self) {
        self.roots.clear();
        self.cache = None;
    }

    pub fn roots(&self) -> impl Iterator<Item = ((i32, i32), f32)> + '_ {
        self.roots.iter().copied()
    }

    /// The last resolved distance map, if the roots haven't changed since.
    pub fn distance_map(&self) -> Option<&DistanceMap> {
        self.cache.as_ref()
    }

    /// Compute the distance map for the current roots, reusing the cached one if still valid.
    pub fn resolve(&mut self) -> Result<&DistanceMap, PathError> {
        let distance_map = match self.cache.take() {
            Some(distance_map) => distance_map,
            None => dijkstra(self.map, &self.neighborhood, &self.roots)?,
        };

        Ok(self.cache.insert(distance_map))
    }
}

fn dijkstra<M: BoundedMap + CostMap>(
    map: &M,
    neighborhood: &Neighborhood,
    roots: &[((i32, i32), f32)],
) -> Result<DistanceMap, PathError> {
    let (min_x, min_y, max_x, max_y) = map.bounds();
    let width = (max_x - min_x + 1).max(0);
    let height = (max_y - min_y + 1).max(0);
    let mut distances = Grid::new(width, height, f32::INFINITY)?;
    let mut parents = Grid::new(width, height, NO_PARENT)?;
    let edges = neighborhood.edges();
    // (distance, (local x, local y))
    let mut frontier: BinaryHeap<(Reverse<Cost>, (i32, i32))> = BinaryHeap::new();

    for &((x, y), d) in roots {
        let pos = (x - min_x, y - min_y);

        if let Ok(current) = distances.get_mut(pos.0, pos.1) {
            if d < *current {
                *current = d;
                frontier.push((Reverse(Cost(d)), pos));
            }
        }
    }

    while let Some((Reverse(Cost(d)), (x, y))) = frontier.pop() {
        if distances.get(x, y).map_or(true, |&best| d > best) {
            continue;
        }

        for (i, edge) in edges.iter().enumerate() {
            let (nx, ny) = (x + edge.dx, y + edge.dy);
            let index = match distances.index(nx, ny) {
                Some(index) => index,
                None => continue,
            };
            let tile_cost = map.edge_cost((x + min_x, y + min_y), (nx + min_x, ny + min_y));

            if tile_cost == 0 {
                continue;
            }

            let next = d + tile_cost as f32 * edge.multiplier;
            let best = distances.cells()[index];
            let parent = &mut parents.cells_mut()[index];

            if next < best {
                distances.cells_mut()[index] = next;
                *parent = i as u32;
                frontier.push((Reverse(Cost(next)), (nx, ny)));
            } else if next == best && next > d && *parent != NO_PARENT && (i as u32) < *parent {
                *parent = i as u32;
            }
        }
    }

    let distance_map = DistanceMap {
        min_x,
        min_y,
        distances,
        parents,
        neighborhood: neighborhood.clone(),
    };

    log::debug!(
        "distance map from {} roots: {} tiles reachable",
        roots.len(),
        distance_map.reachable_count()
    );

    Ok(distance_map)
}
