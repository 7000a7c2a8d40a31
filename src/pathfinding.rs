//! Per-call step pathfinding.
//!
//! Both finders are stateless between calls: each call consumes at most
//! `budget` grid steps and reports the tile the mover ends on. Callers hold
//! no path state, so a target that moves between ticks is re-chased for free.

use crate::map::{GameMap, TileRef};
use std::collections::{HashMap, VecDeque};

/// Search cap for the surface flavor. Bounds per-call cost on maps where the
/// destination is unreachable.
const MAX_EXPANSIONS: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    /// Tile the mover occupies after consuming its step budget.
    Next(TileRef),
    /// `from` already equals the destination.
    Arrived,
    /// No traversable route exists (surface flavor only).
    Blocked,
}

/// Straight-line stepper for aircraft and missiles. Ignores terrain, never
/// leaves the map.
pub struct AirPathFinder<'a> {
    map: &'a GameMap,
}

impl<'a> AirPathFinder<'a> {
    pub fn new(map: &'a GameMap) -> Self {
        Self { map }
    }

    pub fn next_tile(&self, from: TileRef, to: TileRef, budget: u32) -> PathStep {
        if from == to {
            return PathStep::Arrived;
        }
        let mut x = i64::from(self.map.x(from));
        let mut y = i64::from(self.map.y(from));
        let tx = i64::from(self.map.x(to));
        let ty = i64::from(self.map.y(to));
        for _ in 0..budget.max(1) {
            x += (tx - x).signum();
            y += (ty - y).signum();
            if x == tx && y == ty {
                break;
            }
        }
        PathStep::Next(self.map.tile(x as u32, y as u32))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDomain {
    Land,
    Water,
}

impl MoveDomain {
    fn passable(self, map: &GameMap, tile: TileRef) -> bool {
        match self {
            MoveDomain::Land => map.is_land(tile),
            MoveDomain::Water => map.is_ocean(tile),
        }
    }
}

/// Terrain-constrained stepper for ground and sea movers. Runs a bounded
/// breadth-first search each call and jumps the mover up to `budget` tiles
/// along the discovered route.
pub struct SurfacePathFinder<'a> {
    map: &'a GameMap,
    domain: MoveDomain,
}

impl<'a> SurfacePathFinder<'a> {
    pub fn new(map: &'a GameMap, domain: MoveDomain) -> Self {
        Self { map, domain }
    }

    pub fn next_tile(&self, from: TileRef, to: TileRef, budget: u32) -> PathStep {
        if from == to {
            return PathStep::Arrived;
        }
        if !self.domain.passable(self.map, to) {
            return PathStep::Blocked;
        }

        let mut parents: HashMap<TileRef, TileRef> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back(from);
        parents.insert(from, from);
        let mut expanded = 0usize;
        let mut found = false;

        while let Some(current) = queue.pop_front() {
            if current == to {
                found = true;
                break;
            }
            expanded += 1;
            if expanded > MAX_EXPANSIONS {
                break;
            }
            for neighbor in self.map.neighbors4(current) {
                if parents.contains_key(&neighbor) {
                    continue;
                }
                if !self.domain.passable(self.map, neighbor) {
                    continue;
                }
                parents.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }

        if !found {
            return PathStep::Blocked;
        }

        let mut path = vec![to];
        let mut cursor = to;
        while cursor != from {
            cursor = parents[&cursor];
            path.push(cursor);
        }
        path.reverse();

        let steps = (budget.max(1) as usize).min(path.len() - 1);
        PathStep::Next(path[steps])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TerrainType;

    fn map_from_rows(rows: &[&str]) -> GameMap {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let terrain = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| match c {
                '~' => TerrainType::Ocean,
                '^' => TerrainType::Mountain,
                _ => TerrainType::Plains,
            })
            .collect();
        GameMap::new(width, height, terrain)
    }

    #[test]
    fn air_path_steps_diagonally() {
        let map = map_from_rows(&["....", "....", "....", "...."]);
        let finder = AirPathFinder::new(&map);
        let from = map.tile(0, 0);
        let to = map.tile(3, 3);

        match finder.next_tile(from, to, 1) {
            PathStep::Next(t) => assert_eq!((map.x(t), map.y(t)), (1, 1)),
            other => panic!("unexpected step {other:?}"),
        }
        match finder.next_tile(from, to, 2) {
            PathStep::Next(t) => assert_eq!((map.x(t), map.y(t)), (2, 2)),
            other => panic!("unexpected step {other:?}"),
        }
        assert_eq!(finder.next_tile(to, to, 2), PathStep::Arrived);
    }

    #[test]
    fn air_path_overshoot_stops_at_target() {
        let map = map_from_rows(&["....", "....", "....", "...."]);
        let finder = AirPathFinder::new(&map);
        let from = map.tile(0, 0);
        let to = map.tile(2, 1);
        match finder.next_tile(from, to, 10) {
            PathStep::Next(t) => assert_eq!(t, to),
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn surface_path_routes_around_water() {
        let map = map_from_rows(&[
            ".....", //
            ".~~~.", //
            ".~~~.", //
            ".....",
        ]);
        let finder = SurfacePathFinder::new(&map, MoveDomain::Land);
        let from = map.tile(0, 1);
        let to = map.tile(4, 2);

        let mut at = from;
        let mut hops = 0;
        loop {
            match finder.next_tile(at, to, 2) {
                PathStep::Arrived => break,
                PathStep::Next(t) => {
                    assert!(map.is_land(t), "land mover strayed into the ocean");
                    at = t;
                }
                PathStep::Blocked => panic!("route exists"),
            }
            hops += 1;
            assert!(hops < 32, "path should converge");
        }
        assert_eq!(at, to);
    }

    #[test]
    fn surface_path_reports_blocked() {
        let map = map_from_rows(&[
            ".~.", //
            "~~~", //
            ".~.",
        ]);
        let finder = SurfacePathFinder::new(&map, MoveDomain::Land);
        assert_eq!(
            finder.next_tile(map.tile(0, 0), map.tile(2, 2), 1),
            PathStep::Blocked
        );
        assert_eq!(
            finder.next_tile(map.tile(0, 0), map.tile(1, 1), 1),
            PathStep::Blocked
        );
    }
}
