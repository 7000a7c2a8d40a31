//! Structure planning for assistive AI players.
//!
//! Decides, once per AI cadence, which single structure is worth starting:
//! cities and ports by territory density, then one airfield, opportunistic
//! warships, SAM coverage for strategic assets, one missile silo, and
//! defense posts along contested borders.

use crate::execution::ConstructionExecution;
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitType};
use crate::game::Game;
use crate::map::TileRef;
use crate::rng::GameRng;

const CITY_DENSITY_PER_TILE: f64 = 1.0 / 5000.0;
const PORT_DENSITY_PER_TILE: f64 = 1.0 / 10000.0;
const MIN_BUILDING_DISTANCE_SQUARED: u64 = 1600;
const DEFENSE_POST_DENSITY_PER_BORDER_TILE: f64 = 1.0 / 80.0;
const MAX_DISTANCE_FROM_BORDER_SQUARED: u64 = 400;
const MIN_DISTANCE_BETWEEN_DEFENSE_POSTS_SQUARED: u64 = 900;
const SAM_COVERAGE_RADIUS_SQUARED: u64 = 1600;
const WARSHIP_SPAWN_RADIUS: i64 = 50;
const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

struct StructureInfo {
    can_build: bool,
    cost: u64,
    density_gap: f64,
    tile: Option<TileRef>,
}

pub struct UnitPlanner {
    player: PlayerId,
}

impl UnitPlanner {
    pub fn new(player: PlayerId) -> Self {
        Self { player }
    }

    /// Starts at most one construction per call. Returns true when work was
    /// queued.
    pub fn handle_units(&self, game: &mut Game, rng: &mut GameRng) -> bool {
        let city = self.density_based_info(game, rng, UnitType::City);
        let port = self.density_based_info(game, rng, UnitType::Port);

        let chosen = match (city.can_build, port.can_build) {
            (true, true) => {
                if city.cost < port.cost {
                    Some((UnitType::City, city.tile))
                } else if port.cost < city.cost {
                    Some((UnitType::Port, port.tile))
                } else if city.density_gap > port.density_gap {
                    Some((UnitType::City, city.tile))
                } else {
                    Some((UnitType::Port, port.tile))
                }
            }
            (true, false) => Some((UnitType::City, city.tile)),
            (false, true) => Some((UnitType::Port, port.tile)),
            (false, false) => None,
        };

        if let Some((kind, Some(tile))) = chosen {
            game.add_execution(Box::new(ConstructionExecution::new(self.player, kind, tile)));
            return true;
        }

        self.maybe_spawn_structure(game, rng, UnitType::Airfield, 1)
            || self.maybe_spawn_warship(game, rng)
            || self.maybe_spawn_sam_launcher(game, rng)
            || self.maybe_spawn_structure(game, rng, UnitType::MissileSilo, 1)
            || self.maybe_spawn_defense_post(game, rng)
    }

    fn density_based_info(
        &self,
        game: &Game,
        rng: &mut GameRng,
        kind: UnitType,
    ) -> StructureInfo {
        let tiles_owned = game.player(self.player).tiles_owned();
        let cost = game.config().unit_cost(kind);
        if tiles_owned == 0 {
            return StructureInfo {
                can_build: false,
                cost,
                density_gap: 0.0,
                tile: None,
            };
        }
        let threshold = match kind {
            UnitType::City => CITY_DENSITY_PER_TILE,
            _ => PORT_DENSITY_PER_TILE,
        };
        let current = game.unit_count(self.player, kind) as f64 / tiles_owned as f64;
        let density_gap = (threshold - current) / threshold;

        if current < threshold && game.player(self.player).gold >= cost {
            if let Some(tile) = self.structure_spawn_tile(game, rng, kind) {
                if game.can_build(self.player, kind, tile).is_some() {
                    return StructureInfo {
                        can_build: true,
                        cost,
                        density_gap,
                        tile: Some(tile),
                    };
                }
            }
        }
        StructureInfo {
            can_build: false,
            cost,
            density_gap,
            tile: None,
        }
    }

    fn structure_spawn_tile(
        &self,
        game: &Game,
        rng: &mut GameRng,
        kind: UnitType,
    ) -> Option<TileRef> {
        let map = game.map();
        let mut tiles: Vec<TileRef> = game
            .player(self.player)
            .owned_tiles
            .iter()
            .copied()
            .collect();

        if kind == UnitType::Port {
            tiles.retain(|&t| map.is_ocean_shore(t));
        }

        // Spread the big buildings out; point defense can cluster.
        if !matches!(
            kind,
            UnitType::DefensePost | UnitType::SamLauncher | UnitType::MissileSilo
        ) {
            let existing: Vec<TileRef> = game
                .units()
                .filter(|u| {
                    u.owner == self.player
                        && u.kind.is_structure()
                        && !matches!(u.kind, UnitType::DefensePost | UnitType::SamLauncher)
                })
                .map(|u| u.tile)
                .collect();
            tiles.retain(|&tile| {
                existing
                    .iter()
                    .all(|&b| map.euclidean_dist_squared(tile, b) >= MIN_BUILDING_DISTANCE_SQUARED)
            });
        }

        rng.pick(&tiles).copied()
    }

    fn maybe_spawn_structure(
        &self,
        game: &mut Game,
        rng: &mut GameRng,
        kind: UnitType,
        max_count: usize,
    ) -> bool {
        if game.unit_count(self.player, kind) >= max_count {
            return false;
        }
        if game.player(self.player).gold < game.config().unit_cost(kind) {
            return false;
        }
        let Some(tile) = self.structure_spawn_tile(game, rng, kind) else {
            return false;
        };
        if game.can_build(self.player, kind, tile).is_none() {
            return false;
        }
        game.add_execution(Box::new(ConstructionExecution::new(self.player, kind, tile)));
        true
    }

    fn maybe_spawn_warship(&self, game: &mut Game, rng: &mut GameRng) -> bool {
        if !rng.chance(50) {
            return false;
        }
        let ports = game.units_of_type(self.player, UnitType::Port);
        let ships = game.unit_count(self.player, UnitType::Warship);
        if ports.is_empty()
            || ships > 0
            || game.player(self.player).gold <= game.config().unit_cost(UnitType::Warship)
        {
            return false;
        }
        let Some(&port) = rng.pick(&ports) else {
            return false;
        };
        let port_tile = game.unit(port).tile;
        let Some(tile) = self.warship_spawn_tile(game, rng, port_tile) else {
            return false;
        };
        if game.can_build(self.player, UnitType::Warship, tile).is_none() {
            return false;
        }
        game.add_execution(Box::new(ConstructionExecution::new(
            self.player,
            UnitType::Warship,
            tile,
        )));
        true
    }

    fn warship_spawn_tile(
        &self,
        game: &Game,
        rng: &mut GameRng,
        port_tile: TileRef,
    ) -> Option<TileRef> {
        let map = game.map();
        let px = i64::from(map.x(port_tile));
        let py = i64::from(map.y(port_tile));
        for _ in 0..50 {
            let x = rng.next_int(px - WARSHIP_SPAWN_RADIUS, px + WARSHIP_SPAWN_RADIUS);
            let y = rng.next_int(py - WARSHIP_SPAWN_RADIUS, py + WARSHIP_SPAWN_RADIUS);
            if !map.is_valid_coord(x, y) {
                continue;
            }
            let tile = map.tile(x as u32, y as u32);
            if map.is_ocean(tile) {
                return Some(tile);
            }
        }
        None
    }

    /// One SAM per uncovered silo or airfield, nearest uncovered asset first.
    fn maybe_spawn_sam_launcher(&self, game: &mut Game, rng: &mut GameRng) -> bool {
        if game.player(self.player).gold < game.config().unit_cost(UnitType::SamLauncher) {
            return false;
        }
        let sams: Vec<UnitId> = game.units_of_type(self.player, UnitType::SamLauncher);
        let mut assets = game.units_of_type(self.player, UnitType::MissileSilo);
        assets.extend(game.units_of_type(self.player, UnitType::Airfield));

        for asset in assets {
            let asset_tile = game.unit(asset).tile;
            let covered = sams.iter().any(|&s| {
                game.map().euclidean_dist_squared(asset_tile, game.unit(s).tile)
                    <= SAM_COVERAGE_RADIUS_SQUARED
            });
            if covered {
                continue;
            }
            let candidates: Vec<TileRef> = game
                .player(self.player)
                .owned_tiles
                .iter()
                .copied()
                .filter(|&t| {
                    game.map().euclidean_dist_squared(t, asset_tile)
                        <= SAM_COVERAGE_RADIUS_SQUARED
                })
                .collect();
            let Some(&tile) = rng.pick(&candidates) else {
                continue;
            };
            if game.can_build(self.player, UnitType::SamLauncher, tile).is_none() {
                continue;
            }
            game.add_execution(Box::new(ConstructionExecution::new(
                self.player,
                UnitType::SamLauncher,
                tile,
            )));
            return true;
        }
        false
    }

    fn maybe_spawn_defense_post(&self, game: &mut Game, rng: &mut GameRng) -> bool {
        let frontline: Vec<TileRef> = game
            .player(self.player)
            .border_tiles
            .iter()
            .copied()
            .filter(|&t| self.touches_enemy_land(game, t))
            .collect();
        if frontline.is_empty() {
            return false;
        }

        let current_density =
            game.unit_count(self.player, UnitType::DefensePost) as f64 / frontline.len() as f64;
        let cost = game.config().unit_cost(UnitType::DefensePost);
        if current_density >= DEFENSE_POST_DENSITY_PER_BORDER_TILE
            || game.player(self.player).gold < cost
        {
            return false;
        }

        let Some(tile) = self.defense_post_tile(game, rng, &frontline) else {
            return false;
        };
        if game.can_build(self.player, UnitType::DefensePost, tile).is_none() {
            return false;
        }
        game.add_execution(Box::new(ConstructionExecution::new(
            self.player,
            UnitType::DefensePost,
            tile,
        )));
        true
    }

    fn touches_enemy_land(&self, game: &Game, tile: TileRef) -> bool {
        game.map().neighbors8(tile).into_iter().any(|n| {
            game.map().is_land(n) && game.owner_of(n) != Some(self.player)
        })
    }

    fn defense_post_tile(
        &self,
        game: &Game,
        rng: &mut GameRng,
        frontline: &[TileRef],
    ) -> Option<TileRef> {
        let owned: Vec<TileRef> = game
            .player(self.player)
            .owned_tiles
            .iter()
            .copied()
            .collect();
        if owned.is_empty() {
            return None;
        }
        let posts: Vec<TileRef> = game
            .units_of_type(self.player, UnitType::DefensePost)
            .into_iter()
            .map(|id| game.unit(id).tile)
            .collect();

        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let &tile = rng.pick(&owned)?;
            let near_front = frontline.iter().any(|&b| {
                game.map().euclidean_dist_squared(tile, b) <= MAX_DISTANCE_FROM_BORDER_SQUARED
            });
            if !near_front {
                continue;
            }
            let overlaps = posts.iter().any(|&p| {
                game.map().euclidean_dist_squared(tile, p)
                    <= MIN_DISTANCE_BETWEEN_DEFENSE_POSTS_SQUARED
            });
            if overlaps {
                continue;
            }
            return Some(tile);
        }
        None
    }
}
