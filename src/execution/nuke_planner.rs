//! Nuclear targeting for assistive AI players.

use std::collections::BTreeSet;

use crate::execution::NukeExecution;
use crate::game::player::{PlayerId, PlayerType};
use crate::game::unit::UnitType;
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::rng::GameRng;

const STRUCTURE_TARGETS: [UnitType; 6] = [
    UnitType::City,
    UnitType::DefensePost,
    UnitType::MissileSilo,
    UnitType::Port,
    UnitType::SamLauncher,
    UnitType::Airfield,
];

/// Manhattan depth a candidate must sit inside the target's territory, so
/// the blast cannot splash over our own border.
const TERRITORY_CLEARANCE: u32 = 8;
/// Damage-scoring radius around the candidate tile.
const SCORE_RADIUS: u32 = 25;
/// Radius within which SAM launchers discourage a launch.
const SAM_AVOIDANCE_RADIUS: u32 = 50;
const RANDOM_TARGET_SAMPLES: usize = 10;
const RECENT_TARGET_MAX_AGE: Tick = 500;
const RECENT_TARGET_PENALTY: f64 = 1_000_000.0;

pub struct NukePlanner {
    player: PlayerId,
    last_nukes_sent: Vec<(Tick, TileRef)>,
}

impl NukePlanner {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            last_nukes_sent: Vec::new(),
        }
    }

    pub fn maybe_send_nuke(&mut self, game: &mut Game, rng: &mut GameRng, other: PlayerId) {
        let silos = game.units_of_type(self.player, UnitType::MissileSilo);
        let sams = game.unit_count(self.player, UnitType::SamLauncher);
        let airfields = game.unit_count(self.player, UnitType::Airfield);

        // Do not go nuclear while our own strategic assets sit unprotected.
        if sams < silos.len() + airfields {
            return;
        }
        if silos.is_empty()
            || game.player(self.player).gold < game.config().unit_cost(UnitType::AtomBomb)
            || game.player(other).kind == PlayerType::Bot
            || game.are_allied(self.player, other)
        {
            return;
        }

        let structures: Vec<TileRef> = game
            .units()
            .filter(|u| u.owner == other && STRUCTURE_TARGETS.contains(&u.kind))
            .map(|u| u.tile)
            .collect();

        let mut candidates: BTreeSet<TileRef> = structures.iter().copied().collect();
        for _ in 0..RANDOM_TARGET_SAMPLES {
            if let Some(tile) = self.random_territory_tile(game, rng, other) {
                candidates.insert(tile);
            }
        }

        self.forget_old_nuke_events(game.tick());

        let silo_tiles: Vec<TileRef> = silos.iter().map(|&s| game.unit(s).tile).collect();
        let mut best: Option<(TileRef, f64)> = None;
        'candidates: for tile in candidates {
            // Require the blast zone to be deep inside the target's land.
            let map = game.map();
            let (cx, cy) = (i64::from(map.x(tile)), i64::from(map.y(tile)));
            let clearance = i64::from(TERRITORY_CLEARANCE);
            for dx in -clearance..=clearance {
                for dy in -(clearance - dx.abs())..=(clearance - dx.abs()) {
                    if !map.is_valid_coord(cx + dx, cy + dy) {
                        continue 'candidates;
                    }
                    let t = map.tile((cx + dx) as u32, (cy + dy) as u32);
                    if game.owner_of(t) != Some(other) {
                        continue 'candidates;
                    }
                }
            }
            if game.can_build(self.player, UnitType::AtomBomb, tile).is_none() {
                continue;
            }
            let value = self.tile_score(game, tile, &silo_tiles, other);
            if best.map_or(true, |(_, b)| value > b) {
                best = Some((tile, value));
            }
        }

        if let Some((tile, _)) = best {
            self.last_nukes_sent.push((game.tick(), tile));
            game.add_execution(Box::new(NukeExecution::new(
                self.player,
                UnitType::AtomBomb,
                tile,
            )));
        }
    }

    fn forget_old_nuke_events(&mut self, tick: Tick) {
        self.last_nukes_sent
            .retain(|&(sent, _)| sent + RECENT_TARGET_MAX_AGE >= tick);
    }

    fn tile_score(
        &self,
        game: &Game,
        tile: TileRef,
        silo_tiles: &[TileRef],
        other: PlayerId,
    ) -> f64 {
        let map = game.map();
        let score_radius_sq = u64::from(SCORE_RADIUS).pow(2);
        let sam_radius_sq = u64::from(SAM_AVOIDANCE_RADIUS).pow(2);

        // Expected damage from structures caught in the blast.
        let mut value: f64 = game
            .units()
            .filter(|u| u.owner == other && STRUCTURE_TARGETS.contains(&u.kind))
            .filter(|u| map.euclidean_dist_squared(tile, u.tile) <= score_radius_sq)
            .map(|u| match u.kind {
                UnitType::City => 25_000.0,
                UnitType::DefensePost => 5_000.0,
                UnitType::MissileSilo => 50_000.0,
                UnitType::Port => 10_000.0,
                UnitType::Airfield => 12_000.0,
                _ => 0.0,
            })
            .sum();

        // Steer clear of defended airspace.
        let sams_nearby = game
            .units()
            .filter(|u| u.owner == other && u.kind == UnitType::SamLauncher)
            .filter(|u| map.euclidean_dist_squared(tile, u.tile) <= sam_radius_sq)
            .count();
        value -= 50_000.0 * sams_nearby as f64;

        // Prefer targets close to a silo.
        if let Some(closest) = silo_tiles
            .iter()
            .map(|&s| map.euclidean_dist_squared(tile, s))
            .min()
        {
            value -= (closest as f64).sqrt() * 30.0;
        }

        // Do not re-strike recently hit ground.
        let recent_hits = self
            .last_nukes_sent
            .iter()
            .filter(|&&(_, t)| map.euclidean_dist_squared(tile, t) <= score_radius_sq)
            .count();
        value -= RECENT_TARGET_PENALTY * recent_hits as f64;

        value
    }

    fn random_territory_tile(
        &self,
        game: &Game,
        rng: &mut GameRng,
        other: PlayerId,
    ) -> Option<TileRef> {
        let map = game.map();
        let borders = &game.player(other).border_tiles;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (u32::MAX, u32::MAX, 0u32, 0u32);
        for &tile in borders {
            min_x = min_x.min(map.x(tile));
            min_y = min_y.min(map.y(tile));
            max_x = max_x.max(map.x(tile));
            max_y = max_y.max(map.y(tile));
        }
        if min_x > max_x {
            return None;
        }
        for _ in 0..20 {
            let x = rng.next_int(i64::from(min_x), i64::from(max_x) + 1);
            let y = rng.next_int(i64::from(min_y), i64::from(max_y) + 1);
            if !map.is_valid_coord(x, y) {
                continue;
            }
            let tile = map.tile(x as u32, y as u32);
            if game.owner_of(tile) == Some(other) {
                return Some(tile);
            }
        }
        None
    }
}
