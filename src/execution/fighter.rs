//! Fighter jets: patrol, dogfight, and cargo capture.

use tracing::warn;

use crate::execution::Execution;
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitSpec, UnitType};
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::pathfinding::{AirPathFinder, PathStep};
use crate::rng::GameRng;

const AIR_TARGETS: [UnitType; 3] = [UnitType::Bomber, UnitType::FighterJet, UnitType::CargoPlane];
const DOGFIGHT_OFFSET_ATTEMPTS: u32 = 10;

/// Escort/combat air unit. Re-evaluates the nearest valid hostile or
/// capturable target every tick: enemy fighters first, then bombers over
/// cargo planes, then by distance. Patrols a box around its patrol tile when
/// nothing is in range.
pub struct FighterJetExecution {
    player: PlayerId,
    patrol_tile: TileRef,
    jet: Option<UnitId>,
    rng: Option<GameRng>,
    active: bool,
}

impl FighterJetExecution {
    pub fn new(player: PlayerId, patrol_tile: TileRef) -> Self {
        Self {
            player,
            patrol_tile,
            jet: None,
            rng: None,
            active: true,
        }
    }

    fn rng(&mut self) -> &mut GameRng {
        self.rng.as_mut().expect("execution ticked before init")
    }

    fn find_target(&self, game: &Game, jet: UnitId) -> Option<UnitId> {
        let owner = game.unit(jet).owner;
        let tile = game.unit(jet).tile;
        let has_airfield = game.unit_count(owner, UnitType::Airfield) > 0;
        let candidates = game.nearby_units(tile, game.config().fighter_targeting_range, &AIR_TARGETS);

        let mut valid: Vec<(UnitId, u64)> = Vec::new();
        for (candidate, dist) in candidates {
            if candidate == jet {
                continue;
            }
            let unit = game.unit(candidate);
            if unit.owner == owner || game.are_allied(unit.owner, owner) {
                continue;
            }
            if unit.kind == UnitType::CargoPlane {
                // Capture needs a runway to bring the prize home.
                if !has_airfield {
                    continue;
                }
                // Leave planes trading with us or our allies alone.
                if let Some(destination) = unit.target_unit {
                    let dest_owner = game.unit(destination).owner;
                    if dest_owner == owner || game.are_allied(dest_owner, owner) {
                        continue;
                    }
                }
            }
            valid.push((candidate, dist));
        }

        let class = |kind: UnitType| match kind {
            UnitType::FighterJet => 0,
            UnitType::Bomber => 1,
            _ => 2,
        };
        valid.sort_by_key(|&(id, dist)| (class(game.unit(id).kind), dist, id));
        valid.first().map(|&(id, _)| id)
    }

    /// Random orbit point near the target, outside the minimum dogfight ring.
    fn dogfight_tile(&mut self, game: &Game, target_tile: TileRef) -> TileRef {
        let map = game.map();
        let range = i64::from(game.config().fighter_dogfight_distance);
        let min_sq = u64::from(game.config().fighter_min_dogfight_distance).pow(2);
        let tx = i64::from(map.x(target_tile));
        let ty = i64::from(map.y(target_tile));
        for _ in 0..DOGFIGHT_OFFSET_ATTEMPTS {
            let x = tx + self.rng().next_int(-range / 2, range / 2);
            let y = ty + self.rng().next_int(-range / 2, range / 2);
            if !map.is_valid_coord(x, y) {
                continue;
            }
            let tile = map.tile(x as u32, y as u32);
            if tile == target_tile || map.euclidean_dist_squared(tile, target_tile) < min_sq {
                continue;
            }
            return tile;
        }
        target_tile
    }

    fn engage(&mut self, game: &mut Game, jet: UnitId, target: UnitId, tick: Tick) {
        let map_dist = game
            .map()
            .euclidean_dist_squared(game.unit(jet).tile, game.unit(target).tile);
        let reached_sq = u64::from(game.config().fighter_reached_distance).pow(2);
        let dogfight_sq = u64::from(game.config().fighter_dogfight_distance).pow(2);

        let target_tile = game.unit(target).tile;
        let destination = if map_dist <= dogfight_sq {
            self.dogfight_tile(game, target_tile)
        } else {
            target_tile
        };

        let speed = game.config().fighter_jet_speed;
        let step =
            AirPathFinder::new(game.map()).next_tile(game.unit(jet).tile, destination, speed);
        if let PathStep::Next(tile) = step {
            game.move_unit(jet, tile);
        }

        if map_dist <= reached_sq {
            // Point-blank pass; break off and re-acquire next tick.
            game.unit_mut(jet).target_unit = None;
            return;
        }

        if tick % game.config().fighter_attack_rate.max(1) == 0 {
            let from = game.unit(jet).tile;
            game.add_execution(Box::new(ShellExecution::new(from, self.player, target)));
        }
    }

    fn capture_cargo(&mut self, game: &mut Game, jet: UnitId, target: UnitId) {
        let dist = game
            .map()
            .euclidean_dist_squared(game.unit(jet).tile, game.unit(target).tile);
        let reached_sq = u64::from(game.config().fighter_reached_distance).pow(2);
        if dist <= reached_sq {
            let owner = game.unit(jet).owner;
            game.capture_unit(target, owner);
            game.unit_mut(jet).target_unit = None;
            return;
        }
        let speed = game.config().fighter_jet_speed;
        let step = AirPathFinder::new(game.map()).next_tile(
            game.unit(jet).tile,
            game.unit(target).tile,
            speed,
        );
        if let PathStep::Next(tile) = step {
            game.move_unit(jet, tile);
        }
    }

    fn patrol(&mut self, game: &mut Game, jet: UnitId) {
        if game.unit(jet).target_tile.is_none() {
            let map = game.map();
            let range = i64::from(game.config().fighter_patrol_range);
            let px = i64::from(map.x(self.patrol_tile));
            let py = i64::from(map.y(self.patrol_tile));
            let x = px + self.rng().next_int(-range / 2, range / 2);
            let y = py + self.rng().next_int(-range / 2, range / 2);
            if game.map().is_valid_coord(x, y) {
                let tile = game.map().tile(x as u32, y as u32);
                game.unit_mut(jet).target_tile = Some(tile);
            }
        }
        let Some(destination) = game.unit(jet).target_tile else {
            return;
        };
        let speed = game.config().fighter_jet_speed;
        let step =
            AirPathFinder::new(game.map()).next_tile(game.unit(jet).tile, destination, speed);
        match step {
            PathStep::Arrived => game.unit_mut(jet).target_tile = None,
            PathStep::Next(tile) => game.move_unit(jet, tile),
            PathStep::Blocked => unreachable!("air paths are never blocked"),
        }
    }
}

impl Execution for FighterJetExecution {
    fn init(&mut self, game: &mut Game, tick: Tick) {
        self.rng = Some(GameRng::derive(game.seed(), tick ^ u64::from(self.patrol_tile)));
        let Some(spawn) = game.can_build(self.player, UnitType::FighterJet, self.patrol_tile)
        else {
            warn!(player = self.player.raw(), "cannot build fighter jet");
            self.active = false;
            return;
        };
        let id = game.build_unit(
            self.player,
            UnitType::FighterJet,
            spawn,
            UnitSpec {
                patrol_tile: Some(self.patrol_tile),
                ..UnitSpec::default()
            },
        );
        self.jet = Some(id);
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let Some(jet) = self.jet else {
            self.active = false;
            return;
        };
        if !game.unit(jet).active {
            self.active = false;
            return;
        }
        if game.unit(jet).health <= 0.0 {
            game.delete_unit(jet, None);
            self.active = false;
            return;
        }

        // Friendly runways keep the airframe patched up.
        let owner = game.unit(jet).owner;
        if game.unit_count(owner, UnitType::Airfield) > 0 {
            let healing = game.config().fighter_healing_amount;
            game.modify_health(jet, healing);
        }

        let target = self.find_target(game, jet);
        game.unit_mut(jet).target_unit = target;

        match target {
            Some(t) if game.unit(t).kind == UnitType::CargoPlane => {
                self.capture_cargo(game, jet, t)
            }
            Some(t) => self.engage(game, jet, t, tick),
            None => self.patrol(game, jet),
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Repatrol intent: moves a fighter's patrol anchor. Applies during init and
/// never ticks.
pub struct MoveFighterJetExecution {
    player: PlayerId,
    unit: UnitId,
    position: TileRef,
}

impl MoveFighterJetExecution {
    pub fn new(player: PlayerId, unit: UnitId, position: TileRef) -> Self {
        Self {
            player,
            unit,
            position,
        }
    }
}

impl Execution for MoveFighterJetExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        let unit = game.unit(self.unit);
        if unit.kind != UnitType::FighterJet || unit.owner != self.player {
            warn!(player = self.player.raw(), "fighter jet not found");
            return;
        }
        if !unit.active {
            warn!(player = self.player.raw(), "fighter jet is not active");
            return;
        }
        let unit = game.unit_mut(self.unit);
        unit.patrol_tile = Some(self.position);
        unit.target_tile = None;
    }

    fn tick(&mut self, _game: &mut Game, _tick: Tick) {}

    fn is_active(&self) -> bool {
        false
    }
}

/// Unguided shell chasing one unit; damages it on contact.
pub struct ShellExecution {
    position: TileRef,
    owner: PlayerId,
    target: UnitId,
    active: bool,
}

impl ShellExecution {
    pub fn new(position: TileRef, owner: PlayerId, target: UnitId) -> Self {
        Self {
            position,
            owner,
            target,
            active: true,
        }
    }
}

impl Execution for ShellExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        if !game.unit(self.target).active {
            self.active = false;
            return;
        }
        let speed = game.config().shell_speed;
        for _ in 0..speed {
            let to = game.unit(self.target).tile;
            match AirPathFinder::new(game.map()).next_tile(self.position, to, 1) {
                PathStep::Arrived => {
                    let damage = game.config().shell_damage;
                    if game.modify_health(self.target, -damage) <= 0.0 {
                        game.delete_unit(self.target, Some(self.owner));
                    }
                    self.active = false;
                    return;
                }
                PathStep::Next(tile) => self.position = tile,
                PathStep::Blocked => unreachable!("air paths are never blocked"),
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_intent_is_single_shot() {
        let execution = MoveFighterJetExecution::new(PlayerId(0), UnitId(0), 5);
        assert!(!execution.is_active());
    }
}
