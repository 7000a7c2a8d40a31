//! Warship patrol and interdiction.

use tracing::warn;

use crate::execution::{Execution, ShellExecution};
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitSpec, UnitType};
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::pathfinding::{MoveDomain, PathStep, SurfacePathFinder};
use crate::rng::GameRng;

const SEA_TARGETS: [UnitType; 2] = [UnitType::TransportShip, UnitType::Warship];
const PATROL_PICK_ATTEMPTS: u32 = 20;

/// Patrols the water around its home anchorage and shells hostile shipping,
/// transports first.
pub struct WarshipExecution {
    player: PlayerId,
    anchor: TileRef,
    ship: Option<UnitId>,
    rng: Option<GameRng>,
    active: bool,
}

impl WarshipExecution {
    pub fn new(player: PlayerId, anchor: TileRef) -> Self {
        Self {
            player,
            anchor,
            ship: None,
            rng: None,
            active: true,
        }
    }

    fn find_target(&self, game: &Game, ship: UnitId) -> Option<UnitId> {
        let tile = game.unit(ship).tile;
        let owner = game.unit(ship).owner;
        let range = game.config().warship_targeting_range;
        let candidates = game.nearby_units(tile, range, &SEA_TARGETS);
        let mut valid: Vec<(UnitId, u64)> = candidates
            .into_iter()
            .filter(|&(id, _)| {
                id != ship && {
                    let other = game.unit(id).owner;
                    other != owner && !game.are_allied(other, owner)
                }
            })
            .collect();
        let class = |kind: UnitType| match kind {
            UnitType::TransportShip => 0,
            _ => 1,
        };
        valid.sort_by_key(|&(id, dist)| (class(game.unit(id).kind), dist, id));
        valid.first().map(|&(id, _)| id)
    }

    fn random_patrol_tile(&mut self, game: &Game) -> Option<TileRef> {
        let map = game.map();
        let range = i64::from(game.config().warship_patrol_range);
        let ax = i64::from(map.x(self.anchor));
        let ay = i64::from(map.y(self.anchor));
        let rng = self.rng.as_mut().expect("execution ticked before init");
        for _ in 0..PATROL_PICK_ATTEMPTS {
            let x = rng.next_int(ax - range / 2, ax + range / 2);
            let y = rng.next_int(ay - range / 2, ay + range / 2);
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

    fn sail_toward(&mut self, game: &mut Game, ship: UnitId, destination: TileRef) {
        let speed = game.config().warship_speed;
        let step = SurfacePathFinder::new(game.map(), MoveDomain::Water).next_tile(
            game.unit(ship).tile,
            destination,
            speed,
        );
        match step {
            PathStep::Next(tile) => game.move_unit(ship, tile),
            PathStep::Arrived => {
                if game.unit(ship).target_tile == Some(destination) {
                    game.unit_mut(ship).target_tile = None;
                }
            }
            PathStep::Blocked => {
                game.unit_mut(ship).target_tile = None;
            }
        }
    }
}

impl Execution for WarshipExecution {
    fn init(&mut self, game: &mut Game, tick: Tick) {
        self.rng = Some(GameRng::derive(game.seed(), tick ^ u64::from(self.anchor)));
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let ship = match self.ship {
            Some(id) => id,
            None => {
                let Some(spawn) = game.can_build(self.player, UnitType::Warship, self.anchor)
                else {
                    warn!(player = self.player.raw(), tile = self.anchor, "cannot build warship");
                    self.active = false;
                    return;
                };
                let id = game.build_unit(self.player, UnitType::Warship, spawn, UnitSpec::default());
                self.ship = Some(id);
                id
            }
        };

        if !game.unit(ship).active {
            self.active = false;
            return;
        }
        if game.unit(ship).health <= 0.0 {
            game.delete_unit(ship, None);
            self.active = false;
            return;
        }

        match self.find_target(game, ship) {
            Some(target) => {
                let destination = game.unit(target).tile;
                self.sail_toward(game, ship, destination);
                if tick % game.config().warship_attack_rate.max(1) == 0 {
                    let from = game.unit(ship).tile;
                    game.add_execution(Box::new(ShellExecution::new(from, self.player, target)));
                }
            }
            None => {
                if game.unit(ship).target_tile.is_none() {
                    let patrol = self.random_patrol_tile(game);
                    game.unit_mut(ship).target_tile = patrol;
                }
                if let Some(destination) = game.unit(ship).target_tile {
                    self.sail_toward(game, ship, destination);
                }
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
