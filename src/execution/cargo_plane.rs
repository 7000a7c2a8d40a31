//! Cargo plane trade flights.

use tracing::{info, warn};

use crate::execution::Execution;
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitSpec, UnitType};
use crate::game::{Game, Tick};
use crate::pathfinding::{AirPathFinder, PathStep};

/// Flies between two airfields and pays both owners on arrival, scaled by
/// the distance actually flown. A plane captured mid-flight re-routes to the
/// captor's nearest airfield instead of terminating; the trade bonus is
/// forfeited.
pub struct CargoPlaneExecution {
    owner: PlayerId,
    source_airfield: UnitId,
    destination_airfield: UnitId,
    plane: Option<UnitId>,
    tiles_traveled: u64,
    captured: bool,
    active: bool,
}

impl CargoPlaneExecution {
    pub fn new(owner: PlayerId, source_airfield: UnitId, destination_airfield: UnitId) -> Self {
        Self {
            owner,
            source_airfield,
            destination_airfield,
            plane: None,
            tiles_traveled: 0,
            captured: false,
            active: true,
        }
    }

    fn complete(&mut self, game: &mut Game, plane: UnitId) {
        self.active = false;
        game.delete_unit(plane, None);
        if self.captured {
            return;
        }
        let gold = game.config().cargo_plane_gold(self.tiles_traveled);
        let source_owner = game.unit(self.source_airfield).owner;
        let dest_owner = game.unit(self.destination_airfield).owner;
        game.receive_gold(source_owner, gold);
        game.receive_gold(dest_owner, gold);
        info!(
            source = source_owner.raw(),
            destination = dest_owner.raw(),
            gold,
            "cargo trade completed"
        );
    }

    /// Re-route after capture: the plane now serves its captor.
    fn handle_capture(&mut self, game: &mut Game, plane: UnitId) -> bool {
        let new_owner = game.unit(plane).owner;
        self.captured = true;
        self.owner = new_owner;
        self.tiles_traveled = 0;

        let airfields = game.units_of_type(new_owner, UnitType::Airfield);
        let plane_tile = game.unit(plane).tile;
        let closest = airfields
            .into_iter()
            .min_by_key(|&a| {
                (
                    game.map().euclidean_dist_squared(plane_tile, game.unit(a).tile),
                    a,
                )
            });
        match closest {
            Some(airfield) => {
                self.destination_airfield = airfield;
                game.unit_mut(plane).target_unit = Some(airfield);
                info!(captor = new_owner.raw(), "cargo plane captured and redirected");
                true
            }
            None => {
                game.delete_unit(plane, None);
                self.active = false;
                false
            }
        }
    }
}

impl Execution for CargoPlaneExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let plane = match self.plane {
            Some(id) => id,
            None => {
                let home = game.unit(self.source_airfield).tile;
                let Some(spawn) = game.can_build(self.owner, UnitType::CargoPlane, home) else {
                    warn!(player = self.owner.raw(), "cargo plane cannot be built");
                    self.active = false;
                    return;
                };
                let id = game.build_unit(
                    self.owner,
                    UnitType::CargoPlane,
                    spawn,
                    UnitSpec {
                        target_unit: Some(self.destination_airfield),
                        ..UnitSpec::default()
                    },
                );
                self.plane = Some(id);
                id
            }
        };

        if !game.unit(plane).active {
            self.active = false;
            return;
        }

        if game.unit(plane).owner != self.owner && !self.handle_capture(game, plane) {
            return;
        }

        if !self.captured {
            let source_owner = game.unit(self.source_airfield).owner;
            let dest_owner = game.unit(self.destination_airfield).owner;
            // The route collapsed into a single nation, or trade relations
            // broke down mid-flight.
            if dest_owner == source_owner
                || !game.unit(self.destination_airfield).active
                || !game.can_trade(self.owner, dest_owner)
            {
                game.delete_unit(plane, None);
                self.active = false;
                return;
            }
        }

        let destination = game.unit(self.destination_airfield).tile;
        let speed = game.config().cargo_plane_speed;
        let step =
            AirPathFinder::new(game.map()).next_tile(game.unit(plane).tile, destination, speed);
        match step {
            PathStep::Arrived => self.complete(game, plane),
            PathStep::Next(tile) => {
                game.move_unit(plane, tile);
                self.tiles_traveled += 1;
            }
            PathStep::Blocked => unreachable!("air paths are never blocked"),
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
