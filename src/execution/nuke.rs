//! Warhead flights.

use tracing::warn;

use crate::execution::Execution;
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitSpec, UnitType};
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::pathfinding::{AirPathFinder, PathStep};

/// Launches a warhead from the owner's silo and detonates it over the target
/// tile. SAM coverage may delete the unit mid-flight, which simply retires
/// the task; MIRV warheads are not interceptable at all.
pub struct NukeExecution {
    owner: PlayerId,
    kind: UnitType,
    target_tile: TileRef,
    warhead: Option<UnitId>,
    active: bool,
}

impl NukeExecution {
    pub fn new(owner: PlayerId, kind: UnitType, target_tile: TileRef) -> Self {
        Self {
            owner,
            kind,
            target_tile,
            warhead: None,
            active: true,
        }
    }
}

impl Execution for NukeExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        if !self.kind.is_warhead() {
            warn!(kind = ?self.kind, "nuke intent for a non-warhead unit ignored");
            self.active = false;
            return;
        }
        if !game.map().in_bounds(self.target_tile) {
            warn!(player = self.owner.raw(), "nuke target outside the map");
            self.active = false;
        }
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let warhead = match self.warhead {
            Some(id) => id,
            None => {
                let Some(silo_tile) = game.can_build(self.owner, self.kind, self.target_tile)
                else {
                    warn!(
                        player = self.owner.raw(),
                        kind = ?self.kind,
                        "cannot launch warhead"
                    );
                    self.active = false;
                    return;
                };
                let id = game.build_unit(
                    self.owner,
                    self.kind,
                    silo_tile,
                    UnitSpec {
                        target_tile: Some(self.target_tile),
                        ..UnitSpec::default()
                    },
                );
                self.warhead = Some(id);
                id
            }
        };

        if !game.unit(warhead).active {
            // Intercepted on the way in.
            self.active = false;
            return;
        }

        let speed = game.config().warhead_speed(self.kind);
        for _ in 0..speed {
            let from = game.unit(warhead).tile;
            match AirPathFinder::new(game.map()).next_tile(from, self.target_tile, 1) {
                PathStep::Arrived => {
                    game.delete_unit(warhead, None);
                    game.detonate_warhead(self.target_tile, self.kind, self.owner);
                    self.active = false;
                    return;
                }
                PathStep::Next(tile) => game.move_unit(warhead, tile),
                PathStep::Blocked => unreachable!("air paths are never blocked"),
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
