//! Bomber strike flights.

use crate::execution::Execution;
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitSpec, UnitType};
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::pathfinding::{AirPathFinder, PathStep};

/// Flies from its airfield to the target, drops its payload on cadence, and
/// returns home. The drop ticker runs on the task's own counter, so bombers
/// launched on different ticks never synchronize their drops.
pub struct BomberExecution {
    owner: PlayerId,
    source_airfield: UnitId,
    target_tile: TileRef,
    bomber: Option<UnitId>,
    bombs_left: u32,
    drop_ticker: u32,
    returning: bool,
    active: bool,
}

impl BomberExecution {
    pub fn new(owner: PlayerId, source_airfield: UnitId, target_tile: TileRef) -> Self {
        Self {
            owner,
            source_airfield,
            target_tile,
            bomber: None,
            bombs_left: 0,
            drop_ticker: 0,
            returning: false,
            active: true,
        }
    }

    fn drop_bomb(&mut self, game: &mut Game, bomber: UnitId) {
        let tile = game.unit(bomber).tile;
        let radius = game.config().bomber_explosion_radius;
        game.bomber_explosion(tile, radius, self.owner);
        self.bombs_left = self.bombs_left.saturating_sub(1);
        if self.bombs_left == 0 {
            self.returning = true;
        }
    }
}

impl Execution for BomberExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        self.bombs_left = game.config().bomber_payload;
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let bomber = match self.bomber {
            Some(id) => id,
            None => {
                let home = game.unit(self.source_airfield).tile;
                let Some(spawn) = game.can_build(self.owner, UnitType::Bomber, home) else {
                    self.active = false;
                    return;
                };
                let id = game.build_unit(
                    self.owner,
                    UnitType::Bomber,
                    spawn,
                    UnitSpec {
                        target_tile: Some(self.target_tile),
                        ..UnitSpec::default()
                    },
                );
                self.bomber = Some(id);
                id
            }
        };

        if !game.unit(bomber).active {
            self.active = false;
            return;
        }

        if !self.returning && self.bombs_left > 0 {
            self.drop_ticker += 1;
            let over_target = game
                .map()
                .euclidean_dist_squared(game.unit(bomber).tile, self.target_tile)
                <= 1;
            if self.drop_ticker >= game.config().bomber_drop_cadence && over_target {
                self.drop_bomb(game, bomber);
                self.drop_ticker = 0;
                return;
            }
        }

        let destination = if self.returning {
            game.unit(self.source_airfield).tile
        } else {
            self.target_tile
        };

        let speed = game.config().bomber_speed;
        let step = AirPathFinder::new(game.map()).next_tile(game.unit(bomber).tile, destination, speed);
        match step {
            // Outbound arrival just holds position over the target; drops
            // stay gated on the cadence counter above.
            PathStep::Arrived => {
                if self.returning {
                    game.delete_unit(bomber, None);
                    self.active = false;
                }
            }
            PathStep::Next(tile) => game.move_unit(bomber, tile),
            PathStep::Blocked => unreachable!("air paths are never blocked"),
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
