//! Troop transport by sea.

use tracing::warn;

use crate::execution::{AttackExecution, Execution};
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitSpec, UnitType};
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::pathfinding::{MoveDomain, PathStep, SurfacePathFinder};

/// Carries troops from the sender's coast to a hostile or unclaimed shore
/// and opens a land attack from the beachhead. Troops leave the pool at
/// embarkation and are lost with the ship if it is sunk.
pub struct TransportShipExecution {
    owner: PlayerId,
    /// `None` lands on Terra Nullius.
    target: Option<PlayerId>,
    destination_shore: TileRef,
    troops: f64,
    ship: Option<UnitId>,
    sail_target: Option<TileRef>,
    active: bool,
}

impl TransportShipExecution {
    pub fn new(
        owner: PlayerId,
        target: Option<PlayerId>,
        destination_shore: TileRef,
        troops: f64,
    ) -> Self {
        Self {
            owner,
            target,
            destination_shore,
            troops,
            ship: None,
            sail_target: None,
            active: true,
        }
    }

    /// Ocean tile adjacent to the sender's shore border nearest the target.
    fn launch_tile(&self, game: &Game) -> Option<TileRef> {
        let map = game.map();
        let shore_borders: Vec<TileRef> = game
            .player(self.owner)
            .border_tiles
            .iter()
            .copied()
            .filter(|&t| map.is_ocean_shore(t))
            .collect();
        let closest = shore_borders.into_iter().min_by_key(|&t| {
            (map.euclidean_dist_squared(t, self.destination_shore), t)
        })?;
        map.neighbors4(closest).into_iter().find(|&n| map.is_ocean(n))
    }

    fn disembark(&mut self, game: &mut Game, ship: UnitId) {
        game.delete_unit(ship, None);
        self.active = false;

        let holder = game.owner_of(self.destination_shore);
        if holder == Some(self.owner) || holder.map_or(false, |h| game.are_allied(h, self.owner)) {
            // Shore changed hands to a friend mid-voyage; just come ashore.
            game.add_troops(self.owner, self.troops);
            return;
        }
        game.conquer(self.owner, self.destination_shore);
        game.add_execution(Box::new(AttackExecution::with_carried_troops(
            self.owner,
            self.target,
            self.troops,
        )));
    }
}

impl Execution for TransportShipExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        if !game.map().is_land(self.destination_shore) {
            warn!(player = self.owner.raw(), "transport destination is not a shore");
            self.active = false;
            return;
        }
        self.troops = game.remove_troops(self.owner, self.troops);
        if self.troops < 1.0 {
            warn!(player = self.owner.raw(), "transport without troops ignored");
            self.active = false;
            return;
        }
        self.sail_target = game
            .map()
            .neighbors4(self.destination_shore)
            .into_iter()
            .find(|&n| game.map().is_ocean(n));
        if self.sail_target.is_none() {
            warn!(player = self.owner.raw(), "transport destination has no sea access");
            game.add_troops(self.owner, self.troops);
            self.active = false;
        }
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let ship = match self.ship {
            Some(id) => id,
            None => {
                let Some(launch) = self.launch_tile(game) else {
                    warn!(player = self.owner.raw(), "no coastline to launch from");
                    game.add_troops(self.owner, self.troops);
                    self.active = false;
                    return;
                };
                match game.can_build(self.owner, UnitType::TransportShip, launch) {
                    Some(spawn) => {
                        let id = game.build_unit(
                            self.owner,
                            UnitType::TransportShip,
                            spawn,
                            UnitSpec {
                                target_tile: Some(self.destination_shore),
                                ..UnitSpec::default()
                            },
                        );
                        self.ship = Some(id);
                        id
                    }
                    None => {
                        game.add_troops(self.owner, self.troops);
                        self.active = false;
                        return;
                    }
                }
            }
        };

        if !game.unit(ship).active {
            // Sunk with all hands.
            self.active = false;
            return;
        }

        let sail_target = self.sail_target.expect("validated during init");
        let speed = game.config().transport_speed;
        let step = SurfacePathFinder::new(game.map(), MoveDomain::Water).next_tile(
            game.unit(ship).tile,
            sail_target,
            speed,
        );
        match step {
            PathStep::Arrived => self.disembark(game, ship),
            PathStep::Next(tile) => game.move_unit(ship, tile),
            PathStep::Blocked => {
                warn!(player = self.owner.raw(), "transport route blocked");
                game.add_troops(self.owner, self.troops);
                game.delete_unit(ship, None);
                self.active = false;
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
