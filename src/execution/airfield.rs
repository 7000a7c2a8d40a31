//! Airfields: the structure plus its flight dispatch.

use tracing::warn;

use crate::execution::{BomberExecution, CargoPlaneExecution, Execution};
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitSpec, UnitType};
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::rng::GameRng;

/// Structure types bombers prefer, most valuable first.
const BOMBER_PRIORITY: [UnitType; 8] = [
    UnitType::SamLauncher,
    UnitType::Airfield,
    UnitType::MissileSilo,
    UnitType::Port,
    UnitType::DefensePost,
    UnitType::City,
    UnitType::Academy,
    UnitType::Hospital,
];

/// Builds the airfield, then periodically dispatches cargo planes toward
/// trade partners and bombers toward the closest hostile structures. Checks
/// run on a per-airfield tick offset so many airfields spread their work
/// across the period instead of bursting on the same tick.
pub struct AirfieldExecution {
    player: PlayerId,
    tile: TileRef,
    airfield: Option<UnitId>,
    rng: Option<GameRng>,
    check_offset: u64,
    spawn_ticker: u64,
    active: bool,
}

impl AirfieldExecution {
    pub fn new(player: PlayerId, tile: TileRef) -> Self {
        Self {
            player,
            tile,
            airfield: None,
            rng: None,
            check_offset: 0,
            spawn_ticker: 0,
            active: true,
        }
    }

    fn maybe_send_cargo_plane(&mut self, game: &mut Game, airfield: UnitId) {
        let rng = self.rng.as_mut().expect("execution ticked before init");
        if !rng.chance(game.config().cargo_plane_spawn_chance) {
            return;
        }
        let destinations: Vec<UnitId> = game
            .units()
            .filter(|u| u.kind == UnitType::Airfield && u.id != airfield)
            .filter(|u| u.owner != self.player && game.can_trade(self.player, u.owner))
            .map(|u| u.id)
            .collect();
        if let Some(&destination) = rng.pick(&destinations) {
            game.add_execution(Box::new(CargoPlaneExecution::new(
                self.player,
                airfield,
                destination,
            )));
        }
    }

    fn pick_bomber_target(&self, game: &Game, airfield: UnitId) -> Option<TileRef> {
        let tile = game.unit(airfield).tile;
        let range = game.config().bomber_target_range;

        // One bomber per target tile across the whole force.
        let busy: Vec<TileRef> = game
            .units()
            .filter(|u| u.kind == UnitType::Bomber)
            .filter_map(|u| u.target_tile)
            .collect();

        let intent = game.player(self.player).bomber_intent;
        let nearby = game.nearby_units(tile, range, &BOMBER_PRIORITY);
        let hostile: Vec<(UnitId, u64)> = nearby
            .into_iter()
            .filter(|&(id, _)| {
                let unit = game.unit(id);
                unit.owner != self.player
                    && !game.are_allied(unit.owner, self.player)
                    && !busy.contains(&unit.tile)
            })
            .collect();
        if hostile.is_empty() {
            return None;
        }

        // A standing bomber order trumps the generic priority sweep.
        if let Some(intent) = intent {
            if let Some(&(unit, _)) = hostile.iter().find(|&&(id, _)| {
                let unit = game.unit(id);
                unit.owner == intent.target && unit.kind == intent.structure
            }) {
                return Some(game.unit(unit).tile);
            }
        }

        // Nearest player first, then structure priority within that player.
        let mut player_order: Vec<(PlayerId, u64)> = Vec::new();
        for &(id, dist) in &hostile {
            let owner = game.unit(id).owner;
            match player_order.iter_mut().find(|(p, _)| *p == owner) {
                Some((_, min_dist)) => *min_dist = (*min_dist).min(dist),
                None => player_order.push((owner, dist)),
            }
        }
        player_order.sort_by_key(|&(p, d)| (d, p));

        for (owner, _) in player_order {
            for kind in BOMBER_PRIORITY {
                let mut of_kind: Vec<(UnitId, u64)> = hostile
                    .iter()
                    .copied()
                    .filter(|&(id, _)| {
                        game.unit(id).owner == owner && game.unit(id).kind == kind
                    })
                    .collect();
                of_kind.sort_by_key(|&(id, d)| (d, id));
                if let Some(&(unit, _)) = of_kind.first() {
                    return Some(game.unit(unit).tile);
                }
            }
        }
        None
    }

    fn maybe_send_bomber(&mut self, game: &mut Game, airfield: UnitId) {
        self.spawn_ticker += 1;
        if self.spawn_ticker < game.config().bomber_spawn_interval {
            return;
        }
        self.spawn_ticker = 0;

        if let Some(target) = self.pick_bomber_target(game, airfield) {
            game.add_execution(Box::new(BomberExecution::new(self.player, airfield, target)));
        }
    }
}

impl Execution for AirfieldExecution {
    fn init(&mut self, game: &mut Game, tick: Tick) {
        self.rng = Some(GameRng::derive(game.seed(), tick ^ u64::from(self.tile)));
        self.check_offset = tick % game.config().airfield_check_period.max(1);
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        let airfield = match self.airfield {
            Some(id) => id,
            None => {
                let Some(spawn) = game.can_build(self.player, UnitType::Airfield, self.tile)
                else {
                    warn!(
                        player = self.player.raw(),
                        tile = self.tile,
                        "cannot build airfield"
                    );
                    self.active = false;
                    return;
                };
                let id =
                    game.build_unit(self.player, UnitType::Airfield, spawn, UnitSpec::default());
                self.airfield = Some(id);
                id
            }
        };

        if !game.unit(airfield).active {
            self.active = false;
            return;
        }
        let owner = game.unit(airfield).owner;
        if owner != self.player {
            self.player = owner;
        }

        if (tick + self.check_offset) % game.config().airfield_check_period.max(1) != 0 {
            return;
        }

        // Cap the bomber force at one per airfield in the world.
        let total_airfields = game
            .units()
            .filter(|u| u.kind == UnitType::Airfield)
            .count();
        let active_bombers = game.unit_count(self.player, UnitType::Bomber);
        if active_bombers >= total_airfields {
            return;
        }

        self.maybe_send_cargo_plane(game, airfield);
        self.maybe_send_bomber(game, airfield);
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
