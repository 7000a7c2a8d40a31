//! Surface-to-air defense: launcher scan and missile pursuit.

use tracing::{info, warn};

use crate::execution::Execution;
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitSpec, UnitType};
use crate::game::updates::GameUpdate;
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::pathfinding::{AirPathFinder, PathStep};

/// Air targets a SAM may engage. MIRV warheads are too fast to stop.
const INTERCEPTABLE: [UnitType; 5] = [
    UnitType::AtomBomb,
    UnitType::HydrogenBomb,
    UnitType::CargoPlane,
    UnitType::Bomber,
    UnitType::FighterJet,
];

/// The launcher structure: builds itself, then scans for hostile air traffic
/// and fires one interceptor per cooldown window.
pub struct SamLauncherExecution {
    player: PlayerId,
    tile: TileRef,
    launcher: Option<UnitId>,
    cooldown: u64,
    active: bool,
}

impl SamLauncherExecution {
    pub fn new(player: PlayerId, tile: TileRef) -> Self {
        Self {
            player,
            tile,
            launcher: None,
            cooldown: 0,
            active: true,
        }
    }

    fn pick_target(&self, game: &Game, launcher: UnitId) -> Option<UnitId> {
        let tile = game.unit(launcher).tile;
        let in_range = game.nearby_units(tile, game.config().sam_range, &INTERCEPTABLE);

        // One missile per target across all launchers.
        let busy: Vec<UnitId> = game
            .units()
            .filter(|u| u.kind == UnitType::SamMissile)
            .filter_map(|u| u.target_unit)
            .collect();

        let hostile = |target: UnitId| {
            let owner = game.unit(target).owner;
            owner != self.player && !game.are_allied(owner, self.player)
        };

        // Warheads before everything else, nearest first within each class.
        let mut best: Option<UnitId> = None;
        for &(candidate, _) in &in_range {
            if !hostile(candidate) || busy.contains(&candidate) {
                continue;
            }
            let is_warhead = game.unit(candidate).kind.is_warhead();
            match best {
                None => best = Some(candidate),
                Some(current) => {
                    if is_warhead && !game.unit(current).kind.is_warhead() {
                        best = Some(candidate);
                    }
                }
            }
        }
        best
    }
}

impl Execution for SamLauncherExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        if !game.has_player(self.player) {
            warn!(player = self.player.raw(), "sam launcher owner not found");
            self.active = false;
        }
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let launcher = match self.launcher {
            Some(id) => id,
            None => {
                let Some(spawn) = game.can_build(self.player, UnitType::SamLauncher, self.tile)
                else {
                    warn!(player = self.player.raw(), tile = self.tile, "cannot build sam launcher");
                    self.active = false;
                    return;
                };
                let id =
                    game.build_unit(self.player, UnitType::SamLauncher, spawn, UnitSpec::default());
                self.launcher = Some(id);
                id
            }
        };

        if !game.unit(launcher).active {
            self.active = false;
            return;
        }
        let owner = game.unit(launcher).owner;
        if owner != self.player {
            self.player = owner;
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
            return;
        }

        if let Some(target) = self.pick_target(game, launcher) {
            let tile = game.unit(launcher).tile;
            game.add_execution(Box::new(SamMissileExecution::new(
                tile,
                self.player,
                launcher,
                target,
            )));
            self.cooldown = game.config().sam_cooldown;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// One interceptor chasing one designated target. Takes up to the configured
/// number of air steps per tick; destroys the target on contact or expires
/// harmlessly when the target stops being a valid kill.
pub struct SamMissileExecution {
    spawn_tile: TileRef,
    owner: PlayerId,
    owner_unit: UnitId,
    target: UnitId,
    missile: Option<UnitId>,
    active: bool,
}

impl SamMissileExecution {
    pub fn new(spawn_tile: TileRef, owner: PlayerId, owner_unit: UnitId, target: UnitId) -> Self {
        Self {
            spawn_tile,
            owner,
            owner_unit,
            target,
            missile: None,
            active: true,
        }
    }

    fn target_invalid(&self, game: &Game) -> bool {
        let target = game.unit(self.target);
        !target.active
            || target.owner == self.owner
            || game.are_allied(target.owner, self.owner)
            || !INTERCEPTABLE.contains(&target.kind)
    }
}

impl Execution for SamMissileExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let missile = match self.missile {
            Some(id) => id,
            None => {
                let id = game.build_unit(
                    self.owner,
                    UnitType::SamMissile,
                    self.spawn_tile,
                    UnitSpec {
                        target_unit: Some(self.target),
                        ..UnitSpec::default()
                    },
                );
                self.missile = Some(id);
                id
            }
        };

        if !game.unit(missile).active {
            self.active = false;
            return;
        }

        if self.target_invalid(game) || !game.unit(self.owner_unit).active {
            game.delete_unit(missile, None);
            self.active = false;
            return;
        }

        let speed = game.config().sam_missile_speed;
        for _ in 0..speed {
            let from = game.unit(missile).tile;
            let to = game.unit(self.target).tile;
            match AirPathFinder::new(game.map()).next_tile(from, to, 1) {
                PathStep::Arrived => {
                    let warhead = game.unit(self.target).kind;
                    if warhead.is_warhead() {
                        info!(
                            interceptor = self.owner.raw(),
                            warhead = ?warhead,
                            "warhead intercepted"
                        );
                        game.push_update(GameUpdate::WarheadIntercepted {
                            interceptor_owner: self.owner,
                            warhead_type: warhead,
                        });
                    }
                    game.delete_unit(self.target, Some(self.owner));
                    game.delete_unit(missile, None);
                    self.active = false;
                    return;
                }
                PathStep::Next(tile) => game.move_unit(missile, tile),
                PathStep::Blocked => unreachable!("air paths are never blocked"),
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
