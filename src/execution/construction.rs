//! Structure construction.
//!
//! `ConstructionExecution` reserves the build cost, places a construction
//! placeholder, and after the build duration hands off to the structure's
//! own long-lived execution. `StructureExecution` is that long-lived task
//! for plain buildings: it stays active until the building is destroyed,
//! absorbing ownership swaps when the ground underneath is conquered.

use tracing::warn;

use crate::execution::{
    AirfieldExecution, Execution, SamLauncherExecution, WarshipExecution,
};
use crate::game::player::PlayerId;
use crate::game::unit::{UnitId, UnitSpec, UnitType};
use crate::game::{Game, Tick};
use crate::map::TileRef;

pub struct StructureExecution {
    player: PlayerId,
    kind: UnitType,
    tile: TileRef,
    structure: Option<UnitId>,
    active: bool,
}

impl StructureExecution {
    pub fn new(player: PlayerId, kind: UnitType, tile: TileRef) -> Self {
        debug_assert!(kind.is_structure());
        Self {
            player,
            kind,
            tile,
            structure: None,
            active: true,
        }
    }
}

impl Execution for StructureExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        if !game.has_player(self.player) {
            warn!(player = self.player.raw(), "structure owner not found");
            self.active = false;
        }
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let structure = match self.structure {
            Some(id) => id,
            None => {
                let Some(spawn) = game.can_build(self.player, self.kind, self.tile) else {
                    warn!(
                        player = self.player.raw(),
                        kind = ?self.kind,
                        tile = self.tile,
                        "cannot build structure"
                    );
                    self.active = false;
                    return;
                };
                let id = game.build_unit(self.player, self.kind, spawn, UnitSpec::default());
                self.structure = Some(id);
                id
            }
        };

        if !game.unit(structure).active {
            self.active = false;
            return;
        }
        // Recapture swaps the owner; the task follows the building.
        let owner = game.unit(structure).owner;
        if owner != self.player {
            self.player = owner;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

pub struct ConstructionExecution {
    player: PlayerId,
    kind: UnitType,
    tile: TileRef,
    placeholder: Option<UnitId>,
    reserved: u64,
    ticks_left: u64,
    active: bool,
}

impl ConstructionExecution {
    pub fn new(player: PlayerId, kind: UnitType, tile: TileRef) -> Self {
        Self {
            player,
            kind,
            tile,
            placeholder: None,
            reserved: 0,
            ticks_left: 0,
            active: true,
        }
    }

    fn completed_execution(&self) -> Box<dyn Execution> {
        match self.kind {
            UnitType::Airfield => Box::new(AirfieldExecution::new(self.player, self.tile)),
            UnitType::SamLauncher => Box::new(SamLauncherExecution::new(self.player, self.tile)),
            UnitType::Warship => Box::new(WarshipExecution::new(self.player, self.tile)),
            kind => Box::new(StructureExecution::new(self.player, kind, self.tile)),
        }
    }
}

impl Execution for ConstructionExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        let constructible = (self.kind.is_structure() && self.kind != UnitType::Construction)
            || self.kind == UnitType::Warship;
        if !constructible {
            warn!(kind = ?self.kind, "unit type cannot be constructed");
            self.active = false;
            return;
        }
        self.ticks_left = game.config().construction_duration;
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        let placeholder = match self.placeholder {
            Some(id) => id,
            None => {
                if game.can_build(self.player, self.kind, self.tile).is_none() {
                    warn!(
                        player = self.player.raw(),
                        kind = ?self.kind,
                        tile = self.tile,
                        "construction site invalid"
                    );
                    self.active = false;
                    return;
                }
                // Reserve the cost up front so the planner cannot promise the
                // same gold twice. Returned when the real structure is built.
                let cost = game.config().unit_cost(self.kind);
                let player = game.player_mut(self.player);
                player.gold = player.gold.saturating_sub(cost);
                self.reserved = cost;
                let id = game.build_unit(
                    self.player,
                    UnitType::Construction,
                    self.tile,
                    UnitSpec::default(),
                );
                self.placeholder = Some(id);
                id
            }
        };

        let still_standing = game.unit(placeholder).active;
        let still_ours = game.unit(placeholder).owner == self.player;
        if !still_standing || !still_ours {
            // Destroyed or captured mid-build: the investment is lost.
            if still_standing {
                game.delete_unit(placeholder, None);
            }
            self.active = false;
            return;
        }

        if self.ticks_left > 0 {
            self.ticks_left -= 1;
            return;
        }

        game.delete_unit(placeholder, None);
        game.add_gold(self.player, self.reserved);
        game.add_execution(self.completed_execution());
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
