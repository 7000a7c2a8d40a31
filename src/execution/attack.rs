//! Land attacks: frontier conquest against a player or unclaimed territory.

use std::collections::BTreeSet;

use tracing::warn;

use crate::execution::Execution;
use crate::game::player::PlayerId;
use crate::game::{AttackId, Game, Tick};
use crate::map::TileRef;

/// Carries troops against a neighboring front. Troops leave the sender when
/// the attack starts and either convert into territory, attrit against the
/// defender, or return home when no front remains. Frontier tiles are taken
/// in ascending tile order so replicas conquer identically.
pub struct AttackExecution {
    attacker: PlayerId,
    /// `None` attacks Terra Nullius.
    target: Option<PlayerId>,
    troops: f64,
    /// True when the troops were already removed from the pool (boat landing).
    carried: bool,
    record: Option<AttackId>,
    active: bool,
}

impl AttackExecution {
    pub fn new(attacker: PlayerId, target: Option<PlayerId>, troops: f64) -> Self {
        Self {
            attacker,
            target,
            troops,
            carried: false,
            record: None,
            active: true,
        }
    }

    /// Attack landed by a transport: troops were deducted at embarkation.
    pub fn with_carried_troops(attacker: PlayerId, target: Option<PlayerId>, troops: f64) -> Self {
        Self {
            carried: true,
            ..Self::new(attacker, target, troops)
        }
    }

    fn frontier(&self, game: &Game) -> Vec<TileRef> {
        let map = game.map();
        let mut frontier = BTreeSet::new();
        for &tile in &game.player(self.attacker).border_tiles {
            for neighbor in map.neighbors4(tile) {
                if !map.is_land(neighbor) {
                    continue;
                }
                if game.owner_of(neighbor) == self.target {
                    frontier.insert(neighbor);
                }
            }
        }
        frontier.into_iter().collect()
    }

    fn tile_cost(&self, game: &Game) -> f64 {
        let base = game.config().attack_tile_cost;
        match self.target {
            Some(target) => {
                let defender = game.player(target);
                let density = defender.troops / defender.tiles_owned().max(1) as f64;
                base + game.config().defense_density_weight * density
            }
            None => base,
        }
    }

    fn retire(&mut self, game: &mut Game, refund: bool) {
        if refund && self.troops > 0.0 {
            game.add_troops(self.attacker, self.troops);
        }
        if let Some(record) = self.record.take() {
            game.remove_attack(record);
        }
        self.active = false;
    }
}

impl Execution for AttackExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        if !game.player(self.attacker).is_alive() {
            self.active = false;
            return;
        }
        if self.target == Some(self.attacker) {
            warn!(attacker = self.attacker.raw(), "attack against self ignored");
            self.active = false;
            return;
        }
        if let Some(target) = self.target {
            if game.are_allied(self.attacker, target) {
                // Turning on an ally breaks the pact and brands the traitor.
                game.break_alliance(self.attacker, target);
            }
        }
        if !self.carried {
            self.troops = game.remove_troops(self.attacker, self.troops);
        }
        if self.troops < 1.0 {
            warn!(attacker = self.attacker.raw(), "attack without troops ignored");
            self.retire(game, true);
            return;
        }
        self.record = Some(game.register_attack(self.attacker, self.target, self.troops));
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        if !game.player(self.attacker).is_alive() {
            self.retire(game, false);
            return;
        }
        if let Some(target) = self.target {
            if !game.player(target).is_alive() {
                self.retire(game, true);
                return;
            }
        }

        let cost = self.tile_cost(game);
        let frontier = self.frontier(game);
        if frontier.is_empty() || self.troops < cost {
            self.retire(game, true);
            return;
        }

        let budget = game.config().tiles_conquered_per_tick;
        for tile in frontier.into_iter().take(budget as usize) {
            if self.troops < cost {
                break;
            }
            self.troops -= cost;
            if let Some(target) = self.target {
                game.remove_troops(target, cost * 0.5);
            }
            game.conquer(self.attacker, tile);
        }

        if let Some(record) = self.record {
            game.set_attack_troops(record, self.troops);
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
