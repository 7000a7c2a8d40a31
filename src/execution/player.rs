//! Per-player growth and upkeep.

use crate::execution::Execution;
use crate::game::player::PlayerId;
use crate::game::unit::UnitType;
use crate::game::{Game, Tick};

/// Drives one nation's population, troop/worker split, and treasury, and
/// retires itself when the nation dies. Registered once per player at game
/// start and lives for the whole match.
pub struct PlayerExecution {
    player: PlayerId,
    active: bool,
}

impl PlayerExecution {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            active: true,
        }
    }
}

impl Execution for PlayerExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        if !game.player(self.player).is_alive() {
            self.active = false;
            return;
        }
        if !game.player(self.player).spawned {
            return;
        }

        let config = game.config();
        let hospitals = game.unit_count(self.player, UnitType::Hospital) as f64;
        let academies = game.unit_count(self.player, UnitType::Academy) as f64;
        let max_population = game.max_population(self.player);
        let growth_rate =
            config.population_growth_rate * (1.0 + config.hospital_growth_bonus * hospitals);
        let gold_per_worker = config.gold_per_worker;
        let academy_bonus = config.academy_productivity_bonus;

        let player = game.player_mut(self.player);
        let population = player.population();
        let headroom = (1.0 - population / max_population.max(1.0)).max(0.0);
        let grown = (population + growth_rate * population * headroom).min(max_population);

        // Troops drift toward the configured ratio rather than snapping, so
        // an attack leaves a visible dent for a while.
        let troops_target = grown * player.target_troop_ratio;
        player.troops += (troops_target - player.troops) * 0.1;
        player.troops = player.troops.clamp(0.0, grown);
        player.workers = grown - player.troops;

        let productivity = player.productivity * (1.0 + academy_bonus * academies);
        let income =
            player.workers * gold_per_worker * productivity * (0.5 + player.investment_rate);
        player.gold += income.max(0.0) as u64;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
