//! Pure-bot players: simple expansion on a randomized cadence.

use crate::execution::bot_behavior::BotBehavior;
use crate::execution::Execution;
use crate::game::player::PlayerId;
use crate::game::{Game, Tick};
use crate::rng::GameRng;

pub struct BotExecution {
    player: PlayerId,
    rng: Option<GameRng>,
    attack_rate: u64,
    attack_tick: u64,
    trigger_ratio: f64,
    reserve_ratio: f64,
    neighbors_terra_nullius: bool,
    active: bool,
}

impl BotExecution {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            rng: None,
            attack_rate: 1,
            attack_tick: 0,
            trigger_ratio: 0.0,
            reserve_ratio: 0.0,
            neighbors_terra_nullius: true,
            active: true,
        }
    }

    fn maybe_attack(&mut self, game: &mut Game, behavior: &mut BotBehavior) {
        let rng = self.rng.as_mut().expect("execution ticked before init");

        if self.neighbors_terra_nullius {
            if game.shares_border_with_terra_nullius(self.player) {
                behavior.send_attack(game, None);
                return;
            }
            // Landlocked now; stop re-checking every cadence.
            self.neighbors_terra_nullius = false;
        }

        let neighbors = game.neighbor_players(self.player);
        if let Some(&target) = rng.pick(&neighbors) {
            behavior.send_attack(game, Some(target));
        }
    }
}

impl Execution for BotExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        let name = game.player(self.player).name.clone();
        let mut rng = GameRng::for_actor(game.seed(), &name);
        let config = game.config();
        self.attack_rate =
            (rng.next_int(config.bot_attack_rate_min, config.bot_attack_rate_max) as u64).max(1);
        self.attack_tick = rng.next_int(0, self.attack_rate as i64) as u64;
        self.trigger_ratio =
            rng.next_int(config.bot_trigger_ratio_min, config.bot_trigger_ratio_max) as f64 / 100.0;
        self.reserve_ratio =
            rng.next_int(config.bot_reserve_ratio_min, config.bot_reserve_ratio_max) as f64 / 100.0;
        self.rng = Some(rng);

        let player = game.player_mut(self.player);
        player.target_troop_ratio = 0.7;
        player.investment_rate = 0.0;
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        if tick % self.attack_rate != self.attack_tick {
            return;
        }
        if !game.player(self.player).is_alive() {
            self.active = false;
            return;
        }
        let mut behavior = match game.take_bot_behavior(self.player) {
            Some(behavior) => behavior,
            None => BotBehavior::new(game, self.player, self.trigger_ratio, self.reserve_ratio),
        };
        self.maybe_attack(game, &mut behavior);
        game.store_bot_behavior(self.player, behavior);
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
