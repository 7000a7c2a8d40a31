//! Shared decision state for autonomous players.
//!
//! One record per autonomous player, owned by that player's AI execution:
//! current enemy, staleness bookkeeping, an expanding border-sampled search
//! radius, and the trigger/reserve ratios that size attacks.

use crate::execution::AttackExecution;
use crate::game::player::{AllianceRequest, PlayerId, Relation};
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::rng::GameRng;

/// Alliance policy, applied strictly in order: hostility and treachery
/// reject first, overwhelming size accepts, overcommitment rejects,
/// everything else accepts.
pub fn should_accept_alliance_request(
    game: &Game,
    evaluator: PlayerId,
    request: &AllianceRequest,
) -> bool {
    let requestor = request.from;
    if game.player(evaluator).relation(requestor) < Relation::Neutral {
        return false;
    }
    if game.player(requestor).is_traitor() {
        return false;
    }
    if game.player(requestor).tiles_owned() >= game.player(evaluator).tiles_owned() * 3 {
        return true;
    }
    if game.player(requestor).alliances.len() >= 3 {
        return false;
    }
    true
}

pub struct BotBehavior {
    player: PlayerId,
    trigger_ratio: f64,
    reserve_ratio: f64,
    enemy: Option<PlayerId>,
    enemy_updated: Tick,
    pub enemy_search_radius: u32,
    first_attack_sent: bool,
}

impl BotBehavior {
    pub fn new(game: &Game, player: PlayerId, trigger_ratio: f64, reserve_ratio: f64) -> Self {
        Self {
            player,
            trigger_ratio,
            reserve_ratio,
            enemy: None,
            enemy_updated: 0,
            enemy_search_radius: game.config().enemy_search_radius,
            first_attack_sent: false,
        }
    }

    pub fn handle_alliance_requests(&mut self, game: &mut Game) {
        for request in game.alliance_requests_for(self.player) {
            let accept = should_accept_alliance_request(game, self.player, &request);
            game.resolve_alliance_request(request.from, request.to, accept);
        }
    }

    fn set_new_enemy(&mut self, game: &Game, enemy: PlayerId) {
        self.enemy_search_radius = game.config().enemy_search_radius;
        self.enemy = Some(enemy);
        self.enemy_updated = game.tick();
    }

    fn clear_enemy(&mut self) {
        self.enemy = None;
    }

    pub fn forget_old_enemies(&mut self, game: &Game) {
        if game.tick() - self.enemy_updated > game.config().stale_enemy_ticks {
            self.clear_enemy();
        }
    }

    fn has_sufficient_troops(&self, game: &Game) -> bool {
        let max_population = game.max_population(self.player);
        let ratio = game.player(self.player).population() / max_population.max(1.0);
        ratio >= self.trigger_ratio
    }

    /// Switch to whoever is landing the largest incoming attack.
    fn check_incoming_attacks(&mut self, game: &Game) {
        let mut largest = 0.0;
        let mut largest_attacker = None;
        for attack in game.incoming_attacks(self.player) {
            if attack.troops <= largest {
                continue;
            }
            largest = attack.troops;
            largest_attacker = Some(attack.attacker);
        }
        if let Some(attacker) = largest_attacker {
            self.set_new_enemy(game, attacker);
        }
    }

    pub fn neighbor_traitor_to_attack(&self, game: &Game, rng: &mut GameRng) -> Option<PlayerId> {
        let traitors: Vec<PlayerId> = game
            .neighbor_players(self.player)
            .into_iter()
            .filter(|&n| game.player(n).is_traitor())
            .collect();
        rng.pick(&traitors).copied()
    }

    /// Side with an ally under attack: adopt their aggressor as our enemy,
    /// at a relation cost for being dragged in.
    pub fn assist_allies(&mut self, game: &mut Game) {
        let allies: Vec<PlayerId> = game.player(self.player).alliances.iter().copied().collect();
        'outer: for ally in allies {
            if game.player(self.player).relation(ally) < Relation::Friendly {
                continue;
            }
            for target in game.attack_targets_of(ally) {
                if target == self.player {
                    continue;
                }
                if game.are_allied(self.player, target) {
                    continue;
                }
                let cost = game.config().assist_relation_cost;
                game.update_relation(self.player, ally, -cost);
                self.set_new_enemy(game, target);
                break 'outer;
            }
        }
    }

    pub fn select_enemy(&mut self, game: &mut Game, rng: &mut GameRng) -> Option<PlayerId> {
        if self.enemy.is_some() {
            return self.enemy_sanity_check(game);
        }
        if !self.has_sufficient_troops(game) {
            return None;
        }

        // 1. Lowest-density neighboring bot.
        let neighbor_bots: Vec<PlayerId> = game
            .neighbor_players(self.player)
            .into_iter()
            .filter(|&n| {
                game.player(n).kind == crate::game::player::PlayerType::Bot
                    && game.player(n).is_alive()
            })
            .collect();
        if !neighbor_bots.is_empty() {
            let density =
                |p: PlayerId| game.player(p).troops / game.player(p).tiles_owned().max(1) as f64;
            let mut best = None;
            let mut best_density = f64::INFINITY;
            for bot in neighbor_bots {
                let d = density(bot);
                if d < best_density {
                    best_density = d;
                    best = Some(bot);
                }
            }
            if let Some(bot) = best {
                self.set_new_enemy(game, bot);
                return self.enemy_sanity_check(game);
            }
        }

        // 2. Retaliation if under attack.
        self.check_incoming_attacks(game);
        if self.enemy.is_some() {
            return self.enemy_sanity_check(game);
        }

        // 3. Weakest sufficiently-close player, judged from sampled border
        // tiles so the cost stays bounded on any map size.
        let sample_size = game.config().border_sample_size;
        let our_borders: Vec<TileRef> =
            game.player(self.player).border_tiles.iter().copied().collect();
        let our_sample = rng.sample(&our_borders, sample_size);
        let radius_sq = u64::from(self.enemy_search_radius).pow(2);
        let direct_neighbors = game.neighbor_players(self.player);

        let mut weakest: Option<PlayerId> = None;
        let mut weakest_troops = f64::INFINITY;

        for candidate in game.player_ids() {
            if candidate == self.player {
                continue;
            }
            let other = game.player(candidate);
            if !other.is_alive() || !other.spawned {
                continue;
            }
            if game.are_allied(self.player, candidate) {
                continue;
            }

            // Direct neighbors count immediately.
            if direct_neighbors.contains(&candidate) {
                if other.troops < weakest_troops {
                    weakest = Some(candidate);
                    weakest_troops = other.troops;
                }
                continue;
            }

            let their_borders: Vec<TileRef> = other.border_tiles.iter().copied().collect();
            let their_sample = rng.sample(&their_borders, sample_size);
            if their_sample.is_empty() {
                continue;
            }

            let mut close_enough = false;
            'distance: for &theirs in &their_sample {
                for &ours in &our_sample {
                    if game.map().euclidean_dist_squared(ours, theirs) <= radius_sq {
                        close_enough = true;
                        break 'distance;
                    }
                }
            }

            if close_enough && other.troops < weakest_troops {
                weakest = Some(candidate);
                weakest_troops = other.troops;
            }
        }

        match weakest {
            Some(enemy) => self.set_new_enemy(game, enemy),
            None => {
                // Widen the net for the next evaluation.
                self.enemy_search_radius += game.config().enemy_search_radius_increment;
            }
        }

        self.enemy_sanity_check(game)
    }

    fn enemy_sanity_check(&mut self, game: &Game) -> Option<PlayerId> {
        if let Some(enemy) = self.enemy {
            if game.are_allied(self.player, enemy) || !game.player(enemy).is_alive() {
                self.clear_enemy();
            }
        }
        self.enemy
    }

    /// Sends an attack sized against the configured reserve. The first
    /// attack a player ever sends uses a flat fifth of current troops so an
    /// early game never stalls waiting for reserves.
    pub fn send_attack(&mut self, game: &mut Game, target: Option<PlayerId>) {
        if let Some(target) = target {
            if game.are_allied(self.player, target) {
                return;
            }
        }
        let player = game.player(self.player);
        let max_troops = game.max_population(self.player) * player.target_troop_ratio;
        let reserve = max_troops * self.reserve_ratio;
        let troops = if self.first_attack_sent {
            player.troops - reserve
        } else {
            player.troops / 5.0
        };
        if troops < 1.0 {
            return;
        }
        self.first_attack_sent = true;
        game.add_execution(Box::new(AttackExecution::new(self.player, target, troops)));
    }
}
