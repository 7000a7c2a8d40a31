//! Assistive "fake human" nations.
//!
//! The full AI treatment: self-placement during the spawn phase, structure
//! and nuclear planning, embargo bookkeeping, alliance handling, and enemy
//! pressure by land or by sea. Runs on the same randomized cadence as pure
//! bots but with the more conservative trigger/reserve band.

use std::collections::BTreeSet;

use tracing::warn;

use crate::execution::bot_behavior::BotBehavior;
use crate::execution::{Execution, NukePlanner, SpawnExecution, TransportShipExecution, UnitPlanner};
use crate::game::player::{PlayerId, Relation};
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::rng::GameRng;

const BOAT_MEMORY: usize = 8;
const BOAT_MIN_SPACING_SQUARED: u64 = 900;
const SHORE_SEARCH_TRIES: u32 = 50;

pub struct FakeHumanExecution {
    player: PlayerId,
    rng: Option<GameRng>,
    unit_planner: Option<UnitPlanner>,
    nuke_planner: Option<NukePlanner>,
    attack_rate: u64,
    attack_tick: u64,
    trigger_ratio: f64,
    reserve_ratio: f64,
    first_move: bool,
    has_set_investment_rate: bool,
    spawn_requested: bool,
    embargo_malus_applied: BTreeSet<PlayerId>,
    boat_destinations: Vec<TileRef>,
    active: bool,
}

impl FakeHumanExecution {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            rng: None,
            unit_planner: None,
            nuke_planner: None,
            attack_rate: 1,
            attack_tick: 0,
            trigger_ratio: 0.0,
            reserve_ratio: 0.0,
            first_move: true,
            has_set_investment_rate: false,
            spawn_requested: false,
            embargo_malus_applied: BTreeSet::new(),
            boat_destinations: Vec::new(),
            active: true,
        }
    }

    fn rng(&mut self) -> &mut GameRng {
        self.rng.as_mut().expect("execution ticked before init")
    }

    /// Embargoes against us sour our view of the embargoer, exactly once per
    /// embargo episode; lifting it restores the score.
    fn update_relations_from_embargoes(&mut self, game: &mut Game) {
        let malus = game.config().embargo_relation_malus;
        for other in game.player_ids() {
            if other == self.player {
                continue;
            }
            let embargoed = game.has_embargo(other, self.player);
            let applied = self.embargo_malus_applied.contains(&other);
            if embargoed && !applied {
                game.update_relation(self.player, other, -malus);
                self.embargo_malus_applied.insert(other);
            } else if !embargoed && applied {
                game.update_relation(self.player, other, malus);
                self.embargo_malus_applied.remove(&other);
            }
        }
    }

    /// Embargo hostile nations; do not relent until relations are neutral.
    fn handle_embargoes_to_hostile_nations(&mut self, game: &mut Game) {
        for other in game.player_ids() {
            if other == self.player {
                continue;
            }
            let relation = game.relation(self.player, other);
            if relation <= Relation::Hostile && !game.has_embargo(self.player, other) {
                game.add_embargo(self.player, other);
            } else if relation >= Relation::Neutral && game.has_embargo(self.player, other) {
                game.stop_embargo(self.player, other);
            }
        }
    }

    fn handle_terra_nullius(&mut self, game: &mut Game, behavior: &mut BotBehavior) {
        if game.shares_border_with_terra_nullius(self.player) {
            behavior.send_attack(game, None);
            return;
        }

        // No land border with open territory; probe for an empty shore to
        // boat to, sampling a handful of our coastline.
        let radius = behavior.enemy_search_radius;
        let sample_size = game.config().border_sample_size;
        let shore: Vec<TileRef> = game
            .player(self.player)
            .border_tiles
            .iter()
            .copied()
            .filter(|&t| game.map().is_ocean_shore(t))
            .collect();
        let shore_sample = self.rng().sample(&shore, sample_size);
        for tile in shore_sample {
            let Some(destination) = self.random_ocean_shore_tile(game, tile, radius) else {
                continue;
            };
            if game.owner_of(destination).is_some() {
                continue;
            }
            let troops = game.player(self.player).troops / 10.0;
            game.add_execution(Box::new(TransportShipExecution::new(
                self.player,
                None,
                destination,
                troops,
            )));
            return;
        }
    }

    fn handle_enemies(&mut self, game: &mut Game, behavior: &mut BotBehavior) {
        let mut rng = self.rng.take().expect("execution ticked before init");

        behavior.forget_old_enemies(game);
        behavior.assist_allies(game);
        let enemy = behavior
            .select_enemy(game, &mut rng)
            .or_else(|| behavior.neighbor_traitor_to_attack(game, &mut rng));

        if let Some(enemy) = enemy {
            if let Some(planner) = self.nuke_planner.as_mut() {
                planner.maybe_send_nuke(game, &mut rng, enemy);
            }
            if game.neighbor_players(self.player).contains(&enemy) {
                behavior.send_attack(game, Some(enemy));
            } else {
                self.maybe_send_boat_attack(game, enemy);
            }
        }

        self.rng = Some(rng);
    }

    fn maybe_send_boat_attack(&mut self, game: &mut Game, other: PlayerId) {
        if game.are_allied(self.player, other) {
            return;
        }
        let map = game.map();
        let ours: Vec<TileRef> = game
            .player(self.player)
            .border_tiles
            .iter()
            .copied()
            .filter(|&t| map.is_ocean_shore(t))
            .collect();
        let theirs: Vec<TileRef> = game
            .player(other)
            .border_tiles
            .iter()
            .copied()
            .filter(|&t| map.is_ocean_shore(t))
            .collect();

        let mut closest: Option<(TileRef, TileRef, u64)> = None;
        for &a in &ours {
            for &b in &theirs {
                let dist = map.euclidean_dist_squared(a, b);
                if closest.map_or(true, |(_, _, best)| dist < best) {
                    closest = Some((a, b, dist));
                }
            }
        }
        let Some((_, destination, _)) = closest else {
            return;
        };
        if self.too_close_to_existing_boat(game, destination) {
            return;
        }
        self.remember_boat_destination(destination);
        let troops = game.player(self.player).troops / 5.0;
        game.add_execution(Box::new(TransportShipExecution::new(
            self.player,
            Some(other),
            destination,
            troops,
        )));
    }

    fn too_close_to_existing_boat(&self, game: &Game, destination: TileRef) -> bool {
        self.boat_destinations.iter().any(|&previous| {
            game.map().euclidean_dist_squared(destination, previous) <= BOAT_MIN_SPACING_SQUARED
        })
    }

    fn remember_boat_destination(&mut self, destination: TileRef) {
        if self.boat_destinations.len() >= BOAT_MEMORY {
            self.boat_destinations.remove(0);
        }
        self.boat_destinations.push(destination);
    }

    /// Random ocean-shore tile near `tile` that is unclaimed or hostile.
    fn random_ocean_shore_tile(
        &mut self,
        game: &Game,
        tile: TileRef,
        dist: u32,
    ) -> Option<TileRef> {
        let map = game.map();
        let cx = i64::from(map.x(tile));
        let cy = i64::from(map.y(tile));
        let dist = i64::from(dist);
        let rng = self.rng.as_mut().expect("execution ticked before init");
        for _ in 0..SHORE_SEARCH_TRIES {
            let x = rng.next_int(cx - dist, cx + dist);
            let y = rng.next_int(cy - dist, cy + dist);
            if !map.is_valid_coord(x, y) {
                continue;
            }
            let candidate = map.tile(x as u32, y as u32);
            if !map.is_ocean_shore(candidate) {
                continue;
            }
            match game.owner_of(candidate) {
                None => return Some(candidate),
                Some(owner) if !game.are_allied(owner, self.player) => return Some(candidate),
                Some(_) => continue,
            }
        }
        None
    }
}

impl Execution for FakeHumanExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        let name = game.player(self.player).name.clone();
        let mut rng = GameRng::for_actor(game.seed(), &name);
        let config = game.config();
        self.attack_rate =
            (rng.next_int(config.bot_attack_rate_min, config.bot_attack_rate_max) as u64).max(1);
        self.attack_tick = rng.next_int(0, self.attack_rate as i64) as u64;
        self.trigger_ratio = rng.next_int(
            config.fake_human_trigger_ratio_min,
            config.fake_human_trigger_ratio_max,
        ) as f64
            / 100.0;
        self.reserve_ratio = rng.next_int(
            config.fake_human_reserve_ratio_min,
            config.fake_human_reserve_ratio_max,
        ) as f64
            / 100.0;
        self.rng = Some(rng);
    }

    fn tick(&mut self, game: &mut Game, tick: Tick) {
        if tick % self.attack_rate != self.attack_tick {
            return;
        }

        if game.in_spawn_phase() {
            if !game.player(self.player).spawned && !self.spawn_requested {
                self.spawn_requested = true;
                game.add_execution(Box::new(SpawnExecution::new(self.player, None)));
            }
            return;
        }

        if !game.player(self.player).spawned {
            warn!(player = self.player.raw(), "nation never spawned");
            self.active = false;
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
        if self.unit_planner.is_none() {
            self.unit_planner = Some(UnitPlanner::new(self.player));
        }
        if self.nuke_planner.is_none() {
            self.nuke_planner = Some(NukePlanner::new(self.player));
        }

        if self.first_move {
            self.first_move = false;
            behavior.send_attack(game, None);
            game.store_bot_behavior(self.player, behavior);
            return;
        }

        if game.player(self.player).troops > 100_000.0
            && game.player(self.player).target_troop_ratio > 0.7
        {
            game.player_mut(self.player).target_troop_ratio = 0.7;
        }
        if !self.has_set_investment_rate {
            game.player_mut(self.player).investment_rate = 0.1;
            self.has_set_investment_rate = true;
        }

        self.update_relations_from_embargoes(game);
        behavior.handle_alliance_requests(game);
        {
            let planner = self.unit_planner.take().expect("planner initialized");
            let rng = self.rng.as_mut().expect("execution ticked before init");
            planner.handle_units(game, rng);
            self.unit_planner = Some(planner);
        }
        self.handle_embargoes_to_hostile_nations(game);
        self.handle_terra_nullius(game, &mut behavior);
        self.handle_enemies(game, &mut behavior);
        game.store_bot_behavior(self.player, behavior);
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn active_during_spawn_phase(&self) -> bool {
        true
    }
}
