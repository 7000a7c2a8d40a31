//! Mutable shared world state.
//!
//! All higher layers route their mutations through the operations here
//! (`build_unit`, `conquer`, `modify_health`, `delete_unit`, relation and
//! diplomacy updates) so the invariants — one owner per active unit, border
//! sets consistent with tile ownership, monotonic eliminations — stay
//! enforceable in one place. Iteration surfaces are id-ordered so that two
//! replicas walking the same state take identical decisions.

pub mod player;
pub mod unit;
pub mod updates;

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::config::GameConfig;
use crate::execution::{BotBehavior, Execution};
use crate::map::{GameMap, TileRef};
use self::player::{AllianceRequest, Player, PlayerId, Relation, RELATION_MAX, RELATION_MIN};
use self::unit::{Unit, UnitId, UnitSpec, UnitType};
use self::updates::GameUpdate;

/// One discrete simulation step.
pub type Tick = u64;

const NO_OWNER: u16 = u16::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AttackId(pub u32);

/// Live land attack, visible to defenders through `incoming_attacks`.
#[derive(Debug, Clone, Copy)]
pub struct AttackRecord {
    pub id: AttackId,
    pub attacker: PlayerId,
    /// `None` targets unclaimed territory.
    pub target: Option<PlayerId>,
    pub troops: f64,
}

pub struct Game {
    map: GameMap,
    config: GameConfig,
    seed: u64,
    tick: Tick,
    spawn_phase_ticks: u64,
    players: Vec<Player>,
    units: Vec<Unit>,
    owners: Vec<u16>,
    attacks: Vec<AttackRecord>,
    next_attack_id: u32,
    alliance_requests: Vec<AllianceRequest>,
    /// One decision-state record per autonomous player, indexed by identity.
    /// AI executions check their record out for the duration of one tick.
    bot_behaviors: BTreeMap<PlayerId, BotBehavior>,
    pending_executions: Vec<Box<dyn Execution>>,
    updates: Vec<GameUpdate>,
}

impl Game {
    pub fn new(map: GameMap, config: GameConfig, spawn_phase_ticks: u64, seed: u64) -> Self {
        let tile_count = map.tile_count() as usize;
        Self {
            map,
            config,
            seed,
            tick: 0,
            spawn_phase_ticks,
            players: Vec::new(),
            units: Vec::new(),
            owners: vec![NO_OWNER; tile_count],
            attacks: Vec::new(),
            next_attack_id: 0,
            alliance_requests: Vec::new(),
            bot_behaviors: BTreeMap::new(),
            pending_executions: Vec::new(),
            updates: Vec::new(),
        }
    }

    // ---- time and identity ------------------------------------------------

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    pub fn in_spawn_phase(&self) -> bool {
        self.tick < self.spawn_phase_ticks
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    // ---- players ----------------------------------------------------------

    pub fn add_player(
        &mut self,
        name: impl Into<String>,
        kind: player::PlayerType,
        home_cell: TileRef,
    ) -> PlayerId {
        let id = PlayerId(self.players.len() as u16);
        self.players.push(Player::new(id, name.into(), kind, home_cell));
        id
    }

    pub fn has_player(&self, id: PlayerId) -> bool {
        (id.raw() as usize) < self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.raw() as usize]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.raw() as usize]
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        (0..self.players.len() as u16).map(PlayerId).collect()
    }

    pub fn max_population(&self, id: PlayerId) -> f64 {
        let player = self.player(id);
        let cities = self.unit_count(id, UnitType::City) as f64;
        self.config.base_max_population
            + self.config.max_population_per_tile * player.tiles_owned() as f64
            + self.config.city_population_bonus * cities
    }

    /// Claims a disk of unowned land around `tile` and funds the nation.
    /// Returns false when the tile is not claimable.
    pub fn spawn_player(&mut self, id: PlayerId, tile: TileRef) -> bool {
        if !self.map.in_bounds(tile) || !self.map.is_land(tile) || self.owner_of(tile).is_some() {
            return false;
        }
        if self.player(id).spawned {
            return false;
        }
        let radius = self.config.spawn_claim_radius;
        let radius_sq = u64::from(radius) * u64::from(radius);
        let mut claimed = Vec::new();
        for t in 0..self.map.tile_count() {
            if self.map.is_land(t)
                && self.owners[t as usize] == NO_OWNER
                && self.map.euclidean_dist_squared(tile, t) <= radius_sq
            {
                claimed.push(t);
            }
        }
        for t in claimed {
            self.conquer(id, t);
        }
        let troops = self.config.spawn_initial_troops;
        let workers = self.config.spawn_initial_workers;
        let gold = self.config.spawn_initial_gold;
        let player = self.player_mut(id);
        player.spawned = true;
        player.troops = troops;
        player.workers = workers;
        player.gold = gold;
        info!(player = %self.player(id).name, tile, "nation spawned");
        self.updates.push(GameUpdate::PlayerSpawned { player: id, tile });
        true
    }

    fn eliminate(&mut self, id: PlayerId) {
        let player = self.player_mut(id);
        if !player.alive {
            return;
        }
        player.alive = false;
        info!(player = %self.player(id).name, "nation eliminated");
        self.updates.push(GameUpdate::PlayerEliminated { player: id });
    }

    // ---- tile ownership ---------------------------------------------------

    pub fn owner_of(&self, tile: TileRef) -> Option<PlayerId> {
        let raw = self.owners[tile as usize];
        (raw != NO_OWNER).then(|| PlayerId(raw))
    }

    pub fn has_owner(&self, tile: TileRef) -> bool {
        self.owners[tile as usize] != NO_OWNER
    }

    /// Transfers one land tile to `player`, maintaining border sets and
    /// capturing any structure standing on it. Eliminates the previous owner
    /// when this was their last tile.
    pub fn conquer(&mut self, player: PlayerId, tile: TileRef) {
        debug_assert!(self.map.is_land(tile), "ocean tiles cannot be owned");
        let previous = self.owner_of(tile);
        if previous == Some(player) {
            return;
        }
        if let Some(prev) = previous {
            let prev_player = self.player_mut(prev);
            prev_player.owned_tiles.remove(&tile);
            prev_player.border_tiles.remove(&tile);
        }
        self.owners[tile as usize] = player.raw();
        self.player_mut(player).owned_tiles.insert(tile);

        self.refresh_border_membership(tile);
        for neighbor in self.map.neighbors4(tile) {
            self.refresh_border_membership(neighbor);
        }

        let captured: Vec<UnitId> = self
            .units
            .iter()
            .filter(|u| u.active && u.tile == tile && u.kind.is_structure() && u.owner != player)
            .map(|u| u.id)
            .collect();
        for unit in captured {
            self.capture_unit(unit, player);
        }

        self.updates.push(GameUpdate::OwnershipChanged {
            tile,
            previous_owner: previous,
            new_owner: Some(player),
        });

        if let Some(prev) = previous {
            if self.player(prev).spawned && self.player(prev).owned_tiles.is_empty() {
                self.eliminate(prev);
            }
        }
    }

    fn refresh_border_membership(&mut self, tile: TileRef) {
        let Some(owner) = self.owner_of(tile) else {
            return;
        };
        let is_border = self
            .map
            .neighbors4(tile)
            .iter()
            .any(|&n| self.owner_of(n) != Some(owner));
        let player = self.player_mut(owner);
        if is_border {
            player.border_tiles.insert(tile);
        } else {
            player.border_tiles.remove(&tile);
        }
    }

    /// Players owning land orthogonally adjacent to this player's border.
    pub fn neighbor_players(&self, id: PlayerId) -> Vec<PlayerId> {
        let mut found = BTreeSet::new();
        for &tile in &self.player(id).border_tiles {
            for neighbor in self.map.neighbors4(tile) {
                if let Some(other) = self.owner_of(neighbor) {
                    if other != id {
                        found.insert(other);
                    }
                }
            }
        }
        found.into_iter().collect()
    }

    pub fn shares_border_with_terra_nullius(&self, id: PlayerId) -> bool {
        self.player(id).border_tiles.iter().any(|&tile| {
            self.map
                .neighbors4(tile)
                .iter()
                .any(|&n| self.map.is_land(n) && !self.has_owner(n))
        })
    }

    // ---- units ------------------------------------------------------------

    /// Validates a build request and resolves the tile the unit would occupy.
    /// Checks ownership, terrain, and gold; deducts nothing.
    pub fn can_build(&self, id: PlayerId, kind: UnitType, tile: TileRef) -> Option<TileRef> {
        let player = self.player(id);
        if !player.alive || !player.spawned {
            return None;
        }
        if !self.map.in_bounds(tile) {
            return None;
        }
        if player.gold < self.config.unit_cost(kind) {
            return None;
        }
        match kind {
            UnitType::Port => {
                (self.owner_of(tile) == Some(id) && self.map.is_ocean_shore(tile)).then_some(tile)
            }
            k if k.is_structure() => {
                (self.owner_of(tile) == Some(id) && self.map.is_land(tile)).then_some(tile)
            }
            UnitType::Warship | UnitType::TransportShip => self.map.is_ocean(tile).then_some(tile),
            k if k.is_warhead() => self
                .units_of_type(id, UnitType::MissileSilo)
                .first()
                .map(|&silo| self.unit(silo).tile),
            UnitType::FighterJet => self
                .units_of_type(id, UnitType::Airfield)
                .first()
                .map(|&airfield| self.unit(airfield).tile),
            // Bombers, cargo planes, and interceptors launch from the tile of
            // the structure dispatching them.
            _ => Some(tile),
        }
    }

    /// Creates the unit and charges its cost. Callers must have validated
    /// the placement with `can_build`.
    pub fn build_unit(&mut self, id: PlayerId, kind: UnitType, tile: TileRef, spec: UnitSpec) -> UnitId {
        let cost = self.config.unit_cost(kind);
        let player = self.player_mut(id);
        player.gold = player.gold.saturating_sub(cost);
        let unit_id = UnitId(self.units.len() as u32);
        let max_health = self.config.unit_max_health(kind);
        self.units.push(Unit {
            id: unit_id,
            kind,
            owner: id,
            tile,
            health: max_health,
            max_health,
            active: true,
            target_tile: spec.target_tile,
            target_unit: spec.target_unit,
            patrol_tile: spec.patrol_tile,
        });
        self.updates.push(GameUpdate::UnitSpawned {
            unit: unit_id,
            unit_type: kind,
            owner: id,
            tile,
        });
        unit_id
    }

    pub fn has_unit(&self, id: UnitId) -> bool {
        (id.raw() as usize) < self.units.len()
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.raw() as usize]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        &mut self.units[id.raw() as usize]
    }

    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.active)
    }

    pub fn units_of(&self, owner: PlayerId) -> Vec<UnitId> {
        self.units()
            .filter(|u| u.owner == owner)
            .map(|u| u.id)
            .collect()
    }

    pub fn units_of_type(&self, owner: PlayerId, kind: UnitType) -> Vec<UnitId> {
        self.units()
            .filter(|u| u.owner == owner && u.kind == kind)
            .map(|u| u.id)
            .collect()
    }

    pub fn unit_count(&self, owner: PlayerId, kind: UnitType) -> usize {
        self.units()
            .filter(|u| u.owner == owner && u.kind == kind)
            .count()
    }

    pub fn units_on_tile(&self, tile: TileRef) -> Vec<UnitId> {
        self.units()
            .filter(|u| u.tile == tile)
            .map(|u| u.id)
            .collect()
    }

    /// Active units of the given kinds within `range` tiles, sorted by
    /// squared distance then id.
    pub fn nearby_units(&self, tile: TileRef, range: u32, kinds: &[UnitType]) -> Vec<(UnitId, u64)> {
        let range_sq = u64::from(range) * u64::from(range);
        let mut found: Vec<(UnitId, u64)> = self
            .units()
            .filter(|u| kinds.contains(&u.kind))
            .map(|u| (u.id, self.map.euclidean_dist_squared(tile, u.tile)))
            .filter(|&(_, d)| d <= range_sq)
            .collect();
        found.sort_by_key(|&(id, d)| (d, id));
        found
    }

    pub fn move_unit(&mut self, id: UnitId, tile: TileRef) {
        debug_assert!(self.map.in_bounds(tile));
        self.unit_mut(id).tile = tile;
        self.updates.push(GameUpdate::UnitMoved { unit: id, tile });
    }

    /// Adjusts health, clamped to `[0, max]`. Returns the new value; callers
    /// decide whether a drained unit is destroyed and by whom.
    pub fn modify_health(&mut self, id: UnitId, delta: f64) -> f64 {
        let unit = self.unit_mut(id);
        unit.health = (unit.health + delta).clamp(0.0, unit.max_health);
        unit.health
    }

    pub fn delete_unit(&mut self, id: UnitId, destroyer: Option<PlayerId>) {
        let unit = self.unit_mut(id);
        if !unit.active {
            return;
        }
        unit.active = false;
        let (kind, owner) = (unit.kind, unit.owner);
        self.updates.push(GameUpdate::UnitDestroyed {
            unit: id,
            unit_type: kind,
            owner,
            destroyer,
        });
    }

    pub fn capture_unit(&mut self, id: UnitId, new_owner: PlayerId) {
        let unit = self.unit_mut(id);
        let previous = unit.owner;
        if previous == new_owner {
            return;
        }
        unit.owner = new_owner;
        self.updates.push(GameUpdate::UnitCaptured {
            unit: id,
            previous_owner: previous,
            new_owner,
        });
    }

    // ---- troops and gold --------------------------------------------------

    pub fn add_troops(&mut self, id: PlayerId, amount: f64) {
        let player = self.player_mut(id);
        player.troops += amount.max(0.0);
    }

    /// Removes up to `amount` troops; returns what was actually removed.
    pub fn remove_troops(&mut self, id: PlayerId, amount: f64) -> f64 {
        let player = self.player_mut(id);
        let removed = amount.max(0.0).min(player.troops);
        player.troops -= removed;
        removed
    }

    pub fn add_gold(&mut self, id: PlayerId, amount: u64) {
        self.player_mut(id).gold += amount;
    }

    pub fn receive_gold(&mut self, id: PlayerId, amount: u64) {
        self.add_gold(id, amount);
        self.updates.push(GameUpdate::GoldReceived {
            player: id,
            amount,
        });
    }

    // ---- combat side effects ----------------------------------------------

    /// Conventional bomb impact: damages non-allied units around the point
    /// and culls troops from the tile's owner.
    pub fn bomber_explosion(&mut self, tile: TileRef, radius: u32, attacker: PlayerId) {
        let radius_sq = u64::from(radius) * u64::from(radius);
        let victims: Vec<UnitId> = self
            .units()
            .filter(|u| {
                u.owner != attacker
                    && !self.are_allied(u.owner, attacker)
                    && self.map.euclidean_dist_squared(tile, u.tile) <= radius_sq
            })
            .map(|u| u.id)
            .collect();
        let damage = self.config.bomb_damage;
        for victim in victims {
            if self.modify_health(victim, -damage) <= 0.0 {
                self.delete_unit(victim, Some(attacker));
            }
        }
        if let Some(owner) = self.owner_of(tile) {
            if owner != attacker && !self.are_allied(owner, attacker) {
                let kill = self.config.bomb_troop_kill;
                self.remove_troops(owner, kill);
            }
        }
    }

    /// Nuclear detonation: destroys units outright and culls a troop share
    /// from every owner holding ground inside the blast radius.
    pub fn detonate_warhead(&mut self, tile: TileRef, kind: UnitType, attacker: PlayerId) {
        let radius = self.config.warhead_radius(kind);
        let radius_sq = u64::from(radius) * u64::from(radius);
        let victims: Vec<UnitId> = self
            .units()
            .filter(|u| {
                u.owner != attacker
                    && self.map.euclidean_dist_squared(tile, u.tile) <= radius_sq
            })
            .map(|u| u.id)
            .collect();
        for victim in victims {
            self.delete_unit(victim, Some(attacker));
        }

        let mut affected: Vec<(PlayerId, u64)> = Vec::new();
        for t in 0..self.map.tile_count() {
            if self.map.euclidean_dist_squared(tile, t) > radius_sq {
                continue;
            }
            if let Some(owner) = self.owner_of(t) {
                match affected.iter_mut().find(|(p, _)| *p == owner) {
                    Some((_, count)) => *count += 1,
                    None => affected.push((owner, 1)),
                }
            }
        }
        affected.sort_by_key(|&(p, _)| p);
        let fraction = self.config.nuke_troop_kill_fraction;
        for (owner, count) in affected {
            if owner == attacker {
                continue;
            }
            let share = count as f64 / self.player(owner).tiles_owned().max(1) as f64;
            let loss = self.player(owner).troops * fraction * share.min(1.0);
            self.remove_troops(owner, loss);
        }
    }

    // ---- attacks ----------------------------------------------------------

    pub fn register_attack(
        &mut self,
        attacker: PlayerId,
        target: Option<PlayerId>,
        troops: f64,
    ) -> AttackId {
        let id = AttackId(self.next_attack_id);
        self.next_attack_id += 1;
        self.attacks.push(AttackRecord {
            id,
            attacker,
            target,
            troops,
        });
        id
    }

    pub fn set_attack_troops(&mut self, id: AttackId, troops: f64) {
        if let Some(record) = self.attacks.iter_mut().find(|a| a.id == id) {
            record.troops = troops;
        }
    }

    pub fn remove_attack(&mut self, id: AttackId) {
        self.attacks.retain(|a| a.id != id);
    }

    pub fn incoming_attacks(&self, target: PlayerId) -> Vec<AttackRecord> {
        self.attacks
            .iter()
            .filter(|a| a.target == Some(target))
            .copied()
            .collect()
    }

    /// Players this attacker currently has live attacks against.
    pub fn attack_targets_of(&self, attacker: PlayerId) -> Vec<PlayerId> {
        let mut targets: Vec<PlayerId> = self
            .attacks
            .iter()
            .filter(|a| a.attacker == attacker)
            .filter_map(|a| a.target)
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    // ---- relations and diplomacy ------------------------------------------

    pub fn relation(&self, of: PlayerId, toward: PlayerId) -> Relation {
        self.player(of).relation(toward)
    }

    pub fn update_relation(&mut self, of: PlayerId, toward: PlayerId, delta: i32) {
        let player = self.player_mut(of);
        let score = (player.relation_score(toward) + delta).clamp(RELATION_MIN, RELATION_MAX);
        player.relations.insert(toward, score);
        self.updates.push(GameUpdate::RelationChanged {
            player: of,
            toward,
            score,
            relation: Relation::from_score(score),
        });
    }

    pub fn are_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        self.player(a).is_allied_with(b)
    }

    pub fn can_send_alliance_request(&self, from: PlayerId, to: PlayerId) -> bool {
        from != to
            && self.player(from).alive
            && self.player(to).alive
            && !self.are_allied(from, to)
            && !self
                .alliance_requests
                .iter()
                .any(|r| r.from == from && r.to == to)
    }

    pub fn create_alliance_request(&mut self, from: PlayerId, to: PlayerId) -> bool {
        if !self.can_send_alliance_request(from, to) {
            return false;
        }
        self.alliance_requests.push(AllianceRequest {
            from,
            to,
            created_tick: self.tick,
        });
        true
    }

    pub fn alliance_requests_for(&self, to: PlayerId) -> Vec<AllianceRequest> {
        self.alliance_requests
            .iter()
            .filter(|r| r.to == to)
            .copied()
            .collect()
    }

    /// Resolves a pending request. Acceptance links both players and lifts
    /// their mutual relations to at least friendly.
    pub fn resolve_alliance_request(&mut self, from: PlayerId, to: PlayerId, accept: bool) {
        let before = self.alliance_requests.len();
        self.alliance_requests
            .retain(|r| !(r.from == from && r.to == to));
        if before == self.alliance_requests.len() {
            return;
        }
        if !accept {
            return;
        }
        self.player_mut(from).alliances.insert(to);
        self.player_mut(to).alliances.insert(from);
        for (a, b) in [(from, to), (to, from)] {
            let current = self.player(a).relation_score(b);
            if current < 50 {
                self.update_relation(a, b, 50 - current);
            }
        }
        self.updates.push(GameUpdate::AllianceFormed { a: from, b: to });
    }

    /// `breaker` walks away and is branded a traitor.
    pub fn break_alliance(&mut self, breaker: PlayerId, other: PlayerId) {
        if !self.are_allied(breaker, other) {
            return;
        }
        self.player_mut(breaker).alliances.remove(&other);
        self.player_mut(other).alliances.remove(&breaker);
        self.player_mut(breaker).traitor = true;
        let penalty = self.config.traitor_relation_penalty;
        self.update_relation(other, breaker, -penalty);
        self.updates.push(GameUpdate::AllianceBroken {
            a: breaker,
            b: other,
        });
    }

    pub fn has_embargo(&self, of: PlayerId, against: PlayerId) -> bool {
        self.player(of).has_embargo_against(against)
    }

    pub fn add_embargo(&mut self, of: PlayerId, against: PlayerId) {
        if self.player_mut(of).embargoes.insert(against) {
            self.updates.push(GameUpdate::EmbargoChanged {
                player: of,
                against,
                active: true,
            });
        }
    }

    pub fn stop_embargo(&mut self, of: PlayerId, against: PlayerId) {
        if self.player_mut(of).embargoes.remove(&against) {
            self.updates.push(GameUpdate::EmbargoChanged {
                player: of,
                against,
                active: false,
            });
        }
    }

    pub fn can_trade(&self, a: PlayerId, b: PlayerId) -> bool {
        a != b && !self.has_embargo(a, b) && !self.has_embargo(b, a)
    }

    // ---- autonomous-player state ------------------------------------------

    /// Checks out the decision record for one autonomous player. The owning
    /// execution must store it back at the end of its tick.
    pub fn take_bot_behavior(&mut self, id: PlayerId) -> Option<BotBehavior> {
        self.bot_behaviors.remove(&id)
    }

    pub fn store_bot_behavior(&mut self, id: PlayerId, behavior: BotBehavior) {
        self.bot_behaviors.insert(id, behavior);
    }

    // ---- scheduling and update feed ---------------------------------------

    /// Queues a task for registration at the start of the next advance.
    pub fn add_execution(&mut self, execution: Box<dyn Execution>) {
        self.pending_executions.push(execution);
    }

    pub fn take_pending_executions(&mut self) -> Vec<Box<dyn Execution>> {
        std::mem::take(&mut self.pending_executions)
    }

    pub(crate) fn push_update(&mut self, update: GameUpdate) {
        self.updates.push(update);
    }

    pub fn take_updates(&mut self) -> Vec<GameUpdate> {
        std::mem::take(&mut self.updates)
    }
}

#[cfg(test)]
mod tests {
    use super::player::PlayerType;
    use super::*;
    use crate::map::TerrainType;

    fn land_map(size: u32) -> GameMap {
        GameMap::new(
            size,
            size,
            vec![TerrainType::Plains; (size * size) as usize],
        )
    }

    fn spawned_game() -> (Game, PlayerId, PlayerId) {
        let mut game = Game::new(land_map(16), GameConfig::default(), 0, 7);
        let a = game.add_player("Aland", PlayerType::FakeHuman, 18);
        let b = game.add_player("Bland", PlayerType::Bot, 200);
        game.spawn_player(a, game.map().tile(2, 2));
        game.spawn_player(b, game.map().tile(12, 12));
        (game, a, b)
    }

    #[test]
    fn spawn_claims_a_disk_and_funds_the_player() {
        let (game, a, _) = spawned_game();
        let player = game.player(a);
        assert!(player.spawned);
        assert!(player.tiles_owned() > 1);
        assert!(player.troops > 0.0);
        assert!(!player.border_tiles.is_empty());
    }

    #[test]
    fn conquer_maintains_borders_and_eliminates() {
        let (mut game, a, b) = spawned_game();
        let b_tiles: Vec<TileRef> = game.player(b).owned_tiles.iter().copied().collect();
        for tile in b_tiles {
            game.conquer(a, tile);
        }
        assert!(!game.player(b).is_alive());
        assert_eq!(game.player(b).tiles_owned(), 0);
        // Interior tiles of a solid region are not borders.
        let a_player = game.player(a);
        assert!(a_player.border_tiles.len() < a_player.tiles_owned());
    }

    #[test]
    fn conquering_a_structure_tile_captures_it() {
        let (mut game, a, b) = spawned_game();
        let tile = *game.player(b).owned_tiles.iter().next().unwrap();
        game.add_gold(b, 1_000_000);
        let spawn = game.can_build(b, UnitType::City, tile).unwrap();
        let city = game.build_unit(b, UnitType::City, spawn, UnitSpec::default());
        game.conquer(a, tile);
        assert_eq!(game.unit(city).owner, a);
        assert!(game.unit(city).active);
    }

    #[test]
    fn build_requires_gold_and_ownership() {
        let (mut game, a, b) = spawned_game();
        let own_tile = *game.player(a).owned_tiles.iter().next().unwrap();
        let foreign_tile = *game.player(b).owned_tiles.iter().next().unwrap();
        assert!(game.can_build(a, UnitType::City, own_tile).is_none(), "no gold yet");
        game.add_gold(a, 1_000_000);
        assert!(game.can_build(a, UnitType::City, own_tile).is_some());
        assert!(game.can_build(a, UnitType::City, foreign_tile).is_none());
    }

    #[test]
    fn alliance_request_lifecycle() {
        let (mut game, a, b) = spawned_game();
        assert!(game.create_alliance_request(a, b));
        assert!(!game.create_alliance_request(a, b), "duplicate request");
        assert_eq!(game.alliance_requests_for(b).len(), 1);
        game.resolve_alliance_request(a, b, true);
        assert!(game.are_allied(a, b));
        assert!(game.alliance_requests_for(b).is_empty());
        assert!(game.relation(a, b) >= Relation::Friendly);

        game.break_alliance(a, b);
        assert!(!game.are_allied(a, b));
        assert!(game.player(a).is_traitor());
        assert!(!game.player(b).is_traitor());
    }

    #[test]
    fn attack_records_feed_incoming_queries() {
        let (mut game, a, b) = spawned_game();
        let id = game.register_attack(a, Some(b), 250.0);
        assert_eq!(game.incoming_attacks(b).len(), 1);
        assert_eq!(game.attack_targets_of(a), vec![b]);
        game.set_attack_troops(id, 100.0);
        assert_eq!(game.incoming_attacks(b)[0].troops, 100.0);
        game.remove_attack(id);
        assert!(game.incoming_attacks(b).is_empty());
    }

    #[test]
    fn relation_scores_clamp() {
        let (mut game, a, b) = spawned_game();
        game.update_relation(a, b, -1_000);
        assert_eq!(game.player(a).relation_score(b), RELATION_MIN);
        assert_eq!(game.relation(a, b), Relation::Hostile);
        // Directional: b's view of a is untouched.
        assert_eq!(game.relation(b, a), Relation::Neutral);
    }
}
