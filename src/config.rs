//! Gameplay tuning constants.
//!
//! Scenarios may override any field; everything else falls back to the
//! defaults below. All values are expressed in ticks, tiles, troops, or gold.

use serde::{Deserialize, Serialize};

use crate::game::unit::UnitType;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // Population and economy.
    pub base_max_population: f64,
    pub max_population_per_tile: f64,
    pub city_population_bonus: f64,
    pub population_growth_rate: f64,
    pub hospital_growth_bonus: f64,
    pub gold_per_worker: f64,
    pub academy_productivity_bonus: f64,

    // Spawning.
    pub spawn_claim_radius: u32,
    pub spawn_initial_troops: f64,
    pub spawn_initial_workers: f64,
    pub spawn_initial_gold: u64,

    // Land combat.
    pub attack_tile_cost: f64,
    pub defense_density_weight: f64,
    pub tiles_conquered_per_tick: u32,
    pub traitor_relation_penalty: i32,

    // Construction.
    pub construction_duration: u64,
    pub city_cost: u64,
    pub port_cost: u64,
    pub airfield_cost: u64,
    pub missile_silo_cost: u64,
    pub sam_launcher_cost: u64,
    pub defense_post_cost: u64,
    pub academy_cost: u64,
    pub hospital_cost: u64,
    pub warship_cost: u64,
    pub fighter_jet_cost: u64,
    pub atom_bomb_cost: u64,
    pub hydrogen_bomb_cost: u64,
    pub mirv_cost: u64,

    // Airfields, bombers, cargo planes.
    pub airfield_check_period: u64,
    pub bomber_spawn_interval: u64,
    pub bomber_target_range: u32,
    pub bomber_payload: u32,
    pub bomber_drop_cadence: u32,
    pub bomber_speed: u32,
    pub bomber_explosion_radius: u32,
    pub bomb_damage: f64,
    pub bomb_troop_kill: f64,
    pub cargo_plane_spawn_chance: u32,
    pub cargo_plane_speed: u32,
    pub cargo_gold_base: u64,
    pub cargo_gold_per_tile: u64,

    // Fighter jets and shells.
    pub fighter_jet_speed: u32,
    pub fighter_patrol_range: u32,
    pub fighter_targeting_range: u32,
    pub fighter_dogfight_distance: u32,
    pub fighter_min_dogfight_distance: u32,
    pub fighter_reached_distance: u32,
    pub fighter_attack_rate: u64,
    pub fighter_healing_amount: f64,
    pub shell_speed: u32,
    pub shell_damage: f64,

    // Air defense.
    pub sam_range: u32,
    pub sam_cooldown: u64,
    pub sam_missile_speed: u32,

    // Warheads.
    pub atom_bomb_speed: u32,
    pub hydrogen_bomb_speed: u32,
    pub mirv_speed: u32,
    pub atom_bomb_radius: u32,
    pub hydrogen_bomb_radius: u32,
    pub mirv_radius: u32,
    pub nuke_troop_kill_fraction: f64,

    // Ships.
    pub transport_speed: u32,
    pub warship_speed: u32,
    pub warship_targeting_range: u32,
    pub warship_patrol_range: u32,
    pub warship_attack_rate: u64,

    // Autonomous players.
    pub bot_attack_rate_min: i64,
    pub bot_attack_rate_max: i64,
    pub bot_trigger_ratio_min: i64,
    pub bot_trigger_ratio_max: i64,
    pub bot_reserve_ratio_min: i64,
    pub bot_reserve_ratio_max: i64,
    pub fake_human_trigger_ratio_min: i64,
    pub fake_human_trigger_ratio_max: i64,
    pub fake_human_reserve_ratio_min: i64,
    pub fake_human_reserve_ratio_max: i64,
    pub enemy_search_radius: u32,
    pub enemy_search_radius_increment: u32,
    pub border_sample_size: usize,
    pub stale_enemy_ticks: u64,
    pub embargo_relation_malus: i32,
    pub assist_relation_cost: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_max_population: 1_000.0,
            max_population_per_tile: 50.0,
            city_population_bonus: 2_500.0,
            population_growth_rate: 0.02,
            hospital_growth_bonus: 0.25,
            gold_per_worker: 0.05,
            academy_productivity_bonus: 0.2,

            spawn_claim_radius: 3,
            spawn_initial_troops: 500.0,
            spawn_initial_workers: 100.0,
            spawn_initial_gold: 500,

            attack_tile_cost: 20.0,
            defense_density_weight: 2.0,
            tiles_conquered_per_tick: 4,
            traitor_relation_penalty: 50,

            construction_duration: 10,
            city_cost: 7_500,
            port_cost: 5_000,
            airfield_cost: 10_000,
            missile_silo_cost: 25_000,
            sam_launcher_cost: 15_000,
            defense_post_cost: 2_500,
            academy_cost: 7_500,
            hospital_cost: 7_500,
            warship_cost: 12_500,
            fighter_jet_cost: 5_000,
            atom_bomb_cost: 37_500,
            hydrogen_bomb_cost: 75_000,
            mirv_cost: 125_000,

            airfield_check_period: 10,
            bomber_spawn_interval: 3,
            bomber_target_range: 120,
            bomber_payload: 5,
            bomber_drop_cadence: 4,
            bomber_speed: 2,
            bomber_explosion_radius: 3,
            bomb_damage: 60.0,
            bomb_troop_kill: 250.0,
            cargo_plane_spawn_chance: 12,
            cargo_plane_speed: 2,
            cargo_gold_base: 500,
            cargo_gold_per_tile: 25,

            fighter_jet_speed: 4,
            fighter_patrol_range: 50,
            fighter_targeting_range: 70,
            fighter_dogfight_distance: 12,
            fighter_min_dogfight_distance: 4,
            fighter_reached_distance: 2,
            fighter_attack_rate: 5,
            fighter_healing_amount: 1.0,
            shell_speed: 3,
            shell_damage: 15.0,

            sam_range: 50,
            sam_cooldown: 75,
            sam_missile_speed: 12,

            atom_bomb_speed: 6,
            hydrogen_bomb_speed: 5,
            mirv_speed: 9,
            atom_bomb_radius: 10,
            hydrogen_bomb_radius: 20,
            mirv_radius: 6,
            nuke_troop_kill_fraction: 0.25,

            transport_speed: 2,
            warship_speed: 3,
            warship_targeting_range: 60,
            warship_patrol_range: 30,
            warship_attack_rate: 6,

            bot_attack_rate_min: 40,
            bot_attack_rate_max: 80,
            bot_trigger_ratio_min: 60,
            bot_trigger_ratio_max: 90,
            bot_reserve_ratio_min: 30,
            bot_reserve_ratio_max: 60,
            fake_human_trigger_ratio_min: 70,
            fake_human_trigger_ratio_max: 90,
            fake_human_reserve_ratio_min: 50,
            fake_human_reserve_ratio_max: 60,
            enemy_search_radius: 100,
            enemy_search_radius_increment: 50,
            border_sample_size: 10,
            stale_enemy_ticks: 200,
            embargo_relation_malus: 20,
            assist_relation_cost: 20,
        }
    }
}

impl GameConfig {
    pub fn unit_cost(&self, kind: UnitType) -> u64 {
        match kind {
            UnitType::City => self.city_cost,
            UnitType::Port => self.port_cost,
            UnitType::Airfield => self.airfield_cost,
            UnitType::MissileSilo => self.missile_silo_cost,
            UnitType::SamLauncher => self.sam_launcher_cost,
            UnitType::DefensePost => self.defense_post_cost,
            UnitType::Academy => self.academy_cost,
            UnitType::Hospital => self.hospital_cost,
            UnitType::Warship => self.warship_cost,
            UnitType::FighterJet => self.fighter_jet_cost,
            UnitType::AtomBomb => self.atom_bomb_cost,
            UnitType::HydrogenBomb => self.hydrogen_bomb_cost,
            UnitType::Mirv => self.mirv_cost,
            // Spawned by their parent structures, not purchased.
            UnitType::Bomber
            | UnitType::CargoPlane
            | UnitType::TransportShip
            | UnitType::SamMissile
            | UnitType::Construction => 0,
        }
    }

    pub fn unit_max_health(&self, kind: UnitType) -> f64 {
        match kind {
            UnitType::City => 250.0,
            UnitType::Port | UnitType::Academy | UnitType::Hospital => 100.0,
            UnitType::MissileSilo | UnitType::SamLauncher | UnitType::Airfield => 150.0,
            UnitType::DefensePost => 120.0,
            UnitType::Construction => 50.0,
            UnitType::Bomber => 10.0,
            UnitType::FighterJet => 50.0,
            UnitType::CargoPlane => 15.0,
            UnitType::Warship => 250.0,
            UnitType::TransportShip => 50.0,
            UnitType::SamMissile | UnitType::AtomBomb | UnitType::HydrogenBomb | UnitType::Mirv => {
                1.0
            }
        }
    }

    pub fn warhead_speed(&self, kind: UnitType) -> u32 {
        match kind {
            UnitType::HydrogenBomb => self.hydrogen_bomb_speed,
            UnitType::Mirv => self.mirv_speed,
            _ => self.atom_bomb_speed,
        }
    }

    pub fn warhead_radius(&self, kind: UnitType) -> u32 {
        match kind {
            UnitType::HydrogenBomb => self.hydrogen_bomb_radius,
            UnitType::Mirv => self.mirv_radius,
            _ => self.atom_bomb_radius,
        }
    }

    pub fn cargo_plane_gold(&self, tiles_traveled: u64) -> u64 {
        self.cargo_gold_base + self.cargo_gold_per_tile * tiles_traveled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: GameConfig = serde_yaml::from_str("bomber_payload: 9").unwrap();
        assert_eq!(config.bomber_payload, 9);
        assert_eq!(config.bomber_drop_cadence, GameConfig::default().bomber_drop_cadence);
    }

    #[test]
    fn spawned_units_are_free() {
        let config = GameConfig::default();
        assert_eq!(config.unit_cost(UnitType::Bomber), 0);
        assert_eq!(config.unit_cost(UnitType::SamMissile), 0);
        assert!(config.unit_cost(UnitType::City) > 0);
    }
}
