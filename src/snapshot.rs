//! State snapshots and the replica-divergence hash.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::game::player::PlayerId;
use crate::game::unit::UnitType;
use crate::game::{Game, Tick};
use crate::map::TileRef;

/// FNV-1a over the canonical world state. Two replicas fed the same seed and
/// intents must produce the same value after every tick; a mismatch means
/// they diverged.
pub fn state_hash(game: &Game) -> u64 {
    let mut hasher = Fnv1a::new();
    hasher.write_u64(game.tick());
    for tile in 0..game.map().tile_count() {
        match game.owner_of(tile) {
            Some(owner) => hasher.write_u64(u64::from(owner.raw()) + 1),
            None => hasher.write_u64(0),
        }
    }
    for player in game.players() {
        hasher.write_u64(player.troops.to_bits());
        hasher.write_u64(player.workers.to_bits());
        hasher.write_u64(player.gold);
        hasher.write_u64(u64::from(player.alive));
        hasher.write_u64(u64::from(player.traitor));
        hasher.write_u64(player.alliances.len() as u64);
        for (&other, &score) in &player.relations {
            hasher.write_u64(u64::from(other.raw()));
            hasher.write_u64(score as u64);
        }
    }
    for unit in game.units() {
        hasher.write_u64(u64::from(unit.id.raw()));
        hasher.write_u64(u64::from(unit.owner.raw()));
        hasher.write_u64(u64::from(unit.tile));
        hasher.write_u64(unit.health.to_bits());
    }
    hasher.finish()
}

struct Fnv1a {
    state: u64,
}

impl Fnv1a {
    fn new() -> Self {
        Self {
            state: 0xcbf2_9ce4_8422_2325,
        }
    }

    fn write_u64(&mut self, value: u64) {
        for byte in value.to_le_bytes() {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

#[derive(Serialize)]
struct PlayerSnapshot {
    id: u16,
    name: String,
    alive: bool,
    troops: f64,
    workers: f64,
    gold: u64,
    tiles_owned: usize,
}

#[derive(Serialize)]
struct UnitSnapshot {
    id: u32,
    kind: UnitType,
    owner: PlayerId,
    tile: TileRef,
    health: f64,
}

#[derive(Serialize)]
struct GameSnapshot {
    scenario: String,
    tick: Tick,
    state_hash: u64,
    players: Vec<PlayerSnapshot>,
    units: Vec<UnitSnapshot>,
}

impl GameSnapshot {
    fn capture(game: &Game, scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            tick: game.tick(),
            state_hash: state_hash(game),
            players: game
                .players()
                .map(|p| PlayerSnapshot {
                    id: p.id.raw(),
                    name: p.name.clone(),
                    alive: p.alive,
                    troops: p.troops,
                    workers: p.workers,
                    gold: p.gold,
                    tiles_owned: p.tiles_owned(),
                })
                .collect(),
            units: game
                .units()
                .map(|u| UnitSnapshot {
                    id: u.id.raw(),
                    kind: u.kind,
                    owner: u.owner,
                    tile: u.tile,
                    health: u.health,
                })
                .collect(),
        }
    }
}

pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    /// Writes a JSON snapshot every `interval_ticks`; disabled when zero.
    pub fn maybe_write(&self, game: &Game, scenario: &str) -> Result<Option<PathBuf>> {
        if self.interval_ticks == 0 {
            return Ok(None);
        }
        let tick = game.tick();
        if tick == 0 || tick % self.interval_ticks != 0 {
            return Ok(None);
        }
        let dir = self.output_dir.join(scenario);
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create snapshot dir {}", dir.display()))?;
        let path = dir.join(format!("tick_{tick:06}.json"));
        let snapshot = GameSnapshot::capture(game, scenario);
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::player::PlayerType;
    use crate::map::{GameMap, TerrainType};

    fn small_game() -> Game {
        let map = GameMap::new(8, 8, vec![TerrainType::Plains; 64]);
        let mut game = Game::new(map, GameConfig::default(), 0, 11);
        let a = game.add_player("Aland", PlayerType::Bot, 9);
        game.spawn_player(a, 9);
        game
    }

    #[test]
    fn hash_is_stable_and_sensitive() {
        let game = small_game();
        let other = small_game();
        assert_eq!(state_hash(&game), state_hash(&other));

        let mut mutated = small_game();
        mutated.add_troops(crate::game::player::PlayerId(0), 1.0);
        assert_ne!(state_hash(&game), state_hash(&mutated));
    }

    #[test]
    fn writer_respects_interval() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 5);
        let mut game = small_game();
        assert!(writer.maybe_write(&game, "test").unwrap().is_none());
        for _ in 0..5 {
            game.advance_tick();
        }
        let written = writer.maybe_write(&game, "test").unwrap();
        assert!(written.is_some());
        assert!(written.unwrap().exists());
    }
}
