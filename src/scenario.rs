//! Scenario loading: map, nations, seed, and config overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::config::GameConfig;
use crate::game::player::PlayerType;
use crate::game::Game;
use crate::map::{GameMap, TerrainType};

fn default_spawn_phase_ticks() -> u64 {
    100
}

fn default_snapshot_interval_ticks() -> u64 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_spawn_phase_ticks")]
    pub spawn_phase_ticks: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    /// Terrain rows, top to bottom: `~` ocean, `.` plains, `^` mountain.
    pub map: Vec<String>,
    pub nations: Vec<ScenarioNation>,
    #[serde(default)]
    pub config: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioNation {
    pub name: String,
    pub kind: NationKind,
    /// `[x, y]` spawn cell.
    pub spawn: [u32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NationKind {
    Human,
    FakeHuman,
    Bot,
}

impl From<NationKind> for PlayerType {
    fn from(kind: NationKind) -> Self {
        match kind {
            NationKind::Human => PlayerType::Human,
            NationKind::FakeHuman => PlayerType::FakeHuman,
            NationKind::Bot => PlayerType::Bot,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid scenario: {0}")]
    Validation(String),
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path).map_err(|source| ScenarioError::Io {
            path: path.clone(),
            source,
        })?;
        Scenario::from_str(&data)
    }
}

impl Scenario {
    pub fn from_str(text: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if self.map.is_empty() || self.map[0].is_empty() {
            return Err(ScenarioError::Validation(
                "scenario must define a non-empty map".into(),
            ));
        }
        let width = self.map[0].chars().count();
        for (index, row) in self.map.iter().enumerate() {
            if row.chars().count() != width {
                return Err(ScenarioError::Validation(format!(
                    "map row {index} has {} cells, expected {width}",
                    row.chars().count()
                )));
            }
            if let Some(bad) = row.chars().find(|c| !matches!(c, '~' | '.' | '^')) {
                return Err(ScenarioError::Validation(format!(
                    "map row {index} contains unknown terrain '{bad}'"
                )));
            }
        }
        if self.nations.is_empty() {
            return Err(ScenarioError::Validation(
                "scenario must define at least one nation".into(),
            ));
        }
        let mut names = Vec::new();
        let height = self.map.len() as u32;
        for nation in &self.nations {
            if names.contains(&nation.name) {
                return Err(ScenarioError::Validation(format!(
                    "nation '{}' defined more than once",
                    nation.name
                )));
            }
            names.push(nation.name.clone());
            let [x, y] = nation.spawn;
            if x >= width as u32 || y >= height {
                return Err(ScenarioError::Validation(format!(
                    "nation '{}' spawns outside the map",
                    nation.name
                )));
            }
            let terrain = self.terrain_at(x, y);
            if terrain == TerrainType::Ocean {
                return Err(ScenarioError::Validation(format!(
                    "nation '{}' spawns in the ocean",
                    nation.name
                )));
            }
        }
        Ok(())
    }

    fn terrain_at(&self, x: u32, y: u32) -> TerrainType {
        match self.map[y as usize].chars().nth(x as usize) {
            Some('~') => TerrainType::Ocean,
            Some('^') => TerrainType::Mountain,
            _ => TerrainType::Plains,
        }
    }

    pub fn build_map(&self) -> GameMap {
        let height = self.map.len() as u32;
        let width = self.map[0].chars().count() as u32;
        let terrain = self
            .map
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| match c {
                '~' => TerrainType::Ocean,
                '^' => TerrainType::Mountain,
                _ => TerrainType::Plains,
            })
            .collect();
        GameMap::new(width, height, terrain)
    }

    pub fn build_game(&self) -> Game {
        let map = self.build_map();
        let mut game = Game::new(map, self.config.clone(), self.spawn_phase_ticks, self.seed);
        for nation in &self.nations {
            let [x, y] = nation.spawn;
            let home = game.map().tile(x, y);
            game.add_player(nation.name.clone(), nation.kind.into(), home);
        }
        game
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name: strait
seed: 3
spawn_phase_ticks: 10
map:
  - "....~...."
  - "....~...."
  - "....~...."
nations:
  - name: West
    kind: bot
    spawn: [1, 1]
  - name: East
    kind: fake_human
    spawn: [7, 1]
"#;

    #[test]
    fn loads_and_builds_a_game() {
        let scenario = Scenario::from_str(MINIMAL).unwrap();
        assert_eq!(scenario.name, "strait");
        let game = scenario.build_game();
        assert_eq!(game.map().width(), 9);
        assert_eq!(game.map().height(), 3);
        assert_eq!(game.player_ids().len(), 2);
        assert!(game.in_spawn_phase());
    }

    #[test]
    fn rejects_ragged_maps() {
        let text = MINIMAL.replace("\"....~....\"\n  - \"....~....\"\nnations", "\"..\"\nnations");
        let err = Scenario::from_str(&text).unwrap_err();
        assert!(matches!(err, ScenarioError::Validation(_)));
    }

    #[test]
    fn rejects_ocean_spawns() {
        let text = MINIMAL.replace("spawn: [1, 1]", "spawn: [4, 1]");
        let err = Scenario::from_str(&text).unwrap_err();
        assert!(matches!(err, ScenarioError::Validation(_)));
    }

    #[test]
    fn rejects_duplicate_nations() {
        let text = MINIMAL.replace("name: East", "name: West");
        let err = Scenario::from_str(&text).unwrap_err();
        assert!(matches!(err, ScenarioError::Validation(_)));
    }
}
