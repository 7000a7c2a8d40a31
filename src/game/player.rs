//! Player records, relations, and diplomacy state.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::game::unit::UnitType;
use crate::game::Tick;
use crate::map::TileRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u16);

impl PlayerId {
    pub fn raw(self) -> u16 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerType {
    Human,
    FakeHuman,
    Bot,
}

impl PlayerType {
    pub fn is_autonomous(self) -> bool {
        !matches!(self, PlayerType::Human)
    }
}

pub const RELATION_MIN: i32 = -100;
pub const RELATION_MAX: i32 = 100;

/// Ordinal view of the numeric relation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relation {
    Hostile,
    Distrustful,
    Neutral,
    Friendly,
}

impl Relation {
    pub fn from_score(score: i32) -> Self {
        if score <= -50 {
            Relation::Hostile
        } else if score < 0 {
            Relation::Distrustful
        } else if score < 50 {
            Relation::Neutral
        } else {
            Relation::Friendly
        }
    }
}

/// Pending alliance proposal; discarded once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceRequest {
    pub from: PlayerId,
    pub to: PlayerId,
    pub created_tick: Tick,
}

/// Standing bomber order set by intent; consumed by airfield dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomberIntent {
    pub target: PlayerId,
    pub structure: UnitType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerType,
    pub alive: bool,
    pub spawned: bool,
    /// Preferred spawn location from the scenario.
    pub home_cell: TileRef,

    pub troops: f64,
    pub workers: f64,
    pub gold: u64,
    pub target_troop_ratio: f64,
    pub investment_rate: f64,
    pub productivity: f64,

    pub owned_tiles: BTreeSet<TileRef>,
    pub border_tiles: BTreeSet<TileRef>,

    /// This player's attitude toward each opponent; directional.
    pub relations: BTreeMap<PlayerId, i32>,
    pub alliances: BTreeSet<PlayerId>,
    pub embargoes: BTreeSet<PlayerId>,
    pub traitor: bool,

    pub bomber_intent: Option<BomberIntent>,
}

impl Player {
    pub fn new(id: PlayerId, name: String, kind: PlayerType, home_cell: TileRef) -> Self {
        Self {
            id,
            name,
            kind,
            alive: true,
            spawned: false,
            home_cell,
            troops: 0.0,
            workers: 0.0,
            gold: 0,
            target_troop_ratio: 0.5,
            investment_rate: 0.0,
            productivity: 1.0,
            owned_tiles: BTreeSet::new(),
            border_tiles: BTreeSet::new(),
            relations: BTreeMap::new(),
            alliances: BTreeSet::new(),
            embargoes: BTreeSet::new(),
            traitor: false,
            bomber_intent: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn population(&self) -> f64 {
        self.troops + self.workers
    }

    pub fn tiles_owned(&self) -> usize {
        self.owned_tiles.len()
    }

    pub fn relation_score(&self, other: PlayerId) -> i32 {
        self.relations.get(&other).copied().unwrap_or(0)
    }

    pub fn relation(&self, other: PlayerId) -> Relation {
        Relation::from_score(self.relation_score(other))
    }

    pub fn is_allied_with(&self, other: PlayerId) -> bool {
        self.alliances.contains(&other)
    }

    pub fn has_embargo_against(&self, other: PlayerId) -> bool {
        self.embargoes.contains(&other)
    }

    pub fn is_traitor(&self) -> bool {
        self.traitor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_thresholds() {
        assert_eq!(Relation::from_score(-100), Relation::Hostile);
        assert_eq!(Relation::from_score(-50), Relation::Hostile);
        assert_eq!(Relation::from_score(-49), Relation::Distrustful);
        assert_eq!(Relation::from_score(-1), Relation::Distrustful);
        assert_eq!(Relation::from_score(0), Relation::Neutral);
        assert_eq!(Relation::from_score(49), Relation::Neutral);
        assert_eq!(Relation::from_score(50), Relation::Friendly);
        assert!(Relation::Hostile < Relation::Neutral);
        assert!(Relation::Neutral < Relation::Friendly);
    }
}
