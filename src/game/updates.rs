//! Per-tick delta events.
//!
//! Everything that changed during one tick is appended here so rendering and
//! broadcast layers can serialize deltas without re-scanning the world. The
//! engine drains the buffer once per advance.

use serde::Serialize;

use crate::game::player::{PlayerId, Relation};
use crate::game::unit::{UnitId, UnitType};
use crate::map::TileRef;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameUpdate {
    UnitSpawned {
        unit: UnitId,
        unit_type: UnitType,
        owner: PlayerId,
        tile: TileRef,
    },
    UnitMoved {
        unit: UnitId,
        tile: TileRef,
    },
    UnitDestroyed {
        unit: UnitId,
        unit_type: UnitType,
        owner: PlayerId,
        destroyer: Option<PlayerId>,
    },
    UnitCaptured {
        unit: UnitId,
        previous_owner: PlayerId,
        new_owner: PlayerId,
    },
    OwnershipChanged {
        tile: TileRef,
        previous_owner: Option<PlayerId>,
        new_owner: Option<PlayerId>,
    },
    RelationChanged {
        player: PlayerId,
        toward: PlayerId,
        score: i32,
        relation: Relation,
    },
    AllianceFormed {
        a: PlayerId,
        b: PlayerId,
    },
    AllianceBroken {
        a: PlayerId,
        b: PlayerId,
    },
    EmbargoChanged {
        player: PlayerId,
        against: PlayerId,
        active: bool,
    },
    GoldReceived {
        player: PlayerId,
        amount: u64,
    },
    WarheadIntercepted {
        interceptor_owner: PlayerId,
        warhead_type: UnitType,
    },
    PlayerSpawned {
        player: PlayerId,
        tile: TileRef,
    },
    PlayerEliminated {
        player: PlayerId,
    },
}
