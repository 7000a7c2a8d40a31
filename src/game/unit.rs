//! Unit records and the unit-type catalog.

use serde::{Deserialize, Serialize};

use crate::game::player::PlayerId;
use crate::map::TileRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl UnitId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitType {
    City,
    Port,
    MissileSilo,
    SamLauncher,
    DefensePost,
    Academy,
    Hospital,
    Airfield,
    Construction,
    Bomber,
    FighterJet,
    CargoPlane,
    Warship,
    TransportShip,
    SamMissile,
    AtomBomb,
    HydrogenBomb,
    Mirv,
}

impl UnitType {
    /// Immobile buildings, including the construction placeholder.
    pub fn is_structure(self) -> bool {
        matches!(
            self,
            UnitType::City
                | UnitType::Port
                | UnitType::MissileSilo
                | UnitType::SamLauncher
                | UnitType::DefensePost
                | UnitType::Academy
                | UnitType::Hospital
                | UnitType::Airfield
                | UnitType::Construction
        )
    }

    pub fn is_warhead(self) -> bool {
        matches!(
            self,
            UnitType::AtomBomb | UnitType::HydrogenBomb | UnitType::Mirv
        )
    }

    pub fn is_airborne(self) -> bool {
        matches!(
            self,
            UnitType::Bomber | UnitType::FighterJet | UnitType::CargoPlane | UnitType::SamMissile
        ) || self.is_warhead()
    }
}

/// Optional attributes supplied at build time.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitSpec {
    pub target_tile: Option<TileRef>,
    pub target_unit: Option<UnitId>,
    pub patrol_tile: Option<TileRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitType,
    pub owner: PlayerId,
    pub tile: TileRef,
    pub health: f64,
    pub max_health: f64,
    pub active: bool,
    pub target_tile: Option<TileRef>,
    pub target_unit: Option<UnitId>,
    pub patrol_tile: Option<TileRef>,
}

impl Unit {
    pub fn health_fraction(&self) -> f64 {
        if self.max_health <= 0.0 {
            return 1.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    /// Below half health the unit renders and behaves as damaged.
    pub fn is_damaged(&self) -> bool {
        self.health_fraction() < 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_fraction_split() {
        let mut unit = Unit {
            id: UnitId(0),
            kind: UnitType::FighterJet,
            owner: PlayerId(0),
            tile: 0,
            health: 50.0,
            max_health: 50.0,
            active: true,
            target_tile: None,
            target_unit: None,
            patrol_tile: None,
        };
        assert!(!unit.is_damaged());
        unit.health = 24.0;
        assert!(unit.is_damaged());
        unit.health = -3.0;
        assert_eq!(unit.health_fraction(), 0.0);
    }
}
