//! Behavior tasks.
//!
//! Every stateful game behavior — construction, flights, interception,
//! diplomacy, AI turns — is a task implementing [`Execution`], registered
//! with the [`crate::executor::Executor`] and driven once per tick until it
//! reports inactive. Tasks that hit a failed precondition log a warning and
//! deactivate themselves; a single bad decision never halts the simulation.

mod airfield;
mod attack;
mod bomber;
mod bot;
mod bot_behavior;
mod cargo_plane;
mod construction;
mod fake_human;
mod fighter;
mod intents;
mod nuke;
mod nuke_planner;
mod player;
mod sam;
mod spawn;
mod transport;
mod unit_planner;
mod warship;

pub use airfield::AirfieldExecution;
pub use attack::AttackExecution;
pub use bomber::BomberExecution;
pub use bot::BotExecution;
pub use bot_behavior::{should_accept_alliance_request, BotBehavior};
pub use cargo_plane::CargoPlaneExecution;
pub use construction::{ConstructionExecution, StructureExecution};
pub use fake_human::FakeHumanExecution;
pub use fighter::{FighterJetExecution, MoveFighterJetExecution, ShellExecution};
pub use intents::{
    AllianceReplyExecution, AllianceRequestExecution, BomberTargetExecution, EmbargoExecution,
    SetInvestmentRateExecution, SetTargetTroopRatioExecution,
};
pub use nuke::NukeExecution;
pub use nuke_planner::NukePlanner;
pub use player::PlayerExecution;
pub use sam::{SamLauncherExecution, SamMissileExecution};
pub use spawn::SpawnExecution;
pub use transport::TransportShipExecution;
pub use unit_planner::UnitPlanner;
pub use warship::WarshipExecution;

use crate::game::{Game, Tick};

/// One self-contained behavior, driven once per tick by the scheduler.
///
/// Contract: `init` runs exactly once, before the first `tick`. Once
/// `is_active` returns false it must never return true again; the scheduler
/// retires the task at the end of that advance.
pub trait Execution: Send {
    fn init(&mut self, game: &mut Game, tick: Tick);

    fn tick(&mut self, game: &mut Game, tick: Tick);

    fn is_active(&self) -> bool;

    /// Whether this task also runs during the pre-game spawn phase.
    fn active_during_spawn_phase(&self) -> bool {
        false
    }
}
