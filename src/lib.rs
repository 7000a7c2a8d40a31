pub mod config;
pub mod engine;
pub mod execution;
pub mod executor;
pub mod game;
pub mod map;
pub mod pathfinding;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod web;

pub use engine::{Engine, EngineBuilder, EngineSettings, Intent, TickSummary};
pub use game::{Game, Tick};
pub use scenario::{Scenario, ScenarioLoader};
