//! Engine: intent application, the advance loop, and per-tick summaries.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::execution::{
    AllianceReplyExecution, AllianceRequestExecution, AttackExecution, BomberTargetExecution,
    BotExecution, ConstructionExecution, EmbargoExecution, Execution, FakeHumanExecution,
    FighterJetExecution, MoveFighterJetExecution, NukeExecution, PlayerExecution,
    SetInvestmentRateExecution, SetTargetTroopRatioExecution, SpawnExecution,
    TransportShipExecution,
};
use crate::executor::Executor;
use crate::game::player::{PlayerId, PlayerType};
use crate::game::unit::{UnitId, UnitType};
use crate::game::updates::GameUpdate;
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::snapshot::{state_hash, SnapshotWriter};

/// External player request. Each intent translates 1:1 into one execution
/// registered for the next tick; malformed intents fail silently inside that
/// execution rather than surfacing an error to the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Spawn {
        player: PlayerId,
        tile: TileRef,
    },
    Build {
        player: PlayerId,
        unit_type: UnitType,
        tile: TileRef,
    },
    Attack {
        player: PlayerId,
        target: Option<PlayerId>,
        troops: f64,
    },
    BoatAttack {
        player: PlayerId,
        target: Option<PlayerId>,
        destination: TileRef,
        troops: f64,
    },
    Nuke {
        player: PlayerId,
        warhead: UnitType,
        tile: TileRef,
    },
    SetInvestmentRate {
        player: PlayerId,
        rate: f64,
    },
    SetTargetTroopRatio {
        player: PlayerId,
        ratio: f64,
    },
    AllianceRequest {
        from: PlayerId,
        to: PlayerId,
    },
    AllianceReply {
        evaluator: PlayerId,
        requestor: PlayerId,
        accept: bool,
    },
    Embargo {
        player: PlayerId,
        against: PlayerId,
        stop: bool,
    },
    MoveFighterJet {
        player: PlayerId,
        unit: UnitId,
        tile: TileRef,
    },
    BomberTarget {
        player: PlayerId,
        target: Option<PlayerId>,
        structure: Option<UnitType>,
    },
}

impl Intent {
    fn into_execution(self) -> Box<dyn Execution> {
        match self {
            Intent::Spawn { player, tile } => Box::new(SpawnExecution::new(player, Some(tile))),
            Intent::Build {
                player,
                unit_type: UnitType::FighterJet,
                tile,
            } => Box::new(FighterJetExecution::new(player, tile)),
            Intent::Build {
                player,
                unit_type,
                tile,
            } => Box::new(ConstructionExecution::new(player, unit_type, tile)),
            Intent::Attack {
                player,
                target,
                troops,
            } => Box::new(AttackExecution::new(player, target, troops)),
            Intent::BoatAttack {
                player,
                target,
                destination,
                troops,
            } => Box::new(TransportShipExecution::new(player, target, destination, troops)),
            Intent::Nuke {
                player,
                warhead,
                tile,
            } => Box::new(NukeExecution::new(player, warhead, tile)),
            Intent::SetInvestmentRate { player, rate } => {
                Box::new(SetInvestmentRateExecution::new(player, rate))
            }
            Intent::SetTargetTroopRatio { player, ratio } => {
                Box::new(SetTargetTroopRatioExecution::new(player, ratio))
            }
            Intent::AllianceRequest { from, to } => {
                Box::new(AllianceRequestExecution::new(from, to))
            }
            Intent::AllianceReply {
                evaluator,
                requestor,
                accept,
            } => Box::new(AllianceReplyExecution::new(evaluator, requestor, accept)),
            Intent::Embargo {
                player,
                against,
                stop,
            } => Box::new(EmbargoExecution::new(player, against, stop)),
            Intent::MoveFighterJet { player, unit, tile } => {
                Box::new(MoveFighterJetExecution::new(player, unit, tile))
            }
            Intent::BomberTarget {
                player,
                target,
                structure,
            } => Box::new(BomberTargetExecution::new(player, target, structure)),
        }
    }
}

fn intent_references_valid(game: &Game, intent: &Intent) -> bool {
    let player_known = |id: &PlayerId| game.has_player(*id);
    let target_known = |id: &Option<PlayerId>| id.as_ref().map_or(true, player_known);
    match intent {
        Intent::Spawn { player, .. }
        | Intent::Build { player, .. }
        | Intent::Nuke { player, .. }
        | Intent::SetInvestmentRate { player, .. }
        | Intent::SetTargetTroopRatio { player, .. } => player_known(player),
        Intent::Attack { player, target, .. } | Intent::BoatAttack { player, target, .. } => {
            player_known(player) && target_known(target)
        }
        Intent::AllianceRequest { from, to } => player_known(from) && player_known(to),
        Intent::AllianceReply {
            evaluator,
            requestor,
            ..
        } => player_known(evaluator) && player_known(requestor),
        Intent::Embargo {
            player, against, ..
        } => player_known(player) && player_known(against),
        Intent::MoveFighterJet { player, unit, .. } => {
            player_known(player) && game.has_unit(*unit)
        }
        Intent::BomberTarget { player, target, .. } => {
            player_known(player) && target_known(target)
        }
    }
}

/// Everything that came out of one advance, for rendering and broadcast.
#[derive(Debug, Serialize)]
pub struct TickSummary {
    pub tick: Tick,
    pub updates: Vec<GameUpdate>,
    pub state_hash: u64,
    pub snapshot_path: Option<PathBuf>,
}

pub struct EngineSettings {
    pub scenario_name: String,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    executions: Vec<Box<dyn Execution>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            executions: Vec::new(),
        }
    }

    pub fn with_execution(mut self, execution: impl Execution + 'static) -> Self {
        self.executions.push(Box::new(execution));
        self
    }

    /// Registers the standing executions every match needs: one growth task
    /// per player, plus the AI driver matching each autonomous nation.
    pub fn with_standard_executions(mut self, game: &Game) -> Self {
        for player in game.players() {
            self.executions.push(Box::new(PlayerExecution::new(player.id)));
            match player.kind {
                PlayerType::Bot => {
                    self.executions
                        .push(Box::new(SpawnExecution::new(player.id, None)));
                    self.executions.push(Box::new(BotExecution::new(player.id)));
                }
                PlayerType::FakeHuman => {
                    self.executions
                        .push(Box::new(FakeHumanExecution::new(player.id)));
                }
                PlayerType::Human => {}
            }
        }
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            executor: Executor::new(),
            snapshot_writer: SnapshotWriter::new(
                self.settings.snapshot_dir.clone(),
                self.settings.snapshot_interval_ticks,
            ),
            settings: self.settings,
            initial: self.executions,
        }
    }
}

pub struct Engine {
    executor: Executor,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
    initial: Vec<Box<dyn Execution>>,
}

impl Engine {
    /// Translates one external intent into a task for the next tick.
    /// Intents referencing unknown players or units are dropped with a
    /// warning; the requester sees no effect and no error.
    pub fn apply(&mut self, game: &mut Game, intent: Intent) {
        if !intent_references_valid(game, &intent) {
            tracing::warn!(?intent, "intent references unknown entities, dropped");
            return;
        }
        game.add_execution(intent.into_execution());
    }

    /// Runs one full tick: initialize pending tasks, tick the active set,
    /// retire finished tasks, advance time, and surface the deltas.
    pub fn advance(&mut self, game: &mut Game) -> Result<TickSummary> {
        if !self.initial.is_empty() {
            for execution in self.initial.drain(..) {
                game.add_execution(execution);
            }
        }
        let tick = game.tick();
        self.executor.advance(game);
        game.advance_tick();

        let snapshot_path =
            self.snapshot_writer
                .maybe_write(game, &self.settings.scenario_name)?;

        Ok(TickSummary {
            tick,
            updates: game.take_updates(),
            state_hash: state_hash(game),
            snapshot_path,
        })
    }

    pub fn run(&mut self, game: &mut Game, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.advance(game)?;
        }
        Ok(())
    }

    pub fn run_with_hook(
        &mut self,
        game: &mut Game,
        ticks: u64,
        mut hook: impl FnMut(&Game, &TickSummary),
    ) -> Result<()> {
        for _ in 0..ticks {
            let summary = self.advance(game)?;
            hook(game, &summary);
        }
        Ok(())
    }

    pub fn scenario_name(&self) -> &str {
        &self.settings.scenario_name
    }

    pub fn active_task_count(&self) -> usize {
        self.executor.active_count()
    }
}
