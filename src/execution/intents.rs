//! Single-tick intent tasks.
//!
//! Each applies one validated player request and terminates on its first
//! tick. Out-of-range or impossible input is logged and ignored; the
//! requester sees no state change and no error.

use tracing::warn;

use crate::execution::Execution;
use crate::game::player::{BomberIntent, PlayerId};
use crate::game::unit::UnitType;
use crate::game::{Game, Tick};

pub struct SetInvestmentRateExecution {
    player: PlayerId,
    rate: f64,
    active: bool,
}

impl SetInvestmentRateExecution {
    pub fn new(player: PlayerId, rate: f64) -> Self {
        Self {
            player,
            rate,
            active: true,
        }
    }
}

impl Execution for SetInvestmentRateExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        if !(0.0..=1.0).contains(&self.rate) {
            warn!(
                player = self.player.raw(),
                rate = self.rate,
                "invalid investment rate"
            );
        } else {
            game.player_mut(self.player).investment_rate = self.rate;
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

pub struct SetTargetTroopRatioExecution {
    player: PlayerId,
    ratio: f64,
    active: bool,
}

impl SetTargetTroopRatioExecution {
    pub fn new(player: PlayerId, ratio: f64) -> Self {
        Self {
            player,
            ratio,
            active: true,
        }
    }
}

impl Execution for SetTargetTroopRatioExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        if !(0.0..=1.0).contains(&self.ratio) {
            warn!(
                player = self.player.raw(),
                ratio = self.ratio,
                "invalid target troop ratio"
            );
        } else {
            game.player_mut(self.player).target_troop_ratio = self.ratio;
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Sets or clears a standing bomber order consumed by airfield dispatch.
pub struct BomberTargetExecution {
    player: PlayerId,
    target: Option<PlayerId>,
    structure: Option<UnitType>,
    active: bool,
}

impl BomberTargetExecution {
    pub fn new(player: PlayerId, target: Option<PlayerId>, structure: Option<UnitType>) -> Self {
        Self {
            player,
            target,
            structure,
            active: true,
        }
    }
}

impl Execution for BomberTargetExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        game.player_mut(self.player).bomber_intent = match (self.target, self.structure) {
            (Some(target), Some(structure)) => Some(BomberIntent { target, structure }),
            _ => None,
        };
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

pub struct AllianceRequestExecution {
    from: PlayerId,
    to: PlayerId,
    active: bool,
}

impl AllianceRequestExecution {
    pub fn new(from: PlayerId, to: PlayerId) -> Self {
        Self {
            from,
            to,
            active: true,
        }
    }
}

impl Execution for AllianceRequestExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        if !game.create_alliance_request(self.from, self.to) {
            warn!(
                from = self.from.raw(),
                to = self.to.raw(),
                "alliance request not possible"
            );
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

pub struct AllianceReplyExecution {
    evaluator: PlayerId,
    requestor: PlayerId,
    accept: bool,
    active: bool,
}

impl AllianceReplyExecution {
    pub fn new(evaluator: PlayerId, requestor: PlayerId, accept: bool) -> Self {
        Self {
            evaluator,
            requestor,
            accept,
            active: true,
        }
    }
}

impl Execution for AllianceReplyExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        game.resolve_alliance_request(self.requestor, self.evaluator, self.accept);
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

pub struct EmbargoExecution {
    player: PlayerId,
    against: PlayerId,
    stop: bool,
    active: bool,
}

impl EmbargoExecution {
    pub fn new(player: PlayerId, against: PlayerId, stop: bool) -> Self {
        Self {
            player,
            against,
            stop,
            active: true,
        }
    }
}

impl Execution for EmbargoExecution {
    fn init(&mut self, _game: &mut Game, _tick: Tick) {}

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        if self.player == self.against {
            warn!(player = self.player.raw(), "self-embargo ignored");
        } else if self.stop {
            game.stop_embargo(self.player, self.against);
        } else {
            game.add_embargo(self.player, self.against);
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
