//! Tick scheduler.
//!
//! Drives every registered [`Execution`] in insertion order: tasks queued
//! since the last advance are initialized first, active tasks matching the
//! current phase are ticked, and tasks whose active predicate has gone false
//! are dropped. Tasks registered from inside a tick land in the world's
//! deferred queue and are initialized at the start of the *next* advance,
//! never re-entrantly.

use crate::execution::Execution;
use crate::game::Game;

#[derive(Default)]
pub struct Executor {
    active: Vec<Box<dyn Execution>>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a task for initialization on the next advance.
    pub fn register(&mut self, game: &mut Game, execution: Box<dyn Execution>) {
        game.add_execution(execution);
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Runs one full scheduler cycle against the current tick.
    pub fn advance(&mut self, game: &mut Game) {
        let tick = game.tick();

        let mut fresh = game.take_pending_executions();
        for task in fresh.iter_mut() {
            task.init(game, tick);
        }
        self.active.append(&mut fresh);

        let in_spawn_phase = game.in_spawn_phase();
        for task in self.active.iter_mut() {
            if !task.is_active() {
                continue;
            }
            if in_spawn_phase && !task.active_during_spawn_phase() {
                continue;
            }
            task.tick(game, tick);
        }

        self.active.retain(|task| task.is_active());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{Game, Tick};
    use crate::map::{GameMap, TerrainType};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn empty_game(spawn_phase_ticks: u64) -> Game {
        let map = GameMap::new(4, 4, vec![TerrainType::Plains; 16]);
        Game::new(map, GameConfig::default(), spawn_phase_ticks, 1)
    }

    struct Probe {
        inits: Arc<AtomicU32>,
        ticks: Arc<AtomicU32>,
        lifetime: u32,
        spawn_phase: bool,
        spawns_child: bool,
    }

    impl Execution for Probe {
        fn init(&mut self, _game: &mut Game, _tick: Tick) {
            self.inits.fetch_add(1, Ordering::SeqCst);
        }

        fn tick(&mut self, game: &mut Game, _tick: Tick) {
            self.ticks.fetch_add(1, Ordering::SeqCst);
            if self.spawns_child {
                self.spawns_child = false;
                game.add_execution(Box::new(Probe {
                    inits: self.inits.clone(),
                    ticks: self.ticks.clone(),
                    lifetime: 1,
                    spawn_phase: false,
                    spawns_child: false,
                }));
            }
            self.lifetime = self.lifetime.saturating_sub(1);
        }

        fn is_active(&self) -> bool {
            self.lifetime > 0
        }

        fn active_during_spawn_phase(&self) -> bool {
            self.spawn_phase
        }
    }

    #[test]
    fn init_runs_once_then_task_retires() {
        let inits = Arc::new(AtomicU32::new(0));
        let ticks = Arc::new(AtomicU32::new(0));
        let mut game = empty_game(0);
        let mut executor = Executor::new();
        game.add_execution(Box::new(Probe {
            inits: inits.clone(),
            ticks: ticks.clone(),
            lifetime: 2,
            spawn_phase: false,
            spawns_child: false,
        }));

        for _ in 0..5 {
            executor.advance(&mut game);
            game.advance_tick();
        }
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert_eq!(executor.active_count(), 0);
    }

    #[test]
    fn spawn_phase_filters_tasks() {
        let inits = Arc::new(AtomicU32::new(0));
        let ticks = Arc::new(AtomicU32::new(0));
        let mut game = empty_game(3);
        let mut executor = Executor::new();
        game.add_execution(Box::new(Probe {
            inits: inits.clone(),
            ticks: ticks.clone(),
            lifetime: 100,
            spawn_phase: false,
            spawns_child: false,
        }));

        // Three advances inside the spawn phase: initialized but never ticked.
        for _ in 0..3 {
            executor.advance(&mut game);
            game.advance_tick();
        }
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        executor.advance(&mut game);
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn child_tasks_initialize_on_the_next_advance() {
        let inits = Arc::new(AtomicU32::new(0));
        let ticks = Arc::new(AtomicU32::new(0));
        let mut game = empty_game(0);
        let mut executor = Executor::new();
        game.add_execution(Box::new(Probe {
            inits: inits.clone(),
            ticks: ticks.clone(),
            lifetime: 1,
            spawn_phase: false,
            spawns_child: true,
        }));

        executor.advance(&mut game);
        game.advance_tick();
        // Parent initialized and ticked; child still pending.
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        executor.advance(&mut game);
        game.advance_tick();
        assert_eq!(inits.load(Ordering::SeqCst), 2);
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }
}
