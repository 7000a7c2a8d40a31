//! Nation placement during the spawn phase.

use tracing::warn;

use crate::execution::Execution;
use crate::game::player::PlayerId;
use crate::game::{Game, Tick};
use crate::map::TileRef;
use crate::rng::GameRng;

const PLACEMENT_DELTA: i64 = 25;
const PLACEMENT_TRIES: u32 = 50;

/// Claims starting territory for one player. A `None` tile means "search for
/// open land near the player's home cell", used by autonomous nations; human
/// intents carry an exact tile.
pub struct SpawnExecution {
    player: PlayerId,
    tile: Option<TileRef>,
    rng: Option<GameRng>,
    active: bool,
}

impl SpawnExecution {
    pub fn new(player: PlayerId, tile: Option<TileRef>) -> Self {
        Self {
            player,
            tile,
            rng: None,
            active: true,
        }
    }

    fn random_land(&mut self, game: &Game) -> Option<TileRef> {
        let rng = self.rng.as_mut().expect("execution ticked before init");
        let map = game.map();
        let home = game.player(self.player).home_cell;
        let (hx, hy) = (i64::from(map.x(home)), i64::from(map.y(home)));
        for _ in 0..PLACEMENT_TRIES {
            let x = rng.next_int(hx - PLACEMENT_DELTA, hx + PLACEMENT_DELTA);
            let y = rng.next_int(hy - PLACEMENT_DELTA, hy + PLACEMENT_DELTA);
            if !map.is_valid_coord(x, y) {
                continue;
            }
            let tile = map.tile(x as u32, y as u32);
            if !map.is_land(tile) || game.has_owner(tile) {
                continue;
            }
            // Mountains are a poor capital half the time.
            if map.terrain(tile) == crate::map::TerrainType::Mountain && rng.chance(2) {
                continue;
            }
            return Some(tile);
        }
        None
    }
}

impl Execution for SpawnExecution {
    fn init(&mut self, game: &mut Game, _tick: Tick) {
        let name = game.player(self.player).name.clone();
        self.rng = Some(GameRng::for_actor(game.seed(), &name));
    }

    fn tick(&mut self, game: &mut Game, _tick: Tick) {
        if !game.in_spawn_phase() {
            warn!(player = self.player.raw(), "spawn requested after the spawn phase");
            self.active = false;
            return;
        }
        if game.player(self.player).spawned {
            self.active = false;
            return;
        }
        let tile = match self.tile {
            Some(tile) => Some(tile),
            None => self.random_land(game),
        };
        match tile {
            Some(tile) if game.spawn_player(self.player, tile) => {
                self.active = false;
            }
            Some(tile) => {
                warn!(player = self.player.raw(), tile, "spawn tile rejected");
                self.active = false;
            }
            // Keep searching on later ticks while the phase lasts.
            None => {}
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn active_during_spawn_phase(&self) -> bool {
        true
    }
}
