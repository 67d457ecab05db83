use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::constants::{
    double_tile_value, get_spawn_value, is_power_up_move, BEST_SCORE_KEY, CURRENT_SCORE_KEY,
    GRID_KEY, GRID_SIZE, MAX_PENDING_EVENTS, MOVES_KEY, PERSISTED_KEYS, POWER_UP_INTERVAL,
    SPAWN_ROLL_SPAN, STARTER_TILES,
};
use crate::grid::Grid;
use crate::rng::Rng;
use crate::score::ScoreTracker;
use crate::store::GameStore;
use crate::types::{
    Direction, EngineState, GameEvent, GameSnapshot, PowerUp, SwipeOutcome, TileContent,
};

mod persistence;
mod power_ups;
mod spawn_system;

pub use self::power_ups::{apply_power_up, ActivationError};
pub use self::spawn_system::{spawn_power_up, spawn_tile};

use self::persistence::{decode_grid, encode_grid, read_count};

/// Receives every engine event synchronously, in emission order.
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> GameObserver for F
where
    F: FnMut(&GameEvent),
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

#[derive(Clone, Debug)]
pub struct GameEngineOptions {
    pub grid_size: usize,
    pub seed: Option<u32>,
    pub power_up_interval: u64,
    /// When false, a swipe that moves nothing does not spawn, count, or save.
    pub spawn_on_unchanged_move: bool,
}

impl Default for GameEngineOptions {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            seed: None,
            power_up_interval: POWER_UP_INTERVAL,
            spawn_on_unchanged_move: true,
        }
    }
}

pub type SharedEngine<S> = Arc<Mutex<GameEngine<S>>>;

pub struct GameEngine<S: GameStore> {
    pub seed: u32,
    options: GameEngineOptions,
    store: S,
    rng: Rng,
    grid: Grid,
    score: ScoreTracker,
    moves: u64,
    state: EngineState,
    events: Vec<GameEvent>,
    observers: Vec<Box<dyn GameObserver + Send>>,
}

impl<S: GameStore> GameEngine<S> {
    /// Creates an engine over `store`, restoring the saved game or starting a fresh one.
    pub fn new(store: S, options: GameEngineOptions) -> Self {
        let seed = options.seed.unwrap_or_else(rand::random);
        let options = GameEngineOptions {
            grid_size: options.grid_size.max(1),
            ..options
        };
        let mut engine = Self {
            seed,
            grid: Grid::new(options.grid_size),
            options,
            store,
            rng: Rng::new(seed),
            score: ScoreTracker::default(),
            moves: 0,
            state: EngineState::Uninitialized,
            events: Vec::new(),
            observers: Vec::new(),
        };
        engine.load_game_state();
        engine
    }

    pub fn into_shared(self) -> SharedEngine<S> {
        Arc::new(Mutex::new(self))
    }

    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: GameObserver + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn current_score(&self) -> u64 {
        self.score.current()
    }

    pub fn best_score(&self) -> u64 {
        self.score.best()
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn options(&self) -> &GameEngineOptions {
        &self.options
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Starts a fresh game: zero score and moves, empty saved state, two starter tiles.
    pub fn setup_game(&mut self) {
        self.score.reset();
        self.moves = 0;
        self.clear_saved_state();
        self.grid = Grid::new(self.options.grid_size);
        self.state = EngineState::Ready;
        self.emit(GameEvent::GameReset);
        for _ in 0..STARTER_TILES {
            self.add_random_tile();
        }
        self.save_game_state();
    }

    /// Restores the saved game. Falls back to `setup_game` when the saved grid is
    /// missing or malformed; returns whether a saved game was restored.
    pub fn load_game_state(&mut self) -> bool {
        let best = read_count(&self.store, BEST_SCORE_KEY).max(self.score.best());
        let saved = self.store.get(GRID_KEY);
        let restored = saved
            .as_ref()
            .and_then(|value| decode_grid(value, self.options.grid_size));
        let Some(grid) = restored else {
            if saved.is_some() {
                eprintln!("[engine] discarding malformed saved grid, starting a new game");
            }
            self.score = ScoreTracker::new(0, best);
            self.setup_game();
            return false;
        };

        self.grid = grid;
        self.score = ScoreTracker::new(read_count(&self.store, CURRENT_SCORE_KEY), best);
        self.moves = read_count(&self.store, MOVES_KEY);
        self.state = EngineState::Ready;
        self.emit(GameEvent::StateRestored { moves: self.moves });
        true
    }

    pub fn save_game_state(&mut self) {
        self.store.set(GRID_KEY, encode_grid(&self.grid));
        self.store.set(CURRENT_SCORE_KEY, json!(self.score.current()));
        self.store.set(BEST_SCORE_KEY, json!(self.score.best()));
        self.store.set(MOVES_KEY, json!(self.moves));
    }

    pub fn clear_saved_state(&mut self) {
        for key in PERSISTED_KEYS {
            self.store.remove(key);
        }
    }

    pub fn swipe(&mut self, dir: Direction) -> SwipeOutcome {
        let shift = self.grid.shift(dir);
        if !shift.changed && !self.options.spawn_on_unchanged_move {
            return SwipeOutcome::default();
        }

        if !shift.merges.is_empty() {
            self.emit(GameEvent::TilesMerged {
                merges: shift.merges.clone(),
            });
            for merge in &shift.merges {
                self.apply_merge(merge.value);
            }
        }

        let spawned = self.add_random_tile();
        self.moves = self.moves.saturating_add(1);
        let power_up_spawned = if is_power_up_move(self.moves, self.options.power_up_interval) {
            self.add_random_power_up()
        } else {
            None
        };
        self.save_game_state();

        SwipeOutcome {
            merges: shift.merges,
            changed: shift.changed,
            spawned,
            power_up_spawned,
        }
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> GameSnapshot {
        let snapshot = GameSnapshot {
            size: self.grid.size(),
            tiles: self.grid.rows().to_vec(),
            current_score: self.score.current(),
            best_score: self.score.best(),
            moves: self.moves,
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    fn apply_merge(&mut self, value: u64) {
        let raised = self.score.apply_merge(value);
        self.emit(GameEvent::ScoreChanged {
            current_score: self.score.current(),
        });
        if raised {
            self.store.set(BEST_SCORE_KEY, json!(self.score.best()));
            self.emit(GameEvent::BestScoreRaised {
                best_score: self.score.best(),
            });
        }
    }

    fn emit(&mut self, event: GameEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
        self.events.push(event);
        if self.events.len() > MAX_PENDING_EVENTS {
            let overflow = self.events.len() - MAX_PENDING_EVENTS;
            self.events.drain(..overflow);
        }
    }
}
