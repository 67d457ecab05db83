pub const GRID_SIZE: usize = 3;
pub const STARTER_TILES: usize = 2;
pub const POWER_UP_INTERVAL: u64 = 5;

pub const SPAWN_ROLL_SPAN: u32 = 10;
pub const SPAWN_FOUR_THRESHOLD: u32 = 9;

pub const MAX_PENDING_EVENTS: usize = 128;

/// Largest tile value; it still fits the signed integers the saved grid uses.
pub const MAX_TILE_VALUE: u64 = i64::MAX as u64;

/// Doubles a tile value, holding at `MAX_TILE_VALUE`.
pub fn double_tile_value(value: u64) -> u64 {
    value.saturating_mul(2).min(MAX_TILE_VALUE)
}

pub const GRID_KEY: &str = "gameGrid";
pub const CURRENT_SCORE_KEY: &str = "currentScore";
pub const BEST_SCORE_KEY: &str = "bestScore";
pub const MOVES_KEY: &str = "moves";
pub const PERSISTED_KEYS: [&str; 4] = [GRID_KEY, CURRENT_SCORE_KEY, BEST_SCORE_KEY, MOVES_KEY];

pub const POWER_UP_SENTINEL: i64 = -1;
pub const STORE_FILE_VERSION: u8 = 1;

/// Value of a freshly spawned numeric tile for a roll drawn from `[0, SPAWN_ROLL_SPAN)`.
pub fn get_spawn_value(roll: u32) -> u64 {
    if roll < SPAWN_FOUR_THRESHOLD {
        return 2;
    }
    4
}

/// Whether the move counter has just reached a power-up spawn.
pub fn is_power_up_move(moves: u64, interval: u64) -> bool {
    if interval == 0 || moves == 0 {
        return false;
    }
    moves.is_multiple_of(interval)
}
