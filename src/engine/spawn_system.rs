use super::*;

impl<S: GameStore> GameEngine<S> {
    pub fn add_random_tile(&mut self) -> Option<(usize, usize)> {
        let (row, col, value) = spawn_tile(&mut self.grid, &mut self.rng)?;
        self.emit(GameEvent::TileSpawned { row, col, value });
        Some((row, col))
    }

    pub fn add_random_power_up(&mut self) -> Option<(usize, usize)> {
        let (row, col, kind) = spawn_power_up(&mut self.grid, &mut self.rng)?;
        self.emit(GameEvent::PowerUpSpawned { row, col, kind });
        Some((row, col))
    }
}

fn pick_empty_cell(grid: &Grid, rng: &mut Rng) -> Option<(usize, usize)> {
    let empty = grid.empty_cells();
    rng.pick(&empty).copied()
}

/// Puts a 2 (90%) or a 4 on a uniformly chosen empty cell. Full grids are left alone.
pub fn spawn_tile(grid: &mut Grid, rng: &mut Rng) -> Option<(usize, usize, u64)> {
    let (row, col) = pick_empty_cell(grid, rng)?;
    let value = get_spawn_value(rng.below(SPAWN_ROLL_SPAN));
    grid.set_content(row, col, TileContent::Number(value));
    Some((row, col, value))
}

pub fn spawn_power_up(grid: &mut Grid, rng: &mut Rng) -> Option<(usize, usize, PowerUp)> {
    let (row, col) = pick_empty_cell(grid, rng)?;
    let kind = *rng.pick(&PowerUp::ALL)?;
    grid.set_content(row, col, TileContent::PowerUp(kind));
    Some((row, col, kind))
}
