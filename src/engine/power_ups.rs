use std::fmt;

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationError {
    OutOfBounds { row: usize, col: usize, size: usize },
}

impl fmt::Display for ActivationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationError::OutOfBounds { row, col, size } => {
                write!(f, "cell ({row}, {col}) is outside the {size}x{size} grid")
            }
        }
    }
}

impl std::error::Error for ActivationError {}

impl<S: GameStore> GameEngine<S> {
    /// Fires the power-up at (row, col) and clears that cell. Plain cells are a no-op
    /// returning `Ok(None)`; coordinates outside the grid are rejected untouched.
    pub fn activate_power_up(
        &mut self,
        row: usize,
        col: usize,
    ) -> Result<Option<PowerUp>, ActivationError> {
        if !self.grid.contains(row, col) {
            return Err(ActivationError::OutOfBounds {
                row,
                col,
                size: self.grid.size(),
            });
        }
        let Some(kind) = self.grid.content(row, col).power_up() else {
            return Ok(None);
        };

        apply_power_up(&mut self.grid, row, col, kind);
        self.grid.set_content(row, col, TileContent::Empty);
        self.emit(GameEvent::PowerUpActivated { row, col, kind });
        self.save_game_state();
        Ok(Some(kind))
    }
}

/// Applies the effect of `kind` as if fired from (row, col). DoubleTile doubles the
/// largest numeric neighbour (Up, Down, Left, Right wins ties) and does nothing without one.
pub fn apply_power_up(grid: &mut Grid, row: usize, col: usize, kind: PowerUp) {
    match kind {
        PowerUp::ClearRow => grid.clear_row(row),
        PowerUp::ClearColumn => grid.clear_column(col),
        PowerUp::DoubleTile => {
            if let Some((r, c, value)) = strongest_neighbour(grid, row, col) {
                grid.set_content(r, c, TileContent::Number(double_tile_value(value)));
            }
        }
    }
}

fn strongest_neighbour(grid: &Grid, row: usize, col: usize) -> Option<(usize, usize, u64)> {
    let mut best: Option<(usize, usize, u64)> = None;
    for dir in Direction::ALL {
        let Some((r, c)) = neighbour(grid.size(), row, col, dir) else {
            continue;
        };
        let Some(value) = grid.content(r, c).number() else {
            continue;
        };
        match best {
            Some((_, _, top)) if top >= value => {}
            _ => best = Some((r, c, value)),
        }
    }
    best
}

fn neighbour(size: usize, row: usize, col: usize, dir: Direction) -> Option<(usize, usize)> {
    let (r, c) = match dir {
        Direction::Up => (row.checked_sub(1)?, col),
        Direction::Down => (row + 1, col),
        Direction::Left => (row, col.checked_sub(1)?),
        Direction::Right => (row, col + 1),
    };
    (r < size && c < size).then_some((r, c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(value: u64) -> TileContent {
        TileContent::Number(value)
    }

    #[test]
    fn double_tile_without_numeric_neighbour_does_nothing() {
        let mut grid = Grid::from_contents(vec![
            vec![TileContent::PowerUp(PowerUp::DoubleTile), TileContent::Empty, n(8)],
            vec![TileContent::PowerUp(PowerUp::ClearRow), n(4), n(4)],
            vec![n(2), n(2), n(2)],
        ])
        .expect("square grid");
        let before = grid.clone();
        apply_power_up(&mut grid, 0, 0, PowerUp::DoubleTile);
        assert_eq!(grid, before);
    }

    #[test]
    fn double_tile_at_corner_only_sees_in_grid_neighbours() {
        let mut grid = Grid::from_contents(vec![
            vec![n(2), n(4), TileContent::Empty],
            vec![n(32), TileContent::Empty, TileContent::Empty],
            vec![TileContent::Empty; 3],
        ])
        .expect("square grid");
        apply_power_up(&mut grid, 0, 0, PowerUp::DoubleTile);
        assert_eq!(grid.content(1, 0), n(64));
        assert_eq!(grid.content(0, 1), n(4));
    }

    #[test]
    fn neighbour_respects_edges() {
        assert_eq!(neighbour(3, 0, 0, Direction::Up), None);
        assert_eq!(neighbour(3, 0, 0, Direction::Left), None);
        assert_eq!(neighbour(3, 2, 2, Direction::Down), None);
        assert_eq!(neighbour(3, 2, 2, Direction::Right), None);
        assert_eq!(neighbour(3, 1, 1, Direction::Right), Some((1, 2)));
    }

    #[test]
    fn out_of_bounds_error_names_the_cell() {
        let error = ActivationError::OutOfBounds {
            row: 4,
            col: 0,
            size: 3,
        };
        assert_eq!(error.to_string(), "cell (4, 0) is outside the 3x3 grid");
    }
}
