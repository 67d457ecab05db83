use crate::constants::double_tile_value;
use crate::types::{Direction, MergeEvent, Tile, TileContent};

/// Result of sliding every line of the grid once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShiftOutcome {
    pub merges: Vec<MergeEvent>,
    pub changed: bool,
}

/// Square board of tiles. Each tile's `row`/`col` always equals its slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    cells: Vec<Vec<Tile>>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        let cells = (0..size)
            .map(|row| (0..size).map(|col| Tile::empty(row, col)).collect())
            .collect();
        Self { size, cells }
    }

    /// Builds a grid from row-major contents. Returns `None` unless the input is square.
    pub fn from_contents(rows: Vec<Vec<TileContent>>) -> Option<Self> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|row| row.len() != size) {
            return None;
        }
        let cells = rows
            .into_iter()
            .enumerate()
            .map(|(row, line)| {
                line.into_iter()
                    .enumerate()
                    .map(|(col, content)| Tile { content, row, col })
                    .collect()
            })
            .collect();
        Some(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn rows(&self) -> &[Vec<Tile>] {
        &self.cells
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        self.cells.get(row).and_then(|line| line.get(col))
    }

    pub fn content(&self, row: usize, col: usize) -> TileContent {
        self.tile(row, col)
            .map(|tile| tile.content)
            .unwrap_or_default()
    }

    pub fn set_content(&mut self, row: usize, col: usize, content: TileContent) {
        if let Some(tile) = self.cells.get_mut(row).and_then(|line| line.get_mut(col)) {
            tile.content = content;
        }
    }

    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .flatten()
            .filter(|tile| tile.content.is_empty())
            .map(Tile::position)
            .collect()
    }

    pub fn count_power_ups(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|tile| tile.content.power_up().is_some())
            .count()
    }

    pub fn clear_row(&mut self, row: usize) {
        if let Some(line) = self.cells.get_mut(row) {
            for tile in line {
                tile.content = TileContent::Empty;
            }
        }
    }

    pub fn clear_column(&mut self, col: usize) {
        for line in &mut self.cells {
            if let Some(tile) = line.get_mut(col) {
                tile.content = TileContent::Empty;
            }
        }
    }

    /// Slides every line toward `dir`, merging equal numeric neighbours once per move.
    pub fn shift(&mut self, dir: Direction) -> ShiftOutcome {
        let mut outcome = ShiftOutcome::default();
        for index in 0..self.size {
            let slots = line_slots(self.size, dir, index);
            let before: Vec<TileContent> = slots
                .iter()
                .map(|&(row, col)| self.cells[row][col].content)
                .collect();
            let (after, merged_at) = collapse_line(&before);
            if after != before {
                outcome.changed = true;
            }
            for (offset, value) in merged_at {
                let (row, col) = slots[offset];
                outcome.merges.push(MergeEvent { value, row, col });
            }
            self.write_line(&slots, after);
        }
        outcome
    }

    fn write_line(&mut self, slots: &[(usize, usize)], line: Vec<TileContent>) {
        for (&(row, col), content) in slots.iter().zip(line) {
            self.cells[row][col] = Tile { content, row, col };
        }
    }
}

/// Cells of one line listed in forward order: the first slot is the wall tiles move toward.
fn line_slots(size: usize, dir: Direction, index: usize) -> Vec<(usize, usize)> {
    (0..size)
        .map(|step| match dir {
            Direction::Left => (index, step),
            Direction::Right => (index, size - 1 - step),
            Direction::Up => (step, index),
            Direction::Down => (size - 1 - step, index),
        })
        .collect()
}

/// Compacts a forward-ordered line, merges adjacent equal numbers in one forward pass,
/// then compacts again and pads with empties. Returns the new line and the
/// (offset, value) of every merged tile.
pub(crate) fn collapse_line(line: &[TileContent]) -> (Vec<TileContent>, Vec<(usize, u64)>) {
    let mut packed: Vec<TileContent> = line.iter().copied().filter(|c| !c.is_empty()).collect();
    let mut merged = vec![false; packed.len()];
    for i in 0..packed.len().saturating_sub(1) {
        if let (TileContent::Number(a), TileContent::Number(b)) = (packed[i], packed[i + 1]) {
            if a == b {
                packed[i] = TileContent::Number(double_tile_value(a));
                packed[i + 1] = TileContent::Empty;
                merged[i] = true;
            }
        }
    }

    let mut out = Vec::with_capacity(line.len());
    let mut merges = Vec::new();
    for (content, was_merged) in packed.into_iter().zip(merged) {
        if content.is_empty() {
            continue;
        }
        if was_merged {
            if let TileContent::Number(value) = content {
                merges.push((out.len(), value));
            }
        }
        out.push(content);
    }
    out.resize(line.len(), TileContent::Empty);
    (out, merges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerUp;

    const E: TileContent = TileContent::Empty;

    fn n(value: u64) -> TileContent {
        TileContent::Number(value)
    }

    fn grid_of(rows: &[[u64; 3]]) -> Grid {
        Grid::from_contents(
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|v| if *v == 0 { E } else { n(*v) })
                        .collect()
                })
                .collect(),
        )
        .expect("square grid")
    }

    fn values(grid: &Grid) -> Vec<Vec<u64>> {
        grid.rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|tile| tile.content.number().unwrap_or(0))
                    .collect()
            })
            .collect()
    }

    fn assert_positions_match_slots(grid: &Grid) {
        for (r, row) in grid.rows().iter().enumerate() {
            for (c, tile) in row.iter().enumerate() {
                assert_eq!(tile.position(), (r, c));
            }
        }
    }

    #[test]
    fn three_equal_tiles_merge_only_leading_pair() {
        let (line, merges) = collapse_line(&[n(2), n(2), n(2)]);
        assert_eq!(line, vec![n(4), n(2), E]);
        assert_eq!(merges, vec![(0, 4)]);
    }

    #[test]
    fn four_equal_tiles_merge_into_two_pairs() {
        let (line, merges) = collapse_line(&[n(2), n(2), n(2), n(2)]);
        assert_eq!(line, vec![n(4), n(4), E, E]);
        assert_eq!(merges, vec![(0, 4), (1, 4)]);
    }

    #[test]
    fn merged_tile_is_not_merged_again() {
        let (line, merges) = collapse_line(&[n(4), n(2), n(2)]);
        assert_eq!(line, vec![n(4), n(4), E]);
        assert_eq!(merges.len(), 1);
    }

    #[test]
    fn power_up_blocks_merge_but_still_slides() {
        let boost = TileContent::PowerUp(PowerUp::DoubleTile);
        let (line, merges) = collapse_line(&[n(2), boost, n(2)]);
        assert_eq!(line, vec![n(2), boost, n(2)]);
        assert!(merges.is_empty());

        let (line, _) = collapse_line(&[E, boost, E]);
        assert_eq!(line, vec![boost, E, E]);
    }

    #[test]
    fn shift_left_and_right_use_motion_as_forward() {
        let mut left = grid_of(&[[2, 2, 2], [0, 4, 4], [8, 0, 8]]);
        let outcome = left.shift(Direction::Left);
        assert_eq!(values(&left), vec![vec![4, 2, 0], vec![8, 0, 0], vec![16, 0, 0]]);
        assert_eq!(outcome.merges.len(), 3);
        assert!(outcome.changed);

        let mut right = grid_of(&[[2, 2, 2], [0, 4, 4], [8, 0, 8]]);
        right.shift(Direction::Right);
        assert_eq!(values(&right), vec![vec![0, 2, 4], vec![0, 0, 8], vec![0, 0, 16]]);
        assert_positions_match_slots(&right);
    }

    #[test]
    fn shift_up_and_down_use_motion_as_forward() {
        let mut up = grid_of(&[[2, 0, 4], [2, 0, 0], [2, 8, 4]]);
        up.shift(Direction::Up);
        assert_eq!(values(&up), vec![vec![4, 8, 8], vec![2, 0, 0], vec![0, 0, 0]]);

        let mut down = grid_of(&[[2, 0, 4], [2, 0, 0], [2, 8, 4]]);
        let outcome = down.shift(Direction::Down);
        assert_eq!(values(&down), vec![vec![0, 0, 0], vec![2, 0, 0], vec![4, 8, 8]]);
        assert_eq!(
            outcome.merges,
            vec![
                MergeEvent { value: 4, row: 2, col: 0 },
                MergeEvent { value: 8, row: 2, col: 2 },
            ]
        );
        assert_positions_match_slots(&down);
    }

    #[test]
    fn merge_event_reports_landing_cell() {
        let mut grid = grid_of(&[[0, 0, 0], [0, 2, 2], [0, 0, 0]]);
        let outcome = grid.shift(Direction::Left);
        assert_eq!(outcome.merges, vec![MergeEvent { value: 4, row: 1, col: 0 }]);
        assert_eq!(grid.content(1, 0), n(4));
    }

    #[test]
    fn blocked_shift_reports_unchanged() {
        let mut grid = grid_of(&[[2, 4, 8], [4, 8, 2], [0, 0, 0]]);
        let outcome = grid.shift(Direction::Left);
        assert!(!outcome.changed);
        assert!(outcome.merges.is_empty());
        assert_eq!(values(&grid), vec![vec![2, 4, 8], vec![4, 8, 2], vec![0, 0, 0]]);
    }

    #[test]
    fn no_adjacent_equal_pairs_survive_from_before_the_move() {
        let mut grid = grid_of(&[[2, 2, 4], [4, 4, 4], [8, 8, 8]]);
        let outcome = grid.shift(Direction::Left);
        assert_eq!(values(&grid), vec![vec![4, 4, 0], vec![8, 4, 0], vec![16, 8, 0]]);
        let gained: u64 = outcome.merges.iter().map(|m| m.value).sum();
        assert_eq!(gained, 4 + 8 + 16);
    }

    #[test]
    fn clear_row_and_column_empty_their_cells() {
        let mut grid = grid_of(&[[2, 4, 8], [2, 4, 8], [2, 4, 8]]);
        grid.clear_row(1);
        assert_eq!(values(&grid)[1], vec![0, 0, 0]);
        grid.clear_column(2);
        assert!(grid.rows().iter().all(|row| row[2].content.is_empty()));
        assert_eq!(grid.empty_cells().len(), 5);
    }

    #[test]
    fn merging_at_max_tile_value_holds_at_cap() {
        use crate::constants::MAX_TILE_VALUE;
        let (line, merges) = collapse_line(&[n(MAX_TILE_VALUE), n(MAX_TILE_VALUE), E]);
        assert_eq!(line, vec![n(MAX_TILE_VALUE), E, E]);
        assert_eq!(merges, vec![(0, MAX_TILE_VALUE)]);
    }

    #[test]
    fn from_contents_rejects_ragged_input() {
        assert!(Grid::from_contents(vec![vec![E, E], vec![E]]).is_none());
        assert!(Grid::from_contents(Vec::new()).is_none());
    }

    #[test]
    fn out_of_range_access_is_harmless() {
        let mut grid = Grid::new(3);
        grid.set_content(5, 5, n(2));
        grid.clear_row(9);
        grid.clear_column(9);
        assert_eq!(grid.content(7, 0), E);
        assert_eq!(grid.empty_cells().len(), 9);
    }
}
