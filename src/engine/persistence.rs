use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{MAX_TILE_VALUE, POWER_UP_SENTINEL};
use crate::grid::Grid;
use crate::store::GameStore;
use crate::types::{PowerUp, TileContent};

/// One cell of the saved `gameGrid` value. Power-ups are written as the -1
/// sentinel plus `kind`; saves without `kind` come back as `ClearRow`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct PersistedTile {
    content: i64,
    row: usize,
    col: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<PowerUp>,
}

pub(super) fn encode_grid(grid: &Grid) -> Value {
    let rows: Vec<Vec<PersistedTile>> = grid
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|tile| {
                    let (content, kind) = match tile.content {
                        TileContent::Empty => (0, None),
                        // Merges and doubling never exceed MAX_TILE_VALUE, so this always fits.
                        TileContent::Number(value) => {
                            (value.min(MAX_TILE_VALUE) as i64, None)
                        }
                        TileContent::PowerUp(kind) => (POWER_UP_SENTINEL, Some(kind)),
                    };
                    PersistedTile {
                        content,
                        row: tile.row,
                        col: tile.col,
                        kind,
                    }
                })
                .collect()
        })
        .collect();
    serde_json::to_value(rows).unwrap_or(Value::Null)
}

/// Rebuilds a grid of `size` from a saved value. Any deviation from the
/// expected shape yields `None`.
pub(super) fn decode_grid(value: &Value, size: usize) -> Option<Grid> {
    let rows: Vec<Vec<PersistedTile>> = serde_json::from_value(value.clone()).ok()?;
    if rows.len() != size {
        return None;
    }
    let mut contents = Vec::with_capacity(size);
    for (row_idx, row) in rows.into_iter().enumerate() {
        if row.len() != size {
            return None;
        }
        let mut line = Vec::with_capacity(size);
        for (col_idx, record) in row.into_iter().enumerate() {
            if record.row != row_idx || record.col != col_idx {
                return None;
            }
            line.push(decode_content(&record)?);
        }
        contents.push(line);
    }
    Grid::from_contents(contents)
}

fn decode_content(record: &PersistedTile) -> Option<TileContent> {
    match record.content {
        POWER_UP_SENTINEL => Some(TileContent::PowerUp(
            record.kind.unwrap_or(PowerUp::ClearRow),
        )),
        0 => Some(TileContent::Empty),
        value if value > 0 => Some(TileContent::Number(value as u64)),
        _ => None,
    }
}

/// Non-negative integer under `key`, or 0 when absent or not a count.
pub(super) fn read_count<S: GameStore>(store: &S, key: &str) -> u64 {
    store
        .get(key)
        .and_then(|value| value.as_u64())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn record(content: i64, row: usize, col: usize) -> Value {
        json!({ "content": content, "row": row, "col": col })
    }

    fn empty_save(size: usize) -> Vec<Vec<Value>> {
        (0..size)
            .map(|row| (0..size).map(|col| record(0, row, col)).collect())
            .collect()
    }

    #[test]
    fn encode_writes_sentinel_and_kind_for_power_ups() {
        let mut grid = Grid::new(3);
        grid.set_content(0, 1, TileContent::Number(8));
        grid.set_content(2, 0, TileContent::PowerUp(PowerUp::DoubleTile));
        let value = encode_grid(&grid);

        assert_eq!(value[0][1], json!({ "content": 8, "row": 0, "col": 1 }));
        assert_eq!(
            value[2][0],
            json!({ "content": -1, "row": 2, "col": 0, "kind": "double_tile" })
        );
        assert_eq!(value[1][1], json!({ "content": 0, "row": 1, "col": 1 }));
        assert_eq!(decode_grid(&value, 3), Some(grid));
    }

    #[test]
    fn max_tile_value_survives_save_and_load() {
        let mut grid = Grid::new(2);
        grid.set_content(1, 0, TileContent::Number(MAX_TILE_VALUE));
        let value = encode_grid(&grid);
        assert_eq!(value[1][0]["content"], json!(i64::MAX));
        assert_eq!(decode_grid(&value, 2), Some(grid));
    }

    #[test]
    fn decode_rejects_wrong_dimensions() {
        assert!(decode_grid(&json!(empty_save(2)), 3).is_none());
        let mut ragged = empty_save(3);
        ragged[1].pop();
        assert!(decode_grid(&json!(ragged), 3).is_none());
        assert!(decode_grid(&json!("grid"), 3).is_none());
    }

    #[test]
    fn decode_rejects_misplaced_or_invalid_records() {
        let mut misplaced = empty_save(3);
        misplaced[0][0] = record(2, 1, 1);
        assert!(decode_grid(&json!(misplaced), 3).is_none());

        let mut negative = empty_save(3);
        negative[2][2] = record(-7, 2, 2);
        assert!(decode_grid(&json!(negative), 3).is_none());

        let mut unknown_kind = empty_save(3);
        unknown_kind[0][0] = json!({ "content": -1, "row": 0, "col": 0, "kind": "explode" });
        assert!(decode_grid(&json!(unknown_kind), 3).is_none());

        let mut missing_field = empty_save(3);
        missing_field[0][0] = json!({ "content": 2, "row": 0 });
        assert!(decode_grid(&json!(missing_field), 3).is_none());
    }

    #[test]
    fn read_count_defaults_to_zero() {
        let mut store = MemoryStore::new();
        assert_eq!(read_count(&store, "moves"), 0);
        store.set("moves", json!(-3));
        assert_eq!(read_count(&store, "moves"), 0);
        store.set("moves", json!("five"));
        assert_eq!(read_count(&store, "moves"), 0);
        store.set("moves", json!(5));
        assert_eq!(read_count(&store, "moves"), 5);
    }
}
