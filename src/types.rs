use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUp {
    ClearRow,
    ClearColumn,
    DoubleTile,
}

impl PowerUp {
    pub const ALL: [PowerUp; 3] = [PowerUp::ClearRow, PowerUp::ClearColumn, PowerUp::DoubleTile];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TileContent {
    #[default]
    Empty,
    Number(u64),
    PowerUp(PowerUp),
}

impl TileContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, TileContent::Empty)
    }

    pub fn number(&self) -> Option<u64> {
        match self {
            TileContent::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn power_up(&self) -> Option<PowerUp> {
        match self {
            TileContent::PowerUp(kind) => Some(*kind),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub content: TileContent,
    pub row: usize,
    pub col: usize,
}

impl Tile {
    pub fn empty(row: usize, col: usize) -> Self {
        Self {
            content: TileContent::Empty,
            row,
            col,
        }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MergeEvent {
    /// Value of the tile the merge produced.
    pub value: u64,
    pub row: usize,
    pub col: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameReset,
    StateRestored {
        moves: u64,
    },
    TilesMerged {
        merges: Vec<MergeEvent>,
    },
    TileSpawned {
        row: usize,
        col: usize,
        value: u64,
    },
    PowerUpSpawned {
        row: usize,
        col: usize,
        kind: PowerUp,
    },
    PowerUpActivated {
        row: usize,
        col: usize,
        kind: PowerUp,
    },
    ScoreChanged {
        #[serde(rename = "currentScore")]
        current_score: u64,
    },
    BestScoreRaised {
        #[serde(rename = "bestScore")]
        best_score: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Uninitialized,
    Ready,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SwipeOutcome {
    pub merges: Vec<MergeEvent>,
    pub changed: bool,
    pub spawned: Option<(usize, usize)>,
    #[serde(rename = "powerUpSpawned")]
    pub power_up_spawned: Option<(usize, usize)>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSnapshot {
    pub size: usize,
    pub tiles: Vec<Vec<Tile>>,
    #[serde(rename = "currentScore")]
    pub current_score: u64,
    #[serde(rename = "bestScore")]
    pub best_score: u64,
    pub moves: u64,
    pub events: Vec<GameEvent>,
}
