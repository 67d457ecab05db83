use clap::Parser;
use powerplay_engine::constants::GRID_SIZE;
use powerplay_engine::engine::{GameEngine, GameEngineOptions};
use powerplay_engine::rng::Rng;
use powerplay_engine::store::{FileStore, GameStore, MemoryStore};
use powerplay_engine::types::{Direction, GameEvent, GameSnapshot, TileContent};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    games: Option<i64>,
    #[arg(long)]
    moves: Option<i64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    size: Option<i64>,
    #[arg(long)]
    store: Option<PathBuf>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    moves: u32,
    size: usize,
}

#[derive(Clone, Debug, Serialize)]
struct GameResultLine {
    game: String,
    seed: u32,
    size: usize,
    moves: u64,
    #[serde(rename = "finalScore")]
    final_score: u64,
    #[serde(rename = "bestScore")]
    best_score: u64,
    #[serde(rename = "maxTile")]
    max_tile: u64,
    merges: u32,
    #[serde(rename = "powerUpsSpawned")]
    power_ups_spawned: u32,
    #[serde(rename = "powerUpsActivated")]
    power_ups_activated: u32,
    #[serde(rename = "fullBoardMoves")]
    full_board_moves: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    #[serde(rename = "move")]
    move_index: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct GameRunResult {
    #[serde(flatten)]
    result: GameResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "gameCount")]
    game_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u64,
    #[serde(rename = "bestScore")]
    best_score: u64,
    games: Vec<GameResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    game: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(rename = "move", skip_serializing_if = "Option::is_none")]
    move_index: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint, run_started_at_ms));

    let mut memory_store = MemoryStore::new();
    let mut file_store = cli.store.clone().map(FileStore::new);
    let mut results = Vec::new();
    let mut total_anomalies = 0usize;

    for scenario in &scenarios {
        emit_log(
            "info",
            "game_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({ "moves": scenario.moves, "size": scenario.size }),
        );

        let run = match file_store.take() {
            Some(store) => {
                let (run, store) = run_scenario(store, scenario);
                file_store = Some(store);
                run
            }
            None => {
                let (run, store) = run_scenario(std::mem::take(&mut memory_store), scenario);
                memory_store = store;
                run
            }
        };

        for anomaly in &run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.move_index),
                json!({ "message": anomaly.message }),
            );
        }
        total_anomalies += run.anomaly_records.len();

        emit_log(
            "info",
            "game_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(run.result.moves),
            json!({
                "finalScore": run.result.final_score,
                "maxTile": run.result.max_tile,
                "anomalyCount": run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&run.result).expect("game result should serialize")
        );
        results.push(run.result);
    }

    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        now_ms(),
        results,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "gameCount": summary.game_count,
            "anomalyCount": summary.anomaly_count,
            "averageScore": summary.average_score,
            "bestScore": summary.best_score,
            "summaryOut": summary_out_written,
        }),
    );

    if summary.anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn run_scenario<S: GameStore>(store: S, scenario: &Scenario) -> (GameRunResult, S) {
    let mut engine = GameEngine::new(
        store,
        GameEngineOptions {
            grid_size: scenario.size,
            seed: Some(scenario.seed),
            ..GameEngineOptions::default()
        },
    );
    engine.setup_game();
    engine.build_snapshot(true);

    let mut input = Rng::new(scenario.seed ^ 0x9e37_79b9);
    let mut merges = 0u32;
    let mut power_ups_spawned = 0u32;
    let mut power_ups_activated = 0u32;
    let mut full_board_moves = 0u32;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut previous_best = engine.best_score();

    for _ in 0..scenario.moves {
        let dir = Direction::ALL[input.pick_index(Direction::ALL.len())];
        engine.swipe(dir);
        if engine.grid().empty_cells().is_empty() {
            full_board_moves += 1;
        }

        if input.below(3) == 0 {
            let power_up_cells: Vec<(usize, usize)> = engine
                .grid()
                .rows()
                .iter()
                .flatten()
                .filter(|tile| tile.content.power_up().is_some())
                .map(|tile| tile.position())
                .collect();
            if let Some(&(row, col)) = input.pick(&power_up_cells) {
                if let Err(error) = engine.activate_power_up(row, col) {
                    push_anomaly(
                        &mut anomalies,
                        &mut anomaly_records,
                        &mut anomaly_seen,
                        engine.moves(),
                        format!("activation rejected: {error}"),
                    );
                }
            }
        }

        let snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(&snapshot, previous_best) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.moves,
                message,
            );
        }
        previous_best = snapshot.best_score;

        for event in &snapshot.events {
            match event {
                GameEvent::TilesMerged { merges: batch } => merges += batch.len() as u32,
                GameEvent::PowerUpSpawned { .. } => power_ups_spawned += 1,
                GameEvent::PowerUpActivated { .. } => power_ups_activated += 1,
                _ => {}
            }
        }
    }

    let snapshot = engine.build_snapshot(false);
    let max_tile = snapshot
        .tiles
        .iter()
        .flatten()
        .filter_map(|tile| tile.content.number())
        .max()
        .unwrap_or(0);

    let run = GameRunResult {
        result: GameResultLine {
            game: scenario.name.clone(),
            seed: scenario.seed,
            size: engine.options().grid_size,
            moves: snapshot.moves,
            final_score: snapshot.current_score,
            best_score: snapshot.best_score,
            max_tile,
            merges,
            power_ups_spawned,
            power_ups_activated,
            full_board_moves,
            anomalies,
        },
        anomaly_records,
    };
    (run, engine.into_store())
}

fn collect_snapshot_anomalies(snapshot: &GameSnapshot, previous_best: u64) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.tiles.len() != snapshot.size
        || snapshot.tiles.iter().any(|row| row.len() != snapshot.size)
    {
        anomalies.push(format!("grid is not {0}x{0}", snapshot.size));
    }

    for (row_idx, row) in snapshot.tiles.iter().enumerate() {
        for (col_idx, tile) in row.iter().enumerate() {
            if (tile.row, tile.col) != (row_idx, col_idx) {
                anomalies.push(format!(
                    "tile at ({row_idx}, {col_idx}) reports position ({}, {})",
                    tile.row, tile.col
                ));
            }
            if tile.content == TileContent::Number(0) {
                anomalies.push(format!("zero numeric tile at ({row_idx}, {col_idx})"));
            }
        }
    }

    if snapshot.best_score < snapshot.current_score {
        anomalies.push(format!(
            "best score {} below current score {}",
            snapshot.best_score, snapshot.current_score
        ));
    }
    if snapshot.best_score < previous_best {
        anomalies.push(format!(
            "best score dropped from {previous_best} to {}",
            snapshot.best_score
        ));
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(now_ms));
    let games = cli.games.unwrap_or(3).clamp(1, 1_000) as u32;
    let moves = cli.moves.unwrap_or(200).clamp(1, 100_000) as u32;
    let size = cli.size.unwrap_or(GRID_SIZE as i64).clamp(2, 8) as usize;

    (0..games)
        .map(|idx| Scenario {
            name: format!("game-{}", idx + 1),
            seed: normalize_seed(seed as u64 + idx as u64),
            moves,
            size,
        })
        .collect()
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    move_index: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        move_index,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    games: Vec<GameResultLine>,
    anomaly_count: usize,
) -> RunSummary {
    let game_count = games.len();
    let total_score: u64 = games.iter().map(|game| game.final_score).sum();
    let average_score = if game_count == 0 {
        0
    } else {
        total_score / game_count as u64
    };
    let best_score = games.iter().map(|game| game.best_score).max().unwrap_or(0);
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        game_count,
        anomaly_count,
        average_score,
        best_score,
        games,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    game: Option<&str>,
    seed: Option<u32>,
    move_index: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        game: game.map(|value| value.to_string()),
        seed,
        move_index,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}
