use clap::Parser;
use maze_chase_core::config::SimulationConfig;
use maze_chase_core::engine::GameEngine;
use maze_chase_core::error::{ConfigError, MazeError};
use maze_chase_core::maze::Maze;
use maze_chase_core::modifiers::Modifiers;
use maze_chase_core::types::{AchievementId, GameMode, Phase, RuntimeEvent, Snapshot, Vec2};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_TICKS: u64 = 20_000;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    levels: Option<u32>,
    #[arg(long)]
    max_ticks: Option<u64>,
    #[arg(long)]
    mode: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    modifiers: Option<PathBuf>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct Scenario {
    name: String,
    mode: GameMode,
    levels: u32,
    max_ticks: u64,
    seed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Won,
    GameOver,
    TickLimit,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u64,
    mode: GameMode,
    outcome: Outcome,
    ticks: u64,
    #[serde(rename = "levelReached")]
    level_reached: u32,
    score: i64,
    lives: u32,
    currency: i64,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "powerPelletsEaten")]
    power_pellets_eaten: u32,
    #[serde(rename = "adversariesEaten")]
    adversaries_eaten: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    #[serde(rename = "damageAvoided")]
    damage_avoided: u32,
    achievements: Vec<AchievementId>,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug)]
struct ScenarioRunResult {
    result: ScenarioResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageTicks")]
    average_ticks: u64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let run_started_at_ms = now_ms();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "config_load_failed");
            std::process::exit(2);
        }
    };
    let modifiers = match load_modifiers(cli.modifiers.as_deref()) {
        Ok(modifiers) => modifiers,
        Err(err) => {
            error!(error = %err, "modifiers_load_failed");
            std::process::exit(2);
        }
    };

    let scenarios = match resolve_scenarios(&cli, &config) {
        Ok(scenarios) => scenarios,
        Err(err) => {
            error!(error = %err, "scenario_resolve_failed");
            std::process::exit(2);
        }
    };
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_ticks = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        info!(
            match_id = %match_id,
            scenario = %scenario.name,
            seed = scenario.seed,
            mode = ?scenario.mode,
            levels = scenario.levels,
            "scenario_started"
        );
        let scenario_run = match run_scenario(&scenario, &config, &modifiers) {
            Ok(run) => run,
            Err(err) => {
                error!(match_id = %match_id, scenario = %scenario.name, error = %err, "level_load_failed");
                std::process::exit(2);
            }
        };

        for anomaly in &scenario_run.anomaly_records {
            warn!(
                match_id = %match_id,
                scenario = %scenario.name,
                seed = scenario.seed,
                tick = anomaly.tick,
                message = %anomaly.message,
                "anomaly_detected"
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_ticks += scenario_run.result.ticks;
        *outcome_counts
            .entry(outcome_key(scenario_run.result.outcome).to_string())
            .or_insert(0) += 1;

        info!(
            match_id = %match_id,
            scenario = %scenario.name,
            seed = scenario.seed,
            tick = scenario_run.result.ticks,
            outcome = outcome_key(scenario_run.result.outcome),
            score = scenario_run.result.score,
            anomaly_count = scenario_run.anomaly_records.len(),
            "scenario_finished"
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(err) => error!(scenario = %scenario.name, error = %err, "result_serialize_failed"),
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        now_ms(),
        scenario_results,
        outcome_counts,
        total_anomalies,
        total_ticks,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(err) = write_summary(path, &summary) {
            error!(
                match_id = %match_id,
                path = %path.to_string_lossy(),
                error = %err,
                "summary_write_failed"
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    info!(
        match_id = %match_id,
        scenario_count = summary.scenario_count,
        anomaly_count = summary.anomaly_count,
        average_ticks = summary.average_ticks,
        summary_out = ?summary_out_written,
        "run_finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig, ConfigError> {
    match path {
        Some(path) => SimulationConfig::load(path),
        None => Ok(SimulationConfig::default()),
    }
}

fn load_modifiers(path: Option<&Path>) -> Result<Modifiers, ConfigError> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Modifiers::from_json_str(&raw)
        }
        None => Ok(Modifiers::new()),
    }
}

fn run_scenario(
    scenario: &Scenario,
    base_config: &SimulationConfig,
    modifiers: &Modifiers,
) -> Result<ScenarioRunResult, MazeError> {
    let config = SimulationConfig {
        mode: scenario.mode,
        levels_to_win: scenario.levels,
        ..base_config.clone()
    };
    let mut engine = GameEngine::with_builtin_levels(config, modifiers.clone(), scenario.seed)?;

    let mut pellets_eaten = 0;
    let mut power_pellets_eaten = 0;
    let mut adversaries_eaten = 0;
    let mut lives_lost = 0;
    let mut damage_avoided = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut previous_lives = engine.lives();

    while !engine.is_ended() && engine.tick() < scenario.max_ticks {
        let input = engine.autopilot_direction();
        engine.step(Some(input));
        let snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(&snapshot, engine.maze(), previous_lives) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        previous_lives = snapshot.lives;

        for event in &snapshot.events {
            match event {
                RuntimeEvent::PelletEaten { .. } => pellets_eaten += 1,
                RuntimeEvent::PowerPelletEaten { .. } => power_pellets_eaten += 1,
                RuntimeEvent::AdversaryEaten { .. } => adversaries_eaten += 1,
                RuntimeEvent::LifeChanged { delta, .. } if *delta < 0 => lives_lost += 1,
                RuntimeEvent::DamageAvoided { .. } => damage_avoided += 1,
                _ => {}
            }
        }
    }

    let outcome = match engine.phase() {
        Phase::Won => Outcome::Won,
        Phase::GameOver => Outcome::GameOver,
        _ => Outcome::TickLimit,
    };

    Ok(ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: engine.seed(),
            mode: scenario.mode,
            outcome,
            ticks: engine.tick(),
            level_reached: engine.level(),
            score: engine.score(),
            lives: engine.lives(),
            currency: engine.currency(),
            pellets_eaten,
            power_pellets_eaten,
            adversaries_eaten,
            lives_lost,
            damage_avoided,
            achievements: engine.achievements().iter().copied().collect(),
            anomalies,
        },
        anomaly_records,
    })
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, maze: &Maze, previous_lives: u32) -> Vec<String> {
    let mut anomalies = Vec::new();

    if snapshot.lives > previous_lives {
        anomalies.push(format!(
            "lives increased: {previous_lives} -> {}",
            snapshot.lives
        ));
    }
    if snapshot.lives == 0 && snapshot.phase != Phase::GameOver {
        anomalies.push("no lives left outside game over".to_string());
    }
    if snapshot.pellets_remaining == 0 && snapshot.phase == Phase::Playing {
        anomalies.push("level has no pellets but is still playing".to_string());
    }

    for adversary in &snapshot.adversaries {
        let pos = Vec2::new(adversary.x, adversary.y);
        if !maze.in_bounds(pos) {
            anomalies.push(format!("adversary out of bounds: {}", adversary.id));
        } else if maze.is_wall(pos) && !adversary.eyes_only {
            anomalies.push(format!("adversary inside wall: {}", adversary.id));
        }
        if adversary.vulnerable && adversary.eyes_only {
            anomalies.push(format!("adversary vulnerable while eyes: {}", adversary.id));
        }
        if adversary.hits_taken > adversary.hits_required {
            anomalies.push(format!(
                "adversary hits overflow: {} {}/{}",
                adversary.id, adversary.hits_taken, adversary.hits_required
            ));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli, config: &SimulationConfig) -> Result<Vec<Scenario>, ConfigError> {
    let seed = cli.seed.unwrap_or_else(now_ms);
    let max_ticks = cli
        .max_ticks
        .unwrap_or(DEFAULT_MAX_TICKS)
        .clamp(1, 1_000_000);
    let levels = cli.levels.unwrap_or(config.levels_to_win).clamp(1, 50);

    if cli.single || cli.mode.is_some() || cli.levels.is_some() {
        let mode = match cli.mode.as_deref() {
            Some(value) => GameMode::parse(value)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown mode {value:?}")))?,
            None => config.mode,
        };
        return Ok(vec![Scenario {
            name: format!("custom-{}-l{levels}", mode_key(mode)),
            mode,
            levels,
            max_ticks,
            seed,
        }]);
    }

    Ok(vec![
        Scenario {
            name: "classic-check".to_string(),
            mode: GameMode::Classic,
            levels,
            max_ticks,
            seed,
        },
        Scenario {
            name: "survival-check".to_string(),
            mode: GameMode::Survival,
            levels,
            max_ticks,
            seed: seed.wrapping_add(1),
        },
    ])
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u64, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_ticks: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_ticks = if scenario_count == 0 {
        0
    } else {
        total_ticks / scenario_count as u64
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_ticks,
        outcome_counts,
        scenarios,
    }
}

fn outcome_key(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Won => "won",
        Outcome::GameOver => "game_over",
        Outcome::TickLimit => "tick_limit",
    }
}

fn mode_key(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Classic => "classic",
        GameMode::Survival => "survival",
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
