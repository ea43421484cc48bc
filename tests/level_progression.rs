use maze_chase_core::config::SimulationConfig;
use maze_chase_core::engine::GameEngine;
use maze_chase_core::levels::LevelTemplate;
use maze_chase_core::modifiers::Modifiers;
use maze_chase_core::types::{Direction, GameMode, Phase, RuntimeEvent, Vec2};

fn corridor_templates() -> Vec<LevelTemplate> {
    vec![
        LevelTemplate::from_rows("first", &["11111", "10221", "11111"], Vec2::new(1, 1), Vec::new()),
        LevelTemplate::from_rows("second", &["1111", "1021", "1111"], Vec2::new(1, 1), Vec::new()),
    ]
}

#[test]
fn autopilot_clears_both_corridors_and_wins() {
    let config = SimulationConfig {
        levels_to_win: 2,
        level_transition_ticks: 3,
        ..SimulationConfig::default()
    };
    let mut engine =
        GameEngine::new(corridor_templates(), config, Modifiers::new(), 5).expect("levels build");

    let mut cleared = Vec::new();
    for _ in 0..60 {
        if engine.is_ended() {
            break;
        }
        let dir = engine.autopilot_direction();
        engine.step(Some(dir));
        for event in engine.build_snapshot(true).events {
            if let RuntimeEvent::LevelCleared { level } = event {
                cleared.push(level);
            }
        }
    }

    assert_eq!(engine.phase(), Phase::Won);
    assert_eq!(engine.level(), 2);
    assert_eq!(cleared, vec![1, 2]);
    assert_eq!(engine.score(), 30);
    assert_eq!(engine.lives(), SimulationConfig::default().starting_lives);
}

#[test]
fn empty_template_list_is_rejected() {
    let result = GameEngine::new(Vec::new(), SimulationConfig::default(), Modifiers::new(), 1);
    assert!(result.is_err());
}

fn assert_tick_invariants(mode: GameMode, seed: u64) {
    let config = SimulationConfig {
        mode,
        ..SimulationConfig::default()
    };
    let mut engine =
        GameEngine::with_builtin_levels(config, Modifiers::new(), seed).expect("builtin levels");
    let mut previous_lives = engine.lives();
    let mut game_over_events = 0;

    for _ in 0..3_000 {
        if engine.is_ended() {
            break;
        }
        let dir = engine.autopilot_direction();
        engine.step(Some(dir));
        let snapshot = engine.build_snapshot(true);
        let maze = engine.maze();

        assert!(snapshot.lives <= previous_lives, "lives only go down");
        previous_lives = snapshot.lives;
        assert!(maze.is_open(Vec2::new(snapshot.player.x, snapshot.player.y)));
        for adversary in &snapshot.adversaries {
            let pos = Vec2::new(adversary.x, adversary.y);
            assert!(maze.in_bounds(pos), "adversary {} out of bounds", adversary.id);
            assert!(adversary.eyes_only || maze.is_open(pos), "adversary {} in a wall", adversary.id);
            assert!(!(adversary.vulnerable && adversary.eyes_only));
            assert!(adversary.hits_taken <= adversary.hits_required);
        }
        game_over_events += snapshot
            .events
            .iter()
            .filter(|event| matches!(event, RuntimeEvent::GameOver))
            .count();
    }

    assert!(game_over_events <= 1);
    if engine.phase() == Phase::GameOver {
        assert_eq!(engine.lives(), 0);
        assert_eq!(game_over_events, 1);
    }
}

#[test]
fn builtin_classic_run_keeps_invariants() {
    assert_tick_invariants(GameMode::Classic, 77);
}

#[test]
fn builtin_survival_run_keeps_invariants() {
    assert_tick_invariants(GameMode::Survival, 78);
}

#[test]
fn json_config_and_modifiers_drive_the_engine() {
    let config = SimulationConfig::from_json_str(r#"{"mode":"survival","levelsToWin":1}"#)
        .expect("valid config");
    let modifiers = Modifiers::from_json_str(r#"{"player_speed":2}"#).expect("valid modifiers");
    let template =
        LevelTemplate::from_rows("lane", &["1111111", "1022221", "1111111"], Vec2::new(1, 1), Vec::new());
    let mut engine = GameEngine::new(vec![template], config, modifiers, 3).expect("level builds");

    engine.step(Some(Direction::Right));
    assert_eq!(engine.player().pos, Vec2::new(3, 1));
    engine.step(None);
    assert_eq!(engine.phase(), Phase::Won);
}
