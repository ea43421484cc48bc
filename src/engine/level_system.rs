use tracing::debug;

use super::*;
use crate::route::generate_covering_route;

impl GameEngine {
    /// Runs the respawn and level-transition countdowns. Returns true when
    /// the tick belongs to a non-playing phase.
    pub(super) fn advance_phase_countdown(&mut self) -> bool {
        match self.phase {
            Phase::Playing => false,
            Phase::Respawning { ticks_left } => {
                if ticks_left <= 1 {
                    self.finish_respawn();
                } else {
                    self.phase = Phase::Respawning {
                        ticks_left: ticks_left - 1,
                    };
                }
                true
            }
            Phase::LevelTransition { ticks_left } => {
                if ticks_left <= 1 {
                    self.start_next_level();
                } else {
                    self.phase = Phase::LevelTransition {
                        ticks_left: ticks_left - 1,
                    };
                }
                true
            }
            Phase::GameOver | Phase::Won => true,
        }
    }

    pub(super) fn finish_respawn(&mut self) {
        self.phase = Phase::Playing;
        self.ctx.invincibility_ticks = self.config.invincibility_ticks;
        debug!(tick = self.ctx.tick, "respawn finished");
    }

    pub(super) fn check_level_clear(&mut self) {
        if self.phase == Phase::Playing && self.maze.pellets_remaining() == 0 {
            self.on_level_cleared();
        }
    }

    pub(super) fn on_level_cleared(&mut self) {
        self.events.push(RuntimeEvent::LevelCleared { level: self.level });
        info!(
            tick = self.ctx.tick,
            level = self.level,
            score = self.score,
            "level cleared"
        );
        if self.stats.lives_lost_this_level == 0 {
            self.unlock(AchievementId::FlawlessLevel);
        }

        if self.level >= self.config.levels_to_win {
            self.phase = Phase::Won;
            self.events.push(RuntimeEvent::Won);
            info!(tick = self.ctx.tick, score = self.score, "game won");
            return;
        }

        let ticks = self.config.level_transition_ticks;
        if ticks == 0 {
            self.start_next_level();
        } else {
            self.phase = Phase::LevelTransition { ticks_left: ticks };
        }
    }

    fn start_next_level(&mut self) {
        self.level += 1;
        self.load_level();
        self.phase = Phase::Playing;
    }

    /// Installs a fresh copy of the current level's maze. Score, lives and
    /// currency carry over; level-scoped timers and placements do not.
    pub(super) fn load_level(&mut self) {
        if self.plans.is_empty() {
            return;
        }
        let index = (self.level.saturating_sub(1) as usize) % self.plans.len();
        let plan = &self.plans[index];
        let maze = plan.maze.clone();
        let player_spawn = plan.template.player_spawn;
        let spawns = plan.template.adversaries.clone();
        let name = plan.template.name.clone();

        let route = generate_covering_route(&maze);
        let route_len = route.len();
        self.patrol_route = Some(Arc::from(route));
        self.maze = maze;
        self.player = Player::new(player_spawn);
        self.ctx.clear_transient();
        self.terrain.clear();
        self.traps.clear();
        self.walls.clear();
        self.stats.lives_lost_this_level = 0;
        self.spawn_level_adversaries(&spawns);

        debug!(
            level = self.level,
            template = %name,
            route_len,
            adversaries = self.adversaries.len(),
            "level loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimulationConfig;
    use crate::engine::GameEngine;
    use crate::levels::{AdversarySpawn, LevelTemplate};
    use crate::modifiers::Modifiers;
    use crate::types::{AchievementId, ArchetypeKind, Direction, Phase, RuntimeEvent, Vec2};

    fn corridor_engine(config: SimulationConfig) -> GameEngine {
        let template = LevelTemplate::from_rows(
            "corridor",
            &["11111", "10221", "11111"],
            Vec2::new(1, 1),
            Vec::new(),
        );
        GameEngine::new(vec![template], config, Modifiers::new(), 3).expect("level builds")
    }

    #[test]
    fn clearing_the_last_pellet_starts_the_transition() {
        let config = SimulationConfig {
            level_transition_ticks: 2,
            ..SimulationConfig::default()
        };
        let mut engine = corridor_engine(config);
        engine.step(Some(Direction::Right));
        assert_eq!(engine.phase, Phase::Playing);
        engine.step(None);
        assert_eq!(engine.phase, Phase::LevelTransition { ticks_left: 2 });
        assert_eq!(engine.score, 20);
        let snapshot = engine.build_snapshot(true);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::LevelCleared { level: 1 })));
        assert!(engine.achievements.contains(&AchievementId::FlawlessLevel));

        engine.step(None);
        assert_eq!(engine.phase, Phase::LevelTransition { ticks_left: 1 });
        engine.step(None);
        assert_eq!(engine.phase, Phase::Playing);
        assert_eq!(engine.level, 2);
        assert_eq!(engine.maze.pellets_remaining(), 2);
        assert_eq!(engine.player.pos, Vec2::new(1, 1));
        assert_eq!(engine.score, 20);
    }

    #[test]
    fn reaching_the_level_threshold_wins() {
        let config = SimulationConfig {
            levels_to_win: 1,
            ..SimulationConfig::default()
        };
        let mut engine = corridor_engine(config);
        engine.step(Some(Direction::Right));
        engine.step(None);
        assert_eq!(engine.phase, Phase::Won);
        assert!(engine.is_ended());
    }

    #[test]
    fn level_clear_requires_every_pellet() {
        let mut engine = corridor_engine(SimulationConfig::default());
        engine.step(Some(Direction::Right));
        assert_eq!(engine.maze.pellets_remaining(), 1);
        engine.check_level_clear();
        assert_eq!(engine.phase, Phase::Playing);
    }

    #[test]
    fn hazards_survive_level_transitions() {
        let config = SimulationConfig {
            level_transition_ticks: 0,
            ..SimulationConfig::default()
        };
        let mut engine = corridor_engine(config);
        engine
            .spawn_hazard(Vec2::new(3, 1), ArchetypeKind::Wander)
            .expect("open cell");
        engine.ctx.vulnerability_ticks = 9;

        engine.step(Some(Direction::Right));
        for _ in 0..10 {
            if engine.level == 2 {
                break;
            }
            engine.step(None);
        }
        assert_eq!(engine.level, 2);
        assert_eq!(engine.adversaries.len(), 1);
        assert!(engine.adversaries[0].harmless);
        assert_eq!(engine.ctx.vulnerability_ticks, 0);
    }

    #[test]
    fn patrols_share_one_route_per_load() {
        let spawns = vec![
            AdversarySpawn::new(ArchetypeKind::Patrol, Vec2::new(1, 1)),
            AdversarySpawn::new(ArchetypeKind::Patrol, Vec2::new(3, 1)),
        ];
        let template =
            LevelTemplate::from_rows("loop", &["00000", "00200", "00000"], Vec2::new(2, 0), spawns);
        let engine =
            GameEngine::new(vec![template], SimulationConfig::default(), Modifiers::new(), 8)
                .expect("level builds");
        let route = engine.patrol_route.clone().expect("route built on load");
        assert!(route.len() >= engine.maze.open_cells().count());
        for adversary in &engine.adversaries {
            match &adversary.archetype {
                crate::adversary::Archetype::Patrol { route: Some(own), .. } => {
                    assert!(std::sync::Arc::ptr_eq(own, &route));
                }
                other => panic!("expected routed patrol, got {other:?}"),
            }
        }
    }
}
