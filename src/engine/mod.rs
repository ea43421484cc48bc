use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{info, trace};

use crate::adversary::{Adversary, HitOutcome};
use crate::collision::{detect_contact, protected_cells};
use crate::config::SimulationConfig;
use crate::constants::{COMBO_ACHIEVEMENT_CHAIN, GHOST_HUNTER_DEFEATS};
use crate::context::SimulationContext;
use crate::controller;
use crate::error::MazeError;
use crate::levels::{builtin_levels, AdversarySpawn, LevelTemplate};
use crate::maze::Maze;
use crate::modifiers::Modifiers;
use crate::player::Player;
use crate::types::{
    AchievementId, CellKind, Direction, GameMode, Phase, RuntimeEvent, Snapshot, TerrainKind,
    Vec2,
};

mod autopilot;
mod level_system;
mod spawn_system;
mod terrain_system;

use self::terrain_system::{TerrainTile, TransientWall};

#[derive(Clone, Debug)]
struct LevelPlan {
    template: LevelTemplate,
    maze: Maze,
}

#[derive(Clone, Debug, Default)]
struct RunStats {
    defeats: u32,
    lives_lost_this_level: u32,
}

#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: SimulationConfig,
    pub modifiers: Modifiers,

    plans: Vec<LevelPlan>,
    maze: Maze,
    patrol_route: Option<Arc<[Vec2]>>,
    player: Player,
    adversaries: Vec<Adversary>,
    hazards: Vec<AdversarySpawn>,
    ctx: SimulationContext,
    events: Vec<RuntimeEvent>,

    phase: Phase,
    level: u32,
    score: i64,
    lives: u32,
    currency: i64,
    terrain: Vec<TerrainTile>,
    traps: BTreeSet<Vec2>,
    walls: Vec<TransientWall>,
    achievements: BTreeSet<AchievementId>,
    stats: RunStats,
    next_id_counter: u32,
}

impl GameEngine {
    pub fn new(
        templates: Vec<LevelTemplate>,
        config: SimulationConfig,
        modifiers: Modifiers,
        seed: u64,
    ) -> Result<Self, MazeError> {
        let plans = templates
            .into_iter()
            .map(|template| {
                let maze = template.build_maze()?;
                Ok(LevelPlan { template, maze })
            })
            .collect::<Result<Vec<_>, MazeError>>()?;
        let first = plans.first().ok_or(MazeError::NoTemplates)?;
        let maze = first.maze.clone();
        let player = Player::new(first.template.player_spawn);
        let lives = config.starting_lives;

        let mut engine = Self {
            config,
            modifiers,
            plans,
            maze,
            patrol_route: None,
            player,
            adversaries: Vec::new(),
            hazards: Vec::new(),
            ctx: SimulationContext::new(seed),
            events: Vec::new(),
            phase: Phase::Playing,
            level: 1,
            score: 0,
            lives,
            currency: 0,
            terrain: Vec::new(),
            traps: BTreeSet::new(),
            walls: Vec::new(),
            achievements: BTreeSet::new(),
            stats: RunStats::default(),
            next_id_counter: 1,
        };
        engine.load_level();
        Ok(engine)
    }

    pub fn with_builtin_levels(
        config: SimulationConfig,
        modifiers: Modifiers,
        seed: u64,
    ) -> Result<Self, MazeError> {
        Self::new(builtin_levels(), config, modifiers, seed)
    }

    pub fn is_ended(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn currency(&self) -> i64 {
        self.currency
    }

    pub fn tick(&self) -> u64 {
        self.ctx.tick
    }

    pub fn seed(&self) -> u64 {
        self.ctx.rng.seed()
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn adversaries(&self) -> &[Adversary] {
        &self.adversaries
    }

    pub fn achievements(&self) -> &BTreeSet<AchievementId> {
        &self.achievements
    }

    pub fn set_queued_direction(&mut self, dir: Direction) {
        self.player.set_queued_direction(dir);
    }

    /// Advances one tick. Within `Playing` the order is fixed: timers,
    /// player movement and pickups, terrain, adversaries, collisions,
    /// level-clear check.
    pub fn step(&mut self, input: Option<Direction>) {
        if self.phase.is_terminal() {
            return;
        }
        self.ctx.tick += 1;
        if let Some(dir) = input {
            self.player.set_queued_direction(dir);
        }
        if self.advance_phase_countdown() {
            return;
        }

        self.decrement_timers();
        if self.update_player() {
            return;
        }
        self.update_terrain();
        self.update_adversaries();
        self.resolve_collisions();
        self.check_level_clear();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        Snapshot {
            tick: self.ctx.tick,
            level: self.level,
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            currency: self.currency,
            pellets_remaining: self.maze.pellets_remaining(),
            player: self
                .player
                .view(self.ctx.is_invincible(), self.ctx.is_slowed()),
            adversaries: self.adversaries.iter().map(Adversary::view).collect(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }

    fn decrement_timers(&mut self) {
        let expiry = self.ctx.decrement_timers();
        for adversary in &mut self.adversaries {
            adversary.flee_timer = adversary.flee_timer.saturating_sub(1);
            adversary.immobilized_timer = adversary.immobilized_timer.saturating_sub(1);
            if expiry.vulnerability_ended {
                adversary.end_vulnerability();
            }
        }
        if expiry.vulnerability_ended {
            trace!(tick = self.ctx.tick, "vulnerability expired");
        }
    }

    /// Moves the player and eats along the way. Returns true when the last
    /// pellet went and the level-clear transition already ran.
    fn update_player(&mut self) -> bool {
        let mut speed = self.modifiers.player_speed();
        if self.ctx.is_slowed() {
            speed *= 0.5;
        }
        let mut visited = self.player.advance(&self.maze, speed);
        if visited.last() != Some(&self.player.pos) {
            visited.push(self.player.pos);
        }
        for cell in visited {
            self.apply_pickups(cell);
            if self.maze.pellets_remaining() == 0 {
                self.on_level_cleared();
                return true;
            }
        }
        false
    }

    fn apply_pickups(&mut self, center: Vec2) {
        let range = self
            .modifiers
            .pellet_magnet_range()
            .clamp(0, self.maze.reach_radius());
        for dy in -range..=range {
            let span = range - dy.abs();
            for dx in -span..=span {
                if let Some(cell) = self.maze.wrap(Vec2::new(center.x + dx, center.y + dy)) {
                    self.consume_pellet(cell);
                }
            }
        }
    }

    fn consume_pellet(&mut self, cell: Vec2) {
        let Some(kind) = self.maze.consume(cell) else {
            return;
        };
        self.events.push(RuntimeEvent::CellChanged {
            x: cell.x,
            y: cell.y,
            kind: CellKind::Path,
        });
        if kind == CellKind::PowerPellet {
            self.events.push(RuntimeEvent::PowerPelletEaten {
                x: cell.x,
                y: cell.y,
            });
            self.add_score(self.config.scoring.power_pellet);
            self.add_currency(self.config.currency.power_pellet);
            self.activate_power();
        } else {
            self.events.push(RuntimeEvent::PelletEaten {
                x: cell.x,
                y: cell.y,
            });
            self.add_score(self.config.scoring.pellet);
            self.add_currency(self.config.currency.pellet);
        }
    }

    fn activate_power(&mut self) {
        let ticks = self
            .config
            .power_duration_ticks
            .saturating_add(self.modifiers.vulnerability_bonus_ticks());
        if ticks == 0 {
            return;
        }
        self.ctx.vulnerability_ticks = ticks;
        self.ctx.last_defeat_tick = None;
        self.ctx.combo_chain = 0;
        let mut turned = 0usize;
        for adversary in &mut self.adversaries {
            if adversary.make_vulnerable() {
                turned += 1;
            }
        }
        trace!(tick = self.ctx.tick, ticks, turned, "power pellet activated");
    }

    fn update_adversaries(&mut self) {
        let threshold = self
            .config
            .slowdown_threshold
            .max(1)
            .saturating_add(self.modifiers.ice_stack());
        let flee_ticks = self.config.flee_duration_ticks;

        for idx in 0..self.adversaries.len() {
            if self.adversaries[idx].is_immobilized() {
                continue;
            }
            let terrain = self.terrain_at(self.adversaries[idx].pos);
            let adversary = &mut self.adversaries[idx];

            if terrain == Some(TerrainKind::Ice) && !adversary.is_eyes_only() {
                adversary.ice_slowdown_counter += 1;
                if adversary.ice_slowdown_counter < threshold {
                    continue;
                }
                adversary.ice_slowdown_counter = 0;
            } else {
                adversary.ice_slowdown_counter = 0;
            }
            if terrain == Some(TerrainKind::Scare) && adversary.is_affected_by_effects() {
                adversary.flee_timer = flee_ticks;
            }

            let was_eyes = adversary.is_eyes_only();
            controller::step_adversary(
                adversary,
                self.player.pos,
                &self.maze,
                &self.config,
                &mut self.ctx,
            );
            if was_eyes && !adversary.is_eyes_only() {
                trace!(id = adversary.id, tick = self.ctx.tick, "adversary back home");
            }
            self.spring_trap(idx);
        }
    }

    /// Checks every adversary in list order. The first life loss ends the
    /// pass; survival-mode removals are applied once the pass is over.
    fn resolve_collisions(&mut self) {
        if self.phase != Phase::Playing || self.ctx.is_invincible() {
            return;
        }
        let shielded = protected_cells(&self.maze, self.player.pos, self.modifiers.shield_radius());
        let mut removals = Vec::new();

        for idx in 0..self.adversaries.len() {
            let adversary = &self.adversaries[idx];
            let Some(contact) = detect_contact(
                &self.maze,
                self.player.pos,
                self.player.dir,
                adversary.pos,
                adversary.dir,
            ) else {
                continue;
            };
            if shielded.contains(&adversary.pos) || adversary.is_eyes_only() {
                continue;
            }
            let id = adversary.id;
            let kind = adversary.kind();
            if adversary.is_vulnerable() {
                self.damage_adversary(idx, &mut removals);
                continue;
            }
            if adversary.harmless {
                self.touch_hazard(id);
                continue;
            }
            if self
                .ctx
                .rng
                .percent(self.modifiers.damage_avoidance_percent(kind))
            {
                self.events.push(RuntimeEvent::DamageAvoided { id });
                continue;
            }
            trace!(id, ?contact, tick = self.ctx.tick, "lethal contact");
            self.lose_life();
            break;
        }

        self.apply_removals(removals);
    }

    fn damage_adversary(&mut self, idx: usize, removals: &mut Vec<usize>) {
        let mode = self.config.mode;
        let Some(adversary) = self.adversaries.get_mut(idx) else {
            return;
        };
        let id = adversary.id;
        match adversary.register_hit() {
            HitOutcome::Damaged => {
                adversary.knock_home();
                self.events.push(RuntimeEvent::AdversaryDamaged {
                    id,
                    hits_taken: adversary.hits_taken,
                    hits_required: adversary.hits_required,
                });
            }
            HitOutcome::Defeated => {
                match mode {
                    GameMode::Classic => adversary.become_eyes(),
                    GameMode::Survival => removals.push(idx),
                }
                self.award_defeat(id);
            }
        }
    }

    fn award_defeat(&mut self, id: u32) {
        let chain = self.ctx.record_defeat(self.config.scoring.combo_window_ticks);
        let points = self.config.scoring.adversary
            + self.config.scoring.combo_bonus * i64::from(chain.saturating_sub(1));
        self.events.push(RuntimeEvent::AdversaryEaten { id, points, chain });
        self.add_score(points);
        self.add_currency(self.config.currency.adversary);
        self.stats.defeats += 1;
        trace!(id, chain, points, tick = self.ctx.tick, "adversary defeated");

        self.unlock(AchievementId::FirstBite);
        if chain >= COMBO_ACHIEVEMENT_CHAIN {
            self.unlock(AchievementId::ComboFour);
        }
        if self.stats.defeats >= GHOST_HUNTER_DEFEATS {
            self.unlock(AchievementId::GhostHunter);
        }
    }

    fn apply_removals(&mut self, mut removals: Vec<usize>) {
        removals.sort_unstable();
        removals.dedup();
        for idx in removals.into_iter().rev() {
            if idx < self.adversaries.len() {
                let removed = self.adversaries.remove(idx);
                self.events.push(RuntimeEvent::AdversaryRemoved { id: removed.id });
            }
        }
    }

    fn touch_hazard(&mut self, id: u32) {
        let already_slowed = self.ctx.is_slowed();
        self.ctx.hazard_slow_ticks = self.config.hazard_slow_ticks;
        if !already_slowed {
            self.events.push(RuntimeEvent::HazardTouched { id });
        }
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.stats.lives_lost_this_level += 1;
        self.events.push(RuntimeEvent::LifeChanged {
            delta: -1,
            lives: self.lives,
        });
        info!(tick = self.ctx.tick, level = self.level, lives = self.lives, "life lost");

        if self.lives == 0 {
            self.phase = Phase::GameOver;
            self.events.push(RuntimeEvent::GameOver);
            info!(tick = self.ctx.tick, score = self.score, "game over");
            return;
        }

        self.player.reset_to_spawn();
        self.reset_adversaries_to_home();
        self.ctx.vulnerability_ticks = 0;
        self.ctx.last_defeat_tick = None;
        self.ctx.combo_chain = 0;
        if self.config.respawn_ticks == 0 {
            self.finish_respawn();
        } else {
            self.phase = Phase::Respawning {
                ticks_left: self.config.respawn_ticks,
            };
        }
    }

    fn add_score(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        self.score += delta;
        self.events.push(RuntimeEvent::ScoreChanged {
            delta,
            total: self.score,
        });
    }

    fn add_currency(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        self.currency += delta;
        self.events.push(RuntimeEvent::CurrencyChanged {
            delta,
            total: self.currency,
        });
    }

    fn unlock(&mut self, id: AchievementId) {
        if self.achievements.insert(id) {
            self.events.push(RuntimeEvent::AchievementUnlocked { id });
            info!(?id, tick = self.ctx.tick, "achievement unlocked");
        }
    }
}
