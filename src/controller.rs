//! Per-tick adversary behaviour: pick a heading, then apply it.
//!
//! Drivers are evaluated in a fixed priority order: eyes, fleeing,
//! vulnerable, patrol route, chase, wander. Immobilised adversaries never
//! reach this module.

use crate::adversary::{Adversary, Archetype};
use crate::config::SimulationConfig;
use crate::context::SimulationContext;
use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Direction, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    pub patrol_index: Option<usize>,
}

impl Decision {
    fn turn(direction: Direction) -> Self {
        Self {
            direction,
            patrol_index: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pursuit {
    Toward,
    Away,
}

/// Selects the next heading. Reads the adversary, never writes it; the only
/// side effect is drawing from the shared generator.
pub fn decide(
    adversary: &Adversary,
    player: Vec2,
    maze: &Maze,
    config: &SimulationConfig,
    ctx: &mut SimulationContext,
) -> Decision {
    if adversary.is_eyes_only() {
        return Decision::turn(eyes_direction(adversary.pos, adversary.home));
    }
    if adversary.is_fleeing() || adversary.is_vulnerable() {
        return Decision::turn(pursue(
            adversary,
            player,
            Pursuit::Away,
            maze,
            config,
            ctx,
        ));
    }
    match &adversary.archetype {
        Archetype::Patrol {
            route: Some(route),
            index,
        } if !route.is_empty() => {
            let mut next_index = *index % route.len();
            if route[next_index] == adversary.pos {
                next_index = (next_index + 1) % route.len();
            }
            let target = route[next_index];
            Decision {
                direction: pursue(adversary, target, Pursuit::Toward, maze, config, ctx),
                patrol_index: Some(next_index),
            }
        }
        Archetype::Chase => Decision::turn(pursue(
            adversary,
            player,
            Pursuit::Toward,
            maze,
            config,
            ctx,
        )),
        Archetype::Patrol { .. } | Archetype::Wander => {
            Decision::turn(wander(adversary, maze, config, ctx))
        }
    }
}

/// Greater-offset axis first, horizontal on ties. Walls are not consulted.
pub fn eyes_direction(pos: Vec2, home: Vec2) -> Direction {
    let dx = home.x - pos.x;
    let dy = home.y - pos.y;
    if dx == 0 && dy == 0 {
        return Direction::None;
    }
    if dx.abs() >= dy.abs() {
        Direction::horizontal(dx).unwrap_or(Direction::None)
    } else {
        Direction::vertical(dy).unwrap_or(Direction::None)
    }
}

fn pursue(
    adversary: &Adversary,
    target: Vec2,
    pursuit: Pursuit,
    maze: &Maze,
    config: &SimulationConfig,
    ctx: &mut SimulationContext,
) -> Direction {
    let sign = match pursuit {
        Pursuit::Toward => 1,
        Pursuit::Away => -1,
    };
    let dx = (target.x - adversary.pos.x) * sign;
    let dy = (target.y - adversary.pos.y) * sign;
    let horizontal = Direction::horizontal(dx);
    let vertical = Direction::vertical(dy);
    let preferred = if dx.abs() >= dy.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };

    if let Some(dir) = preferred
        .into_iter()
        .flatten()
        .find(|dir| maze.can_move(adversary.pos, *dir))
    {
        return dir;
    }

    if ctx.tick % config.blocked_retry_period.max(1) == 0 {
        let legal = maze.legal_directions(adversary.pos);
        if let Some(dir) = ctx.rng.pick(&legal) {
            return dir;
        }
    }
    adversary.dir
}

fn wander(
    adversary: &Adversary,
    maze: &Maze,
    config: &SimulationConfig,
    ctx: &mut SimulationContext,
) -> Direction {
    let current_is_legal =
        adversary.dir != Direction::None && maze.can_move(adversary.pos, adversary.dir);
    let due = ctx.tick % config.wander_reevaluate_period.max(1) == 0;
    if current_is_legal && !due {
        return adversary.dir;
    }

    let legal = maze.legal_directions(adversary.pos);
    let reverse = adversary.dir.opposite();
    let forward: Vec<Direction> = legal
        .iter()
        .copied()
        .filter(|dir| reverse == Direction::None || *dir != reverse)
        .collect();
    let candidates = if forward.is_empty() { legal } else { forward };
    ctx.rng.pick(&candidates).unwrap_or(adversary.dir)
}

/// Commits a decision. Evaluation always counts a step; the position only
/// changes when the step counter lines up with the archetype's divisor.
/// Returns whether the adversary changed cell.
pub fn apply_decision(
    adversary: &mut Adversary,
    decision: Decision,
    maze: &Maze,
    config: &SimulationConfig,
    rng: &mut Rng,
) -> bool {
    adversary.dir = decision.direction;
    if let (Some(next_index), Archetype::Patrol { index, .. }) =
        (decision.patrol_index, &mut adversary.archetype)
    {
        *index = next_index;
    }

    adversary.step_counter += 1;
    let divisor = u64::from(config.ticks_per_move.for_kind(adversary.kind()));
    if adversary.step_counter % divisor != 0 {
        return false;
    }

    if adversary.is_eyes_only() {
        let (dx, dy) = adversary.dir.delta();
        if (dx, dy) == (0, 0) {
            return false;
        }
        adversary.pos = maze.wrap_clamped(Vec2::new(adversary.pos.x + dx, adversary.pos.y + dy));
        if adversary.pos == adversary.home {
            adversary.arrive_home(rng.direction());
        }
        return true;
    }

    match maze.neighbor(adversary.pos, adversary.dir) {
        Some(next) if maze.is_open(next) => {
            adversary.pos = next;
            true
        }
        _ => false,
    }
}

pub fn step_adversary(
    adversary: &mut Adversary,
    player: Vec2,
    maze: &Maze,
    config: &SimulationConfig,
    ctx: &mut SimulationContext,
) -> bool {
    if adversary.is_immobilized() {
        return false;
    }
    if adversary.is_eyes_only() && adversary.pos == adversary.home {
        adversary.arrive_home(ctx.rng.direction());
    }
    let decision = decide(adversary, player, maze, config, ctx);
    apply_decision(adversary, decision, maze, config, &mut ctx.rng)
}
