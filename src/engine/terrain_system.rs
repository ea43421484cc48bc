use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct TerrainTile {
    pub pos: Vec2,
    pub kind: TerrainKind,
    /// `None` lasts for the rest of the level.
    pub ticks_left: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct TransientWall {
    pub pos: Vec2,
    pub ticks_left: u32,
}

impl GameEngine {
    pub fn place_terrain(&mut self, cell: Vec2, kind: TerrainKind, ticks: Option<u32>) -> bool {
        if self.phase.is_terminal() || self.maze.is_wall(cell) || ticks == Some(0) {
            return false;
        }
        self.terrain.retain(|tile| tile.pos != cell);
        self.terrain.push(TerrainTile {
            pos: cell,
            kind,
            ticks_left: ticks,
        });
        true
    }

    /// Arms a one-shot trap; the first affected adversary to stop on it is immobilised.
    pub fn place_trap(&mut self, cell: Vec2) -> bool {
        if self.phase.is_terminal() || self.maze.is_wall(cell) {
            return false;
        }
        self.traps.insert(cell)
    }

    /// Raises a wall on a plain path cell for `ticks` ticks. Refused on
    /// pellets and walls, under the player or any non-eyes adversary, and
    /// on every cell an entity can be sent back to.
    pub fn place_wall(&mut self, cell: Vec2, ticks: u32) -> bool {
        if self.phase.is_terminal() || ticks == 0 {
            return false;
        }
        if self.maze.kind_at(cell) != Some(CellKind::Path)
            || self.player.pos == cell
            || self.player.spawn == cell
        {
            return false;
        }
        let occupied = self.adversaries.iter().any(|adversary| {
            adversary.home == cell || (adversary.pos == cell && !adversary.is_eyes_only())
        });
        if occupied || !self.maze.set_kind(cell, CellKind::Wall) {
            return false;
        }
        self.walls.push(TransientWall {
            pos: cell,
            ticks_left: ticks,
        });
        self.events.push(RuntimeEvent::CellChanged {
            x: cell.x,
            y: cell.y,
            kind: CellKind::Wall,
        });
        true
    }

    pub fn terrain_at(&self, cell: Vec2) -> Option<TerrainKind> {
        self.terrain
            .iter()
            .find(|tile| tile.pos == cell)
            .map(|tile| tile.kind)
    }

    pub fn has_trap(&self, cell: Vec2) -> bool {
        self.traps.contains(&cell)
    }

    pub(super) fn update_terrain(&mut self) {
        self.terrain.retain_mut(|tile| match tile.ticks_left.as_mut() {
            None => true,
            Some(ticks) => {
                *ticks = ticks.saturating_sub(1);
                *ticks > 0
            }
        });

        let mut expired = Vec::new();
        self.walls.retain_mut(|wall| {
            wall.ticks_left = wall.ticks_left.saturating_sub(1);
            if wall.ticks_left == 0 {
                expired.push(wall.pos);
                false
            } else {
                true
            }
        });
        for cell in expired {
            if self.maze.set_kind(cell, CellKind::Path) {
                self.events.push(RuntimeEvent::CellChanged {
                    x: cell.x,
                    y: cell.y,
                    kind: CellKind::Path,
                });
            }
        }
    }

    pub(super) fn spring_trap(&mut self, idx: usize) {
        let Some(adversary) = self.adversaries.get_mut(idx) else {
            return;
        };
        if !adversary.is_affected_by_effects() || !self.traps.remove(&adversary.pos) {
            return;
        }
        let ticks = self
            .config
            .immobilize_ticks
            .saturating_add(self.modifiers.trap_duration_bonus());
        adversary.immobilized_timer = ticks;
        self.events.push(RuntimeEvent::AdversaryImmobilized {
            id: adversary.id,
            ticks,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SimulationConfig;
    use crate::engine::GameEngine;
    use crate::levels::{AdversarySpawn, LevelTemplate};
    use crate::modifiers::{Effect, Modifiers};
    use crate::types::{ArchetypeKind, CellKind, Direction, RuntimeEvent, TerrainKind, Vec2};

    fn lane_engine(modifiers: Modifiers) -> GameEngine {
        let template = LevelTemplate::from_rows(
            "lane",
            &["1111111111", "0000000002", "1111111111"],
            Vec2::new(0, 1),
            vec![AdversarySpawn::new(ArchetypeKind::Chase, Vec2::new(5, 1))],
        );
        GameEngine::new(vec![template], SimulationConfig::default(), modifiers, 21)
            .expect("level builds")
    }

    #[test]
    fn ice_lets_an_adversary_act_once_per_threshold() {
        let mut engine = lane_engine(Modifiers::new());
        assert!(engine.place_terrain(Vec2::new(5, 1), TerrainKind::Ice, None));
        engine.adversaries[0].dir = Direction::Left;

        let mut moved_on = Vec::new();
        for tick in 1..=3 {
            let before = engine.adversaries[0].pos;
            engine.update_adversaries();
            if engine.adversaries[0].pos != before {
                moved_on.push(tick);
            }
        }
        assert_eq!(moved_on, vec![3]);
        assert_eq!(engine.adversaries[0].ice_slowdown_counter, 0);
    }

    #[test]
    fn ice_stack_raises_the_threshold() {
        let mut engine = lane_engine(Modifiers::new().with(Effect::IceStack, 2.0));
        engine.place_terrain(Vec2::new(5, 1), TerrainKind::Ice, None);
        for _ in 0..4 {
            engine.update_adversaries();
        }
        assert_eq!(engine.adversaries[0].pos, Vec2::new(5, 1));
        engine.update_adversaries();
        assert_ne!(engine.adversaries[0].pos, Vec2::new(5, 1));
    }

    #[test]
    fn ice_counter_resets_off_the_tile() {
        let mut engine = lane_engine(Modifiers::new());
        engine.place_terrain(Vec2::new(5, 1), TerrainKind::Ice, None);
        engine.update_adversaries();
        assert_eq!(engine.adversaries[0].ice_slowdown_counter, 1);
        assert_eq!(engine.adversaries[0].pos, Vec2::new(5, 1));

        engine.adversaries[0].pos = Vec2::new(7, 1);
        engine.update_adversaries();
        assert_eq!(engine.adversaries[0].ice_slowdown_counter, 0);
        assert_ne!(engine.adversaries[0].pos, Vec2::new(7, 1));
    }

    #[test]
    fn eyes_and_hazards_ignore_scare_tiles_and_traps() {
        let mut engine = lane_engine(Modifiers::new());
        let hazard_idx = engine.adversaries.len();
        engine
            .spawn_hazard(Vec2::new(2, 1), ArchetypeKind::Wander)
            .expect("open cell");
        engine.adversaries[0].become_eyes();
        engine.adversaries[0].pos = Vec2::new(8, 1);
        engine.place_terrain(Vec2::new(8, 1), TerrainKind::Scare, None);
        engine.place_terrain(Vec2::new(2, 1), TerrainKind::Scare, None);
        assert!(engine.place_trap(Vec2::new(7, 1)));

        engine.update_adversaries();
        let eyes = &engine.adversaries[0];
        assert_eq!(eyes.pos, Vec2::new(7, 1));
        assert!(eyes.is_eyes_only());
        assert!(!eyes.is_fleeing());
        assert!(!eyes.is_immobilized());
        assert!(engine.has_trap(Vec2::new(7, 1)));
        assert!(!engine.adversaries[hazard_idx].is_fleeing());

        let hazard_pos = engine.adversaries[hazard_idx].pos;
        assert!(engine.place_trap(hazard_pos));
        engine.spring_trap(hazard_idx);
        assert!(!engine.adversaries[hazard_idx].is_immobilized());
        assert!(engine.has_trap(hazard_pos));
    }

    #[test]
    fn scare_tile_forces_the_flee_branch() {
        let mut engine = lane_engine(Modifiers::new());
        engine.place_terrain(Vec2::new(5, 1), TerrainKind::Scare, Some(10));
        engine.player.pos = Vec2::new(3, 1);
        engine.update_adversaries();
        let adversary = &engine.adversaries[0];
        assert!(adversary.is_fleeing());
        assert_eq!(adversary.dir, Direction::Right);
        assert_eq!(adversary.pos, Vec2::new(6, 1));
    }

    #[test]
    fn traps_immobilise_once_and_are_consumed() {
        let mut engine = lane_engine(Modifiers::new().with(Effect::TrapDurationBonus, 5.0));
        engine.player.pos = Vec2::new(1, 1);
        assert!(engine.place_trap(Vec2::new(4, 1)));
        assert!(!engine.place_trap(Vec2::new(4, 0)));

        engine.update_adversaries();
        let adversary = &engine.adversaries[0];
        assert_eq!(adversary.pos, Vec2::new(4, 1));
        assert_eq!(adversary.immobilized_timer, 35);
        assert!(!engine.has_trap(Vec2::new(4, 1)));

        engine.update_adversaries();
        assert_eq!(engine.adversaries[0].pos, Vec2::new(4, 1));
        let snapshot = engine.build_snapshot(true);
        assert!(snapshot.adversaries[0].immobilized);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::AdversaryImmobilized { ticks: 35, .. })));
    }

    #[test]
    fn transient_walls_block_and_then_expire() {
        let mut engine = lane_engine(Modifiers::new());
        assert!(!engine.place_wall(Vec2::new(9, 1), 3), "pellet cell");
        assert!(!engine.place_wall(Vec2::new(0, 1), 3), "player cell");
        assert!(!engine.place_wall(Vec2::new(5, 1), 3), "adversary cell");
        assert!(!engine.place_wall(Vec2::new(2, 1), 0));
        assert!(engine.place_wall(Vec2::new(2, 1), 2));
        assert_eq!(engine.maze.kind_at(Vec2::new(2, 1)), Some(CellKind::Wall));
        assert!(!engine.maze.can_move(Vec2::new(1, 1), Direction::Right));

        engine.update_terrain();
        assert_eq!(engine.maze.kind_at(Vec2::new(2, 1)), Some(CellKind::Wall));
        engine.update_terrain();
        assert_eq!(engine.maze.kind_at(Vec2::new(2, 1)), Some(CellKind::Path));

        let snapshot = engine.build_snapshot(true);
        let changes: Vec<CellKind> = snapshot
            .events
            .iter()
            .filter_map(|event| match event {
                RuntimeEvent::CellChanged { x: 2, y: 1, kind } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(changes, vec![CellKind::Wall, CellKind::Path]);
    }

    #[test]
    fn walls_are_refused_on_respawn_cells() {
        let mut engine = lane_engine(Modifiers::new());
        engine.adversaries[0].pos = Vec2::new(7, 1);
        engine.player.pos = Vec2::new(3, 1);
        assert!(!engine.place_wall(Vec2::new(5, 1), 100), "adversary home");
        assert!(!engine.place_wall(Vec2::new(0, 1), 100), "player spawn");

        engine.adversaries[0].pos = Vec2::new(3, 1);
        engine.adversaries[0].immobilized_timer = 5;
        engine.resolve_collisions();
        assert_eq!(engine.lives, 2);
        assert!(engine.maze.is_open(engine.adversaries[0].pos));
        assert!(engine.maze.is_open(engine.player.pos));
    }

    #[test]
    fn timed_terrain_expires() {
        let mut engine = lane_engine(Modifiers::new());
        assert!(!engine.place_terrain(Vec2::new(3, 0), TerrainKind::Ice, None));
        assert!(!engine.place_terrain(Vec2::new(3, 1), TerrainKind::Ice, Some(0)));
        assert!(engine.place_terrain(Vec2::new(3, 1), TerrainKind::Ice, Some(2)));
        engine.update_terrain();
        assert_eq!(engine.terrain_at(Vec2::new(3, 1)), Some(TerrainKind::Ice));
        engine.update_terrain();
        assert_eq!(engine.terrain_at(Vec2::new(3, 1)), None);
    }
}
