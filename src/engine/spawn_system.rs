use tracing::debug;

use super::*;
use crate::types::ArchetypeKind;

impl GameEngine {
    pub(super) fn spawn_level_adversaries(&mut self, spawns: &[AdversarySpawn]) {
        self.adversaries.clear();
        let extra_hits = self.modifiers.extra_hits();
        for spawn in spawns {
            self.push_adversary(spawn, extra_hits);
        }

        let hazards = self.hazards.clone();
        for hazard in &hazards {
            let mut placed = hazard.clone();
            if self.maze.is_wall(placed.home) {
                placed.home = self.fallback_spawn_cell(spawns);
            }
            self.push_adversary(&placed, 0);
        }
    }

    /// Adds a harmless hazard that follows the player from level to level.
    /// Returns its id, or `None` when `home` is not an open cell.
    pub fn spawn_hazard(&mut self, home: Vec2, archetype: ArchetypeKind) -> Option<u32> {
        if self.phase.is_terminal() || self.maze.is_wall(home) {
            return None;
        }
        let spawn = AdversarySpawn {
            archetype,
            home,
            hits_required: 1,
            harmless: true,
        };
        self.hazards.push(spawn.clone());
        let id = self.push_adversary(&spawn, 0);
        debug!(id, x = home.x, y = home.y, "hazard spawned");
        Some(id)
    }

    pub(super) fn reset_adversaries_to_home(&mut self) {
        for adversary in &mut self.adversaries {
            let dir = self.ctx.rng.direction();
            adversary.reset_to_home(dir);
        }
    }

    fn push_adversary(&mut self, spawn: &AdversarySpawn, extra_hits: u32) -> u32 {
        let id = self.make_id();
        let route = match spawn.archetype {
            ArchetypeKind::Patrol => self.patrol_route.clone(),
            ArchetypeKind::Chase | ArchetypeKind::Wander => None,
        };
        let dir = self.ctx.rng.direction();
        self.adversaries
            .push(Adversary::from_spawn(id, spawn, route, extra_hits, dir));
        id
    }

    fn fallback_spawn_cell(&self, spawns: &[AdversarySpawn]) -> Vec2 {
        spawns
            .iter()
            .map(|spawn| spawn.home)
            .find(|home| self.maze.is_open(*home))
            .or_else(|| self.maze.open_cells().next())
            .unwrap_or(self.player.spawn)
    }

    fn make_id(&mut self) -> u32 {
        let id = self.next_id_counter;
        self.next_id_counter = self.next_id_counter.saturating_add(1);
        id
    }
}
