use super::*;
use crate::route::path_to_nearest;

const DANGER_RADIUS: i32 = 2;

impl GameEngine {
    /// Headless input source for the simulator: run from an adjacent
    /// threat, otherwise walk the shortest path to the nearest pellet.
    pub fn autopilot_direction(&self) -> Direction {
        let pos = self.player.pos;
        let threats: Vec<Vec2> = self
            .adversaries
            .iter()
            .filter(|adversary| is_threat(adversary))
            .map(|adversary| adversary.pos)
            .filter(|threat| threat.manhattan(pos) <= DANGER_RADIUS)
            .collect();

        if !threats.is_empty() && !self.ctx.is_invincible() {
            if let Some(dir) = self.choose_escape_direction(pos, &threats) {
                return dir;
            }
        }
        self.choose_pellet_direction(pos).unwrap_or(self.player.dir)
    }

    fn choose_escape_direction(&self, pos: Vec2, threats: &[Vec2]) -> Option<Direction> {
        let mut best = None;
        let mut best_dist = i32::MIN;
        for (dir, next) in self.maze.open_neighbors(pos) {
            let dist = threats
                .iter()
                .map(|threat| threat.manhattan(next))
                .min()
                .unwrap_or(i32::MAX);
            if dist > best_dist {
                best_dist = dist;
                best = Some(dir);
            }
        }
        best
    }

    fn choose_pellet_direction(&self, pos: Vec2) -> Option<Direction> {
        let path = path_to_nearest(&self.maze, pos, |cell| {
            self.maze.kind_at(cell).is_some_and(CellKind::is_pellet)
        })?;
        let next = *path.get(1)?;
        self.maze
            .open_neighbors(pos)
            .find(|(_, cell)| *cell == next)
            .map(|(dir, _)| dir)
    }
}

fn is_threat(adversary: &Adversary) -> bool {
    !adversary.is_eyes_only() && !adversary.is_vulnerable() && !adversary.harmless
}
