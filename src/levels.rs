use serde::{Deserialize, Serialize};

use crate::error::MazeError;
use crate::maze::Maze;
use crate::types::{ArchetypeKind, Vec2};

fn one() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdversarySpawn {
    pub archetype: ArchetypeKind,
    pub home: Vec2,
    #[serde(default = "one")]
    pub hits_required: u32,
    #[serde(default)]
    pub harmless: bool,
}

impl AdversarySpawn {
    pub fn new(archetype: ArchetypeKind, home: Vec2) -> Self {
        Self {
            archetype,
            home,
            hits_required: 1,
            harmless: false,
        }
    }

    pub fn with_hits(mut self, hits_required: u32) -> Self {
        self.hits_required = hits_required.max(1);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTemplate {
    pub name: String,
    pub grid: Vec<Vec<u8>>,
    pub player_spawn: Vec2,
    pub adversaries: Vec<AdversarySpawn>,
}

impl LevelTemplate {
    pub fn from_rows(
        name: &str,
        rows: &[&str],
        player_spawn: Vec2,
        adversaries: Vec<AdversarySpawn>,
    ) -> Self {
        Self {
            name: name.to_string(),
            grid: rows
                .iter()
                .map(|row| row.bytes().map(|b| b.wrapping_sub(b'0')).collect())
                .collect(),
            player_spawn,
            adversaries,
        }
    }

    /// Decodes the grid and checks that every spawn sits on an open cell.
    pub fn build_maze(&self) -> Result<Maze, MazeError> {
        let maze = Maze::from_grid(&self.grid)?;
        let spawns = std::iter::once(self.player_spawn)
            .chain(self.adversaries.iter().map(|spawn| spawn.home));
        for spawn in spawns {
            if !maze.in_bounds(spawn) {
                return Err(MazeError::SpawnOutOfBounds(spawn));
            }
            if maze.is_wall(spawn) {
                return Err(MazeError::SpawnOnWall(spawn));
            }
        }
        Ok(maze)
    }
}

const LEVEL_ONE: [&str; 21] = [
    "111111111111111111111",
    "122222222212222222221",
    "131121112121211121131",
    "122222222222222222221",
    "121121211111112121121",
    "122221222212222122221",
    "111121112010211121111",
    "111121000000000121111",
    "111121011101110121111",
    "000020010000010020000",
    "111121011111110121111",
    "111121000000000121111",
    "111121011111110121111",
    "122222222212222222221",
    "121121112121211121121",
    "132221222202222122231",
    "111121212111212121111",
    "122222212212212222221",
    "121111112121211111121",
    "122222222222222222221",
    "111111111111111111111",
];

const LEVEL_TWO: [&str; 21] = [
    "111111111111111111111",
    "122222221212222222221",
    "121112121212121211121",
    "132222222222222222231",
    "121211121111121112121",
    "122212222212222212221",
    "111212111010111212111",
    "000222100000001222000",
    "111212101101101212111",
    "122222001000100222221",
    "121112101111101211121",
    "122222200000002222221",
    "111212111111111212111",
    "122212222212222212221",
    "121211121212121112121",
    "132222222202222222231",
    "121112121111121211121",
    "122222121212121222221",
    "121212222212222212121",
    "122222222222222222221",
    "111111111111111111111",
];

fn house_spawns() -> Vec<AdversarySpawn> {
    vec![
        AdversarySpawn::new(ArchetypeKind::Chase, Vec2::new(10, 7)),
        AdversarySpawn::new(ArchetypeKind::Patrol, Vec2::new(9, 9)),
        AdversarySpawn::new(ArchetypeKind::Wander, Vec2::new(10, 9)),
        AdversarySpawn::new(ArchetypeKind::Wander, Vec2::new(11, 9)).with_hits(2),
    ]
}

/// The two reference 21×21 layouts, cycled by level index.
pub fn builtin_levels() -> Vec<LevelTemplate> {
    vec![
        LevelTemplate::from_rows("arcade", &LEVEL_ONE, Vec2::new(10, 15), house_spawns()),
        LevelTemplate::from_rows("tunnels", &LEVEL_TWO, Vec2::new(10, 15), house_spawns()),
    ]
}
