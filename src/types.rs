use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector, with `y` growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    pub fn horizontal(sign: i32) -> Option<Self> {
        match sign.signum() {
            1 => Some(Self::Right),
            -1 => Some(Self::Left),
            _ => None,
        }
    }

    pub fn vertical(sign: i32) -> Option<Self> {
        match sign.signum() {
            1 => Some(Self::Down),
            -1 => Some(Self::Up),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Vec2) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Path,
    Wall,
    Pellet,
    PowerPellet,
}

impl CellKind {
    /// Decodes a template code: 0=path, 1=wall, 2=pellet, 3=power pellet.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Path),
            1 => Some(Self::Wall),
            2 => Some(Self::Pellet),
            3 => Some(Self::PowerPellet),
            _ => None,
        }
    }

    pub fn is_pellet(self) -> bool {
        matches!(self, Self::Pellet | Self::PowerPellet)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchetypeKind {
    Patrol,
    Chase,
    Wander,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Defeated adversaries turn into eyes and return home.
    #[default]
    Classic,
    /// Defeated adversaries are removed for the rest of the level.
    Survival,
}

impl GameMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "classic" => Some(Self::Classic),
            "survival" => Some(Self::Survival),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    Ice,
    Scare,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    Playing,
    Respawning {
        #[serde(rename = "ticksLeft")]
        ticks_left: u32,
    },
    LevelTransition {
        #[serde(rename = "ticksLeft")]
        ticks_left: u32,
    },
    GameOver,
    Won,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Won)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstBite,
    ComboFour,
    GhostHunter,
    FlawlessLevel,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    #[serde(rename = "queuedDir")]
    pub queued_dir: Direction,
    pub invincible: bool,
    pub slowed: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct AdversaryView {
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub archetype: ArchetypeKind,
    pub vulnerable: bool,
    #[serde(rename = "eyesOnly")]
    pub eyes_only: bool,
    pub fleeing: bool,
    pub immobilized: bool,
    pub harmless: bool,
    #[serde(rename = "hitsTaken")]
    pub hits_taken: u32,
    #[serde(rename = "hitsRequired")]
    pub hits_required: u32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PelletEaten {
        x: i32,
        y: i32,
    },
    PowerPelletEaten {
        x: i32,
        y: i32,
    },
    CellChanged {
        x: i32,
        y: i32,
        kind: CellKind,
    },
    ScoreChanged {
        delta: i64,
        total: i64,
    },
    CurrencyChanged {
        delta: i64,
        total: i64,
    },
    LifeChanged {
        delta: i32,
        lives: u32,
    },
    AdversaryEaten {
        id: u32,
        points: i64,
        chain: u32,
    },
    AdversaryDamaged {
        id: u32,
        #[serde(rename = "hitsTaken")]
        hits_taken: u32,
        #[serde(rename = "hitsRequired")]
        hits_required: u32,
    },
    AdversaryRemoved {
        id: u32,
    },
    AdversaryImmobilized {
        id: u32,
        ticks: u32,
    },
    DamageAvoided {
        id: u32,
    },
    HazardTouched {
        id: u32,
    },
    AchievementUnlocked {
        id: AchievementId,
    },
    LevelCleared {
        level: u32,
    },
    GameOver,
    Won,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub level: u32,
    pub phase: Phase,
    pub score: i64,
    pub lives: u32,
    pub currency: i64,
    #[serde(rename = "pelletsRemaining")]
    pub pellets_remaining: usize,
    pub player: PlayerView,
    pub adversaries: Vec<AdversaryView>,
    pub events: Vec<RuntimeEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for dir in Direction::CARDINAL {
            assert_eq!(dir.opposite().opposite(), dir);
            let (dx, dy) = dir.delta();
            let (ox, oy) = dir.opposite().delta();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
        assert_eq!(Direction::None.opposite(), Direction::None);
    }

    #[test]
    fn template_codes_decode() {
        assert_eq!(CellKind::from_code(0), Some(CellKind::Path));
        assert_eq!(CellKind::from_code(1), Some(CellKind::Wall));
        assert_eq!(CellKind::from_code(2), Some(CellKind::Pellet));
        assert_eq!(CellKind::from_code(3), Some(CellKind::PowerPellet));
        assert_eq!(CellKind::from_code(4), None);
    }
}
