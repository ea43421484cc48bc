pub const MAZE_SIDE: i32 = 21;

pub const STARTING_LIVES: u32 = 3;
pub const LEVELS_TO_WIN: u32 = 3;
pub const RESPAWN_TICKS: u32 = 20;
pub const INVINCIBILITY_TICKS: u32 = 30;
pub const LEVEL_TRANSITION_TICKS: u32 = 10;

pub const POWER_DURATION_TICKS: u32 = 120;
pub const FLEE_DURATION_TICKS: u32 = 40;
pub const IMMOBILIZE_TICKS: u32 = 30;
pub const HAZARD_SLOW_TICKS: u32 = 40;

/// Full ticks granted to an adversary on slowed terrain: one per this many ticks.
pub const SLOWDOWN_THRESHOLD: u32 = 3;
/// A blocked adversary only rolls a random legal direction on ticks divisible by this.
pub const BLOCKED_RETRY_PERIOD: u64 = 3;
/// Wanderers re-roll their heading on ticks divisible by this.
pub const WANDER_REEVALUATE_PERIOD: u64 = 8;

pub const PELLET_POINTS: i64 = 10;
pub const POWER_PELLET_POINTS: i64 = 50;
pub const ADVERSARY_POINTS: i64 = 300;
pub const COMBO_BONUS_POINTS: i64 = 100;
pub const COMBO_WINDOW_TICKS: u64 = 60;

pub const PELLET_COINS: i64 = 1;
pub const POWER_PELLET_COINS: i64 = 5;
pub const ADVERSARY_COINS: i64 = 10;

pub const GHOST_HUNTER_DEFEATS: u32 = 10;
pub const COMBO_ACHIEVEMENT_CHAIN: u32 = 4;

/// Upper bound on cells the player may cover in one tick under a speed modifier.
pub const MAX_PLAYER_STEPS_PER_TICK: u32 = 2;
