use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ADVERSARY_COINS, ADVERSARY_POINTS, BLOCKED_RETRY_PERIOD, COMBO_BONUS_POINTS,
    COMBO_WINDOW_TICKS, FLEE_DURATION_TICKS, HAZARD_SLOW_TICKS, IMMOBILIZE_TICKS,
    INVINCIBILITY_TICKS, LEVELS_TO_WIN, LEVEL_TRANSITION_TICKS, PELLET_COINS, PELLET_POINTS,
    POWER_DURATION_TICKS, POWER_PELLET_COINS, POWER_PELLET_POINTS, RESPAWN_TICKS,
    SLOWDOWN_THRESHOLD, STARTING_LIVES, WANDER_REEVALUATE_PERIOD,
};
use crate::error::ConfigError;
use crate::types::{ArchetypeKind, GameMode};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scoring {
    pub pellet: i64,
    pub power_pellet: i64,
    pub adversary: i64,
    pub combo_bonus: i64,
    pub combo_window_ticks: u64,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            pellet: PELLET_POINTS,
            power_pellet: POWER_PELLET_POINTS,
            adversary: ADVERSARY_POINTS,
            combo_bonus: COMBO_BONUS_POINTS,
            combo_window_ticks: COMBO_WINDOW_TICKS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Currency {
    pub pellet: i64,
    pub power_pellet: i64,
    pub adversary: i64,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            pellet: PELLET_COINS,
            power_pellet: POWER_PELLET_COINS,
            adversary: ADVERSARY_COINS,
        }
    }
}

/// How many evaluated ticks pass between positional updates, per archetype.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicksPerMove {
    pub patrol: u32,
    pub chase: u32,
    pub wander: u32,
}

impl Default for TicksPerMove {
    fn default() -> Self {
        Self {
            patrol: 1,
            chase: 1,
            wander: 1,
        }
    }
}

impl TicksPerMove {
    pub fn for_kind(&self, kind: ArchetypeKind) -> u32 {
        let value = match kind {
            ArchetypeKind::Patrol => self.patrol,
            ArchetypeKind::Chase => self.chase,
            ArchetypeKind::Wander => self.wander,
        };
        value.max(1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub mode: GameMode,
    pub starting_lives: u32,
    pub levels_to_win: u32,
    pub respawn_ticks: u32,
    pub invincibility_ticks: u32,
    pub level_transition_ticks: u32,
    pub power_duration_ticks: u32,
    pub flee_duration_ticks: u32,
    pub immobilize_ticks: u32,
    pub slowdown_threshold: u32,
    pub hazard_slow_ticks: u32,
    pub blocked_retry_period: u64,
    pub wander_reevaluate_period: u64,
    pub ticks_per_move: TicksPerMove,
    pub scoring: Scoring,
    pub currency: Currency,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mode: GameMode::Classic,
            starting_lives: STARTING_LIVES,
            levels_to_win: LEVELS_TO_WIN,
            respawn_ticks: RESPAWN_TICKS,
            invincibility_ticks: INVINCIBILITY_TICKS,
            level_transition_ticks: LEVEL_TRANSITION_TICKS,
            power_duration_ticks: POWER_DURATION_TICKS,
            flee_duration_ticks: FLEE_DURATION_TICKS,
            immobilize_ticks: IMMOBILIZE_TICKS,
            slowdown_threshold: SLOWDOWN_THRESHOLD,
            hazard_slow_ticks: HAZARD_SLOW_TICKS,
            blocked_retry_period: BLOCKED_RETRY_PERIOD,
            wander_reevaluate_period: WANDER_REEVALUATE_PERIOD,
            ticks_per_move: TicksPerMove::default(),
            scoring: Scoring::default(),
            currency: Currency::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_lives == 0 {
            return Err(ConfigError::Invalid("startingLives must be at least 1".to_string()));
        }
        if self.levels_to_win == 0 {
            return Err(ConfigError::Invalid("levelsToWin must be at least 1".to_string()));
        }
        if self.blocked_retry_period == 0 || self.wander_reevaluate_period == 0 {
            return Err(ConfigError::Invalid(
                "retry and re-evaluation periods must be non-zero".to_string(),
            ));
        }
        if self.slowdown_threshold == 0 {
            return Err(ConfigError::Invalid(
                "slowdownThreshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SimulationConfig::from_json_str("{}").expect("empty object parses");
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.scoring.adversary, 300);
        assert_eq!(config.blocked_retry_period, 3);
        assert_eq!(config.wander_reevaluate_period, 8);
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let config = SimulationConfig::from_json_str(
            r#"{"mode":"survival","scoring":{"adversary":500},"ticksPerMove":{"wander":2}}"#,
        )
        .expect("partial config parses");
        assert_eq!(config.mode, GameMode::Survival);
        assert_eq!(config.scoring.adversary, 500);
        assert_eq!(config.scoring.pellet, PELLET_POINTS);
        assert_eq!(config.ticks_per_move.for_kind(ArchetypeKind::Wander), 2);
        assert_eq!(config.ticks_per_move.for_kind(ArchetypeKind::Chase), 1);
    }

    #[test]
    fn zero_periods_are_rejected() {
        let result = SimulationConfig::from_json_str(r#"{"blockedRetryPeriod":0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_ticks_per_move_behaves_as_one() {
        let rates = TicksPerMove {
            patrol: 0,
            chase: 1,
            wander: 3,
        };
        assert_eq!(rates.for_kind(ArchetypeKind::Patrol), 1);
        assert_eq!(rates.for_kind(ArchetypeKind::Wander), 3);
    }

    #[test]
    fn load_reports_missing_file_as_io_error() {
        let path = std::env::temp_dir().join("maze-chase-core-missing").join("config.json");
        assert!(matches!(SimulationConfig::load(&path), Err(ConfigError::Io(_))));
    }
}
