//! Mechanical effects of equipped items. The engine only reads magnitudes;
//! how an effect was bought or equipped is not its concern.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::ArchetypeKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    PlayerSpeed,
    VulnerabilityBonus,
    PelletMagnet,
    IceStack,
    TrapDurationBonus,
    DamageAvoidancePatrol,
    DamageAvoidanceChase,
    DamageAvoidanceWander,
    ExtraHits,
    Shield,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Modifiers {
    effects: BTreeMap<Effect, f32>,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let modifiers: Self = serde_json::from_str(raw)?;
        if let Some((effect, value)) = modifiers
            .effects
            .iter()
            .find(|(_, value)| !value.is_finite() || **value < 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "modifier {effect:?} has invalid magnitude {value}"
            )));
        }
        Ok(modifiers)
    }

    pub fn with(mut self, effect: Effect, magnitude: f32) -> Self {
        self.set(effect, magnitude);
        self
    }

    pub fn set(&mut self, effect: Effect, magnitude: f32) {
        self.effects.insert(effect, magnitude);
    }

    pub fn get(&self, effect: Effect) -> Option<f32> {
        self.effects.get(&effect).copied()
    }

    fn ticks(&self, effect: Effect) -> u32 {
        self.get(effect).map(|v| v.max(0.0).round() as u32).unwrap_or(0)
    }

    pub fn player_speed(&self) -> f32 {
        self.get(Effect::PlayerSpeed)
            .filter(|v| *v > 0.0)
            .unwrap_or(1.0)
    }

    fn radius(&self, effect: Effect) -> i32 {
        i32::try_from(self.ticks(effect)).unwrap_or(i32::MAX)
    }

    pub fn vulnerability_bonus_ticks(&self) -> u32 {
        self.ticks(Effect::VulnerabilityBonus)
    }

    pub fn pellet_magnet_range(&self) -> i32 {
        self.radius(Effect::PelletMagnet)
    }

    pub fn ice_stack(&self) -> u32 {
        self.ticks(Effect::IceStack)
    }

    pub fn trap_duration_bonus(&self) -> u32 {
        self.ticks(Effect::TrapDurationBonus)
    }

    pub fn damage_avoidance_percent(&self, kind: ArchetypeKind) -> f32 {
        let effect = match kind {
            ArchetypeKind::Patrol => Effect::DamageAvoidancePatrol,
            ArchetypeKind::Chase => Effect::DamageAvoidanceChase,
            ArchetypeKind::Wander => Effect::DamageAvoidanceWander,
        };
        self.get(effect).unwrap_or(0.0).clamp(0.0, 100.0)
    }

    pub fn extra_hits(&self) -> u32 {
        self.ticks(Effect::ExtraHits)
    }

    pub fn shield_radius(&self) -> i32 {
        self.radius(Effect::Shield)
    }
}
