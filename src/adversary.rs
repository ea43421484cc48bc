use std::sync::Arc;

use crate::levels::AdversarySpawn;
use crate::types::{AdversaryView, ArchetypeKind, Direction, Vec2};

/// Behaviour variant; each carries only the state its targeting rule needs.
#[derive(Clone, Debug)]
pub enum Archetype {
    Patrol {
        /// Shared with every patroller on the level, never mutated after load.
        route: Option<Arc<[Vec2]>>,
        index: usize,
    },
    Chase,
    Wander,
}

impl Archetype {
    pub fn for_kind(kind: ArchetypeKind, route: Option<Arc<[Vec2]>>) -> Self {
        match kind {
            ArchetypeKind::Patrol => Self::Patrol {
                route: route.filter(|cells| !cells.is_empty()),
                index: 0,
            },
            ArchetypeKind::Chase => Self::Chase,
            ArchetypeKind::Wander => Self::Wander,
        }
    }

    pub fn kind(&self) -> ArchetypeKind {
        match self {
            Self::Patrol { .. } => ArchetypeKind::Patrol,
            Self::Chase => ArchetypeKind::Chase,
            Self::Wander => ArchetypeKind::Wander,
        }
    }
}

/// Behavioural mode. Vulnerable and eyes-only are distinct variants, so they
/// can never hold at the same time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdversaryMode {
    Normal,
    Vulnerable,
    /// Defeated; crosses walls on the way back to `home`.
    Eyes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Damaged,
    Defeated,
}

#[derive(Clone, Debug)]
pub struct Adversary {
    pub id: u32,
    pub pos: Vec2,
    pub home: Vec2,
    pub dir: Direction,
    pub archetype: Archetype,
    pub mode: AdversaryMode,
    pub harmless: bool,
    pub flee_timer: u32,
    pub immobilized_timer: u32,
    pub ice_slowdown_counter: u32,
    pub hits_required: u32,
    pub hits_taken: u32,
    /// Evaluated ticks since spawn, used for the ticks-per-move divisor.
    pub step_counter: u64,
}

impl Adversary {
    pub fn from_spawn(
        id: u32,
        spawn: &AdversarySpawn,
        route: Option<Arc<[Vec2]>>,
        extra_hits: u32,
        dir: Direction,
    ) -> Self {
        Self {
            id,
            pos: spawn.home,
            home: spawn.home,
            dir,
            archetype: Archetype::for_kind(spawn.archetype, route),
            mode: AdversaryMode::Normal,
            harmless: spawn.harmless,
            flee_timer: 0,
            immobilized_timer: 0,
            ice_slowdown_counter: 0,
            hits_required: spawn.hits_required.max(1).saturating_add(extra_hits),
            hits_taken: 0,
            step_counter: 0,
        }
    }

    pub fn kind(&self) -> ArchetypeKind {
        self.archetype.kind()
    }

    pub fn is_vulnerable(&self) -> bool {
        self.mode == AdversaryMode::Vulnerable
    }

    pub fn is_eyes_only(&self) -> bool {
        self.mode == AdversaryMode::Eyes
    }

    pub fn is_fleeing(&self) -> bool {
        self.flee_timer > 0
    }

    pub fn is_immobilized(&self) -> bool {
        self.immobilized_timer > 0
    }

    /// Eyes and harmless hazards ignore traps, scare tiles and power pellets.
    pub fn is_affected_by_effects(&self) -> bool {
        !self.is_eyes_only() && !self.harmless
    }

    pub fn make_vulnerable(&mut self) -> bool {
        if !self.is_affected_by_effects() {
            return false;
        }
        self.mode = AdversaryMode::Vulnerable;
        true
    }

    pub fn end_vulnerability(&mut self) {
        if self.mode == AdversaryMode::Vulnerable {
            self.mode = AdversaryMode::Normal;
        }
    }

    /// Counts one vulnerable contact; equality with `hits_required` defeats.
    pub fn register_hit(&mut self) -> HitOutcome {
        self.hits_taken = (self.hits_taken + 1).min(self.hits_required);
        if self.hits_taken == self.hits_required {
            HitOutcome::Defeated
        } else {
            HitOutcome::Damaged
        }
    }

    pub fn become_eyes(&mut self) {
        self.mode = AdversaryMode::Eyes;
        self.flee_timer = 0;
        self.immobilized_timer = 0;
        self.ice_slowdown_counter = 0;
    }

    pub fn knock_home(&mut self) {
        self.pos = self.home;
        self.mode = AdversaryMode::Normal;
        self.flee_timer = 0;
    }

    /// Eyes reached home: drop every special flag and resume the archetype.
    pub fn arrive_home(&mut self, dir: Direction) {
        self.mode = AdversaryMode::Normal;
        self.flee_timer = 0;
        self.hits_taken = 0;
        self.dir = dir;
    }

    pub fn reset_to_home(&mut self, dir: Direction) {
        self.pos = self.home;
        self.dir = dir;
        self.mode = AdversaryMode::Normal;
        self.flee_timer = 0;
        self.immobilized_timer = 0;
        self.ice_slowdown_counter = 0;
        self.hits_taken = 0;
        self.step_counter = 0;
        if let Archetype::Patrol { index, .. } = &mut self.archetype {
            *index = 0;
        }
    }

    pub fn view(&self) -> AdversaryView {
        AdversaryView {
            id: self.id,
            x: self.pos.x,
            y: self.pos.y,
            dir: self.dir,
            archetype: self.kind(),
            vulnerable: self.is_vulnerable(),
            eyes_only: self.is_eyes_only(),
            fleeing: self.is_fleeing(),
            immobilized: self.is_immobilized(),
            harmless: self.harmless,
            hits_taken: self.hits_taken,
            hits_required: self.hits_required,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(hits: u32) -> AdversarySpawn {
        AdversarySpawn::new(ArchetypeKind::Chase, Vec2::new(5, 5)).with_hits(hits)
    }

    #[test]
    fn two_hit_variant_survives_the_first_hit() {
        let mut adversary = Adversary::from_spawn(1, &spawn(2), None, 0, Direction::Left);
        assert!(adversary.make_vulnerable());
        adversary.pos = Vec2::new(7, 5);
        assert_eq!(adversary.register_hit(), HitOutcome::Damaged);
        adversary.knock_home();
        assert_eq!(adversary.hits_taken, 1);
        assert_eq!(adversary.pos, adversary.home);
        assert!(!adversary.is_vulnerable());

        assert!(adversary.make_vulnerable());
        assert_eq!(adversary.register_hit(), HitOutcome::Defeated);
        assert_eq!(adversary.hits_taken, adversary.hits_required);
    }

    #[test]
    fn extra_hits_modifier_raises_the_requirement() {
        let adversary = Adversary::from_spawn(1, &spawn(1), None, 2, Direction::Left);
        assert_eq!(adversary.hits_required, 3);
    }

    #[test]
    fn eyes_are_never_vulnerable() {
        let mut adversary = Adversary::from_spawn(1, &spawn(1), None, 0, Direction::Up);
        assert!(adversary.make_vulnerable());
        adversary.become_eyes();
        assert!(adversary.is_eyes_only());
        assert!(!adversary.is_vulnerable());
        assert!(!adversary.make_vulnerable());
        assert!(adversary.is_eyes_only());
    }

    #[test]
    fn harmless_hazards_ignore_power_pellets() {
        let mut hazard_spawn = spawn(1);
        hazard_spawn.harmless = true;
        let mut adversary = Adversary::from_spawn(1, &hazard_spawn, None, 0, Direction::Up);
        assert!(!adversary.make_vulnerable());
        assert!(!adversary.is_affected_by_effects());
    }

    #[test]
    fn patrol_without_cells_has_no_route() {
        let empty: Arc<[Vec2]> = Arc::from(Vec::new());
        match Archetype::for_kind(ArchetypeKind::Patrol, Some(empty)) {
            Archetype::Patrol { route, index } => {
                assert!(route.is_none());
                assert_eq!(index, 0);
            }
            other => panic!("expected patrol, got {other:?}"),
        }
    }
}
