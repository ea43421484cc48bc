use crate::rng::Rng;

/// Everything a tick needs that is not an entity: the shared generator, the
/// tick counter and the global countdowns. Zero means expired.
#[derive(Clone, Debug)]
pub struct SimulationContext {
    pub rng: Rng,
    pub tick: u64,
    pub vulnerability_ticks: u32,
    pub invincibility_ticks: u32,
    pub hazard_slow_ticks: u32,
    pub last_defeat_tick: Option<u64>,
    pub combo_chain: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerExpiry {
    pub vulnerability_ended: bool,
}

impl SimulationContext {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Rng::new(seed),
            tick: 0,
            vulnerability_ticks: 0,
            invincibility_ticks: 0,
            hazard_slow_ticks: 0,
            last_defeat_tick: None,
            combo_chain: 0,
        }
    }

    pub fn decrement_timers(&mut self) -> TimerExpiry {
        let was_vulnerable = self.vulnerability_ticks > 0;
        self.vulnerability_ticks = self.vulnerability_ticks.saturating_sub(1);
        self.invincibility_ticks = self.invincibility_ticks.saturating_sub(1);
        self.hazard_slow_ticks = self.hazard_slow_ticks.saturating_sub(1);
        TimerExpiry {
            vulnerability_ended: was_vulnerable && self.vulnerability_ticks == 0,
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_ticks > 0
    }

    pub fn is_slowed(&self) -> bool {
        self.hazard_slow_ticks > 0
    }

    /// Extends the defeat chain if the previous defeat is within `window`
    /// ticks, otherwise starts a new one. Returns the chain length.
    pub fn record_defeat(&mut self, window: u64) -> u32 {
        let chained = self
            .last_defeat_tick
            .is_some_and(|last| self.tick.saturating_sub(last) <= window);
        self.combo_chain = if chained { self.combo_chain + 1 } else { 1 };
        self.last_defeat_tick = Some(self.tick);
        self.combo_chain
    }

    pub fn clear_transient(&mut self) {
        self.vulnerability_ticks = 0;
        self.invincibility_ticks = 0;
        self.hazard_slow_ticks = 0;
        self.last_defeat_tick = None;
        self.combo_chain = 0;
    }
}
