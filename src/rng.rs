use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

use crate::types::Direction;

/// The simulation's single random source. Every random draw in a tick goes
/// through one of these, so a fixed seed replays a run exactly.
#[derive(Clone, Debug)]
pub struct Rng {
    seed: u64,
    inner: StdRng,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..=max)
    }

    pub fn bool(&mut self, probability: f32) -> bool {
        self.inner.random_bool(f64::from(probability.clamp(0.0, 1.0)))
    }

    /// True with `percent`% probability; values outside 0..=100 saturate.
    pub fn percent(&mut self, percent: f32) -> bool {
        if percent <= 0.0 {
            return false;
        }
        if percent >= 100.0 {
            return true;
        }
        self.bool(percent / 100.0)
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.random_range(0..len)
    }

    pub fn pick<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.pick_index(items.len());
        items.get(idx).copied()
    }

    pub fn direction(&mut self) -> Direction {
        match self.int(0, 3) {
            0 => Direction::Up,
            1 => Direction::Down,
            2 => Direction::Left,
            _ => Direction::Right,
        }
    }
}
