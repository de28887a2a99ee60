//! Random tile placement.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::grid::Grid;

/// Probability that a spawned tile is a 2 rather than a 4.
pub const TWO_PROBABILITY: f32 = 0.9;

/// A tile placed by the spawner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    /// Row-major cell index.
    pub index: usize,
    pub value: u32,
}

/// Places new tiles using a seedable PRNG, so a fixed seed reproduces a game.
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: SmallRng,
}

impl Spawner {
    pub fn from_seed(seed: u64) -> Self {
        Spawner {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Spawner {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Put a 2 (90%) or 4 (10%) in a uniformly chosen empty cell.
    ///
    /// Returns `None` and leaves the grid untouched when it is full.
    pub fn spawn(&mut self, grid: &mut Grid) -> Option<Spawn> {
        let empty = grid.empty_cells();
        if empty.is_empty() {
            return None;
        }

        let index = empty[self.rng.gen_range(0..empty.len())];
        let value = if self.rng.gen::<f32>() < TWO_PROBABILITY {
            2
        } else {
            4
        };
        grid.set(index, value);
        Some(Spawn { index, value })
    }
}
