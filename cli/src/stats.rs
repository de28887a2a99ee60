//! Session statistics kept by the frontend.
//!
//! The engine only reports events; this module turns them into best score
//! and win counts. Storage is in memory and lasts for the process.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use tile_merge_core::{GameObserver, Grid, UpdateInfo};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub best_score: u64,
    pub best_tile: u32,
    pub games_played: u32,
    pub games_won: u32,
}

/// Persistence collaborator for game statistics.
pub trait StatisticsStore {
    fn update_best_score(&mut self, score: u64);
    fn update_best_tile(&mut self, tile: u32);
    fn increment_games_played(&mut self);
    fn increment_games_won(&mut self);
    fn statistics(&self) -> Statistics;
}

#[derive(Debug, Default)]
pub struct MemoryStatistics {
    stats: Statistics,
}

impl StatisticsStore for MemoryStatistics {
    fn update_best_score(&mut self, score: u64) {
        self.stats.best_score = self.stats.best_score.max(score);
    }

    fn update_best_tile(&mut self, tile: u32) {
        self.stats.best_tile = self.stats.best_tile.max(tile);
    }

    fn increment_games_played(&mut self) {
        self.stats.games_played += 1;
    }

    fn increment_games_won(&mut self) {
        self.stats.games_won += 1;
    }

    fn statistics(&self) -> Statistics {
        self.stats
    }
}

/// Feeds engine events into a shared [`StatisticsStore`].
pub struct StatsRecorder<S> {
    store: Rc<RefCell<S>>,
}

impl<S: StatisticsStore> StatsRecorder<S> {
    pub fn new(store: Rc<RefCell<S>>) -> Self {
        StatsRecorder { store }
    }
}

impl<S: StatisticsStore> GameObserver for StatsRecorder<S> {
    fn on_update(&mut self, grid: &Grid, score: u64, info: UpdateInfo) {
        // Undo can lower the score; the best score was already recorded.
        if !info.is_undo {
            let mut store = self.store.borrow_mut();
            store.update_best_score(score);
            store.update_best_tile(grid.max_tile());
        }
    }

    fn on_win(&mut self) {
        self.store.borrow_mut().increment_games_won();
    }

    fn on_game_over(&mut self, final_score: u64) {
        debug!("recording final score {final_score}");
        self.store.borrow_mut().update_best_score(final_score);
    }
}
