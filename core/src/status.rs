//! Win / loss classification.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Overall state of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Ongoing,
    /// The target tile has appeared. Play may continue.
    Won,
    /// No move can change the grid. Terminal until undo or reset.
    Lost,
}

/// True when the grid is full and no two neighbouring tiles are equal.
pub fn is_lost(grid: &Grid) -> bool {
    grid.empty_count() == 0 && !grid.has_adjacent_pair()
}

/// True when any tile has reached `target`.
pub fn reached_target(grid: &Grid, target: u32) -> bool {
    grid.max_tile() >= target
}

/// Sticky won flag and terminal lost flag, updated after committed moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTracker {
    won: bool,
    lost: bool,
}

/// What changed in a [`StatusTracker::evaluate`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    /// The target was reached for the first time this session.
    pub first_win: bool,
    /// The grid just became lost.
    pub lost: bool,
}

impl StatusTracker {
    pub fn status(&self) -> Status {
        if self.lost {
            Status::Lost
        } else if self.won {
            Status::Won
        } else {
            Status::Ongoing
        }
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Re-examine `grid` after a committed move.
    pub fn evaluate(&mut self, grid: &Grid, target: u32) -> Transition {
        let first_win = !self.won && reached_target(grid, target);
        self.won |= first_win;
        let was_lost = self.lost;
        self.lost = is_lost(grid);
        Transition {
            first_win,
            lost: self.lost && !was_lost,
        }
    }

    /// Leave the lost state after an undo. The won flag is kept.
    pub fn clear_lost(&mut self) {
        self.lost = false;
    }

    pub fn reset(&mut self) {
        *self = StatusTracker::default();
    }
}
