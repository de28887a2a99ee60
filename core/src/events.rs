//! Observer surface for collaborators (renderers, statistics, audio, ...).
//!
//! Callbacks run synchronously, in registration order, at the point the
//! state changes. The engine itself never performs I/O.

use crate::grid::Grid;
use crate::moves::Direction;

/// Extra detail attached to an update notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateInfo {
    /// Merges performed by the move (0 for undo).
    pub merged: u32,
    /// The update restored a snapshot instead of applying a move.
    pub is_undo: bool,
}

/// Receives engine events. All methods default to doing nothing.
pub trait GameObserver {
    /// The grid or score changed, through a committed move or an undo.
    fn on_update(&mut self, _grid: &Grid, _score: u64, _info: UpdateInfo) {}

    /// The target tile appeared for the first time this session.
    fn on_win(&mut self) {}

    /// No move can change the grid any more.
    fn on_game_over(&mut self, _final_score: u64) {}

    /// A move was requested but changed nothing, or the game is lost.
    fn on_rejected(&mut self, _direction: Direction) {}
}
