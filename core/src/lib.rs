//! # Tile Merge Engine
//!
//! The game logic behind 2048-style sliding-tile puzzles: an NxN grid of
//! tiles, directional moves with merge scoring, random tile spawns, bounded
//! undo and win/loss detection. Rendering, input, storage and audio belong to
//! collaborators, which drive the engine through [`Game`] and listen through
//! [`GameObserver`].
//!
//! ## Example
//!
//! ```rust
//! use tile_merge_core::{Direction, Game, GameConfig};
//!
//! let mut game = Game::new(GameConfig::seeded(42))?;
//! let result = game.step(Direction::Left);
//! println!("Score: {}, Moved: {}", game.score(), result.moved);
//! if result.moved {
//!     assert!(game.undo());
//! }
//! # Ok::<(), tile_merge_core::ConfigError>(())
//! ```

use std::fmt;

use log::{debug, info, trace};

pub mod config;
pub mod error;
pub mod events;
pub mod grid;
pub mod history;
pub mod moves;
pub mod spawn;
pub mod status;

pub use config::GameConfig;
pub use error::{ConfigError, GameError, GridError};
pub use events::{GameObserver, UpdateInfo};
pub use grid::{Grid, GridState};
pub use history::{History, Snapshot};
pub use moves::{Direction, Resolution};
pub use spawn::{Spawn, Spawner};
pub use status::Status;

use status::StatusTracker;

/// Result of requesting a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the grid changed (and a new tile was spawned).
    pub moved: bool,
    /// Points earned from merges in this move.
    pub reward: u64,
    /// Number of merges in this move.
    pub merged: u32,
    /// Status after the move.
    pub status: Status,
}

/// A running game: grid state, undo history, spawner and status.
pub struct Game {
    config: GameConfig,
    state: GridState,
    history: History,
    spawner: Spawner,
    status: StatusTracker,
    observers: Vec<Box<dyn GameObserver>>,
}

impl Game {
    /// Start a new game: empty grid, two spawned tiles, score 0.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::empty(config.size);
        let mut game = Self::assemble(config, GridState::new(grid, 0));
        game.start();
        Ok(game)
    }

    /// Resume from a given position instead of spawning a fresh grid.
    ///
    /// The status is evaluated once for the position, without notifying
    /// anyone. History starts empty.
    pub fn from_grid(config: GameConfig, grid: Grid, score: u64) -> Result<Self, GameError> {
        config.validate()?;
        if grid.size() != config.size {
            return Err(GameError::SizeMismatch {
                expected: config.size,
                actual: grid.size(),
            });
        }
        let mut game = Self::assemble(config, GridState::new(grid, score));
        game.status.evaluate(game.state.grid(), game.config.target);
        Ok(game)
    }

    fn assemble(config: GameConfig, state: GridState) -> Self {
        let spawner = match config.seed {
            Some(seed) => Spawner::from_seed(seed),
            None => Spawner::from_entropy(),
        };
        Game {
            history: History::with_capacity(config.undo_depth),
            config,
            state,
            spawner,
            status: StatusTracker::default(),
            observers: Vec::new(),
        }
    }

    /// Begin a new game with a different grid size and target.
    ///
    /// On a configuration error nothing changes.
    pub fn initialize(&mut self, size: usize, target: u32) -> Result<(), ConfigError> {
        config::validate(size, target)?;
        self.config.size = size;
        self.config.target = target;
        self.start();
        Ok(())
    }

    /// Begin a new game with the current size and target.
    ///
    /// The spawner keeps its random stream, so consecutive games differ.
    pub fn reset(&mut self) {
        self.start();
    }

    fn start(&mut self) {
        self.state = GridState::new(Grid::empty(self.config.size), 0);
        self.history.clear();
        self.status.reset();
        self.spawner.spawn(self.state.grid_mut());
        self.spawner.spawn(self.state.grid_mut());
        debug!(
            "new {n}x{n} game, target {}",
            self.config.target,
            n = self.config.size
        );
        self.notify_update(UpdateInfo::default());
    }

    /// Register an observer. Observers are called in registration order.
    pub fn subscribe(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    /// Slide the tiles toward `direction`.
    ///
    /// If the grid changes, the previous position is pushed to history, the
    /// score grows by the merged values, one tile is spawned and the status
    /// is re-evaluated. If it does not change, or the game is lost, nothing
    /// happens apart from an `on_rejected` notification.
    pub fn step(&mut self, direction: Direction) -> StepResult {
        if self.status.is_lost() {
            trace!("{direction:?} rejected: game is lost");
            return self.reject(direction);
        }

        let resolution = moves::resolve(self.state.grid(), direction);
        if !resolution.moved {
            trace!("{direction:?} rejected: nothing moves");
            return self.reject(direction);
        }

        self.history.push(self.state.snapshot());
        self.state.commit(resolution.grid, resolution.reward);
        let spawn = self.spawner.spawn(self.state.grid_mut());
        debug!(
            "{direction:?}: +{} ({} merges), spawned {spawn:?}, score {}",
            resolution.reward,
            resolution.merged,
            self.state.score()
        );

        let transition = self.status.evaluate(self.state.grid(), self.config.target);
        self.notify_update(UpdateInfo {
            merged: resolution.merged,
            is_undo: false,
        });
        if transition.first_win {
            info!("reached {} with score {}", self.config.target, self.state.score());
            self.observers.iter_mut().for_each(|o| o.on_win());
        }
        if transition.lost {
            let score = self.state.score();
            info!("game over, final score {score}, max tile {}", self.max_tile());
            self.observers.iter_mut().for_each(|o| o.on_game_over(score));
        }

        StepResult {
            moved: true,
            reward: resolution.reward,
            merged: resolution.merged,
            status: self.status.status(),
        }
    }

    /// Boolean form of [`Game::step`]: whether the move was applied.
    pub fn slide(&mut self, direction: Direction) -> bool {
        self.step(direction).moved
    }

    fn reject(&mut self, direction: Direction) -> StepResult {
        self.observers
            .iter_mut()
            .for_each(|o| o.on_rejected(direction));
        StepResult {
            moved: false,
            reward: 0,
            merged: 0,
            status: self.status.status(),
        }
    }

    /// Restore the position before the most recent committed move.
    ///
    /// Clears a lost status. Returns false, changing nothing, when there is
    /// no history left.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            trace!("undo rejected: history is empty");
            return false;
        };
        self.state.restore(snapshot);
        self.status.clear_lost();
        debug!(
            "undo to score {}, {} more available",
            self.state.score(),
            self.history.len()
        );
        self.notify_update(UpdateInfo {
            merged: 0,
            is_undo: true,
        });
        true
    }

    fn notify_update(&mut self, info: UpdateInfo) {
        let grid = self.state.grid();
        let score = self.state.score();
        for observer in &mut self.observers {
            observer.on_update(grid, score, info);
        }
    }

    /// Which directions would change the grid, as [Up, Down, Left, Right].
    ///
    /// All false once the game is lost.
    pub fn legal_moves(&self) -> [bool; 4] {
        if self.status.is_lost() {
            return [false; 4];
        }
        Direction::ALL.map(|d| moves::can_move(self.state.grid(), d))
    }

    pub fn grid(&self) -> &Grid {
        self.state.grid()
    }

    pub fn score(&self) -> u64 {
        self.state.score()
    }

    pub fn size(&self) -> usize {
        self.config.size
    }

    pub fn target(&self) -> u32 {
        self.config.target
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> Status {
        self.status.status()
    }

    /// Whether the target has been reached this session.
    pub fn is_won(&self) -> bool {
        self.status.is_won()
    }

    /// Whether the game is over (no move can change the grid).
    pub fn is_lost(&self) -> bool {
        self.status.is_lost()
    }

    /// Maximum tile value on the grid.
    pub fn max_tile(&self) -> u32 {
        self.state.grid().max_tile()
    }

    pub fn empty_count(&self) -> usize {
        self.state.grid().empty_count()
    }

    /// Number of moves that can currently be undone.
    pub fn undo_available(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Game {{ score: {}, status: {:?}, history: {}/{} }}",
            self.state.score(),
            self.status.status(),
            self.history.len(),
            self.history.capacity()
        )?;
        write!(f, "{:?}", self.state.grid())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.state.score())?;
        write!(f, "{}", self.state.grid())
    }
}

// =============================================================================
// Tests
// =============================================================================
