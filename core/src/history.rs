//! Undo history.
//!
//! Snapshots are stored by value in a fixed-capacity ring buffer. When the
//! buffer is full the oldest snapshot is overwritten.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// Immutable copy of a grid and score taken just before a committed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    grid: Grid,
    score: u64,
}

impl Snapshot {
    pub fn new(grid: Grid, score: u64) -> Self {
        Snapshot { grid, score }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn into_parts(self) -> (Grid, u64) {
        (self.grid, self.score)
    }
}

/// Bounded stack of snapshots backed by a ring buffer.
#[derive(Debug, Clone)]
pub struct History {
    slots: Vec<Option<Snapshot>>,
    /// Slot the next push writes to.
    head: usize,
    len: usize,
}

impl History {
    /// A history holding at most `capacity` snapshots. Capacity 0 keeps nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        History {
            slots: vec![None; capacity],
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Push a snapshot, dropping the oldest one if the buffer is full.
    pub fn push(&mut self, snapshot: Snapshot) {
        let capacity = self.capacity();
        if capacity == 0 {
            return;
        }
        self.slots[self.head] = Some(snapshot);
        self.head = (self.head + 1) % capacity;
        self.len = (self.len + 1).min(capacity);
    }

    /// Remove and return the most recent snapshot.
    pub fn pop(&mut self) -> Option<Snapshot> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.capacity();
        self.head = (self.head + capacity - 1) % capacity;
        self.len -= 1;
        self.slots[self.head].take()
    }

    /// Most recent snapshot without removing it.
    pub fn peek(&self) -> Option<&Snapshot> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.capacity();
        self.slots[(self.head + capacity - 1) % capacity].as_ref()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
    }
}
