//! Tile grid and the authoritative grid state (grid + score).
//!
//! The grid is stored as a flat `Vec<u32>` in row-major order: indices
//! `0..size` are row 0, `size..2*size` are row 1, and so on. Empty cells
//! are 0; tiles hold their face value (2, 4, 8, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::history::Snapshot;

/// Largest supported side length.
pub const MAX_SIZE: usize = 64;

/// Largest tile a `u32` cell can hold. Two of them never merge.
pub const MAX_TILE: u32 = 1 << 31;

/// Square matrix of tile values.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    size: usize,
    cells: Vec<u32>,
}

/// Unchecked wire form of a [`Grid`]; deserialization goes through
/// [`Grid::from_cells`].
#[derive(Deserialize)]
struct RawGrid {
    size: usize,
    cells: Vec<u32>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        Grid::from_cells(raw.size, raw.cells)
    }
}

impl Grid {
    /// Create an all-empty `size` x `size` grid. `size` is not checked;
    /// configurations are validated against [`MAX_SIZE`] before this runs.
    pub fn empty(size: usize) -> Self {
        Grid {
            size,
            cells: vec![0; size * size],
        }
    }

    /// Build a grid from row-major cells, checking the size, the cell count
    /// and that every tile is 0 or a power of two >= 2.
    pub fn from_cells(size: usize, cells: Vec<u32>) -> Result<Self, GridError> {
        if !(2..=MAX_SIZE).contains(&size) {
            return Err(GridError::Size {
                size,
                max: MAX_SIZE,
            });
        }
        if cells.len() != size * size {
            return Err(GridError::CellCount {
                expected: size * size,
                actual: cells.len(),
            });
        }
        if let Some((index, &value)) = cells
            .iter()
            .enumerate()
            .find(|(_, &v)| v == 1 || (v != 0 && !v.is_power_of_two()))
        {
            return Err(GridError::InvalidTile { index, value });
        }
        Ok(Grid { size, cells })
    }

    /// Build a grid from a list of rows. The row count sets the size.
    pub fn from_rows(rows: &[&[u32]]) -> Result<Self, GridError> {
        let size = rows.len();
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(GridError::RaggedRow {
                row,
                len: r.len(),
                expected: size,
            });
        }
        let cells = rows.iter().flat_map(|row| row.iter().copied()).collect();
        Self::from_cells(size, cells)
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Value at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row < self.size && col < self.size {
            Some(self.cells[row * self.size + col])
        } else {
            None
        }
    }

    /// Iterate over the rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ {
        self.cells.chunks(self.size)
    }

    /// Indices of the empty cells, in row-major order.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// Number of occupied cells.
    pub fn tile_count(&self) -> usize {
        self.cells.len() - self.empty_count()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn contains(&self, value: u32) -> bool {
        self.cells.contains(&value)
    }

    /// True if any two horizontally or vertically adjacent tiles are equal
    /// and could merge.
    pub fn has_adjacent_pair(&self) -> bool {
        let n = self.size;
        (0..n).any(|row| {
            (0..n).any(|col| {
                let v = self.cells[row * n + col];
                v != 0
                    && v < MAX_TILE
                    && ((col + 1 < n && self.cells[row * n + col + 1] == v)
                        || (row + 1 < n && self.cells[(row + 1) * n + col] == v))
            })
        })
    }

    /// Place a tile. The caller guarantees `index` is in range.
    pub(crate) fn set(&mut self, index: usize, value: u32) {
        self.cells[index] = value;
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> &mut [u32] {
        let n = self.size;
        &mut self.cells[row * n..(row + 1) * n]
    }

    /// Swap rows and columns.
    pub(crate) fn transposed(&self) -> Grid {
        let n = self.size;
        let mut out = Grid::empty(n);
        for row in 0..n {
            for col in 0..n {
                out.cells[col * n + row] = self.cells[row * n + col];
            }
        }
        out
    }

    /// Reverse every row.
    pub(crate) fn mirrored(&self) -> Grid {
        let mut out = self.clone();
        for row in out.cells.chunks_mut(self.size) {
            row.reverse();
        }
        out
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {{ size: {} }}", self.size)?;
        for row in self.rows() {
            for &val in row {
                if val == 0 {
                    write!(f, "    .")?;
                } else {
                    write!(f, "{:5}", val)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_tile().to_string().len().max(4) + 2;
        let border = format!("+{}", format!("{}+", "-".repeat(width)).repeat(self.size));
        writeln!(f, "{border}")?;
        for row in self.rows() {
            write!(f, "|")?;
            for &val in row {
                if val == 0 {
                    write!(f, "{}|", " ".repeat(width))?;
                } else {
                    write!(f, "{:^width$}|", val)?;
                }
            }
            writeln!(f)?;
            writeln!(f, "{border}")?;
        }
        Ok(())
    }
}

/// Authoritative grid and running score.
///
/// Mutated only through [`GridState::commit`] (a fully resolved move) and
/// [`GridState::restore`] (undo). Merge logic lives in [`crate::moves`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    grid: Grid,
    score: u64,
}

impl GridState {
    pub fn new(grid: Grid, score: u64) -> Self {
        GridState { grid, score }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Replace the grid with a resolved move result and add its score delta.
    pub fn commit(&mut self, grid: Grid, delta: u64) {
        debug_assert_eq!(grid.size(), self.grid.size());
        self.grid = grid;
        self.score += delta;
    }

    /// Independent copy of the current grid and score.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.grid.clone(), self.score)
    }

    /// Overwrite grid and score with a stored snapshot.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let (grid, score) = snapshot.into_parts();
        self.grid = grid;
        self.score = score;
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }
}
