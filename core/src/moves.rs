//! Move resolution.
//!
//! Every direction is reduced to a single "compact toward index 0" pass
//! over rows. The grid is first brought into that orientation by an
//! [`Orientation`] transform and mapped back with its inverse afterwards.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;

/// The four possible move directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    /// All four directions, in discriminant order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Convert a u8 to a Direction (0=Up, 1=Down, 2=Left, 3=Right).
    /// Returns None for invalid values.
    pub fn from_u8(value: u8) -> Option<Direction> {
        match value {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }

    fn orientation(self) -> Orientation {
        match self {
            Direction::Left => Orientation::Identity,
            Direction::Right => Orientation::Mirror,
            Direction::Up => Orientation::Transpose,
            Direction::Down => Orientation::TransposeMirror,
        }
    }
}

/// Reversible grid transform that turns a direction into "compact left".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Identity,
    Mirror,
    Transpose,
    /// Transpose, then mirror each row.
    TransposeMirror,
}

impl Orientation {
    fn apply(self, grid: &Grid) -> Grid {
        match self {
            Orientation::Identity => grid.clone(),
            Orientation::Mirror => grid.mirrored(),
            Orientation::Transpose => grid.transposed(),
            Orientation::TransposeMirror => grid.transposed().mirrored(),
        }
    }

    fn invert(self, grid: &Grid) -> Grid {
        match self {
            Orientation::Identity => grid.clone(),
            Orientation::Mirror => grid.mirrored(),
            Orientation::Transpose => grid.transposed(),
            Orientation::TransposeMirror => grid.mirrored().transposed(),
        }
    }
}

/// Outcome of sliding a grid in one direction. No tile has been spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Grid after compaction and merging.
    pub grid: Grid,
    /// Sum of merged tile values.
    pub reward: u64,
    /// Number of merges performed.
    pub merged: u32,
    /// Whether any cell differs from the input.
    pub moved: bool,
}

/// Slide and merge every line of `grid` toward `direction`.
pub fn resolve(grid: &Grid, direction: Direction) -> Resolution {
    let orientation = direction.orientation();
    let mut work = orientation.apply(grid);

    let mut reward = 0;
    let mut merged = 0;
    for row in 0..work.size() {
        let (row_reward, row_merged) = compact_and_merge(work.row_mut(row));
        reward += row_reward;
        merged += row_merged;
    }

    let out = orientation.invert(&work);
    let moved = out != *grid;
    Resolution {
        grid: out,
        reward,
        merged,
        moved,
    }
}

/// True if sliding toward `direction` would change the grid.
pub fn can_move(grid: &Grid, direction: Direction) -> bool {
    resolve(grid, direction).moved
}

/// Compact a line toward index 0, merging equal neighbours once each.
///
/// Returns the points earned and the number of merges. A tile produced by a
/// merge is never merged again in the same pass, so `[2, 2, 2, 0]` becomes
/// `[4, 2, 0, 0]` and `[4, 4, 4, 4]` becomes `[8, 8, 0, 0]`. Two
/// [`MAX_TILE`](crate::grid::MAX_TILE) tiles stay apart.
pub(crate) fn compact_and_merge(line: &mut [u32]) -> (u64, u32) {
    let tiles: Vec<u32> = line.iter().copied().filter(|&v| v != 0).collect();

    let mut reward = 0;
    let mut merged = 0;
    let mut write = 0;
    let mut read = 0;
    while read < tiles.len() {
        let value = tiles[read];
        let paired = tiles.get(read + 1) == Some(&value);
        match value.checked_mul(2) {
            Some(doubled) if paired => {
                line[write] = doubled;
                reward += u64::from(doubled);
                merged += 1;
                read += 2;
            }
            _ => {
                line[write] = value;
                read += 1;
            }
        }
        write += 1;
    }
    line[write..].fill(0);

    (reward, merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::MAX_TILE;

    fn line(values: [u32; 4]) -> ([u32; 4], u64) {
        let mut values = values;
        let (reward, _) = compact_and_merge(&mut values);
        (values, reward)
    }

    // -------------------------------------------------------------------------
    // Line compaction
    // -------------------------------------------------------------------------

    #[test]
    fn test_compact_simple() {
        assert_eq!(line([0, 2, 0, 4]), ([2, 4, 0, 0], 0));
    }

    #[test]
    fn test_already_compacted() {
        assert_eq!(line([2, 4, 8, 16]), ([2, 4, 8, 16], 0));
    }

    #[test]
    fn test_all_zeros() {
        assert_eq!(line([0, 0, 0, 0]), ([0, 0, 0, 0], 0));
    }

    #[test]
    fn test_merge_two_pairs() {
        assert_eq!(line([2, 2, 4, 4]), ([4, 8, 0, 0], 12));
    }

    #[test]
    fn test_no_chain_merge_of_three() {
        assert_eq!(line([2, 2, 2, 0]), ([4, 2, 0, 0], 4));
    }

    #[test]
    fn test_four_equal_merge_pairwise() {
        assert_eq!(line([4, 4, 4, 4]), ([8, 8, 0, 0], 16));
    }

    #[test]
    fn test_merged_tile_not_remerged() {
        // [4, 2, 2, 0] -> [4, 4, 0, 0], not [8, 0, 0, 0]
        assert_eq!(line([4, 2, 2, 0]), ([4, 4, 0, 0], 4));
    }

    #[test]
    fn test_merge_across_gap() {
        assert_eq!(line([2, 0, 0, 2]), ([4, 0, 0, 0], 4));
    }

    #[test]
    fn test_max_tiles_do_not_merge() {
        let mut values = [MAX_TILE, 0, MAX_TILE, 1 << 30, 1 << 30];
        let (reward, merged) = compact_and_merge(&mut values);
        assert_eq!(values, [MAX_TILE, MAX_TILE, MAX_TILE, 0, 0]);
        assert_eq!(reward, u64::from(MAX_TILE));
        assert_eq!(merged, 1);

        let grid = Grid::from_rows(&[&[MAX_TILE, MAX_TILE], &[0, 0]]).unwrap();
        let res = resolve(&grid, Direction::Left);
        assert!(!res.moved);
        assert_eq!(res.grid, grid);
    }

    #[test]
    fn test_merge_count() {
        let mut values = [8, 8, 8, 8, 2];
        let (reward, merged) = compact_and_merge(&mut values);
        assert_eq!(values, [16, 16, 2, 0, 0]);
        assert_eq!(reward, 32);
        assert_eq!(merged, 2);
    }

    // -------------------------------------------------------------------------
    // Whole-grid moves
    // -------------------------------------------------------------------------

    fn sample() -> Grid {
        Grid::from_cells(4, vec![2, 2, 0, 0, 0, 4, 4, 0, 2, 0, 2, 0, 8, 8, 8, 8]).unwrap()
    }

    fn columns() -> Grid {
        Grid::from_cells(4, vec![2, 0, 2, 8, 2, 4, 0, 8, 0, 4, 2, 8, 0, 0, 0, 8]).unwrap()
    }

    #[test]
    fn test_move_left() {
        let res = resolve(&sample(), Direction::Left);
        assert_eq!(
            res.grid.cells(),
            &[4, 0, 0, 0, 8, 0, 0, 0, 4, 0, 0, 0, 16, 16, 0, 0]
        );
        assert_eq!(res.reward, 4 + 8 + 4 + 32);
        assert_eq!(res.merged, 5);
        assert!(res.moved);
    }

    #[test]
    fn test_move_right() {
        let res = resolve(&sample(), Direction::Right);
        assert_eq!(
            res.grid.cells(),
            &[0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 0, 4, 0, 0, 16, 16]
        );
        assert_eq!(res.reward, 4 + 8 + 4 + 32);
    }

    #[test]
    fn test_move_up() {
        let res = resolve(&columns(), Direction::Up);
        assert_eq!(
            res.grid.cells(),
            &[4, 8, 4, 16, 0, 0, 0, 16, 0, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(res.reward, 4 + 8 + 4 + 32);
    }

    #[test]
    fn test_move_down() {
        let res = resolve(&columns(), Direction::Down);
        assert_eq!(
            res.grid.cells(),
            &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 16, 4, 8, 4, 16]
        );
        assert_eq!(res.reward, 4 + 8 + 4 + 32);
    }

    #[test]
    fn test_down_chain_rule_scans_from_bottom() {
        // Column (top to bottom) 2, 2, 2: the bottom pair merges first.
        let grid = Grid::from_rows(&[&[2, 0, 0], &[2, 0, 0], &[2, 0, 0]]).unwrap();
        let res = resolve(&grid, Direction::Down);
        assert_eq!(res.grid.cells(), &[0, 0, 0, 2, 0, 0, 4, 0, 0]);
    }

    #[test]
    fn test_flush_row_does_not_move() {
        let grid = Grid::from_rows(&[&[2, 4], &[8, 0]]).unwrap();
        let res = resolve(&grid, Direction::Left);
        assert!(!res.moved);
        assert_eq!(res.reward, 0);
        assert_eq!(res.grid, grid);
        assert!(can_move(&grid, Direction::Right));
        assert!(can_move(&grid, Direction::Up) || can_move(&grid, Direction::Down));
    }

    #[test]
    fn test_orientation_round_trip() {
        let grid = Grid::from_cells(3, vec![2, 4, 8, 16, 32, 64, 128, 256, 512]).unwrap();
        for direction in Direction::ALL {
            let o = direction.orientation();
            assert_eq!(o.invert(&o.apply(&grid)), grid, "{direction:?}");
        }
    }

    #[test]
    fn test_direction_from_u8() {
        assert_eq!(Direction::from_u8(0), Some(Direction::Up));
        assert_eq!(Direction::from_u8(1), Some(Direction::Down));
        assert_eq!(Direction::from_u8(2), Some(Direction::Left));
        assert_eq!(Direction::from_u8(3), Some(Direction::Right));
        assert_eq!(Direction::from_u8(4), None);
        assert_eq!(Direction::from_u8(255), None);
    }
}
