//! Board features for placement evaluation
//!
//! Computed on locked blocks only. Heights count from the floor: a column whose
//! highest block sits on row 3 has height 4.

use tetris_engine_core::Matrix;
use tetris_engine_types::PLAYFIELD_WIDTH;

const WIDTH: usize = PLAYFIELD_WIDTH as usize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardFeatures {
    pub aggregate_height: u32,
    pub max_height: u32,
    /// Empty cells with a block somewhere above them in the same column
    pub holes: u32,
    /// Sum of height differences between neighbouring columns
    pub bumpiness: u32,
}

pub fn board_features(matrix: &Matrix) -> BoardFeatures {
    let heights = matrix.column_heights();

    let mut aggregate_height = 0u32;
    let mut max_height = 0u32;
    for &h in &heights {
        aggregate_height += h as u32;
        max_height = max_height.max(h as u32);
    }

    BoardFeatures {
        aggregate_height,
        max_height,
        holes: count_holes(matrix, &heights),
        bumpiness: bumpiness(&heights),
    }
}

pub fn count_holes(matrix: &Matrix, heights: &[u8; WIDTH]) -> u32 {
    let mut holes = 0u32;
    for (x, &h) in heights.iter().enumerate() {
        for y in 0..h {
            if matrix.get(x as i8, y as i8) == Some(None) {
                holes += 1;
            }
        }
    }
    holes
}

pub fn bumpiness(heights: &[u8; WIDTH]) -> u32 {
    heights
        .windows(2)
        .map(|pair| (pair[0] as i32 - pair[1] as i32).unsigned_abs())
        .sum()
}
