//! Low-frequency coefficient selection.

use crate::error::{PipelineError, PipelineResult};
use crate::math::FrequencyMatrix;

/// Side length of the low-frequency block taken from the top-left corner.
pub const BLOCK_SIZE: usize = 8;

/// Number of AC coefficients in the block (the DC term is dropped).
pub const COEFFICIENT_COUNT: usize = BLOCK_SIZE * BLOCK_SIZE - 1;

/// The 63 AC coefficients that feed the hash, in bit order.
pub type Coefficients = [f64; COEFFICIENT_COUNT];

/// `(row, col)` of each selected coefficient. Entry `i` drives hash bit `63 - i`.
///
/// Row 0 columns 1..8, then rows 1..8 columns 0..8. Changing this order changes
/// every stored hash.
pub const COEFFICIENT_POSITIONS: [(usize, usize); COEFFICIENT_COUNT] = block_positions();

const fn block_positions() -> [(usize, usize); COEFFICIENT_COUNT] {
    let mut positions = [(0, 0); COEFFICIENT_COUNT];
    let mut i = 0;
    let mut row = 0;
    while row < BLOCK_SIZE {
        let mut col = 0;
        while col < BLOCK_SIZE {
            if row != 0 || col != 0 {
                positions[i] = (row, col);
                i += 1;
            }
            col += 1;
        }
        row += 1;
    }
    positions
}

/// Extract the 63 lowest-frequency AC coefficients.
///
/// Fails with [`PipelineError::Dimension`] if the matrix is smaller than 8x8
/// in either axis.
pub fn select_low_frequencies(matrix: &FrequencyMatrix) -> PipelineResult<Coefficients> {
    if matrix.rows() < BLOCK_SIZE || matrix.cols() < BLOCK_SIZE {
        return Err(PipelineError::Dimension {
            rows: matrix.rows(),
            cols: matrix.cols(),
            required: BLOCK_SIZE,
        });
    }

    let mut coefficients = [0.0; COEFFICIENT_COUNT];
    for (slot, &(r, c)) in coefficients.iter_mut().zip(COEFFICIENT_POSITIONS.iter()) {
        *slot = matrix[(r, c)];
    }
    Ok(coefficients)
}
