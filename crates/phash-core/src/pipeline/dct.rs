//! Orthonormal DCT-II, one- and two-dimensional.
//!
//! The 2D transform is separable: every row is transformed first, then every
//! column of the intermediate result. Coefficients keep their natural order, so
//! `[0][0]` is always the DC term.

use std::f64::consts::PI;

use crate::math::{FrequencyMatrix, Matrix};

/// Coefficients at or below `NOISE_FACTOR * rows * cols * max|input|` are
/// floating-point residue of terms that cancel exactly, and are flushed to 0.0.
const NOISE_FACTOR: f64 = 1e-12;

/// A DCT-II of a fixed length with its cosine table precomputed.
#[derive(Debug, Clone)]
pub struct Dct {
    size: usize,
    /// `cosines[k * size + i] = cos(pi * (i + 0.5) * k / size)`
    cosines: Vec<f64>,
    /// Orthonormal scale per output index.
    scales: Vec<f64>,
}

impl Dct {
    /// Precompute the transform for sequences of length `size`.
    pub fn new(size: usize) -> Self {
        let n = size as f64;
        let mut cosines = Vec::with_capacity(size * size);
        for k in 0..size {
            for i in 0..size {
                cosines.push((PI * (i as f64 + 0.5) * k as f64 / n).cos());
            }
        }
        let scales = (0..size)
            .map(|k| if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() })
            .collect();

        Self {
            size,
            cosines,
            scales,
        }
    }

    /// Length of the sequences this transform accepts.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Transform `input` into `output`. Both must be exactly `size()` long.
    pub fn transform(&self, input: &[f64], output: &mut [f64]) {
        debug_assert_eq!(input.len(), self.size);
        debug_assert_eq!(output.len(), self.size);

        for (k, out) in output.iter_mut().enumerate() {
            let basis = &self.cosines[k * self.size..(k + 1) * self.size];
            let mut sum = 0.0;
            for (x, c) in input.iter().zip(basis) {
                sum += x * c;
            }
            *out = sum * self.scales[k];
        }
    }

    /// Transform a `size x size` matrix. Other shapes fall back to [`dct_2d`].
    pub fn transform_2d(&self, matrix: &Matrix) -> FrequencyMatrix {
        if matrix.rows() == self.size && matrix.cols() == self.size {
            separable(self, self, matrix)
        } else {
            dct_2d(matrix)
        }
    }
}

/// One-dimensional DCT-II of an arbitrary-length sequence.
pub fn dct_1d(input: &[f64]) -> Vec<f64> {
    let dct = Dct::new(input.len());
    let mut output = vec![0.0; input.len()];
    dct.transform(input, &mut output);
    output
}

/// Two-dimensional DCT-II of a matrix of any shape.
pub fn dct_2d(matrix: &Matrix) -> FrequencyMatrix {
    let row_dct = Dct::new(matrix.cols());
    if matrix.is_square() {
        separable(&row_dct, &row_dct, matrix)
    } else {
        separable(&row_dct, &Dct::new(matrix.rows()), matrix)
    }
}

fn separable(row_dct: &Dct, col_dct: &Dct, input: &Matrix) -> FrequencyMatrix {
    let (rows, cols) = (input.rows(), input.cols());

    // Rows first.
    let mut out = Matrix::zeros(rows, cols);
    for r in 0..rows {
        row_dct.transform(input.row(r), out.row_mut(r));
    }

    // Then columns of the intermediate.
    let mut transformed = vec![0.0; rows];
    for c in 0..cols {
        let column = out.column(c);
        col_dct.transform(&column, &mut transformed);
        for (r, v) in transformed.iter().enumerate() {
            out[(r, c)] = *v;
        }
    }

    flush_rounding_noise(&mut out, input.max_abs());
    out
}

fn flush_rounding_noise(matrix: &mut Matrix, input_max_abs: f64) {
    let tolerance = NOISE_FACTOR * (matrix.rows() * matrix.cols()) as f64 * input_max_abs;
    for r in 0..matrix.rows() {
        for v in matrix.row_mut(r) {
            if v.abs() <= tolerance {
                *v = 0.0;
            }
        }
    }
}
