use std::ops::{Index, IndexMut};

/// A dense, row-major matrix of match variables.
///
/// During relaxation the matrix is `(n1 + 1) x (n2 + 1)`: the last row and
/// column are slack entries that absorb unmatched mass. Discrete matchings
/// drop the slack and are `n1 x n2` with entries exactly `0.0` or `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl MatchMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Overwrite this matrix with the contents of `other` without reallocating.
    ///
    /// # Panics
    ///
    /// Panics if the shapes differ.
    pub fn copy_from(&mut self, other: &MatchMatrix) {
        assert_eq!(
            (self.rows, self.cols),
            (other.rows, other.cols),
            "matrix shapes differ"
        );
        self.data.copy_from_slice(&other.data);
    }

    /// Sum of absolute entry-wise differences over the top-left `rows x cols` block
    pub fn abs_diff_sum(&self, other: &MatchMatrix, rows: usize, cols: usize) -> f64 {
        let mut sum = 0.0;
        for i in 0..rows {
            let a = &self.row(i)[..cols];
            let b = &other.row(i)[..cols];
            sum += a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>();
        }
        sum
    }

    pub fn row_sum(&self, i: usize) -> f64 {
        self.row(i).iter().sum()
    }

    pub fn col_sum(&self, j: usize) -> f64 {
        (0..self.rows).map(|i| self[(i, j)]).sum()
    }

    /// Selected cells (`value > 0`) in row-major order
    pub fn selected(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for i in 0..self.rows {
            for (j, &v) in self.row(i).iter().enumerate() {
                if v > 0.0 {
                    cells.push((i, j));
                }
            }
        }
        cells
    }

    /// True if every real row and column holds at most one positive entry
    pub fn is_partial_permutation(&self) -> bool {
        let mut col_used = vec![false; self.cols];
        for i in 0..self.rows {
            let mut row_used = false;
            for (j, &v) in self.row(i).iter().enumerate() {
                if v > 0.0 {
                    if row_used || col_used[j] {
                        return false;
                    }
                    row_used = true;
                    col_used[j] = true;
                }
            }
        }
        true
    }
}

impl Index<(usize, usize)> for MatchMatrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for MatchMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}
