//! Dense square matrix in column-major storage.

use std::ops::{Index, IndexMut};

use crate::Float;

/// Dense N×N matrix stored column-major, i.e. element `(i, j)` lives at
/// `data[j * n + i]`. This is the layout host Jacobians are written in.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<Float>,
}

impl Matrix {
    /// N×N matrix of zeros.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// N×N identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Build from column-major data. Returns `None` if `data.len() != n * n`.
    pub fn from_column_major(n: usize, data: Vec<Float>) -> Option<Self> {
        (data.len() == n * n).then_some(Self { n, data })
    }

    /// Number of rows (and columns).
    pub fn n(&self) -> usize {
        self.n
    }

    /// Column-major backing storage.
    pub fn as_slice(&self) -> &[Float] {
        &self.data
    }

    /// Mutable column-major backing storage.
    pub fn as_mut_slice(&mut self) -> &mut [Float] {
        &mut self.data
    }

    /// Column `j` as a contiguous slice.
    pub fn column(&self, j: usize) -> &[Float] {
        &self.data[j * self.n..(j + 1) * self.n]
    }

    /// Column `j` as a mutable contiguous slice.
    pub fn column_mut(&mut self, j: usize) -> &mut [Float] {
        let n = self.n;
        &mut self.data[j * n..(j + 1) * n]
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: Float) {
        self.data.fill(value);
    }

    /// `out = self · x`.
    pub fn mul_vec(&self, x: &[Float], out: &mut [Float]) {
        out.fill(0.0);
        for (j, &xj) in x.iter().enumerate() {
            if xj == 0.0 {
                continue;
            }
            for (o, &a) in out.iter_mut().zip(self.column(j)) {
                *o += a * xj;
            }
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Float;

    fn index(&self, (i, j): (usize, usize)) -> &Self::Output {
        &self.data[j * self.n + i]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Self::Output {
        &mut self.data[j * self.n + i]
    }
}

#[cfg(test)]
mod tests {
    use super::Matrix;

    #[test]
    fn storage_is_column_major() {
        let m = Matrix::from_column_major(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(1, 0)], 2.0);
        assert_eq!(m[(0, 1)], 3.0);
        assert_eq!(m.column(1), &[3.0, 4.0]);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Matrix::from_column_major(3, vec![0.0; 8]).is_none());
    }

    #[test]
    fn mul_vec_matches_hand_product() {
        // [[1, 3], [2, 4]] · [1, 1] = [4, 6]
        let m = Matrix::from_column_major(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut out = [0.0; 2];
        m.mul_vec(&[1.0, 1.0], &mut out);
        assert_eq!(out, [4.0, 6.0]);
    }
}
