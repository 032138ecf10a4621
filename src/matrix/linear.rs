//! Linear solves: A x = b via LU with partial pivoting.

use crate::Float;

use super::base::Matrix;

/// The matrix had a zero pivot and cannot be factored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingularMatrix;

/// LU factorization with partial pivoting, `P·A = L·U`.
///
/// The factors are kept so one factorization can serve every Newton iteration of a
/// step.
#[derive(Clone, Debug)]
pub struct Lu {
    n: usize,
    /// Row-major packed L (unit diagonal, below) and U (diagonal and above).
    a: Vec<Float>,
    /// `perm[k]` is the row swapped into position `k` at elimination step `k`.
    perm: Vec<usize>,
}

impl Lu {
    /// Factor `m`. Fails on an exactly zero or non-finite pivot.
    pub fn factor(m: &Matrix) -> Result<Self, SingularMatrix> {
        let n = m.n();

        // Densify into row-major for cache-friendly row operations
        let mut a = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                a[i * n + j] = m[(i, j)];
            }
        }
        let mut perm = vec![0; n];

        for k in 0..n {
            // pivot
            let mut pivot_row = k;
            let mut pivot_val = a[k * n + k].abs();
            for i in (k + 1)..n {
                let val = a[i * n + k].abs();
                if val > pivot_val {
                    pivot_val = val;
                    pivot_row = i;
                }
            }
            if pivot_val == 0.0 || !pivot_val.is_finite() {
                return Err(SingularMatrix);
            }
            perm[k] = pivot_row;
            if pivot_row != k {
                for j in 0..n {
                    a.swap(k * n + j, pivot_row * n + j);
                }
            }
            // Eliminate below the pivot
            let akk = a[k * n + k];
            for i in (k + 1)..n {
                let factor = a[i * n + k] / akk;
                a[i * n + k] = factor;
                if factor == 0.0 {
                    continue;
                }
                for j in (k + 1)..n {
                    a[i * n + j] -= factor * a[k * n + j];
                }
            }
        }

        Ok(Self { n, a, perm })
    }

    /// In-place solve: overwrites `b` with `x`.
    pub fn solve_mut(&self, b: &mut [Float]) {
        let n = self.n;
        debug_assert_eq!(b.len(), n, "right-hand side does not match the factored matrix");
        let a = &self.a;

        for (k, &p) in self.perm.iter().enumerate() {
            if p != k {
                b.swap(k, p);
            }
        }
        // Forward solve Ly = Pb
        for i in 0..n {
            let mut sum = b[i];
            for k in 0..i {
                sum -= a[i * n + k] * b[k];
            }
            b[i] = sum;
        }
        // Backward solve Ux = y
        for i in (0..n).rev() {
            let mut sum = b[i];
            for k in (i + 1)..n {
                sum -= a[i * n + k] * b[k];
            }
            b[i] = sum / a[i * n + i];
        }
    }

    /// Solve A x = b, returning x.
    pub fn solve(&self, b: &[Float]) -> Vec<Float> {
        let mut x = b.to_vec();
        self.solve_mut(&mut x);
        x
    }
}

#[cfg(test)]
mod tests {
    use super::{Lu, SingularMatrix};
    use crate::matrix::Matrix;

    #[test]
    fn solves_small_dense_system() {
        let mut a = Matrix::zeros(2);
        a[(0, 0)] = 3.0;
        a[(0, 1)] = 2.0;
        a[(1, 0)] = 1.0;
        a[(1, 1)] = 4.0;
        let x = Lu::factor(&a).unwrap().solve(&[5.0, 6.0]);
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.3).abs() < 1e-12);
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        // A = [[0, 1], [1, 0]] swaps components
        let a = Matrix::from_column_major(2, vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let lu = Lu::factor(&a).unwrap();
        assert_eq!(lu.solve(&[2.0, 3.0]), vec![3.0, 2.0]);
    }

    #[test]
    fn factors_reuse_across_right_hand_sides() {
        let a = Matrix::from_column_major(3, vec![4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0])
            .unwrap();
        let lu = Lu::factor(&a).unwrap();
        for b in [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 2.0, 3.0]] {
            let x = lu.solve(&b);
            let mut ax = [0.0; 3];
            a.mul_vec(&x, &mut ax);
            for (l, r) in ax.iter().zip(b.iter()) {
                assert!((l - r).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn singular_matrix_is_reported() {
        let a = Matrix::from_column_major(2, vec![1.0, 2.0, 2.0, 4.0]).unwrap();
        assert_eq!(Lu::factor(&a).unwrap_err(), SingularMatrix);
    }
}
