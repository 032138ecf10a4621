//! Scaled GMRES for matrix-free Newton systems.
//!
//! Solves `A x = b` where `A` is only available as a matrix-vector product. The
//! iteration runs on the diagonally scaled system `S A S⁻¹ (S x) = S b`, with
//! `S = diag(1 / scale)`, so the stopping test is the same weighted RMS norm the
//! integrator uses for its error control. There is no preconditioner and no restart.

use crate::Float;

/// Result of one GMRES solve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GmresOutcome {
    /// The weighted residual met the tolerance.
    pub converged: bool,
    /// Weighted RMS norm of the final residual.
    pub residual: Float,
    /// Weighted RMS norm of `b`, the residual of the zero initial guess.
    pub initial_residual: Float,
    /// Number of Krylov vectors built.
    pub iterations: usize,
}

impl GmresOutcome {
    /// `true` when the returned `x` is at least better than the zero guess.
    pub fn reduced(&self) -> bool {
        self.converged || self.residual < self.initial_residual
    }
}

/// GMRES workspace with a fixed maximum Krylov dimension.
#[derive(Clone, Debug)]
pub struct Gmres {
    maxl: usize,
    basis: Vec<Vec<Float>>,
    hess: Vec<Vec<Float>>,
    cs: Vec<Float>,
    sn: Vec<Float>,
    g: Vec<Float>,
    work: Vec<Float>,
    av: Vec<Float>,
}

impl Gmres {
    /// Workspace for systems of size `n` with at most `maxl` Krylov vectors.
    pub fn new(n: usize, maxl: usize) -> Self {
        let maxl = maxl.clamp(1, n.max(1));
        Self {
            maxl,
            basis: vec![vec![0.0; n]; maxl + 1],
            hess: vec![vec![0.0; maxl]; maxl + 1],
            cs: vec![0.0; maxl],
            sn: vec![0.0; maxl],
            g: vec![0.0; maxl + 1],
            work: vec![0.0; n],
            av: vec![0.0; n],
        }
    }

    /// Maximum Krylov dimension.
    pub fn maxl(&self) -> usize {
        self.maxl
    }

    /// Solve `A x = b` starting from `x = 0`, where `apply(v, out)` writes `A·v`.
    ///
    /// `tol` bounds the weighted RMS norm of the residual.
    pub fn solve<A>(
        &mut self,
        mut apply: A,
        b: &[Float],
        scale: &[Float],
        tol: Float,
        x: &mut [Float],
    ) -> GmresOutcome
    where
        A: FnMut(&[Float], &mut [Float]),
    {
        let n = b.len();
        let rms = (n.max(1) as Float).sqrt();
        x.fill(0.0);

        // r0 = S b
        for i in 0..n {
            self.basis[0][i] = b[i] / scale[i];
        }
        let beta = norm2(&self.basis[0]);
        let initial_residual = beta / rms;
        if beta == 0.0 {
            return GmresOutcome {
                converged: true,
                residual: 0.0,
                initial_residual,
                iterations: 0,
            };
        }
        for v in self.basis[0].iter_mut() {
            *v /= beta;
        }
        self.g.fill(0.0);
        self.g[0] = beta;

        let mut k = 0;
        let mut residual = initial_residual;
        let mut converged = false;
        for j in 0..self.maxl {
            // w = S A S⁻¹ v_j
            for i in 0..n {
                self.work[i] = self.basis[j][i] * scale[i];
            }
            apply(&self.work, &mut self.av);
            for i in 0..n {
                self.work[i] = self.av[i] / scale[i];
            }

            // Modified Gram-Schmidt
            for i in 0..=j {
                let h = dot(&self.work, &self.basis[i]);
                self.hess[i][j] = h;
                for (w, v) in self.work.iter_mut().zip(&self.basis[i]) {
                    *w -= h * v;
                }
            }
            let w_norm = norm2(&self.work);
            self.hess[j + 1][j] = w_norm;

            // Apply the previous Givens rotations to the new column
            for i in 0..j {
                let (hi, hi1) = (self.hess[i][j], self.hess[i + 1][j]);
                self.hess[i][j] = self.cs[i] * hi + self.sn[i] * hi1;
                self.hess[i + 1][j] = -self.sn[i] * hi + self.cs[i] * hi1;
            }
            let (hjj, hj1j) = (self.hess[j][j], self.hess[j + 1][j]);
            let denom = hjj.hypot(hj1j);
            if denom == 0.0 {
                self.cs[j] = 1.0;
                self.sn[j] = 0.0;
            } else {
                self.cs[j] = hjj / denom;
                self.sn[j] = hj1j / denom;
            }
            self.hess[j][j] = denom;
            self.hess[j + 1][j] = 0.0;
            self.g[j + 1] = -self.sn[j] * self.g[j];
            self.g[j] *= self.cs[j];

            k = j + 1;
            residual = self.g[j + 1].abs() / rms;
            if residual <= tol {
                converged = true;
                break;
            }
            if w_norm == 0.0 {
                // Krylov space is invariant; the least-squares solution is exact
                converged = true;
                break;
            }
            if j + 1 < self.basis.len() {
                for i in 0..n {
                    self.basis[j + 1][i] = self.work[i] / w_norm;
                }
            }
        }

        // Back substitution on the k×k upper-triangular system
        let mut y = vec![0.0; k];
        for i in (0..k).rev() {
            let mut sum = self.g[i];
            for l in (i + 1)..k {
                sum -= self.hess[i][l] * y[l];
            }
            y[i] = if self.hess[i][i] == 0.0 {
                0.0
            } else {
                sum / self.hess[i][i]
            };
        }

        // x = S⁻¹ Σ y_i v_i
        for (i, &yi) in y.iter().enumerate() {
            for (xl, v) in x.iter_mut().zip(&self.basis[i]) {
                *xl += yi * v;
            }
        }
        for (xl, s) in x.iter_mut().zip(scale) {
            *xl *= s;
        }

        GmresOutcome {
            converged,
            residual,
            initial_residual,
            iterations: k,
        }
    }
}

fn dot(a: &[Float], b: &[Float]) -> Float {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm2(a: &[Float]) -> Float {
    dot(a, a).sqrt()
}
