//! Backward-difference history of the BDF integrator.
//!
//! Row `k` of the history holds the k-th backward difference of the solution
//! on an equally spaced grid `t, t - h, t - 2h, ...`. Changing the step size
//! re-expresses the same interpolating polynomial on a new grid, so the
//! history stays valid across step size changes and failed attempts.

use crate::{Float, interpolate::Interpolate};

/// Transformation matrix for changing the grid spacing by `factor` at `order`.
fn compute_r(order: usize, factor: Float) -> Vec<Vec<Float>> {
    let m = order + 1;
    let mut r = vec![vec![0.0; m]; m];
    r[0].fill(1.0);
    for i in 1..m {
        for j in 1..m {
            let entry = (i as Float - 1.0 - factor * j as Float) / i as Float;
            r[i][j] = r[i - 1][j] * entry;
        }
    }
    r
}

/// Rescale the first `order + 1` rows of `d` for a step size multiplied by `factor`.
pub(crate) fn change_d(d: &mut [Vec<Float>], order: usize, factor: Float) {
    let m = order + 1;
    let r = compute_r(order, factor);
    let u = compute_r(order, 1.0);

    let mut ru = vec![vec![0.0; m]; m];
    for i in 0..m {
        for j in 0..m {
            ru[i][j] = (0..m).map(|k| r[i][k] * u[k][j]).sum();
        }
    }

    let old = d[..m].to_vec();
    for (k, row) in d[..m].iter_mut().enumerate() {
        for (x, value) in row.iter_mut().enumerate() {
            *value = (0..m).map(|j| ru[j][k] * old[j][x]).sum();
        }
    }
}

/// Dense output over the history: the polynomial through the last `order + 1`
/// grid points.
pub struct BdfInterpolant<'a> {
    t: Float,
    h: Float,
    order: usize,
    d: &'a [Vec<Float>],
}

impl<'a> BdfInterpolant<'a> {
    pub(crate) fn new(t: Float, h: Float, order: usize, d: &'a [Vec<Float>]) -> Self {
        Self { t, h, order, d }
    }
}

impl Interpolate for BdfInterpolant<'_> {
    fn interpolate(&self, t: Float, y: &mut [Float]) {
        y.copy_from_slice(&self.d[0]);
        let mut p = 1.0;
        for j in 1..=self.order {
            let m = (j - 1) as Float;
            p *= (t - (self.t - m * self.h)) / ((m + 1.0) * self.h);
            for (yi, dj) in y.iter_mut().zip(&self.d[j]) {
                *yi += p * dj;
            }
        }
    }
}
