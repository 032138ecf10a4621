#![allow(dead_code)]

use std::cell::Cell;

use stiff_session::{Float, Matrix, OdeSystem};

/// y' = -k y, componentwise.
pub struct Decay {
    pub k: Float,
}

impl OdeSystem for Decay {
    fn rhs(&self, _t: Float, y: &[Float], dydt: &mut [Float]) {
        for (d, v) in dydt.iter_mut().zip(y) {
            *d = -self.k * v;
        }
    }

    fn has_jacobian(&self) -> bool {
        true
    }

    fn jacobian(&self, _t: Float, y: &[Float], _fy: &[Float], jac: &mut Matrix) {
        for j in 0..y.len() {
            jac.column_mut(j)[j] = -self.k;
        }
    }
}

/// Two-stage chain a -> b -> ., with rates 1 and 2.
///
/// From (1, 0): a = e^-t, b = e^-t - e^-2t.
#[derive(Debug)]
pub struct Chain;

impl OdeSystem for Chain {
    fn rhs(&self, _t: Float, y: &[Float], dydt: &mut [Float]) {
        dydt[0] = -y[0];
        dydt[1] = y[0] - 2.0 * y[1];
    }
}

pub fn chain_exact(t: Float) -> [Float; 2] {
    [(-t).exp(), (-t).exp() - (-2.0 * t).exp()]
}

/// Robertson chemical kinetics.
pub struct Robertson;

impl OdeSystem for Robertson {
    fn rhs(&self, _t: Float, y: &[Float], dydt: &mut [Float]) {
        dydt[0] = -0.04 * y[0] + 1e4 * y[1] * y[2];
        dydt[2] = 3e7 * y[1] * y[1];
        dydt[1] = -dydt[0] - dydt[2];
    }

    fn has_jacobian(&self) -> bool {
        true
    }

    fn jacobian(&self, _t: Float, y: &[Float], _fy: &[Float], jac: &mut Matrix) {
        let c0 = jac.column_mut(0);
        c0[0] = -0.04;
        c0[1] = 0.04;
        let c1 = jac.column_mut(1);
        c1[0] = 1e4 * y[2];
        c1[1] = -1e4 * y[2] - 6e7 * y[1];
        c1[2] = 6e7 * y[1];
        let c2 = jac.column_mut(2);
        c2[0] = 1e4 * y[1];
        c2[1] = -1e4 * y[1];
    }
}

/// Stiff relaxation onto a slowly moving target: y' = -1000 (y - cos t).
pub struct Relaxation;

impl OdeSystem for Relaxation {
    fn rhs(&self, t: Float, y: &[Float], dydt: &mut [Float]) {
        dydt[0] = -1000.0 * (y[0] - t.cos());
    }
}

/// y' = -y with a root where y crosses 0.5.
pub struct HalfLife;

impl OdeSystem for HalfLife {
    fn rhs(&self, _t: Float, y: &[Float], dydt: &mut [Float]) {
        dydt[0] = -y[0];
    }

    fn roots(&self, _t: Float, y: &[Float], gout: &mut [Float]) {
        gout[0] = y[0] - 0.5;
    }
}

/// [`Chain`] whose right-hand side returns NaN while `broken` is set.
#[derive(Default)]
pub struct FlakyChain {
    pub broken: Cell<bool>,
}

impl OdeSystem for FlakyChain {
    fn rhs(&self, t: Float, y: &[Float], dydt: &mut [Float]) {
        if self.broken.get() {
            dydt.fill(Float::NAN);
        } else {
            Chain.rhs(t, y, dydt);
        }
    }
}
