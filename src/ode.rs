//! Host-supplied ODE system.

use crate::{Float, matrix::Matrix};

/// Host-supplied ODE system.
///
/// Implement this trait for your model to provide the right-hand side
/// `y' = f(t, y)`, and optionally an analytical Jacobian and root functions.
/// The session calls these methods synchronously from inside
/// [`Session::advance`](crate::Session::advance), possibly many times per call and
/// speculatively during failed Newton iterations, so they must be pure functions of
/// their arguments.
///
/// # Example
///
/// ```ignore
/// struct Robertson;
/// impl OdeSystem for Robertson {
///     fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
///         dydt[0] = -0.04 * y[0] + 1e4 * y[1] * y[2];
///         dydt[2] = 3e7 * y[1] * y[1];
///         dydt[1] = -dydt[0] - dydt[2];
///     }
/// }
/// ```
pub trait OdeSystem {
    /// Fill `dydt` with the derivative at `(t, y)`.
    fn rhs(&self, t: Float, y: &[Float], dydt: &mut [Float]);

    /// Whether [`jacobian`](Self::jacobian) is implemented. Required by
    /// [`Variant::DenseAnalyticJacobian`](crate::Variant::DenseAnalyticJacobian).
    fn has_jacobian(&self) -> bool {
        false
    }

    /// Fill the N×N column-major matrix `jac` with `∂f_i/∂y_j` at `(t, y)`.
    /// `fy` holds `f(t, y)`. `jac` is zeroed before the call.
    fn jacobian(&self, _t: Float, _y: &[Float], _fy: &[Float], _jac: &mut Matrix) {}

    /// Fill `gout` with the root functions at `(t, y)`. Called only after
    /// [`Session::init_roots`](crate::Session::init_roots) with a non-zero count;
    /// `gout` has that many entries.
    fn roots(&self, _t: Float, _y: &[Float], _gout: &mut [Float]) {}
}

impl<S: OdeSystem + ?Sized> OdeSystem for &S {
    fn rhs(&self, t: Float, y: &[Float], dydt: &mut [Float]) {
        (**self).rhs(t, y, dydt)
    }

    fn has_jacobian(&self) -> bool {
        (**self).has_jacobian()
    }

    fn jacobian(&self, t: Float, y: &[Float], fy: &[Float], jac: &mut Matrix) {
        (**self).jacobian(t, y, fy, jac)
    }

    fn roots(&self, t: Float, y: &[Float], gout: &mut [Float]) {
        (**self).roots(t, y, gout)
    }
}

impl<S: OdeSystem + ?Sized> OdeSystem for Box<S> {
    fn rhs(&self, t: Float, y: &[Float], dydt: &mut [Float]) {
        (**self).rhs(t, y, dydt)
    }

    fn has_jacobian(&self) -> bool {
        (**self).has_jacobian()
    }

    fn jacobian(&self, t: Float, y: &[Float], fy: &[Float], jac: &mut Matrix) {
        (**self).jacobian(t, y, fy, jac)
    }

    fn roots(&self, t: Float, y: &[Float], gout: &mut [Float]) {
        (**self).roots(t, y, gout)
    }
}
