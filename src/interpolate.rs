//! Shared interpolation interface

use crate::Float;

/// Trait for interpolating the solution inside the integrated interval.
///
/// The BDF integrator keeps a polynomial history of its last steps, so any time
/// between the previous step and the latest one can be recovered without extra
/// right-hand-side evaluations.
pub trait Interpolate {
    /// Interpolate the solution at `t` into `y`.
    fn interpolate(&self, t: Float, y: &mut [Float]);
}
