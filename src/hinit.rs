//! Compute an initial step size guess

use crate::{Float, ode::OdeSystem};

/// Initial step size guess for a method of order `order`.
///
/// Takes one explicit Euler step of a trial size to estimate the second
/// derivative, then picks the step whose leading error term is about 1% of
/// the tolerance. The result never exceeds `interval` or `hmax`.
pub fn hinit<S>(
    system: &S,
    t: Float,
    y: &[Float],
    f0: &[Float],
    order: usize,
    interval: Float,
    hmax: Float,
    rtol: Float,
    atol: Float,
) -> Float
where
    S: OdeSystem + ?Sized,
{
    let n = y.len();
    if n == 0 || interval <= 0.0 {
        return hmax.min(1.0e-6);
    }

    let sk: Vec<Float> = y.iter().map(|yi| atol + rtol * yi.abs()).collect();
    let d0 = rms(y.iter().zip(&sk).map(|(yi, s)| yi / s));
    let d1 = rms(f0.iter().zip(&sk).map(|(fi, s)| fi / s));

    let mut h0 = if d0 < 1.0e-5 || d1 < 1.0e-5 {
        1.0e-6
    } else {
        0.01 * d0 / d1
    };
    h0 = h0.min(interval).min(hmax);

    // Explicit Euler step: y1 = y + h0 * f0
    let y1: Vec<Float> = y.iter().zip(f0).map(|(yi, fi)| yi + h0 * fi).collect();
    let mut f1 = vec![0.0; n];
    system.rhs(t + h0, &y1, &mut f1);

    // Estimate second derivative
    let d2 = rms(f1.iter().zip(f0).zip(&sk).map(|((a, b), s)| (a - b) / s)) / h0;

    let h1 = if d1 <= 1.0e-15 && d2 <= 1.0e-15 {
        (1.0e-6 as Float).max(h0 * 1.0e-3)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (order as Float + 1.0))
    };

    let h = (100.0 * h0).min(h1).min(interval).min(hmax);
    if h.is_finite() && h > 0.0 { h } else { h0 }
}

fn rms(values: impl ExactSizeIterator<Item = Float>) -> Float {
    let n = values.len().max(1) as Float;
    (values.map(|v| v * v).sum::<Float>() / n).sqrt()
}
