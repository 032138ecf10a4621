//! Variable-order, variable-step BDF integrator for stiff ODEs.
//!
//! Orders 1 through 5 in the fixed-leading-coefficient form with the history kept
//! as backward differences. Each step predicts from the history, corrects with a
//! Newton iteration on `(I - c·J) Δ = c·f - ψ - d`, and accepts on a local error
//! test. Step size and order change only after `order + 1` steps of equal size.
//!
//! Requests run in normal mode: the integrator steps past the requested time and
//! interpolates back, so its history may lie ahead of the returned state. A budget
//! of internal steps per request bounds the work; running out is reported as
//! [`Status::TooMuchWork`] with all progress kept.
//!
//! Reference: Shampine & Reichelt, "The MATLAB ODE Suite" (1997); Byrne &
//! Hindmarsh, "A Polyalgorithm for the Numerical Solution of ODEs" (1975).

mod difference;
mod linear;
mod roots;

pub use difference::BdfInterpolant;

pub(crate) use linear::Linear;

use crate::{
    Float,
    error::Error,
    hinit::hinit,
    interpolate::Interpolate,
    methods::{
        result::{Advance, Stats},
        settings::{DEFAULT_MAX_STEPS, MAX_ORDER, Settings},
    },
    ode::OdeSystem,
    status::Status,
};

use difference::change_d;
use roots::Roots;

/// Smallest step size reduction after a failed error test.
const MIN_FACTOR: Float = 0.2;
/// Largest step size increase at an order change.
const MAX_FACTOR: Float = 10.0;
/// Step size reduction after a Newton failure.
const CONV_FAIL_FACTOR: Float = 0.25;
/// Error test failures in one step after which order 1 is forced.
const ERR_FAILS_BEFORE_RESTART: usize = 3;
/// Step size reduction once order 1 is forced.
const RESTART_FACTOR: Float = 0.1;
/// Steps between Jacobian refreshes of the dense solvers.
const JACOBIAN_AGE: usize = 50;
/// Growing order-difference norms in a row before stability limit detection
/// lowers the order.
const STAB_WINDOW: usize = 4;
/// Newton rate-of-divergence threshold.
const RDIV: Float = 2.0;

/// Weighted root-mean-square norm of `v / scale`.
pub(crate) fn wrms(v: &[Float], scale: &[Float]) -> Float {
    let n = v.len().max(1) as Float;
    let sum: Float = v.iter().zip(scale).map(|(x, s)| (x / s) * (x / s)).sum();
    (sum / n).sqrt()
}

/// `γ_k = Σ_{i=1..k} 1/i`, which is also `α_k` for the pure BDF formulas.
fn gamma(k: usize) -> Float {
    (1..=k).map(|i| 1.0 / i as Float).sum()
}

/// Local error constant of the order-`k` formula.
fn error_const(k: usize) -> Float {
    1.0 / (k as Float + 1.0)
}

/// Why a Newton iteration gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NewtonFailure {
    /// Slow or diverging corrections, or a failed linear solve.
    Convergence,
    /// The right-hand side returned non-finite values.
    Rhs,
    /// The iteration matrix could not be factored.
    Singular,
}

/// BDF integrator state kept between integration requests.
#[derive(Clone, Debug)]
pub struct Bdf {
    n: usize,
    rtol: Float,
    atol: Float,
    settings: Settings,
    max_steps: u64,
    linear: Linear,

    /// Time of the latest accepted step.
    t: Float,
    /// Step size the next step will attempt.
    h: Float,
    order: usize,
    /// Backward differences, `MAX_ORDER + 3` rows of length `n`.
    d: Vec<Vec<Float>>,
    n_equal_steps: usize,
    started: bool,
    jac_needed: bool,
    steps_since_jac: usize,
    conv_rate: Float,
    stab_norms: Vec<Float>,

    /// Last returned time and state.
    t_out: Float,
    y_out: Vec<Float>,

    roots: Roots,
    stats: Stats,

    y_predict: Vec<Float>,
    y_new: Vec<Float>,
    psi: Vec<Float>,
    scale: Vec<Float>,
    corr: Vec<Float>,
    f: Vec<Float>,
    dy: Vec<Float>,
    ytmp: Vec<Float>,
}

impl Bdf {
    /// Integrator at `(t0, y0)`. No callback runs until the first request.
    pub(crate) fn new(
        t0: Float,
        y0: &[Float],
        rtol: Float,
        atol: Float,
        linear: Linear,
        settings: Settings,
        max_steps: u64,
    ) -> Self {
        let n = y0.len();
        Self {
            n,
            rtol,
            atol,
            settings,
            max_steps: if max_steps == 0 { DEFAULT_MAX_STEPS } else { max_steps },
            linear,
            t: t0,
            h: 0.0,
            order: 1,
            d: vec![vec![0.0; n]; MAX_ORDER + 3],
            n_equal_steps: 0,
            started: false,
            jac_needed: true,
            steps_since_jac: 0,
            conv_rate: 1.0,
            stab_norms: Vec::with_capacity(STAB_WINDOW),
            t_out: t0,
            y_out: y0.to_vec(),
            roots: Roots::default(),
            stats: Stats {
                current_order: 1,
                current_time: t0,
                ..Stats::default()
            },
            y_predict: vec![0.0; n],
            y_new: vec![0.0; n],
            psi: vec![0.0; n],
            scale: vec![0.0; n],
            corr: vec![0.0; n],
            f: vec![0.0; n],
            dy: vec![0.0; n],
            ytmp: vec![0.0; n],
        }
    }

    /// Restart at `(t0, y0)` with no history. Settings, budget and the number of
    /// root functions are kept; counters start again from zero.
    pub(crate) fn reinit(&mut self, t0: Float, y0: &[Float]) {
        self.t = t0;
        self.h = 0.0;
        self.order = 1;
        for row in self.d.iter_mut() {
            row.fill(0.0);
        }
        self.n_equal_steps = 0;
        self.started = false;
        self.jac_needed = true;
        self.steps_since_jac = 0;
        self.conv_rate = 1.0;
        self.stab_norms.clear();
        self.linear.invalidate();
        self.t_out = t0;
        self.y_out.copy_from_slice(y0);
        self.roots = Roots::new(self.roots.count());
        self.stats = Stats {
            current_order: 1,
            current_time: t0,
            ..Stats::default()
        };
    }

    /// Track `count` root functions from the last returned point on. Zero disables
    /// root finding.
    pub(crate) fn init_roots(&mut self, count: usize) {
        self.roots = Roots::new(count);
    }

    pub(crate) fn root_count(&self) -> usize {
        self.roots.count()
    }

    pub(crate) fn root_info(&self) -> &[i32] {
        self.roots.info()
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    pub(crate) fn set_max_steps(&mut self, max_steps: u64) {
        self.max_steps = if max_steps == 0 { DEFAULT_MAX_STEPS } else { max_steps };
    }

    /// Last returned time.
    pub fn t(&self) -> Float {
        self.t_out
    }

    /// State at the last returned time.
    pub fn y(&self) -> &[Float] {
        &self.y_out
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Dense output over the last completed step.
    pub fn interpolant(&self) -> BdfInterpolant<'_> {
        BdfInterpolant::new(self.t, self.h, self.order, &self.d)
    }

    /// Interpolate the solution at `t`, which must lie in the last completed step.
    pub fn interpolate(&self, t: Float, y: &mut [Float]) -> Result<(), Error> {
        if y.len() != self.n {
            return Err(Error::DimensionMismatch {
                expected: self.n,
                got: y.len(),
            });
        }
        let t_lo = self.t - self.stats.last_step;
        if !self.started || !t.is_finite() || t < t_lo || t > self.t {
            return Err(Error::invalid(
                "t",
                format!("{t} is outside the last step [{t_lo}, {}]", self.t),
            ));
        }
        self.interpolant().interpolate(t, y);
        Ok(())
    }

    /// Integrate towards `tout`, taking at most `max_steps` internal steps.
    ///
    /// Stops early at a root of the root functions. Targets before the last
    /// returned time are rejected with [`Status::IllegalInput`].
    pub fn advance<S>(&mut self, system: &S, tout: Float) -> Advance
    where
        S: OdeSystem + ?Sized,
    {
        if !tout.is_finite() || tout < self.t_out {
            return Advance::new(self.t_out, Status::IllegalInput);
        }
        self.roots.clear_info();
        if tout == self.t_out {
            return Advance::new(tout, Status::Success);
        }
        if !self.started {
            if let Err(status) = self.start(system, tout) {
                return Advance::new(self.t_out, status);
            }
        }
        if self.roots.count() > 0 && !self.roots.primed {
            let Self {
                roots,
                y_out,
                stats,
                t_out,
                ..
            } = self;
            roots.prime(*t_out, |t, g| {
                stats.root_evals += 1;
                system.roots(t, &y_out[..], g);
            });
        }

        let mut steps: u64 = 0;
        loop {
            if let Some(t_root) = self.search_roots(system, tout) {
                let mut y = std::mem::take(&mut self.y_out);
                self.interpolant().interpolate(t_root, &mut y);
                self.y_out = y;
                self.t_out = t_root;
                return Advance::new(t_root, Status::RootReturn);
            }
            if self.t >= tout {
                let mut y = std::mem::take(&mut self.y_out);
                self.interpolant().interpolate(tout, &mut y);
                self.y_out = y;
                self.t_out = tout;
                return Advance::new(tout, Status::Success);
            }
            if steps >= self.max_steps {
                return self.stop_at_last_step(Status::TooMuchWork);
            }
            if let Err(status) = self.step(system) {
                return self.stop_at_last_step(status);
            }
            steps += 1;
        }
    }

    /// Report the state of the latest accepted step.
    fn stop_at_last_step(&mut self, status: Status) -> Advance {
        self.y_out.copy_from_slice(&self.d[0]);
        self.t_out = self.t;
        Advance::new(self.t, status)
    }

    /// Evaluate `f(t0, y0)`, pick the first step and seed the history.
    fn start<S>(&mut self, system: &S, tout: Float) -> Result<(), Status>
    where
        S: OdeSystem + ?Sized,
    {
        system.rhs(self.t, &self.y_out, &mut self.f);
        self.stats.rhs_evals += 1;
        if self.f.iter().any(|v| !v.is_finite()) {
            return Err(Status::RhsFailure);
        }

        let hmax = self.settings.max_step();
        let h = match self.settings.initial_step {
            Some(h) => h.min(hmax),
            None => {
                self.stats.rhs_evals += 1;
                hinit(
                    system,
                    self.t,
                    &self.y_out,
                    &self.f,
                    1,
                    tout - self.t,
                    hmax,
                    self.rtol,
                    self.atol,
                )
            }
        };
        let h = h.max(self.settings.min_step());

        self.d[0].copy_from_slice(&self.y_out);
        for (d1, f) in self.d[1].iter_mut().zip(&self.f) {
            *d1 = h * f;
        }
        self.h = h;
        self.order = 1;
        self.n_equal_steps = 0;
        self.started = true;
        self.stats.current_step = h;
        Ok(())
    }

    /// Search the part of the latest step up to `tout` that has not been searched.
    fn search_roots<S>(&mut self, system: &S, tout: Float) -> Option<Float>
    where
        S: OdeSystem + ?Sized,
    {
        if self.roots.count() == 0 {
            return None;
        }
        let ttol = 100.0 * Float::EPSILON * (self.t.abs() + self.h.abs());
        let t_hi = self.t.min(tout);
        let Self {
            roots,
            stats,
            ytmp,
            d,
            t,
            h,
            order,
            ..
        } = self;
        let dense = BdfInterpolant::new(*t, *h, *order, d.as_slice());
        roots.find(t_hi, ttol, |tg, g| {
            dense.interpolate(tg, ytmp.as_mut_slice());
            stats.root_evals += 1;
            system.roots(tg, ytmp.as_slice(), g);
        })
    }

    /// Switch to step size `h`, rescaling the history so the two stay consistent
    /// even when the step is abandoned afterwards.
    fn resize(&mut self, h: Float) {
        self.rescale(h / self.h);
        self.h = h;
        self.linear.invalidate();
    }

    /// Rescale the history for a step size multiplied by `factor`.
    fn rescale(&mut self, factor: Float) {
        change_d(&mut self.d, self.order, factor);
        self.n_equal_steps = 0;
        self.stab_norms.clear();
    }

    /// One accepted step, or the status that ends the request.
    fn step<S>(&mut self, system: &S) -> Result<(), Status>
    where
        S: OdeSystem + ?Sized,
    {
        let max_order = self.settings.max_order();
        if self.order > max_order {
            self.order = max_order;
            self.n_equal_steps = 0;
            self.stab_norms.clear();
        }
        let hmax = self.settings.max_step();
        let hmin = self.settings.min_step();
        let maxcor = self.settings.max_nonlinear_iters();

        if self.h > hmax {
            self.resize(hmax);
        } else if self.h < hmin {
            self.resize(hmin);
        }
        let mut h = self.h;

        let mut nef = 0;
        let mut ncf = 0;
        let mut refresh = self.jac_needed || self.steps_since_jac >= JACOBIAN_AGE;
        let mut jac_fresh = false;
        let mut last_failure = Status::ErrorTestFailure;

        let (n_iter, error_norm) = loop {
            let t_new = self.t + h;
            if h <= 0.0 || t_new == self.t {
                return Err(last_failure);
            }
            let order = self.order;

            // Predict
            self.y_predict.fill(0.0);
            for row in &self.d[..=order] {
                for (yp, di) in self.y_predict.iter_mut().zip(row) {
                    *yp += di;
                }
            }
            for (s, yp) in self.scale.iter_mut().zip(&self.y_predict) {
                *s = self.atol + self.rtol * yp.abs();
            }
            let alpha = gamma(order);
            self.psi.fill(0.0);
            for (k, row) in self.d[1..=order].iter().enumerate() {
                let g = gamma(k + 1) / alpha;
                for (p, di) in self.psi.iter_mut().zip(row) {
                    *p += g * di;
                }
            }
            let c = h / alpha;
            let tol = self.settings.nonlinear_conv_coef() / error_const(order);

            let refresh_requested = refresh;
            let corrected = self.correct(system, t_new, c, h, tol, maxcor, &mut refresh);
            if refresh_requested && !refresh {
                jac_fresh = true;
            }
            match corrected {
                Ok(n_iter) => {
                    for (yn, yp, dc) in izip3(&mut self.y_new, &self.y_predict, &self.corr) {
                        *yn = yp + dc;
                    }
                    for (s, yn) in self.scale.iter_mut().zip(&self.y_new) {
                        *s = self.atol + self.rtol * yn.abs();
                    }
                    let error_norm = error_const(order) * wrms(&self.corr, &self.scale);
                    if error_norm <= 1.0 {
                        break (n_iter, error_norm);
                    }

                    nef += 1;
                    self.stats.err_test_fails += 1;
                    last_failure = Status::ErrorTestFailure;
                    if nef >= self.settings.max_error_test_failures() {
                        return Err(Status::ErrorTestFailure);
                    }
                    let mut factor = if nef >= ERR_FAILS_BEFORE_RESTART {
                        if self.order > 1 {
                            self.order = 1;
                        }
                        RESTART_FACTOR
                    } else {
                        let safety = newton_safety(maxcor, n_iter);
                        MIN_FACTOR.max(safety * error_norm.powf(-1.0 / (order as Float + 1.0)))
                    };
                    if h * factor < hmin {
                        if h <= hmin {
                            return Err(Status::ErrorTestFailure);
                        }
                        factor = hmin / h;
                    }
                    h *= factor;
                    self.resize(h);
                }
                Err(failure) => {
                    if failure != NewtonFailure::Rhs && self.linear.stores_jacobian() && !jac_fresh
                    {
                        // Retry the same step with a current Jacobian
                        refresh = true;
                        self.linear.invalidate();
                        continue;
                    }

                    ncf += 1;
                    self.stats.nonlin_conv_fails += 1;
                    last_failure = match failure {
                        NewtonFailure::Rhs => Status::RhsFailure,
                        NewtonFailure::Convergence | NewtonFailure::Singular => {
                            Status::ConvergenceFailure
                        }
                    };
                    if ncf >= self.settings.max_convergence_failures() {
                        return Err(last_failure);
                    }
                    let mut factor = CONV_FAIL_FACTOR;
                    if h * factor < hmin {
                        if h <= hmin {
                            return Err(last_failure);
                        }
                        factor = hmin / h;
                    }
                    h *= factor;
                    self.resize(h);
                }
            }
        };

        // Accept
        let order = self.order;
        self.t += h;
        self.stats.steps += 1;
        self.stats.last_step = h;
        self.stats.last_order = order;
        self.n_equal_steps += 1;
        if jac_fresh {
            self.jac_needed = false;
            self.steps_since_jac = 0;
        }
        self.steps_since_jac += 1;

        // Update differences
        for i in 0..self.n {
            self.d[order + 2][i] = self.corr[i] - self.d[order + 1][i];
            self.d[order + 1][i] = self.corr[i];
        }
        for k in (0..=order).rev() {
            let (head, tail) = self.d.split_at_mut(k + 1);
            for (a, b) in head[k].iter_mut().zip(&tail[0]) {
                *a += b;
            }
        }

        self.h = h;
        if self.settings.stability_limit_detection() && order >= 3 {
            self.stab_norms.push(wrms(&self.d[order], &self.scale));
            if self.stab_norms.len() >= STAB_WINDOW
                && self.stab_norms.windows(2).all(|w| w[1] > w[0])
            {
                log::debug!(
                    "stability limit suspected at t = {}, order {order} -> {}",
                    self.t,
                    order - 1
                );
                self.order -= 1;
                self.n_equal_steps = 0;
                self.stab_norms.clear();
                self.linear.invalidate();
                self.stats.stab_lim_order_reductions += 1;
                self.finish_step();
                return Ok(());
            }
        }

        if self.n_equal_steps < order + 1 {
            self.finish_step();
            return Ok(());
        }

        // Order and step size selection
        let error_m = if order > 1 {
            error_const(order - 1) * wrms(&self.d[order], &self.scale)
        } else {
            Float::INFINITY
        };
        let error_p = if order < max_order {
            error_const(order + 1) * wrms(&self.d[order + 2], &self.scale)
        } else {
            Float::INFINITY
        };
        let factors = [
            error_m.powf(-1.0 / order as Float),
            error_norm.powf(-1.0 / (order as Float + 1.0)),
            error_p.powf(-1.0 / (order as Float + 2.0)),
        ];
        let mut best = 0;
        for (i, f) in factors.iter().enumerate() {
            if *f > factors[best] {
                best = i;
            }
        }
        self.order = order + best - 1;
        let safety = newton_safety(maxcor, n_iter);
        let factor = MAX_FACTOR.min(safety * factors[best]);
        self.h *= factor;
        self.rescale(factor);
        self.linear.invalidate();
        self.finish_step();
        Ok(())
    }

    fn finish_step(&mut self) {
        self.stats.current_order = self.order;
        self.stats.current_step = self.h;
        self.stats.current_time = self.t;
    }

    /// Newton iteration for the corrector at `t_new`. Leaves the accumulated
    /// correction in `corr` and returns the number of iterations.
    ///
    /// A requested Jacobian refresh happens at the first iterate; `refresh` is
    /// cleared once it did.
    fn correct<S>(
        &mut self,
        system: &S,
        t_new: Float,
        c: Float,
        h: Float,
        tol: Float,
        maxcor: usize,
        refresh: &mut bool,
    ) -> Result<usize, NewtonFailure>
    where
        S: OdeSystem + ?Sized,
    {
        let Self {
            linear,
            stats,
            y_predict,
            y_new,
            psi,
            scale,
            corr,
            f,
            dy,
            conv_rate,
            ..
        } = self;

        y_new.copy_from_slice(y_predict);
        corr.fill(0.0);

        let mut del_old: Float = 0.0;
        for m in 0..maxcor {
            system.rhs(t_new, y_new, f);
            stats.rhs_evals += 1;
            if f.iter().any(|v| !v.is_finite()) {
                return Err(NewtonFailure::Rhs);
            }
            if m == 0 && (*refresh || linear.needs_setup(c)) {
                let factored =
                    linear.setup(system, t_new, y_new, f, c, h, scale, *refresh, stats);
                *refresh = false;
                if factored.is_err() {
                    return Err(NewtonFailure::Singular);
                }
                *conv_rate = 1.0;
            }

            for (i, r) in dy.iter_mut().enumerate() {
                *r = c * f[i] - psi[i] - corr[i];
            }
            if !linear.solve(system, t_new, y_new, f, scale, tol, dy, stats) {
                return Err(NewtonFailure::Convergence);
            }
            stats.nonlin_iters += 1;

            let del = wrms(dy, scale);
            for ((yn, dc), d) in y_new.iter_mut().zip(corr.iter_mut()).zip(dy.iter()) {
                *yn += d;
                *dc += d;
            }
            if !del.is_finite() {
                return Err(NewtonFailure::Convergence);
            }
            if m > 0 {
                *conv_rate = (0.3 * *conv_rate).max(del / del_old);
            }
            if del * conv_rate.min(1.0) <= tol {
                return Ok(m + 1);
            }
            if m > 0 && del > RDIV * del_old {
                return Err(NewtonFailure::Convergence);
            }
            del_old = del;
        }
        Err(NewtonFailure::Convergence)
    }
}

/// Step size safety factor, smaller when the Newton iteration needed more work.
fn newton_safety(maxcor: usize, n_iter: usize) -> Float {
    0.9 * (2 * maxcor + 1) as Float / (2 * maxcor + n_iter) as Float
}

fn izip3<'a>(
    a: &'a mut [Float],
    b: &'a [Float],
    c: &'a [Float],
) -> impl Iterator<Item = (&'a mut Float, &'a Float, &'a Float)> {
    a.iter_mut().zip(b.iter().zip(c)).map(|(x, (y, z))| (x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Variant;
    use approx::assert_relative_eq;

    struct Decay;

    impl OdeSystem for Decay {
        fn rhs(&self, _t: Float, y: &[Float], dydt: &mut [Float]) {
            dydt[0] = -y[0];
        }
    }

    fn bdf(y0: &[Float], max_steps: u64) -> Bdf {
        Bdf::new(
            0.0,
            y0,
            1e-8,
            1e-10,
            Linear::new(Variant::Dense, y0.len()),
            Settings::default(),
            max_steps,
        )
    }

    #[test]
    fn coefficients() {
        assert_eq!(gamma(0), 0.0);
        assert_relative_eq!(gamma(3), 1.0 + 0.5 + 1.0 / 3.0);
        assert_eq!(error_const(1), 0.5);
    }

    #[test]
    fn reaches_target_exactly_and_accurately() {
        let mut solver = bdf(&[1.0], 0);
        let out = solver.advance(&Decay, 2.0);
        assert_eq!(out, Advance::new(2.0, Status::Success));
        assert_relative_eq!(solver.y()[0], (-2.0 as Float).exp(), max_relative = 1e-5);
        // The history may run ahead of the returned point
        assert!(solver.stats().current_time >= 2.0);
    }

    #[test]
    fn out_of_budget_keeps_progress() {
        let mut solver = bdf(&[1.0], 5);
        let out = solver.advance(&Decay, 50.0);
        assert_eq!(out.status, Status::TooMuchWork);
        assert_eq!(solver.stats().steps, 5);
        assert!(out.t > 0.0 && out.t < 50.0);

        solver.set_max_steps(100_000);
        let out = solver.advance(&Decay, 50.0);
        assert_eq!(out.status, Status::Success);
        assert_eq!(out.t, 50.0);
    }

    #[test]
    fn target_behind_returned_time_is_illegal() {
        let mut solver = bdf(&[1.0], 0);
        assert_eq!(solver.advance(&Decay, 1.0).status, Status::Success);
        assert_eq!(solver.advance(&Decay, 0.5).status, Status::IllegalInput);
        assert_eq!(solver.t(), 1.0);
    }

    #[test]
    fn interpolation_inside_last_step() {
        let mut solver = bdf(&[1.0], 0);
        solver.advance(&Decay, 1.0);
        let t_last = solver.stats().current_time;
        let mut y = [0.0];
        solver.interpolate(t_last, &mut y).unwrap();
        assert_relative_eq!(y[0], (-t_last).exp(), max_relative = 1e-5);
        assert!(solver.interpolate(t_last + 1.0, &mut y).is_err());
        assert!(solver.interpolate(t_last, &mut [0.0, 0.0]).is_err());
    }

    #[test]
    fn non_finite_initial_derivative_fails() {
        struct Broken;
        impl OdeSystem for Broken {
            fn rhs(&self, _t: Float, _y: &[Float], dydt: &mut [Float]) {
                dydt[0] = Float::NAN;
            }
        }
        let mut solver = bdf(&[1.0], 0);
        assert_eq!(solver.advance(&Broken, 1.0).status, Status::RhsFailure);
    }
}
