//! Integration sessions.
//!
//! A [`Session`] owns the host's [`OdeSystem`], the state vector and a BDF
//! integrator. The host drives it with [`Session::advance`]; when the integrator
//! runs out of internal steps the session escalates the step budget and resumes
//! instead of failing the request.

mod budget;

pub use budget::{BUDGET_CAP, run_with_escalation};

use bon::Builder;

use crate::{
    Float,
    error::Error,
    methods::{
        bdf::{Bdf, Linear},
        result::{Advance, Stats},
        settings::{DEFAULT_MAX_STEPS, Settings, Tuning},
    },
    ode::OdeSystem,
};

/// Linear solver strategy, fixed when the session is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Variant {
    /// Dense Jacobian approximated by finite differences.
    #[default]
    Dense,
    /// Dense Jacobian from [`OdeSystem::jacobian`].
    DenseAnalyticJacobian,
    /// GMRES with difference-quotient Jacobian-vector products. No N×N matrix is
    /// stored.
    MatrixFree,
}

#[derive(Builder, Clone, Debug, PartialEq)]
/// Session configuration.
///
/// ```
/// use stiff_session::{Config, Settings, Variant};
///
/// let config = Config::builder()
///     .variant(Variant::MatrixFree)
///     .rtol(1e-6)
///     .atol(1e-10)
///     .max_steps(5000)
///     .settings(Settings::builder().max_order(3).build())
///     .build();
/// assert_eq!(config.max_steps, Some(5000));
/// ```
pub struct Config {
    /// Linear solver strategy. Default [`Variant::Dense`].
    #[builder(default)]
    pub variant: Variant,
    /// Relative tolerance, applied to every component.
    pub rtol: Float,
    /// Absolute tolerance, applied to every component.
    pub atol: Float,
    /// Initial step budget per request. None or 0 means 2000.
    pub max_steps: Option<u64>,
    /// Integrator overrides.
    #[builder(default)]
    pub settings: Settings,
}

/// A long-running stiff integration.
///
/// Every mutating operation takes `&mut self`, so one session serves one request
/// at a time. Sessions share nothing with each other. Dropping the session
/// releases the state, the integrator history and the linear solver workspace.
#[derive(Debug)]
pub struct Session<S> {
    system: S,
    variant: Variant,
    step_budget: u64,
    solver: Bdf,
    /// An advance ran since creation or the last reinitialization.
    advanced: bool,
}

impl<S: OdeSystem> Session<S> {
    /// Create a session at `(t0, y0)`.
    ///
    /// Fails with [`Error::Construction`] on an empty or non-finite initial
    /// state, unusable tolerances or settings, or when
    /// [`Variant::DenseAnalyticJacobian`] is requested for a system without a
    /// Jacobian.
    pub fn new(system: S, t0: Float, y0: &[Float], config: Config) -> Result<Self, Error> {
        let Config {
            variant,
            rtol,
            atol,
            max_steps,
            settings,
        } = config;

        if y0.is_empty() {
            return Err(Error::Construction("the state vector is empty".into()));
        }
        if !t0.is_finite() {
            return Err(Error::Construction(format!("initial time {t0} is not finite")));
        }
        if let Some(i) = y0.iter().position(|v| !v.is_finite()) {
            return Err(Error::Construction(format!(
                "initial state component {i} is {}",
                y0[i]
            )));
        }
        for (name, tol) in [("rtol", rtol), ("atol", atol)] {
            if !tol.is_finite() || tol < 0.0 {
                return Err(Error::Construction(format!(
                    "{name} = {tol} is not a finite non-negative number"
                )));
            }
        }
        if rtol == 0.0 && atol == 0.0 {
            return Err(Error::Construction("rtol and atol are both zero".into()));
        }
        if variant == Variant::DenseAnalyticJacobian && !system.has_jacobian() {
            return Err(Error::Construction(
                "the analytic Jacobian variant needs a system that provides a Jacobian".into(),
            ));
        }
        settings
            .validate()
            .map_err(|e| Error::Construction(e.to_string()))?;

        let step_budget = match max_steps {
            Some(n) if n > 0 => n,
            _ => DEFAULT_MAX_STEPS,
        };
        let solver = Bdf::new(
            t0,
            y0,
            rtol,
            atol,
            Linear::new(variant, y0.len()),
            settings,
            step_budget,
        );
        log::debug!(
            "session created: {} equations, {variant:?}, rtol = {rtol}, atol = {atol}",
            y0.len()
        );

        Ok(Self {
            system,
            variant,
            step_budget,
            solver,
            advanced: false,
        })
    }

    /// Integrate to `t`.
    ///
    /// On [`Status::Success`](crate::Status::Success) the returned time is exactly
    /// `t`. Running out of steps is handled here by doubling the step budget and
    /// resuming; every other failure is returned as is.
    pub fn advance(&mut self, t: Float) -> Advance {
        self.advanced = true;
        let Self {
            system,
            solver,
            step_budget,
            ..
        } = self;
        run_with_escalation(step_budget, |budget| {
            solver.set_max_steps(budget);
            solver.advance(&*system, t)
        })
    }

    /// Restart from `(t0, y0)`, discarding the integrator history.
    ///
    /// Step budget, settings and the number of root functions are kept; the
    /// counters in [`stats`](Self::stats) start again from zero.
    pub fn reinit(&mut self, t0: Float, y0: &[Float]) -> Result<(), Error> {
        if y0.len() != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                got: y0.len(),
            });
        }
        if !t0.is_finite() {
            return Err(Error::invalid("t0", format!("{t0} is not finite")));
        }
        if y0.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid("y0", "the state has non-finite components"));
        }
        log::debug!("session reinitialized at t = {t0}");
        self.solver.reinit(t0, y0);
        self.advanced = false;
        Ok(())
    }

    /// Change one tuning parameter. On error the previous configuration stays.
    pub fn set(&mut self, tuning: Tuning) -> Result<(), Error> {
        match tuning {
            Tuning::MaxSteps(n) => {
                self.step_budget = if n == 0 { DEFAULT_MAX_STEPS } else { n };
                self.solver.set_max_steps(self.step_budget);
            }
            tuning => {
                let mut settings = self.solver.settings().clone();
                settings.apply(tuning)?;
                self.solver.set_settings(settings);
            }
        }
        Ok(())
    }

    /// Track `count` root functions, evaluated through [`OdeSystem::roots`].
    ///
    /// Only allowed before the first [`advance`](Self::advance) after creation or
    /// [`reinit`](Self::reinit). Zero disables root finding.
    pub fn init_roots(&mut self, count: usize) -> Result<(), Error> {
        if self.advanced {
            return Err(Error::InvalidState(
                "root functions must be set up before integration starts; reinitialize first"
                    .into(),
            ));
        }
        self.solver.init_roots(count);
        Ok(())
    }

    /// Crossing direction per root function for the last request: `1` rising,
    /// `-1` falling, `0` no crossing.
    pub fn root_info(&self) -> &[i32] {
        self.solver.root_info()
    }

    /// Number of root functions tracked.
    pub fn root_count(&self) -> usize {
        self.solver.root_count()
    }

    /// State at [`current_time`](Self::current_time).
    pub fn state(&self) -> &[Float] {
        self.solver.y()
    }

    /// Copy the state into `out`, which must have the session's length.
    pub fn copy_state(&self, out: &mut [Float]) -> Result<(), Error> {
        if out.len() != self.len() {
            return Err(Error::DimensionMismatch {
                expected: self.len(),
                got: out.len(),
            });
        }
        out.copy_from_slice(self.state());
        Ok(())
    }

    /// Interpolate the solution inside the integrator's last step, which may lie
    /// past [`current_time`](Self::current_time).
    pub fn interpolate(&self, t: Float, out: &mut [Float]) -> Result<(), Error> {
        self.solver.interpolate(t, out)
    }

    /// Time of the last returned state.
    pub fn current_time(&self) -> Float {
        self.solver.t()
    }

    /// Number of equations.
    pub fn len(&self) -> usize {
        self.state().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().is_empty()
    }

    pub fn step_budget(&self) -> u64 {
        self.step_budget
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn settings(&self) -> &Settings {
        self.solver.settings()
    }

    pub fn stats(&self) -> Stats {
        self.solver.stats()
    }

    pub fn system(&self) -> &S {
        &self.system
    }
}

/// Drop the session held in `handle`, if any. Calling it again is a no-op.
pub fn destroy<S>(handle: &mut Option<Session<S>>) {
    if let Some(session) = handle.take() {
        log::debug!("session destroyed at t = {}", session.solver.t());
    }
}
