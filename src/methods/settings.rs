//! Settings for the stiff integrator

use bon::Builder;

use crate::{Float, error::Error};

/// Default step budget per solver call.
pub const DEFAULT_MAX_STEPS: u64 = 2000;
/// Highest BDF order the integrator supports.
pub const MAX_ORDER: usize = 5;

#[derive(Builder, Clone, Debug, Default, PartialEq)]
/// Optional overrides for the stiff integrator. `None` keeps the solver default.
pub struct Settings {
    /// Initial step size. None lets the integrator estimate one.
    pub initial_step: Option<Float>,
    /// Maximal step size. None means unbounded.
    pub max_step: Option<Float>,
    /// Minimum step size. Default 0.
    pub min_step: Option<Float>,
    /// Maximum BDF order, 1 through 5. Default 5.
    pub max_order: Option<usize>,
    /// Enable BDF stability limit detection. Default off.
    pub stability_limit_detection: Option<bool>,
    /// Max number of Newton iterations per step attempt. Default 3.
    pub max_nonlinear_iters: Option<usize>,
    /// Safety coefficient in the Newton convergence test. Default 0.1.
    pub nonlinear_conv_coef: Option<Float>,
    /// Max error test failures in one step. Default 7.
    pub max_error_test_failures: Option<usize>,
    /// Max Newton convergence failures in one step. Default 10.
    pub max_convergence_failures: Option<usize>,
}

impl Settings {
    pub fn max_order(&self) -> usize {
        self.max_order.unwrap_or(MAX_ORDER)
    }

    pub fn max_nonlinear_iters(&self) -> usize {
        self.max_nonlinear_iters.unwrap_or(3)
    }

    pub fn nonlinear_conv_coef(&self) -> Float {
        self.nonlinear_conv_coef.unwrap_or(0.1)
    }

    pub fn max_error_test_failures(&self) -> usize {
        self.max_error_test_failures.unwrap_or(7)
    }

    pub fn max_convergence_failures(&self) -> usize {
        self.max_convergence_failures.unwrap_or(10)
    }

    pub fn stability_limit_detection(&self) -> bool {
        self.stability_limit_detection.unwrap_or(false)
    }

    pub fn min_step(&self) -> Float {
        self.min_step.unwrap_or(0.0)
    }

    pub fn max_step(&self) -> Float {
        self.max_step.unwrap_or(Float::INFINITY)
    }

    /// Check every set field, as [`Settings::apply`] would.
    pub fn validate(&self) -> Result<(), Error> {
        let mut probe = Settings::default();
        for tuning in self.tunings() {
            probe.apply(tuning)?;
        }
        Ok(())
    }

    /// Apply one tuning value. On error `self` is unchanged.
    ///
    /// Zero counts and a zero convergence coefficient revert to the default; a
    /// zero initial or max step size clears the override.
    pub fn apply(&mut self, tuning: Tuning) -> Result<(), Error> {
        match tuning {
            Tuning::InitialStep(h) => {
                non_negative("initial_step", h)?;
                self.initial_step = (h > 0.0).then_some(h);
            }
            Tuning::MaxStep(h) => {
                non_negative("max_step", h)?;
                let max = (h > 0.0).then_some(h);
                if let Some(max) = max {
                    if self.min_step() > max {
                        return Err(Error::invalid(
                            "max_step",
                            format!("{max} is below min_step {}", self.min_step()),
                        ));
                    }
                }
                self.max_step = max;
            }
            Tuning::MinStep(h) => {
                non_negative("min_step", h)?;
                if h > self.max_step() {
                    return Err(Error::invalid(
                        "min_step",
                        format!("{h} is above max_step {}", self.max_step()),
                    ));
                }
                self.min_step = Some(h);
            }
            Tuning::MaxOrder(q) => {
                if !(1..=MAX_ORDER).contains(&q) {
                    return Err(Error::invalid(
                        "max_order",
                        format!("{q} is outside 1..={MAX_ORDER}"),
                    ));
                }
                self.max_order = Some(q);
            }
            Tuning::StabilityLimitDetection(on) => self.stability_limit_detection = Some(on),
            Tuning::MaxNonlinearIters(m) => self.max_nonlinear_iters = (m > 0).then_some(m),
            Tuning::NonlinearConvCoef(c) => {
                non_negative("nonlinear_conv_coef", c)?;
                self.nonlinear_conv_coef = (c > 0.0).then_some(c);
            }
            Tuning::MaxErrorTestFailures(m) => self.max_error_test_failures = (m > 0).then_some(m),
            Tuning::MaxConvergenceFailures(m) => {
                self.max_convergence_failures = (m > 0).then_some(m)
            }
            Tuning::MaxSteps(_) => {
                return Err(Error::InvalidState(
                    "the step budget belongs to the session, not the integrator settings".into(),
                ));
            }
        }
        Ok(())
    }

    fn tunings(&self) -> impl Iterator<Item = Tuning> {
        [
            self.min_step.map(Tuning::MinStep),
            self.max_step.map(Tuning::MaxStep),
            self.initial_step.map(Tuning::InitialStep),
            self.max_order.map(Tuning::MaxOrder),
            self.stability_limit_detection
                .map(Tuning::StabilityLimitDetection),
            self.max_nonlinear_iters.map(Tuning::MaxNonlinearIters),
            self.nonlinear_conv_coef.map(Tuning::NonlinearConvCoef),
            self.max_error_test_failures
                .map(Tuning::MaxErrorTestFailures),
            self.max_convergence_failures
                .map(Tuning::MaxConvergenceFailures),
        ]
        .into_iter()
        .flatten()
    }
}

/// One tunable solver option, as set through
/// [`Session::set`](crate::Session::set).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tuning {
    InitialStep(Float),
    MaxStep(Float),
    MinStep(Float),
    MaxOrder(usize),
    StabilityLimitDetection(bool),
    MaxNonlinearIters(usize),
    NonlinearConvCoef(Float),
    MaxErrorTestFailures(usize),
    MaxConvergenceFailures(usize),
    /// Step budget per solver call. 0 resets to the default of 2000.
    MaxSteps(u64),
}

impl Tuning {
    /// Map a host option name and numeric value to a tuning.
    ///
    /// Accepted names: `init_step`, `max_step`, `min_step`, `max_ord`,
    /// `stab_lim_det`, `max_nonlin_iters`, `nonlin_conv_coef`,
    /// `max_err_test_fails`, `max_conv_fails`, `max_num_steps`.
    pub fn parse(name: &str, value: Float) -> Result<Self, Error> {
        Ok(match name {
            "init_step" => Tuning::InitialStep(value),
            "max_step" => Tuning::MaxStep(value),
            "min_step" => Tuning::MinStep(value),
            "max_ord" => Tuning::MaxOrder(count("max_order", value)?),
            "stab_lim_det" => Tuning::StabilityLimitDetection(value != 0.0),
            "max_nonlin_iters" => Tuning::MaxNonlinearIters(count("max_nonlinear_iters", value)?),
            "nonlin_conv_coef" => Tuning::NonlinearConvCoef(value),
            "max_err_test_fails" => {
                Tuning::MaxErrorTestFailures(count("max_error_test_failures", value)?)
            }
            "max_conv_fails" => {
                Tuning::MaxConvergenceFailures(count("max_convergence_failures", value)?)
            }
            "max_num_steps" => Tuning::MaxSteps(count("max_steps", value)? as u64),
            _ => {
                return Err(Error::invalid(
                    "name",
                    format!("unknown tuning option `{name}`"),
                ));
            }
        })
    }
}

fn non_negative(name: &'static str, value: Float) -> Result<(), Error> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid(
            name,
            format!("{value} is not a finite non-negative number"),
        ));
    }
    Ok(())
}

fn count(name: &'static str, value: Float) -> Result<usize, Error> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(Error::invalid(name, format!("{value} is not an integer")));
    }
    // Negative counts follow the "non-positive means default" convention
    Ok(if value < 0.0 { 0 } else { value as usize })
}
