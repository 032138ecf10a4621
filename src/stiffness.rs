//! Stiffness classification and recommended solver tuning.
//!
//! A model's rate constants give a cheap estimate of how stiff its ODE system
//! will be. [`StiffnessProfile::analyze`] turns them into a category plus a set of
//! features, and [`StiffConfig::recommend`] maps the profile to session settings.

use bon::Builder;

use crate::{
    Float,
    methods::settings::Settings,
    session::{Config, Variant},
};

/// Rate ratio band of a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StiffnessCategory {
    /// Ratio below 1e3.
    Mild,
    /// Ratio below 1e6.
    Moderate,
    /// Ratio below 1e9.
    Severe,
    /// Anything larger.
    Extreme,
}

/// Model trait that affects the solver choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Fewer than two usable rate constants.
    SingleRate,
    ModerateStiffness,
    SevereStiffness,
    ExtremeStiffness,
    /// Rates depend on observables, so no analytic Jacobian.
    FunctionalRates,
    /// The host reinitializes between simulation phases.
    MultiPhase,
    /// More than 100 equations.
    LargeSystem,
    /// The fastest rate dominates the upper quartile by more than 100×.
    PotentialOscillator,
}

/// Model facts the rate constants alone do not show.
#[derive(Builder, Clone, Debug, Default, PartialEq)]
pub struct ProfileHints {
    #[builder(default)]
    pub functional_rates: bool,
    #[builder(default)]
    pub multi_phase: bool,
    /// Number of ODEs. Defaults to the number of rate constants.
    pub system_size: Option<usize>,
}

/// Stiffness characterization of a model.
#[derive(Clone, Debug, PartialEq)]
pub struct StiffnessProfile {
    /// Fastest over slowest non-zero rate magnitude.
    pub rate_ratio: Float,
    pub category: StiffnessCategory,
    pub system_size: usize,
    pub features: Vec<Feature>,
}

impl StiffnessProfile {
    /// Classify a model from its rate constants. Zero and non-finite rates are
    /// ignored.
    pub fn analyze(rates: &[Float], hints: &ProfileHints) -> Self {
        let system_size = hints.system_size.unwrap_or(rates.len());
        let mut magnitudes: Vec<Float> = rates
            .iter()
            .filter(|r| **r != 0.0 && r.is_finite())
            .map(|r| r.abs())
            .collect();

        if magnitudes.len() < 2 {
            return Self {
                rate_ratio: 1.0,
                category: StiffnessCategory::Mild,
                system_size,
                features: vec![Feature::SingleRate],
            };
        }

        // Fastest first
        magnitudes.sort_by(|a, b| b.total_cmp(a));
        let rate_ratio = magnitudes[0] / magnitudes[magnitudes.len() - 1];

        let mut features = Vec::new();
        let category = if rate_ratio < 1e3 {
            StiffnessCategory::Mild
        } else if rate_ratio < 1e6 {
            features.push(Feature::ModerateStiffness);
            StiffnessCategory::Moderate
        } else if rate_ratio < 1e9 {
            features.push(Feature::SevereStiffness);
            StiffnessCategory::Severe
        } else {
            features.push(Feature::ExtremeStiffness);
            StiffnessCategory::Extreme
        };

        if hints.functional_rates {
            features.push(Feature::FunctionalRates);
        }
        if hints.multi_phase {
            features.push(Feature::MultiPhase);
        }
        if system_size > 100 {
            features.push(Feature::LargeSystem);
        }
        if magnitudes.len() >= 4 && magnitudes[0] / magnitudes[magnitudes.len() / 4] > 100.0 {
            features.push(Feature::PotentialOscillator);
        }

        Self {
            rate_ratio,
            category,
            system_size,
            features,
        }
    }

    pub fn has(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }
}

/// Recommended tolerances and tuning for a stiffness profile.
#[derive(Clone, Debug, PartialEq)]
pub struct StiffConfig {
    pub atol: Float,
    pub rtol: Float,
    pub max_steps: u64,
    pub stability_limit_detection: bool,
    pub max_order: usize,
    pub max_nonlinear_iters: usize,
    pub nonlinear_conv_coef: Float,
    pub max_error_test_failures: usize,
    pub max_convergence_failures: usize,
    /// Avoid storing an N×N matrix.
    pub matrix_free: bool,
    /// Prefer the host Jacobian when the system provides one.
    pub analytic_jacobian: bool,
    /// Why these values were chosen.
    pub rationale: String,
}

impl Default for StiffConfig {
    fn default() -> Self {
        Self {
            atol: 1e-8,
            rtol: 1e-8,
            max_steps: 1_000_000,
            stability_limit_detection: false,
            max_order: 5,
            max_nonlinear_iters: 3,
            nonlinear_conv_coef: 0.1,
            max_error_test_failures: 7,
            max_convergence_failures: 10,
            matrix_free: false,
            analytic_jacobian: false,
            rationale: "default settings".into(),
        }
    }
}

impl StiffConfig {
    /// Tuning for `profile`: stricter Newton settings and lower BDF orders as the
    /// rate ratio grows, then adjustments for each detected feature.
    pub fn recommend(profile: &StiffnessProfile) -> Self {
        let mut config = Self::default();
        match profile.category {
            StiffnessCategory::Mild => {
                config.rationale = "mild stiffness: standard settings".into();
            }
            StiffnessCategory::Moderate => {
                config.max_steps = 5000;
                config.max_nonlinear_iters = 5;
                config.rationale = "moderate stiffness: more Newton iterations".into();
            }
            StiffnessCategory::Severe => {
                config.max_steps = 10_000;
                config.max_nonlinear_iters = 7;
                config.nonlinear_conv_coef = 0.05;
                config.stability_limit_detection = true;
                config.max_order = 4;
                config.rationale =
                    "severe stiffness: stability limit detection, stricter convergence".into();
            }
            StiffnessCategory::Extreme => {
                config.atol = 1e-10;
                config.rtol = 1e-10;
                config.max_steps = 20_000;
                config.max_nonlinear_iters = 10;
                config.nonlinear_conv_coef = 0.01;
                config.stability_limit_detection = true;
                config.max_order = 3;
                config.max_convergence_failures = 20;
                config.max_error_test_failures = 15;
                config.analytic_jacobian = true;
                config.rationale =
                    "extreme stiffness: maximum stability settings, analytic Jacobian".into();
            }
        }

        if profile.has(Feature::PotentialOscillator) {
            config.stability_limit_detection = true;
            config.rationale += "; oscillator: stability limit detection";
        }
        if profile.has(Feature::FunctionalRates) {
            config.analytic_jacobian = false;
            config.max_nonlinear_iters = config.max_nonlinear_iters.max(5);
            config.rationale += "; functional rates: finite-difference Jacobian";
        }
        if profile.has(Feature::LargeSystem) {
            config.matrix_free = true;
            config.rationale += "; large system: matrix-free linear solver";
        }
        if profile.has(Feature::MultiPhase) {
            config.max_steps = config.max_steps.max(5000);
            config.rationale += "; multi-phase: larger step budget per phase";
        }

        log::debug!("stiffness {:?}: {}", profile.category, config.rationale);
        config
    }

    /// Linear solver for a system that does (or does not) provide a Jacobian.
    /// Matrix-free wins over the analytic Jacobian.
    pub fn variant(&self, has_jacobian: bool) -> Variant {
        if self.matrix_free {
            Variant::MatrixFree
        } else if self.analytic_jacobian && has_jacobian {
            Variant::DenseAnalyticJacobian
        } else {
            Variant::Dense
        }
    }

    pub fn settings(&self) -> Settings {
        Settings::builder()
            .max_order(self.max_order)
            .stability_limit_detection(self.stability_limit_detection)
            .max_nonlinear_iters(self.max_nonlinear_iters)
            .nonlinear_conv_coef(self.nonlinear_conv_coef)
            .max_error_test_failures(self.max_error_test_failures)
            .max_convergence_failures(self.max_convergence_failures)
            .build()
    }

    /// Session configuration for a system that does (or does not) provide a
    /// Jacobian.
    pub fn to_config(&self, has_jacobian: bool) -> Config {
        Config::builder()
            .variant(self.variant(has_jacobian))
            .rtol(self.rtol)
            .atol(self.atol)
            .max_steps(self.max_steps)
            .settings(self.settings())
            .build()
    }
}
