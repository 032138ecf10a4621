use approx::assert_relative_eq;
use stiff_session::prelude::*;
use stiff_session::session::BUDGET_CAP;

mod common;
use common::{Chain, Decay, FlakyChain, HalfLife, Relaxation, Robertson, chain_exact};

fn config(variant: Variant, rtol: Float, atol: Float) -> Config {
    Config::builder().variant(variant).rtol(rtol).atol(atol).build()
}

/// Dense session at t = 0.
fn dense<S: OdeSystem>(system: S, y0: &[Float], rtol: Float, atol: Float) -> Session<S> {
    Session::new(system, 0.0, y0, config(Variant::Dense, rtol, atol)).unwrap()
}

#[test]
fn decay_reaches_target_exactly() {
    let mut s = dense(Decay { k: 1.0 }, &[1.0, 2.0], 1e-8, 1e-10);
    let out = s.advance(1.0);
    assert_eq!(out.status, Status::Success);
    assert_eq!(out.t, 1.0);
    assert_eq!(s.current_time(), 1.0);
    let e = (-1.0 as Float).exp();
    assert_relative_eq!(s.state()[0], e, max_relative = 1e-5);
    assert_relative_eq!(s.state()[1], 2.0 * e, max_relative = 1e-5);

    let mut y = [0.0; 2];
    s.copy_state(&mut y).unwrap();
    assert_eq!(y, [s.state()[0], s.state()[1]]);
    assert!(matches!(
        s.copy_state(&mut [0.0; 3]),
        Err(Error::DimensionMismatch { expected: 2, got: 3 })
    ));
}

#[test]
fn every_variant_solves_the_chain() {
    for variant in [Variant::Dense, Variant::MatrixFree] {
        let config = config(variant, 1e-8, 1e-10);
        let mut s = Session::new(Chain, 0.0, &[1.0, 0.0], config).unwrap();
        for t in [0.5, 1.0, 3.0] {
            let out = s.advance(t);
            assert_eq!(out.status, Status::Success, "{variant:?}");
            let exact = chain_exact(t);
            assert_relative_eq!(s.state()[0], exact[0], max_relative = 1e-4);
            assert_relative_eq!(s.state()[1], exact[1], max_relative = 1e-4);
        }
        let stats = s.stats();
        assert!(stats.steps > 0);
        if variant == Variant::MatrixFree {
            assert!(stats.linear_iters > 0);
            assert_eq!(stats.jac_evals, 0);
        }
    }
}

#[test]
fn robertson_conserves_mass() {
    let mut s = dense(Robertson, &[1.0, 0.0, 0.0], 1e-6, 1e-10);
    let out = s.advance(40.0);
    assert_eq!(out.status, Status::Success);
    assert_eq!(out.t, 40.0);
    let y = s.state();
    assert_relative_eq!(y[0] + y[1] + y[2], 1.0, epsilon = 1e-6);
    assert_relative_eq!(y[0], 0.7158, max_relative = 1e-3);
    assert_relative_eq!(y[2], 0.2842, max_relative = 3e-3);
    assert!(y[1] > 0.0 && y[1] < 1e-4);
    assert!(s.stats().jac_evals > 0);
}

#[test]
fn analytic_and_finite_difference_jacobians_agree() {
    let mut fd = dense(Robertson, &[1.0, 0.0, 0.0], 1e-7, 1e-12);
    let mut an = Session::new(
        Robertson,
        0.0,
        &[1.0, 0.0, 0.0],
        config(Variant::DenseAnalyticJacobian, 1e-7, 1e-12),
    )
    .unwrap();
    assert_eq!(fd.advance(1.0).status, Status::Success);
    assert_eq!(an.advance(1.0).status, Status::Success);
    for (a, b) in fd.state().iter().zip(an.state()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9, max_relative = 1e-4);
    }
    assert!(fd.stats().rhs_evals_jac > 0);
    assert_eq!(an.stats().rhs_evals_jac, 0);
    assert!(an.stats().jac_evals > 0);
}

#[test]
fn analytic_variant_needs_a_jacobian() {
    let config = config(Variant::DenseAnalyticJacobian, 1e-6, 1e-8);
    let err = Session::new(Chain, 0.0, &[1.0, 0.0], config).unwrap_err();
    assert!(matches!(err, Error::Construction(_)));
}

#[test]
fn invalid_construction_is_rejected() {
    let bad = |y0: &[Float], rtol: Float, atol: Float| {
        Session::new(Decay { k: 1.0 }, 0.0, y0, config(Variant::Dense, rtol, atol)).is_err()
    };
    assert!(bad(&[], 1e-6, 1e-8));
    assert!(bad(&[1.0, Float::NAN], 1e-6, 1e-8));
    assert!(bad(&[1.0], -1e-6, 1e-8));
    assert!(bad(&[1.0], 1e-6, Float::INFINITY));
    let config = config(Variant::Dense, 1e-6, 1e-8);
    assert!(Session::new(Decay { k: 1.0 }, Float::NAN, &[1.0], config).is_err());
}

#[test]
fn small_budget_is_escalated() {
    let config = Config::builder().rtol(1e-6).atol(1e-8).max_steps(10).build();
    let mut s = Session::new(Relaxation, 0.0, &[0.0], config).unwrap();
    assert_eq!(s.step_budget(), 10);
    let out = s.advance(100.0);
    assert_eq!(out.status, Status::Success);
    assert_eq!(out.t, 100.0);
    assert_relative_eq!(s.state()[0], (100.0 as Float).cos(), epsilon = 2e-3);
    assert!(s.stats().steps > 10);
    assert!(s.step_budget() > 10);
}

#[test]
fn default_budget_is_escalated() {
    let mut s = dense(Relaxation, &[0.0], 1e-6, 1e-8);
    s.set(Tuning::MaxStep(0.01)).unwrap();
    assert_eq!(s.step_budget(), 2000);

    let out = s.advance(100.0);
    assert_eq!(out, Advance { t: 100.0, status: Status::Success });
    assert!(s.stats().steps > 2000);
    assert!(s.step_budget() > 2000);
    assert!(s.step_budget() <= BUDGET_CAP);
    assert_relative_eq!(s.state()[0], (100.0 as Float).cos(), epsilon = 2e-3);
}

#[test]
fn failed_request_is_not_retried_and_session_recovers() {
    let mut s = dense(FlakyChain::default(), &[1.0, 0.0], 1e-8, 1e-10);
    assert_eq!(s.advance(1.0).status, Status::Success);
    let stats = s.stats();
    let t_mid = stats.current_time - 0.5 * stats.last_step;
    let mut before = [0.0; 2];
    s.interpolate(t_mid, &mut before).unwrap();

    s.system().broken.set(true);
    let out = s.advance(2.0);
    assert_eq!(out.status, Status::RhsFailure);
    assert_eq!(out.t, stats.current_time);
    assert_eq!(s.step_budget(), 2000);
    assert_eq!(
        s.stats().nonlin_conv_fails - stats.nonlin_conv_fails,
        s.settings().max_convergence_failures()
    );
    assert_eq!(s.stats().steps, stats.steps);

    // The history still describes the last accepted step
    let mut after = [0.0; 2];
    s.interpolate(t_mid, &mut after).unwrap();
    for (a, b) in before.iter().zip(&after) {
        assert_relative_eq!(*a, *b, max_relative = 1e-9);
    }

    s.system().broken.set(false);
    let out = s.advance(3.0);
    assert_eq!(out.status, Status::Success);
    assert_eq!(out.t, 3.0);
    let exact = chain_exact(3.0);
    assert_relative_eq!(s.state()[0], exact[0], max_relative = 1e-4);
    assert_relative_eq!(s.state()[1], exact[1], max_relative = 1e-4);
}

#[test]
fn root_is_reported_then_passed() {
    let mut s = dense(HalfLife, &[1.0], 1e-8, 1e-10);
    s.init_roots(1).unwrap();
    assert_eq!(s.root_count(), 1);

    let out = s.advance(1.0);
    assert_eq!(out.status, Status::RootReturn);
    assert_relative_eq!(out.t, (2.0 as Float).ln(), max_relative = 1e-6);
    assert_relative_eq!(s.state()[0], 0.5, max_relative = 1e-6);
    assert_eq!(s.root_info(), &[-1]);
    assert!(s.stats().root_evals > 0);

    let out = s.advance(1.0);
    assert_eq!(out.status, Status::Success);
    assert_eq!(out.t, 1.0);
    assert_eq!(s.root_info(), &[0]);
}

#[test]
fn roots_are_fixed_once_integration_starts() {
    let mut s = dense(HalfLife, &[1.0], 1e-6, 1e-8);
    assert_eq!(s.advance(0.1).status, Status::Success);
    assert!(matches!(s.init_roots(1), Err(Error::InvalidState(_))));
    s.reinit(0.0, &[1.0]).unwrap();
    s.init_roots(1).unwrap();
    assert_eq!(s.advance(1.0).status, Status::RootReturn);
}

#[test]
fn reinit_repeats_the_run() {
    let config = Config::builder()
        .rtol(1e-6)
        .atol(1e-8)
        .max_steps(50)
        .settings(Settings::builder().max_order(3).build())
        .build();
    let mut s = Session::new(Chain, 0.0, &[1.0, 0.0], config).unwrap();
    assert_eq!(s.advance(2.0).status, Status::Success);
    let first = s.state().to_vec();
    let first_stats = s.stats();
    let budget = s.step_budget();

    s.reinit(0.0, &[1.0, 0.0]).unwrap();
    assert_eq!(s.current_time(), 0.0);
    assert_eq!(s.state(), &[1.0, 0.0]);
    assert_eq!(s.stats().steps, 0);
    assert_eq!(s.stats().rhs_evals, 0);
    assert_eq!(s.step_budget(), budget);
    assert_eq!(s.settings().max_order(), 3);

    assert_eq!(s.advance(2.0).status, Status::Success);
    assert_eq!(s.stats().steps, first_stats.steps);
    for (a, b) in first.iter().zip(s.state()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12);
    }
}

#[test]
fn reinit_validates_input() {
    let mut s = dense(Chain, &[1.0, 0.0], 1e-6, 1e-8);
    assert!(matches!(
        s.reinit(0.0, &[1.0]),
        Err(Error::DimensionMismatch { .. })
    ));
    assert!(matches!(
        s.reinit(Float::NAN, &[1.0, 0.0]),
        Err(Error::InvalidParameter { .. })
    ));
    assert!(s.reinit(0.0, &[1.0, Float::INFINITY]).is_err());
}

#[test]
fn target_behind_is_illegal() {
    let mut s = dense(Chain, &[1.0, 0.0], 1e-6, 1e-8);
    assert_eq!(s.advance(1.0).status, Status::Success);
    let out = s.advance(0.5);
    assert_eq!(out.status, Status::IllegalInput);
    assert_eq!(out.t, 1.0);
    assert_eq!(s.advance(1.0).status, Status::Success);
}

#[test]
fn tuning_rejects_bad_values_and_keeps_old_ones() {
    let mut s = dense(Chain, &[1.0, 0.0], 1e-6, 1e-8);
    let before = s.settings().clone();
    assert!(matches!(
        s.set(Tuning::MaxOrder(6)),
        Err(Error::InvalidParameter { .. })
    ));
    assert!(s.set(Tuning::MaxOrder(0)).is_err());
    assert!(s.set(Tuning::MaxStep(-1.0)).is_err());
    assert!(s.set(Tuning::InitialStep(Float::NAN)).is_err());
    assert!(s.set(Tuning::NonlinearConvCoef(-0.1)).is_err());
    assert_eq!(s.settings(), &before);

    s.set(Tuning::MaxStep(0.5)).unwrap();
    assert!(s.set(Tuning::MinStep(1.0)).is_err());
    s.set(Tuning::MaxOrder(2)).unwrap();
    assert_eq!(s.settings().max_order(), 2);

    s.set(Tuning::MaxSteps(0)).unwrap();
    assert_eq!(s.step_budget(), 2000);
    s.set(Tuning::parse("max_num_steps", 300.0).unwrap()).unwrap();
    assert_eq!(s.step_budget(), 300);
    assert!(Tuning::parse("no_such_option", 1.0).is_err());

    assert_eq!(s.advance(1.0).status, Status::Success);
    assert!(s.stats().last_step <= 0.5);
    assert!(s.stats().current_order <= 2);
}

#[test]
fn interpolation_within_last_step() {
    let mut s = dense(Decay { k: 1.0 }, &[1.0], 1e-8, 1e-10);
    let mut y = [0.0];
    assert!(s.interpolate(0.0, &mut y).is_err());
    assert_eq!(s.advance(1.0).status, Status::Success);
    let stats = s.stats();
    let t = stats.current_time - 0.5 * stats.last_step;
    s.interpolate(t, &mut y).unwrap();
    assert_relative_eq!(y[0], (-t).exp(), max_relative = 1e-5);
}

#[test]
fn destroy_is_idempotent() {
    let mut handle = Some(dense(Chain, &[1.0, 0.0], 1e-6, 1e-8));
    stiff_session::session::destroy(&mut handle);
    assert!(handle.is_none());
    stiff_session::session::destroy(&mut handle);
    assert!(handle.is_none());
}
