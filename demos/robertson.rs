//! # Example: Robertson chemical kinetics
//!
//! The classic stiff test problem
//!
//! ```text
//! y1' = -0.04 y1 + 1e4 y2 y3
//! y2' =  0.04 y1 - 1e4 y2 y3 - 3e7 y2^2
//! y3' =  3e7 y2^2
//! ```
//!
//! integrated over twelve decades with settings chosen from its rate constants.

use stiff_session::prelude::*;
use stiff_session::stiffness::{ProfileHints, StiffConfig, StiffnessProfile};

struct Robertson;

impl OdeSystem for Robertson {
    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -0.04 * y[0] + 1e4 * y[1] * y[2];
        dydt[2] = 3e7 * y[1] * y[1];
        dydt[1] = -dydt[0] - dydt[2];
    }

    fn has_jacobian(&self) -> bool {
        true
    }

    fn jacobian(&self, _t: f64, y: &[f64], _fy: &[f64], jac: &mut Matrix) {
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

fn main() {
    let profile = StiffnessProfile::analyze(&[0.04, 1e4, 3e7], &ProfileHints::default());
    let recommended = StiffConfig::recommend(&profile);
    println!(
        "rate ratio {:.1e} ({:?}): {}",
        profile.rate_ratio, profile.category, recommended.rationale
    );

    let mut session = match Session::new(
        Robertson,
        0.0,
        &[1.0, 0.0, 0.0],
        recommended.to_config(Robertson.has_jacobian()),
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    println!("variant: {:?}", session.variant());

    let mut tout = 0.4;
    for _ in 0..12 {
        let out = session.advance(tout);
        if !out.status.is_ok() {
            eprintln!("failed at t = {}: {}", out.t, out.status);
            break;
        }
        let y = session.state();
        println!(
            "t = {:8.1e}  y = [{:.6e}, {:.6e}, {:.6e}]  sum = {:.12}",
            out.t,
            y[0],
            y[1],
            y[2],
            y.iter().sum::<f64>()
        );
        tout *= 10.0;
    }

    let s = session.stats();
    println!(
        "steps: {}, rhs evals: {}, jacobians: {}, lu setups: {}, newton iterations: {}, order: {}",
        s.steps, s.rhs_evals, s.jac_evals, s.lin_setups, s.nonlin_iters, s.current_order
    );
    println!("final step budget: {}", session.step_budget());
}
