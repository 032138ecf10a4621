//! # Example: Exponential Decay
//!
//! Sample dy/dt = -y, y(0) = 1 on a grid of output times.

use stiff_session::prelude::*;

struct Decay;

impl OdeSystem for Decay {
    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        for (d, v) in dydt.iter_mut().zip(y) {
            *d = -v;
        }
    }
}

fn main() {
    let config = Config::builder().rtol(1e-8).atol(1e-10).build();
    let mut session = match Session::new(Decay, 0.0, &[1.0], config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    let times: Vec<f64> = (0..=10).map(|i| i as f64 * 0.5).collect();
    let traj = integrate(&mut session, &times);
    println!("status: {}", traj.status);
    for (t, y) in traj.t.iter().zip(&traj.y) {
        println!("t = {t:4.1}  y = {:.10}  error = {:.2e}", y[0], (y[0] - (-t).exp()).abs());
    }

    let stats = session.stats();
    println!(
        "steps: {}, rhs evals: {}, error test failures: {}",
        stats.steps, stats.rhs_evals, stats.err_test_fails
    );
}
