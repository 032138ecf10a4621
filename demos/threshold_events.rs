//! # Example: Threshold events
//!
//! A substrate S is consumed while a product P accumulates:
//!
//! ```text
//! S' = -k S
//! P' =  k S
//! ```
//!
//! Two root functions report when S falls below half its initial amount and
//! when P crosses 0.9. The session stops at each crossing and resumes.

use stiff_session::prelude::*;

struct Conversion {
    k: f64,
}

impl OdeSystem for Conversion {
    fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
        dydt[0] = -self.k * y[0];
        dydt[1] = self.k * y[0];
    }

    fn roots(&self, _t: f64, y: &[f64], gout: &mut [f64]) {
        gout[0] = y[0] - 0.5;
        gout[1] = y[1] - 0.9;
    }
}

fn main() {
    let config = Config::builder()
        .variant(Variant::MatrixFree)
        .rtol(1e-8)
        .atol(1e-10)
        .build();
    let mut session = match Session::new(Conversion { k: 2.0 }, 0.0, &[1.0, 0.0], config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };
    if let Err(e) = session.init_roots(2) {
        eprintln!("{e}");
        return;
    }

    let tend = 5.0;
    loop {
        let out = session.advance(tend);
        match out.status {
            Status::RootReturn => {
                println!(
                    "t = {:.8}  roots = {:?}  y = {:?}",
                    out.t,
                    session.root_info(),
                    session.state()
                );
            }
            Status::Success => {
                println!("reached t = {}  y = {:?}", out.t, session.state());
                break;
            }
            status => {
                eprintln!("stopped at t = {}: {status}", out.t);
                break;
            }
        }
    }

    println!("expected S = 0.5 at t = {:.8}", (2.0f64).ln() / 2.0);
    println!("expected P = 0.9 at t = {:.8}", (10.0f64).ln() / 2.0);
    let stats = session.stats();
    println!(
        "steps: {}, root evals: {}, krylov iterations: {}",
        stats.steps, stats.root_evals, stats.linear_iters
    );
}
