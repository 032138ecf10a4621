//! Step budget escalation.
//!
//! When the integrator runs out of internal steps before reaching the requested
//! time, the request is retried from where it stopped with twice the budget. The
//! budget only grows, and escalation stops once doubling would pass the cap.

use crate::{
    methods::{result::Advance, settings::DEFAULT_MAX_STEPS},
    status::Status,
};

/// Escalation never raises the step budget above this value.
pub const BUDGET_CAP: u64 = 1_000_000_000;

/// Run `attempt(budget)` until it returns anything other than
/// [`Status::TooMuchWork`], doubling `budget` between attempts.
///
/// A budget of 0 is first reset to the default of 2000. When doubling would take
/// the budget past [`BUDGET_CAP`] the loop stops with
/// [`Status::WorkLimitExceeded`] at the time the last attempt reached. `budget`
/// keeps the last value that was tried.
pub fn run_with_escalation<F>(budget: &mut u64, mut attempt: F) -> Advance
where
    F: FnMut(u64) -> Advance,
{
    loop {
        let out = attempt(*budget);
        if out.status != Status::TooMuchWork {
            return out;
        }
        if *budget == 0 {
            *budget = DEFAULT_MAX_STEPS;
        }
        if *budget > BUDGET_CAP / 2 {
            log::debug!(
                "step budget {} exhausted at t = {}; escalation cap reached",
                budget,
                out.t
            );
            return Advance::new(out.t, Status::WorkLimitExceeded);
        }
        *budget *= 2;
        log::debug!(
            "step budget exhausted at t = {}; retrying with {} steps",
            out.t,
            budget
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Makes one time unit of progress per 1000 steps of budget and succeeds once
    /// the target is reached.
    fn fake_solver(target: f64, seen: &mut Vec<u64>) -> impl FnMut(u64) -> Advance + '_ {
        let mut t = 0.0;
        move |budget| {
            seen.push(budget);
            t += budget as f64 / 1000.0;
            if t >= target {
                Advance::new(target as _, Status::Success)
            } else {
                Advance::new(t as _, Status::TooMuchWork)
            }
        }
    }

    #[test]
    fn doubles_until_success() {
        let mut budget = 2000;
        let mut seen = Vec::new();
        let out = run_with_escalation(&mut budget, fake_solver(100.0, &mut seen));
        assert_eq!(out.status, Status::Success);
        assert_eq!(out.t, 100.0);
        assert_eq!(seen, vec![2000, 4000, 8000, 16000, 32000, 64000]);
        assert_eq!(budget, 64000);
    }

    #[test]
    fn zero_budget_resets_before_doubling() {
        let mut budget = 0;
        let mut seen = Vec::new();
        let out = run_with_escalation(&mut budget, fake_solver(5.0, &mut seen));
        assert_eq!(out.status, Status::Success);
        assert_eq!(seen, vec![0, 4000, 8000]);
    }

    #[test]
    fn stops_when_doubling_would_pass_the_cap() {
        let mut budget = 600_000_000;
        let mut calls = 0;
        let out = run_with_escalation(&mut budget, |_| {
            calls += 1;
            Advance::new(3.0, Status::TooMuchWork)
        });
        assert_eq!(out, Advance::new(3.0, Status::WorkLimitExceeded));
        assert_eq!(calls, 1);
        assert_eq!(budget, 600_000_000);
    }

    #[test]
    fn budget_never_exceeds_the_cap() {
        let mut budget = 2000;
        let mut seen = Vec::new();
        let out = run_with_escalation(&mut budget, |b| {
            seen.push(b);
            Advance::new(0.0, Status::TooMuchWork)
        });
        assert_eq!(out.status, Status::WorkLimitExceeded);
        assert!(seen.windows(2).all(|w| w[1] == 2 * w[0]));
        assert!(seen.iter().all(|b| *b <= BUDGET_CAP));
        assert_eq!(*seen.last().unwrap(), 2000 * (1 << 18));
    }

    #[test]
    fn other_failures_are_not_retried() {
        let mut budget = 2000;
        let mut calls = 0;
        let out = run_with_escalation(&mut budget, |_| {
            calls += 1;
            Advance::new(1.5, Status::ConvergenceFailure)
        });
        assert_eq!(out.status, Status::ConvergenceFailure);
        assert_eq!(calls, 1);
        assert_eq!(budget, 2000);
    }
}
