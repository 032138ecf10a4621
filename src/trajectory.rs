//! Sample a session on a grid of output times.

use crate::{Float, ode::OdeSystem, session::Session, status::Status};

/// A root crossing met on the way to an output time.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub t: Float,
    pub y: Vec<Float>,
    /// Crossing direction per root function, as in
    /// [`Session::root_info`].
    pub roots: Vec<i32>,
}

/// Samples collected by [`integrate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trajectory {
    /// Output times reached, in order.
    pub t: Vec<Float>,
    /// State at each entry of `t`.
    pub y: Vec<Vec<Float>>,
    pub events: Vec<Event>,
    /// [`Status::Success`] if every output time was reached, otherwise the
    /// failure that stopped the run.
    pub status: Status,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.status == Status::Success
    }
}

/// Advance `session` through each time in `times`, recording the state there.
///
/// Root returns are recorded as events and integration resumes towards the same
/// output time. An output time equal to the current time records the current
/// state. The run stops at the first failure, which is kept in
/// [`Trajectory::status`].
pub fn integrate<S: OdeSystem>(session: &mut Session<S>, times: &[Float]) -> Trajectory {
    let mut traj = Trajectory::default();
    for &t in times {
        loop {
            let out = session.advance(t);
            match out.status {
                Status::Success => {
                    traj.t.push(out.t);
                    traj.y.push(session.state().to_vec());
                    break;
                }
                Status::RootReturn => traj.events.push(Event {
                    t: out.t,
                    y: session.state().to_vec(),
                    roots: session.root_info().to_vec(),
                }),
                status => {
                    log::debug!("trajectory stopped at t = {}: {status}", out.t);
                    traj.status = status;
                    return traj;
                }
            }
        }
    }
    traj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Config;
    use approx::assert_relative_eq;

    /// y' = -y with a root where y crosses 0.5.
    struct HalfLife;

    impl OdeSystem for HalfLife {
        fn rhs(&self, _t: Float, y: &[Float], dydt: &mut [Float]) {
            dydt[0] = -y[0];
        }

        fn roots(&self, _t: Float, y: &[Float], gout: &mut [Float]) {
            gout[0] = y[0] - 0.5;
        }
    }

    fn session() -> Session<HalfLife> {
        let config = Config::builder().rtol(1e-8).atol(1e-10).build();
        Session::new(HalfLife, 0.0, &[1.0], config).unwrap()
    }

    #[test]
    fn samples_every_output_time() {
        let mut s = session();
        let traj = integrate(&mut s, &[0.0, 0.5, 1.0, 2.0]);
        assert!(traj.is_complete());
        assert_eq!(traj.t, vec![0.0, 0.5, 1.0, 2.0]);
        for (t, y) in traj.t.iter().zip(&traj.y) {
            assert_relative_eq!(y[0], (-t).exp(), max_relative = 1e-6);
        }
        assert!(traj.events.is_empty());
    }

    #[test]
    fn records_events_and_resumes() {
        let mut s = session();
        s.init_roots(1).unwrap();
        let traj = integrate(&mut s, &[1.0, 2.0]);
        assert!(traj.is_complete());
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.events.len(), 1);
        let event = &traj.events[0];
        assert_relative_eq!(event.t, (2.0 as Float).ln(), max_relative = 1e-6);
        assert_eq!(event.roots, vec![-1]);
    }

    #[test]
    fn stops_at_first_failure() {
        let mut s = session();
        let traj = integrate(&mut s, &[1.0, 0.5, 2.0]);
        assert_eq!(traj.status, Status::IllegalInput);
        assert_eq!(traj.t, vec![1.0]);
    }
}
