//! Long-running stiff ODE integration sessions.
//!
//! A [`Session`] owns the state vector and a variable-order BDF integrator, and is
//! driven forward by a host in discrete time requests. When the integrator runs out of
//! internal steps before reaching a requested time, the session doubles its step budget
//! and resumes from where the integrator stopped, instead of failing the request.
//!
//! The crate also carries a small nested [`Compartment`] model used to describe the
//! spatial structure of the simulated system.
//!
//! ```
//! use stiff_session::prelude::*;
//!
//! struct Decay;
//!
//! impl OdeSystem for Decay {
//!     fn rhs(&self, _t: f64, y: &[f64], dydt: &mut [f64]) {
//!         dydt[0] = -y[0];
//!         dydt[1] = y[0];
//!     }
//! }
//!
//! let config = Config::builder().rtol(1e-6).atol(1e-9).build();
//! let mut session = Session::new(Decay, 0.0, &[1.0, 0.0], config).unwrap();
//! let step = session.advance(1.0);
//! assert_eq!(step.status, Status::Success);
//! assert_eq!(step.t, 1.0);
//! assert!((session.state()[0] - (-1.0f64).exp()).abs() < 1e-5);
//! ```

mod error;
mod hinit;
mod interpolate;
mod ode;
mod status;

pub mod compartment;
pub mod matrix;
pub mod methods;
pub mod prelude;
pub mod session;
pub mod stiffness;
pub mod trajectory;

#[cfg(feature = "python")]
mod python;

pub use compartment::Compartment;
pub use error::Error;
pub use interpolate::Interpolate;
pub use matrix::Matrix;
pub use methods::{
    result::{Advance, Stats},
    settings::{Settings, Tuning},
};
pub use ode::OdeSystem;
pub use session::{Config, Session, Variant};
pub use status::Status;

// Prevent selecting two incompatible float precision features at once.
#[cfg(all(feature = "f32", feature = "f64"))]
compile_error!(
    "features 'f32' and 'f64' cannot both be enabled; pick exactly one Float precision feature"
);

/// Scalar type for times, states and tolerances, selected by the `f32`/`f64` features.
#[cfg(feature = "f32")]
pub type Float = f32;
#[cfg(feature = "f64")]
pub type Float = f64;
