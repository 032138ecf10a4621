//! Convenient prelude: import the most commonly used traits and types.
//!
//! Bring this into scope with:
//!
//! ```rust
//! use stiff_session::prelude::*;
//! ```
//!
//! Re-exports included:
//! - Host interface: `Float`, `OdeSystem`, `Matrix`, `Interpolate`.
//! - Sessions: `Session`, `Config`, `Variant`, `Settings`, `Tuning`, `Advance`, `Status`,
//!   `Stats`, `Error`.
//! - Compartments: `Compartment`.
//! - Trajectories: `integrate`, `Trajectory`.

pub use crate::{
    Float,
    compartment::Compartment,
    error::Error,
    interpolate::Interpolate,
    matrix::Matrix,
    methods::{
        result::{Advance, Stats},
        settings::{Settings, Tuning},
    },
    ode::OdeSystem,
    session::{Config, Session, Variant},
    status::Status,
    trajectory::{Trajectory, integrate},
};
