//! Matrix types, operations, and utilities.

mod base;
mod gmres;
mod linear;

pub use base::Matrix;
pub use gmres::{Gmres, GmresOutcome};
pub use linear::{Lu, SingularMatrix};
