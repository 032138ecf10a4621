// Numerical methods

pub mod bdf;
pub mod result;
pub mod settings;
