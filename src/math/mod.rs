//! Mathematical utilities: least squares and log-linear growth.

pub mod ols;

pub use ols::*;
