//! File exports.
//!
//! - selected series to CSV (`export`)

pub mod export;

pub use export::*;
