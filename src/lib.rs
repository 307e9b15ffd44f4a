//! `ecdc-growth` library crate.
//!
//! The binary (`ecdc`) is a thin wrapper around this library so that:
//!
//! - the transform and coordinate math are testable without spawning processes
//! - fetching, decoding, and rendering stay separate, swappable stages

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod plot;
pub mod report;
pub mod transform;
