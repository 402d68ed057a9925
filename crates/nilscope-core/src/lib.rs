//! nilscope core - analyzer-facing surface
//!
//! Configuration shared by every pass and the driver-side fact store that
//! routes encoded inference facts between per-package passes. The inference
//! core itself lives in `nilscope-inference` and has no configuration.

pub mod config;
pub mod driver;
