//! Shared utilities for the quadratic-voting governor.

pub mod logging;

pub use logging::{init_logging, LogFormat};
