//! Shared utilities for Hiroba.
//!
//! - [`logger`]: tracing subscriber setup used by the binaries
//! - [`time`]: clock abstraction and timestamp helpers

pub mod logger;
pub mod time;
