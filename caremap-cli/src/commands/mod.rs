//! CLI command implementations.

pub mod common;
pub mod rank;
pub mod watch;
