//! CLI interface
//!
//! This module implements the `argtree` binary: loading declarations,
//! parsing arguments against them and printing completion scripts.

pub mod app;
pub mod logging;

// Re-export main types
pub use app::*;
pub use logging::*;
