//! Command tree and parse context

#[allow(clippy::module_inception)]
pub mod command;
pub mod context;

// Re-export main types
pub use command::{Command, CommandId};
pub use context::Context;
