//! Shell completion script generation

pub mod bash;

// Re-export main types
pub use bash::generate_completion;
