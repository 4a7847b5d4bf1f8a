//! Argtree - declare command trees, parse argv, complete in the shell
//!
//! A command tree is declared once, either in code through [`Command`] or in
//! an `argtree.yml` file. The same tree parses process arguments following
//! POSIX/GNU conventions and generates Bash/Zsh completion scripts that
//! replay the parser's decisions inside the shell.

// Public modules
pub mod cli;
pub mod command;
pub mod completion;
pub mod config;
pub mod error;
pub mod params;
pub mod parser;

// Re-export commonly used types
pub use command::{Command, Context};
pub use error::{ArgtreeError, CliError, DeclarationError, ParseError, Result};
pub use params::{
    Arg, ArgumentHandle, CompletionCandidates, EagerOpt, FlagOpt, Invocation, Opt, OptionHandle,
    ShellType, ValueArg, ValueOpt,
};
pub use parser::Matches;

/// Current version of Argtree
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
