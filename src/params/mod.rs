//! Parameter declarations
//!
//! Options, arguments, their completion candidates and value converters.

pub mod argument;
pub mod completion;
pub mod convert;
pub mod option;

// Re-export main types
pub use argument::{Arg, ArgumentHandle, ArgumentSpec, IntoArgument, ValueArg};
pub use completion::{CompletionCandidates, CompletionGenerator, ShellType};
pub use convert::Converter;
pub use option::{
    EagerCallback, EagerOpt, FlagOpt, IntoOption, Invocation, Opt, OptionHandle, OptionSpec,
    ValueOpt,
};
