//! Argv parsing
//!
//! Scans argv command by command, descending into subcommands, then runs
//! the resolution lifecycle over the whole chain.

pub mod finalize;
pub mod help;
pub mod invocation;

use crate::command::{Command, Context};
use crate::error::CliResult;
use finalize::Level;
use std::rc::Rc;

// Re-export main types
pub use finalize::Matches;
pub use help::render_help;

/// Parse `argv` (program name excluded) against the tree rooted at `root`
pub(crate) fn parse(root: &Command, argv: Vec<String>) -> CliResult<Matches> {
    let mut errors = Vec::new();

    let mut ctx = Rc::new(Context::root(root));
    let scan = invocation::scan(&ctx, argv, &mut errors);
    let mut next = scan.subcommand;
    let root_level = Level {
        ctx: Rc::clone(&ctx),
        invocations: scan.invocations,
        argument_values: scan.argument_values,
    };

    let mut descendants = Vec::new();
    while let Some((command, tokens)) = next.take() {
        ctx = Rc::new(Context::child(&ctx, command));
        let scan = invocation::scan(&ctx, tokens, &mut errors);
        next = scan.subcommand;
        descendants.push(Level {
            ctx: Rc::clone(&ctx),
            invocations: scan.invocations,
            argument_values: scan.argument_values,
        });
    }

    finalize::finalize(root_level, descendants, errors)
}
