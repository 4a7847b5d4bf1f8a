//! Resolution lifecycle
//!
//! Once every command in the chain has been scanned, each declared option
//! and argument is finalized with what it received. Eager options go first,
//! across the whole chain, so `--help` wins over any parse or validation
//! error.

use crate::command::{CommandId, Context};
use crate::error::{CliError, CliResult, ParseError};
use crate::params::option::{ErasedValue, OptionKind};
use crate::params::{ArgumentHandle, Invocation, OptionHandle};
use crate::parser::help::render_help;
use std::rc::Rc;
use tracing::debug;

/// One scanned command awaiting finalization
pub(crate) struct Level<'a> {
    pub(crate) ctx: Rc<Context<'a>>,
    pub(crate) invocations: Vec<Vec<Invocation>>,
    pub(crate) argument_values: Vec<Vec<String>>,
}

/// Finalize the scanned chain `root`, `descendants...`
pub(crate) fn finalize(
    root: Level<'_>,
    descendants: Vec<Level<'_>>,
    errors: Vec<ParseError>,
) -> CliResult<Matches> {
    for level in std::iter::once(&root).chain(&descendants) {
        run_eager_options(level)?;
    }

    if let Some(err) = errors.into_iter().next() {
        return Err(err.into());
    }

    let innermost = descendants.last().unwrap_or(&root);
    if !innermost.ctx.command().allows_missing_subcommand() {
        return Err(CliError::PrintHelp {
            message: render_help(&innermost.ctx),
            error: true,
        });
    }

    let mut matches = resolve(root)?;
    let mut resolved = descendants
        .into_iter()
        .map(resolve)
        .collect::<Result<Vec<_>, _>>()?;

    let mut child = None;
    while let Some(mut level) = resolved.pop() {
        level.subcommand = child.take();
        child = Some(Box::new(level));
    }
    matches.subcommand = child;

    Ok(matches)
}

fn run_eager_options(level: &Level<'_>) -> CliResult<()> {
    let command = level.ctx.command();
    for (option, invocations) in command.options.iter().zip(&level.invocations) {
        if let OptionKind::Eager(callback) = &option.kind {
            if invocations.is_empty() {
                continue;
            }
            debug!(
                command = command.name(),
                option = option.spec.longest_name(),
                "running eager option"
            );
            callback(level.ctx.as_ref(), invocations.as_slice())?;
        }
    }
    Ok(())
}

fn resolve(level: Level<'_>) -> Result<Matches, ParseError> {
    let command = level.ctx.command();

    let mut options = Vec::with_capacity(command.options.len());
    for (option, invocations) in command.options.iter().zip(&level.invocations) {
        let value = match &option.kind {
            OptionKind::Regular(finalize) => {
                Some(finalize(level.ctx.as_ref(), invocations.as_slice())?)
            }
            OptionKind::Eager(_) => None,
        };
        options.push(value);
    }

    let mut arguments = Vec::with_capacity(command.arguments.len());
    for (argument, values) in command.arguments.iter().zip(&level.argument_values) {
        arguments.push((argument.finalize)(level.ctx.as_ref(), values.as_slice())?);
    }

    Ok(Matches {
        command: command.id(),
        name: command.name().to_string(),
        options,
        arguments,
        invocations: level.invocations,
        argument_values: level.argument_values,
        subcommand: None,
    })
}

/// Finalized values for a command and, through
/// [`subcommand`](Matches::subcommand), for the subcommand it dispatched to
pub struct Matches {
    command: CommandId,
    name: String,
    options: Vec<Option<ErasedValue>>,
    arguments: Vec<ErasedValue>,
    invocations: Vec<Vec<Invocation>>,
    argument_values: Vec<Vec<String>>,
    subcommand: Option<Box<Matches>>,
}

impl Matches {
    /// Name of the command these values belong to
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subcommand(&self) -> Option<&Matches> {
        self.subcommand.as_deref()
    }

    pub fn subcommand_name(&self) -> Option<&str> {
        self.subcommand().map(Matches::name)
    }

    /// This level followed by every nested subcommand level
    pub fn levels(&self) -> impl Iterator<Item = &Matches> {
        std::iter::successors(Some(self), |m| m.subcommand())
    }

    fn level(&self, command: CommandId) -> Option<&Matches> {
        self.levels().find(|m| m.command == command)
    }

    /// Finalized value of an option declared anywhere in the parsed chain.
    ///
    /// `None` when the option's command was not part of this parse.
    pub fn get<T: 'static>(&self, handle: &OptionHandle<T>) -> Option<&T> {
        self.level(handle.command)?
            .options
            .get(handle.index)?
            .as_ref()
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Finalized value of an argument declared anywhere in the parsed chain
    pub fn argument<T: 'static>(&self, handle: &ArgumentHandle<T>) -> Option<&T> {
        self.level(handle.command)?
            .arguments
            .get(handle.index)
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Raw invocations of an option
    pub fn invocations<T>(&self, handle: &OptionHandle<T>) -> &[Invocation] {
        self.level(handle.command)
            .and_then(|m| m.invocations.get(handle.index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Raw values given to an argument
    pub fn raw_values<T>(&self, handle: &ArgumentHandle<T>) -> &[String] {
        self.level(handle.command)
            .and_then(|m| m.argument_values.get(handle.index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Rebuild argv in canonical form: every invocation as separate tokens
    /// in declaration order, then positional values (behind `--` when one of
    /// them looks like an option), then the subcommand and its own argv.
    pub fn canonical_argv(&self) -> Vec<String> {
        let mut argv = Vec::new();

        for invocation in self.invocations.iter().flatten() {
            argv.push(invocation.name.clone());
            argv.extend(invocation.values.iter().cloned());
        }

        let positionals: Vec<&String> = self.argument_values.iter().flatten().collect();
        if positionals.iter().any(|value| looks_like_option(value)) {
            argv.push("--".to_string());
        }
        argv.extend(positionals.into_iter().cloned());

        if let Some(sub) = self.subcommand() {
            argv.push(sub.name.clone());
            argv.extend(sub.canonical_argv());
        }

        argv
    }
}

impl std::fmt::Debug for Matches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matches")
            .field("name", &self.name)
            .field("invocations", &self.invocations)
            .field("argument_values", &self.argument_values)
            .field("subcommand", &self.subcommand)
            .finish_non_exhaustive()
    }
}

fn looks_like_option(value: &str) -> bool {
    value == "--"
        || value
            .chars()
            .next()
            .is_some_and(|c| !c.is_alphanumeric() && value.chars().count() > 1)
}
