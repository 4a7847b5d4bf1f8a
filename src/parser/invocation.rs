//! Token scanning for a single command
//!
//! Walks one command's share of argv left to right, splitting it into
//! option invocations, positional values and, possibly, a subcommand that
//! receives everything after its name.

use crate::command::{Command, Context};
use crate::error::ParseError;
use crate::params::Invocation;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// What one command took from argv
#[derive(Debug)]
pub(crate) struct LevelScan<'a> {
    /// Invocations per declared option, in declaration order
    pub(crate) invocations: Vec<Vec<Invocation>>,

    /// Raw values per declared argument, in declaration order
    pub(crate) argument_values: Vec<Vec<String>>,

    /// Matched subcommand and the tokens that follow it
    pub(crate) subcommand: Option<(&'a Command, Vec<String>)>,
}

/// Scan `tokens` against the command in `ctx`.
///
/// Errors are collected rather than returned so that eager options seen
/// later on the line (such as `--help`) still get their turn.
pub(crate) fn scan<'a>(
    ctx: &Context<'a>,
    tokens: Vec<String>,
    errors: &mut Vec<ParseError>,
) -> LevelScan<'a> {
    let command = ctx.command();
    let mut prefix_chars = command.prefix_chars();
    prefix_chars.insert('-');

    let mut scanner = Scanner {
        command,
        allow_interspersed_args: ctx.allow_interspersed_args(),
        tokens,
        pos: 0,
        can_parse_options: true,
        prefix_chars,
        invocations: vec![Vec::new(); command.options.len()],
        argument_values: vec![Vec::new(); command.arguments.len()],
        next_argument: 0,
    };

    let subcommand = scanner.run(errors);
    scanner.check_partial_arguments(errors);

    LevelScan {
        invocations: scanner.invocations,
        argument_values: scanner.argument_values,
        subcommand,
    }
}

struct Scanner<'a> {
    command: &'a Command,
    allow_interspersed_args: bool,
    tokens: Vec<String>,
    pos: usize,
    can_parse_options: bool,
    prefix_chars: BTreeSet<char>,
    invocations: Vec<Vec<Invocation>>,
    argument_values: Vec<Vec<String>>,
    next_argument: usize,
}

impl<'a> Scanner<'a> {
    fn run(&mut self, errors: &mut Vec<ParseError>) -> Option<(&'a Command, Vec<String>)> {
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();

            if self.can_parse_options {
                if token == "--" {
                    trace!(command = self.command.name(), "option parsing disabled by --");
                    self.can_parse_options = false;
                    self.pos += 1;
                    continue;
                }
                if self.is_option_like(&token) && self.parse_option(&token, errors) {
                    continue;
                }
            }

            if let Some(expansion) = self.command.alias_expansion(&token) {
                debug!(alias = %token, ?expansion, "expanding alias");
                self.tokens
                    .splice(self.pos..=self.pos, expansion.iter().cloned());
                continue;
            }

            if self.can_parse_options && self.is_option_like(&token) {
                errors.push(ParseError::NoSuchOption { name: token });
                self.pos += 1;
                continue;
            }

            if let Some(subcommand) = self.command.find_subcommand(&token) {
                debug!(
                    command = self.command.name(),
                    subcommand = subcommand.name(),
                    "dispatching to subcommand"
                );
                let rest = self.tokens.split_off(self.pos + 1);
                return Some((subcommand, rest));
            }

            self.positional(token, errors);
            if !self.allow_interspersed_args {
                self.can_parse_options = false;
            }
            self.pos += 1;
        }
        None
    }

    fn is_option_like(&self, token: &str) -> bool {
        let mut chars = token.chars();
        match chars.next() {
            Some(first) => chars.next().is_some() && self.prefix_chars.contains(&first),
            None => false,
        }
    }

    /// Try every option syntax in turn; `false` when the token names no option
    fn parse_option(&mut self, token: &str, errors: &mut Vec<ParseError>) -> bool {
        // --xx 3
        if let Some(index) = self.command.find_option(token) {
            self.pos += 1;
            self.consume(index, token, None, errors);
            return true;
        }

        // --xx=3
        if let Some((name, value)) = token.split_once('=') {
            if let Some(index) = self.command.find_option(name) {
                self.pos += 1;
                if self.command.options[index].spec.nvalues == 0 {
                    errors.push(ParseError::OptionTakesNoValue {
                        name: name.to_string(),
                    });
                } else {
                    self.consume(index, name, Some(value.to_string()), errors);
                }
                return true;
            }
        }

        // -x3 and -abc
        self.parse_short_cluster(token, errors)
    }

    fn parse_short_cluster(&mut self, token: &str, errors: &mut Vec<ParseError>) -> bool {
        let mut chars = token.chars();
        let (prefix, first) = match (chars.next(), chars.next()) {
            (Some(prefix), Some(first)) if first != prefix => (prefix, first),
            _ => return false,
        };
        if self.command.find_option(&format!("{}{}", prefix, first)).is_none() {
            return false;
        }

        self.pos += 1;
        let body = &token[prefix.len_utf8()..];
        for (offset, c) in body.char_indices() {
            let name = format!("{}{}", prefix, c);
            let Some(index) = self.command.find_option(&name) else {
                errors.push(ParseError::NoSuchOption { name });
                return true;
            };

            if self.command.options[index].spec.nvalues == 0 {
                self.record(index, name, Vec::new());
                continue;
            }

            // The rest of the cluster is this option's first value
            let rest = &body[offset + c.len_utf8()..];
            let attached = (!rest.is_empty()).then(|| rest.to_string());
            self.consume(index, &name, attached, errors);
            return true;
        }
        true
    }

    /// Read the option's values, starting with any attached one
    fn consume(
        &mut self,
        index: usize,
        name: &str,
        attached: Option<String>,
        errors: &mut Vec<ParseError>,
    ) {
        let nvalues = self.command.options[index].spec.nvalues;
        let mut values: Vec<String> = attached.into_iter().collect();
        let needed = nvalues.saturating_sub(values.len());

        if self.tokens.len() - self.pos < needed {
            errors.push(ParseError::IncorrectOptionValueCount {
                name: name.to_string(),
                expected: nvalues,
            });
            self.pos = self.tokens.len();
            return;
        }

        values.extend(self.tokens[self.pos..self.pos + needed].iter().cloned());
        self.pos += needed;
        self.record(index, name.to_string(), values);
    }

    fn record(&mut self, index: usize, name: String, values: Vec<String>) {
        trace!(option = %name, ?values, "option invocation");
        self.invocations[index].push(Invocation::new(name, values));
    }

    fn positional(&mut self, token: String, errors: &mut Vec<ParseError>) {
        let arguments = &self.command.arguments;

        // Skip fixed-arity arguments that already have their quota
        while let Some(argument) = arguments.get(self.next_argument) {
            match argument.spec.fixed_arity() {
                Some(n) if self.argument_values[self.next_argument].len() >= n => {
                    self.next_argument += 1
                }
                _ => break,
            }
        }

        if self.next_argument < arguments.len() {
            trace!(
                argument = %arguments[self.next_argument].spec.name,
                value = %token,
                "positional value"
            );
            self.argument_values[self.next_argument].push(token);
        } else if !self.command.subcommands().is_empty() {
            errors.push(ParseError::NoSuchSubcommand { name: token });
        } else {
            errors.push(ParseError::UnexpectedArgument { value: token });
        }
    }

    fn check_partial_arguments(&self, errors: &mut Vec<ParseError>) {
        for (argument, values) in self.command.arguments.iter().zip(&self.argument_values) {
            if let Some(n) = argument.spec.fixed_arity() {
                if !values.is_empty() && values.len() < n {
                    errors.push(ParseError::IncorrectArgumentValueCount {
                        name: argument.spec.metavar(),
                        expected: n,
                    });
                }
            }
        }
    }
}
