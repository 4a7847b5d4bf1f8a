//! Command tree
//!
//! A [`Command`] owns its options, arguments and subcommands. The tree is
//! built once at startup; every declaration is validated as it is added, so
//! a tree that was built successfully can always be parsed and turned into
//! a completion script.

use crate::completion::generate_completion;
use crate::error::{CliResult, DeclarationError, DeclarationResult};
use crate::params::argument::DeclaredArgument;
use crate::params::option::DeclaredOption;
use crate::params::{
    ArgumentHandle, ArgumentSpec, EagerOpt, IntoArgument, IntoOption, OptionHandle, OptionSpec,
    ShellType,
};
use crate::parser::{self, Matches};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Identity of a command, shared by the handles it hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(usize);

impl CommandId {
    fn next() -> Self {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        CommandId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A command with its options, arguments, subcommands and aliases
pub struct Command {
    id: CommandId,
    name: String,
    help: String,
    hidden: bool,
    pub(crate) options: Vec<DeclaredOption>,
    pub(crate) arguments: Vec<DeclaredArgument>,
    subcommands: Vec<Command>,
    aliases: Vec<(String, Vec<String>)>,
    allow_interspersed_args: Option<bool>,
    invoke_without_subcommand: bool,
}

impl Command {
    /// Create an empty command
    pub fn new(name: impl Into<String>) -> Self {
        Command {
            id: CommandId::next(),
            name: name.into(),
            help: String::new(),
            hidden: false,
            options: Vec::new(),
            arguments: Vec::new(),
            subcommands: Vec::new(),
            aliases: Vec::new(),
            allow_interspersed_args: None,
            invoke_without_subcommand: false,
        }
    }

    /// Set the help text
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Keep out of help listings and completion candidates
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Whether options may follow the first positional token; inherited
    /// from the parent when not set
    pub fn allow_interspersed_args(mut self, allow: bool) -> Self {
        self.allow_interspersed_args = Some(allow);
        self
    }

    /// Allow parsing to finish without a subcommand when subcommands exist
    pub fn invoke_without_subcommand(mut self, allow: bool) -> Self {
        self.invoke_without_subcommand = allow;
        self
    }

    /// Declare a regular option
    pub fn option<O: IntoOption>(&mut self, option: O) -> DeclarationResult<OptionHandle<O::Value>> {
        let option = option.into_option();
        self.check_option_names(option.spec())?;
        self.options.push(option.erase());
        Ok(OptionHandle::new(self.id, self.options.len() - 1))
    }

    /// Declare an eager option such as help or version
    pub fn eager_option(&mut self, option: EagerOpt) -> DeclarationResult<()> {
        self.check_option_names(&option.spec)?;
        self.options.push(option.erase());
        Ok(())
    }

    /// Declare a positional argument
    pub fn argument<A: IntoArgument>(
        &mut self,
        argument: A,
    ) -> DeclarationResult<ArgumentHandle<A::Value>> {
        let argument = argument.into_argument();
        let spec = argument.spec();

        if !is_valid_word(&spec.name) {
            return Err(DeclarationError::InvalidArgumentName(spec.name.clone()));
        }
        if self.argument_specs().any(|a| a.name == spec.name) {
            return Err(DeclarationError::DuplicateArgumentName {
                command: self.name.clone(),
                name: spec.name.clone(),
            });
        }
        // Fixed-arity arguments are matched first, so the variadic one must close the list
        if let Some(variadic) = self.argument_specs().find(|a| a.is_variadic()) {
            return Err(DeclarationError::ArgumentAfterVariadic {
                command: self.name.clone(),
                name: spec.name.clone(),
                variadic: variadic.name.clone(),
            });
        }

        self.arguments.push(argument.erase());
        Ok(ArgumentHandle::new(self.id, self.arguments.len() - 1))
    }

    /// Attach a subcommand
    pub fn subcommand(&mut self, command: Command) -> DeclarationResult<()> {
        if !is_valid_word(&command.name) {
            return Err(DeclarationError::InvalidCommandName(command.name));
        }
        if self.find_subcommand(&command.name).is_some() {
            return Err(DeclarationError::DuplicateSubcommand {
                command: self.name.clone(),
                name: command.name,
            });
        }
        self.subcommands.push(command);
        Ok(())
    }

    /// Declare an alias that expands to a fixed token sequence
    pub fn alias<I, S>(&mut self, name: impl Into<String>, tokens: I) -> DeclarationResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();

        if !is_valid_word(&name) {
            return Err(DeclarationError::InvalidCommandName(name));
        }
        if self.alias_expansion(&name).is_some() {
            return Err(DeclarationError::DuplicateAlias {
                command: self.name.clone(),
                name,
            });
        }

        // An expansion never contains an alias name, so a splice cannot loop
        if tokens.contains(&name) {
            return Err(DeclarationError::RecursiveAlias {
                command: self.name.clone(),
                target: name.clone(),
                name,
            });
        }
        for (existing, expansion) in &self.aliases {
            if tokens.contains(existing) {
                return Err(DeclarationError::RecursiveAlias {
                    command: self.name.clone(),
                    name,
                    target: existing.clone(),
                });
            }
            if expansion.contains(&name) {
                return Err(DeclarationError::RecursiveAlias {
                    command: self.name.clone(),
                    name: existing.clone(),
                    target: name,
                });
            }
        }

        self.aliases.push((name, tokens));
        Ok(())
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help_text(&self) -> &str {
        &self.help
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub(crate) fn interspersed_setting(&self) -> Option<bool> {
        self.allow_interspersed_args
    }

    pub(crate) fn allows_missing_subcommand(&self) -> bool {
        self.invoke_without_subcommand || self.subcommands.is_empty()
    }

    /// Declared options, including eager ones, in declaration order
    pub fn option_specs(&self) -> impl Iterator<Item = &OptionSpec> {
        self.options.iter().map(|o| &o.spec)
    }

    /// Declared arguments in declaration order
    pub fn argument_specs(&self) -> impl Iterator<Item = &ArgumentSpec> {
        self.arguments.iter().map(|a| &a.spec)
    }

    pub fn subcommands(&self) -> &[Command] {
        &self.subcommands
    }

    /// Aliases in declaration order
    pub fn aliases(&self) -> &[(String, Vec<String>)] {
        &self.aliases
    }

    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|c| c.name == name)
    }

    pub fn alias_expansion(&self, name: &str) -> Option<&[String]> {
        self.aliases
            .iter()
            .find(|(alias, _)| alias == name)
            .map(|(_, tokens)| tokens.as_slice())
    }

    /// Index of the option with exactly this name
    pub(crate) fn find_option(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|o| o.spec.has_name(name))
    }

    /// First characters of every option name, e.g. `-` and `+`
    pub fn prefix_chars(&self) -> BTreeSet<char> {
        self.option_specs()
            .flat_map(|spec| spec.all_names())
            .filter_map(|name| name.chars().next())
            .collect()
    }

    /// Whether there is anything for a shell to complete
    pub fn has_completion_surface(&self) -> bool {
        !(self.options.is_empty() && self.arguments.is_empty() && self.subcommands.is_empty())
    }

    /// Parse `argv` (without the program name) against this command tree
    pub fn parse<I, S>(&self, argv: I) -> CliResult<Matches>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        parser::parse(self, argv.into_iter().map(Into::into).collect())
    }

    /// Parse `argv`; on help, version or error print the message and exit
    pub fn parse_or_exit<I, S>(&self, argv: I) -> Matches
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.parse(argv) {
            Ok(matches) => matches,
            Err(err) => {
                if err.is_error() {
                    eprintln!("Error: {}", err);
                } else {
                    println!("{}", err);
                }
                std::process::exit(err.exit_code());
            }
        }
    }

    /// Completion script for this tree
    pub fn completion_script(&self, shell: ShellType) -> String {
        generate_completion(self, shell)
    }

    fn check_option_names(&self, spec: &OptionSpec) -> DeclarationResult<()> {
        if spec.names.is_empty() {
            return Err(DeclarationError::NoOptionNames);
        }

        let mut seen = BTreeSet::new();
        for name in spec.all_names() {
            if !is_valid_option_name(name) {
                return Err(DeclarationError::InvalidOptionName(name.to_string()));
            }
            if !seen.insert(name) || self.find_option(name).is_some() {
                return Err(DeclarationError::DuplicateOptionName {
                    command: self.name.clone(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("arguments", &self.arguments)
            .field("subcommands", &self.subcommands)
            .field("aliases", &self.aliases)
            .field("allow_interspersed_args", &self.allow_interspersed_args)
            .finish_non_exhaustive()
    }
}

fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && !word.chars().any(char::is_whitespace)
}

fn is_valid_option_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(prefix) if !prefix.is_alphanumeric() => {
            chars.next().is_some() && is_valid_word(name) && !name.contains('=')
        }
        _ => false,
    }
}
