//! Option declarations
//!
//! An option is declared with one of the builders in this module and handed
//! to [`Command::option`](crate::command::Command::option), which returns a
//! typed [`OptionHandle`]. After parsing, the handle reads the finalized
//! value out of [`Matches`](crate::parser::Matches).

use crate::command::{CommandId, Context};
use crate::error::{CliError, ParseError};
use crate::params::completion::CompletionCandidates;
use crate::params::convert::{self, Converter};
use crate::parser::render_help;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// One occurrence of an option on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The name token used to invoke the option (e.g. `-x` or `--no-color`)
    pub name: String,

    /// Raw values consumed by this occurrence
    pub values: Vec<String>,
}

impl Invocation {
    pub fn new(name: impl Into<String>, values: Vec<String>) -> Self {
        Invocation {
            name: name.into(),
            values,
        }
    }
}

/// Declared identity, arity and presentation of an option
#[derive(Debug, Clone, Default)]
pub struct OptionSpec {
    /// Primary names, e.g. `-x` and `--xx`
    pub names: Vec<String>,

    /// Negation names for flags, e.g. `--no-xx`
    pub secondary_names: Vec<String>,

    /// Values consumed per occurrence; 0 for flags
    pub nvalues: usize,

    /// Finalized before every regular option and may abort the parse
    pub eager: bool,

    /// Excluded from help and completion candidates
    pub hidden: bool,

    /// Help text
    pub help: String,

    /// Placeholder shown for the value in help
    pub metavar: Option<String>,

    /// What the shell should offer for this option's value
    pub completion: CompletionCandidates,
}

impl OptionSpec {
    pub(crate) fn with_names<I, S>(names: I, nvalues: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OptionSpec {
            names: names.into_iter().map(Into::into).collect(),
            nvalues,
            ..OptionSpec::default()
        }
    }

    /// Primary names followed by secondary names
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .chain(self.secondary_names.iter())
            .map(String::as_str)
    }

    /// The longest name, first one wins on ties
    pub fn longest_name(&self) -> &str {
        self.all_names()
            .fold("", |best, name| if name.len() > best.len() { name } else { best })
    }

    /// Whether `token` is exactly one of this option's names
    pub fn has_name(&self, token: &str) -> bool {
        self.all_names().any(|name| name == token)
    }

    /// Whether `name` is a secondary (negation) name
    pub fn is_secondary(&self, name: &str) -> bool {
        self.secondary_names.iter().any(|n| n == name)
    }
}

/// Reads a finalized option value out of [`Matches`](crate::parser::Matches)
pub struct OptionHandle<T> {
    pub(crate) command: CommandId,
    pub(crate) index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> OptionHandle<T> {
    pub(crate) fn new(command: CommandId, index: usize) -> Self {
        OptionHandle {
            command,
            index,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for OptionHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OptionHandle<T> {}

impl<T> fmt::Debug for OptionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionHandle")
            .field("command", &self.command)
            .field("index", &self.index)
            .finish()
    }
}

pub(crate) type ErasedValue = Box<dyn Any + Send + Sync>;

type Finalizer<T> = Arc<dyn Fn(&Context<'_>, &[Invocation]) -> Result<T, ParseError> + Send + Sync>;

type InvocationConverter<T> = Arc<dyn Fn(&Invocation) -> Result<T, ParseError> + Send + Sync>;

/// Callback run when an eager option is invoked
pub type EagerCallback =
    Arc<dyn Fn(&Context<'_>, &[Invocation]) -> Result<(), CliError> + Send + Sync>;

/// How a declared option is finalized
pub(crate) enum OptionKind {
    Regular(Finalizer<ErasedValue>),
    Eager(EagerCallback),
}

/// An option as stored on its command
pub(crate) struct DeclaredOption {
    pub(crate) spec: OptionSpec,
    pub(crate) kind: OptionKind,
}

impl DeclaredOption {
    pub(crate) fn is_eager(&self) -> bool {
        matches!(self.kind, OptionKind::Eager(_))
    }
}

impl fmt::Debug for DeclaredOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredOption")
            .field("spec", &self.spec)
            .field("eager", &self.is_eager())
            .finish()
    }
}

macro_rules! spec_setters {
    () => {
        /// Set the help text
        pub fn help(mut self, help: impl Into<String>) -> Self {
            self.spec.help = help.into();
            self
        }

        /// Hide from help and completion candidates
        pub fn hidden(mut self) -> Self {
            self.spec.hidden = true;
            self
        }

        /// Set the value placeholder shown in help
        pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
            self.spec.metavar = Some(metavar.into());
            self
        }

        /// Set the completion candidates for the value
        pub fn completion(mut self, completion: CompletionCandidates) -> Self {
            self.spec.completion = completion;
            self
        }
    };
}

/// A fully shaped option whose finalized value has type `T`
pub struct Opt<T> {
    pub(crate) spec: OptionSpec,
    finalize: Finalizer<T>,
}

impl<T: Any + Send + Sync> Opt<T> {
    spec_setters!();

    pub fn spec(&self) -> &OptionSpec {
        &self.spec
    }

    /// Transform the finalized value
    pub fn map<U, F>(self, f: F) -> Opt<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let finalize = self.finalize;
        Opt {
            spec: self.spec,
            finalize: Arc::new(move |ctx: &Context<'_>, invocations: &[Invocation]| {
                finalize(ctx, invocations).map(&f)
            }),
        }
    }

    pub(crate) fn erase(self) -> DeclaredOption {
        let finalize = self.finalize;
        DeclaredOption {
            spec: self.spec,
            kind: OptionKind::Regular(Arc::new(move |ctx: &Context<'_>, invocations: &[Invocation]| {
                finalize(ctx, invocations).map(|value| Box::new(value) as ErasedValue)
            })),
        }
    }
}

/// Anything that can be registered as a regular option
pub trait IntoOption {
    type Value: Any + Send + Sync;

    fn into_option(self) -> Opt<Self::Value>;
}

impl<T: Any + Send + Sync> IntoOption for Opt<T> {
    type Value = T;

    fn into_option(self) -> Opt<T> {
        self
    }
}

/// An option that takes values, before its occurrence shape is decided
pub struct ValueOpt<T> {
    spec: OptionSpec,
    convert: InvocationConverter<T>,
}

impl ValueOpt<String> {
    /// An option taking one value per occurrence
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValueOpt {
            spec: OptionSpec::with_names(names, 1),
            convert: Arc::new(|invocation: &Invocation| Ok(invocation.values.concat())),
        }
    }

    /// Convert the value with a single-value converter
    pub fn convert_with<U: 'static>(self, converter: Converter<U>) -> ValueOpt<U> {
        ValueOpt {
            spec: self.spec,
            convert: Arc::new(move |invocation: &Invocation| {
                let raw = invocation.values.concat();
                converter(&raw).map_err(|reason| ParseError::BadParameterValue {
                    param: invocation.name.clone(),
                    reason,
                })
            }),
        }
    }

    pub fn int(self) -> ValueOpt<i64> {
        self.convert_with(convert::int())
    }

    pub fn float(self) -> ValueOpt<f64> {
        self.convert_with(convert::float())
    }

    /// Restrict to a set of strings and offer them as completions
    pub fn choice<I, S>(mut self, choices: I) -> ValueOpt<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        if matches!(self.spec.completion, CompletionCandidates::None) {
            self.spec.completion = CompletionCandidates::Fixed(choices.clone());
        }
        self.convert_with(convert::choice(choices))
    }

    /// Consume `n` values per occurrence
    pub fn nvalues(mut self, n: usize) -> ValueOpt<Vec<String>> {
        self.spec.nvalues = n;
        ValueOpt {
            spec: self.spec,
            convert: Arc::new(|invocation: &Invocation| Ok(invocation.values.clone())),
        }
    }
}

impl<T: Any + Send + Sync> ValueOpt<T> {
    spec_setters!();

    /// Apply a further conversion to each occurrence's value
    pub fn convert<U, F>(self, f: F) -> ValueOpt<U>
    where
        F: Fn(T) -> Result<U, String> + Send + Sync + 'static,
    {
        let first = self.convert;
        ValueOpt {
            spec: self.spec,
            convert: Arc::new(move |invocation: &Invocation| {
                first(invocation).and_then(|value| {
                    f(value).map_err(|reason| ParseError::BadParameterValue {
                        param: invocation.name.clone(),
                        reason,
                    })
                })
            }),
        }
    }

    /// `None` when absent; the last occurrence wins
    pub fn optional(self) -> Opt<Option<T>> {
        let convert = self.convert;
        Opt {
            spec: self.spec,
            finalize: Arc::new(move |_: &Context<'_>, invocations: &[Invocation]| {
                let mut last = None;
                for invocation in invocations {
                    last = Some(convert(invocation)?);
                }
                Ok(last)
            }),
        }
    }

    /// `value` when absent; the last occurrence wins
    pub fn default(self, value: T) -> Opt<T>
    where
        T: Clone,
    {
        let convert = self.convert;
        Opt {
            spec: self.spec,
            finalize: Arc::new(move |_: &Context<'_>, invocations: &[Invocation]| {
                let mut last = value.clone();
                for invocation in invocations {
                    last = convert(invocation)?;
                }
                Ok(last)
            }),
        }
    }

    /// Missing-option error when absent
    pub fn required(self) -> Opt<T> {
        let convert = self.convert;
        let name = self.spec.longest_name().to_string();
        Opt {
            spec: self.spec,
            finalize: Arc::new(move |_: &Context<'_>, invocations: &[Invocation]| {
                let mut last = None;
                for invocation in invocations {
                    last = Some(convert(invocation)?);
                }
                last.ok_or_else(|| ParseError::MissingOption { name: name.clone() })
            }),
        }
    }

    /// Every occurrence, in command-line order
    pub fn multiple(self) -> Opt<Vec<T>> {
        let convert = self.convert;
        Opt {
            spec: self.spec,
            finalize: Arc::new(move |_: &Context<'_>, invocations: &[Invocation]| {
                invocations.iter().map(|invocation| convert(invocation)).collect()
            }),
        }
    }
}

impl<T: Any + Send + Sync> IntoOption for ValueOpt<T> {
    type Value = Option<T>;

    fn into_option(self) -> Opt<Option<T>> {
        self.optional()
    }
}

/// A boolean flag taking no values
pub struct FlagOpt {
    spec: OptionSpec,
    default: bool,
}

impl FlagOpt {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FlagOpt {
            spec: OptionSpec::with_names(names, 0),
            default: false,
        }
    }

    spec_setters!();

    /// Names that turn the flag off, e.g. `--no-color`
    pub fn secondary_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.secondary_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Value when the flag is absent
    pub fn default(mut self, value: bool) -> Self {
        self.default = value;
        self
    }

    /// Count occurrences instead of producing a bool
    pub fn counted(self) -> Opt<u32> {
        Opt {
            spec: self.spec,
            finalize: Arc::new(|_: &Context<'_>, invocations: &[Invocation]| {
                Ok(u32::try_from(invocations.len()).unwrap_or(u32::MAX))
            }),
        }
    }
}

impl IntoOption for FlagOpt {
    type Value = bool;

    fn into_option(self) -> Opt<bool> {
        let default = self.default;
        let spec = self.spec.clone();
        Opt {
            spec: self.spec,
            finalize: Arc::new(move |_: &Context<'_>, invocations: &[Invocation]| {
                Ok(invocations
                    .last()
                    .map(|invocation| !spec.is_secondary(&invocation.name))
                    .unwrap_or(default))
            }),
        }
    }
}

/// An option whose callback runs before any regular option is finalized
pub struct EagerOpt {
    pub(crate) spec: OptionSpec,
    pub(crate) callback: EagerCallback,
}

impl EagerOpt {
    pub fn new<I, S, F>(names: I, callback: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Context<'_>, &[Invocation]) -> Result<(), CliError> + Send + Sync + 'static,
    {
        let mut spec = OptionSpec::with_names(names, 0);
        spec.eager = true;
        EagerOpt {
            spec,
            callback: Arc::new(callback),
        }
    }

    spec_setters!();

    /// Values consumed per occurrence
    pub fn nvalues(mut self, n: usize) -> Self {
        self.spec.nvalues = n;
        self
    }

    /// `-h`/`--help`: print the command's help and exit successfully
    pub fn help_option() -> Self {
        Self::help_option_named(["-h", "--help"])
    }

    pub fn help_option_named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EagerOpt::new(names, |ctx: &Context<'_>, _: &[Invocation]| {
            Err(CliError::PrintHelp {
                message: render_help(ctx),
                error: false,
            })
        })
        .help("Show this message and exit")
    }

    /// `--version`: print `"<command> version <version>"` and exit successfully
    pub fn version_option(version: impl Into<String>) -> Self {
        let version = version.into();
        EagerOpt::new(["--version"], move |ctx: &Context<'_>, _: &[Invocation]| {
            Err(CliError::PrintMessage {
                message: format!("{} version {}", ctx.command().name(), version),
                exit_code: 0,
            })
        })
        .help("Show the version and exit")
    }

    pub(crate) fn erase(self) -> DeclaredOption {
        DeclaredOption {
            spec: self.spec,
            kind: OptionKind::Eager(self.callback),
        }
    }
}
