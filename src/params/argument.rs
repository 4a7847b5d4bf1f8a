//! Positional argument declarations

use crate::command::{CommandId, Context};
use crate::error::ParseError;
use crate::params::completion::CompletionCandidates;
use crate::params::convert::{self, Converter};
use crate::params::option::ErasedValue;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Declared identity and arity of a positional argument
#[derive(Debug, Clone)]
pub struct ArgumentSpec {
    /// Argument name, used in help and errors
    pub name: String,

    /// Values consumed; negative means variadic
    pub nvalues: i32,

    /// Whether at least one value must be given
    pub required: bool,

    /// Help text
    pub help: String,

    /// What the shell should offer for this argument
    pub completion: CompletionCandidates,
}

impl ArgumentSpec {
    fn named(name: impl Into<String>) -> Self {
        ArgumentSpec {
            name: name.into(),
            nvalues: 1,
            required: true,
            help: String::new(),
            completion: CompletionCandidates::None,
        }
    }

    /// Whether this argument claims every remaining positional token
    pub fn is_variadic(&self) -> bool {
        self.nvalues < 0
    }

    /// Fixed number of values, `None` for variadic arguments
    pub fn fixed_arity(&self) -> Option<usize> {
        usize::try_from(self.nvalues).ok()
    }

    /// Name as shown to users, e.g. `FILES`
    pub fn metavar(&self) -> String {
        self.name.to_uppercase()
    }
}

/// Reads a finalized argument value out of [`Matches`](crate::parser::Matches)
pub struct ArgumentHandle<T> {
    pub(crate) command: CommandId,
    pub(crate) index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArgumentHandle<T> {
    pub(crate) fn new(command: CommandId, index: usize) -> Self {
        ArgumentHandle {
            command,
            index,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for ArgumentHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArgumentHandle<T> {}

impl<T> fmt::Debug for ArgumentHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentHandle")
            .field("command", &self.command)
            .field("index", &self.index)
            .finish()
    }
}

type Finalizer<T> = Arc<dyn Fn(&Context<'_>, &[String]) -> Result<T, ParseError> + Send + Sync>;

/// An argument as stored on its command
pub(crate) struct DeclaredArgument {
    pub(crate) spec: ArgumentSpec,
    pub(crate) finalize: Finalizer<ErasedValue>,
}

impl fmt::Debug for DeclaredArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclaredArgument")
            .field("spec", &self.spec)
            .finish()
    }
}

/// A fully shaped argument whose finalized value has type `T`
pub struct Arg<T> {
    pub(crate) spec: ArgumentSpec,
    finalize: Finalizer<T>,
}

impl<T: Any + Send + Sync> Arg<T> {
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.spec.help = help.into();
        self
    }

    pub fn completion(mut self, completion: CompletionCandidates) -> Self {
        self.spec.completion = completion;
        self
    }

    pub fn spec(&self) -> &ArgumentSpec {
        &self.spec
    }

    /// Transform the finalized value
    pub fn map<U, F>(self, f: F) -> Arg<U>
    where
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let finalize = self.finalize;
        Arg {
            spec: self.spec,
            finalize: Arc::new(move |ctx: &Context<'_>, values: &[String]| {
                finalize(ctx, values).map(&f)
            }),
        }
    }

    pub(crate) fn erase(self) -> DeclaredArgument {
        let finalize = self.finalize;
        DeclaredArgument {
            spec: self.spec,
            finalize: Arc::new(move |ctx: &Context<'_>, values: &[String]| {
                finalize(ctx, values).map(|value| Box::new(value) as ErasedValue)
            }),
        }
    }
}

/// Anything that can be registered as an argument
pub trait IntoArgument {
    type Value: Any + Send + Sync;

    fn into_argument(self) -> Arg<Self::Value>;
}

impl<T: Any + Send + Sync> IntoArgument for Arg<T> {
    type Value = T;

    fn into_argument(self) -> Arg<T> {
        self
    }
}

/// A single-valued argument, before its shape is decided
pub struct ValueArg<T> {
    spec: ArgumentSpec,
    convert: Converter<T>,
}

impl ValueArg<String> {
    pub fn new(name: impl Into<String>) -> Self {
        ValueArg {
            spec: ArgumentSpec::named(name),
            convert: convert::string(),
        }
    }

    pub fn int(self) -> ValueArg<i64> {
        ValueArg {
            spec: self.spec,
            convert: convert::int(),
        }
    }

    pub fn float(self) -> ValueArg<f64> {
        ValueArg {
            spec: self.spec,
            convert: convert::float(),
        }
    }

    /// Restrict to a set of strings and offer them as completions
    pub fn choice<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
        if matches!(self.spec.completion, CompletionCandidates::None) {
            self.spec.completion = CompletionCandidates::Fixed(choices.clone());
        }
        self.convert = convert::choice(choices);
        self
    }
}

impl<T: Any + Send + Sync> ValueArg<T> {
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.spec.help = help.into();
        self
    }

    pub fn completion(mut self, completion: CompletionCandidates) -> Self {
        self.spec.completion = completion;
        self
    }

    /// Apply a further conversion to each value
    pub fn convert<U, F>(self, f: F) -> ValueArg<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U, String> + Send + Sync + 'static,
    {
        ValueArg {
            spec: self.spec,
            convert: convert::map(self.convert, f),
        }
    }

    /// `None` when no value was given
    pub fn optional(mut self) -> Arg<Option<T>> {
        self.spec.required = false;
        let convert = self.convert;
        let name = self.spec.name.clone();
        Arg {
            spec: self.spec,
            finalize: Arc::new(move |_: &Context<'_>, values: &[String]| {
                values
                    .first()
                    .map(|value| convert_value(&convert, &name, value))
                    .transpose()
            }),
        }
    }

    /// `value` when no value was given
    pub fn default(mut self, value: T) -> Arg<T>
    where
        T: Clone,
    {
        self.spec.required = false;
        let convert = self.convert;
        let name = self.spec.name.clone();
        Arg {
            spec: self.spec,
            finalize: Arc::new(move |_: &Context<'_>, values: &[String]| match values.first() {
                Some(raw) => convert_value(&convert, &name, raw),
                None => Ok(value.clone()),
            }),
        }
    }

    /// Exactly `n` values
    pub fn nvalues(mut self, n: usize) -> Arg<Vec<T>> {
        self.spec.nvalues = i32::try_from(n).unwrap_or(i32::MAX);
        self.collect()
    }

    /// Every remaining positional value; `required` demands at least one
    pub fn multiple(mut self, required: bool) -> Arg<Vec<T>> {
        self.spec.nvalues = -1;
        self.spec.required = required;
        self.collect()
    }

    fn collect(self) -> Arg<Vec<T>> {
        let convert = self.convert;
        let name = self.spec.name.clone();
        let metavar = self.spec.metavar();
        let required = self.spec.required;
        Arg {
            spec: self.spec,
            finalize: Arc::new(move |_: &Context<'_>, values: &[String]| {
                if required && values.is_empty() {
                    return Err(ParseError::MissingArgument {
                        name: metavar.clone(),
                    });
                }
                values
                    .iter()
                    .map(|value| convert_value(&convert, &name, value))
                    .collect()
            }),
        }
    }
}

impl<T: Any + Send + Sync> IntoArgument for ValueArg<T> {
    type Value = T;

    fn into_argument(self) -> Arg<T> {
        let convert = self.convert;
        let name = self.spec.name.clone();
        let metavar = self.spec.metavar();
        Arg {
            spec: self.spec,
            finalize: Arc::new(move |_: &Context<'_>, values: &[String]| match values.first() {
                Some(raw) => convert_value(&convert, &name, raw),
                None => Err(ParseError::MissingArgument {
                    name: metavar.clone(),
                }),
            }),
        }
    }
}

fn convert_value<T>(convert: &Converter<T>, name: &str, raw: &str) -> Result<T, ParseError> {
    convert(raw).map_err(|reason| ParseError::BadParameterValue {
        param: name.to_uppercase(),
        reason,
    })
}
