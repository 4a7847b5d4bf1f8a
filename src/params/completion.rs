//! Completion candidate descriptors
//!
//! Every option and argument carries exactly one [`CompletionCandidates`]
//! variant telling the generated shell script what to offer for its value.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Shell dialect a completion script is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellType {
    Bash,
    Zsh,
}

impl ShellType {
    /// Lowercase shell name, as used in shebangs and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            ShellType::Bash => "bash",
            ShellType::Zsh => "zsh",
        }
    }
}

impl fmt::Display for ShellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShellType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bash" => Ok(ShellType::Bash),
            "zsh" => Ok(ShellType::Zsh),
            other => Err(format!("unsupported shell: {}", other)),
        }
    }
}

/// Produces a shell-script body that fills `COMPREPLY`, or `None` when the
/// shell is not supported.
pub type CompletionGenerator = Arc<dyn Fn(ShellType) -> Option<String> + Send + Sync>;

/// How a shell should offer completions for a parameter's value
#[derive(Clone, Default)]
pub enum CompletionCandidates {
    /// No suggestions
    #[default]
    None,

    /// Filesystem paths
    Path,

    /// Host names known to the shell
    Hostname,

    /// User names known to the shell
    Username,

    /// A static, ordered list of literal values
    Fixed(Vec<String>),

    /// A script fragment computed per shell at declaration time
    Custom(CompletionGenerator),
}

impl CompletionCandidates {
    /// Fixed candidates from any iterable of strings
    pub fn fixed<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CompletionCandidates::Fixed(candidates.into_iter().map(Into::into).collect())
    }

    /// Custom candidates from a generator closure
    pub fn custom<F>(generator: F) -> Self
    where
        F: Fn(ShellType) -> Option<String> + Send + Sync + 'static,
    {
        CompletionCandidates::Custom(Arc::new(generator))
    }

    /// Script body for `shell`, if this is a custom variant that supports it
    pub fn custom_body(&self, shell: ShellType) -> Option<String> {
        match self {
            CompletionCandidates::Custom(generator) => generator(shell),
            _ => None,
        }
    }
}

impl fmt::Debug for CompletionCandidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionCandidates::None => f.write_str("None"),
            CompletionCandidates::Path => f.write_str("Path"),
            CompletionCandidates::Hostname => f.write_str("Hostname"),
            CompletionCandidates::Username => f.write_str("Username"),
            CompletionCandidates::Fixed(values) => f.debug_tuple("Fixed").field(values).finish(),
            CompletionCandidates::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
