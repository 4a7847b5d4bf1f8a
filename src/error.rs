//! Error types for argtree

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for argtree operations
pub type Result<T> = std::result::Result<T, ArgtreeError>;

/// Main error type for argtree
#[derive(Error, Debug)]
pub enum ArgtreeError {
    /// Command tree construction errors
    #[error("Declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// YAML declaration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Parse outcomes, including help/version aborts
    #[error("{0}")]
    Cli(#[from] CliError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Contract violations detected while building a command tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    #[error("Command name '{0}' is invalid")]
    InvalidCommandName(String),

    #[error("Option name '{0}' is invalid: must start with a prefix character, be at least two characters long and contain no '=' or whitespace")]
    InvalidOptionName(String),

    #[error("Option must declare at least one name")]
    NoOptionNames,

    #[error("Option name '{name}' is declared more than once on command '{command}'")]
    DuplicateOptionName { command: String, name: String },

    #[error("Argument name '{0}' is invalid")]
    InvalidArgumentName(String),

    #[error("Argument '{name}' is declared more than once on command '{command}'")]
    DuplicateArgumentName { command: String, name: String },

    #[error("Argument '{name}' cannot follow variadic argument '{variadic}' on command '{command}'")]
    ArgumentAfterVariadic {
        command: String,
        name: String,
        variadic: String,
    },

    #[error("Subcommand '{name}' is declared more than once on command '{command}'")]
    DuplicateSubcommand { command: String, name: String },

    #[error("Alias '{name}' is declared more than once on command '{command}'")]
    DuplicateAlias { command: String, name: String },

    #[error("Alias '{name}' on command '{command}' expands to alias '{target}'")]
    RecursiveAlias {
        command: String,
        name: String,
        target: String,
    },
}

/// Errors produced while scanning or converting argv
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no such option: {name}")]
    NoSuchOption { name: String },

    #[error("no such subcommand: {name}")]
    NoSuchSubcommand { name: String },

    #[error("option {name} requires {expected} value(s)")]
    IncorrectOptionValueCount { name: String, expected: usize },

    #[error("option {name} does not take a value")]
    OptionTakesNoValue { name: String },

    #[error("got unexpected extra argument ({value})")]
    UnexpectedArgument { value: String },

    #[error("missing argument \"{name}\"")]
    MissingArgument { name: String },

    #[error("argument {name} takes {expected} values")]
    IncorrectArgumentValueCount { name: String, expected: usize },

    #[error("missing option \"{name}\"")]
    MissingOption { name: String },

    #[error("invalid value for {param}: {reason}")]
    BadParameterValue { param: String, reason: String },
}

/// Outcome of a parse that did not produce values.
///
/// Help and version requests travel on the same channel as parse errors but
/// are tagged as non-failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{message}")]
    PrintHelp { message: String, error: bool },

    #[error("{message}")]
    PrintMessage { message: String, exit_code: i32 },
}

impl CliError {
    /// Process exit code conventionally associated with this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Parse(_) => 1,
            CliError::PrintHelp { error, .. } => i32::from(*error),
            CliError::PrintMessage { exit_code, .. } => *exit_code,
        }
    }

    /// Whether the outcome is a failure (printed to stderr)
    pub fn is_error(&self) -> bool {
        match self {
            CliError::Parse(_) => true,
            CliError::PrintHelp { error, .. } => *error,
            CliError::PrintMessage { exit_code, .. } => *exit_code != 0,
        }
    }
}

/// YAML declaration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find declaration file (searched: {0})")]
    NotFound(String),

    #[error("Invalid declaration: {0}")]
    Invalid(String),

    #[error("Unknown type '{kind}' for parameter '{param}'. Must be one of: string, bool, int, float")]
    UnknownType { param: String, kind: String },

    #[error("Default '{default}' for parameter '{param}' is not one of its choices")]
    DefaultNotInChoices { param: String, default: String },

    #[error("Default '{default}' for parameter '{param}' is not a valid {kind}")]
    InvalidDefault {
        param: String,
        default: String,
        kind: String,
    },

    #[error("Flag option '{0}' cannot take values")]
    FlagWithValues(String),

    #[error("Option '{0}' declares secondary names but is not a flag")]
    SecondaryNamesOnValueOption(String),

    #[error("Failed to read declaration file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Specialized result type for declaration operations
pub type DeclarationResult<T> = std::result::Result<T, DeclarationError>;

/// Specialized result type for parse operations
pub type CliResult<T> = std::result::Result<T, CliError>;

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let parse = CliError::from(ParseError::NoSuchOption {
            name: "--nope".to_string(),
        });
        assert_eq!(parse.exit_code(), 1);
        assert!(parse.is_error());

        let help = CliError::PrintHelp {
            message: "Usage: x".to_string(),
            error: false,
        };
        assert_eq!(help.exit_code(), 0);
        assert!(!help.is_error());

        let version = CliError::PrintMessage {
            message: "x version 1".to_string(),
            exit_code: 0,
        };
        assert_eq!(version.exit_code(), 0);
        assert!(!version.is_error());
    }

    #[test]
    fn test_parse_error_messages() {
        let err = ParseError::IncorrectOptionValueCount {
            name: "--xx".to_string(),
            expected: 2,
        };
        assert_eq!(err.to_string(), "option --xx requires 2 value(s)");

        let err = ParseError::UnexpectedArgument {
            value: "-x".to_string(),
        };
        assert_eq!(err.to_string(), "got unexpected extra argument (-x)");
    }
}
