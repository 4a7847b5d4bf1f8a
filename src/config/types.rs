//! Declaration file types
//!
//! This module defines the data structures that represent an argtree.yml
//! declaration of a command tree.

use crate::params::convert::{self, Converter};
use crate::params::{CompletionCandidates, ShellType};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

fn default_true() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A command and everything beneath it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandDecl {
    /// Command name as typed on the command line
    pub name: String,

    /// Help text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,

    /// Adds a `--version` option printing this version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Adds `-h`/`--help`
    #[serde(default = "default_true")]
    pub help_option: bool,

    /// Whether options may follow positionals; inherited when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_interspersed_args: Option<bool>,

    /// Allow finishing without a subcommand
    #[serde(default, skip_serializing_if = "is_false")]
    pub invoke_without_subcommand: bool,

    /// Keep out of help and completion candidates
    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,

    /// Named options
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDecl>,

    /// Positional arguments, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentDecl>,

    /// Alias name to the tokens it expands to
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, Vec<String>>,

    /// Nested commands
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandDecl>,
}

/// A named option
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OptionDecl {
    /// Primary names, e.g. `["-x", "--xx"]`
    pub names: Vec<String>,

    /// Names that turn a flag off
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_names: Vec<String>,

    /// Value type: string, int, float or bool
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    /// Values per occurrence; 0 for flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nvalues: Option<usize>,

    /// Collect every occurrence
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,

    /// Fail when absent
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,

    /// Value when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Allowed values
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metavar: Option<String>,

    /// What the shell offers for the value
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub completion: CompletionDecl,
}

impl OptionDecl {
    /// The type, defaulting to bool for zero-arity options and string otherwise
    pub fn kind_name(&self) -> &str {
        match (&self.value_type, self.nvalues) {
            (Some(kind), _) => kind.as_str(),
            (None, Some(0)) => "bool",
            (None, _) => "string",
        }
    }

    /// The longest primary name, as used in messages
    pub fn display_name(&self) -> &str {
        self.names
            .iter()
            .map(String::as_str)
            .fold("", |best, name| if name.len() > best.len() { name } else { best })
    }

    /// Key under which the resolved value is reported: the longest name
    /// without its prefix characters
    pub fn key(&self) -> String {
        self.display_name()
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_string()
    }
}

/// A positional argument
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArgumentDecl {
    pub name: String,

    /// Value type: string, int or float
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,

    /// Values consumed; negative means every remaining value
    #[serde(default = "default_arity")]
    pub nvalues: i32,

    /// Defaults to true for fixed-arity arguments without a default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,

    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub completion: CompletionDecl,
}

fn default_arity() -> i32 {
    1
}

impl ArgumentDecl {
    pub fn kind_name(&self) -> &str {
        self.value_type.as_deref().unwrap_or("string")
    }

    pub fn is_required(&self) -> bool {
        self.required
            .unwrap_or(self.nvalues > 0 && self.default.is_none())
    }
}

/// Completion candidates as written in YAML
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionDecl {
    #[default]
    None,
    Path,
    Hostname,
    Username,
    Fixed(Vec<String>),
    Custom(CustomCompletion),
}

/// Script bodies per shell for custom candidates
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CustomCompletion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zsh: Option<String>,
}

impl CompletionDecl {
    pub fn is_none(&self) -> bool {
        matches!(self, CompletionDecl::None)
    }

    /// The runtime descriptor
    pub fn to_candidates(&self) -> CompletionCandidates {
        match self {
            CompletionDecl::None => CompletionCandidates::None,
            CompletionDecl::Path => CompletionCandidates::Path,
            CompletionDecl::Hostname => CompletionCandidates::Hostname,
            CompletionDecl::Username => CompletionCandidates::Username,
            CompletionDecl::Fixed(values) => CompletionCandidates::Fixed(values.clone()),
            CompletionDecl::Custom(custom) => {
                let custom = custom.clone();
                CompletionCandidates::custom(move |shell: ShellType| match shell {
                    ShellType::Bash => custom.bash.clone(),
                    ShellType::Zsh => custom.zsh.clone(),
                })
            }
        }
    }
}

/// Value types a declaration may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Int,
    Float,
    Bool,
}

impl ValueKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" | "str" => Some(ValueKind::String),
            "int" | "integer" => Some(ValueKind::Int),
            "float" => Some(ValueKind::Float),
            "bool" | "boolean" => Some(ValueKind::Bool),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
        }
    }

    /// Converter from one raw token to a YAML value, checking `choices`
    /// first when there are any
    pub fn converter(&self, choices: &[String]) -> Converter<Value> {
        let raw: Converter<String> = if choices.is_empty() {
            convert::string()
        } else {
            convert::choice(choices.to_vec())
        };
        match self {
            ValueKind::String | ValueKind::Bool => convert::map(raw, |s: String| Ok(Value::String(s))),
            ValueKind::Int => {
                let int = convert::int();
                convert::map(raw, move |s: String| int(&s).map(Value::from))
            }
            ValueKind::Float => {
                let float = convert::float();
                convert::map(raw, move |s: String| float(&s).map(Value::from))
            }
        }
    }
}

/// Render a YAML scalar default as the token a user would have typed
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_decl_forms() {
        let yaml = r#"
names: ["--file"]
completion: path
"#;
        let option: OptionDecl = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(option.completion, CompletionDecl::Path);

        let yaml = r#"
names: ["--color"]
completion:
  fixed: [red, green]
"#;
        let option: OptionDecl = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            option.completion,
            CompletionDecl::Fixed(vec!["red".to_string(), "green".to_string()])
        );

        let yaml = r#"
names: ["--branch"]
completion:
  custom:
    bash: "COMPREPLY=($(git branch))"
"#;
        let option: OptionDecl = serde_yaml::from_str(yaml).unwrap();
        let candidates = option.completion.to_candidates();
        assert_eq!(
            candidates.custom_body(ShellType::Bash).as_deref(),
            Some("COMPREPLY=($(git branch))")
        );
        assert_eq!(candidates.custom_body(ShellType::Zsh), None);
    }

    #[test]
    fn test_option_defaults() {
        let option: OptionDecl = serde_yaml::from_str("names: [-v, --verbose]\nnvalues: 0").unwrap();
        assert_eq!(option.kind_name(), "bool");
        assert_eq!(option.key(), "verbose");
        assert!(option.completion.is_none());

        let option: OptionDecl = serde_yaml::from_str("names: [-x]").unwrap();
        assert_eq!(option.kind_name(), "string");
    }

    #[test]
    fn test_argument_required_default() {
        let arg: ArgumentDecl = serde_yaml::from_str("name: src").unwrap();
        assert_eq!(arg.nvalues, 1);
        assert!(arg.is_required());

        let arg: ArgumentDecl = serde_yaml::from_str("name: files\nnvalues: -1").unwrap();
        assert!(!arg.is_required());

        let arg: ArgumentDecl = serde_yaml::from_str("name: n\ndefault: 3").unwrap();
        assert!(!arg.is_required());
    }

    #[test]
    fn test_converter() {
        let conv = ValueKind::Int.converter(&[]);
        assert_eq!(conv("42"), Ok(Value::from(42)));
        assert!(conv("x").is_err());

        let conv = ValueKind::String.converter(&["a".to_string()]);
        assert_eq!(conv("a"), Ok(Value::String("a".to_string())));
        assert!(conv("b").is_err());
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&Value::from(3)), Some("3".to_string()));
        assert_eq!(scalar_to_string(&Value::Bool(true)), Some("true".to_string()));
        assert_eq!(scalar_to_string(&Value::Null), None);
    }
}
