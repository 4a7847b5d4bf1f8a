//! Building a command tree from a declaration
//!
//! Every declared option and argument is registered with a finalizer that
//! produces a [`serde_yaml::Value`], so the parsed result of any tree can be
//! reported as YAML without knowing its types statically.

use crate::command::Command;
use crate::config::types::{scalar_to_string, ArgumentDecl, CommandDecl, OptionDecl, ValueKind};
use crate::error::{ArgtreeError, ConfigError};
use crate::params::{
    Arg, ArgumentHandle, CompletionCandidates, EagerOpt, FlagOpt, IntoArgument, IntoOption, Opt,
    OptionHandle, ValueArg, ValueOpt,
};
use crate::parser::Matches;
use serde_yaml::{Mapping, Value};

/// Handles for reading a built tree's values back out of [`Matches`]
#[derive(Debug)]
pub struct Binding {
    name: String,
    options: Vec<(String, OptionHandle<Value>)>,
    arguments: Vec<(String, ArgumentHandle<Value>)>,
    subcommands: Vec<Binding>,
}

impl Binding {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved values as `{command, options, arguments, subcommand}`
    pub fn resolve(&self, matches: &Matches) -> Value {
        let mut options = Mapping::new();
        for (key, handle) in &self.options {
            let value = matches.get(handle).cloned().unwrap_or(Value::Null);
            options.insert(Value::String(key.clone()), value);
        }

        let mut arguments = Mapping::new();
        for (key, handle) in &self.arguments {
            let value = matches.argument(handle).cloned().unwrap_or(Value::Null);
            arguments.insert(Value::String(key.clone()), value);
        }

        let subcommand = matches
            .subcommand()
            .and_then(|sub| {
                self.subcommands
                    .iter()
                    .find(|binding| binding.name == sub.name())
                    .map(|binding| binding.resolve(sub))
            })
            .unwrap_or(Value::Null);

        let mut out = Mapping::new();
        out.insert("command".into(), Value::String(self.name.clone()));
        out.insert("options".into(), Value::Mapping(options));
        out.insert("arguments".into(), Value::Mapping(arguments));
        out.insert("subcommand".into(), subcommand);
        Value::Mapping(out)
    }
}

/// Build the command tree for a validated declaration
pub fn build_command(decl: &CommandDecl) -> Result<(Command, Binding), ArgtreeError> {
    let mut command = Command::new(&decl.name)
        .help(&decl.help)
        .invoke_without_subcommand(decl.invoke_without_subcommand);
    if decl.hidden {
        command = command.hidden();
    }
    if let Some(allow) = decl.allow_interspersed_args {
        command = command.allow_interspersed_args(allow);
    }

    if decl.help_option {
        command.eager_option(EagerOpt::help_option())?;
    }
    if let Some(version) = &decl.version {
        command.eager_option(EagerOpt::version_option(version.clone()))?;
    }

    let mut binding = Binding {
        name: decl.name.clone(),
        options: Vec::new(),
        arguments: Vec::new(),
        subcommands: Vec::new(),
    };

    for option in &decl.options {
        let handle = command.option(build_option(option)?)?;
        binding.options.push((option.key(), handle));
    }

    for argument in &decl.arguments {
        let handle = command.argument(build_argument(argument)?)?;
        binding.arguments.push((argument.name.clone(), handle));
    }

    for (name, tokens) in &decl.aliases {
        command.alias(name, tokens)?;
    }

    for sub in &decl.subcommands {
        let (child, child_binding) = build_command(sub)?;
        command.subcommand(child)?;
        binding.subcommands.push(child_binding);
    }

    Ok((command, binding))
}

fn value_kind(param: &str, name: &str) -> Result<ValueKind, ConfigError> {
    ValueKind::from_name(name).ok_or_else(|| ConfigError::UnknownType {
        param: param.to_string(),
        kind: name.to_string(),
    })
}

/// Convert a declared default with the parameter's own converter
fn default_value(param: &str, kind: ValueKind, default: &Value) -> Result<Value, ConfigError> {
    let invalid = || ConfigError::InvalidDefault {
        param: param.to_string(),
        default: scalar_to_string(default).unwrap_or_default(),
        kind: kind.name().to_string(),
    };
    let raw = scalar_to_string(default).ok_or_else(invalid)?;
    kind.converter(&[])(&raw).map_err(|_| invalid())
}

fn build_option(decl: &OptionDecl) -> Result<Opt<Value>, ConfigError> {
    let param = decl.display_name();
    let kind = value_kind(param, decl.kind_name())?;

    let opt = if kind == ValueKind::Bool {
        let default = matches!(decl.default, Some(Value::Bool(true)));
        FlagOpt::new(decl.names.iter().cloned())
            .secondary_names(decl.secondary_names.iter().cloned())
            .default(default)
            .into_option()
            .map(Value::Bool)
    } else {
        let converter = kind.converter(&decl.choices);
        let nvalues = decl.nvalues.unwrap_or(1);

        if nvalues == 1 {
            let value = ValueOpt::new(decl.names.iter().cloned()).convert_with(converter);
            if decl.multiple {
                value.multiple().map(Value::Sequence)
            } else if decl.required {
                value.required()
            } else if let Some(default) = &decl.default {
                value.default(default_value(param, kind, default)?)
            } else {
                value.optional().map(|v| v.unwrap_or(Value::Null))
            }
        } else {
            let value = ValueOpt::new(decl.names.iter().cloned())
                .nvalues(nvalues)
                .convert(move |raw: Vec<String>| {
                    raw.iter()
                        .map(|v| converter(v))
                        .collect::<Result<Vec<Value>, String>>()
                        .map(Value::Sequence)
                });
            if decl.multiple {
                value.multiple().map(Value::Sequence)
            } else if decl.required {
                value.required()
            } else {
                value.optional().map(|v| v.unwrap_or(Value::Null))
            }
        }
    };

    let mut opt = opt.help(&decl.help);
    if decl.hidden {
        opt = opt.hidden();
    }
    if let Some(metavar) = &decl.metavar {
        opt = opt.metavar(metavar);
    }
    if !decl.completion.is_none() {
        opt = opt.completion(decl.completion.to_candidates());
    } else if !decl.choices.is_empty() {
        opt = opt.completion(CompletionCandidates::fixed(decl.choices.iter().cloned()));
    }
    Ok(opt)
}

fn build_argument(decl: &ArgumentDecl) -> Result<Arg<Value>, ConfigError> {
    let kind = value_kind(&decl.name, decl.kind_name())?;
    let converter = kind.converter(&decl.choices);

    let value = ValueArg::new(&decl.name)
        .help(&decl.help)
        .convert(move |raw: String| converter(&raw));

    let arg = if decl.nvalues < 0 {
        value.multiple(decl.is_required()).map(Value::Sequence)
    } else if decl.nvalues > 1 {
        value
            .nvalues(decl.nvalues.unsigned_abs() as usize)
            .map(Value::Sequence)
    } else if let Some(default) = &decl.default {
        value.default(default_value(&decl.name, kind, default)?)
    } else if decl.is_required() {
        value.into_argument()
    } else {
        value.optional().map(|v| v.unwrap_or(Value::Null))
    };

    let completion = if !decl.completion.is_none() {
        decl.completion.to_candidates()
    } else if !decl.choices.is_empty() {
        CompletionCandidates::fixed(decl.choices.iter().cloned())
    } else {
        CompletionCandidates::None
    };
    Ok(arg.completion(completion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_declaration;
    use crate::error::{CliError, DeclarationError};

    const TOOL: &str = r#"
name: tool
version: "1.2.3"
invoke_without_subcommand: true
options:
  - names: [-x, --xx]
    type: int
    default: 111
  - names: [--color]
    secondary_names: [--no-color]
    type: bool
    default: true
  - names: [-I, --include]
    multiple: true
arguments:
  - name: files
    nvalues: -1
subcommands:
  - name: run
    invoke_without_subcommand: true
    options:
      - names: [--level]
        choices: [low, high]
        required: true
aliases:
  fast: [run, --level, high]
"#;

    fn build() -> (Command, Binding) {
        build_command(&parse_declaration(TOOL).unwrap()).unwrap()
    }

    fn get<'a>(value: &'a Value, path: &[&str]) -> &'a Value {
        path.iter().fold(value, |v, key| &v[*key])
    }

    #[test]
    fn test_resolve_defaults() {
        let (command, binding) = build();
        let matches = command.parse(["a.txt"]).unwrap();
        let resolved = binding.resolve(&matches);

        assert_eq!(get(&resolved, &["command"]), &Value::from("tool"));
        assert_eq!(get(&resolved, &["options", "xx"]), &Value::from(111));
        assert_eq!(get(&resolved, &["options", "color"]), &Value::Bool(true));
        assert_eq!(
            get(&resolved, &["options", "include"]),
            &Value::Sequence(Vec::new())
        );
        assert_eq!(
            get(&resolved, &["arguments", "files"]),
            &Value::Sequence(vec![Value::from("a.txt")])
        );
        assert_eq!(get(&resolved, &["subcommand"]), &Value::Null);
    }

    #[test]
    fn test_resolve_subcommand_through_alias() {
        let (command, binding) = build();
        let matches = command.parse(["--no-color", "-x4", "fast"]).unwrap();
        let resolved = binding.resolve(&matches);

        assert_eq!(get(&resolved, &["options", "xx"]), &Value::from(4));
        assert_eq!(get(&resolved, &["options", "color"]), &Value::Bool(false));
        assert_eq!(get(&resolved, &["subcommand", "command"]), &Value::from("run"));
        assert_eq!(
            get(&resolved, &["subcommand", "options", "level"]),
            &Value::from("high")
        );
    }

    #[test]
    fn test_choices_enforced() {
        let (command, _) = build();
        let err = command.parse(["run", "--level", "mid"]).unwrap_err();
        assert!(err.to_string().contains("invalid choice: mid"));
    }

    #[test]
    fn test_version_and_help() {
        let (command, _) = build();
        assert_eq!(
            command.parse(["--version"]).unwrap_err(),
            CliError::PrintMessage {
                message: "tool version 1.2.3".to_string(),
                exit_code: 0,
            }
        );
        assert!(matches!(
            command.parse(["run", "--help"]),
            Err(CliError::PrintHelp { error: false, .. })
        ));
    }

    #[test]
    fn test_structural_errors_surface() {
        let decl = parse_declaration(
            "name: tool\noptions:\n  - names: [-x]\n  - names: [-x]\n",
        )
        .unwrap();
        assert!(matches!(
            build_command(&decl),
            Err(ArgtreeError::Declaration(DeclarationError::DuplicateOptionName { .. }))
        ));
    }
}
