//! Declaration validation
//!
//! Checks what serde cannot: value types, defaults and the flag/value split.
//! Structural rules (duplicate names, variadic ordering, alias loops) are
//! enforced by the command builder when the tree is built.

use crate::config::types::{scalar_to_string, ArgumentDecl, CommandDecl, OptionDecl, ValueKind};
use crate::error::{ConfigError, ConfigResult};
use serde_yaml::Value;

/// Validate a command declaration and everything beneath it
pub fn validate_declaration(decl: &CommandDecl) -> ConfigResult<()> {
    if decl.name.trim().is_empty() {
        return Err(ConfigError::Invalid("command name must not be empty".to_string()));
    }

    for option in &decl.options {
        validate_option(option)?;
    }
    for argument in &decl.arguments {
        validate_argument(argument)?;
    }
    for sub in &decl.subcommands {
        validate_declaration(sub)?;
    }

    Ok(())
}

/// Validate a single option
pub fn validate_option(option: &OptionDecl) -> ConfigResult<()> {
    let param = option.display_name().to_string();
    let kind = resolve_kind(&param, option.kind_name())?;

    if kind == ValueKind::Bool {
        if option.nvalues.is_some_and(|n| n > 0) {
            return Err(ConfigError::FlagWithValues(param));
        }
        if !option.choices.is_empty() || option.required {
            return Err(ConfigError::Invalid(format!(
                "flag option '{}' cannot have choices or be required",
                param
            )));
        }
        if let Some(default) = &option.default {
            if !matches!(default, Value::Bool(_)) {
                return Err(ConfigError::InvalidDefault {
                    param,
                    default: scalar_to_string(default).unwrap_or_default(),
                    kind: kind.name().to_string(),
                });
            }
        }
        return Ok(());
    }

    if !option.secondary_names.is_empty() {
        return Err(ConfigError::SecondaryNamesOnValueOption(param));
    }
    if option.nvalues == Some(0) {
        return Err(ConfigError::Invalid(format!(
            "option '{}' of type {} must take at least one value",
            param,
            kind.name()
        )));
    }
    if let Some(default) = &option.default {
        if option.required {
            return Err(ConfigError::Invalid(format!(
                "option '{}' cannot be both required and have a default",
                param
            )));
        }
        if option.multiple || option.nvalues.unwrap_or(1) != 1 {
            return Err(ConfigError::Invalid(format!(
                "option '{}' can only have a default when it takes a single value",
                param
            )));
        }
        validate_default(&param, kind, default, &option.choices)?;
    }

    Ok(())
}

/// Validate a single argument
pub fn validate_argument(argument: &ArgumentDecl) -> ConfigResult<()> {
    let param = argument.name.clone();
    let kind = resolve_kind(&param, argument.kind_name())?;

    if kind == ValueKind::Bool {
        return Err(ConfigError::Invalid(format!(
            "argument '{}' cannot be a bool",
            param
        )));
    }
    if argument.nvalues == 0 {
        return Err(ConfigError::Invalid(format!(
            "argument '{}' must take at least one value",
            param
        )));
    }
    if let Some(default) = &argument.default {
        if argument.nvalues != 1 {
            return Err(ConfigError::Invalid(format!(
                "argument '{}' can only have a default when it takes a single value",
                param
            )));
        }
        validate_default(&param, kind, default, &argument.choices)?;
    }

    Ok(())
}

fn resolve_kind(param: &str, name: &str) -> ConfigResult<ValueKind> {
    ValueKind::from_name(name).ok_or_else(|| ConfigError::UnknownType {
        param: param.to_string(),
        kind: name.to_string(),
    })
}

fn validate_default(
    param: &str,
    kind: ValueKind,
    default: &Value,
    choices: &[String],
) -> ConfigResult<()> {
    let raw = scalar_to_string(default).ok_or_else(|| ConfigError::InvalidDefault {
        param: param.to_string(),
        default: format!("{:?}", default),
        kind: kind.name().to_string(),
    })?;

    // Check choices before the type so the more specific error wins
    if !choices.is_empty() && !choices.contains(&raw) {
        return Err(ConfigError::DefaultNotInChoices {
            param: param.to_string(),
            default: raw,
        });
    }

    kind.converter(&[])(&raw).map_err(|_| ConfigError::InvalidDefault {
        param: param.to_string(),
        default: raw.clone(),
        kind: kind.name().to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(yaml: &str) -> CommandDecl {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_declaration() {
        let d = decl(
            r#"
name: tool
options:
  - names: [-x, --xx]
    type: int
    default: 3
  - names: [--color]
    secondary_names: [--no-color]
    type: bool
    default: true
arguments:
  - name: files
    nvalues: -1
subcommands:
  - name: run
"#,
        );
        assert!(validate_declaration(&d).is_ok());
    }

    #[test]
    fn test_unknown_type() {
        let d = decl("name: tool\noptions:\n  - names: [-x]\n    type: date\n");
        assert!(matches!(
            validate_declaration(&d),
            Err(ConfigError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_unknown_type_in_subcommand() {
        let d = decl(
            r#"
name: tool
subcommands:
  - name: run
    arguments:
      - name: n
        type: decimal
"#,
        );
        assert!(matches!(
            validate_declaration(&d),
            Err(ConfigError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_default_not_in_choices() {
        let d = decl(
            "name: tool\noptions:\n  - names: [--color]\n    choices: [red, green]\n    default: blue\n",
        );
        assert!(matches!(
            validate_declaration(&d),
            Err(ConfigError::DefaultNotInChoices { .. })
        ));
    }

    #[test]
    fn test_invalid_default() {
        let d = decl("name: tool\noptions:\n  - names: [-n]\n    type: int\n    default: lots\n");
        assert!(matches!(
            validate_declaration(&d),
            Err(ConfigError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn test_flag_with_values() {
        let d = decl("name: tool\noptions:\n  - names: [-v]\n    type: bool\n    nvalues: 2\n");
        assert!(matches!(
            validate_declaration(&d),
            Err(ConfigError::FlagWithValues(_))
        ));
    }

    #[test]
    fn test_secondary_names_on_value_option() {
        let d = decl(
            "name: tool\noptions:\n  - names: [--out]\n    secondary_names: [--no-out]\n",
        );
        assert!(matches!(
            validate_declaration(&d),
            Err(ConfigError::SecondaryNamesOnValueOption(_))
        ));
    }

    #[test]
    fn test_zero_arity_argument() {
        let d = decl("name: tool\narguments:\n  - name: x\n    nvalues: 0\n");
        assert!(matches!(
            validate_declaration(&d),
            Err(ConfigError::Invalid(_))
        ));
    }
}
