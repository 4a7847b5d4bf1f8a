//! Plain-text help rendering
//!
//! A usage line, the command's help text and aligned listings of options,
//! arguments and subcommands.

use crate::command::Context;
use crate::params::{ArgumentSpec, OptionSpec};
use std::fmt::Write;

/// Render help for the command in `ctx`
pub fn render_help(ctx: &Context<'_>) -> String {
    let command = ctx.command();
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = write_usage(&mut out, ctx);

    if !command.help_text().is_empty() {
        let _ = write!(out, "\n\n  {}", command.help_text());
    }

    let options: Vec<(String, &str)> = command
        .option_specs()
        .filter(|spec| !spec.hidden)
        .map(|spec| (option_label(spec), spec.help.as_str()))
        .collect();
    write_section(&mut out, "Options", &options);

    let arguments: Vec<(String, &str)> = command
        .argument_specs()
        .filter(|spec| !spec.help.is_empty())
        .map(|spec| (spec.metavar(), spec.help.as_str()))
        .collect();
    write_section(&mut out, "Arguments", &arguments);

    let commands: Vec<(String, &str)> = command
        .subcommands()
        .iter()
        .filter(|sub| !sub.is_hidden())
        .map(|sub| (sub.name().to_string(), sub.help_text()))
        .collect();
    write_section(&mut out, "Commands", &commands);

    out
}

fn write_usage(out: &mut String, ctx: &Context<'_>) -> std::fmt::Result {
    let command = ctx.command();
    write!(out, "Usage: {}", ctx.command_name_path())?;
    if command.option_specs().next().is_some() {
        out.push_str(" [OPTIONS]");
    }
    for spec in command.argument_specs() {
        write!(out, " {}", argument_usage(spec))?;
    }
    if !command.subcommands().is_empty() {
        out.push_str(" COMMAND [ARGS]...");
    }
    Ok(())
}

fn argument_usage(spec: &ArgumentSpec) -> String {
    let metavar = spec.metavar();
    match (spec.fixed_arity(), spec.required) {
        (None, true) => format!("{}...", metavar),
        (None, false) => format!("[{}]...", metavar),
        (Some(1), true) => metavar,
        (Some(1), false) => format!("[{}]", metavar),
        (Some(_), _) => format!("{}...", metavar),
    }
}

fn option_label(spec: &OptionSpec) -> String {
    let mut label = spec.names.join(", ");
    if !spec.secondary_names.is_empty() {
        label.push_str(" / ");
        label.push_str(&spec.secondary_names.join(", "));
    }
    if spec.nvalues > 0 {
        label.push(' ');
        label.push_str(spec.metavar.as_deref().unwrap_or("VALUE"));
    }
    label
}

fn write_section(out: &mut String, title: &str, rows: &[(String, &str)]) {
    if rows.is_empty() {
        return;
    }
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let _ = write!(out, "\n\n{}:", title);
    for (label, help) in rows {
        if help.is_empty() {
            let _ = write!(out, "\n  {}", label);
        } else {
            let _ = write!(out, "\n  {:width$}  {}", label, help, width = width);
        }
    }
}
