//! Bash and Zsh completion scripts
//!
//! Each command with something to complete gets one shell function that
//! replays the parser's decisions over `COMP_WORDS` up to `COMP_CWORD`,
//! then offers candidates for whatever is in focus at the cursor. Zsh
//! scripts are the Bash script behind a `bashcompinit` preamble.

use crate::command::{Command, Context};
use crate::params::{CompletionCandidates, OptionSpec, ShellType};
use regex::Regex;
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::rc::Rc;
use std::sync::OnceLock;
use tracing::debug;

const ZSH_PREAMBLE: &str = "autoload -Uz compinit
compinit
autoload -Uz bashcompinit
bashcompinit

";

const SKIP_OPT_EQ: &str = r#"__skip_opt_eq() {
    # this takes advantage of the fact that bash functions can write to local
    # variables in their callers
    (( i = i + 1 ))
    if [[ "${COMP_WORDS[$i]}" == '=' ]]; then
          (( i = i + 1 ))
    fi
}
"#;

/// Completion script for the whole tree rooted at `command`.
///
/// Empty when the root has no options, arguments or subcommands.
pub fn generate_completion(command: &Command, shell: ShellType) -> String {
    debug!(command = command.name(), shell = %shell, "generating completion script");
    let ctx = Rc::new(Context::root(command));
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_command(&mut out, &ctx, shell);
    out
}

/// A parameter that can be in focus at the cursor
struct FocusParam<'a> {
    name: String,
    candidates: &'a CompletionCandidates,
    hidden: bool,
}

fn focus_params(command: &Command) -> Vec<FocusParam<'_>> {
    let options = command.option_specs().map(|spec| FocusParam {
        name: spec.longest_name().to_string(),
        candidates: &spec.completion,
        hidden: spec.hidden,
    });
    let arguments = command.argument_specs().map(|spec| FocusParam {
        name: spec.name.clone(),
        candidates: &spec.completion,
        hidden: false,
    });
    options.chain(arguments).collect()
}

fn write_command(out: &mut String, ctx: &Rc<Context<'_>>, shell: ShellType) -> fmt::Result {
    let command = ctx.command();
    if !command.has_completion_surface() {
        return Ok(());
    }

    let func_name = function_name(ctx);
    let params = focus_params(command);

    if ctx.is_root() {
        writeln!(out, "#!/usr/bin/env {}", shell.name())?;
        writeln!(out, "# Command completion for {}", command.name())?;
        writeln!(out, "# Generated by argtree")?;
        writeln!(out)?;
        if shell == ShellType::Zsh {
            out.push_str(ZSH_PREAMBLE);
        }
        out.push_str(SKIP_OPT_EQ);
    }

    // Helpers for custom candidates
    for param in params.iter().filter(|p| !p.hidden) {
        if let Some(body) = param.candidates.custom_body(shell) {
            writeln!(out)?;
            writeln!(out, "{}() {{", custom_function_name(&func_name, &param.name))?;
            writeln!(out, "{}", indent_body(&body))?;
            writeln!(out, "}}")?;
        }
    }

    write_scan_loop(out, ctx, &func_name)?;
    write_candidates(out, command, &func_name, &params, shell)?;

    for sub in command.subcommands() {
        let child = Rc::new(Context::child(ctx, sub));
        write_command(out, &child, shell)?;
    }

    if ctx.is_root() {
        write!(out, "\ncomplete -F {} {}", func_name, command.name())?;
    }
    Ok(())
}

/// The loop that walks the words before the cursor
fn write_scan_loop(out: &mut String, ctx: &Rc<Context<'_>>, func_name: &str) -> fmt::Result {
    let command = ctx.command();

    let fixed_arg_names: Vec<String> = command
        .argument_specs()
        .filter_map(|spec| spec.fixed_arity().map(|n| (spec, n)))
        .flat_map(|(spec, n)| std::iter::repeat(single_quote(&spec.name)).take(n))
        .collect();
    let vararg_name = command
        .argument_specs()
        .find(|spec| spec.is_variadic())
        .map(|spec| spec.name.as_str())
        .unwrap_or("");

    writeln!(out)?;
    writeln!(out, "{}() {{", func_name)?;
    writeln!(out, "  local i={}", if ctx.is_root() { "1" } else { "$1" })?;
    writeln!(out, "  local in_param=''")?;
    writeln!(out, "  local fixed_arg_names=({})", fixed_arg_names.join(" "))?;
    writeln!(out, "  local vararg_name={}", single_quote(vararg_name))?;
    writeln!(out, "  local can_parse_options=1")?;
    writeln!(out)?;
    writeln!(out, "  while [[ ${{i}} -lt $COMP_CWORD ]]; do")?;
    writeln!(out, "    if [[ ${{can_parse_options}} -eq 1 ]]; then")?;
    writeln!(out, "      case \"${{COMP_WORDS[$i]}}\" in")?;
    writeln!(out, "        --)")?;
    writeln!(out, "          can_parse_options=0")?;
    writeln!(out, "          (( i = i + 1 ));")?;
    writeln!(out, "          continue")?;
    writeln!(out, "          ;;")?;

    // Hidden options are still parsed, so they keep their branch
    for spec in command.option_specs() {
        let names: Vec<Cow<'_, str>> = spec.all_names().map(shell_quote).collect();
        writeln!(out, "        {})", names.join("|"))?;
        writeln!(out, "          __skip_opt_eq")?;
        if spec.nvalues > 0 {
            writeln!(out, "          (( i = i + {} ))", spec.nvalues)?;
            writeln!(
                out,
                "          [[ ${{i}} -gt COMP_CWORD ]] && in_param={} || in_param=''",
                single_quote(spec.longest_name())
            )?;
        } else {
            writeln!(out, "          in_param=''")?;
        }
        writeln!(out, "          continue")?;
        writeln!(out, "          ;;")?;
    }

    writeln!(out, "      esac")?;
    writeln!(out, "    fi")?;
    writeln!(out, "    case \"${{COMP_WORDS[$i]}}\" in")?;

    // Splice the expansion after the alias word, then scan it as typed
    for (name, tokens) in command.aliases() {
        let quoted: Vec<Cow<'_, str>> = tokens.iter().map(|t| shell_quote(t)).collect();
        writeln!(out, "      {})", shell_quote(name))?;
        writeln!(out, "        (( i = i + 1 ))")?;
        writeln!(
            out,
            "        COMP_WORDS=( \"${{COMP_WORDS[@]:0:${{i}}}}\" {} \"${{COMP_WORDS[@]:${{i}}}}\" )",
            quoted.join(" ")
        )?;
        writeln!(out, "        (( COMP_CWORD = COMP_CWORD + {} ))", tokens.len())?;
        writeln!(out, "        ;;")?;
    }

    for sub in command.subcommands() {
        writeln!(out, "      {})", shell_quote(sub.name()))?;
        if sub.has_completion_surface() {
            let sub_ctx = Context::child(ctx, sub);
            writeln!(out, "        {} $(( i + 1 ))", function_name(&sub_ctx))?;
        }
        writeln!(out, "        return")?;
        writeln!(out, "        ;;")?;
    }

    writeln!(out, "      *)")?;
    writeln!(out, "        (( i = i + 1 ))")?;
    writeln!(out, "        # drop the head of the array")?;
    writeln!(out, "        fixed_arg_names=(\"${{fixed_arg_names[@]:1}}\")")?;
    if !ctx.allow_interspersed_args() {
        writeln!(out, "        can_parse_options=0")?;
    }
    writeln!(out, "        ;;")?;
    writeln!(out, "    esac")?;
    writeln!(out, "  done")?;
    writeln!(out, "  local word=\"${{COMP_WORDS[$COMP_CWORD]}}\"")?;
    Ok(())
}

/// What to offer once the scan reaches the cursor
fn write_candidates(
    out: &mut String,
    command: &Command,
    func_name: &str,
    params: &[FocusParam<'_>],
    shell: ShellType,
) -> fmt::Result {
    let visible: Vec<&OptionSpec> = command.option_specs().filter(|s| !s.hidden).collect();

    if !visible.is_empty() {
        let names: Vec<Cow<'_, str>> = visible
            .iter()
            .flat_map(|spec| spec.all_names())
            .map(shell_quote)
            .collect();
        writeln!(out, "  local option_prefix={}", single_quote(&prefix_pattern(&visible)))?;
        writeln!(out, "  if [[ \"${{word}}\" =~ ${{option_prefix}} ]]; then")?;
        writeln!(
            out,
            "    COMPREPLY=($(compgen -W {} -- \"${{word}}\"))",
            single_quote(&names.join(" "))
        )?;
        writeln!(out, "    return")?;
        writeln!(out, "  fi")?;
    }

    writeln!(out)?;
    writeln!(out, "  # We're either at an option's value, or the first remaining fixed size")?;
    writeln!(out, "  # arg, or the vararg if there are no fixed args left")?;
    writeln!(out, "  [[ -z \"${{in_param}}\" ]] && in_param=${{fixed_arg_names[0]}}")?;
    writeln!(out, "  [[ -z \"${{in_param}}\" ]] && in_param=${{vararg_name}}")?;
    writeln!(out)?;
    writeln!(out, "  case \"${{in_param}}\" in")?;

    for param in params {
        writeln!(out, "    {})", shell_quote(&param.name))?;
        if !param.hidden {
            write_reply(out, func_name, param, shell)?;
        }
        writeln!(out, "      ;;")?;
    }

    let subcommands: Vec<Cow<'_, str>> = command
        .subcommands()
        .iter()
        .filter(|sub| !sub.is_hidden())
        .map(|sub| shell_quote(sub.name()))
        .collect();
    if !subcommands.is_empty() {
        writeln!(out, "    *)")?;
        writeln!(
            out,
            "      COMPREPLY=($(compgen -W {} -- \"${{word}}\"))",
            single_quote(&subcommands.join(" "))
        )?;
        writeln!(out, "      ;;")?;
    }

    writeln!(out, "  esac")?;
    writeln!(out, "}}")?;
    Ok(())
}

fn write_reply(
    out: &mut String,
    func_name: &str,
    param: &FocusParam<'_>,
    shell: ShellType,
) -> fmt::Result {
    match param.candidates {
        CompletionCandidates::None => Ok(()),
        CompletionCandidates::Path => {
            writeln!(out, "      COMPREPLY=($(compgen -o default -- \"${{word}}\"))")
        }
        CompletionCandidates::Hostname => {
            writeln!(out, "      COMPREPLY=($(compgen -A hostname -- \"${{word}}\"))")
        }
        CompletionCandidates::Username => {
            writeln!(out, "      COMPREPLY=($(compgen -A user -- \"${{word}}\"))")
        }
        CompletionCandidates::Fixed(values) => {
            let quoted: Vec<Cow<'_, str>> = values.iter().map(|v| shell_quote(v)).collect();
            writeln!(
                out,
                "      COMPREPLY=($(compgen -W {} -- \"${{word}}\"))",
                single_quote(&quoted.join(" "))
            )
        }
        CompletionCandidates::Custom(generator) => {
            if generator(shell).is_none() {
                return Ok(());
            }
            // bash warns that "compgen -F might not do what you expect"
            writeln!(
                out,
                "      COMPREPLY=($(compgen -F {} 2>/dev/null))",
                custom_function_name(func_name, &param.name)
            )
        }
    }
}

/// `_` followed by the command path joined with `_`, dashes replaced
fn function_name(ctx: &Context<'_>) -> String {
    format!("_{}", ctx.command_path().join("_")).replace('-', "_")
}

fn custom_function_name(func_name: &str, param: &str) -> String {
    static NON_WORD: OnceLock<Option<Regex>> = OnceLock::new();
    let sanitized = match NON_WORD.get_or_init(|| Regex::new(r"[^a-zA-Z0-9]").ok()) {
        Some(re) => re.replace_all(param, "_").into_owned(),
        None => param.to_string(),
    };
    format!("_{}_complete_{}", func_name, sanitized)
}

/// Regex matching the first character of any visible option name.
///
/// Inside the bracket `]` leads, `^` never does and `-` trails, so none of
/// them is read as syntax. A lone `^` cannot be bracketed and is escaped.
fn prefix_pattern(options: &[&OptionSpec]) -> String {
    let mut chars: Vec<char> = Vec::new();
    for c in options
        .iter()
        .flat_map(|spec| spec.all_names())
        .filter_map(|name| name.chars().next())
    {
        if !chars.contains(&c) {
            chars.push(c);
        }
    }

    if chars == ['^'] {
        return r"^\^".to_string();
    }

    // `[` before `^` and `-` so it never opens `[:`, `[.` or `[=`
    let rank = |c: char| match c {
        ']' => 0,
        '[' => 2,
        '^' => 3,
        '-' => 4,
        _ => 1,
    };
    chars.sort_by_key(|&c| rank(c));
    if chars.first() == Some(&'^') {
        // only `^` and `-` remain
        chars.rotate_left(1);
    }
    format!("^[{}]", chars.into_iter().collect::<String>())
}

fn is_shell_safe(token: &str) -> bool {
    static SAFE: OnceLock<Option<Regex>> = OnceLock::new();
    SAFE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_@%+=:,./-]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(token))
}

/// Leave shell-safe tokens bare; single-quote everything else
fn shell_quote(token: &str) -> Cow<'_, str> {
    if is_shell_safe(token) {
        Cow::Borrowed(token)
    } else {
        Cow::Owned(single_quote(token))
    }
}

fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}

/// Strip the common indentation and surrounding blank lines, then indent by
/// two spaces
fn indent_body(body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let start = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    let lines = &lines[start..end];

    // Counted in chars: leading whitespace may be multi-byte
    let margin = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                format!("  {}", l.chars().skip(margin).collect::<String>())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
