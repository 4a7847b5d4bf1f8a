//! Main CLI application

use crate::cli::logging::{init_logging, Verbosity};
use crate::command::Command as CommandTree;
use crate::config::{build_command, load_declaration, Binding};
use crate::params::ShellType;
use anyhow::{Context as _, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use colored::Colorize;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A loaded declaration, ready to parse or generate completions
pub struct App {
    /// The declared command tree
    command: CommandTree,
    /// Handles for reporting parsed values
    binding: Binding,
    /// Declaration file path
    path: PathBuf,
}

impl App {
    /// Load the declaration at `file`, or discover one from the current directory
    pub fn new(file: Option<&Path>) -> Result<Self> {
        let (decl, path) = load_declaration(file).context("failed to load command declarations")?;
        let (command, binding) = build_command(&decl)
            .with_context(|| format!("invalid command tree in {}", path.display()))?;
        debug!(path = %path.display(), command = command.name(), "loaded declarations");

        Ok(App {
            command,
            binding,
            path,
        })
    }

    pub fn command(&self) -> &CommandTree {
        &self.command
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Completion script for the declared tree
    pub fn completion(&self, shell: ShellType) -> String {
        self.command.completion_script(shell)
    }

    /// Parse `args` and report the outcome; returns the exit code
    pub fn parse(&self, args: Vec<String>) -> Result<i32> {
        match self.command.parse(args) {
            Ok(matches) => {
                let resolved = self.binding.resolve(&matches);
                print!("{}", serde_yaml::to_string(&resolved)?);
                Ok(0)
            }
            Err(err) => {
                if err.is_error() {
                    eprintln!("Error: {}", err);
                } else {
                    println!("{}", err);
                }
                Ok(err.exit_code())
            }
        }
    }

    /// Human-readable outline of the declared tree
    pub fn describe(&self) -> String {
        let mut out = String::new();
        describe_command(&mut out, &self.command, 0);
        out
    }
}

fn describe_command(out: &mut String, command: &CommandTree, depth: usize) {
    let indent = "  ".repeat(depth);

    let name = if command.is_hidden() {
        format!("{} (hidden)", command.name()).dimmed()
    } else {
        command.name().bold()
    };
    if command.help_text().is_empty() {
        let _ = writeln!(out, "{}{}", indent, name);
    } else {
        let _ = writeln!(out, "{}{}  {}", indent, name, command.help_text());
    }

    for spec in command.option_specs() {
        let mut names = spec.all_names().collect::<Vec<_>>().join(", ");
        if spec.nvalues > 0 {
            let _ = write!(names, " ({} value{})", spec.nvalues, if spec.nvalues == 1 { "" } else { "s" });
        }
        let names = if spec.hidden { names.dimmed() } else { names.cyan() };
        let _ = writeln!(out, "{}  {}", indent, names);
    }

    for spec in command.argument_specs() {
        let arity = match spec.fixed_arity() {
            Some(1) => String::new(),
            Some(n) => format!(" x{}", n),
            None => "...".to_string(),
        };
        let _ = writeln!(out, "{}  {}", indent, format!("{}{}", spec.metavar(), arity).green());
    }

    for (alias, tokens) in command.aliases() {
        let _ = writeln!(
            out,
            "{}  {}",
            indent,
            format!("{} -> {}", alias, tokens.join(" ")).yellow()
        );
    }

    for sub in command.subcommands() {
        describe_command(out, sub, depth + 1);
    }
}

/// Build the clap command for the `argtree` binary
pub fn build_cli() -> Command {
    Command::new("argtree")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Declare command trees in YAML, parse argv against them and generate shell completions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Path to argtree.yml declaration file")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print results and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no diagnostics")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print debug diagnostics")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("completion")
                .about("Print the completion script for the declared command tree")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh"])
                        .help("Shell to generate for"),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse arguments against the declared command tree and print the values as YAML")
                .arg(
                    Arg::new("args")
                        .value_name("ARGS")
                        .num_args(0..)
                        .trailing_var_arg(true)
                        .allow_hyphen_values(true)
                        .help("Arguments to parse; put them after -- when they start with a dash"),
                ),
        )
        .subcommand(Command::new("check").about("Validate the declaration and print the command tree"))
        .subcommand(
            Command::new("self-completion")
                .about("Print the completion script for argtree itself")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(value_parser!(Shell))
                        .help("Shell to generate for"),
                ),
        )
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Run the CLI application with the process arguments; returns the exit code
pub fn run() -> Result<i32> {
    run_from(std::env::args_os())
}

/// Run the CLI application with explicit arguments
pub fn run_from<I, T>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_cli().get_matches_from(args);
    let (name, sub_matches) = match matches.subcommand() {
        Some(subcommand) => subcommand,
        None => return Ok(2),
    };

    // Global flags are propagated to the subcommand's matches
    init_logging(get_verbosity(sub_matches));

    if name == "self-completion" {
        if let Some(shell) = sub_matches.get_one::<Shell>("shell") {
            clap_complete::generate(*shell, &mut build_cli(), "argtree", &mut io::stdout());
        }
        return Ok(0);
    }

    let app = App::new(sub_matches.get_one::<PathBuf>("file").map(PathBuf::as_path))?;

    match name {
        "completion" => {
            let shell: ShellType = sub_matches
                .get_one::<String>("shell")
                .map(String::as_str)
                .unwrap_or("bash")
                .parse()
                .map_err(anyhow::Error::msg)?;
            print!("{}", app.completion(shell));
            Ok(0)
        }
        "parse" => {
            let args: Vec<String> = sub_matches
                .get_many::<String>("args")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            app.parse(args)
        }
        "check" => {
            println!("{} {}", "valid:".green().bold(), app.path().display());
            print!("{}", app.describe());
            Ok(0)
        }
        other => anyhow::bail!("unknown command: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DECLARATION: &str = r#"
name: tool
help: Demo tool
options:
  - names: [-x, --xx]
    type: int
    default: 3
  - names: [--secret]
    nvalues: 0
    hidden: true
aliases:
  ci: [run, --fast]
subcommands:
  - name: run
    options:
      - names: [--fast]
        nvalues: 0
"#;

    fn app() -> (TempDir, App) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("argtree.yml");
        fs::write(&path, DECLARATION).unwrap();
        let app = App::new(Some(path.as_path())).unwrap();
        (temp_dir, app)
    }

    #[test]
    fn test_get_verbosity_normal() {
        let matches = build_cli().get_matches_from(vec!["argtree", "check"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(get_verbosity(sub), Verbosity::Normal);
    }

    #[test]
    fn test_get_verbosity_after_subcommand() {
        let matches = build_cli().get_matches_from(vec!["argtree", "check", "-s"]);
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(get_verbosity(sub), Verbosity::Silent);
    }

    #[test]
    fn test_parse_collects_trailing_args() {
        let matches =
            build_cli().get_matches_from(vec!["argtree", "parse", "--", "-x", "4", "run"]);
        let (_, sub) = matches.subcommand().unwrap();
        let args: Vec<&String> = sub.get_many::<String>("args").unwrap().collect();
        assert_eq!(args, vec!["-x", "4", "run"]);
    }

    #[test]
    fn test_app_loads_declaration() {
        let (_dir, app) = app();
        assert_eq!(app.command().name(), "tool");
        assert!(app.completion(ShellType::Bash).contains("complete -F _tool tool"));
    }

    #[test]
    fn test_app_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.yml");
        let err = App::new(Some(missing.as_path())).err().unwrap();
        assert!(format!("{:#}", err).contains("failed to load command declarations"));
    }

    #[test]
    fn test_describe_tree() {
        colored::control::set_override(false);
        let (_dir, app) = app();
        let tree = app.describe();
        assert!(tree.starts_with("tool  Demo tool\n"));
        assert!(tree.contains("  -x, --xx (1 value)\n"));
        assert!(tree.contains("  --secret\n"));
        assert!(tree.contains("  ci -> run --fast\n"));
        assert!(tree.contains("\n  run\n"));
    }
}
