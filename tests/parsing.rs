//! Integration tests for argv parsing

use argtree::{CliError, Command, EagerOpt, FlagOpt, Invocation, ParseError, ValueArg, ValueOpt};
use std::sync::{Arc, Mutex};

#[test]
fn test_arity_one_syntaxes_are_equivalent() {
    let mut cmd = Command::new("tool");
    let xx = cmd.option(ValueOpt::new(["-x", "--xx"])).unwrap();

    for argv in [vec!["--xx", "3"], vec!["--xx=3"], vec!["-x3"], vec!["-x", "3"]] {
        let matches = cmd.parse(argv.clone()).unwrap();
        assert_eq!(matches.get(&xx), Some(&Some("3".to_string())), "{:?}", argv);
    }
}

#[test]
fn test_int_option_with_default() {
    let mut cmd = Command::new("tool");
    let xx = cmd
        .option(ValueOpt::new(["-x", "--xx"]).int().default(111))
        .unwrap();

    assert_eq!(cmd.parse(Vec::<String>::new()).unwrap().get(&xx), Some(&111));
    assert_eq!(cmd.parse(["-x", "5"]).unwrap().get(&xx), Some(&5));

    let err = cmd.parse(["--xx", "five"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value for --xx: five is not a valid integer"
    );
}

#[test]
fn test_interspersed_disabled_stops_option_parsing() {
    let mut cmd = Command::new("tool").allow_interspersed_args(false);
    cmd.option(FlagOpt::new(["-x"])).unwrap();
    cmd.argument(ValueArg::new("y")).unwrap();

    let err = cmd.parse(["a", "-x"]).unwrap_err();
    assert_eq!(
        err,
        CliError::Parse(ParseError::UnexpectedArgument {
            value: "-x".to_string()
        })
    );
}

#[test]
fn test_interspersed_enabled_by_default() {
    let mut cmd = Command::new("tool");
    let x = cmd.option(FlagOpt::new(["-x"])).unwrap();
    let y = cmd.argument(ValueArg::new("y")).unwrap();

    let matches = cmd.parse(["a", "-x"]).unwrap();
    assert_eq!(matches.get(&x), Some(&true));
    assert_eq!(matches.argument(&y), Some(&"a".to_string()));
}

#[test]
fn test_canonical_argv_reparses_identically() {
    let mut cmd = Command::new("tool");
    let verbose = cmd.option(FlagOpt::new(["-v"]).counted()).unwrap();
    let include = cmd.option(ValueOpt::new(["-I", "--include"]).multiple()).unwrap();
    let point = cmd
        .option(ValueOpt::new(["--point"]).nvalues(2).optional())
        .unwrap();
    let files = cmd.argument(ValueArg::new("files").multiple(false)).unwrap();

    let mut sub = Command::new("run");
    let level = sub.option(ValueOpt::new(["--level"]).int().default(0)).unwrap();
    let target = sub.argument(ValueArg::new("target")).unwrap();
    cmd.subcommand(sub).unwrap();

    let argv = [
        "-vv", "a.txt", "-Ilib", "--point=1", "2", "-Iinc", "run", "--level=3", "all",
    ];
    let first = cmd.parse(argv).unwrap();
    let canonical = first.canonical_argv();
    let second = cmd.parse(canonical.clone()).unwrap();

    assert_eq!(second.canonical_argv(), canonical);
    assert_eq!(first.get(&verbose), second.get(&verbose));
    assert_eq!(second.get(&verbose), Some(&2));
    assert_eq!(first.get(&include), second.get(&include));
    assert_eq!(first.get(&point), second.get(&point));
    assert_eq!(first.argument(&files), second.argument(&files));
    assert_eq!(second.get(&level), Some(&3));
    assert_eq!(first.argument(&target), second.argument(&target));
}

#[test]
fn test_canonical_argv_guards_dash_values() {
    let mut cmd = Command::new("tool");
    let files = cmd.argument(ValueArg::new("files").multiple(false)).unwrap();

    let first = cmd.parse(["--", "-odd", "even"]).unwrap();
    let second = cmd.parse(first.canonical_argv()).unwrap();
    assert_eq!(
        second.argument(&files),
        Some(&vec!["-odd".to_string(), "even".to_string()])
    );
}

fn recording_eager(log: &Arc<Mutex<Vec<String>>>) -> EagerOpt {
    let log = Arc::clone(log);
    EagerOpt::new(["--eager"], move |_: &argtree::Context<'_>, _: &[Invocation]| {
        log.lock().unwrap().push("eager".to_string());
        Ok(())
    })
}

fn recording_regular(log: &Arc<Mutex<Vec<String>>>) -> ValueOpt<String> {
    let log = Arc::clone(log);
    ValueOpt::new(["--regular"]).convert(move |value: String| {
        log.lock().unwrap().push("regular".to_string());
        Ok(value)
    })
}

#[test]
fn test_eager_options_finalize_first_in_any_declaration_order() {
    for eager_first in [true, false] {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut cmd = Command::new("tool");
        if eager_first {
            cmd.eager_option(recording_eager(&log)).unwrap();
            cmd.option(recording_regular(&log)).unwrap();
        } else {
            cmd.option(recording_regular(&log)).unwrap();
            cmd.eager_option(recording_eager(&log)).unwrap();
        }

        cmd.parse(["--regular", "1", "--eager"]).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["eager", "regular"]);
    }
}

#[test]
fn test_eager_options_run_across_levels_before_regular() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut root = Command::new("tool");
    root.option(recording_regular(&log)).unwrap();
    let mut sub = Command::new("run");
    sub.eager_option(recording_eager(&log)).unwrap();
    root.subcommand(sub).unwrap();

    root.parse(["--regular", "x", "run", "--eager"]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["eager", "regular"]);
}

#[test]
fn test_help_preempts_missing_required_option() {
    let mut cmd = Command::new("tool").help("Does things");
    cmd.eager_option(EagerOpt::help_option()).unwrap();
    cmd.option(ValueOpt::new(["--name"]).required()).unwrap();

    assert_eq!(
        cmd.parse(Vec::<String>::new()).unwrap_err(),
        CliError::Parse(ParseError::MissingOption {
            name: "--name".to_string()
        })
    );

    let err = cmd.parse(["--help"]).unwrap_err();
    assert_eq!(err.exit_code(), 0);
    assert!(!err.is_error());
    assert!(err.to_string().starts_with("Usage: tool [OPTIONS]"));
}

#[test]
fn test_help_preempts_scan_errors_later_on_the_line() {
    let mut cmd = Command::new("tool");
    cmd.eager_option(EagerOpt::help_option()).unwrap();

    let err = cmd.parse(["--bogus", "-h"]).unwrap_err();
    assert!(matches!(err, CliError::PrintHelp { error: false, .. }));
}

#[test]
fn test_version_option() {
    let mut cmd = Command::new("tool");
    cmd.eager_option(EagerOpt::version_option("2.0.1")).unwrap();

    let err = cmd.parse(["--version"]).unwrap_err();
    assert_eq!(err.to_string(), "tool version 2.0.1");
    assert_eq!(err.exit_code(), 0);
}

#[test]
fn test_alias_equivalent_to_literal_tokens() {
    fn tree() -> (Command, argtree::OptionHandle<bool>) {
        let mut run = Command::new("run");
        let fast = run.option(FlagOpt::new(["--fast"])).unwrap();
        let mut root = Command::new("tool");
        root.option(FlagOpt::new(["-v"])).unwrap();
        root.subcommand(run).unwrap();
        root.alias("ci", ["run", "--fast"]).unwrap();
        (root, fast)
    }

    let (root, fast) = tree();
    let aliased = root.parse(["-v", "ci"]).unwrap();
    let literal = root.parse(["-v", "run", "--fast"]).unwrap();

    assert_eq!(aliased.canonical_argv(), literal.canonical_argv());
    assert_eq!(aliased.get(&fast), Some(&true));
    assert_eq!(aliased.subcommand_name(), Some("run"));
}

#[test]
fn test_missing_subcommand() {
    let mut root = Command::new("tool");
    root.subcommand(Command::new("run")).unwrap();

    let err = root.parse(Vec::<String>::new()).unwrap_err();
    assert!(matches!(err, CliError::PrintHelp { error: true, .. }));
    assert_eq!(err.exit_code(), 1);

    let mut root = Command::new("tool").invoke_without_subcommand(true);
    root.subcommand(Command::new("run")).unwrap();
    assert_eq!(root.parse(Vec::<String>::new()).unwrap().subcommand_name(), None);
}

#[test]
fn test_unknown_tokens() {
    let mut root = Command::new("tool");
    root.subcommand(Command::new("run")).unwrap();

    assert_eq!(
        root.parse(["--nope"]).unwrap_err(),
        CliError::Parse(ParseError::NoSuchOption {
            name: "--nope".to_string()
        })
    );
    assert_eq!(
        root.parse(["walk"]).unwrap_err(),
        CliError::Parse(ParseError::NoSuchSubcommand {
            name: "walk".to_string()
        })
    );
}

#[test]
fn test_option_missing_values() {
    let mut cmd = Command::new("tool");
    cmd.option(ValueOpt::new(["--point"]).nvalues(2)).unwrap();

    assert_eq!(
        cmd.parse(["--point", "1"]).unwrap_err(),
        CliError::Parse(ParseError::IncorrectOptionValueCount {
            name: "--point".to_string(),
            expected: 2,
        })
    );
}

#[test]
fn test_fixed_then_variadic_arguments() {
    let mut cmd = Command::new("cp");
    let src = cmd.argument(ValueArg::new("src").nvalues(2)).unwrap();
    let rest = cmd.argument(ValueArg::new("rest").multiple(true)).unwrap();

    let matches = cmd.parse(["a", "b", "c", "d"]).unwrap();
    assert_eq!(
        matches.argument(&src),
        Some(&vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(
        matches.argument(&rest),
        Some(&vec!["c".to_string(), "d".to_string()])
    );

    assert_eq!(
        cmd.parse(["a"]).unwrap_err(),
        CliError::Parse(ParseError::IncorrectArgumentValueCount {
            name: "SRC".to_string(),
            expected: 2,
        })
    );
    assert_eq!(
        cmd.parse(["a", "b"]).unwrap_err(),
        CliError::Parse(ParseError::MissingArgument {
            name: "REST".to_string()
        })
    );
}
