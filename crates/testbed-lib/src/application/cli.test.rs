use super::*;
use crate::primitives::{ColorIntent, LogFormat};
use std::path::PathBuf;

#[test]
fn test_cli_definition_is_consistent() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}

#[test]
fn test_parse_subcommands() {
    let cases = [
        ("setup", Commands::Setup),
        ("fetch", Commands::Fetch),
        ("database", Commands::Database),
        ("install", Commands::Install),
        ("reactivate", Commands::Reactivate),
        ("clean", Commands::Clean { keep_root: false }),
    ];

    for (arg, expected) in cases {
        let cli = Cli::try_parse_from(["testbed", arg]).unwrap();
        assert_eq!(cli.command, Some(expected));
    }
}

#[test]
fn test_clean_keep_root() {
    let cli = Cli::try_parse_from(["testbed", "clean", "--keep-root"]).unwrap();
    assert_eq!(cli.command, Some(Commands::Clean { keep_root: true }));
}

#[test]
fn test_no_subcommand() {
    let cli = Cli::try_parse_from(["testbed"]).unwrap();
    assert!(cli.command.is_none());
}

#[test]
fn test_global_options_after_subcommand() {
    let cli = Cli::try_parse_from([
        "testbed",
        "setup",
        "--workspace",
        "build",
        "--log-format",
        "json",
        "--color",
        "never",
        "--net-timeout",
        "60",
        "--no-progress",
    ])
    .unwrap();

    assert_eq!(cli.config.workspace, PathBuf::from("build"));
    assert_eq!(cli.config.log_format, LogFormat::Json);
    assert_eq!(cli.config.color, ColorIntent::Never);
    assert_eq!(cli.config.net_timeout, Some(60));
    assert!(cli.config.no_progress);
}

#[test]
fn test_value_aliases_accepted() {
    let cli = Cli::try_parse_from(["testbed", "--log-format", "plain", "--color", "off"]).unwrap();
    assert_eq!(cli.config.log_format, LogFormat::Text);
    assert_eq!(cli.config.color, ColorIntent::Never);
}

#[test]
fn test_invalid_log_format_rejected() {
    assert!(Cli::try_parse_from(["testbed", "--log-format", "yaml"]).is_err());
}
