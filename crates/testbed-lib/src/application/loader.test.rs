use super::*;
use crate::application::Commands;
use crate::primitives::ColorIntent;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["testbed"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_cli_values_override_defaults() {
    let config = CliConfig::from_cli(
        parse(&["--workdir", "/srv/plugin", "--tree-name", "typecho-1.2.1", "fetch"]),
        EnvironmentConfig::default(),
    )
    .unwrap();

    assert_eq!(config.command, Some(Commands::Fetch));
    assert_eq!(config.app_config.tree_name, "typecho-1.2.1");
    assert_eq!(config.app_config.workspace, PathBuf::from("/srv/plugin/tmp"));
}

#[test]
fn test_environment_color_applies_without_flag() {
    let environment = EnvironmentConfig::from_pairs([("NO_COLOR", "1")]).unwrap();

    let config = CliConfig::from_cli(parse(&["--workdir", "/srv"]), environment).unwrap();
    assert_eq!(config.app_config.color, ColorIntent::Never);
}

#[test]
fn test_color_flag_beats_environment() {
    let environment = EnvironmentConfig::from_pairs([("NO_COLOR", "1")]).unwrap();

    let config = CliConfig::from_cli(
        parse(&["--workdir", "/srv", "--color", "always"]),
        environment,
    )
    .unwrap();
    assert_eq!(config.app_config.color, ColorIntent::Always);
}

#[test]
fn test_environment_is_carried_for_later_steps() {
    let environment = EnvironmentConfig::from_pairs([("MYSQL_DB", "typecho")]).unwrap();

    let config = CliConfig::from_cli(parse(&["--workdir", "/srv"]), environment).unwrap();
    assert_eq!(config.environment.mysql_db.as_deref(), Some("typecho"));
}

#[test]
fn test_invalid_values_fail_validation() {
    let result = CliConfig::from_cli(
        parse(&["--workdir", "/srv", "--archive-url", "not a url"]),
        EnvironmentConfig::default(),
    );
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}
