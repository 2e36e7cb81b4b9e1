use clap::Parser;
use std::path::PathBuf;
use testbed_lib::application::{Cli, CliConfig, EnvironmentConfig};
use testbed_lib::application::config::AppConfig;
use testbed_lib::primitives::{ColorIntent, ConfigError, LogFormat};

#[test]
fn test_config_default_creation() {
    let config = AppConfig::default();

    assert!(config.log_level <= 4);
    assert_eq!(config.net_timeout, None);
    assert_eq!(config.color, ColorIntent::Auto);
    assert!(!config.no_progress);
}

#[test]
fn test_config_merging_integration() {
    let base_config = AppConfig::default();
    let override_config = AppConfig {
        log_level: 3,
        log_format: LogFormat::Json,
        color: ColorIntent::Never,
        ..AppConfig::default()
    };

    let merged = base_config.merge_with(override_config);

    assert_eq!(merged.log_level, 3);
    assert_eq!(merged.log_format, LogFormat::Json);
    assert_eq!(merged.color, ColorIntent::Never);
    assert_eq!(merged.tree_name, "typecho-master");
}

#[test]
fn test_full_layering_from_arguments() {
    let cli = Cli::try_parse_from([
        "testbed",
        "--workdir",
        "/home/ci/Restful",
        "--schema-dump",
        "fixtures/schema.sql",
        "--mysql-client",
        "/usr/local/mysql/bin/mysql",
        "setup",
    ])
    .unwrap();

    let config = CliConfig::from_cli(cli, EnvironmentConfig::default()).unwrap();
    let app = config.app_config;

    assert_eq!(app.schema_dump, PathBuf::from("/home/ci/Restful/fixtures/schema.sql"));
    assert_eq!(app.plugin_source, PathBuf::from("/home/ci/Restful/."));
    assert_eq!(app.mysql_client, PathBuf::from("/usr/local/mysql/bin/mysql"));

    let options = app.to_provision_options();
    assert_eq!(options.workspace, PathBuf::from("/home/ci/Restful/tmp"));
}

#[test]
fn test_config_error_messages() {
    let missing = ConfigError::MissingVariable { name: "MYSQL_PWD" };
    assert_eq!(
        missing.to_string(),
        "Required environment variable MYSQL_PWD is not set"
    );

    let parse = ConfigError::ParseError {
        value: "yaml".to_string(),
        reason: "invalid log format".to_string(),
    };
    assert!(parse.to_string().contains("yaml"));
}
