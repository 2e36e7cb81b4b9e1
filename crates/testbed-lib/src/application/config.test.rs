use super::*;

#[test]
fn test_config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.workspace, PathBuf::from("tmp"));
    assert_eq!(
        config.archive_url,
        "https://github.com/typecho/typecho/archive/master.tar.gz"
    );
    assert_eq!(config.tree_name, "typecho-master");
    assert_eq!(config.mysql_client, PathBuf::from("mysql"));
    assert_eq!(config.net_timeout, None);
    assert_eq!(config.log_level, 2);
    assert_eq!(config.color, ColorIntent::Auto);
}

#[test]
fn test_default_consts_match_default_fns() {
    assert_eq!(defaults::LOG_LEVEL.parse::<u8>().unwrap(), default_fns::log_level());
    assert_eq!(defaults::LOG_FORMAT.parse::<LogFormat>().unwrap(), default_fns::log_format());
    assert_eq!(defaults::LOG_OUTPUT.parse::<LogOutput>().unwrap(), default_fns::log_output());
    assert_eq!(defaults::COLOR.parse::<ColorIntent>().unwrap(), default_fns::color());
}

#[test]
fn test_config_merging() {
    let base = AppConfig::default();
    let override_config = AppConfig {
        log_level: 4,
        color: ColorIntent::Always,
        workspace: PathBuf::from("build/site"),
        net_timeout: Some(120),
        ..AppConfig::default()
    };

    let merged = base.merge_with(override_config);
    assert_eq!(merged.log_level, 4);
    assert_eq!(merged.color, ColorIntent::Always);
    assert_eq!(merged.workspace, PathBuf::from("build/site"));
    assert_eq!(merged.net_timeout, Some(120));
    assert_eq!(merged.tree_name, "typecho-master");
}

#[test]
fn test_merge_keeps_base_when_other_is_default() {
    let base = AppConfig {
        tree_name: "typecho-1.2.1".to_string(),
        no_progress: true,
        ..AppConfig::default()
    };

    let merged = base.merge_with(AppConfig::default());
    assert_eq!(merged.tree_name, "typecho-1.2.1");
    assert!(merged.no_progress);
}

#[test]
fn test_validate_anchors_relative_paths() {
    let mut config = AppConfig {
        workdir: Some(PathBuf::from("/srv/plugin")),
        schema_dump: PathBuf::from("/opt/dumps/typecho.sql"),
        ..AppConfig::default()
    };

    config.validate().unwrap();

    assert_eq!(config.workspace, PathBuf::from("/srv/plugin/tmp"));
    assert_eq!(config.plugin_source, PathBuf::from("/srv/plugin/."));
    assert_eq!(config.schema_dump, PathBuf::from("/opt/dumps/typecho.sql"));
    assert_eq!(config.mysql_client, PathBuf::from("mysql"));
    assert_eq!(config.workdir, Some(PathBuf::from("/srv/plugin")));
}

#[test]
fn test_validate_anchors_client_path_but_not_program_name() {
    let mut config = AppConfig {
        workdir: Some(PathBuf::from("/srv/plugin")),
        mysql_client: PathBuf::from("bin/mysql"),
        ..AppConfig::default()
    };

    config.validate().unwrap();
    assert_eq!(config.mysql_client, PathBuf::from("/srv/plugin/bin/mysql"));
}

#[test]
fn test_validate_defaults_workdir_to_current_dir() {
    let mut config = AppConfig::default();
    config.validate().unwrap();

    assert_eq!(config.workdir, Some(std::env::current_dir().unwrap()));
}

#[test]
fn test_validate_rejects_bad_archive_url() {
    let mut config = AppConfig {
        workdir: Some(PathBuf::from("/srv")),
        archive_url: "github.com/typecho".to_string(),
        ..AppConfig::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_validate_rejects_nested_tree_name() {
    for name in ["", "a/b", ".."] {
        let mut config = AppConfig {
            workdir: Some(PathBuf::from("/srv")),
            tree_name: name.to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err(), "accepted {name:?}");
    }
}

#[test]
fn test_logger_config_resolves_color() {
    let config = AppConfig {
        log_level: 3,
        ..AppConfig::default()
    };

    let on_tty = config.to_logger_config(true);
    assert_eq!(on_tty.level, LogLevel::Debug);
    assert!(on_tty.ansi);
    assert!(!config.to_logger_config(false).ansi);
}

#[test]
fn test_provision_options_follow_config() {
    let config = AppConfig {
        tree_name: "typecho-1.2.1".to_string(),
        ..AppConfig::default()
    };

    let options = config.to_provision_options();
    assert_eq!(options.tree_name, "typecho-1.2.1");
    assert_eq!(options.workspace, config.workspace);
    assert_eq!(options.archive_url, config.archive_url);
}
