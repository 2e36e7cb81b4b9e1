use super::*;

fn color_for(pairs: &[(&str, &str)]) -> ColorIntent {
    EnvironmentConfig::from_pairs(pairs.iter().copied())
        .unwrap()
        .apply_color_config(ColorIntent::Auto)
}

#[test]
fn test_no_color_environment_variable() {
    assert_eq!(color_for(&[("NO_COLOR", "1")]), ColorIntent::Never);
}

#[test]
fn test_force_color_environment_variable() {
    assert_eq!(color_for(&[("FORCE_COLOR", "1")]), ColorIntent::Always);
}

#[test]
fn test_environment_variable_precedence() {
    // FORCE_COLOR=1 wins over NO_COLOR and CLICOLOR
    let color = color_for(&[("CLICOLOR", "0"), ("NO_COLOR", "1"), ("FORCE_COLOR", "1")]);
    assert_eq!(color, ColorIntent::Always);
}

#[test]
fn test_ci_environment_variable() {
    assert_eq!(color_for(&[("CI", "true")]), ColorIntent::Never);
    assert_eq!(
        color_for(&[("CI", "true"), ("FORCE_COLOR", "1")]),
        ColorIntent::Never
    );
}

#[test]
fn test_empty_no_color_is_ignored() {
    assert_eq!(color_for(&[("NO_COLOR", "")]), ColorIntent::Auto);
}

#[test]
fn test_invalid_force_color_values_ignored() {
    assert_eq!(color_for(&[("FORCE_COLOR", "invalid")]), ColorIntent::Auto);
}

#[test]
fn test_database_credentials_from_environment() {
    let env = EnvironmentConfig::from_pairs([
        ("MYSQL_HOST", "127.0.0.1"),
        ("MYSQL_USER", "root"),
        ("MYSQL_PWD", ""),
        ("MYSQL_DB", "typecho"),
    ])
    .unwrap();

    let credentials = env.database_credentials().unwrap();
    assert_eq!(credentials.host, "127.0.0.1");
    assert_eq!(credentials.user, "root");
    assert_eq!(credentials.password, "");
    assert_eq!(credentials.database, "typecho");
}

#[test]
fn test_missing_database_variable_is_named() {
    let env = EnvironmentConfig::from_pairs([
        ("MYSQL_HOST", "127.0.0.1"),
        ("MYSQL_USER", "root"),
        ("MYSQL_PWD", "root"),
    ])
    .unwrap();

    let err = env.database_credentials().unwrap_err();
    assert!(matches!(err, ConfigError::MissingVariable { name: "MYSQL_DB" }));
}

#[test]
fn test_missing_web_server_host_is_named() {
    let env = EnvironmentConfig::from_pairs([("WEB_SERVER_PORT", "8000")]).unwrap();

    let err = env.server_endpoint().unwrap_err();
    assert!(err.to_string().contains("WEB_SERVER_HOST"));
}

#[test]
fn test_server_endpoint_from_environment() {
    let env = EnvironmentConfig::from_pairs([
        ("WEB_SERVER_HOST", "localhost"),
        ("WEB_SERVER_PORT", "8000"),
    ])
    .unwrap();

    let endpoint = env.server_endpoint().unwrap();
    assert_eq!(endpoint.host, "localhost");
    assert_eq!(endpoint.port, "8000");
}

#[test]
fn test_unrelated_variables_are_ignored() {
    let env = EnvironmentConfig::from_pairs([("PATH", "/usr/bin"), ("HOME", "/root")]).unwrap();
    assert!(!env.is_ci());
    assert!(env.database_credentials().is_err());
}
