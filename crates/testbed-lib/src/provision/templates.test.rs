use super::*;

fn credentials() -> DatabaseCredentials {
    DatabaseCredentials {
        host: "db.internal".to_string(),
        user: "typecho_ci".to_string(),
        password: "s3cr<e>t&\"pw".to_string(),
        database: "typecho_test".to_string(),
    }
}

#[test]
fn test_unknown_template_is_render_error() {
    let engine = TemplateEngine::new().unwrap();

    let err = engine.render_template("missing.php").unwrap_err();

    assert!(matches!(err, TemplateError::RenderError { ref name, .. } if name == "missing.php"));
}

#[test]
fn test_site_config_substitutes_credentials_verbatim() {
    let mut engine = TemplateEngine::new().unwrap();
    engine.set_credentials(&credentials());

    let rendered = engine.render_template(SITE_CONFIG_TEMPLATE).unwrap();

    assert!(rendered.contains("  \"host\" => \"db.internal\",\n"));
    assert!(rendered.contains("  \"user\" => \"typecho_ci\",\n"));
    assert!(rendered.contains("  \"password\" => \"s3cr<e>t&\"pw\",\n"));
    assert!(rendered.contains("  \"database\" => \"typecho_test\",\n"));
}

#[test]
fn test_site_config_boilerplate_unchanged() {
    let mut engine = TemplateEngine::new().unwrap();
    engine.set_credentials(&credentials());
    let rendered = engine.render_template(SITE_CONFIG_TEMPLATE).unwrap();

    let expected = include_str!("../../templates/site/config.inc.php.hbs")
        .replace("{{HOST}}", "db.internal")
        .replace("{{USER}}", "typecho_ci")
        .replace("{{PASSWORD}}", "s3cr<e>t&\"pw")
        .replace("{{DATABASE}}", "typecho_test");

    assert_eq!(rendered, expected);
    assert!(rendered.starts_with("<?php\n"));
    assert!(rendered.ends_with("Typecho_Db::set($db);\n"));
}

#[test]
fn test_missing_credentials_fail_rendering() {
    let engine = TemplateEngine::new().unwrap();
    let err = engine.render_template(SITE_CONFIG_TEMPLATE).unwrap_err();

    assert!(matches!(err, TemplateError::RenderError { ref name, .. } if name == SITE_CONFIG_TEMPLATE));
}

#[test]
fn test_bootstrap_script_reactivates_plugin() {
    let engine = TemplateEngine::new().unwrap();
    let rendered = engine.render_template(BOOTSTRAP_TEMPLATE).unwrap();

    assert_eq!(
        rendered,
        "<?php\nrequire_once __DIR__ . '/index.php';\n\nRestful_Plugin::deactivate();\nRestful_Plugin::activate();\n"
    );
}
