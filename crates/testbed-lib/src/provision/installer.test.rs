use super::*;
use crate::testing::TempDirFixture;

fn credentials() -> DatabaseCredentials {
    DatabaseCredentials {
        host: "127.0.0.1".to_string(),
        user: "root".to_string(),
        password: "hunter2".to_string(),
        database: "typecho".to_string(),
    }
}

fn site_fixture() -> (TempDirFixture, ExtractedTree) {
    let fixture = TempDirFixture::new().unwrap();
    fixture.create_dir("tmp/typecho-master/usr/plugins").unwrap();
    fixture.write_plugin_sources("plugin").unwrap();
    let tree = ExtractedTree::new(fixture.path().join("tmp/typecho-master"));
    (fixture, tree)
}

#[test]
fn test_install_writes_everything() {
    let (fixture, tree) = site_fixture();
    let mut installer = SiteInstaller::new(&fixture.path().join("plugin")).unwrap();

    let report = installer.install(&tree, &credentials()).unwrap();

    assert_eq!(report.config_file, tree.config_file());
    assert_eq!(report.bootstrap_script, tree.bootstrap_script());
    assert_eq!(
        report.plugin_files,
        vec![
            tree.plugin_dir().join("Plugin.php"),
            tree.plugin_dir().join("Action.php")
        ]
    );

    let config = fixture
        .read_file("tmp/typecho-master/config.inc.php")
        .unwrap();
    assert!(config.contains("\"password\" => \"hunter2\""));
    assert!(fixture.file_exists("tmp/typecho-master/reactivate_restful.php"));
}

#[test]
fn test_install_overwrites_existing_config() {
    let (fixture, tree) = site_fixture();
    fixture
        .write_file("tmp/typecho-master/config.inc.php", "<?php // old")
        .unwrap();
    let mut installer = SiteInstaller::new(&fixture.path().join("plugin")).unwrap();

    installer.write_site_config(&tree, &credentials()).unwrap();

    let config = fixture
        .read_file("tmp/typecho-master/config.inc.php")
        .unwrap();
    assert!(!config.contains("// old"));
    assert!(config.contains("\"database\" => \"typecho\""));
}

#[test]
fn test_plugin_directory_is_recreated() {
    let (fixture, tree) = site_fixture();
    fixture
        .write_file("tmp/typecho-master/usr/plugins/Restful/Stale.php", "<?php")
        .unwrap();
    let installer = SiteInstaller::new(&fixture.path().join("plugin")).unwrap();

    installer.install_plugin(&tree).unwrap();

    let mut entries: Vec<String> = std::fs::read_dir(tree.plugin_dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["Action.php", "Plugin.php"]);

    let plugin = fixture
        .read_file("tmp/typecho-master/usr/plugins/Restful/Plugin.php")
        .unwrap();
    assert!(plugin.contains("class Restful_Plugin"));
}

#[test]
fn test_plugin_install_creates_missing_plugin_root() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.create_dir("tree").unwrap();
    fixture.write_plugin_sources("plugin").unwrap();
    let tree = ExtractedTree::new(fixture.path().join("tree"));

    let installer = SiteInstaller::new(&fixture.path().join("plugin")).unwrap();
    installer.install_plugin(&tree).unwrap();

    assert!(fixture.file_exists("tree/usr/plugins/Restful/Action.php"));
}

#[test]
fn test_missing_plugin_source_fails() {
    let (fixture, tree) = site_fixture();
    std::fs::remove_file(fixture.path().join("plugin/Action.php")).unwrap();
    let installer = SiteInstaller::new(&fixture.path().join("plugin")).unwrap();

    let err = installer.install_plugin(&tree).unwrap_err();

    match err {
        ProvisionError::Io { path, .. } => assert!(path.ends_with("Action.php")),
        other => panic!("unexpected error: {other:?}"),
    }
}
