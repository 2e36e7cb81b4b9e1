use super::*;
use crate::testing::{
    DatabaseCall, RecordingDatabase, RecordingProgress, StaticEnvironment, TempDirFixture,
    platform_archive,
};
use mockito::{Server, ServerGuard};

struct Site {
    fixture: TempDirFixture,
    server: ServerGuard,
}

impl Site {
    async fn new() -> Self {
        let fixture = TempDirFixture::new().unwrap();
        fixture.write_plugin_sources("plugin").unwrap();
        fixture.write_schema_dump("tests/typecho.sql").unwrap();
        Self {
            fixture,
            server: Server::new_async().await,
        }
    }

    fn options(&self) -> ProvisionOptions {
        ProvisionOptions {
            workspace: self.fixture.path().join("tmp"),
            archive_url: format!("{}/typecho/archive/master.tar.gz", self.server.url()),
            tree_name: "typecho-master".to_string(),
            schema_dump: self.fixture.path().join("tests/typecho.sql"),
            plugin_source: self.fixture.path().join("plugin"),
        }
    }

    fn environment(&self) -> StaticEnvironment {
        let address = self.server.host_with_port();
        let (_, port) = address.rsplit_once(':').unwrap();
        StaticEnvironment::local(port)
    }
}

#[test]
fn test_extracted_tree_paths() {
    let tree = ExtractedTree::new(PathBuf::from("/w/tmp/typecho-master"));

    assert_eq!(tree.root(), Path::new("/w/tmp/typecho-master"));
    assert_eq!(tree.config_file(), Path::new("/w/tmp/typecho-master/config.inc.php"));
    assert_eq!(tree.plugin_dir(), Path::new("/w/tmp/typecho-master/usr/plugins/Restful"));
    assert_eq!(
        tree.bootstrap_script(),
        Path::new("/w/tmp/typecho-master/reactivate_restful.php")
    );
}

#[test]
fn test_locate_requires_existing_tree() {
    let fixture = TempDirFixture::new().unwrap();

    let err = ExtractedTree::locate(fixture.path(), "typecho-master").unwrap_err();
    assert!(matches!(err, ProvisionError::MissingTree { .. }));

    fixture.create_dir("typecho-master").unwrap();
    let tree = ExtractedTree::locate(fixture.path(), "typecho-master").unwrap();
    assert_eq!(tree.root(), fixture.path().join("typecho-master"));
}

#[tokio::test]
async fn test_run_performs_every_step_in_order() {
    let mut site = Site::new().await;
    let archive = platform_archive("typecho-master", &[("index.php", "<?php")]);

    let download = site
        .server
        .mock("GET", "/typecho/archive/master.tar.gz")
        .with_status(200)
        .with_body(&archive)
        .expect(1)
        .create_async()
        .await;
    let reactivate = site
        .server
        .mock("GET", "/reactivate_restful.php")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let database = RecordingDatabase::new();
    let provisioner = Provisioner::new(site.options(), Client::new(), database);
    let progress = RecordingProgress::default();

    let report = provisioner
        .run(&site.environment(), &progress)
        .await
        .unwrap();

    download.assert_async().await;
    reactivate.assert_async().await;

    assert_eq!(
        provisioner.database.calls(),
        vec![
            DatabaseCall::Recreate {
                database: "typecho".to_string()
            },
            DatabaseCall::LoadSchema {
                database: "typecho".to_string(),
                dump: site.fixture.path().join("tests/typecho.sql"),
            },
        ]
    );

    let root = "tmp/typecho-master";
    let config = site.fixture.read_file(&format!("{root}/config.inc.php")).unwrap();
    assert!(config.contains("\"user\" => \"root\""));
    assert!(site.fixture.file_exists(&format!("{root}/usr/plugins/Restful/Plugin.php")));
    assert!(site.fixture.file_exists(&format!("{root}/usr/plugins/Restful/Action.php")));
    assert!(site.fixture.file_exists(&format!("{root}/reactivate_restful.php")));

    assert_eq!(report.tree.root(), site.fixture.path().join(root));
    assert!(report.reactivation_url.ends_with("/reactivate_restful.php"));
    assert!(progress.finished());
}

#[tokio::test]
async fn test_run_stops_when_schema_load_fails() {
    let mut site = Site::new().await;
    site.fixture.create_dir("tmp/typecho-master").unwrap();

    let reactivate = site
        .server
        .mock("GET", "/reactivate_restful.php")
        .expect(0)
        .create_async()
        .await;

    let provisioner = Provisioner::new(
        site.options(),
        Client::new(),
        RecordingDatabase::failing_schema_load(),
    );

    let err = provisioner
        .run(&site.environment(), &NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::SchemaLoad { .. }));
    assert!(!site.fixture.file_exists("tmp/typecho-master/config.inc.php"));
    reactivate.assert_async().await;
}

#[tokio::test]
async fn test_missing_server_endpoint_fails_only_at_reactivation() {
    let site = Site::new().await;
    site.fixture.create_dir("tmp/typecho-master").unwrap();

    let mut environment = site.environment();
    environment.endpoint = None;

    let provisioner = Provisioner::new(site.options(), Client::new(), RecordingDatabase::new());

    let err = provisioner
        .run(&environment, &NoProgress)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("WEB_SERVER_HOST"));
    // The earlier steps already ran
    assert_eq!(provisioner.database.calls().len(), 2);
    assert!(site.fixture.file_exists("tmp/typecho-master/reactivate_restful.php"));
}

#[tokio::test]
async fn test_missing_credentials_fail_before_database() {
    let site = Site::new().await;
    site.fixture.create_dir("tmp/typecho-master").unwrap();

    let environment = StaticEnvironment::default();
    let provisioner = Provisioner::new(site.options(), Client::new(), RecordingDatabase::new());

    let err = provisioner
        .run(&environment, &NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProvisionError::Config(ConfigError::MissingVariable { .. })
    ));
    assert!(provisioner.database.calls().is_empty());
}
