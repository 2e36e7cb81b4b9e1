use super::*;
use crate::provision::{NoProgress, ProvisionOptions};
use crate::testing::{DatabaseCall, RecordingDatabase, StaticEnvironment, TempDirFixture};
use reqwest::Client;

fn provisioner_in(fixture: &TempDirFixture) -> Provisioner<RecordingDatabase> {
    let options = ProvisionOptions {
        workspace: fixture.path().join("tmp"),
        // Nothing listens on the discard port
        archive_url: "http://127.0.0.1:9/master.tar.gz".to_string(),
        tree_name: "typecho-master".to_string(),
        schema_dump: fixture.path().join("tests/typecho.sql"),
        plugin_source: fixture.path().join("plugin"),
    };
    Provisioner::new(options, Client::new(), RecordingDatabase::new())
}

mod handle_clean_tests {
    use super::*;

    #[tokio::test]
    async fn it_removes_the_workspace() {
        let fixture = TempDirFixture::new().unwrap();
        fixture.write_file("tmp/typecho-master/index.php", "<?php").unwrap();
        let provisioner = provisioner_in(&fixture);

        execute_command_with(
            Commands::Clean { keep_root: false },
            &provisioner,
            &StaticEnvironment::default(),
            &NoProgress,
        )
        .await
        .unwrap();

        assert!(!fixture.file_exists("tmp"));
    }

    #[tokio::test]
    async fn it_keeps_the_root_when_asked() {
        let fixture = TempDirFixture::new().unwrap();
        fixture.write_file("tmp/master.tar.gz", "gz").unwrap();
        let provisioner = provisioner_in(&fixture);

        execute_command_with(
            Commands::Clean { keep_root: true },
            &provisioner,
            &StaticEnvironment::default(),
            &NoProgress,
        )
        .await
        .unwrap();

        assert!(fixture.path().join("tmp").is_dir());
        assert!(!fixture.file_exists("tmp/master.tar.gz"));
    }

    #[tokio::test]
    async fn it_succeeds_without_a_workspace() {
        let fixture = TempDirFixture::new().unwrap();
        let provisioner = provisioner_in(&fixture);

        let result = execute_command_with(
            Commands::Clean { keep_root: false },
            &provisioner,
            &StaticEnvironment::default(),
            &NoProgress,
        )
        .await;

        assert!(result.is_ok());
    }
}

mod handle_fetch_tests {
    use super::*;

    #[tokio::test]
    async fn it_reuses_an_extracted_tree() {
        let fixture = TempDirFixture::new().unwrap();
        fixture.create_dir("tmp/typecho-master").unwrap();
        let provisioner = provisioner_in(&fixture);

        let result = execute_command_with(
            Commands::Fetch,
            &provisioner,
            &StaticEnvironment::default(),
            &NoProgress,
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn it_reports_download_failure() {
        let fixture = TempDirFixture::new().unwrap();
        let provisioner = provisioner_in(&fixture);

        let err = execute_command_with(
            Commands::Fetch,
            &provisioner,
            &StaticEnvironment::default(),
            &NoProgress,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Failed to fetch platform archive"));
    }
}

mod handle_database_tests {
    use super::*;

    #[tokio::test]
    async fn it_recreates_then_loads() {
        let fixture = TempDirFixture::new().unwrap();
        let provisioner = provisioner_in(&fixture);

        execute_command_with(
            Commands::Database,
            &provisioner,
            &StaticEnvironment::local("8000"),
            &NoProgress,
        )
        .await
        .unwrap();

        let calls = provisioner_database_calls(&provisioner);
        assert!(matches!(calls[0], DatabaseCall::Recreate { .. }));
        assert!(matches!(calls[1], DatabaseCall::LoadSchema { .. }));
    }

    #[tokio::test]
    async fn it_requires_credentials() {
        let fixture = TempDirFixture::new().unwrap();
        let provisioner = provisioner_in(&fixture);

        let err = execute_command_with(
            Commands::Database,
            &provisioner,
            &StaticEnvironment::default(),
            &NoProgress,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("MYSQL_HOST"));
        assert!(provisioner_database_calls(&provisioner).is_empty());
    }

    fn provisioner_database_calls(provisioner: &Provisioner<RecordingDatabase>) -> Vec<DatabaseCall> {
        provisioner.database().calls()
    }
}

mod handle_install_tests {
    use super::*;

    #[tokio::test]
    async fn it_needs_a_fetched_tree() {
        let fixture = TempDirFixture::new().unwrap();
        fixture.write_plugin_sources("plugin").unwrap();
        let provisioner = provisioner_in(&fixture);

        let err = execute_command_with(
            Commands::Install,
            &provisioner,
            &StaticEnvironment::local("8000"),
            &NoProgress,
        )
        .await
        .unwrap_err();

        assert!(format!("{err:#}").contains("Extracted tree not found"));
    }

    #[tokio::test]
    async fn it_installs_into_the_tree() {
        let fixture = TempDirFixture::new().unwrap();
        fixture.create_dir("tmp/typecho-master").unwrap();
        fixture.write_plugin_sources("plugin").unwrap();
        let provisioner = provisioner_in(&fixture);

        execute_command_with(
            Commands::Install,
            &provisioner,
            &StaticEnvironment::local("8000"),
            &NoProgress,
        )
        .await
        .unwrap();

        assert!(fixture.file_exists("tmp/typecho-master/config.inc.php"));
        assert!(fixture.file_exists("tmp/typecho-master/usr/plugins/Restful/Plugin.php"));
        assert!(fixture.file_exists("tmp/typecho-master/reactivate_restful.php"));
    }
}

mod handle_reactivate_tests {
    use super::*;

    #[tokio::test]
    async fn it_requires_the_server_address() {
        let fixture = TempDirFixture::new().unwrap();
        let provisioner = provisioner_in(&fixture);

        let err = execute_command_with(
            Commands::Reactivate,
            &provisioner,
            &StaticEnvironment::default(),
            &NoProgress,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("WEB_SERVER_HOST"));
    }
}
