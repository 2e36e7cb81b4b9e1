//! End-to-end provisioning runs against a mock HTTP server and a mock
//! `mysql` client.

use mockito::Server;
use reqwest::Client;
use testbed_lib::application::{Commands, EnvironmentConfig, execute_command_with};
use testbed_lib::provision::{
    DatabaseCredentials, MySqlDatabase, NoProgress, ProvisionError, Provisioner,
};
use testbed_lib::testing::{RecordingProgress, StaticEnvironment};
use testbed_tests::fixtures::{
    archive_url, endpoint_for, mock_platform_archive, mock_reactivation,
};
use testbed_tests::{MockBehavior, ScriptedDatabase, TestEnvironment};

fn environment_for(server: &mockito::ServerGuard) -> StaticEnvironment {
    StaticEnvironment::new(
        DatabaseCredentials {
            host: "127.0.0.1".to_string(),
            user: "root".to_string(),
            password: "root".to_string(),
            database: "typecho".to_string(),
        },
        endpoint_for(server),
    )
}

fn hermetic_env(behavior: MockBehavior) -> TestEnvironment {
    let mut env = TestEnvironment::new().unwrap();
    env.init_plugin_checkout().unwrap();
    env.add_mock_executable("mysql", behavior).unwrap();
    env
}

#[tokio::test]
async fn setup_provisions_the_whole_site() {
    let env = hermetic_env(MockBehavior::AlwaysSucceed);
    let mut server = Server::new_async().await;
    let download = mock_platform_archive(&mut server, 1).await;
    let reactivate = mock_reactivation(&mut server, 200, 1).await;

    let provisioner = Provisioner::new(
        env.provision_options(&archive_url(&server)).unwrap(),
        Client::new(),
        ScriptedDatabase::new(env.mock_path("mysql")),
    );
    let progress = RecordingProgress::default();

    let report = provisioner
        .run(&environment_for(&server), &progress)
        .await
        .unwrap();

    download.assert_async().await;
    reactivate.assert_async().await;

    assert_eq!(report.tree.root(), env.workspace_path("typecho-master"));
    assert_eq!(provisioner.database().recreated(), vec!["typecho"]);
    assert_eq!(
        env.get_mock_calls("mysql").unwrap(),
        vec!["-u root --password=root typecho"]
    );
    assert_eq!(
        env.captured_stdin("mysql").unwrap(),
        std::fs::read_to_string(env.work_path.join("tests/typecho.sql")).unwrap()
    );

    let config =
        std::fs::read_to_string(env.workspace_path("typecho-master/config.inc.php")).unwrap();
    assert!(config.contains("\"host\" => \"127.0.0.1\""));
    assert!(config.contains("\"database\" => \"typecho\""));

    let bootstrap =
        std::fs::read_to_string(env.workspace_path("typecho-master/reactivate_restful.php"))
            .unwrap();
    assert!(bootstrap.contains("Restful_Plugin::deactivate();"));

    for name in ["Plugin.php", "Action.php"] {
        let installed = env.workspace_path(&format!("typecho-master/usr/plugins/Restful/{name}"));
        assert_eq!(
            std::fs::read(installed).unwrap(),
            std::fs::read(env.work_path.join(name)).unwrap()
        );
    }

    // Intermediate files stay next to the tree
    assert!(env.workspace_path("master.tar.gz").is_file());
    assert!(env.workspace_path("master.tar").is_file());
    assert_eq!(progress.scaled().last(), Some(&1000));
}

#[tokio::test]
async fn second_setup_reuses_the_extracted_tree() {
    let env = hermetic_env(MockBehavior::AlwaysSucceed);
    let mut server = Server::new_async().await;
    let download = mock_platform_archive(&mut server, 1).await;
    let reactivate = mock_reactivation(&mut server, 200, 2).await;

    let provisioner = Provisioner::new(
        env.provision_options(&archive_url(&server)).unwrap(),
        Client::new(),
        ScriptedDatabase::new(env.mock_path("mysql")),
    );
    let environment = environment_for(&server);

    provisioner.run(&environment, &NoProgress).await.unwrap();

    // A marker inside the tree survives the second run
    let marker = env.workspace_path("typecho-master/usr/uploads/keep.txt");
    std::fs::create_dir_all(marker.parent().unwrap()).unwrap();
    std::fs::write(&marker, "kept").unwrap();

    provisioner.run(&environment, &NoProgress).await.unwrap();

    download.assert_async().await;
    reactivate.assert_async().await;
    assert!(marker.is_file());
    assert_eq!(provisioner.database().recreated().len(), 2);
    assert_eq!(env.get_mock_calls("mysql").unwrap().len(), 2);
}

#[tokio::test]
async fn failing_schema_load_stops_the_sequence() {
    let env = hermetic_env(MockBehavior::AlwaysFail {
        error: "ERROR 1045 (28000): Access denied for user 'root'@'localhost'".to_string(),
        code: 1,
    });
    let mut server = Server::new_async().await;
    let _download = mock_platform_archive(&mut server, 1).await;
    let reactivate = mock_reactivation(&mut server, 200, 0).await;

    let provisioner = Provisioner::new(
        env.provision_options(&archive_url(&server)).unwrap(),
        Client::new(),
        ScriptedDatabase::new(env.mock_path("mysql")),
    );

    let err = provisioner
        .run(&environment_for(&server), &NoProgress)
        .await
        .unwrap_err();

    match err {
        ProvisionError::SchemaLoad { code, stderr, .. } => {
            assert_eq!(code, Some(1));
            assert!(stderr.contains("Access denied"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    reactivate.assert_async().await;
    assert!(!env.workspace_path("typecho-master/config.inc.php").exists());
}

#[tokio::test]
async fn reactivation_error_status_is_not_fatal() {
    let env = hermetic_env(MockBehavior::AlwaysSucceed);
    let mut server = Server::new_async().await;
    let _download = mock_platform_archive(&mut server, 1).await;
    let reactivate = mock_reactivation(&mut server, 500, 1).await;

    let provisioner = Provisioner::new(
        env.provision_options(&archive_url(&server)).unwrap(),
        Client::new(),
        ScriptedDatabase::new(env.mock_path("mysql")),
    );

    let result = provisioner
        .run(&environment_for(&server), &NoProgress)
        .await;

    reactivate.assert_async().await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn setup_command_runs_from_environment_variables() {
    let env = hermetic_env(MockBehavior::AlwaysSucceed);
    let mut server = Server::new_async().await;
    let download = mock_platform_archive(&mut server, 1).await;
    let reactivate = mock_reactivation(&mut server, 200, 1).await;

    let endpoint = endpoint_for(&server);
    let environment = EnvironmentConfig::from_pairs([
        ("MYSQL_HOST", "127.0.0.1".to_string()),
        ("MYSQL_USER", "ci".to_string()),
        ("MYSQL_PWD", "secret".to_string()),
        ("MYSQL_DB", "typecho_test".to_string()),
        ("WEB_SERVER_HOST", endpoint.host),
        ("WEB_SERVER_PORT", endpoint.port),
    ])
    .unwrap();

    let provisioner = Provisioner::new(
        env.provision_options(&archive_url(&server)).unwrap(),
        Client::new(),
        ScriptedDatabase::new(env.mock_path("mysql")),
    );

    execute_command_with(Commands::Setup, &provisioner, &environment, &NoProgress)
        .await
        .unwrap();

    download.assert_async().await;
    reactivate.assert_async().await;
    assert_eq!(
        env.get_mock_calls("mysql").unwrap(),
        vec!["-u ci --password=secret typecho_test"]
    );
}

/// Needs a reachable MySQL server and `mysql` on PATH; reads MYSQL_* from the
/// environment.
#[tokio::test]
#[ignore]
async fn real_mysql_database_is_recreated_and_loaded() {
    let env = hermetic_env(MockBehavior::AlwaysSucceed);
    let credentials = {
        use testbed_lib::provision::EnvironmentProvider;
        EnvironmentConfig::load()
            .unwrap()
            .database_credentials()
            .unwrap()
    };

    let provisioner = Provisioner::new(
        env.provision_options("https://github.com/typecho/typecho/archive/master.tar.gz")
            .unwrap(),
        Client::new(),
        MySqlDatabase::default(),
    );

    provisioner.provision_database(&credentials).await.unwrap();
}
