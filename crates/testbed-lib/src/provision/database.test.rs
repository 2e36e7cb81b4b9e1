use super::*;
use crate::testing::TempDirFixture;

fn credentials() -> DatabaseCredentials {
    DatabaseCredentials {
        host: "localhost".to_string(),
        user: "root".to_string(),
        password: "pa ss".to_string(),
        database: "typecho".to_string(),
    }
}

#[test]
fn test_recreate_statement_drops_then_creates() {
    assert_eq!(
        recreate_statement("typecho"),
        "DROP DATABASE IF EXISTS `typecho`;\nCREATE DATABASE `typecho`;"
    );
}

#[test]
fn test_quote_identifier_doubles_backticks() {
    assert_eq!(quote_identifier("a`b"), "`a``b`");
    assert_eq!(quote_identifier("typecho-test"), "`typecho-test`");
}

#[test]
fn test_schema_load_args() {
    assert_eq!(
        schema_load_args(&credentials()),
        vec!["-u", "root", "--password=pa ss", "typecho"]
    );
}

#[test]
fn test_default_client_program() {
    assert_eq!(
        MySqlDatabase::default().client_program(),
        Path::new(DEFAULT_MYSQL_CLIENT)
    );
}

#[tokio::test]
async fn test_recreate_unreachable_server_is_database_error() {
    let credentials = DatabaseCredentials {
        host: "mysql.invalid".to_string(),
        ..credentials()
    };

    let err = MySqlDatabase::default()
        .recreate(&credentials)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Database { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_load_schema_missing_dump() {
    let fixture = TempDirFixture::new().unwrap();
    let database = MySqlDatabase::default();

    let err = database
        .load_schema(&credentials(), &fixture.path().join("missing.sql"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Io { .. }));
}

#[tokio::test]
async fn test_load_schema_missing_client() {
    let fixture = TempDirFixture::new().unwrap();
    fixture.write_schema_dump("typecho.sql").unwrap();
    let database = MySqlDatabase::new(fixture.path().join("no-such-mysql"));

    let err = database
        .load_schema(&credentials(), &fixture.path().join("typecho.sql"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::SchemaClient { .. }));
}

#[cfg(unix)]
mod client_script {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn mock_client(fixture: &TempDirFixture, body: &str) -> PathBuf {
        let script = format!("#!/bin/sh\n{body}\n");
        fixture.write_file("bin/mysql", &script).unwrap();
        let path = fixture.path().join("bin/mysql");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_schema_pipes_dump_to_client() {
        let fixture = TempDirFixture::new().unwrap();
        fixture.write_schema_dump("typecho.sql").unwrap();
        let log = fixture.path().join("calls.log");
        let stdin = fixture.path().join("stdin.sql");
        let client = mock_client(
            &fixture,
            &format!(
                "echo \"$@\" > '{}'\ncat > '{}'",
                log.display(),
                stdin.display()
            ),
        );

        MySqlDatabase::new(client)
            .load_schema(&credentials(), &fixture.path().join("typecho.sql"))
            .await
            .unwrap();

        let args = std::fs::read_to_string(&log).unwrap();
        assert_eq!(args.trim(), "-u root --password=pa ss typecho");
        assert_eq!(
            std::fs::read_to_string(&stdin).unwrap(),
            fixture.read_file("typecho.sql").unwrap()
        );
    }

    #[tokio::test]
    async fn test_load_schema_nonzero_exit_fails() {
        let fixture = TempDirFixture::new().unwrap();
        fixture.write_schema_dump("typecho.sql").unwrap();
        let client = mock_client(
            &fixture,
            "cat > /dev/null\necho 'ERROR 1064 (42000): syntax error' >&2\nexit 1",
        );

        let err = MySqlDatabase::new(client)
            .load_schema(&credentials(), &fixture.path().join("typecho.sql"))
            .await
            .unwrap_err();

        match err {
            ProvisionError::SchemaLoad { code, stderr, .. } => {
                assert_eq!(code, Some(1));
                assert!(stderr.contains("ERROR 1064"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
