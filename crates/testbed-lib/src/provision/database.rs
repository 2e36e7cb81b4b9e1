//! Site database reset and schema load

use super::{DatabaseCredentials, ProvisionError};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Default name of the MySQL command-line client
pub const DEFAULT_MYSQL_CLIENT: &str = "mysql";

/// Operations the provisioner needs from the database server
pub trait DatabaseBackend {
    /// Drop the named database if it exists and create it empty
    fn recreate(
        &self,
        credentials: &DatabaseCredentials,
    ) -> impl Future<Output = Result<(), ProvisionError>>;

    /// Feed a SQL dump into the named database
    fn load_schema(
        &self,
        credentials: &DatabaseCredentials,
        dump: &Path,
    ) -> impl Future<Output = Result<(), ProvisionError>>;
}

/// MySQL server reached over the wire for the reset and through the
/// `mysql` client binary for the dump
#[derive(Debug, Clone)]
pub struct MySqlDatabase {
    client_program: PathBuf,
}

impl Default for MySqlDatabase {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_MYSQL_CLIENT))
    }
}

impl MySqlDatabase {
    pub fn new(client_program: PathBuf) -> Self {
        Self { client_program }
    }

    pub fn client_program(&self) -> &Path {
        &self.client_program
    }
}

impl DatabaseBackend for MySqlDatabase {
    async fn recreate(&self, credentials: &DatabaseCredentials) -> Result<(), ProvisionError> {
        let options = MySqlConnectOptions::new()
            .host(&credentials.host)
            .username(&credentials.user)
            .password(&credentials.password)
            .disable_statement_logging();

        let mut connection = MySqlConnection::connect_with(&options).await?;

        let statement = recreate_statement(&credentials.database);
        sqlx::raw_sql(&statement).execute(&mut connection).await?;
        connection.close().await?;

        debug!(database = %credentials.database, "database recreated");
        Ok(())
    }

    async fn load_schema(
        &self,
        credentials: &DatabaseCredentials,
        dump: &Path,
    ) -> Result<(), ProvisionError> {
        let input = std::fs::File::open(dump).map_err(|e| ProvisionError::io(dump, e))?;

        let output = Command::new(&self.client_program)
            .args(schema_load_args(credentials))
            .stdin(Stdio::from(input))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ProvisionError::SchemaClient {
                program: self.client_program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProvisionError::SchemaLoad {
                dump: dump.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!(dump = %dump.display(), "schema dump loaded");
        Ok(())
    }
}

/// Quote a MySQL identifier with backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Drop-then-create batch for the site database
pub fn recreate_statement(database: &str) -> String {
    let name = quote_identifier(database);
    format!("DROP DATABASE IF EXISTS {name};\nCREATE DATABASE {name};")
}

/// Arguments for the `mysql` client; the host is left to the client default
pub fn schema_load_args(credentials: &DatabaseCredentials) -> Vec<String> {
    vec![
        "-u".to_string(),
        credentials.user.clone(),
        format!("--password={}", credentials.password),
        credentials.database.clone(),
    ]
}

#[cfg(test)]
mod tests {
    include!("database.test.rs");
}
