//! Recording test doubles for the provisioning seams

use crate::primitives::ConfigError;
use crate::provision::progress::scaled_progress;
use crate::provision::{
    DatabaseBackend, DatabaseCredentials, EnvironmentProvider, ProgressSink, ProvisionError,
    ServerEndpoint,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Progress sink that keeps every update
#[derive(Debug, Default)]
pub struct RecordingProgress {
    updates: Mutex<Vec<(u64, u64)>>,
    finished: AtomicBool,
}

impl RecordingProgress {
    /// Raw `(downloaded, total)` pairs in arrival order
    pub fn updates(&self) -> Vec<(u64, u64)> {
        self.updates.lock().map(|u| u.clone()).unwrap_or_default()
    }

    /// Updates scaled to `0..=1000`, skipping those with an unknown total
    pub fn scaled(&self) -> Vec<u64> {
        self.updates()
            .into_iter()
            .filter_map(|(downloaded, total)| scaled_progress(downloaded, total))
            .collect()
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl ProgressSink for RecordingProgress {
    fn update(&self, downloaded: u64, total: u64) {
        if let Ok(mut updates) = self.updates.lock() {
            updates.push((downloaded, total));
        }
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}

/// A call received by [`RecordingDatabase`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseCall {
    Recreate { database: String },
    LoadSchema { database: String, dump: PathBuf },
}

/// Database backend that records calls instead of touching a server
#[derive(Debug, Default)]
pub struct RecordingDatabase {
    calls: Mutex<Vec<DatabaseCall>>,
    fail_schema_load: bool,
}

impl RecordingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every schema load fail the way a rejected dump does
    pub fn failing_schema_load() -> Self {
        Self {
            fail_schema_load: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<DatabaseCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: DatabaseCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl DatabaseBackend for RecordingDatabase {
    async fn recreate(&self, credentials: &DatabaseCredentials) -> Result<(), ProvisionError> {
        self.record(DatabaseCall::Recreate {
            database: credentials.database.clone(),
        });
        Ok(())
    }

    async fn load_schema(
        &self,
        credentials: &DatabaseCredentials,
        dump: &Path,
    ) -> Result<(), ProvisionError> {
        self.record(DatabaseCall::LoadSchema {
            database: credentials.database.clone(),
            dump: dump.to_path_buf(),
        });

        if self.fail_schema_load {
            return Err(ProvisionError::SchemaLoad {
                dump: dump.to_path_buf(),
                code: Some(1),
                stderr: "ERROR 1046 (3D000): No database selected".to_string(),
            });
        }
        Ok(())
    }
}

/// Environment provider with fixed values; `None` reads as unset
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    pub credentials: Option<DatabaseCredentials>,
    pub endpoint: Option<ServerEndpoint>,
}

impl StaticEnvironment {
    pub fn new(credentials: DatabaseCredentials, endpoint: ServerEndpoint) -> Self {
        Self {
            credentials: Some(credentials),
            endpoint: Some(endpoint),
        }
    }

    /// Local defaults matching a CI MySQL service and PHP's built-in server
    pub fn local(port: &str) -> Self {
        Self::new(
            DatabaseCredentials {
                host: "127.0.0.1".to_string(),
                user: "root".to_string(),
                password: "root".to_string(),
                database: "typecho".to_string(),
            },
            ServerEndpoint {
                host: "127.0.0.1".to_string(),
                port: port.to_string(),
            },
        )
    }
}

impl EnvironmentProvider for StaticEnvironment {
    fn database_credentials(&self) -> Result<DatabaseCredentials, ConfigError> {
        self.credentials
            .clone()
            .ok_or(ConfigError::MissingVariable { name: "MYSQL_HOST" })
    }

    fn server_endpoint(&self) -> Result<ServerEndpoint, ConfigError> {
        self.endpoint.clone().ok_or(ConfigError::MissingVariable {
            name: "WEB_SERVER_HOST",
        })
    }
}
