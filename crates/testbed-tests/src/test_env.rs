//! Hermetic test environment for E2E testing
//!
//! Creates an isolated plugin checkout with a mock `mysql` executable, so the
//! whole provisioning sequence runs without a database server.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use testbed_lib::application::AppConfig;
use testbed_lib::provision::{
    DatabaseBackend, DatabaseCredentials, MySqlDatabase, ProvisionError, ProvisionOptions,
};
use testbed_lib::testing::filesystem::{ACTION_SOURCE, PLUGIN_SOURCE, SCHEMA_DUMP};

/// Hermetic test environment with mock executables
pub struct TestEnvironment {
    /// Temporary directory for the test environment
    pub temp_dir: TempDir,
    /// Path to the test environment root
    pub root_path: PathBuf,
    /// Path to the bin directory containing mock executables
    pub bin_path: PathBuf,
    /// Plugin checkout the provisioner runs from
    pub work_path: PathBuf,
    /// Mock executable configurations
    mock_executables: HashMap<String, MockExecutable>,
}

/// Configuration for a mock executable
#[derive(Debug, Clone)]
pub struct MockExecutable {
    /// Name of the executable
    pub name: String,
    /// Mock implementation behavior
    pub behavior: MockBehavior,
    /// Log file path for recording calls
    pub log_path: PathBuf,
    /// File receiving everything written to the executable's stdin
    pub stdin_path: PathBuf,
}

/// Mock executable behavior configuration
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Always succeed with empty output
    AlwaysSucceed,
    /// Always fail with an error message and exit code
    AlwaysFail { error: String, code: i32 },
}

impl TestEnvironment {
    /// Create a new hermetic test environment
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root_path = temp_dir.path().to_path_buf();
        let bin_path = root_path.join("bin");
        let work_path = root_path.join("work");

        fs::create_dir_all(&bin_path)?;
        fs::create_dir_all(&work_path)?;

        Ok(Self {
            temp_dir,
            root_path,
            bin_path,
            work_path,
            mock_executables: HashMap::new(),
        })
    }

    /// Add a mock executable to the environment
    pub fn add_mock_executable(&mut self, name: &str, behavior: MockBehavior) -> Result<PathBuf> {
        let log_path = self.root_path.join(format!("{name}.log"));
        let stdin_path = self.root_path.join(format!("{name}.stdin"));
        let executable_path = self.bin_path.join(name);

        let script = generate_mock_script(name, &behavior, &log_path, &stdin_path);
        fs::write(&executable_path, script)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&executable_path)?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&executable_path, perms)?;
        }

        self.mock_executables.insert(
            name.to_string(),
            MockExecutable {
                name: name.to_string(),
                behavior,
                log_path,
                stdin_path,
            },
        );

        Ok(executable_path)
    }

    pub fn mock_path(&self, name: &str) -> PathBuf {
        self.bin_path.join(name)
    }

    /// Get the log contents for a mock executable
    pub fn get_mock_log(&self, executable_name: &str) -> Result<String> {
        match self.mock_executables.get(executable_name) {
            Some(mock) if mock.log_path.exists() => Ok(fs::read_to_string(&mock.log_path)?),
            _ => Ok(String::new()),
        }
    }

    /// Get the argument lists of every call made to a mock executable
    pub fn get_mock_calls(&self, executable_name: &str) -> Result<Vec<String>> {
        let prefix = format!("{executable_name} ");
        Ok(self
            .get_mock_log(executable_name)?
            .lines()
            .filter_map(|line| line.strip_prefix(&prefix).map(str::to_string))
            .collect())
    }

    /// Everything the last call to a mock executable read from stdin
    pub fn captured_stdin(&self, executable_name: &str) -> Result<String> {
        let mock = self
            .mock_executables
            .get(executable_name)
            .with_context(|| format!("no mock executable named {executable_name}"))?;
        Ok(fs::read_to_string(&mock.stdin_path)?)
    }

    /// Lay out a plugin checkout: the two plugin files and the schema dump
    pub fn init_plugin_checkout(&self) -> Result<()> {
        fs::write(self.work_path.join("Plugin.php"), PLUGIN_SOURCE)?;
        fs::write(self.work_path.join("Action.php"), ACTION_SOURCE)?;
        fs::create_dir_all(self.work_path.join("tests"))?;
        fs::write(self.work_path.join("tests/typecho.sql"), SCHEMA_DUMP)?;
        Ok(())
    }

    /// Validated application config rooted at the checkout
    pub fn app_config(&self, archive_url: &str) -> Result<AppConfig> {
        let mut config = AppConfig {
            workdir: Some(self.work_path.clone()),
            archive_url: archive_url.to_string(),
            mysql_client: self.mock_path("mysql"),
            no_progress: true,
            ..AppConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn provision_options(&self, archive_url: &str) -> Result<ProvisionOptions> {
        Ok(self.app_config(archive_url)?.to_provision_options())
    }

    /// Path inside the default workspace
    pub fn workspace_path(&self, relative: &str) -> PathBuf {
        self.work_path.join("tmp").join(relative)
    }
}

/// Generate mock script content for an executable
fn generate_mock_script(
    name: &str,
    behavior: &MockBehavior,
    log_path: &Path,
    stdin_path: &Path,
) -> String {
    let behavior_code = match behavior {
        MockBehavior::AlwaysSucceed => "exit 0".to_string(),
        MockBehavior::AlwaysFail { error, code } => format!("echo '{error}' >&2\nexit {code}"),
    };

    format!(
        r#"#!/bin/sh
# Mock executable: {name}
echo "{name} $*" >> "{log}"
cat > "{stdin}"
{behavior_code}
"#,
        log = log_path.display(),
        stdin = stdin_path.display(),
    )
}

/// Database backend that records the reset and loads the schema through a
/// real client program, normally a mock executable
pub struct ScriptedDatabase {
    client: MySqlDatabase,
    recreated: Mutex<Vec<String>>,
}

impl ScriptedDatabase {
    pub fn new(client_program: PathBuf) -> Self {
        Self {
            client: MySqlDatabase::new(client_program),
            recreated: Mutex::new(Vec::new()),
        }
    }

    /// Names of the databases recreated so far
    pub fn recreated(&self) -> Vec<String> {
        self.recreated.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl DatabaseBackend for ScriptedDatabase {
    async fn recreate(&self, credentials: &DatabaseCredentials) -> Result<(), ProvisionError> {
        if let Ok(mut recreated) = self.recreated.lock() {
            recreated.push(credentials.database.clone());
        }
        Ok(())
    }

    async fn load_schema(
        &self,
        credentials: &DatabaseCredentials,
        dump: &Path,
    ) -> Result<(), ProvisionError> {
        self.client.load_schema(credentials, dump).await
    }
}
