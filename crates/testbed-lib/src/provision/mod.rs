//! Test-site provisioning
//!
//! Stands up a disposable Typecho site for the Restful plugin's integration
//! tests: fetch the platform archive, reset the database, write the site
//! config, install the plugin, then ask the running server to reactivate it.
//!
//! Error policy: cleanup deletes are best effort (logged and ignored), every
//! other step fails fast and aborts the sequence. Nothing is retried and
//! nothing is rolled back.

pub mod archive;
pub mod database;
pub mod installer;
pub mod progress;
pub mod reactivate;
pub mod templates;

pub use archive::ArchiveFetcher;
pub use database::{DatabaseBackend, MySqlDatabase};
pub use installer::{InstallReport, SiteInstaller};
pub use progress::{BarProgress, NoProgress, ProgressSink};
pub use reactivate::Reactivator;
pub use templates::{TemplateEngine, TemplateError};

use crate::primitives::ConfigError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the plugin under test, as Typecho knows it
pub const PLUGIN_NAME: &str = "Restful";

/// Plugin source files copied into the site, relative to the plugin source dir
pub const PLUGIN_FILES: [&str; 2] = ["Plugin.php", "Action.php"];

/// Site configuration file written at the tree root
pub const CONFIG_FILE_NAME: &str = "config.inc.php";

/// Bootstrap script that deactivates and reactivates the plugin when requested
pub const BOOTSTRAP_SCRIPT_NAME: &str = "reactivate_restful.php";

/// Typecho's plugin root, relative to the tree root
pub const PLUGIN_ROOT: &str = "usr/plugins";

const SETUP_STEPS: u64 = 4;

/// Provisioning errors
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to unpack archive {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Extracted tree not found at {}", .path.display())]
    MissingTree { path: PathBuf },

    #[error("Database command failed: {source}")]
    Database {
        #[from]
        source: sqlx::Error,
    },

    #[error("Failed to run database client '{}': {source}", .program.display())]
    SchemaClient {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Loading schema dump {} failed (exit code {code:?}): {stderr}", .dump.display())]
    SchemaLoad {
        dump: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Reactivation request to {url} failed: {source}")]
    Reactivate {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ProvisionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Credentials for the MySQL server hosting the site database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseCredentials {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

/// Address of the web server that serves the extracted tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub host: String,
    pub port: String,
}

/// Source of the externally supplied settings each step needs.
///
/// Values are resolved at the step that first needs them, so a missing
/// variable only fails the run once that step is reached.
pub trait EnvironmentProvider {
    fn database_credentials(&self) -> Result<DatabaseCredentials, ConfigError>;

    fn server_endpoint(&self) -> Result<ServerEndpoint, ConfigError>;
}

/// Root of the unpacked platform tree.
///
/// Produced by the fetch step and handed to every later step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTree {
    root: PathBuf,
}

impl ExtractedTree {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Find an already extracted tree inside `workspace`
    pub fn locate(workspace: &Path, tree_name: &str) -> Result<Self, ProvisionError> {
        let root = workspace.join(tree_name);
        if !root.is_dir() {
            return Err(ProvisionError::MissingTree { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn plugin_dir(&self) -> PathBuf {
        self.root.join(PLUGIN_ROOT).join(PLUGIN_NAME)
    }

    pub fn bootstrap_script(&self) -> PathBuf {
        self.root.join(BOOTSTRAP_SCRIPT_NAME)
    }
}

/// Paths and locations the provisioner works with
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    /// Staging directory for the download and the extracted tree
    pub workspace: PathBuf,
    /// Release archive of the host platform
    pub archive_url: String,
    /// Directory name the archive unpacks to
    pub tree_name: String,
    /// SQL dump loaded into the fresh database
    pub schema_dump: PathBuf,
    /// Directory holding the plugin's source files
    pub plugin_source: PathBuf,
}

/// Everything a completed setup produced
#[derive(Debug, Clone)]
pub struct SetupReport {
    pub tree: ExtractedTree,
    pub install: InstallReport,
    pub reactivation_url: String,
}

/// Runs the provisioning steps in order
pub struct Provisioner<D> {
    options: ProvisionOptions,
    client: Client,
    database: D,
}

impl<D: DatabaseBackend> Provisioner<D> {
    pub fn new(options: ProvisionOptions, client: Client, database: D) -> Self {
        Self {
            options,
            client,
            database,
        }
    }

    pub fn options(&self) -> &ProvisionOptions {
        &self.options
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    /// Download and unpack the platform archive unless it is already there
    pub async fn fetch(&self, sink: &dyn ProgressSink) -> Result<ExtractedTree, ProvisionError> {
        ArchiveFetcher::new(self.client.clone(), &self.options)
            .ensure_tree(sink)
            .await
    }

    /// Recreate the site database and load the schema dump into it
    pub async fn provision_database(
        &self,
        credentials: &DatabaseCredentials,
    ) -> Result<(), ProvisionError> {
        info!(database = %credentials.database, "recreating database");
        self.database.recreate(credentials).await?;

        info!(dump = %self.options.schema_dump.display(), "loading schema dump");
        self.database
            .load_schema(credentials, &self.options.schema_dump)
            .await
    }

    /// Write the site config, the plugin files and the bootstrap script
    pub fn install(
        &self,
        tree: &ExtractedTree,
        credentials: &DatabaseCredentials,
    ) -> Result<InstallReport, ProvisionError> {
        SiteInstaller::new(&self.options.plugin_source)?.install(tree, credentials)
    }

    /// Ask the running server to deactivate and reactivate the plugin
    pub async fn reactivate(&self, endpoint: &ServerEndpoint) -> Result<String, ProvisionError> {
        Reactivator::new(self.client.clone()).trigger(endpoint).await
    }

    /// Full sequence: fetch, database, config and plugin, reactivation
    pub async fn run(
        &self,
        environment: &dyn EnvironmentProvider,
        sink: &dyn ProgressSink,
    ) -> Result<SetupReport, ProvisionError> {
        info!(step = 1, total = SETUP_STEPS, "fetching platform archive");
        let tree = self.fetch(sink).await?;

        info!(step = 2, total = SETUP_STEPS, "provisioning database");
        let credentials = environment.database_credentials()?;
        self.provision_database(&credentials).await?;

        info!(step = 3, total = SETUP_STEPS, "installing site config and plugin");
        let install = self.install(&tree, &credentials)?;

        info!(step = 4, total = SETUP_STEPS, "triggering plugin reactivation");
        let endpoint = environment.server_endpoint()?;
        let reactivation_url = self.reactivate(&endpoint).await?;

        info!(root = %tree.root().display(), "setup complete");
        Ok(SetupReport {
            tree,
            install,
            reactivation_url,
        })
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
