use clap::{Parser, Subcommand};

use super::config::AppConfig;
use super::env::EnvironmentConfig;

/// testbed CLI - disposable Typecho site for Restful plugin integration tests
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "testbed")]
#[command(about = "Provision a throwaway Typecho site for the Restful plugin's integration tests")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration options
    #[command(flatten)]
    pub config: AppConfig,

    /// testbed commands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Configuration assembled from the command line and the environment
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub app_config: AppConfig,
    pub command: Option<Commands>,
    pub environment: EnvironmentConfig,
}

/// Available testbed commands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Run every step: fetch, database, install, reactivate
    Setup,

    /// Download and unpack the platform archive unless already present
    Fetch,

    /// Recreate the site database and load the schema dump
    Database,

    /// Write config.inc.php, the plugin files and the bootstrap script
    Install,

    /// Ask the running server to reactivate the plugin
    Reactivate,

    /// Delete the workspace
    Clean {
        /// Keep the workspace directory itself, removing only its contents
        #[arg(long, help = "Remove the workspace contents but keep the directory")]
        keep_root: bool,
    },
}

#[cfg(test)]
mod tests {
    include!("cli.test.rs");
}
