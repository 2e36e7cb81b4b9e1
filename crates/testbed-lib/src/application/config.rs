//! Application configuration management
//!
//! Handles config loading, validation, and environment variable processing
//! following the precedence: defaults -> .env -> env vars -> CLI args.

use crate::networking::NetworkingConfig;
use crate::primitives::*;
use crate::provision::ProvisionOptions;
use clap::Parser;
use reqwest::Url;
use std::path::{Path, PathBuf};

/// Default configuration values
pub mod defaults {
    pub const WORKSPACE: &str = "tmp";
    pub const ARCHIVE_URL: &str = "https://github.com/typecho/typecho/archive/master.tar.gz";
    pub const TREE_NAME: &str = "typecho-master";
    pub const SCHEMA_DUMP: &str = "tests/typecho.sql";
    pub const PLUGIN_SOURCE: &str = ".";
    pub const MYSQL_CLIENT: &str = "mysql";
    pub const LOG_LEVEL: &str = "2"; // Step progress visible by default
    pub const LOG_FORMAT: &str = "text";
    pub const LOG_OUTPUT: &str = "stderr";
    pub const COLOR: &str = "auto";
}

/// Default value functions for configuration fields
mod default_fns {
    use super::defaults;
    use crate::primitives::{ColorIntent, LogFormat, LogOutput};
    use std::path::PathBuf;

    pub fn workspace() -> PathBuf {
        PathBuf::from(defaults::WORKSPACE)
    }

    pub fn schema_dump() -> PathBuf {
        PathBuf::from(defaults::SCHEMA_DUMP)
    }

    pub fn plugin_source() -> PathBuf {
        PathBuf::from(defaults::PLUGIN_SOURCE)
    }

    pub fn mysql_client() -> PathBuf {
        PathBuf::from(defaults::MYSQL_CLIENT)
    }

    pub fn log_level() -> u8 {
        2
    }

    pub fn log_format() -> LogFormat {
        LogFormat::Text
    }

    pub fn log_output() -> LogOutput {
        LogOutput::Stderr
    }

    pub fn color() -> ColorIntent {
        ColorIntent::Auto
    }
}

/// Application configuration structure
#[derive(Debug, Clone, Parser)]
pub struct AppConfig {
    /// Working directory that relative paths resolve against
    #[arg(short, long, env = "TESTBED_WORKDIR", global = true)]
    pub workdir: Option<PathBuf>,

    /// Staging directory for the archive and the extracted tree
    #[arg(long, env = "TESTBED_WORKSPACE", default_value = defaults::WORKSPACE, global = true)]
    pub workspace: PathBuf,

    /// Platform release archive to download
    #[arg(long, env = "TESTBED_ARCHIVE_URL", default_value = defaults::ARCHIVE_URL, global = true)]
    pub archive_url: String,

    /// Directory name the archive unpacks to
    #[arg(long, env = "TESTBED_TREE_NAME", default_value = defaults::TREE_NAME, global = true)]
    pub tree_name: String,

    /// SQL dump loaded into the fresh database
    #[arg(long, env = "TESTBED_SCHEMA_DUMP", default_value = defaults::SCHEMA_DUMP, global = true)]
    pub schema_dump: PathBuf,

    /// Directory holding Plugin.php and Action.php
    #[arg(long, env = "TESTBED_PLUGIN_SOURCE", default_value = defaults::PLUGIN_SOURCE, global = true)]
    pub plugin_source: PathBuf,

    /// MySQL command-line client used to load the dump
    #[arg(long, env = "TESTBED_MYSQL_CLIENT", default_value = defaults::MYSQL_CLIENT, global = true)]
    pub mysql_client: PathBuf,

    /// HTTP timeout in seconds (unbounded when unset)
    #[arg(long, env = "TESTBED_NET_TIMEOUT", global = true)]
    pub net_timeout: Option<u64>,

    /// Disable the download progress bar
    #[arg(long, env = "TESTBED_NO_PROGRESS", global = true)]
    pub no_progress: bool,

    /// Verbosity level (0=error, 1=warn, 2=info, 3=debug, 4=trace)
    #[arg(long, env = "TESTBED_LOG_LEVEL", default_value = defaults::LOG_LEVEL, global = true)]
    pub log_level: u8,

    /// Log format (text, json, pretty)
    #[arg(long, env = "TESTBED_LOG_FORMAT", default_value = defaults::LOG_FORMAT, global = true)]
    pub log_format: LogFormat,

    /// Log output stream (stderr, stdout)
    #[arg(long, env = "TESTBED_LOG_OUTPUT", default_value = defaults::LOG_OUTPUT, global = true)]
    pub log_output: LogOutput,

    /// Color output control (auto, always, never)
    #[arg(short, long, env = "TESTBED_COLOR", default_value = defaults::COLOR, global = true)]
    pub color: ColorIntent,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workdir: None,
            workspace: default_fns::workspace(),
            archive_url: defaults::ARCHIVE_URL.to_string(),
            tree_name: defaults::TREE_NAME.to_string(),
            schema_dump: default_fns::schema_dump(),
            plugin_source: default_fns::plugin_source(),
            mysql_client: default_fns::mysql_client(),
            net_timeout: None,
            no_progress: false,
            log_level: default_fns::log_level(),
            log_format: default_fns::log_format(),
            log_output: default_fns::log_output(),
            color: default_fns::color(),
        }
    }
}

impl AppConfig {
    /// Create LoggerConfig; `is_terminal` describes the selected output stream
    pub fn to_logger_config(&self, is_terminal: bool) -> LoggerConfig {
        LoggerConfig {
            level: LogLevel::from_verbosity(self.log_level),
            format: self.log_format,
            output: self.log_output,
            ansi: self.color.resolve(is_terminal),
        }
    }

    pub fn to_networking_config(&self) -> NetworkingConfig {
        NetworkingConfig {
            timeout_seconds: self.net_timeout,
            ..NetworkingConfig::default()
        }
    }

    pub fn to_provision_options(&self) -> ProvisionOptions {
        ProvisionOptions {
            workspace: self.workspace.clone(),
            archive_url: self.archive_url.clone(),
            tree_name: self.tree_name.clone(),
            schema_dump: self.schema_dump.clone(),
            plugin_source: self.plugin_source.clone(),
        }
    }

    /// Merge this config with another, taking non-default values from other
    pub fn merge_with(mut self, other: Self) -> Self {
        // For Option fields, take other if it's Some
        if other.workdir.is_some() {
            self.workdir = other.workdir;
        }
        if other.net_timeout.is_some() {
            self.net_timeout = other.net_timeout;
        }

        if other.workspace != default_fns::workspace() {
            self.workspace = other.workspace;
        }
        if other.archive_url != defaults::ARCHIVE_URL {
            self.archive_url = other.archive_url;
        }
        if other.tree_name != defaults::TREE_NAME {
            self.tree_name = other.tree_name;
        }
        if other.schema_dump != default_fns::schema_dump() {
            self.schema_dump = other.schema_dump;
        }
        if other.plugin_source != default_fns::plugin_source() {
            self.plugin_source = other.plugin_source;
        }
        if other.mysql_client != default_fns::mysql_client() {
            self.mysql_client = other.mysql_client;
        }

        if other.no_progress {
            self.no_progress = true;
        }
        if other.log_level != default_fns::log_level() {
            self.log_level = other.log_level;
        }

        // For enums, detect if it's non-default
        if !matches!(other.log_format, LogFormat::Text) {
            self.log_format = other.log_format;
        }
        if !matches!(other.log_output, LogOutput::Stderr) {
            self.log_output = other.log_output;
        }
        if !matches!(other.color, ColorIntent::Auto) {
            self.color = other.color;
        }

        self
    }

    /// Validate the final configuration and anchor relative paths at the
    /// working directory
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let workdir = match self.workdir.take() {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        self.workspace = anchor(&workdir, &self.workspace);
        self.schema_dump = anchor(&workdir, &self.schema_dump);
        self.plugin_source = anchor(&workdir, &self.plugin_source);

        // A bare program name is looked up on PATH
        if self.mysql_client.components().count() > 1 {
            self.mysql_client = anchor(&workdir, &self.mysql_client);
        }

        if Url::parse(&self.archive_url).is_err() {
            return Err(ConfigError::ParseError {
                value: self.archive_url.clone(),
                reason: "archive URL is not a valid absolute URL".to_string(),
            });
        }

        if self.tree_name.is_empty() || self.tree_name.contains(['/', '\\']) || self.tree_name == ".."
        {
            return Err(ConfigError::ParseError {
                value: self.tree_name.clone(),
                reason: "tree name must be a single directory name".to_string(),
            });
        }

        self.workdir = Some(workdir);
        Ok(())
    }
}

fn anchor(workdir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workdir.join(path)
    }
}

#[cfg(test)]
mod tests {
    include!("config.test.rs");
}
