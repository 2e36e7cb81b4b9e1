//! Configuration loading
//!
//! Coordinates loading configuration from its sources:
//! defaults -> .env files -> environment -> CLI.

use crate::primitives::ConfigError;
use clap::Parser;

use super::{
    cli::{Cli, CliConfig},
    config::AppConfig,
    env::EnvironmentConfig,
};

/// Env files read from the current directory, first one wins per variable
pub const ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Load env files into the process environment; missing files are skipped
pub fn load_env_files() -> Result<(), ConfigError> {
    for env_file in ENV_FILES {
        if let Err(e) = dotenvy::from_filename(env_file) {
            if !e.not_found() {
                return Err(ConfigError::EnvFileError {
                    file: env_file.to_string(),
                    source: e,
                });
            }
        }
    }
    Ok(())
}

impl CliConfig {
    /// Load config: defaults -> .env -> env vars -> CLI
    pub fn load() -> Result<Self, ConfigError> {
        load_env_files()?;
        let environment = EnvironmentConfig::load()?;
        Self::from_cli(Cli::parse(), environment)
    }

    /// Layer parsed CLI values and environment over the defaults, then validate
    pub fn from_cli(cli: Cli, environment: EnvironmentConfig) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();

        // Standard color variables sit below explicit CLI flags
        config.color = environment.apply_color_config(config.color);

        let mut config = config.merge_with(cli.config);
        config.validate()?;

        Ok(Self {
            app_config: config,
            command: cli.command,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    include!("loader.test.rs");
}
