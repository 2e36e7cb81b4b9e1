//! Environment variable handling
//!
//! Reads the credentials and server address the provisioning steps need,
//! plus the standard color and CI conventions.

use crate::primitives::{ColorIntent, ConfigError};
use crate::provision::{DatabaseCredentials, EnvironmentProvider, ServerEndpoint};
use serde::Deserialize;

/// Environment variables that affect application behavior
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentConfig {
    /// MYSQL_HOST: database server host
    pub mysql_host: Option<String>,
    /// MYSQL_USER: database user
    pub mysql_user: Option<String>,
    /// MYSQL_PWD: database password, may be empty
    pub mysql_pwd: Option<String>,
    /// MYSQL_DB: database to recreate
    pub mysql_db: Option<String>,
    /// WEB_SERVER_HOST: host serving the extracted tree
    pub web_server_host: Option<String>,
    /// WEB_SERVER_PORT: port serving the extracted tree
    pub web_server_port: Option<String>,
    /// NO_COLOR environment variable (any value = disable color)
    pub no_color: Option<String>,
    /// FORCE_COLOR environment variable (0/false = disable, 1/2/3/true = enable)
    pub force_color: Option<String>,
    /// CLICOLOR environment variable (0 = disable color)
    pub clicolor: Option<String>,
    /// CI environment variable (any value = CI mode)
    pub ci: Option<String>,
}

impl EnvironmentConfig {
    /// Load environment configuration from current environment
    pub fn load() -> Result<Self, ConfigError> {
        Ok(envy::from_env()?)
    }

    /// Load from explicit key/value pairs instead of the process environment
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs.into_iter().map(|(k, v)| (k.into(), v.into()));
        Ok(envy::from_iter(vars)?)
    }

    /// Running under a CI service
    pub fn is_ci(&self) -> bool {
        self.ci.is_some()
    }

    /// Apply environment variables to color configuration
    ///
    /// Precedence: CI > CLICOLOR < NO_COLOR < FORCE_COLOR
    pub fn apply_color_config(&self, mut color: ColorIntent) -> ColorIntent {
        // 1. CI detection (disable interactive features)
        if self.is_ci() {
            return ColorIntent::Never;
        }

        // 2. CLICOLOR=0 (BSD/macOS standard - disable color)
        if self.clicolor.as_deref() == Some("0") {
            color = ColorIntent::Never;
        }

        // 3. NO_COLOR (universal standard - any non-empty value disables color)
        if self.no_color.as_deref().is_some_and(|v| !v.is_empty()) {
            color = ColorIntent::Never;
        }

        // 4. FORCE_COLOR (highest precedence)
        if let Some(force_color) = &self.force_color {
            match force_color.as_str() {
                "0" | "false" => color = ColorIntent::Never,
                "1" | "2" | "3" | "true" => color = ColorIntent::Always,
                _ => {} // Invalid values ignored
            }
        }

        color
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .clone()
        .ok_or(ConfigError::MissingVariable { name })
}

impl EnvironmentProvider for EnvironmentConfig {
    fn database_credentials(&self) -> Result<DatabaseCredentials, ConfigError> {
        Ok(DatabaseCredentials {
            host: required(&self.mysql_host, "MYSQL_HOST")?,
            user: required(&self.mysql_user, "MYSQL_USER")?,
            password: required(&self.mysql_pwd, "MYSQL_PWD")?,
            database: required(&self.mysql_db, "MYSQL_DB")?,
        })
    }

    fn server_endpoint(&self) -> Result<ServerEndpoint, ConfigError> {
        Ok(ServerEndpoint {
            host: required(&self.web_server_host, "WEB_SERVER_HOST")?,
            port: required(&self.web_server_port, "WEB_SERVER_PORT")?,
        })
    }
}

#[cfg(test)]
mod tests {
    include!("env.test.rs");
}
