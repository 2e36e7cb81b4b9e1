//! # testbed Library
//!
//! Provisions a disposable Typecho site for the Restful plugin's
//! integration tests.
//!
//! ## Core Modules
//!
//! - [`primitives`] - Foundation types and error taxonomy
//! - [`fsutil`] - Recursive directory removal and creation
//! - [`logger`] - Structured logging with progress bar integration
//! - [`networking`] - Shared HTTP client
//! - [`provision`] - Archive fetch, database reset, site install, reactivation
//! - [`application`] - CLI interface and configuration management
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! testbed_lib::main().await
//! # }
//! ```

pub mod application;
pub mod fsutil;
pub mod logger;
pub mod networking;
pub mod primitives;
pub mod provision;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types for convenience
pub use application::{AppConfig, Cli, Commands, execute_command};
pub use logger::Logger;
pub use networking::{NetworkingConfig, NetworkingManager};
pub use primitives::{ColorIntent, ConfigError, LogFormat, LogLevel, LogOutput, LoggerError};
pub use provision::{ProvisionError, Provisioner};

use anyhow::Result;
use application::CliConfig;
use std::io::IsTerminal;

pub async fn main() -> Result<()> {
    let config = CliConfig::load()?;

    let is_terminal = match config.app_config.log_output {
        LogOutput::Stderr => std::io::stderr().is_terminal(),
        LogOutput::Stdout => std::io::stdout().is_terminal(),
    };
    Logger::init(config.app_config.to_logger_config(is_terminal))?;

    execute_command(config).await
}
