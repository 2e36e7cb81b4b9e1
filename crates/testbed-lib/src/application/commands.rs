//! Command execution handlers
//!
//! Each command maps to one provisioning step, or the whole sequence for
//! `setup`. Handlers receive the provisioner, the environment and the
//! progress sink, so tests can run them against doubles.

use crate::application::{CliConfig, Commands};
use crate::fsutil::{Deletion, RemoveMode, delete_tree};
use crate::networking::NetworkingManager;
use crate::primitives::LogContext;
use crate::provision::{
    BarProgress, DatabaseBackend, EnvironmentProvider, ExtractedTree, MySqlDatabase, NoProgress,
    ProgressSink, Provisioner,
};
use crate::{log_info, log_warn};
use anyhow::{Context, Result};

/// Execute CLI commands against the real MySQL server and network
pub async fn execute_command(config: CliConfig) -> Result<()> {
    let Some(command) = config.command else {
        println!("testbed - disposable Typecho site for Restful plugin tests");
        println!("Run 'testbed --help' for usage information");
        return Ok(());
    };

    let app = config.app_config;
    let networking = NetworkingManager::new(app.to_networking_config())
        .context("Failed to set up HTTP client")?;
    let database = MySqlDatabase::new(app.mysql_client.clone());
    let provisioner = Provisioner::new(
        app.to_provision_options(),
        networking.client().clone(),
        database,
    );

    let show_progress = !app.no_progress && !config.environment.is_ci();
    let bar;
    let sink: &dyn ProgressSink = if show_progress {
        bar = BarProgress::new("Downloading platform archive");
        &bar
    } else {
        &NoProgress
    };

    execute_command_with(command, &provisioner, &config.environment, sink).await
}

/// Execute a specific command with a provided provisioner (for testing)
pub async fn execute_command_with<D: DatabaseBackend>(
    command: Commands,
    provisioner: &Provisioner<D>,
    environment: &dyn EnvironmentProvider,
    sink: &dyn ProgressSink,
) -> Result<()> {
    match command {
        Commands::Setup => handle_setup(provisioner, environment, sink).await,
        Commands::Fetch => handle_fetch(provisioner, sink).await,
        Commands::Database => handle_database(provisioner, environment).await,
        Commands::Install => handle_install(provisioner, environment),
        Commands::Reactivate => handle_reactivate(provisioner, environment).await,
        Commands::Clean { keep_root } => handle_clean(provisioner, keep_root),
    }
}

async fn handle_setup<D: DatabaseBackend>(
    provisioner: &Provisioner<D>,
    environment: &dyn EnvironmentProvider,
    sink: &dyn ProgressSink,
) -> Result<()> {
    let report = provisioner
        .run(environment, sink)
        .await
        .context("Setup failed")?;

    log_info!(
        &format!("Site ready at {}", report.tree.root().display()),
        LogContext::new("setup")
    );
    Ok(())
}

async fn handle_fetch<D: DatabaseBackend>(
    provisioner: &Provisioner<D>,
    sink: &dyn ProgressSink,
) -> Result<()> {
    let tree = provisioner
        .fetch(sink)
        .await
        .context("Failed to fetch platform archive")?;

    log_info!(&format!("Platform tree at {}", tree.root().display()));
    Ok(())
}

async fn handle_database<D: DatabaseBackend>(
    provisioner: &Provisioner<D>,
    environment: &dyn EnvironmentProvider,
) -> Result<()> {
    let credentials = environment.database_credentials()?;
    provisioner
        .provision_database(&credentials)
        .await
        .with_context(|| format!("Failed to provision database '{}'", credentials.database))?;

    log_info!(&format!("Database '{}' ready", credentials.database));
    Ok(())
}

fn handle_install<D: DatabaseBackend>(
    provisioner: &Provisioner<D>,
    environment: &dyn EnvironmentProvider,
) -> Result<()> {
    let options = provisioner.options();
    let tree = ExtractedTree::locate(&options.workspace, &options.tree_name)
        .context("Run 'testbed fetch' first")?;
    let credentials = environment.database_credentials()?;

    let report = provisioner
        .install(&tree, &credentials)
        .context("Failed to install site files")?;

    log_info!(
        &format!(
            "Installed {} plugin files into {}",
            report.plugin_files.len(),
            tree.plugin_dir().display()
        ),
        LogContext::new("install")
    );
    Ok(())
}

async fn handle_reactivate<D: DatabaseBackend>(
    provisioner: &Provisioner<D>,
    environment: &dyn EnvironmentProvider,
) -> Result<()> {
    let endpoint = environment.server_endpoint()?;
    let url = provisioner
        .reactivate(&endpoint)
        .await
        .context("Failed to trigger plugin reactivation")?;

    log_info!(&format!("Requested {url}"));
    Ok(())
}

fn handle_clean<D: DatabaseBackend>(provisioner: &Provisioner<D>, keep_root: bool) -> Result<()> {
    let workspace = &provisioner.options().workspace;
    let mode = if keep_root {
        RemoveMode::ChildrenOnly
    } else {
        RemoveMode::Tree
    };

    let deletion = delete_tree(workspace, mode)
        .with_context(|| format!("Failed to clean {}", workspace.display()))?;

    match deletion {
        Deletion::Removed => log_info!(&format!("Removed {}", workspace.display())),
        Deletion::NotFound => log_warn!(&format!("Nothing to clean at {}", workspace.display())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    include!("commands.test.rs");
}
