//! Site configuration and plugin installation

use super::templates::{BOOTSTRAP_TEMPLATE, SITE_CONFIG_TEMPLATE, TemplateEngine};
use super::{DatabaseCredentials, ExtractedTree, PLUGIN_FILES, ProvisionError};
use crate::fsutil::{DEFAULT_DIR_MODE, RemoveMode, delete_tree, mkdirs};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Files written into the extracted tree by an install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub config_file: PathBuf,
    pub plugin_files: Vec<PathBuf>,
    pub bootstrap_script: PathBuf,
}

/// Writes the generated files and the plugin sources into a tree
pub struct SiteInstaller {
    plugin_source: PathBuf,
    engine: TemplateEngine,
}

impl SiteInstaller {
    pub fn new(plugin_source: &Path) -> Result<Self, ProvisionError> {
        Ok(Self {
            plugin_source: plugin_source.to_path_buf(),
            engine: TemplateEngine::new()?,
        })
    }

    /// Site config, then plugin files, then the bootstrap script
    pub fn install(
        &mut self,
        tree: &ExtractedTree,
        credentials: &DatabaseCredentials,
    ) -> Result<InstallReport, ProvisionError> {
        let config_file = self.write_site_config(tree, credentials)?;
        let plugin_files = self.install_plugin(tree)?;
        let bootstrap_script = self.write_bootstrap_script(tree)?;

        Ok(InstallReport {
            config_file,
            plugin_files,
            bootstrap_script,
        })
    }

    /// Render `config.inc.php` and write it over any existing one
    pub fn write_site_config(
        &mut self,
        tree: &ExtractedTree,
        credentials: &DatabaseCredentials,
    ) -> Result<PathBuf, ProvisionError> {
        self.engine.set_credentials(credentials);
        let content = self.engine.render_template(SITE_CONFIG_TEMPLATE)?;

        let path = tree.config_file();
        fs::write(&path, content).map_err(|e| ProvisionError::io(&path, e))?;
        info!(path = %path.display(), "site config written");
        Ok(path)
    }

    /// Recreate the plugin directory and copy the plugin sources into it
    pub fn install_plugin(&self, tree: &ExtractedTree) -> Result<Vec<PathBuf>, ProvisionError> {
        let plugin_dir = tree.plugin_dir();

        if let Err(e) = delete_tree(&plugin_dir, RemoveMode::Tree) {
            warn!(dir = %plugin_dir.display(), error = %e, "could not clear plugin directory");
        }
        mkdirs(&plugin_dir, DEFAULT_DIR_MODE).map_err(|e| ProvisionError::io(&plugin_dir, e))?;

        let mut installed = Vec::with_capacity(PLUGIN_FILES.len());
        for name in PLUGIN_FILES {
            let source = self.plugin_source.join(name);
            let target = plugin_dir.join(name);
            fs::copy(&source, &target).map_err(|e| ProvisionError::io(&source, e))?;
            debug!(from = %source.display(), to = %target.display(), "copied plugin file");
            installed.push(target);
        }

        info!(dir = %plugin_dir.display(), "plugin installed");
        Ok(installed)
    }

    /// Write the script that deactivates and reactivates the plugin
    pub fn write_bootstrap_script(&self, tree: &ExtractedTree) -> Result<PathBuf, ProvisionError> {
        let content = self.engine.render_template(BOOTSTRAP_TEMPLATE)?;

        let path = tree.bootstrap_script();
        fs::write(&path, content).map_err(|e| ProvisionError::io(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    include!("installer.test.rs");
}
