//! Filesystem fixtures
//!
//! Every fixture owns a temporary directory that is removed on drop, so
//! tests never share state on disk.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Minimal plugin entry point with the class name the bootstrap script calls
pub const PLUGIN_SOURCE: &str = "<?php\nclass Restful_Plugin implements Typecho_Plugin_Interface\n{\n    public static function activate() {}\n    public static function deactivate() {}\n}\n";

/// Minimal plugin action handler
pub const ACTION_SOURCE: &str =
    "<?php\nclass Restful_Action extends Typecho_Widget implements Widget_Interface_Do\n{\n}\n";

/// Small schema dump standing in for the real one
pub const SCHEMA_DUMP: &str = "CREATE TABLE `typecho_options` (\n  `name` varchar(32) NOT NULL,\n  `user` int(10) unsigned NOT NULL default '0',\n  `value` text\n);\n";

/// Temporary directory fixture with automatic cleanup
pub struct TempDirFixture {
    /// The temporary directory (automatically cleaned up on drop)
    pub temp_dir: TempDir,
}

impl TempDirFixture {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a subdirectory, parents included
    pub fn create_dir(&self, subdir: &str) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(self.path().join(subdir))?;
        Ok(())
    }

    /// Write a file, creating its parent directories
    pub fn write_file(
        &self,
        file_path: &str,
        content: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let full_path = self.path().join(file_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&full_path, content)?;
        Ok(())
    }

    pub fn read_file(&self, file_path: &str) -> Result<String, Box<dyn std::error::Error>> {
        Ok(fs::read_to_string(self.path().join(file_path))?)
    }

    pub fn file_exists(&self, file_path: &str) -> bool {
        self.path().join(file_path).exists()
    }

    /// Write `Plugin.php` and `Action.php` into `dir`
    pub fn write_plugin_sources(&self, dir: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.write_file(&format!("{dir}/Plugin.php"), PLUGIN_SOURCE)?;
        self.write_file(&format!("{dir}/Action.php"), ACTION_SOURCE)?;
        Ok(())
    }

    /// Write a small schema dump at `file_path`
    pub fn write_schema_dump(&self, file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.write_file(file_path, SCHEMA_DUMP)
    }
}

/// Build a gzip-compressed tarball whose entries all sit under `tree_name/`,
/// the way a source archive from a forge unpacks.
pub fn platform_archive(tree_name: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{tree_name}/{name}"), content.as_bytes())
            .expect("append archive entry");
    }

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .expect("finish archive")
}

#[cfg(test)]
mod tests {
    include!("filesystem.test.rs");
}
