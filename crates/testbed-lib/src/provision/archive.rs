//! Platform archive download and extraction

use super::progress::ProgressSink;
use super::{ExtractedTree, ProvisionError, ProvisionOptions};
use crate::fsutil::{DEFAULT_DIR_MODE, RemoveMode, delete_tree, mkdirs};
use flate2::read::GzDecoder;
use reqwest::{Client, Url};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tar::Archive;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const FALLBACK_ARCHIVE_NAME: &str = "archive.tar.gz";

/// Ensures the platform tree exists inside the workspace
pub struct ArchiveFetcher {
    client: Client,
    workspace: PathBuf,
    url: String,
    tree_name: String,
}

impl ArchiveFetcher {
    pub fn new(client: Client, options: &ProvisionOptions) -> Self {
        Self {
            client,
            workspace: options.workspace.clone(),
            url: options.archive_url.clone(),
            tree_name: options.tree_name.clone(),
        }
    }

    /// Return the extracted tree, downloading and unpacking it first if the
    /// workspace does not already hold it. An existing tree is trusted as is.
    pub async fn ensure_tree(
        &self,
        sink: &dyn ProgressSink,
    ) -> Result<ExtractedTree, ProvisionError> {
        let tree_root = self.workspace.join(&self.tree_name);
        if tree_root.is_dir() {
            info!(root = %tree_root.display(), "platform already downloaded");
            return Ok(ExtractedTree::new(tree_root));
        }

        info!(url = %self.url, "downloading platform archive");

        if let Err(e) = delete_tree(&self.workspace, RemoveMode::Tree) {
            warn!(workspace = %self.workspace.display(), error = %e, "could not clear workspace");
        }
        mkdirs(&self.workspace, DEFAULT_DIR_MODE)
            .map_err(|e| ProvisionError::io(&self.workspace, e))?;

        let archive_path = self.workspace.join(archive_file_name(&self.url));
        self.download(&archive_path, sink).await?;
        info!("download completed");

        info!(archive = %archive_path.display(), "extracting");
        let tar_path = decompress(&archive_path)?;
        extract(&tar_path, &self.workspace)?;

        if !tree_root.is_dir() {
            return Err(ProvisionError::MissingTree { path: tree_root });
        }

        Ok(ExtractedTree::new(tree_root))
    }

    async fn download(&self, path: &Path, sink: &dyn ProgressSink) -> Result<(), ProvisionError> {
        let download_error = |source| ProvisionError::Download {
            url: self.url.clone(),
            source,
        };

        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(download_error)?;

        let total = response.content_length().unwrap_or(0);
        debug!(total, "response received");

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| ProvisionError::io(path, e))?;

        let mut downloaded: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(download_error)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| ProvisionError::io(path, e))?;
            downloaded += chunk.len() as u64;
            sink.update(downloaded, total);
        }

        file.flush().await.map_err(|e| ProvisionError::io(path, e))?;
        sink.finish();

        debug!(bytes = downloaded, path = %path.display(), "archive written");
        Ok(())
    }
}

/// Last path segment of the archive URL
pub fn archive_file_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_ARCHIVE_NAME.to_string())
}

/// Where the gzip layer of `archive` is decompressed to; never `archive` itself
pub fn decompressed_path(archive: &Path) -> PathBuf {
    match archive.extension() {
        Some(ext) if ext == "gz" || ext == "tgz" => {
            let stripped = archive.with_extension("");
            if ext == "gz" && stripped.extension().is_some_and(|inner| inner == "tar") {
                stripped
            } else {
                stripped.with_extension("tar")
            }
        }
        _ => {
            let mut name = archive.as_os_str().to_os_string();
            name.push(".tar");
            PathBuf::from(name)
        }
    }
}

/// Strip the gzip layer, writing the tar next to the archive
pub fn decompress(archive: &Path) -> Result<PathBuf, ProvisionError> {
    let archive_error = |source| ProvisionError::Archive {
        path: archive.to_path_buf(),
        source,
    };

    let tar_path = decompressed_path(archive);
    let input = File::open(archive).map_err(archive_error)?;
    let mut decoder = GzDecoder::new(BufReader::new(input));

    let output = File::create(&tar_path).map_err(|e| ProvisionError::io(&tar_path, e))?;
    let mut writer = BufWriter::new(output);
    io::copy(&mut decoder, &mut writer).map_err(archive_error)?;
    writer.flush().map_err(|e| ProvisionError::io(&tar_path, e))?;

    Ok(tar_path)
}

/// Unpack a tar file into `destination`
pub fn extract(tar_path: &Path, destination: &Path) -> Result<(), ProvisionError> {
    let archive_error = |source| ProvisionError::Archive {
        path: tar_path.to_path_buf(),
        source,
    };

    let file = File::open(tar_path).map_err(archive_error)?;
    let mut archive = Archive::new(BufReader::new(file));
    archive.set_preserve_permissions(false);
    archive.set_unpack_xattrs(false);
    archive.unpack(destination).map_err(archive_error)
}

#[cfg(test)]
mod tests {
    include!("archive.test.rs");
}
