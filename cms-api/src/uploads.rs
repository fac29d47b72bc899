/// Uploaded file storage
///
/// Files are written under `<UPLOAD_DIR>/<kind directory>/` and served
/// statically at `/uploads/...`. Metadata lives in the collections; this
/// module only handles bytes on disk.

use bytes::Bytes;
use cms_shared::models::media::MediaKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};

/// A file accepted from a multipart request
#[derive(Debug, Clone)]
pub struct Upload {
    /// Name of the file on the client
    pub original_name: String,

    /// Declared content type
    pub content_type: String,

    pub bytes: Bytes,
}

/// A file written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated file name
    pub filename: String,

    /// Public URL path
    pub path: String,

    /// Size in bytes
    pub size: u64,
}

/// Upload directory handle
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Upload root, served at `/uploads`
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, kind: MediaKind) -> PathBuf {
        self.root.join(kind.directory())
    }

    /// Creates the directory of every media kind
    pub async fn prepare(&self) -> std::io::Result<()> {
        for kind in [MediaKind::Image, MediaKind::Video, MediaKind::Logo] {
            fs::create_dir_all(self.dir(kind)).await?;
        }

        info!(root = %self.root.display(), "Upload directories ready");
        Ok(())
    }

    /// Writes an upload under a generated name
    pub async fn save(&self, kind: MediaKind, upload: &Upload) -> ApiResult<StoredFile> {
        let filename = kind.stored_name(&upload.original_name, rand::random::<u32>() % 1_000_000_000);
        let dir = self.dir(kind);

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to create {}: {}", dir.display(), e)))?;

        let target = dir.join(&filename);
        fs::write(&target, &upload.bytes)
            .await
            .map_err(|e| ApiError::InternalError(format!("Failed to write {}: {}", target.display(), e)))?;

        debug!(file = %target.display(), size = upload.bytes.len(), "Upload stored");

        Ok(StoredFile {
            path: kind.public_path(&filename),
            filename,
            size: upload.bytes.len() as u64,
        })
    }

    /// Removes a stored file, logging instead of failing
    pub async fn remove(&self, kind: MediaKind, filename: &str) {
        // Stored names never contain separators; anything else is not ours
        if filename.is_empty() || filename.contains(['/', '\\']) || filename.contains("..") {
            warn!(filename, "Refusing to remove suspicious upload name");
            return;
        }

        let target = self.dir(kind).join(filename);
        match fs::remove_file(&target).await {
            Ok(()) => debug!(file = %target.display(), "Upload removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = %target.display(), "Upload already gone");
            }
            Err(e) => warn!(file = %target.display(), error = %e, "Failed to remove upload"),
        }
    }
}
