//! Local filesystem storage for staged attachments
//!
//! Every staged file gets a generated, collision-free name so concurrent
//! submissions never share a path. Removal is idempotent: a file that is
//! already gone counts as removed.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::config::UploadConfig;

/// Longest extension carried over from the original file name
const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid storage name: {0}")]
    InvalidName(String),
}

/// An attachment already written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// File name as sent by the client
    pub original_name: String,
    /// Generated name the file is stored under
    pub storage_name: String,
    /// Size in bytes
    pub size: i64,
    pub mime_type: String,
}

/// Filesystem area holding staged and committed attachments
#[derive(Debug, Clone)]
pub struct AttachmentStorage {
    dir: PathBuf,
    public_base_url: String,
}

impl AttachmentStorage {
    pub fn new(config: &UploadConfig) -> Self {
        Self::with_dir(config.dir.clone(), &config.public_base_url)
    }

    pub fn with_dir(dir: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })
    }

    /// Whether the upload directory exists and is a directory
    pub async fn is_accessible(&self) -> bool {
        tokio::fs::metadata(&self.dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    fn resolve(&self, storage_name: &str) -> Result<PathBuf, StorageError> {
        if storage_name.is_empty()
            || storage_name.contains(['/', '\\'])
            || storage_name.starts_with('.')
        {
            return Err(StorageError::InvalidName(storage_name.to_string()));
        }
        Ok(self.dir.join(storage_name))
    }

    /// Write `data` under a freshly generated name.
    pub async fn stage(
        &self,
        original_name: &str,
        mime_type: &str,
        data: &[u8],
    ) -> Result<StagedFile, StorageError> {
        let storage_name = generate_storage_name(original_name, mime_type);
        let path = self.resolve(&storage_name)?;

        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(io_err)?;

        let written: std::io::Result<()> = async {
            file.write_all(data).await?;
            file.flush().await
        }
        .await;

        if let Err(source) = written {
            drop(file);
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!("Failed to remove partially written {}: {}", path.display(), e);
            }
            return Err(StorageError::Io { path, source });
        }

        debug!(
            "Staged attachment '{}' as {} ({} bytes)",
            original_name,
            storage_name,
            data.len()
        );

        Ok(StagedFile {
            original_name: original_name.to_string(),
            storage_name,
            size: data.len() as i64,
            mime_type: mime_type.to_string(),
        })
    }

    /// Delete a stored file. No-op if absent.
    pub async fn remove(&self, storage_name: &str) -> Result<(), StorageError> {
        let path = self.resolve(storage_name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    /// Best-effort removal of every file in `files`. Failures are logged and
    /// skipped; the number of files that could not be removed is returned.
    pub async fn cleanup(&self, files: &[StagedFile]) -> usize {
        let mut failed = 0;
        for file in files {
            if let Err(e) = self.remove(&file.storage_name).await {
                warn!(
                    "Failed to clean up staged attachment {}: {}",
                    file.storage_name, e
                );
                failed += 1;
            }
        }
        if !files.is_empty() {
            debug!(
                "Cleaned up {} of {} staged attachment(s)",
                files.len() - failed,
                files.len()
            );
        }
        failed
    }

    /// Public URL a stored file is served from
    pub fn public_url(&self, storage_name: &str) -> String {
        format!(
            "{}/uploads/{}",
            self.public_base_url,
            urlencoding::encode(storage_name)
        )
    }
}

/// Generate a unique storage name: `{unix_millis}-{uuid}{.ext}`
pub fn generate_storage_name(original_name: &str, mime_type: &str) -> String {
    let stem = format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    );
    match extension_for(original_name, mime_type) {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem,
    }
}

/// Extension for a stored file: the original's when it is short and
/// alphanumeric, otherwise one derived from the MIME type.
pub fn extension_for(original_name: &str, mime_type: &str) -> Option<String> {
    let from_name = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LEN
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| e.to_ascii_lowercase());

    from_name.or_else(|| get_extension_from_content_type(mime_type).map(str::to_string))
}

/// Get file extension from content type, ignoring case
fn get_extension_from_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "application/pdf" => Some("pdf"),
        "application/msword" => Some("doc"),
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Some("docx"),
        _ => None,
    }
}
