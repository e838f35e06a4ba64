// src/upload.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tokio::fs;
use uuid::Uuid;

/// Hard cap on a single uploaded file.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted for covers and standalone media uploads.
pub const ALLOWED_MIME_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "video/mp4",
    "video/webm",
];

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File exceeds the {0} byte limit")]
    TooLarge(usize),

    #[error("No file uploaded")]
    MissingFile,

    #[error("IO error: {0}")]
    Io(String),
}

/// Upload rules and destination, constructed once at startup and injected
/// into the route layer. Validation always runs before any byte reaches
/// disk.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    allowed_mime_types: HashSet<String>,
    max_bytes: usize,
    dest_dir: PathBuf,
    url_prefix: String,
}

impl UploadPolicy {
    pub fn new(dest_dir: impl AsRef<Path>) -> Self {
        Self {
            allowed_mime_types: ALLOWED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            max_bytes: MAX_UPLOAD_BYTES,
            dest_dir: dest_dir.as_ref().to_path_buf(),
            url_prefix: "/uploads".to_string(),
        }
    }

    pub fn dest_dir(&self) -> &Path {
        &self.dest_dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn allowed_mime_types(&self) -> Vec<&str> {
        self.allowed_mime_types.iter().map(|m| m.as_str()).collect()
    }

    /// Checks MIME type and size against the policy.
    pub fn validate(&self, mime: &str, size: usize) -> Result<(), UploadError> {
        if !self.allowed_mime_types.contains(mime) {
            return Err(UploadError::UnsupportedType(mime.to_string()));
        }
        if size > self.max_bytes {
            return Err(UploadError::TooLarge(self.max_bytes));
        }
        Ok(())
    }

    /// Validates and writes the file under the destination directory,
    /// returning its public URL.
    pub async fn store(
        &self,
        original_name: &str,
        mime: &str,
        data: &[u8],
    ) -> Result<String, UploadError> {
        self.validate(mime, data.len())?;

        fs::create_dir_all(&self.dest_dir)
            .await
            .map_err(|e| UploadError::Io(e.to_string()))?;

        let filename = unique_filename(original_name);
        let path = self.dest_dir.join(&filename);

        fs::write(&path, data)
            .await
            .map_err(|e| UploadError::Io(e.to_string()))?;

        tracing::debug!(file = %path.display(), size = data.len(), "Stored upload");

        Ok(format!("{}/{}", self.url_prefix, filename))
    }
}

/// Collision-resistant filename: millisecond timestamp plus a random
/// suffix, preserving the original extension.
fn unique_filename(original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default();

    format!("{}-{}{}", Utc::now().timestamp_millis(), Uuid::new_v4().simple(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn dir_entry_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn store_writes_file_and_returns_public_url() {
        let dir = tempdir().unwrap();
        let policy = UploadPolicy::new(dir.path());

        let url = policy
            .store("photo.JPG", "image/jpeg", b"fake jpeg data")
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".jpg"));

        let filename = url.rsplit('/').next().unwrap();
        let stored = std::fs::read(dir.path().join(filename)).unwrap();
        assert_eq!(stored, b"fake jpeg data");
    }

    #[tokio::test]
    async fn disallowed_mime_is_rejected_before_any_write() {
        let dir = tempdir().unwrap();
        let policy = UploadPolicy::new(dir.path());

        let err = policy
            .store("notes.txt", "text/plain", b"hello")
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::UnsupportedType(_)));
        assert_eq!(dir_entry_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn oversize_file_is_rejected_before_any_write() {
        let dir = tempdir().unwrap();
        let policy = UploadPolicy::new(dir.path());

        let data = vec![0u8; MAX_UPLOAD_BYTES + 1];
        let err = policy.store("big.png", "image/png", &data).await.unwrap_err();

        assert!(matches!(err, UploadError::TooLarge(_)));
        assert_eq!(dir_entry_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn size_at_the_limit_is_accepted() {
        let dir = tempdir().unwrap();
        let policy = UploadPolicy::new(dir.path());

        let data = vec![0u8; MAX_UPLOAD_BYTES];
        policy.store("edge.png", "image/png", &data).await.unwrap();
        assert_eq!(dir_entry_count(dir.path()), 1);
    }

    #[test]
    fn filenames_preserve_extension_and_do_not_collide() {
        let a = unique_filename("movie.mp4");
        let b = unique_filename("movie.mp4");

        assert!(a.ends_with(".mp4"));
        assert_ne!(a, b);

        // No extension on the original name: none appended.
        assert!(!unique_filename("raw").contains('.'));
    }
}
