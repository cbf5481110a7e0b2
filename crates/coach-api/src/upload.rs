//! Scoped storage for uploaded request bodies.

use std::path::{Path, PathBuf};

use tracing::warn;

use coach_models::UploadId;

/// One stored upload, keyed by a generated id.
///
/// The file is deleted on every exit path: callers invoke [`remove`] after
/// processing regardless of outcome, and `Drop` covers panics in between.
///
/// [`remove`]: StoredUpload::remove
pub struct StoredUpload {
    path: PathBuf,
    removed: bool,
}

impl StoredUpload {
    /// Persist uploaded bytes under a generated key.
    ///
    /// Only the extension is taken from the client-supplied filename; the
    /// storage key itself is a fresh [`UploadId`], so concurrent uploads
    /// sharing a name never collide.
    pub async fn persist(
        dir: &Path,
        original_name: Option<&str>,
        bytes: &[u8],
    ) -> std::io::Result<Self> {
        let id = UploadId::new();
        let ext = original_name
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .unwrap_or("mp4");
        let path = dir.join(format!("{}.{}", id, ext));

        tokio::fs::write(&path, bytes).await?;

        Ok(Self {
            path,
            removed: false,
        })
    }

    /// Path of the stored file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the stored file.
    pub async fn remove(mut self) {
        self.removed = true;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            warn!("Failed to remove stored upload {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if !self.removed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_persist_uses_generated_key_with_client_extension() {
        let dir = tempfile::tempdir().unwrap();
        let upload = StoredUpload::persist(dir.path(), Some("game night.mov"), b"bytes")
            .await
            .unwrap();

        let name = upload.path().file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(".mov"));
        assert!(!name.contains("game"));
        assert!(upload.path().exists());

        upload.remove().await;
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_missing_filename_defaults_extension() {
        let dir = tempfile::tempdir().unwrap();
        let upload = StoredUpload::persist(dir.path(), None, b"bytes").await.unwrap();
        assert!(upload.path().to_str().unwrap().ends_with(".mp4"));
        upload.remove().await;
    }

    #[tokio::test]
    async fn test_drop_removes_file_as_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let upload = StoredUpload::persist(dir.path(), Some("a.mp4"), b"bytes")
                .await
                .unwrap();
            upload.path().to_path_buf()
            // upload dropped here without remove()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_same_filename_no_collision() {
        let dir = tempfile::tempdir().unwrap();
        let a = StoredUpload::persist(dir.path(), Some("clip.mp4"), b"a").await.unwrap();
        let b = StoredUpload::persist(dir.path(), Some("clip.mp4"), b"b").await.unwrap();
        assert_ne!(a.path(), b.path());
        a.remove().await;
        b.remove().await;
    }
}
