use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{AppError, Result};
use crate::models::{Category, DeleteResponse, FileEntry, FileListResponse};
use crate::services::digest;
use crate::storage::{is_safe_filename, FileStore};

/// File service
pub struct FileService;

impl FileService {
    /// Scan every stored file for one whose content digest matches
    /// `candidate_digest`, returning the first match in category order.
    ///
    /// Each file is re-hashed in full on every scan; there is no digest
    /// cache, so this is O(n) in the number of stored files. The
    /// candidate's own path is excluded to avoid a guaranteed self-match.
    /// Files that cannot be hashed are logged and skipped.
    ///
    /// Known race: the check-then-accept sequence is not serialized
    /// across requests, so two concurrent uploads of identical bytes can
    /// both pass the scan and both be accepted.
    pub async fn find_duplicate(
        store: &FileStore,
        candidate_path: &Path,
        candidate_digest: &str,
    ) -> Option<PathBuf> {
        for (path, _) in store.list_all().await {
            if path == candidate_path {
                continue;
            }
            match digest::file_digest(&path).await {
                Ok(existing) if existing == candidate_digest => return Some(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Error checking file {:?}: {}", path, e);
                }
            }
        }
        None
    }

    /// List all stored files grouped by category. Metadata comes from
    /// fresh stat calls; unreadable entries are logged and skipped.
    pub async fn list_files(store: &FileStore) -> FileListResponse {
        let mut response = FileListResponse::default();

        for (path, category) in store.list_all().await {
            let metadata = match fs::metadata(&path).await {
                Ok(m) => m,
                Err(e) => {
                    tracing::error!("Error processing file {:?}: {}", path, e);
                    continue;
                }
            };
            if !metadata.is_file() {
                continue;
            }

            let filename = match path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            let date: DateTime<Utc> = metadata
                .modified()
                .map(DateTime::from)
                .unwrap_or_else(|_| Utc::now());

            response.push(
                category,
                FileEntry {
                    path: format!("/uploads/{}/{}", category.dir_name(), filename),
                    filename,
                    file_type: category.label(),
                    size: metadata.len(),
                    date,
                },
            );
        }

        response
    }

    /// Delete a stored file by its generated filename, searching the
    /// category directories in order
    pub async fn delete_file(store: &FileStore, filename: &str) -> Result<DeleteResponse> {
        // Reject anything that could resolve outside the upload roots
        // before touching the filesystem
        if !is_safe_filename(filename) {
            return Err(AppError::PathTraversal);
        }

        for category in Category::ALL {
            let path = store.category_dir(category).join(filename);
            if !store.contains(&path) {
                return Err(AppError::PathTraversal);
            }

            match fs::metadata(&path).await {
                Ok(m) if m.is_file() => {
                    store.delete(&path).await?;
                    tracing::info!("File deleted successfully: {:?}", path);
                    return Ok(DeleteResponse {
                        message: "File deleted successfully".to_string(),
                        filename: filename.to_string(),
                        directory: category.dir_name(),
                    });
                }
                _ => continue,
            }
        }

        Err(AppError::NotFound(format!(
            "File \"{}\" does not exist in any upload directory",
            filename
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> (tempfile::TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_find_duplicate_excludes_candidate() {
        let (_dir, store) = test_store().await;
        let candidate = store.category_dir(Category::Image).join("file-1-1.png");
        fs::write(&candidate, b"same bytes").await.unwrap();

        let hash = digest::file_digest(&candidate).await.unwrap();
        assert!(FileService::find_duplicate(&store, &candidate, &hash)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_find_duplicate_matches_across_categories() {
        let (_dir, store) = test_store().await;
        let existing = store.category_dir(Category::Other).join("file-1-1.txt");
        fs::write(&existing, b"same bytes").await.unwrap();

        let candidate = store.category_dir(Category::Image).join("file-2-2.png");
        fs::write(&candidate, b"same bytes").await.unwrap();

        let hash = digest::file_digest(&candidate).await.unwrap();
        let found = FileService::find_duplicate(&store, &candidate, &hash).await;
        assert_eq!(found, Some(existing));
    }

    #[tokio::test]
    async fn test_find_duplicate_distinct_content() {
        let (_dir, store) = test_store().await;
        let existing = store.category_dir(Category::Image).join("file-1-1.png");
        fs::write(&existing, b"one").await.unwrap();

        let candidate = store.category_dir(Category::Image).join("file-2-2.png");
        fs::write(&candidate, b"two").await.unwrap();

        let hash = digest::file_digest(&candidate).await.unwrap();
        assert!(FileService::find_duplicate(&store, &candidate, &hash)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_traversal_rejected_before_lookup() {
        let (_dir, store) = test_store().await;
        let err = FileService::delete_file(&store, "../../etc/passwd")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PathTraversal));
    }

    #[tokio::test]
    async fn test_delete_idempotence() {
        let (_dir, store) = test_store().await;
        let path = store.category_dir(Category::Pdf).join("file-1-1.pdf");
        fs::write(&path, b"%PDF-1.4").await.unwrap();

        let first = FileService::delete_file(&store, "file-1-1.pdf").await.unwrap();
        assert_eq!(first.directory, "pdfs");

        let second = FileService::delete_file(&store, "file-1-1.pdf").await;
        assert!(matches!(second, Err(AppError::NotFound(_))));
    }
}
