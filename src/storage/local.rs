use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::error::{AppError, Result};
use crate::models::Category;

/// Local file store holding the four category directories
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `base_path`, creating all category
    /// directories if they do not exist yet.
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();

        for category in Category::ALL {
            fs::create_dir_all(base_path.join(category.dir_name())).await?;
        }

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.base_path.join(category.dir_name())
    }

    /// Generate a storage filename: `file-<unix millis>-<random suffix>`,
    /// keeping the original extension
    pub fn generate_filename(original_name: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix = rand::random::<u32>() % 1_000_000_000;
        let ext = Path::new(original_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        format!("file-{}-{}{}", millis, suffix, ext)
    }

    /// Enumerate every stored file as (path, category), in category order.
    /// Unreadable directories are logged and skipped.
    pub async fn list_all(&self) -> Vec<(PathBuf, Category)> {
        let mut files = Vec::new();

        for category in Category::ALL {
            let dir = self.category_dir(category);
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::error!("Error reading directory {:?}: {}", dir, e);
                    continue;
                }
            };

            loop {
                match entries.next_entry().await {
                    Ok(Some(entry)) => files.push((entry.path(), category)),
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Error reading entry in {:?}: {}", dir, e);
                        break;
                    }
                }
            }
        }

        files
    }

    /// Remove a stored file. A missing file maps to NotFound so racing
    /// deletes on the same path fail gracefully.
    pub async fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("File not found: {}", path.display()))
            } else {
                AppError::Io(e)
            }
        })?;
        tracing::debug!("Deleted file {:?}", path);
        Ok(())
    }

    /// Whether `path` stays within the upload root after normalization
    pub fn contains(&self, path: &Path) -> bool {
        normalized(path).starts_with(normalized(&self.base_path))
    }
}

/// Lexical normalization: resolves `.` and `..` without touching the
/// filesystem, so it also works for paths that do not exist
fn normalized(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// A bare filename is safe when it cannot introduce new path components
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
}
