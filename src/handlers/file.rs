use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{
    is_allowed_mime_type, Category, DeleteResponse, FileListResponse, UploadResponse, UploadedFile,
};
use crate::services::{digest, FileService};
use crate::storage::FileStore;
use crate::AppState;

/// A file written to its category directory pending the duplicate check.
/// Dropping it removes the file unless `accept` was called, so cleanup
/// runs on every rejection path and also when the request future is
/// dropped mid-upload (client disconnect).
struct TentativeFile {
    path: PathBuf,
    filename: String,
    original_name: String,
    mime_type: String,
    size: u64,
    accepted: bool,
}

impl TentativeFile {
    fn new(path: PathBuf, filename: String, original_name: String, mime_type: String) -> Self {
        Self {
            path,
            filename,
            original_name,
            mime_type,
            size: 0,
            accepted: false,
        }
    }

    /// Keep the file: the upload passed validation and the duplicate scan
    fn accept(&mut self) {
        self.accepted = true;
    }
}

impl Drop for TentativeFile {
    fn drop(&mut self) {
        if self.accepted {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!("Failed to remove tentative file {:?}: {}", self.path, e);
            }
        }
    }
}

/// Upload a file
/// POST /upload
///
/// Drives one upload through classify → store(tentative) → digest →
/// scan. The tentative file is held in a drop guard, so any early exit
/// deletes it before the response (or the aborted request) completes.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut tentative: Option<TentativeFile> = None;
    let mut description: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to process multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                if tentative.is_some() {
                    return Err(AppError::BadRequest(
                        "Only one file may be uploaded per request".to_string(),
                    ));
                }
                let original_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| AppError::BadRequest("No file name provided".to_string()))?;
                let mime_type = field.content_type().map(|s| s.to_string());

                // Accept gate runs on the declared MIME type and rejects
                // before anything is written. Directory routing below uses
                // the extension instead; the two can disagree.
                let mime_type = match mime_type {
                    Some(m) if is_allowed_mime_type(&m) => m,
                    _ => return Err(AppError::InvalidFileType),
                };

                let category = std::path::Path::new(&original_name)
                    .extension()
                    .map(|e| Category::from_extension(&e.to_string_lossy()))
                    .unwrap_or(Category::Other);

                let filename = FileStore::generate_filename(&original_name);
                let path = state.store.category_dir(category).join(&filename);
                tracing::debug!("Uploading to {:?}", path);

                let mut file = tokio::fs::File::create(&path).await?;
                let guard = tentative.insert(TentativeFile::new(
                    path,
                    filename,
                    original_name,
                    mime_type,
                ));

                let mut size: u64 = 0;
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file chunk: {}", e)))?
                {
                    size += chunk.len() as u64;
                    if size > state.config.storage.max_file_size {
                        return Err(AppError::FileTooLarge);
                    }
                    file.write_all(&chunk).await?;
                }
                file.flush().await?;
                guard.size = size;
            }
            "description" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field: {}", e)))?;
                let trimmed = text.trim().to_string();
                if trimmed.chars().count() > state.config.storage.max_description_length {
                    return Err(AppError::BadRequest(format!(
                        "Description must be at most {} characters",
                        state.config.storage.max_description_length
                    )));
                }
                description = Some(trimmed);
            }
            _ => {}
        }
    }

    let file = tentative
        .as_mut()
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    // Duplicate check: hash the tentative file, then re-hash every stored
    // file looking for a byte-exact digest match
    let file_hash = digest::file_digest(&file.path).await?;
    if let Some(existing) = FileService::find_duplicate(&state.store, &file.path, &file_hash).await
    {
        tracing::info!("Duplicate upload rejected, matches {:?}", existing);
        return Err(AppError::DuplicateFile);
    }

    file.accept();
    tracing::info!("File uploaded successfully: {}", file.filename);
    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        file: UploadedFile {
            filename: file.filename.clone(),
            originalname: file.original_name.clone(),
            mimetype: file.mime_type.clone(),
            size: file.size,
            description,
        },
    }))
}

/// List uploaded files grouped by category
/// GET /files
pub async fn list_files(State(state): State<AppState>) -> Result<Json<FileListResponse>> {
    Ok(Json(FileService::list_files(&state.store).await))
}

/// Delete an uploaded file
/// DELETE /files/:filename
pub async fn delete_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>> {
    tracing::debug!("Delete request received for file: {}", filename);
    let response = FileService::delete_file(&state.store, &filename).await?;
    Ok(Json(response))
}
