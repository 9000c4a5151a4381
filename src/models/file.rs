use chrono::{DateTime, Utc};
use serde::Serialize;

/// MIME types accepted by the upload gate
pub const ALLOWED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "application/pdf"];

/// Upload category, each bound to one directory under the upload root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Image,
    Video,
    Pdf,
    Other,
}

impl Category {
    /// Enumeration order used by listing and the duplicate scan
    pub const ALL: [Category; 4] =
        [Category::Image, Category::Video, Category::Pdf, Category::Other];

    /// Directory routing by extension (case-insensitive, without the dot).
    /// Independent of the MIME accept gate; the two may disagree.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" => Category::Image,
            "mp4" | "webm" | "mov" | "avi" => Category::Video,
            "pdf" => Category::Pdf,
            _ => Category::Other,
        }
    }

    /// Directory name under the upload root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Image => "images",
            Category::Video => "videos",
            Category::Pdf => "pdfs",
            Category::Other => "others",
        }
    }

    /// Type label used in listing entries
    pub fn label(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Video => "video",
            Category::Pdf => "pdf",
            Category::Other => "other",
        }
    }
}

/// Whether a declared MIME type passes the accept gate
pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

/// Uploaded file metadata echoed back on success
#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub originalname: String,
    pub mimetype: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file: UploadedFile,
}

/// One entry in the file listing, re-derived from filesystem stat
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub filename: String,
    /// Web path, always forward-slash separated
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: &'static str,
    pub size: u64,
    pub date: DateTime<Utc>,
}

/// File listing grouped by category
#[derive(Debug, Default, Serialize)]
pub struct FileListResponse {
    pub images: Vec<FileEntry>,
    pub videos: Vec<FileEntry>,
    pub pdfs: Vec<FileEntry>,
    pub others: Vec<FileEntry>,
}

impl FileListResponse {
    pub fn push(&mut self, category: Category, entry: FileEntry) {
        match category {
            Category::Image => self.images.push(entry),
            Category::Video => self.videos.push(entry),
            Category::Pdf => self.pdfs.push(entry),
            Category::Other => self.others.push(entry),
        }
    }
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub filename: String,
    pub directory: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_routing() {
        assert_eq!(Category::from_extension("jpg"), Category::Image);
        assert_eq!(Category::from_extension("webp"), Category::Image);
        assert_eq!(Category::from_extension("mov"), Category::Video);
        assert_eq!(Category::from_extension("pdf"), Category::Pdf);
        assert_eq!(Category::from_extension("txt"), Category::Other);
        assert_eq!(Category::from_extension(""), Category::Other);
    }

    #[test]
    fn test_extension_routing_is_case_insensitive() {
        assert_eq!(Category::from_extension("PNG"), Category::Image);
        assert_eq!(Category::from_extension("Mp4"), Category::Video);
        assert_eq!(Category::from_extension("PDF"), Category::Pdf);
    }

    #[test]
    fn test_mime_gate() {
        assert!(is_allowed_mime_type("image/png"));
        assert!(is_allowed_mime_type("application/pdf"));
        // Routing would file .mp4 under videos, but the gate still rejects it
        assert!(!is_allowed_mime_type("video/mp4"));
        assert!(!is_allowed_mime_type("image/webp"));
        assert!(!is_allowed_mime_type(""));
    }

    #[test]
    fn test_dir_names() {
        let dirs: Vec<&str> = Category::ALL.iter().map(|c| c.dir_name()).collect();
        assert_eq!(dirs, ["images", "videos", "pdfs", "others"]);
    }
}
