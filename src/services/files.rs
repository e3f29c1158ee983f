use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Uploads directory. Files are stored under generated names and served back
/// by that name only.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub url: String,
    pub media_type: &'static str,
}

/// Post media type for an upload's content type.
pub fn media_type_for(content_type: Option<&str>) -> &'static str {
    match content_type {
        Some(ct) if ct.starts_with("image/gif") => "gif",
        Some(ct) if ct.starts_with("image/") => "image",
        Some(ct) if ct.starts_with("video/") => "video",
        _ => "file",
    }
}

/// Extension of the client's filename, kept only if it is short and plain.
fn extension_of(original: &str) -> Option<String> {
    let (stem, ext) = original.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || ext.len() > 10 {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Names we hand out are uuid plus optional extension; anything else is refused.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn store(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        data: &[u8],
    ) -> AppResult<StoredFile> {
        if data.is_empty() {
            return Err(AppError::BadRequest("Please select a file to upload".into()));
        }
        let original = original_name.unwrap_or_default();
        if original.contains("..") {
            return Err(AppError::BadRequest(format!(
                "Invalid file path: {original}"
            )));
        }

        let id = uuid::Uuid::now_v7();
        let filename = match extension_of(original) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        };

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&filename), data).await?;
        tracing::info!(filename = %filename, bytes = data.len(), "Stored upload");

        Ok(StoredFile {
            url: format!("{UPLOADS_PREFIX}{filename}"),
            media_type: media_type_for(content_type),
            filename,
        })
    }

    /// Path for a served filename, or `None` if the name could escape the root.
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        is_safe_name(filename).then(|| self.root.join(filename))
    }

    pub async fn read(&self, filename: &str) -> AppResult<Vec<u8>> {
        let path = self
            .resolve(filename)
            .ok_or_else(|| AppError::not_found("File"))?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::not_found("File"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the file behind an `/uploads/...` URL. Other URLs are ignored
    /// and failures are only logged.
    pub async fn remove_url(&self, url: &str) {
        let Some(path) = url
            .strip_prefix(UPLOADS_PREFIX)
            .and_then(|name| self.resolve(name))
        else {
            return;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "Removed upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "Failed to remove upload: {}", e),
        }
    }
}
