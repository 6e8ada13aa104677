use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("{0} is not an image file")]
    NotAnImage(String),
}

/// Image bytes picked by the user, ready for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl CoverFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, CoverError> {
        let file_name = file_name.into();
        let mime = image_mime(&file_name).ok_or_else(|| CoverError::NotAnImage(file_name.clone()))?;
        Ok(Self { file_name, mime, bytes })
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, CoverError> {
        let path = path.as_ref();
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        // Extension is checked before any read.
        if image_mime(&file_name).is_none() { return Err(CoverError::NotAnImage(path.display().to_string())); }
        let bytes = tokio::fs::read(path).await.map_err(|source| CoverError::Read { path: path.display().to_string(), source })?;
        Self::new(file_name, bytes)
    }
}

fn image_mime(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
