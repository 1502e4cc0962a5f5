use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub mod cloudinary;

pub use cloudinary::CloudinaryClient;

/// Allowed image extensions
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg"];

/// Maximum file size (10 MiB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    pub public_id: String,
    pub filename: String,
    pub secure_url: String,
    pub created_at: String,
    pub folder: String,
    pub format: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct AssetPage {
    pub assets: Vec<ImageAsset>,
    pub total_count: u64,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListAssetsQuery {
    pub folder: String,
    pub max_results: u32,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub data: Vec<u8>,
    pub folder: String,
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub path: String,
}

/// Remote image host. Every call goes straight through; nothing is cached.
#[async_trait]
pub trait MediaStore: Send + Sync {
    fn name(&self) -> &str;
    async fn health_check(&self) -> Result<()>;
    /// Newest uploads first.
    async fn list_assets(&self, query: ListAssetsQuery) -> Result<AssetPage>;
    async fn upload(&self, request: UploadRequest) -> Result<ImageAsset>;
    /// Returns the host's result string; `"ok"` means the asset is gone.
    async fn destroy(&self, public_id: &str) -> Result<String>;
    async fn root_folders(&self) -> Result<Vec<Folder>>;
}

/// Checks an upload before anything is sent to the host.
pub fn validate_upload(filename: &str, data: &[u8]) -> Result<()> {
    if filename.is_empty() {
        return Err(AppError::Validation("Empty file name".to_string()));
    }

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::Validation(format!(
            "File type not allowed. Use one of: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::Validation("File must not exceed 10 MB".to_string()));
    }

    Ok(())
}

/// Last path component of a public id (`img/school/logo` -> `logo`).
pub fn basename(public_id: &str) -> &str {
    public_id.rsplit('/').next().unwrap_or(public_id)
}
