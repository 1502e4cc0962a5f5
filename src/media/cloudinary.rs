use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use sha2::{Digest, Sha256};

use crate::{
    config::{MediaConfig, MediaCredentials},
    error::{AppError, Result},
    media::{basename, AssetPage, Folder, ImageAsset, ListAssetsQuery, MediaStore, UploadRequest},
};

/// Incoming transformation applied on upload: automatic format and quality.
const UPLOAD_TRANSFORMATION: &str = "f_auto,q_auto";

#[derive(Deserialize)]
struct ResourceDto {
    public_id: String,
    #[serde(default)]
    secure_url: String,
    #[serde(default)]
    created_at: String,
    folder: Option<String>,
    asset_folder: Option<String>,
    format: Option<String>,
    #[serde(default)]
    bytes: u64,
}

#[derive(Deserialize)]
struct ResourcesResponse {
    #[serde(default)]
    resources: Vec<ResourceDto>,
    total_count: Option<u64>,
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct FoldersResponse {
    #[serde(default)]
    folders: Vec<Folder>,
}

#[derive(Deserialize)]
struct PingResponse {
    status: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct CloudinaryClient {
    http: Client,
    credentials: MediaCredentials,
    api_base: String,
}

impl CloudinaryClient {
    pub fn new(config: &MediaConfig) -> Result<Option<Self>> {
        let Some(credentials) = config.credentials() else {
            return Ok(None);
        };

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Some(Self {
            http,
            credentials,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.api_base, self.credentials.cloud_name, path)
    }

    /// Admin API calls authenticate with the key pair directly.
    fn admin_get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.endpoint(path))
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
    }

    /// Adds `timestamp`, `api_key` and the signature to upload API params.
    fn signed(&self, mut params: BTreeMap<&'static str, String>) -> BTreeMap<&'static str, String> {
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = sign_params(&params, &self.credentials.api_secret);
        params.insert("api_key", self.credentials.api_key.clone());
        params.insert("signature", signature);
        params.insert("signature_algorithm", "sha256".to_string());
        params
    }
}

/// Upload API signature: sorted `key=value` pairs joined by `&`, empty
/// values skipped, secret appended, SHA-256 hex digest.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

async fn read_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let details = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));
        return Err(AppError::upstream(context, details));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::upstream(context, e))
}

fn to_asset(dto: ResourceDto) -> ImageAsset {
    let folder = dto
        .folder
        .or(dto.asset_folder)
        .unwrap_or_else(|| match dto.public_id.rsplit_once('/') {
            Some((dir, _)) => dir.to_string(),
            None => String::new(),
        });

    ImageAsset {
        filename: basename(&dto.public_id).to_string(),
        public_id: dto.public_id,
        secure_url: dto.secure_url,
        created_at: dto.created_at,
        folder,
        format: dto.format.unwrap_or_default(),
        bytes: dto.bytes,
    }
}

#[async_trait]
impl MediaStore for CloudinaryClient {
    fn name(&self) -> &str {
        "Cloudinary"
    }

    async fn health_check(&self) -> Result<()> {
        let response = self.admin_get("ping").send().await?;
        let ping: PingResponse = read_json(response, "Cloudinary health check failed").await?;

        if ping.status != "ok" {
            return Err(AppError::upstream("Cloudinary health check failed", ping.status));
        }
        Ok(())
    }

    async fn list_assets(&self, query: ListAssetsQuery) -> Result<AssetPage> {
        let mut params = vec![
            ("prefix", query.folder),
            ("max_results", query.max_results.to_string()),
            ("direction", "desc".to_string()),
        ];
        if let Some(cursor) = query.cursor {
            params.push(("next_cursor", cursor));
        }

        let response = self
            .admin_get("resources/image/upload")
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::upstream("Failed to list images", e))?;

        let listing: ResourcesResponse = read_json(response, "Failed to list images").await?;
        let assets: Vec<ImageAsset> = listing.resources.into_iter().map(to_asset).collect();

        Ok(AssetPage {
            total_count: listing.total_count.unwrap_or(assets.len() as u64),
            assets,
            next_cursor: listing.next_cursor,
        })
    }

    async fn upload(&self, request: UploadRequest) -> Result<ImageAsset> {
        let mut params = BTreeMap::new();
        params.insert("folder", request.folder);
        params.insert("use_filename", "true".to_string());
        params.insert("unique_filename", "true".to_string());
        params.insert("overwrite", "false".to_string());
        params.insert("transformation", UPLOAD_TRANSFORMATION.to_string());
        if let Some(public_id) = request.public_id.filter(|id| !id.is_empty()) {
            params.insert("public_id", public_id);
        }

        let mut form = multipart::Form::new();
        for (key, value) in self.signed(params) {
            form = form.text(key, value);
        }
        form = form.part(
            "file",
            multipart::Part::bytes(request.data).file_name(request.filename),
        );

        let response = self
            .http
            .post(self.endpoint("image/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::upstream("Failed to upload image", e))?;

        let uploaded: ResourceDto = read_json(response, "Failed to upload image").await?;
        tracing::info!("Uploaded image {}", uploaded.public_id);

        Ok(to_asset(uploaded))
    }

    async fn destroy(&self, public_id: &str) -> Result<String> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());

        let response = self
            .http
            .post(self.endpoint("image/destroy"))
            .form(&self.signed(params))
            .send()
            .await
            .map_err(|e| AppError::upstream("Failed to delete image", e))?;

        let destroyed: DestroyResponse = read_json(response, "Failed to delete image").await?;
        Ok(destroyed.result)
    }

    async fn root_folders(&self) -> Result<Vec<Folder>> {
        let response = self
            .admin_get("folders")
            .send()
            .await
            .map_err(|e| AppError::upstream("Failed to list folders", e))?;

        let listing: FoldersResponse = read_json(response, "Failed to list folders").await?;
        Ok(listing.folders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_skips_empty_values() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("folder", "img".to_string());
        params.insert("use_filename", "true".to_string());
        params.insert("overwrite", "false".to_string());
        params.insert("public_id", String::new());

        assert_eq!(
            sign_params(&params, "abcd"),
            "f5f43b9ebfc04d8a38f26c5f8580d31d04db7c9d70111d86493c254d7c0dac61"
        );
    }

    #[test]
    fn test_resource_mapping() {
        let dto: ResourceDto = serde_json::from_value(serde_json::json!({
            "public_id": "img/banda_x1y2",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/img/banda_x1y2.png",
            "created_at": "2025-10-01T12:00:00Z",
            "format": "png",
            "bytes": 2048
        }))
        .unwrap();

        let asset = to_asset(dto);
        assert_eq!(asset.filename, "banda_x1y2");
        assert_eq!(asset.folder, "img");
        assert_eq!(asset.format, "png");
        assert_eq!(asset.bytes, 2048);
    }

    #[test]
    fn test_missing_credentials_disable_client() {
        let client = CloudinaryClient::new(&MediaConfig::default()).unwrap();
        assert!(client.is_none());
    }
}
