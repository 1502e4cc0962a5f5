use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::{
    api::{
        extract::{Path, Query},
        state::AppState,
    },
    error::{AppError, Result},
    media::{validate_upload, ListAssetsQuery, UploadRequest},
};

const MAX_PER_PAGE: u32 = 500;

#[derive(Debug, Deserialize)]
pub struct ListImagesQuery {
    #[serde(default, deserialize_with = "lenient_number")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub per_page: Option<u32>,
    pub folder: Option<String>,
    /// Continuation token from a previous page's `next_cursor`.
    pub cursor: Option<String>,
}

/// Paging numbers that don't parse fall back to their defaults.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListImagesQuery>,
) -> Result<Json<Value>> {
    let media = state.media()?;

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(100).clamp(1, MAX_PER_PAGE);
    let folder = params
        .folder
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| state.settings.media.default_folder.clone());

    let listing = media
        .list_assets(ListAssetsQuery {
            folder: folder.clone(),
            max_results: per_page,
            cursor: params.cursor,
        })
        .await?;

    Ok(Json(json!({
        "images": listing.assets,
        "total_count": listing.total_count,
        "page": page,
        "per_page": per_page,
        "folder": folder,
        "next_cursor": listing.next_cursor,
    })))
}

/// Multipart body: file field `image`, optional text fields `folder` and
/// `public_id`. The bearer check runs in middleware before the body is read.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>)> {
    let media = state.media()?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut folder: Option<String> = None;
    let mut public_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {}", e)))?;
                file = Some((filename, data.to_vec()));
            }
            "folder" => folder = text_field(field).await?,
            "public_id" => public_id = text_field(field).await?,
            _ => {
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid multipart body: {}", e)))?;
            }
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::Validation("No file was sent".to_string()))?;
    validate_upload(&filename, &data)?;

    let asset = media
        .upload(UploadRequest {
            filename,
            data,
            folder: folder.unwrap_or_else(|| state.settings.media.default_folder.clone()),
            public_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "public_id": asset.public_id,
            "filename": asset.filename,
            "secure_url": asset.secure_url,
            "created_at": asset.created_at,
            "folder": asset.folder,
            "format": asset.format,
            "bytes": asset.bytes,
            "message": "Image uploaded",
        })),
    ))
}

async fn text_field(field: Field<'_>) -> Result<Option<String>> {
    let name = field.name().unwrap_or("").to_string();
    let value = field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Could not read field {}: {}", name, e)))?;

    Ok(Some(value).filter(|v| !v.is_empty()))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<Value>> {
    let media = state.media()?;

    let result = media.destroy(&public_id).await?;
    if result != "ok" {
        return Err(AppError::upstream_rejected("Could not delete image", result));
    }

    tracing::info!("Deleted image {}", public_id);
    Ok(Json(json!({ "message": "Image deleted" })))
}

pub async fn folders(State(state): State<AppState>) -> Result<Json<Value>> {
    let folders = state.media()?.root_folders().await?;

    Ok(Json(json!({ "folders": folders })))
}
