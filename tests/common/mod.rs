#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use linares::{
    api::{self, state::AppState},
    config::Settings,
    error::Result,
    media::{AssetPage, Folder, ImageAsset, ListAssetsQuery, MediaStore, UploadRequest},
    service::ServiceContext,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub const TEST_TOKEN: &str = "test-token";

/// Single connection so every query sees the same in-memory database.
pub async fn test_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Media host stand-in that records every call it receives.
pub struct RecordingMediaStore {
    pub calls: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<UploadRequest>>,
    pub destroy_result: String,
}

impl RecordingMediaStore {
    pub fn new() -> Self {
        Self::with_destroy_result("ok")
    }

    pub fn with_destroy_result(result: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            destroy_result: result.to_string(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn asset(public_id: &str, folder: &str) -> ImageAsset {
    ImageAsset {
        public_id: public_id.to_string(),
        filename: public_id.rsplit('/').next().unwrap_or(public_id).to_string(),
        secure_url: format!("https://res.cloudinary.com/demo/image/upload/{}.png", public_id),
        created_at: "2025-10-01T12:00:00Z".to_string(),
        folder: folder.to_string(),
        format: "png".to_string(),
        bytes: 1024,
    }
}

#[async_trait]
impl MediaStore for RecordingMediaStore {
    fn name(&self) -> &str {
        "Recording"
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn list_assets(&self, query: ListAssetsQuery) -> Result<AssetPage> {
        self.record(format!("list:{}:{}", query.folder, query.max_results));
        Ok(AssetPage {
            assets: vec![asset(&format!("{}/banda", query.folder), &query.folder)],
            total_count: 1,
            next_cursor: None,
        })
    }

    async fn upload(&self, request: UploadRequest) -> Result<ImageAsset> {
        self.record(format!("upload:{}:{}", request.folder, request.filename));
        let stem = request
            .filename
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_default();
        let uploaded = asset(&format!("{}/{}_a1b2", request.folder, stem), &request.folder);
        self.uploads.lock().unwrap().push(request);
        Ok(uploaded)
    }

    async fn destroy(&self, public_id: &str) -> Result<String> {
        self.record(format!("destroy:{}", public_id));
        Ok(self.destroy_result.clone())
    }

    async fn root_folders(&self) -> Result<Vec<Folder>> {
        self.record("folders".to_string());
        Ok(vec![Folder {
            name: "img".to_string(),
            path: "img".to_string(),
        }])
    }
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.api_token = TEST_TOKEN.to_string();
    settings.cors.allowed_origins = vec!["*".to_string()];
    settings
}

pub fn test_app(
    pool: SqlitePool,
    media: Option<Arc<dyn MediaStore>>,
    settings: Settings,
) -> axum::Router {
    let service_context = Arc::new(ServiceContext::new(pool));
    api::create_app(AppState::new(service_context, media, Arc::new(settings)))
}
