use std::sync::Arc;
use crate::{
    config::Settings,
    error::{AppError, Result},
    media::MediaStore,
    service::ServiceContext,
};

#[derive(Clone)]
pub struct AppState {
    pub service_context: Arc<ServiceContext>,
    pub media: Option<Arc<dyn MediaStore>>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(
        service_context: Arc<ServiceContext>,
        media: Option<Arc<dyn MediaStore>>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            service_context,
            media,
            settings,
        }
    }

    pub fn media(&self) -> Result<&Arc<dyn MediaStore>> {
        self.media.as_ref().ok_or_else(|| {
            AppError::ServiceUnavailable("Media storage is not configured".to_string())
        })
    }
}
