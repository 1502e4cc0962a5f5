use std::sync::Arc;
use chrono::Utc;

use crate::{
    domain::{
        parse_display_date, utc_timestamp, CreateRecordRequest, NewRecord, Record, ResourceKind,
        UpdateRecordRequest,
    },
    error::{AppError, Result},
    repository::RecordRepository,
};

pub const NO_DATA: &str = "No data provided";

pub struct RecordService {
    repo: Arc<dyn RecordRepository>,
}

impl RecordService {
    pub fn new(repo: Arc<dyn RecordRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, kind: ResourceKind) -> Result<Vec<Record>> {
        self.repo.list(kind).await
    }

    /// Validate and insert. Nothing touches the store until every check
    /// has passed.
    pub async fn create(&self, kind: ResourceKind, request: CreateRecordRequest) -> Result<Record> {
        let title = require("titulo", request.title)?;
        let body = require("contenido", request.body)?;
        let category = if kind.has_category() {
            Some(require("categoria", request.category)?)
        } else {
            None
        };
        let display_date = require("fecha", request.display_date)?;
        parse_display_date(&display_date)?;

        let record = NewRecord {
            title,
            body,
            category,
            image_ref: request.image_ref.unwrap_or_default(),
            display_date,
            created_at: utc_timestamp(Utc::now()),
        };

        let created = self.repo.create(kind, record).await?;
        tracing::debug!("Created {} {}", kind.table(), created.id);

        Ok(created)
    }

    /// Merge the present fields over the stored row and write it back.
    pub async fn update(
        &self,
        kind: ResourceKind,
        id: i64,
        request: UpdateRecordRequest,
    ) -> Result<Record> {
        if request.is_empty() {
            return Err(AppError::Validation(NO_DATA.to_string()));
        }

        let mut record = self
            .repo
            .find_by_id(kind, id)
            .await?
            .ok_or_else(|| not_found(kind))?;

        if let Some(title) = request.title {
            record.title = require("titulo", Some(title))?;
        }
        if let Some(body) = request.body {
            record.body = require("contenido", Some(body))?;
        }
        if kind.has_category() {
            if let Some(category) = request.category {
                record.category = Some(require("categoria", Some(category))?);
            }
        }
        if let Some(image_ref) = request.image_ref {
            record.image_ref = image_ref;
        }
        if let Some(display_date) = request.display_date {
            parse_display_date(&display_date)?;
            record.display_date = display_date;
        }

        self.repo.update(kind, record).await
    }

    pub async fn delete(&self, kind: ResourceKind, id: i64) -> Result<()> {
        if !self.repo.delete(kind, id).await? {
            return Err(not_found(kind));
        }

        tracing::debug!("Deleted {} {}", kind.table(), id);
        Ok(())
    }
}

fn require(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("Field \"{}\" is required", field))),
    }
}

fn not_found(kind: ResourceKind) -> AppError {
    AppError::NotFound(format!("{} not found", kind.label()))
}
