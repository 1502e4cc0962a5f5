use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category stored for blog rows that predate the column being filled in.
pub const CATEGORY_PLACEHOLDER: &str = "0000";

/// `created_at` layout: microsecond precision, literal `Z`. Sorts
/// lexically in time order.
pub fn utc_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// The four content tables behind the site. Every kind shares one record
/// shape; only blog posts carry a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Announcements,
    Blog,
    Comments,
    Sports,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Announcements,
        ResourceKind::Blog,
        ResourceKind::Comments,
        ResourceKind::Sports,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            ResourceKind::Announcements => "comunicados",
            ResourceKind::Blog => "blog",
            ResourceKind::Comments => "comentarios",
            ResourceKind::Sports => "deportes",
        }
    }

    /// Path segment under `/api`.
    pub fn segment(&self) -> &'static str {
        match self {
            ResourceKind::Announcements => "announcements",
            ResourceKind::Blog => "blog",
            ResourceKind::Comments => "comments",
            ResourceKind::Sports => "sports",
        }
    }

    /// Older path the school site front end still calls, if it differs.
    pub fn legacy_segment(&self) -> Option<&'static str> {
        match self {
            ResourceKind::Announcements => Some("comunicados"),
            ResourceKind::Blog => None,
            ResourceKind::Comments => Some("comentarios"),
            ResourceKind::Sports => Some("deportes"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Announcements => "Announcement",
            ResourceKind::Blog => "Blog post",
            ResourceKind::Comments => "Comment",
            ResourceKind::Sports => "Sports activity",
        }
    }

    pub fn has_category(&self) -> bool {
        matches!(self, ResourceKind::Blog)
    }

    /// Fields a create must carry, in the order they are checked.
    pub fn required_fields(&self) -> &'static [&'static str] {
        if self.has_category() {
            &["titulo", "contenido", "categoria", "fecha"]
        } else {
            &["titulo", "contenido", "fecha"]
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.segment() == segment || kind.legacy_segment() == Some(segment))
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.segment())
    }
}

/// One stored row. Field names on the wire follow the site's existing
/// JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "contenido")]
    pub body: String,
    #[serde(rename = "categoria", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "imagen")]
    pub image_ref: String,
    #[serde(rename = "fecha")]
    pub display_date: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRecordRequest {
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "contenido")]
    pub body: Option<String>,
    #[serde(rename = "categoria")]
    pub category: Option<String>,
    #[serde(rename = "imagen")]
    pub image_ref: Option<String>,
    #[serde(rename = "fecha")]
    pub display_date: Option<String>,
}

/// Absent and `null` fields both mean "keep the stored value".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRecordRequest {
    #[serde(rename = "titulo")]
    pub title: Option<String>,
    #[serde(rename = "contenido")]
    pub body: Option<String>,
    #[serde(rename = "categoria")]
    pub category: Option<String>,
    #[serde(rename = "imagen")]
    pub image_ref: Option<String>,
    #[serde(rename = "fecha")]
    pub display_date: Option<String>,
}

impl UpdateRecordRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.body.is_none()
            && self.category.is_none()
            && self.image_ref.is_none()
            && self.display_date.is_none()
    }
}

/// Validated input handed to the store on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub image_ref: String,
    pub display_date: String,
    pub created_at: String,
}
