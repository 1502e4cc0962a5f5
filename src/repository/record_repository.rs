use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, SqlitePool};

use crate::{
    domain::{utc_timestamp, NewRecord, Record, ResourceKind, CATEGORY_PLACEHOLDER},
    error::{AppError, Result},
    repository::RecordRepository,
};

#[derive(FromRow)]
struct RecordRow {
    id: i64,
    titulo: String,
    contenido: String,
    categoria: Option<String>,
    imagen: Option<String>,
    fecha: String,
    created_at: String,
}

pub struct SqliteRecordRepository {
    pool: SqlitePool,
}

impl SqliteRecordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_record(kind: ResourceKind, row: RecordRow) -> Record {
        Record {
            id: row.id,
            title: row.titulo,
            body: row.contenido,
            category: kind
                .has_category()
                .then(|| row.categoria.unwrap_or_else(|| CATEGORY_PLACEHOLDER.to_string())),
            image_ref: row.imagen.unwrap_or_default(),
            display_date: row.fecha,
            created_at: row.created_at,
        }
    }

    /// Table names come from `ResourceKind`, never from request input.
    fn select_columns(kind: ResourceKind) -> &'static str {
        if kind.has_category() {
            "id, titulo, contenido, categoria, imagen, fecha, created_at"
        } else {
            "id, titulo, contenido, NULL AS categoria, imagen, fecha, created_at"
        }
    }
}

#[async_trait]
impl RecordRepository for SqliteRecordRepository {
    async fn list(&self, kind: ResourceKind) -> Result<Vec<Record>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY fecha DESC, created_at DESC, id DESC",
            Self::select_columns(kind),
            kind.table()
        );

        let rows = sqlx::query_as::<_, RecordRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Self::row_to_record(kind, row))
            .collect())
    }

    async fn find_by_id(&self, kind: ResourceKind, id: i64) -> Result<Option<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            Self::select_columns(kind),
            kind.table()
        );

        let row = sqlx::query_as::<_, RecordRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Self::row_to_record(kind, r)))
    }

    async fn create(&self, kind: ResourceKind, record: NewRecord) -> Result<Record> {
        let result = if kind.has_category() {
            let category = record
                .category
                .unwrap_or_else(|| CATEGORY_PLACEHOLDER.to_string());

            sqlx::query(&format!(
                r#"
                INSERT INTO {} (titulo, contenido, categoria, imagen, fecha, created_at)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
                kind.table()
            ))
            .bind(&record.title)
            .bind(&record.body)
            .bind(category)
            .bind(&record.image_ref)
            .bind(&record.display_date)
            .bind(&record.created_at)
            .execute(&self.pool)
            .await?
        } else {
            sqlx::query(&format!(
                r#"
                INSERT INTO {} (titulo, contenido, imagen, fecha, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
                kind.table()
            ))
            .bind(&record.title)
            .bind(&record.body)
            .bind(&record.image_ref)
            .bind(&record.display_date)
            .bind(&record.created_at)
            .execute(&self.pool)
            .await?
        };

        let id = result.last_insert_rowid();

        self.find_by_id(kind, id).await?.ok_or_else(|| {
            AppError::Database(format!("Failed to retrieve created {} row", kind.table()))
        })
    }

    async fn update(&self, kind: ResourceKind, record: Record) -> Result<Record> {
        if kind.has_category() {
            sqlx::query(&format!(
                r#"
                UPDATE {}
                SET titulo = ?, contenido = ?, categoria = ?, imagen = ?, fecha = ?
                WHERE id = ?
                "#,
                kind.table()
            ))
            .bind(&record.title)
            .bind(&record.body)
            .bind(record.category.as_deref().unwrap_or(CATEGORY_PLACEHOLDER))
            .bind(&record.image_ref)
            .bind(&record.display_date)
            .bind(record.id)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(&format!(
                r#"
                UPDATE {}
                SET titulo = ?, contenido = ?, imagen = ?, fecha = ?
                WHERE id = ?
                "#,
                kind.table()
            ))
            .bind(&record.title)
            .bind(&record.body)
            .bind(&record.image_ref)
            .bind(&record.display_date)
            .bind(record.id)
            .execute(&self.pool)
            .await?;
        }

        self.find_by_id(kind, record.id).await?.ok_or_else(|| {
            AppError::NotFound(format!("{} not found", kind.label()))
        })
    }

    async fn delete(&self, kind: ResourceKind, id: i64) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, kind: ResourceKind) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", kind.table()))
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn seed_defaults(&self) -> Result<Vec<Record>> {
        let mut created = Vec::new();

        for kind in ResourceKind::ALL {
            // Only seed tables nobody has written to yet
            if self.count(kind).await? > 0 {
                continue;
            }

            let record = default_record(kind);
            created.push(self.create(kind, record).await?);
            tracing::info!("Seeded example row into {}", kind.table());
        }

        Ok(created)
    }
}

fn default_record(kind: ResourceKind) -> NewRecord {
    let created_at = utc_timestamp(Utc::now());

    let (title, body, category, image_ref, display_date) = match kind {
        ResourceKind::Announcements => (
            "Desfile del Kinder José Antonio Zampa",
            "Se convoca a la banda, la promoción y docentes del colegio a asistir al desfile del aniversario del Kinder José Antonio Zampa.",
            None,
            "../img/com.png",
            "2025-09-01",
        ),
        ResourceKind::Blog => (
            "¡Campeones del Torneo!",
            "Resumen de la emocionante final de fútbol sala.",
            Some("Deportes"),
            "../img/ejercicio.avif",
            "2025-10-15",
        ),
        ResourceKind::Comments => (
            "Padre de Familia",
            "El colegio José María Linares tiene una gran banda. La dedicación de los estudiantes y maestros es realmente admirable.",
            None,
            "",
            "2025-10-18",
        ),
        ResourceKind::Sports => (
            "Entrenamientos de Básquet y Vóley",
            "Se convoca a los estudiantes del equipo de Básquet y Vóley a los entrenamientos con los siguientes horarios.",
            None,
            "../img/depo.png",
            "2025-10-20",
        ),
    };

    NewRecord {
        title: title.to_string(),
        body: body.to_string(),
        category: category.map(str::to_string),
        image_ref: image_ref.to_string(),
        display_date: display_date.to_string(),
        created_at,
    }
}
