use clap::{Parser, ValueEnum};
use chrono::{Duration, Utc};
use fake::{
    faker::lorem::en::{Paragraph, Sentence, Word},
    Fake,
};
use linares::{
    domain::{CreateRecordRequest, ResourceKind},
    repository::{RecordRepository, SqliteRecordRepository},
    service::record_service::RecordService,
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KindArg {
    All,
    Announcements,
    Blog,
    Comments,
    Sports,
}

impl KindArg {
    fn kinds(self) -> Vec<ResourceKind> {
        match self {
            KindArg::All => ResourceKind::ALL.to_vec(),
            KindArg::Announcements => vec![ResourceKind::Announcements],
            KindArg::Blog => vec![ResourceKind::Blog],
            KindArg::Comments => vec![ResourceKind::Comments],
            KindArg::Sports => vec![ResourceKind::Sports],
        }
    }
}

/// Fill the content tables with fake records for local development.
#[derive(Debug, Parser)]
#[command(name = "seed")]
struct Args {
    /// Defaults to $DATABASE_URL, then the local comunicados.db
    #[arg(long)]
    database_url: Option<String>,

    /// Records to insert per kind
    #[arg(long, default_value_t = 5)]
    count: usize,

    #[arg(long, value_enum, default_value_t = KindArg::All)]
    kind: KindArg,
}

fn fake_request(kind: ResourceKind) -> CreateRecordRequest {
    let days_ago: i64 = (0i64..365).fake();
    let display_date = (Utc::now() - Duration::days(days_ago))
        .format("%Y-%m-%d")
        .to_string();

    CreateRecordRequest {
        title: Some(Sentence(3..8).fake()),
        body: Some(Paragraph(2..5).fake()),
        category: kind.has_category().then(|| Word().fake()),
        image_ref: Some(String::new()),
        display_date: Some(display_date),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("🌱 Starting database seeding...");

    // Initialize database connection
    let database_url = args.database_url.unwrap_or_else(|| {
        std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://comunicados.db?mode=rwc".to_string())
    });

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    // Run migrations first
    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let repo: Arc<dyn RecordRepository> = Arc::new(SqliteRecordRepository::new(db_pool.clone()));
    let service = RecordService::new(repo.clone());

    for kind in args.kind.kinds() {
        for _ in 0..args.count {
            service.create(kind, fake_request(kind)).await?;
        }

        let total = repo.count(kind).await?;
        println!("  ✅ {}: inserted {}, {} total", kind.table(), args.count, total);
    }

    println!("🎉 Seeding complete!");
    Ok(())
}
