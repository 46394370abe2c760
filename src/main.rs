use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use spatialynk::cascade::Recommender;
use spatialynk::catalog::Catalog;
use spatialynk::categories::Vocabulary;
use spatialynk::db::Database;
use spatialynk::{run_server, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env();

    let db = Database::new(&config).await?;
    let catalog = db
        .load_catalog()
        .await
        .with_context(|| format!("loading catalog from {}", config.sqlite_dsn()))?;
    if let Some(manifest) = db.latest_manifest().await? {
        tracing::info!(
            rows = manifest.row_count,
            imported_at = %manifest.created_at,
            "catalog manifest"
        );
    }

    let vocabulary = Vocabulary::from_path(config.vocabulary_path.as_deref())?;
    tracing::info!(
        rows = catalog.all_rows().len(),
        districts = catalog.districts().len(),
        "catalog loaded"
    );

    let recommender = Recommender::new(Arc::new(catalog), Arc::new(vocabulary));

    run_server(config, recommender).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
