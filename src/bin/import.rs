use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use spatialynk::config::AppConfig;
use spatialynk::db::Database;
use spatialynk::ingest::CatalogImporter;
use spatialynk::models::ImportRequest;

#[derive(Parser, Debug)]
#[command(name = "import")]
#[command(about = "Load a JSON-lines POI catalog into the local database")]
struct Cli {
    #[arg(long)]
    source: String,
    #[arg(long, default_value_t = false)]
    rebuild: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::from_env();
    let db = Database::new(&config).await?;
    let importer = CatalogImporter::new(db);

    let request = ImportRequest {
        source_path: cli.source,
        rebuild: cli.rebuild,
    };
    let result = importer.import(&request).await?;

    println!(
        "Import complete. skipped={} rows={} defaulted_popularity={}",
        result.skipped, result.row_count, result.defaulted_popularity
    );

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
