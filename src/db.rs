use std::str::FromStr;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::catalog::PoiTable;
use crate::config::AppConfig;
use crate::models::{CatalogManifest, Poi, DEFAULT_POPULARITY};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let options = SqliteConnectOptions::from_str(&config.sqlite_dsn())?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Single-connection in-memory database; each connection would otherwise
    /// see its own empty schema.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pois (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                district TEXT NOT NULL,
                region TEXT NOT NULL,
                popularity REAL NOT NULL,
                lat REAL,
                lon REAL,
                price TEXT,
                characteristic TEXT
            );

            CREATE TABLE IF NOT EXISTS catalog_manifests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                row_count INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces the whole catalog in one transaction. Row ids follow input order.
    pub async fn replace_pois(&self, pois: &[Poi]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM pois").execute(&mut *tx).await?;

        for (idx, poi) in pois.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO pois (id, name, category, district, region, popularity, lat, lon, price, characteristic)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(idx as i64)
            .bind(&poi.name)
            .bind(&poi.category)
            .bind(&poi.district)
            .bind(&poi.region)
            .bind(poi.popularity)
            .bind(poi.lat)
            .bind(poi.lon)
            .bind(&poi.price)
            .bind(&poi.characteristic)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn load_pois(&self) -> Result<Vec<Poi>> {
        let rows = sqlx::query(
            r#"
            SELECT name, category, district, region, popularity, lat, lon, price, characteristic
            FROM pois
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_poi).collect())
    }

    /// Loads the stored rows into a serving catalog; an empty store is fatal.
    pub async fn load_catalog(&self) -> Result<PoiTable> {
        let pois = self.load_pois().await?;
        if pois.is_empty() {
            anyhow::bail!("POI catalog is empty; run the import binary before serving");
        }
        Ok(PoiTable::new(pois))
    }

    pub async fn record_manifest(&self, manifest: &CatalogManifest) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO catalog_manifests (source_hash, created_at, row_count)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&manifest.source_hash)
        .bind(manifest.created_at.to_rfc3339())
        .bind(manifest.row_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn latest_manifest(&self) -> Result<Option<CatalogManifest>> {
        let row = sqlx::query(
            r#"
            SELECT source_hash, created_at, row_count
            FROM catalog_manifests
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let created_at: String = row.get("created_at");
            CatalogManifest {
                source_hash: row.get("source_hash"),
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
                row_count: row.get("row_count"),
            }
        }))
    }
}

fn row_to_poi(row: SqliteRow) -> Poi {
    let popularity: f64 = row.get("popularity");
    Poi {
        name: row.get("name"),
        category: row.get("category"),
        district: row.get("district"),
        region: row.get("region"),
        popularity: if popularity.is_finite() && popularity >= 0.0 {
            popularity
        } else {
            DEFAULT_POPULARITY
        },
        lat: row.get("lat"),
        lon: row.get("lon"),
        price: row.get("price"),
        characteristic: row.get("characteristic"),
    }
}
