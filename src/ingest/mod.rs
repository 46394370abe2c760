pub mod rows;

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::db::Database;
use crate::models::{CatalogManifest, ImportRequest};

#[derive(Clone)]
pub struct CatalogImporter {
    db: Database,
}

#[derive(Debug, Clone)]
pub struct ImportResult {
    pub row_count: i64,
    pub defaulted_popularity: usize,
    pub skipped: bool,
}

impl CatalogImporter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Loads a JSON-lines catalog into the database. An unchanged source file is
    /// skipped unless `rebuild` is set.
    pub async fn import(&self, request: &ImportRequest) -> Result<ImportResult> {
        let path = Path::new(&request.source_path);
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read catalog source {}", path.display()))?;
        let source_hash = content_sha256(&content);

        if !request.rebuild {
            if let Some(latest) = self.db.latest_manifest().await? {
                if latest.source_hash == source_hash {
                    tracing::info!(
                        rows = latest.row_count,
                        "catalog source unchanged; skipped re-import"
                    );
                    return Ok(ImportResult {
                        row_count: latest.row_count,
                        defaulted_popularity: 0,
                        skipped: true,
                    });
                }
            }
        }

        let parsed = rows::parse_jsonl(&content)?;
        if parsed.rows.is_empty() {
            anyhow::bail!("no POI rows found in {}", path.display());
        }
        if parsed.defaulted_popularity > 0 {
            tracing::warn!(
                rows = parsed.defaulted_popularity,
                "popularity missing or invalid; defaulted to 1.0"
            );
        }

        self.db.replace_pois(&parsed.rows).await?;

        let row_count = parsed.rows.len() as i64;
        self.db
            .record_manifest(&CatalogManifest {
                source_hash,
                created_at: Utc::now(),
                row_count,
            })
            .await?;

        tracing::info!(rows = row_count, source = %path.display(), "catalog imported");

        Ok(ImportResult {
            row_count,
            defaulted_popularity: parsed.defaulted_popularity,
            skipped: false,
        })
    }
}

fn content_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"{"name": "Sentosa Beach", "category": "beach", "district": "Sentosa", "region": "SOUTH", "popularity": 5}
{"name": "Universal Studios", "category": "theme_park", "district": "Sentosa", "region": "SOUTH"}
"#;

    fn write_source(tag: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(format!(
            "spatialynk-import-{}-{}.jsonl",
            tag,
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn import_then_skip_unchanged_source() {
        let db = Database::in_memory().await.unwrap();
        let importer = CatalogImporter::new(db.clone());
        let request = ImportRequest {
            source_path: write_source("skip", SOURCE),
            rebuild: false,
        };

        let first = importer.import(&request).await.unwrap();
        assert!(!first.skipped);
        assert_eq!(first.row_count, 2);
        assert_eq!(first.defaulted_popularity, 1);

        let second = importer.import(&request).await.unwrap();
        assert!(second.skipped);
        assert_eq!(second.row_count, 2);

        let rebuilt = importer
            .import(&ImportRequest {
                rebuild: true,
                ..request.clone()
            })
            .await
            .unwrap();
        assert!(!rebuilt.skipped);

        std::fs::remove_file(&request.source_path).ok();
        assert_eq!(db.load_pois().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_source_is_an_error() {
        let db = Database::in_memory().await.unwrap();
        let importer = CatalogImporter::new(db);
        let request = ImportRequest {
            source_path: write_source("empty", "\n\n"),
            rebuild: false,
        };

        let result = importer.import(&request).await;
        std::fs::remove_file(&request.source_path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn hash_is_hex_sha256() {
        let hash = content_sha256("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
