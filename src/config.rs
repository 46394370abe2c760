use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub default_top_k: usize,
    /// Fixed sampling seed; unset means every request draws fresh entropy.
    pub rng_seed: Option<u64>,
    pub vocabulary_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let data_dir = env::var("SPATIALYNK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        Self {
            bind_addr: env::var("SPATIALYNK_BIND")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            data_dir,
            default_top_k: env::var("SPATIALYNK_DEFAULT_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|k: &usize| *k > 0)
                .unwrap_or(5),
            rng_seed: env::var("SPATIALYNK_SEED")
                .ok()
                .and_then(|v| v.parse().ok()),
            vocabulary_path: env::var("SPATIALYNK_VOCABULARY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn sqlite_dsn(&self) -> String {
        format!(
            "sqlite://{}",
            self.data_dir.join("spatialynk.sqlite3").display()
        )
    }
}
