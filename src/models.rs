use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_POPULARITY: f64 = 1.0;
pub const CITY_NAME: &str = "Singapore";

/// One catalog row. The row's identity is its position in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Poi {
    pub name: String,
    pub category: String,
    pub district: String,
    pub region: String,
    #[serde(default = "default_popularity")]
    pub popularity: f64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub characteristic: Option<String>,
}

fn default_popularity() -> f64 {
    DEFAULT_POPULARITY
}

/// The spatial granularity a query resolved to, carrying only the fields that
/// granularity needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum SpatialScope {
    City,
    Region {
        name: String,
    },
    District {
        name: String,
        region: Option<String>,
    },
    Poi {
        name: String,
        district: String,
        region: String,
        lat: Option<f64>,
        lon: Option<f64>,
    },
}

impl SpatialScope {
    pub fn priority(&self) -> u8 {
        match self {
            SpatialScope::City => 0,
            SpatialScope::Region { .. } => 1,
            SpatialScope::District { .. } => 2,
            SpatialScope::Poi { .. } => 3,
        }
    }

    /// Display name of the scope target; the city scope has none.
    pub fn label(&self) -> Option<&str> {
        match self {
            SpatialScope::City => None,
            SpatialScope::Region { name }
            | SpatialScope::District { name, .. }
            | SpatialScope::Poi { name, .. } => Some(name),
        }
    }

    pub fn district(&self) -> Option<&str> {
        match self {
            SpatialScope::District { name, .. } => Some(name),
            SpatialScope::Poi { district, .. } => Some(district),
            _ => None,
        }
    }

    pub fn region(&self) -> Option<&str> {
        match self {
            SpatialScope::Region { name } => Some(name),
            SpatialScope::District { region, .. } => region.as_deref(),
            SpatialScope::Poi { region, .. } => Some(region),
            SpatialScope::City => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedQuery {
    pub raw_query: String,
    pub location: Option<SpatialScope>,
    pub categories: BTreeSet<String>,
}

/// The effective level reported after any fallback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    City,
    Region,
    District,
    DistrictFallback,
    Poi,
    None,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::City => "city",
            Level::Region => "region",
            Level::District => "district",
            Level::DistrictFallback => "district_fallback",
            Level::Poi => "poi",
            Level::None => "none",
        }
    }
}

/// Pool a sparse district was widened to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Widening {
    Region,
    City,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    pub level_reason: String,
    pub category_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub level: Level,
    pub widened_to: Option<Widening>,
    pub scope_label: Option<String>,
    pub results: Vec<Poi>,
    pub explanation: Explanation,
    pub poi_explanations: Vec<String>,
    pub parsed: ParsedQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseQueryRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseQueryResponse {
    pub raw_query: String,
    pub parsed: ParsedQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub catalog_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    pub source_path: String,
    #[serde(default)]
    pub rebuild: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub source_hash: String,
    pub created_at: DateTime<Utc>,
    pub row_count: i64,
}
