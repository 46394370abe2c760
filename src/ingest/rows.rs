use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{Poi, DEFAULT_POPULARITY};

/// One JSON-lines record as found on disk. Every field is optional and loosely
/// typed; `into_poi` coerces it into a catalog row.
#[derive(Debug, Deserialize)]
struct RawPoiRow {
    #[serde(default)]
    name: Value,
    #[serde(default)]
    category: Value,
    #[serde(default)]
    district: Value,
    #[serde(default)]
    region: Value,
    #[serde(default)]
    popularity: Value,
    #[serde(default)]
    lat: Value,
    #[serde(default)]
    lon: Value,
    #[serde(default)]
    price: Value,
    #[serde(default)]
    characteristic: Value,
}

#[derive(Debug, Default)]
pub struct ParsedRows {
    pub rows: Vec<Poi>,
    /// Rows whose popularity was missing or unusable and got the default.
    pub defaulted_popularity: usize,
}

impl RawPoiRow {
    fn into_poi(self) -> (Poi, bool) {
        let popularity = coerce_popularity(&self.popularity);
        let poi = Poi {
            name: coerce_text(&self.name),
            category: coerce_text(&self.category),
            district: coerce_text(&self.district),
            region: coerce_text(&self.region),
            popularity: popularity.unwrap_or(DEFAULT_POPULARITY),
            lat: coerce_number(&self.lat),
            lon: coerce_number(&self.lon),
            price: optional_text(&self.price),
            characteristic: optional_text(&self.characteristic),
        };
        (poi, popularity.is_none())
    }
}

pub fn parse_jsonl(content: &str) -> Result<ParsedRows> {
    let mut parsed = ParsedRows::default();

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let raw: RawPoiRow = serde_json::from_str(line)
            .with_context(|| format!("catalog line {} is not a JSON object", idx + 1))?;
        let (poi, defaulted) = raw.into_poi();
        if defaulted {
            parsed.defaulted_popularity += 1;
        }
        parsed.rows.push(poi);
    }

    Ok(parsed)
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    }
}

fn optional_text(value: &Value) -> Option<String> {
    let text = coerce_text(value);
    (!text.is_empty()).then_some(text)
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn coerce_popularity(value: &Value) -> Option<f64> {
    coerce_number(value).filter(|popularity| *popularity >= 0.0)
}
