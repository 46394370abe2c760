use std::collections::HashMap;

use crate::models::Poi;

/// Lowercased, whitespace-collapsed form used for every lexical match.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(|token| token.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized text keys for one catalog row, aligned with `Catalog::all_rows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchKeys {
    pub name: String,
    pub district: String,
    pub region: String,
}

impl MatchKeys {
    fn for_poi(poi: &Poi) -> Self {
        Self {
            name: normalize_text(&poi.name),
            district: normalize_text(&poi.district),
            region: normalize_text(&poi.region),
        }
    }
}

/// Read-only access to the POI table. The engine depends on this capability,
/// not on how the rows are stored.
pub trait Catalog: Send + Sync {
    fn all_rows(&self) -> &[Poi];

    /// Keys aligned positionally with `all_rows`.
    fn match_keys(&self) -> &[MatchKeys];

    fn rows_by_region(&self, region: &str) -> Vec<&Poi> {
        let key = normalize_text(region);
        self.all_rows()
            .iter()
            .zip(self.match_keys())
            .filter(|(_, keys)| keys.region == key)
            .map(|(poi, _)| poi)
            .collect()
    }

    fn rows_by_district(&self, district: &str) -> Vec<&Poi> {
        let key = normalize_text(district);
        self.all_rows()
            .iter()
            .zip(self.match_keys())
            .filter(|(_, keys)| keys.district == key)
            .map(|(poi, _)| poi)
            .collect()
    }

    /// Distinct district names ordered by their normalized form.
    fn districts(&self) -> Vec<&str>;

    fn region_of_district(&self, district: &str) -> Option<&str> {
        self.rows_by_district(district)
            .into_iter()
            .map(|poi| poi.region.as_str())
            .find(|region| !region.trim().is_empty())
    }

    fn len(&self) -> usize {
        self.all_rows().len()
    }

    fn is_empty(&self) -> bool {
        self.all_rows().is_empty()
    }
}

/// In-memory catalog with precomputed match keys and district/region indexes.
#[derive(Debug, Clone, Default)]
pub struct PoiTable {
    rows: Vec<Poi>,
    keys: Vec<MatchKeys>,
    by_region: HashMap<String, Vec<usize>>,
    by_district: HashMap<String, Vec<usize>>,
    districts: Vec<String>,
}

impl PoiTable {
    pub fn new(rows: Vec<Poi>) -> Self {
        let keys: Vec<MatchKeys> = rows.iter().map(MatchKeys::for_poi).collect();

        let mut by_region: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_district: HashMap<String, Vec<usize>> = HashMap::new();
        let mut districts: Vec<(String, String)> = Vec::new();

        for (idx, (poi, key)) in rows.iter().zip(&keys).enumerate() {
            by_region.entry(key.region.clone()).or_default().push(idx);

            let entry = by_district.entry(key.district.clone()).or_default();
            if entry.is_empty() && !key.district.is_empty() {
                districts.push((key.district.clone(), poi.district.trim().to_string()));
            }
            entry.push(idx);
        }

        districts.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            rows,
            keys,
            by_region,
            by_district,
            districts: districts.into_iter().map(|(_, name)| name).collect(),
        }
    }

    fn rows_at(&self, indexes: Option<&Vec<usize>>) -> Vec<&Poi> {
        indexes
            .map(|idxs| idxs.iter().map(|&idx| &self.rows[idx]).collect())
            .unwrap_or_default()
    }
}

impl Catalog for PoiTable {
    fn all_rows(&self) -> &[Poi] {
        &self.rows
    }

    fn match_keys(&self) -> &[MatchKeys] {
        &self.keys
    }

    fn rows_by_region(&self, region: &str) -> Vec<&Poi> {
        self.rows_at(self.by_region.get(&normalize_text(region)))
    }

    fn rows_by_district(&self, district: &str) -> Vec<&Poi> {
        self.rows_at(self.by_district.get(&normalize_text(district)))
    }

    fn districts(&self) -> Vec<&str> {
        self.districts.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixture_catalog, poi};

    #[test]
    fn normalization_collapses_whitespace_and_case() {
        assert_eq!(normalize_text("  Cafes   in\tthe EAST "), "cafes in the east");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn region_and_district_lookups_ignore_case() {
        let catalog = fixture_catalog();

        let east = catalog.rows_by_region("east");
        assert!(!east.is_empty());
        assert!(east.iter().all(|poi| poi.region == "EAST"));

        let orchard = catalog.rows_by_district("ORCHARD");
        assert!(orchard.iter().all(|poi| poi.district == "Orchard"));
        assert_eq!(orchard.len(), 5);
    }

    #[test]
    fn indexed_lookups_agree_with_default_scans() {
        struct Scan(PoiTable);

        impl Catalog for Scan {
            fn all_rows(&self) -> &[Poi] {
                self.0.all_rows()
            }
            fn match_keys(&self) -> &[MatchKeys] {
                self.0.match_keys()
            }
            fn districts(&self) -> Vec<&str> {
                self.0.districts()
            }
        }

        let table = fixture_catalog();
        let scan = Scan(table.clone());
        for district in table.districts() {
            assert_eq!(
                table.rows_by_district(district),
                scan.rows_by_district(district)
            );
        }
        for region in ["NORTH", "EAST", "WEST", "CENTRAL", "SOUTH"] {
            assert_eq!(table.rows_by_region(region), scan.rows_by_region(region));
        }
    }

    #[test]
    fn districts_are_distinct_and_sorted() {
        let catalog = fixture_catalog();
        let districts = catalog.districts();

        let mut sorted = districts.clone();
        sorted.sort_by_key(|d| d.to_lowercase());
        sorted.dedup();
        assert_eq!(districts, sorted);
        assert_eq!(catalog.region_of_district("jurong west"), Some("WEST"));
        assert_eq!(catalog.region_of_district("Atlantis"), None);
    }

    #[test]
    fn blank_district_is_not_listed() {
        let catalog = PoiTable::new(vec![
            poi("Nowhere Stall", "hawker", "  ", "EAST", 1.0),
            poi("Bedok Coffee House", "coffee", "Bedok", "EAST", 2.0),
        ]);
        assert_eq!(catalog.districts(), vec!["Bedok"]);
    }
}
