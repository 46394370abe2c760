use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::{normalize_text, Catalog};
use crate::categories::Vocabulary;
use crate::models::{ParsedQuery, SpatialScope};

const CITY_TOKEN: &str = "singapore";

const COMPASS_REGIONS: &[(&str, &str)] = &[
    ("east", "EAST"),
    ("west", "WEST"),
    ("north", "NORTH"),
    ("south", "SOUTH"),
    ("central", "CENTRAL"),
];

/// Lexical query parser over a catalog's place vocabulary and the static
/// keyword table.
pub struct QueryParser<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    vocabulary: &'a Vocabulary,
}

impl<'a, C: Catalog + ?Sized> QueryParser<'a, C> {
    pub fn new(catalog: &'a C, vocabulary: &'a Vocabulary) -> Self {
        Self {
            catalog,
            vocabulary,
        }
    }

    pub fn parse(&self, query: &str) -> ParsedQuery {
        ParsedQuery {
            raw_query: query.to_string(),
            location: self.extract_scope(query),
            categories: self.extract_categories(query),
        }
    }

    pub fn extract_scope(&self, query: &str) -> Option<SpatialScope> {
        let q = normalize_text(query);
        if q.is_empty() {
            return None;
        }

        if q.contains(CITY_TOKEN) {
            return Some(SpatialScope::City);
        }

        self.direct_match(&q)
            .or_else(|| self.fuzzy_district(&q))
            .or_else(|| compass_region(&q))
    }

    pub fn extract_categories(&self, query: &str) -> BTreeSet<String> {
        let q = normalize_text(query);
        let mut found: BTreeSet<String> = self
            .vocabulary
            .keywords
            .iter()
            .filter(|rule| q.contains(rule.phrase.as_str()))
            .map(|rule| rule.category.clone())
            .collect();

        if self
            .vocabulary
            .generic_phrases
            .iter()
            .any(|phrase| q.contains(phrase.as_str()))
        {
            found.insert(self.vocabulary.generic_category.clone());
        }

        found
    }

    /// Most specific place whose name, district or region occurs in the query.
    /// Equal specificity keeps the first row in catalog order.
    fn direct_match(&self, q: &str) -> Option<SpatialScope> {
        let mut best: Option<SpatialScope> = None;

        for (poi, keys) in self.catalog.all_rows().iter().zip(self.catalog.match_keys()) {
            let mut consider = |scope: SpatialScope| {
                if best
                    .as_ref()
                    .map_or(true, |current| scope.priority() > current.priority())
                {
                    best = Some(scope);
                }
            };

            if occurs_in(&keys.name, q) {
                consider(SpatialScope::Poi {
                    name: poi.name.clone(),
                    district: poi.district.clone(),
                    region: poi.region.clone(),
                    lat: poi.lat,
                    lon: poi.lon,
                });
            }
            if occurs_in(&keys.district, q) {
                consider(SpatialScope::District {
                    name: poi.district.clone(),
                    region: non_blank(&poi.region),
                });
            }
            if occurs_in(&keys.region, q) {
                consider(SpatialScope::Region {
                    name: poi.region.clone(),
                });
            }

            if matches!(best, Some(SpatialScope::Poi { .. })) {
                break;
            }
        }

        best
    }

    fn fuzzy_district(&self, q: &str) -> Option<SpatialScope> {
        let tokens: Vec<&str> = q.split(' ').collect();

        self.catalog.districts().into_iter().find_map(|district| {
            let key = normalize_text(district);
            let hit = key.contains(q)
                || q.contains(key.as_str())
                || tokens.iter().any(|token| key.contains(token));

            hit.then(|| SpatialScope::District {
                name: district.to_string(),
                region: self.catalog.region_of_district(district).map(str::to_string),
            })
        })
    }
}

fn occurs_in(key: &str, q: &str) -> bool {
    !key.is_empty() && q.contains(key)
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Word-bounded compass patterns, kept in `COMPASS_REGIONS` order.
fn compass_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        COMPASS_REGIONS
            .iter()
            .filter_map(|(word, region)| {
                Regex::new(&format!(r"\b{word}\b"))
                    .ok()
                    .map(|re| (re, *region))
            })
            .collect()
    })
}

fn compass_region(q: &str) -> Option<SpatialScope> {
    compass_patterns().iter().find_map(|(re, region)| {
        re.is_match(q).then(|| SpatialScope::Region {
            name: region.to_string(),
        })
    })
}
