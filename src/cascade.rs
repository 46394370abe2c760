use std::num::NonZeroUsize;
use std::sync::Arc;

use rand::Rng;

use crate::catalog::Catalog;
use crate::categories::{CategoryResolver, InterestFilter, Vocabulary};
use crate::explain;
use crate::models::{Explanation, Level, ParsedQuery, Poi, ResultEnvelope, SpatialScope, Widening};
use crate::parser::QueryParser;
use crate::selector::{rank_by_popularity, select};

/// Candidate pool chosen for a query, plus the level it is reported at.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub level: Level,
    pub widened_to: Option<Widening>,
    pub pool: Vec<&'a Poi>,
}

impl<'a> Resolution<'a> {
    fn at(level: Level, pool: Vec<&'a Poi>) -> Self {
        Self {
            level,
            widened_to: None,
            pool,
        }
    }
}

/// Query → scope/interest → candidate pool → bounded selection → explanation.
///
/// Holds only shared read-only state; every call builds its own views over the
/// catalog, so one instance serves concurrent requests.
pub struct Recommender<C: Catalog> {
    catalog: Arc<C>,
    vocabulary: Arc<Vocabulary>,
}

impl<C: Catalog> Clone for Recommender<C> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog.clone(),
            vocabulary: self.vocabulary.clone(),
        }
    }
}

impl<C: Catalog> Recommender<C> {
    pub fn new(catalog: Arc<C>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            catalog,
            vocabulary,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn parse(&self, query: &str) -> ParsedQuery {
        QueryParser::new(self.catalog.as_ref(), &self.vocabulary).parse(query)
    }

    pub fn recommend<R: Rng + ?Sized>(
        &self,
        query: &str,
        top_k: NonZeroUsize,
        rng: &mut R,
    ) -> ResultEnvelope {
        let parsed = self.parse(query);
        let resolution = self.resolve(&parsed, top_k);
        let results: Vec<Poi> = select(&resolution.pool, top_k, rng)
            .into_iter()
            .cloned()
            .collect();

        tracing::debug!(
            query,
            level = resolution.level.as_str(),
            pool = resolution.pool.len(),
            selected = results.len(),
            "resolved recommendation"
        );

        let poi_explanations = results
            .iter()
            .map(|poi| explain::poi_reason(poi, parsed.location.as_ref(), &parsed.categories))
            .collect();

        let scope_label = match resolution.level {
            Level::None | Level::City => None,
            _ => parsed
                .location
                .as_ref()
                .and_then(SpatialScope::label)
                .map(str::to_string),
        };

        ResultEnvelope {
            level: resolution.level,
            widened_to: resolution.widened_to,
            scope_label,
            results,
            explanation: Explanation {
                level_reason: explain::level_reason(
                    &parsed,
                    resolution.level,
                    resolution.widened_to,
                ),
                category_reason: explain::category_reason(&parsed.categories),
            },
            poi_explanations,
            parsed,
        }
    }

    /// Interest filter first, then the scope's spatial filter with fallbacks.
    /// Every spatial view that comes back empty drops to the interest pool.
    pub fn resolve(&self, parsed: &ParsedQuery, top_k: NonZeroUsize) -> Resolution<'_> {
        let resolver = CategoryResolver::new(&self.vocabulary);
        let interest = resolver.interest_filter(&parsed.categories);

        let interest_pool = ranked(&interest, self.catalog.all_rows());
        if interest_pool.is_empty() {
            return Resolution::at(Level::None, interest_pool);
        }

        let Some(scope) = parsed.location.as_ref() else {
            return Resolution::at(Level::City, interest_pool);
        };

        match scope {
            SpatialScope::City => Resolution::at(Level::City, interest_pool),
            SpatialScope::Region { name } => {
                let view = ranked(&interest, self.catalog.rows_by_region(name));
                if view.is_empty() {
                    tracing::debug!(region = %name, "region has no matching rows, using whole pool");
                    Resolution::at(Level::Region, interest_pool)
                } else {
                    Resolution::at(Level::Region, view)
                }
            }
            SpatialScope::District { name, region } => {
                let view = ranked(&interest, self.catalog.rows_by_district(name));
                if view.len() >= top_k.get() {
                    return Resolution::at(Level::District, view);
                }

                let region_view = region
                    .as_deref()
                    .map(|region| ranked(&interest, self.catalog.rows_by_region(region)))
                    .unwrap_or_default();
                let (widened_to, pool) = if region_view.is_empty() {
                    (Widening::City, interest_pool)
                } else {
                    (Widening::Region, region_view)
                };

                tracing::debug!(
                    district = %name,
                    district_rows = view.len(),
                    widened_to = ?widened_to,
                    "district too sparse, widening"
                );
                Resolution {
                    level: Level::DistrictFallback,
                    widened_to: Some(widened_to),
                    pool,
                }
            }
            SpatialScope::Poi { district, .. } => {
                let view = ranked(&interest, self.catalog.rows_by_district(district));
                if view.is_empty() {
                    Resolution::at(Level::Poi, interest_pool)
                } else {
                    Resolution::at(Level::Poi, view)
                }
            }
        }
    }
}

fn ranked<'p>(interest: &InterestFilter<'_>, rows: impl IntoIterator<Item = &'p Poi>) -> Vec<&'p Poi> {
    let mut pool = interest.apply(rows);
    rank_by_popularity(&mut pool);
    pool
}
