//! Sentences describing decisions the cascade already made. Nothing here looks
//! at the catalog or re-runs any matching.

use std::collections::BTreeSet;

use crate::models::{Level, ParsedQuery, Poi, SpatialScope, Widening, CITY_NAME};

pub fn level_reason(parsed: &ParsedQuery, level: Level, widened_to: Option<Widening>) -> String {
    let scope = match (level, parsed.location.as_ref()) {
        (Level::None, _) => return "Could not find any places matching your request.".to_string(),
        (_, None) => {
            return format!(
                "No specific location detected. Showing recommendations across {CITY_NAME}."
            )
        }
        (_, Some(scope)) => scope,
    };
    let name = scope.label().unwrap_or(CITY_NAME);

    match level {
        Level::Region => format!("Your query referenced the region '{name}'."),
        Level::District => format!("Your query referenced the district '{name}'."),
        Level::DistrictFallback => match (widened_to, scope.region()) {
            (Some(Widening::Region), Some(region)) => format!(
                "Too few places found in district '{name}', so results were expanded to the region '{region}'."
            ),
            _ => format!(
                "Too few places found in district '{name}', so results were expanded across {CITY_NAME}."
            ),
        },
        Level::Poi => format!(
            "You mentioned a specific place ('{name}'), so showing nearby places in the same district."
        ),
        Level::City | Level::None => format!("Showing recommendations across {CITY_NAME}."),
    }
}

pub fn category_reason(categories: &BTreeSet<String>) -> String {
    if categories.is_empty() {
        return "No specific intent detected. Showing popular or relevant places.".to_string();
    }

    let formatted = categories
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("These places match your interests: {formatted}.")
}

pub fn poi_reason(poi: &Poi, scope: Option<&SpatialScope>, categories: &BTreeSet<String>) -> String {
    let mut reasons = Vec::with_capacity(2);

    if categories.is_empty() {
        reasons.push("Recommended due to high popularity.".to_string());
    } else {
        reasons.push(format!(
            "Matches your interest category '{}'.",
            poi.category
        ));
    }

    if let Some(scope) = scope {
        if scope
            .district()
            .is_some_and(|district| district.eq_ignore_ascii_case(poi.district.trim()))
        {
            reasons.push(format!("Located in the requested district '{}'.", poi.district));
        } else if scope
            .region()
            .is_some_and(|region| region.eq_ignore_ascii_case(poi.region.trim()))
        {
            reasons.push(format!("Located in the requested region '{}'.", poi.region));
        }
    }

    reasons.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::poi;

    fn parsed(location: Option<SpatialScope>, categories: &[&str]) -> ParsedQuery {
        ParsedQuery {
            raw_query: "query".to_string(),
            location,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn district_scope() -> SpatialScope {
        SpatialScope::District {
            name: "Sembawang".to_string(),
            region: Some("NORTH".to_string()),
        }
    }

    #[test]
    fn level_reason_without_location_mentions_city() {
        let reason = level_reason(&parsed(None, &[]), Level::City, None);
        assert!(reason.starts_with("No specific location detected"));
        assert!(reason.contains("Singapore"));
    }

    #[test]
    fn fallback_reason_names_the_widened_pool() {
        let query = parsed(Some(district_scope()), &[]);

        let to_region = level_reason(&query, Level::DistrictFallback, Some(Widening::Region));
        assert!(to_region.contains("'Sembawang'"));
        assert!(to_region.contains("region 'NORTH'"));

        let to_city = level_reason(&query, Level::DistrictFallback, Some(Widening::City));
        assert!(to_city.contains("across Singapore"));
    }

    #[test]
    fn empty_outcome_overrides_scope() {
        let query = parsed(Some(district_scope()), &["food"]);
        assert_eq!(
            level_reason(&query, Level::None, None),
            "Could not find any places matching your request."
        );
    }

    #[test]
    fn category_reason_lists_sorted_interests() {
        let categories: BTreeSet<String> =
            ["shopping", "cafe"].iter().map(|c| c.to_string()).collect();
        assert_eq!(
            category_reason(&categories),
            "These places match your interests: cafe, shopping."
        );
        assert!(category_reason(&BTreeSet::new()).starts_with("No specific intent"));
    }

    #[test]
    fn poi_reason_combines_interest_and_location() {
        let scope = district_scope();
        let categories: BTreeSet<String> = ["nature".to_string()].into();

        let inside = poi("Sembawang Park", "park", "Sembawang", "NORTH", 2.0);
        assert_eq!(
            poi_reason(&inside, Some(&scope), &categories),
            "Matches your interest category 'park'. Located in the requested district 'Sembawang'."
        );

        let widened = poi("Hougang Mall", "shopping_mall", "Hougang", "NORTH", 4.0);
        assert_eq!(
            poi_reason(&widened, Some(&scope), &BTreeSet::new()),
            "Recommended due to high popularity. Located in the requested region 'NORTH'."
        );

        let elsewhere = poi("Sentosa Beach", "beach", "Sentosa", "SOUTH", 5.0);
        assert_eq!(
            poi_reason(&elsewhere, None, &categories),
            "Matches your interest category 'beach'."
        );
    }
}
