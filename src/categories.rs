use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::Poi;

const KEYWORDS: &[(&str, &str)] = &[
    // food & drink
    ("food", "food"),
    ("eat", "food"),
    ("dinner", "food"),
    ("lunch", "food"),
    ("breakfast", "food"),
    ("supper", "food"),
    ("restaurant", "food"),
    ("restaurants", "food"),
    ("hawker", "food"),
    ("local food", "food"),
    ("street food", "food"),
    // cafes
    ("cafe", "cafe"),
    ("cafes", "cafe"),
    ("coffee", "cafe"),
    ("brunch", "cafe"),
    ("tea", "cafe"),
    // shopping
    ("shop", "shopping"),
    ("shopping", "shopping"),
    ("mall", "shopping"),
    ("malls", "shopping"),
    ("boutique", "shopping"),
    ("buy clothes", "shopping"),
    // outdoors
    ("park", "nature"),
    ("parks", "nature"),
    ("hike", "nature"),
    ("hiking", "nature"),
    ("nature", "nature"),
    ("garden", "nature"),
    ("gardens", "nature"),
    ("zoo", "nature"),
    ("river", "nature"),
    ("beach", "nature"),
    // culture
    ("museum", "culture"),
    ("museums", "culture"),
    ("gallery", "culture"),
    ("art", "culture"),
    ("temple", "culture"),
    ("heritage", "culture"),
    ("history", "culture"),
    // activities
    ("fun things", "activities"),
    ("things to do", "activities"),
    ("activities", "activities"),
    ("date ideas", "activities"),
    ("romantic", "activities"),
    ("axe throwing", "activities"),
    ("escape room", "activities"),
    ("arcade", "activities"),
    ("bowling", "activities"),
    ("indoor playground", "activities"),
    // nightlife
    ("bar", "nightlife"),
    ("bars", "nightlife"),
    ("club", "nightlife"),
    ("clubs", "nightlife"),
    ("drinks", "nightlife"),
    ("cocktails", "nightlife"),
];

const GENERIC_PHRASES: &[&str] = &["things to do", "what to do", "fun"];
const GENERIC_CATEGORY: &str = "activities";

const CATEGORY_LABELS: &[(&str, &[&str])] = &[
    ("food", &["restaurant", "hawker", "eatery", "bistro"]),
    ("cafe", &["cafe", "coffee", "dessert_cafe", "tea_house"]),
    ("shopping", &["shopping_mall", "market", "boutique"]),
    (
        "nature",
        &["park", "garden", "nature_reserve", "zoo", "beach"],
    ),
    ("culture", &["museum", "gallery", "temple", "heritage"]),
    (
        "activities",
        &[
            "activity_center",
            "sports_center",
            "arcade",
            "escape_room",
            "axe_throwing",
            "indoor_playground",
            "theme_park",
            "attraction",
        ],
    ),
    ("nightlife", &["bar", "club", "lounge"]),
];

const BORING_LABELS: &[&str] = &[
    "supermarket",
    "grocery",
    "atm",
    "convenience",
    "clinic",
    "bank",
    "office",
    "service",
    "pharmacy",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub phrase: String,
    pub category: String,
}

/// Static lookup tables shared by the query parser and the category resolver.
/// Built once at startup and only ever borrowed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub keywords: Vec<KeywordRule>,
    /// Broad phrasing that always implies `generic_category`.
    pub generic_phrases: Vec<String>,
    pub generic_category: String,
    pub category_labels: BTreeMap<String, Vec<String>>,
    pub boring_labels: BTreeSet<String>,
}

impl Vocabulary {
    pub fn builtin() -> Self {
        Self {
            keywords: KEYWORDS
                .iter()
                .map(|(phrase, category)| KeywordRule {
                    phrase: phrase.to_string(),
                    category: category.to_string(),
                })
                .collect(),
            generic_phrases: GENERIC_PHRASES.iter().map(|p| p.to_string()).collect(),
            generic_category: GENERIC_CATEGORY.to_string(),
            category_labels: CATEGORY_LABELS
                .iter()
                .map(|(category, labels)| {
                    (
                        category.to_string(),
                        labels.iter().map(|l| l.to_string()).collect(),
                    )
                })
                .collect(),
            boring_labels: BORING_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Loads a vocabulary from a JSON file with the same shape as `builtin()`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read vocabulary {}", path.display()))?;
        let mut vocabulary: Vocabulary = serde_json::from_str(&raw)
            .with_context(|| format!("invalid vocabulary JSON in {}", path.display()))?;

        for rule in &mut vocabulary.keywords {
            rule.phrase = crate::catalog::normalize_text(&rule.phrase);
        }
        vocabulary.keywords.retain(|rule| !rule.phrase.is_empty());
        for phrase in &mut vocabulary.generic_phrases {
            *phrase = crate::catalog::normalize_text(phrase);
        }
        vocabulary.generic_phrases.retain(|phrase| !phrase.is_empty());

        Ok(vocabulary)
    }

    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }
}

/// How the candidate pool is narrowed by interest before any spatial filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterestFilter<'v> {
    /// Keep only rows whose concrete label is listed.
    Labels(BTreeSet<String>),
    /// Broad exploration: drop rows with a boring label.
    Exploration(&'v BTreeSet<String>),
}

impl InterestFilter<'_> {
    pub fn admits(&self, poi: &Poi) -> bool {
        match self {
            InterestFilter::Labels(labels) => labels.contains(poi.category.as_str()),
            InterestFilter::Exploration(boring) => !boring.contains(poi.category.as_str()),
        }
    }

    pub fn apply<'p>(&self, rows: impl IntoIterator<Item = &'p Poi>) -> Vec<&'p Poi> {
        rows.into_iter().filter(|poi| self.admits(poi)).collect()
    }
}

pub struct CategoryResolver<'v> {
    vocabulary: &'v Vocabulary,
}

impl<'v> CategoryResolver<'v> {
    pub fn new(vocabulary: &'v Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn resolve(&self, categories: &BTreeSet<String>) -> BTreeSet<String> {
        categories
            .iter()
            .filter_map(|category| self.vocabulary.category_labels.get(category))
            .flatten()
            .cloned()
            .collect()
    }

    pub fn is_boring(&self, label: &str) -> bool {
        self.vocabulary.boring_labels.contains(label)
    }

    pub fn exploration_filter<'p>(&self, candidates: Vec<&'p Poi>) -> Vec<&'p Poi> {
        candidates
            .into_iter()
            .filter(|poi| !self.is_boring(&poi.category))
            .collect()
    }

    /// Label filter when the categories map to concrete labels, exploration
    /// otherwise (no categories, or only unmapped ones).
    pub fn interest_filter(&self, categories: &BTreeSet<String>) -> InterestFilter<'v> {
        let labels = self.resolve(categories);
        if labels.is_empty() {
            InterestFilter::Exploration(&self.vocabulary.boring_labels)
        } else {
            InterestFilter::Labels(labels)
        }
    }
}
