//! Core domain model for cleanlabel ingredient analysis.
//!
//! This crate defines the fundamental types used throughout the system:
//! - `Product`: The normalized product record handed over by a product source
//! - `IngredientRecord`: Educational metadata from the knowledge base
//! - `IngredientFlag` / `SneakyMatch`: Per-product findings
//! - `SodiumAnalysis`, `Score`, `ScoreBreakdownItem`: The verdict
//! - `AnalysisResult` / `ScanOutcome`: What the presentation layer renders

use serde::{Deserialize, Serialize};

/// A reference backing an educational claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub label: String,
    pub url: String,
}

impl Citation {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Broad category of a knowledge-base ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Additive,
    Sweetener,
    Oil,
    Emulsifier,
    Preservative,
    Flavoring,
    Coloring,
}

/// How concerning an ingredient is. Display only, never used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcernLevel {
    Low,
    #[serde(alias = "med")]
    Medium,
    High,
}

impl ConcernLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low concern",
            Self::Medium => "Moderate concern",
            Self::High => "High concern",
        }
    }
}

/// A knowledge-base entry describing one canonical ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    /// Display name
    pub name: String,

    /// Plain-language definition
    pub definition: String,

    /// Alternate spellings and E-numbers used for fuzzy lookup
    #[serde(default)]
    pub synonyms: Vec<String>,

    pub category: IngredientCategory,

    pub concern_level: ConcernLevel,

    /// Why manufacturers add it
    #[serde(default)]
    pub why_used: Vec<String>,

    /// Why it may be concerning
    #[serde(default)]
    pub why_concerned: Vec<String>,

    /// Whole-food substitutes
    #[serde(default)]
    pub better_alternatives: Vec<String>,

    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// An ultra-processed marker found in a product's ingredients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientFlag {
    /// The literal (lowercased) text that matched
    pub ingredient: String,

    /// Why this marker is concerning
    pub reason: String,

    /// Knowledge-base record, `None` when the ingredient is unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intel: Option<IngredientRecord>,
}

impl IngredientFlag {
    pub fn new(ingredient: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            ingredient: ingredient.into(),
            reason: reason.into(),
            intel: None,
        }
    }

    /// Whether the knowledge base recognized this ingredient.
    pub fn is_known(&self) -> bool {
        self.intel.is_some()
    }
}

/// A euphemistic or misleading labeling term found in a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SneakyMatch {
    pub term: String,
    pub matched_text: String,
    pub explanation: String,
    pub what_to_look_for: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Sodium risk tier, per 100 g.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SodiumLevel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SodiumAnalysis {
    /// Sodium per 100 g
    pub milligrams: u32,

    /// Percent of the reference daily value, may exceed 100
    pub percent_dv: u32,

    pub level: SodiumLevel,
}

/// Direction in which a factor moved the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Neutral,
    Negative,
}

/// One line of the "why this score" audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdownItem {
    pub label: String,
    pub impact: Impact,
}

impl ScoreBreakdownItem {
    pub fn new(label: impl Into<String>, impact: Impact) -> Self {
        Self {
            label: label.into(),
            impact,
        }
    }
}

/// Final categorical verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    Good,
    Okay,
    Poor,
}

impl Score {
    /// Get the consumer-facing label for this score.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Whole",
            Self::Okay => "Questionable",
            Self::Poor => "Slop",
        }
    }
}

/// A whole-food substitute suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub name: String,
    pub why: String,
}

impl Alternative {
    pub fn new(name: impl Into<String>, why: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            why: why.into(),
        }
    }
}

/// Nutrition facts per 100 g. Only sodium is interpreted by the analysis core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionData {
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub saturated_fat: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub sugars: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,

    /// Sodium in milligrams, already converted and rounded by the source
    #[serde(default)]
    pub sodium: Option<u32>,
}

/// A normalized product record.
///
/// Produced by a product source; `ingredients_list` holds lowercase tokens
/// with parenthetical sub-ingredients already stripped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Barcode
    pub code: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub brand: String,

    /// Raw ingredient text as printed on the label
    #[serde(default)]
    pub ingredients: String,

    #[serde(default)]
    pub ingredients_list: Vec<String>,

    #[serde(default)]
    pub nutrition: NutritionData,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// NOVA processing group (1-4)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nova_group: Option<u8>,
}

impl Product {
    /// Create a minimal product for testing.
    pub fn new<I, S>(code: impl Into<String>, ingredients_list: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ingredients_list: Vec<String> = ingredients_list.into_iter().map(Into::into).collect();
        Self {
            code: code.into(),
            ingredients: ingredients_list.join(", "),
            ingredients_list,
            ..Default::default()
        }
    }

    pub fn with_nova_group(mut self, nova_group: u8) -> Self {
        self.nova_group = Some(nova_group);
        self
    }

    pub fn with_sodium(mut self, milligrams: u32) -> Self {
        self.nutrition.sodium = Some(milligrams);
        self
    }
}

/// Everything the presentation layer needs for one analyzed product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub product: Product,
    pub flags: Vec<IngredientFlag>,
    pub sneaky: Vec<SneakyMatch>,

    /// `None` when the product has no sodium data
    pub sodium: Option<SodiumAnalysis>,

    pub score: Score,
    pub breakdown: Vec<ScoreBreakdownItem>,
    pub alternatives: Vec<Alternative>,
}

/// Category of a product-fetch failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    InvalidBarcode,
    NotFound,
    RateLimited,
    Network,
    Server,
    Unknown,
}

impl FetchErrorKind {
    /// Get a category-specific title for this failure.
    pub fn title(&self) -> &'static str {
        match self {
            Self::InvalidBarcode => "Invalid Barcode",
            Self::NotFound => "Product Not Found",
            Self::RateLimited => "Too Many Requests",
            Self::Network => "Connection Error",
            Self::Server => "Server Error",
            Self::Unknown => "Something Went Wrong",
        }
    }

    /// Whether the user should be offered a search by product name.
    pub fn offers_manual_search(&self) -> bool {
        matches!(self, Self::NotFound | Self::Unknown)
    }
}

/// Result of a single product lookup as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ScanOutcome {
    Analyzed(Box<AnalysisResult>),
    Failed { kind: FetchErrorKind, message: String },
}

impl ScanOutcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Analyzed(result) => Some(result),
            Self::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_concern_level_accepts_med_alias() {
        let level: ConcernLevel = serde_json::from_str("\"med\"").unwrap();
        assert_eq!(level, ConcernLevel::Medium);
        assert_eq!(serde_json::to_string(&level).unwrap(), "\"medium\"");
        assert!(ConcernLevel::High > ConcernLevel::Low);
    }

    #[test]
    fn test_product_deserializes_with_defaults() {
        let json = r#"{"code": "0123456789012", "ingredients_list": ["water", "salt"], "nova_group": 2}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.ingredients_list, vec!["water", "salt"]);
        assert_eq!(product.nova_group, Some(2));
        assert_eq!(product.nutrition.sodium, None);
    }

    #[test]
    fn test_flag_without_intel_omits_field() {
        let flag = IngredientFlag::new("red 40", "Artificial color");
        assert!(!flag.is_known());
        let json = serde_json::to_string(&flag).unwrap();
        assert!(!json.contains("intel"));
    }

    #[test]
    fn test_manual_search_offered_only_for_not_found_and_unknown() {
        assert!(FetchErrorKind::NotFound.offers_manual_search());
        assert!(FetchErrorKind::Unknown.offers_manual_search());
        assert!(!FetchErrorKind::Network.offers_manual_search());
        assert!(!FetchErrorKind::RateLimited.offers_manual_search());
    }

    #[test]
    fn test_scan_outcome_tagging() {
        let outcome = ScanOutcome::Failed {
            kind: FetchErrorKind::NotFound,
            message: "Product not found".to_string(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("\"view\":\"failed\""));
        assert!(json.contains("\"kind\":\"not_found\""));
        assert!(outcome.result().is_none());
    }
}
