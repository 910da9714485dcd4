//! Scoring for analyzed products.
//!
//! Aggregates marker flags, NOVA group, sneaky-ingredient count and sodium
//! tier into a categorical verdict with an ordered breakdown, and composes
//! the full analysis pipeline.

use cleanlabel_explain::suggest_alternatives;
use cleanlabel_features::{analyze_ingredients, analyze_sodium, detect_sneaky_ingredients};
use cleanlabel_intel::{enrich_flags, knowledge_base, IngredientLookup};
use cleanlabel_model::{
    AnalysisResult, Impact, IngredientFlag, Product, Score, ScoreBreakdownItem, SodiumAnalysis,
    SodiumLevel,
};
use serde::{Deserialize, Serialize};

/// Total penalty at or above which a product is rated poor.
pub const POOR_PENALTY: u32 = 3;

/// Score plus the audit trail that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: Score,
    pub penalty: u32,
    pub breakdown: Vec<ScoreBreakdownItem>,
}

/// Map a total penalty onto a score.
pub fn score_for_penalty(penalty: u32) -> Score {
    match penalty {
        0 => Score::Good,
        p if p >= POOR_PENALTY => Score::Poor,
        _ => Score::Okay,
    }
}

/// Compute the score for a product's findings.
///
/// Every rule is independent and additive, and each one that applies adds
/// exactly one breakdown entry. Entries are ordered flags, NOVA, sneaky,
/// sodium, sweetener, trans fat regardless of input order.
pub fn compute_score(
    flags: &[IngredientFlag],
    nova_group: Option<u8>,
    sneaky_count: usize,
    sodium: Option<&SodiumAnalysis>,
) -> ScoreReport {
    let mut penalty = 0;
    let mut breakdown = Vec::new();
    let mut add = |points: u32, label: String, impact: Impact| {
        penalty += points;
        breakdown.push(ScoreBreakdownItem::new(label, impact));
    };

    match flags.len() {
        0 => add(0, "No flagged additives".to_string(), Impact::Positive),
        n @ 1..=2 => add(1, count_label(n, "flagged additive"), Impact::Negative),
        n => add(2, count_label(n, "flagged additive"), Impact::Negative),
    }

    match nova_group {
        Some(4) => add(2, "Ultra-processed food (NOVA 4)".to_string(), Impact::Negative),
        Some(3) => add(1, "Processed food (NOVA 3)".to_string(), Impact::Negative),
        Some(2) => add(0, "Processed culinary ingredient (NOVA 2)".to_string(), Impact::Neutral),
        Some(1) => add(0, "Unprocessed or minimally processed (NOVA 1)".to_string(), Impact::Positive),
        _ => {}
    }

    if sneaky_count > 0 {
        add(1, count_label(sneaky_count, "sneaky ingredient"), Impact::Negative);
    }

    if let Some(sodium) = sodium {
        match sodium.level {
            SodiumLevel::High => add(
                1,
                format!("High sodium ({} mg per 100g)", sodium.milligrams),
                Impact::Negative,
            ),
            SodiumLevel::Moderate => add(0, "Moderate sodium".to_string(), Impact::Neutral),
            SodiumLevel::Low => add(0, "Low sodium".to_string(), Impact::Positive),
        }
    }

    // Charged on top of the flag-count penalty for the same flags
    if any_reason(flags, &["artificial sweetener"]) {
        add(1, "Contains artificial sweeteners".to_string(), Impact::Negative);
    }

    if any_reason(flags, &["trans fat", "hydrogenated"]) {
        add(1, "Contains trans fats / hydrogenated oils".to_string(), Impact::Negative);
    }

    ScoreReport {
        score: score_for_penalty(penalty),
        penalty,
        breakdown,
    }
}

fn count_label(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn any_reason(flags: &[IngredientFlag], needles: &[&str]) -> bool {
    flags.iter().any(|flag| {
        let reason = flag.reason.to_lowercase();
        needles.iter().any(|needle| reason.contains(needle))
    })
}

/// Run the full pipeline against the built-in knowledge base.
pub fn analyze_product(product: &Product) -> AnalysisResult {
    analyze_product_with(product, knowledge_base())
}

/// Run the full pipeline, resolving flags through `lookup`.
pub fn analyze_product_with<L>(product: &Product, lookup: &L) -> AnalysisResult
where
    L: IngredientLookup + ?Sized,
{
    let mut flags = analyze_ingredients(&product.ingredients_list);
    enrich_flags(&mut flags, lookup);
    let sneaky = detect_sneaky_ingredients(&product.ingredients_list);
    let sodium = analyze_sodium(product.nutrition.sodium);
    let alternatives = suggest_alternatives(&flags);

    let report = compute_score(&flags, product.nova_group, sneaky.len(), sodium.as_ref());

    tracing::debug!(
        code = %product.code,
        flags = flags.len(),
        unknown = flags.iter().filter(|f| !f.is_known()).count(),
        sneaky = sneaky.len(),
        nova = ?product.nova_group,
        penalty = report.penalty,
        score = ?report.score,
        "Analyzed product"
    );

    AnalysisResult {
        product: product.clone(),
        flags,
        sneaky,
        sodium,
        score: report.score,
        breakdown: report.breakdown,
        alternatives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanlabel_model::ConcernLevel;
    use pretty_assertions::assert_eq;

    fn flag(reason: &str) -> IngredientFlag {
        IngredientFlag::new("something", reason)
    }

    fn sodium(level: SodiumLevel) -> SodiumAnalysis {
        let milligrams = match level {
            SodiumLevel::Low => 100,
            SodiumLevel::Moderate => 400,
            SodiumLevel::High => 800,
        };
        analyze_sodium(Some(milligrams)).unwrap()
    }

    #[test]
    fn test_clean_product_is_good() {
        let report = compute_score(&[], None, 0, None);
        assert_eq!(report.score, Score::Good);
        assert_eq!(report.penalty, 0);
        assert_eq!(
            report.breakdown,
            vec![ScoreBreakdownItem::new("No flagged additives", Impact::Positive)]
        );
    }

    #[test]
    fn test_single_flag_is_okay() {
        let report = compute_score(&[flag("Industrial thickener")], None, 0, None);
        assert_eq!(report.penalty, 1);
        assert_eq!(report.score, Score::Okay);
        assert_eq!(
            report.breakdown,
            vec![ScoreBreakdownItem::new("1 flagged additive", Impact::Negative)]
        );
    }

    #[test]
    fn test_many_flags_nova4_high_sodium_is_poor() {
        let flags = vec![
            flag("Industrial thickener"),
            flag("Chemical preservative"),
            flag("Artificial color"),
        ];
        let report = compute_score(&flags, Some(4), 0, Some(&sodium(SodiumLevel::High)));
        assert_eq!(report.penalty, 5);
        assert_eq!(report.score, Score::Poor);
    }

    #[test]
    fn test_nova_entries() {
        let impact = |nova| {
            compute_score(&[], Some(nova), 0, None)
                .breakdown
                .get(1)
                .map(|item| item.impact)
        };
        assert_eq!(impact(1), Some(Impact::Positive));
        assert_eq!(impact(2), Some(Impact::Neutral));
        assert_eq!(impact(3), Some(Impact::Negative));
        assert_eq!(impact(4), Some(Impact::Negative));
        assert_eq!(impact(7), None);
        assert_eq!(compute_score(&[], Some(3), 0, None).score, Score::Okay);
        assert_eq!(compute_score(&[], Some(4), 0, None).score, Score::Okay);
    }

    #[test]
    fn test_sodium_entries() {
        let report = compute_score(&[], None, 0, Some(&sodium(SodiumLevel::Moderate)));
        assert_eq!(report.penalty, 0);
        assert_eq!(report.breakdown[1], ScoreBreakdownItem::new("Moderate sodium", Impact::Neutral));

        let report = compute_score(&[], None, 0, Some(&sodium(SodiumLevel::Low)));
        assert_eq!(report.breakdown[1], ScoreBreakdownItem::new("Low sodium", Impact::Positive));

        let report = compute_score(&[], None, 0, Some(&sodium(SodiumLevel::High)));
        assert_eq!(report.penalty, 1);
        assert_eq!(report.breakdown[1].label, "High sodium (800 mg per 100g)");
    }

    #[test]
    fn test_sweetener_and_trans_fat_compound() {
        let flags = vec![
            flag("Artificial sweetener"),
            flag("Contains trans fats / hydrogenated oils"),
        ];
        let report = compute_score(&flags, None, 2, None);
        // 1 (flags) + 1 (sneaky) + 1 (sweetener) + 1 (trans fat)
        assert_eq!(report.penalty, 4);
        assert_eq!(report.score, Score::Poor);
        let labels: Vec<_> = report.breakdown.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "2 flagged additives",
                "2 sneaky ingredients",
                "Contains artificial sweeteners",
                "Contains trans fats / hydrogenated oils",
            ]
        );
    }

    #[test]
    fn test_breakdown_order_independent_of_input_order() {
        let a = vec![flag("Artificial sweetener"), flag("Contains trans fats / hydrogenated oils")];
        let b: Vec<_> = a.iter().rev().cloned().collect();
        let high = sodium(SodiumLevel::High);
        assert_eq!(
            compute_score(&a, Some(3), 1, Some(&high)),
            compute_score(&b, Some(3), 1, Some(&high))
        );
    }

    #[test]
    fn test_end_to_end_hfcs() {
        let product = Product::new("0001", ["water", "high fructose corn syrup", "citric acid"])
            .with_nova_group(4)
            .with_sodium(800);
        let result = analyze_product(&product);

        assert_eq!(result.flags.len(), 1);
        assert_eq!(result.flags[0].ingredient, "high fructose corn syrup");
        assert_eq!(result.flags[0].reason, "Ultra-processed sweetener");
        let intel = result.flags[0].intel.as_ref().unwrap();
        assert_eq!(intel.name, "High Fructose Corn Syrup");
        assert_eq!(intel.concern_level, ConcernLevel::High);

        assert_eq!(
            result.sodium,
            Some(SodiumAnalysis {
                milligrams: 800,
                percent_dv: 35,
                level: SodiumLevel::High,
            })
        );
        assert!(result.sneaky.is_empty());
        assert_eq!(result.score, Score::Poor);
        assert_eq!(
            result.breakdown,
            vec![
                ScoreBreakdownItem::new("1 flagged additive", Impact::Negative),
                ScoreBreakdownItem::new("Ultra-processed food (NOVA 4)", Impact::Negative),
                ScoreBreakdownItem::new("High sodium (800 mg per 100g)", Impact::Negative),
            ]
        );
        let honey = result.alternatives.iter().filter(|a| a.name == "Raw honey").count();
        assert_eq!(honey, 1);
    }

    #[test]
    fn test_unknown_ingredients_stay_flagged() {
        let product = Product::new("0002", ["sugar", "red 40"]);
        let result = analyze_product(&product);
        assert_eq!(result.flags.len(), 1);
        assert!(!result.flags[0].is_known());
        assert_eq!(result.sodium, None);
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let product = Product::new(
            "0003",
            [
                "enriched flour",
                "partially hydrogenated soybean oil",
                "natural flavors",
                "sucralose",
                "soy lecithin",
                "yellow 5",
            ],
        )
        .with_nova_group(4)
        .with_sodium(450);
        assert_eq!(analyze_product(&product), analyze_product(&product));
    }

    #[test]
    fn test_custom_lookup() {
        struct NoIntel;
        impl IngredientLookup for NoIntel {
            fn lookup(&self, _name: &str) -> Option<&cleanlabel_model::IngredientRecord> {
                None
            }
        }

        let product = Product::new("0004", ["aspartame"]);
        let result = analyze_product_with(&product, &NoIntel);
        assert!(result.flags.iter().all(|f| !f.is_known()));
        // 1 (flags) + 1 (sweetener)
        assert_eq!(result.score, Score::Okay);
    }
}
