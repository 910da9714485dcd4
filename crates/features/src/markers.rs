use std::sync::LazyLock;

use cleanlabel_model::IngredientFlag;

use crate::{join_ingredients, GuardedPattern};

struct MarkerSpec {
    pattern: &'static str,
    not_preceded_by: Option<&'static str>,
    reason: &'static str,
}

const fn marker(pattern: &'static str, reason: &'static str) -> MarkerSpec {
    MarkerSpec {
        pattern,
        not_preceded_by: None,
        reason,
    }
}

/// Ordered marker table. Order decides flag order.
const MARKERS: &[MarkerSpec] = &[
    // Sweeteners
    marker(r"high[- ]fructose corn syrup", "Ultra-processed sweetener"),
    // corn syrup inside HFCS is already reported by the rule above
    MarkerSpec {
        pattern: r"corn syrup",
        not_preceded_by: Some(r"high[- ]fructose $"),
        reason: "Refined sweetener",
    },
    marker(r"aspartame|sucralose|acesulfame|saccharin|neotame", "Artificial sweetener"),
    marker(r"dextrose|maltodextrin", "Highly refined carbohydrate"),
    // Preservatives
    marker(r"sodium benzoate", "Chemical preservative"),
    marker(r"potassium sorbate", "Chemical preservative"),
    marker(r"bht|bha|tbhq", "Synthetic antioxidant preservative"),
    marker(r"sodium nitrite|sodium nitrate", "Curing agent / preservative"),
    // Colors
    marker(r"red\s*#?\d+|yellow\s*#?\d+|blue\s*#?\d+", "Artificial color"),
    marker(r"caramel color", "Processed coloring"),
    marker(r"titanium dioxide", "Artificial whitening agent"),
    // Emulsifiers & thickeners
    marker(r"polysorbate", "Synthetic emulsifier"),
    marker(r"carrageenan", "Processed thickener (linked to inflammation)"),
    marker(r"xanthan gum", "Industrial thickener"),
    marker(r"cellulose gum|carboxymethyl", "Processed filler / thickener"),
    // Flavor enhancers
    marker(r"monosodium glutamate|msg", "Flavor enhancer"),
    marker(r"artificial flavou?r", "Artificial flavoring"),
    marker(r"natural flavou?r", "Processed flavor compound (often not truly natural)"),
    // Oils
    marker(r"hydrogenated", "Contains trans fats / hydrogenated oils"),
    marker(r"interesterified", "Chemically modified fat"),
    // Other
    marker(r"soy protein isolate|whey protein isolate", "Ultra-processed protein extract"),
    marker(r"modified (corn |food )?starch", "Chemically modified starch"),
    marker(r"sodium phosphate|calcium phosphate", "Industrial additive"),
];

/// A compiled ultra-processed marker.
#[derive(Debug)]
pub struct MarkerRule {
    pattern: GuardedPattern,
    reason: &'static str,
}

impl MarkerRule {
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }

    /// First match of this marker in `text`.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern.find(text)
    }
}

static MARKER_RULES: LazyLock<Vec<MarkerRule>> = LazyLock::new(|| {
    MARKERS
        .iter()
        .map(|def| MarkerRule {
            pattern: GuardedPattern::compile(def.pattern, def.not_preceded_by, None),
            reason: def.reason,
        })
        .collect()
});

/// The ordered marker table.
pub fn marker_rules() -> &'static [MarkerRule] {
    &MARKER_RULES
}

/// Scan ingredient tokens for ultra-processed markers.
///
/// Each matching rule contributes exactly one flag carrying its first
/// literal match. Rules are independent: two rules may report overlapping
/// text. Flags come back without knowledge-base intel attached.
pub fn analyze_ingredients<S: AsRef<str>>(ingredients: &[S]) -> Vec<IngredientFlag> {
    let full_text = join_ingredients(ingredients);

    marker_rules()
        .iter()
        .filter_map(|rule| {
            rule.find(&full_text)
                .map(|matched| IngredientFlag::new(matched, rule.reason))
        })
        .collect()
}
