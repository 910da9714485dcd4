//! Explanation generation for ingredient analysis.
//!
//! Converts flags, sneaky matches and sodium findings into human-readable
//! explanations, and suggests whole-food alternatives for flagged
//! ingredients.

use std::collections::HashSet;
use std::sync::LazyLock;

use cleanlabel_model::{
    Alternative, AnalysisResult, ConcernLevel, IngredientFlag, SneakyMatch, SodiumAnalysis,
    SodiumLevel,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shown for flagged ingredients the knowledge base does not know.
pub const UNKNOWN_INGREDIENT_MESSAGE: &str = "We're still learning about this ingredient. \
     As a general rule, fewer processed additives means a cleaner product.";

pub const SODIUM_UNAVAILABLE_MESSAGE: &str = "Sodium data unavailable for this item.";

pub const SODIUM_FDA_NOTE: &str = "FDA recommended daily limit: 2,300 mg.";

/// A structured explanation for a finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    /// Short summary (1 line)
    pub summary: String,

    /// Detailed explanation
    pub detail: String,

    /// Concern level, `None` when there is insufficient data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concern_level: Option<ConcernLevel>,

    /// Evidence items supporting this explanation
    pub evidence: Vec<EvidenceItem>,
}

/// A piece of evidence supporting a finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// Type of evidence
    pub kind: String,

    /// The specific value or match
    pub value: String,

    /// Optional context
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl EvidenceItem {
    fn new(kind: &str, value: impl Into<String>, context: Option<String>) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.into(),
            context,
        }
    }
}

/// Generate explanation for a single flagged ingredient.
///
/// Unknown ingredients still get an explanation, carrying the generic
/// fallback message and no concern level.
pub fn explain_flag(flag: &IngredientFlag) -> Explanation {
    let matched = EvidenceItem::new("matched_text", flag.ingredient.as_str(), None);

    let Some(intel) = &flag.intel else {
        return Explanation {
            summary: format!("{}: {}", flag.ingredient, flag.reason),
            detail: UNKNOWN_INGREDIENT_MESSAGE.to_string(),
            concern_level: None,
            evidence: vec![matched],
        };
    };

    let mut detail = intel.definition.clone();
    if !intel.why_concerned.is_empty() {
        detail.push_str(" Why it may be concerning: ");
        detail.push_str(&intel.why_concerned.join("; "));
        detail.push('.');
    }

    let mut evidence = vec![matched];
    evidence.extend(
        intel
            .why_used
            .iter()
            .map(|reason| EvidenceItem::new("why_used", reason.as_str(), None)),
    );
    evidence.extend(
        intel
            .better_alternatives
            .iter()
            .map(|alt| EvidenceItem::new("better_option", alt.as_str(), None)),
    );
    evidence.extend(intel.citations.iter().map(|c| {
        EvidenceItem::new("citation", c.url.as_str(), Some(c.label.clone()))
    }));

    Explanation {
        summary: format!("{} ({}): {}", intel.name, intel.concern_level.label(), flag.reason),
        detail,
        concern_level: Some(intel.concern_level),
        evidence,
    }
}

/// Generate explanation for a sneaky ingredient.
pub fn explain_sneaky(sneaky: &SneakyMatch) -> Explanation {
    let mut evidence = vec![EvidenceItem::new(
        "matched_text",
        sneaky.matched_text.as_str(),
        None,
    )];
    evidence.extend(sneaky.citations.iter().map(|c| {
        EvidenceItem::new("citation", c.url.as_str(), Some(c.label.clone()))
    }));

    Explanation {
        summary: format!("Sneaky: {}", sneaky.term),
        detail: format!(
            "{} Look for instead: {}",
            sneaky.explanation, sneaky.what_to_look_for
        ),
        concern_level: None,
        evidence,
    }
}

/// Describe a sodium finding, or its absence.
pub fn describe_sodium(sodium: Option<&SodiumAnalysis>) -> String {
    let Some(sodium) = sodium else {
        return SODIUM_UNAVAILABLE_MESSAGE.to_string();
    };

    let tier = match sodium.level {
        SodiumLevel::Low => "Low sodium: 140 mg or less per 100g. Generally heart-healthy.",
        SodiumLevel::Moderate => {
            "Moderate sodium: between 140-600 mg per 100g. Watch total daily intake."
        }
        SodiumLevel::High => {
            "High sodium: over 600 mg per 100g. May contribute to elevated blood pressure."
        }
    };

    format!(
        "{} mg per 100g ({}% of Daily Value). {} {}",
        sodium.milligrams, sodium.percent_dv, tier, SODIUM_FDA_NOTE
    )
}

/// Generate a one-line verdict for an analyzed product.
pub fn summarize_result(result: &AnalysisResult) -> String {
    let mut parts = Vec::new();

    if result.flags.is_empty() {
        parts.push("no flagged additives".to_string());
    } else {
        let labels: Vec<_> = result.flags.iter().map(|f| f.ingredient.as_str()).collect();
        parts.push(format!("flagged: {}", labels.join(", ")));
    }

    if !result.sneaky.is_empty() {
        let terms: Vec<_> = result.sneaky.iter().map(|s| s.term.as_str()).collect();
        parts.push(format!("sneaky: {}", terms.join(", ")));
    }

    match &result.sodium {
        Some(sodium) => parts.push(format!(
            "sodium {} mg ({}% DV)",
            sodium.milligrams, sodium.percent_dv
        )),
        None => parts.push("sodium unavailable".to_string()),
    }

    format!(
        "{}: {}",
        result.score.label().to_uppercase(),
        parts.join(" | ")
    )
}

struct AlternativeRule {
    trigger: &'static str,
    alternatives: &'static [(&'static str, &'static str)],
}

const ALTERNATIVE_RULES: &[AlternativeRule] = &[
    AlternativeRule {
        trigger: r"corn syrup|high[- ]fructose|dextrose|maltodextrin",
        alternatives: &[
            ("Raw honey", "Natural sweetener with enzymes and antioxidants"),
            ("Maple syrup", "Minimally processed, contains minerals"),
            ("Dates or date paste", "Whole fruit sweetener with fiber"),
        ],
    },
    AlternativeRule {
        trigger: r"aspartame|sucralose|acesulfame|saccharin",
        alternatives: &[
            ("Stevia leaf", "Plant-based zero-calorie sweetener"),
            ("Monk fruit", "Natural zero-calorie sweetener"),
        ],
    },
    AlternativeRule {
        trigger: r"hydrogenated|interesterified",
        alternatives: &[
            ("Extra virgin olive oil", "Heart-healthy unprocessed fat"),
            ("Coconut oil", "Minimally processed saturated fat"),
            ("Grass-fed butter or ghee", "Traditional whole-food fat"),
        ],
    },
    AlternativeRule {
        trigger: r"artificial flavou?r|natural flavou?r|msg|monosodium",
        alternatives: &[
            ("Fresh herbs & spices", "Real flavor without additives"),
            ("Nutritional yeast", "Natural umami flavor, rich in B vitamins"),
            ("Tamari or coconut aminos", "Fermented, less processed flavor"),
        ],
    },
    AlternativeRule {
        trigger: r"artificial color|red\s*#?\d|yellow\s*#?\d|blue\s*#?\d|caramel color|titanium dioxide",
        alternatives: &[
            ("Beet powder", "Natural red coloring from whole beets"),
            ("Turmeric", "Natural yellow coloring with anti-inflammatory benefits"),
            ("Spirulina", "Natural blue-green coloring from algae"),
        ],
    },
    AlternativeRule {
        trigger: r"sodium benzoate|potassium sorbate|bht|bha|tbhq|sodium nitrite",
        alternatives: &[
            ("Vitamin E (tocopherols)", "Natural antioxidant preservative"),
            ("Rosemary extract", "Natural preservation from herbs"),
            ("Fermented or lacto-preserved foods", "Preserved through natural fermentation"),
        ],
    },
    AlternativeRule {
        trigger: r"carrageenan|polysorbate|xanthan|cellulose gum",
        alternatives: &[
            ("Agar-agar", "Seaweed-based natural thickener"),
            ("Arrowroot powder", "Whole root starch thickener"),
            ("Chia or flax gel", "Whole seed-based thickener with omega-3s"),
        ],
    },
    AlternativeRule {
        trigger: r"soy protein isolate|whey protein isolate",
        alternatives: &[
            ("Whole nuts & seeds", "Complete protein with healthy fats and fiber"),
            ("Organic tempeh", "Fermented whole soy with probiotics"),
            ("Pasture-raised eggs", "Complete whole-food protein"),
        ],
    },
    AlternativeRule {
        trigger: r"modified.*starch",
        alternatives: &[
            ("Tapioca starch", "Naturally extracted root starch"),
            ("Potato starch", "Simple unmodified starch"),
        ],
    },
];

static COMPILED_RULES: LazyLock<Vec<(Regex, &'static AlternativeRule)>> = LazyLock::new(|| {
    ALTERNATIVE_RULES
        .iter()
        .map(|rule| {
            let trigger = Regex::new(rule.trigger).expect("alternative trigger should compile");
            (trigger, rule)
        })
        .collect()
});

/// Suggest whole-food alternatives for flagged ingredients.
///
/// Alternatives are deduplicated by name across all rules, keeping the
/// order of first appearance.
pub fn suggest_alternatives(flags: &[IngredientFlag]) -> Vec<Alternative> {
    let flag_text = flags
        .iter()
        .map(|f| f.ingredient.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for (trigger, rule) in COMPILED_RULES.iter() {
        if !trigger.is_match(&flag_text) {
            continue;
        }
        for (name, why) in rule.alternatives {
            if seen.insert(*name) {
                results.push(Alternative::new(*name, *why));
            }
        }
    }

    results
}
