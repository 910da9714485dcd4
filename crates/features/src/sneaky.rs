use std::collections::HashSet;
use std::sync::LazyLock;

use cleanlabel_model::{Citation, SneakyMatch};

use crate::{join_ingredients, GuardedPattern};

struct SneakySpec {
    term: &'static str,
    pattern: &'static str,
    not_followed_by: Option<&'static str>,
    explanation: &'static str,
    what_to_look_for: &'static str,
    citations: &'static [(&'static str, &'static str)],
}

const FDA_TERMS: (&str, &str) = (
    "FDA",
    "https://www.fda.gov/food/food-ingredients-packaging/food-ingredient-and-packaging-terms",
);
const USDA_FDC: (&str, &str) = ("USDA", "https://fdc.nal.usda.gov/");

const SNEAKY: &[SneakySpec] = &[
    SneakySpec {
        term: "Evaporated Cane Juice",
        pattern: r"(?i)evaporated cane juice|cane juice crystals|crystallized cane juice",
        not_followed_by: None,
        explanation: "Despite the wholesome-sounding name, this is essentially unrefined sugar. \
                      The FDA has warned that \"evaporated cane juice\" is misleading because the \
                      product is a sweetener, not a juice.",
        what_to_look_for: "Products sweetened with whole fruit, raw honey, or pure maple syrup.",
        citations: &[(
            "FDA",
            "https://www.fda.gov/food/food-labeling-nutrition/guidance-industry-ingredients-declared-evaporated-cane-juice",
        )],
    },
    SneakySpec {
        term: "Natural Flavors",
        pattern: r"(?i)natural flavou?rs?|natural flavou?ring",
        not_followed_by: None,
        explanation: "A catch-all term that can include hundreds of chemical compounds derived \
                      from natural sources. While not inherently harmful, it provides zero \
                      transparency about what you're actually consuming.",
        what_to_look_for: "Products that list specific flavoring ingredients (e.g., \"vanilla \
                           extract\" instead of \"natural flavors\").",
        citations: &[
            FDA_TERMS,
            (
                "EWG",
                "https://www.ewg.org/foodscores/content/natural-vs-artificial-flavors/",
            ),
        ],
    },
    SneakySpec {
        term: "Yeast Extract",
        pattern: r"(?i)yeast extract|autolyzed yeast",
        not_followed_by: None,
        explanation: "Contains naturally occurring glutamates (similar to MSG) that enhance umami \
                      flavor. It's technically natural but functions as a flavor enhancer and \
                      adds hidden sodium.",
        what_to_look_for: "Products flavored with real herbs, spices, mushroom powder, or \
                           nutritional yeast.",
        citations: &[("PubMed", "https://pubmed.ncbi.nlm.nih.gov/19389112/")],
    },
    SneakySpec {
        term: "Maltodextrin",
        pattern: r"(?i)maltodextrin",
        not_followed_by: None,
        explanation: "A highly processed starch-derived powder with a glycemic index higher than \
                      table sugar (85-105 vs. 65). Often used as a cheap filler and thickener.",
        what_to_look_for: "Products thickened with whole food starches like tapioca or arrowroot.",
        citations: &[("PubMed", "https://pubmed.ncbi.nlm.nih.gov/25197735/")],
    },
    SneakySpec {
        term: "Vegetable Oil (Unspecified)",
        pattern: r"(?i)vegetable oil",
        // "vegetable oil (sunflower)" names its source
        not_followed_by: Some(r"^\s*\("),
        explanation: "When \"vegetable oil\" is listed without specifying the source, it's often \
                      a blend of the cheapest oils available (usually soybean, canola, or palm). \
                      These are typically refined using high heat and chemical solvents.",
        what_to_look_for: "Products that name specific oils (extra virgin olive oil, avocado oil, \
                           coconut oil).",
        citations: &[(
            "AHA",
            "https://www.heart.org/en/healthy-living/healthy-eating/eat-smart/fats/healthy-cooking-oils",
        )],
    },
    SneakySpec {
        term: "Fruit Juice Concentrate",
        pattern: r"(?i)fruit juice concentrate|juice concentrate|concentrated juice|apple juice concentrate|grape juice concentrate|pear juice concentrate",
        not_followed_by: None,
        explanation: "Sounds healthy but is essentially sugar water. The concentration process \
                      strips away fiber and most nutrients, leaving mainly fructose. Often used \
                      to sweeten products while claiming \"no added sugar.\"",
        what_to_look_for: "Products sweetened with whole fruit or small amounts of raw honey or \
                           dates.",
        citations: &[
            (
                "AHA",
                "https://www.heart.org/en/healthy-living/healthy-eating/eat-smart/sugar/added-sugars",
            ),
            USDA_FDC,
        ],
    },
    SneakySpec {
        term: "Dextrose",
        pattern: r"(?i)\bdextrose\b",
        not_followed_by: None,
        explanation: "Pure glucose derived from corn starch. Has a glycemic index of ~100 (same \
                      as pure glucose). Manufacturers use this name because it sounds more \
                      technical and less alarming than \"corn sugar.\"",
        what_to_look_for: "Products that use whole food sweeteners like dates, maple syrup, or \
                           raw honey.",
        citations: &[USDA_FDC],
    },
    SneakySpec {
        term: "Rice Syrup",
        pattern: r"(?i)rice syrup|brown rice syrup|rice malt syrup",
        not_followed_by: None,
        explanation: "Marketed as a \"natural\" sweetener, but it's highly refined with a very \
                      high glycemic index. It's essentially glucose with minimal nutritional \
                      value.",
        what_to_look_for: "Raw honey, pure maple syrup, or whole-fruit sweeteners.",
        citations: &[USDA_FDC],
    },
    SneakySpec {
        term: "Glucose Syrup",
        pattern: r"(?i)glucose syrup|glucose-fructose syrup|glucose solids",
        not_followed_by: None,
        explanation: "Another name for a highly processed sugar derived from starch (usually \
                      corn or wheat). It's functionally similar to corn syrup but the name \
                      obscures its ultra-processed nature.",
        what_to_look_for: "Products sweetened with whole fruit, raw honey, or maple syrup.",
        citations: &[FDA_TERMS],
    },
    SneakySpec {
        term: "\"Uncured\" with Celery Powder",
        pattern: r"(?i)celery powder|celery juice|celery extract",
        not_followed_by: None,
        explanation: "Products labeled \"uncured\" or \"no nitrates added\" often use celery \
                      powder, which is naturally high in nitrates. Your body converts these to \
                      nitrites identically to synthetic sodium nitrite. The \"uncured\" label \
                      can be misleading.",
        what_to_look_for: "Truly fresh, unprocessed meats without any curing agents, or \
                           understand that celery-powder curing is not meaningfully different \
                           from traditional curing.",
        citations: &[
            ("PubMed", "https://pubmed.ncbi.nlm.nih.gov/28487287/"),
            (
                "USDA",
                "https://www.ams.usda.gov/rules-regulations/organic/labeling",
            ),
        ],
    },
    SneakySpec {
        term: "Inulin / Chicory Root Fiber",
        pattern: r"(?i)\binulin\b|chicory root fiber|chicory root extract",
        not_followed_by: None,
        explanation: "Often added to boost \"fiber\" content on nutrition labels. While chicory \
                      root fiber is a real prebiotic, it's isolated and concentrated from its \
                      whole food source. Large amounts can cause significant digestive \
                      discomfort (bloating, gas).",
        what_to_look_for: "Fiber from whole food sources like oats, flaxseed, chia seeds, or \
                           vegetables.",
        citations: &[("NIH", "https://pubmed.ncbi.nlm.nih.gov/28159043/")],
    },
    SneakySpec {
        term: "Soy Lecithin",
        pattern: r"(?i)soy lecithin|soya lecithin",
        not_followed_by: None,
        explanation: "An emulsifier extracted from soybean oil processing. While generally \
                      considered safe, it's a byproduct of industrial oil refining and is \
                      ubiquitous in ultra-processed foods. Most is derived from genetically \
                      modified soy.",
        what_to_look_for: "Products using sunflower lecithin or whole food emulsifiers like egg \
                           yolk.",
        citations: &[(
            "FDA",
            "https://www.fda.gov/food/food-additives-petitions/food-additive-status-list",
        )],
    },
];

/// A compiled sneaky-ingredient rule.
#[derive(Debug)]
pub struct SneakyRule {
    term: &'static str,
    pattern: GuardedPattern,
    explanation: &'static str,
    what_to_look_for: &'static str,
    citations: Vec<Citation>,
}

impl SneakyRule {
    pub fn term(&self) -> &'static str {
        self.term
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn explanation(&self) -> &'static str {
        self.explanation
    }

    pub fn what_to_look_for(&self) -> &'static str {
        self.what_to_look_for
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    fn to_match(&self, matched_text: &str) -> SneakyMatch {
        SneakyMatch {
            term: self.term.to_string(),
            matched_text: matched_text.to_string(),
            explanation: self.explanation.to_string(),
            what_to_look_for: self.what_to_look_for.to_string(),
            citations: self.citations.clone(),
        }
    }
}

static SNEAKY_RULES: LazyLock<Vec<SneakyRule>> = LazyLock::new(|| {
    SNEAKY
        .iter()
        .map(|def| SneakyRule {
            term: def.term,
            pattern: GuardedPattern::compile(def.pattern, None, def.not_followed_by),
            explanation: def.explanation,
            what_to_look_for: def.what_to_look_for,
            citations: def
                .citations
                .iter()
                .map(|(label, url)| Citation::new(*label, *url))
                .collect(),
        })
        .collect()
});

/// The ordered sneaky-ingredient table.
pub fn sneaky_rules() -> &'static [SneakyRule] {
    &SNEAKY_RULES
}

/// Detect euphemistically-named ingredients.
///
/// Each term is reported at most once, with the first literal match.
pub fn detect_sneaky_ingredients<S: AsRef<str>>(ingredients: &[S]) -> Vec<SneakyMatch> {
    let full_text = join_ingredients(ingredients);
    let mut seen = HashSet::new();
    let mut matches = Vec::new();

    for rule in sneaky_rules() {
        if let Some(matched) = rule.pattern.find(&full_text) {
            if seen.insert(rule.term) {
                matches.push(rule.to_match(matched));
            }
        }
    }

    matches
}
