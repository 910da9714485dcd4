//! Feature extraction for ingredient analysis.
//!
//! Provides pure functions over a product's ingredient text and nutrition:
//! - Ultra-processed marker scanning
//! - Sneaky (euphemistic) ingredient detection
//! - Sodium tier classification
//!
//! All rule tables are compiled once and shared read-only.

mod markers;
mod sneaky;
mod sodium;

use regex::{Match, Regex};

pub use markers::{analyze_ingredients, marker_rules, MarkerRule};
pub use sneaky::{detect_sneaky_ingredients, sneaky_rules, SneakyRule};
pub use sodium::{
    analyze_sodium, classify_sodium, LOW_SODIUM_MAX_MG, MODERATE_SODIUM_MAX_MG,
    SODIUM_DAILY_VALUE_MG,
};

/// Delimiter placed between ingredient tokens before pattern matching.
pub const INGREDIENT_DELIMITER: &str = ", ";

/// Join ingredient tokens into the single lowercase search string every
/// rule table is evaluated against.
pub fn join_ingredients<S: AsRef<str>>(ingredients: &[S]) -> String {
    ingredients
        .iter()
        .map(|i| i.as_ref())
        .collect::<Vec<_>>()
        .join(INGREDIENT_DELIMITER)
        .to_lowercase()
}

/// A compiled pattern with optional context exclusions.
///
/// The regex engine has no lookaround, so "not preceded by" and "not
/// followed by" conditions are checked against the text around each
/// candidate match. Only the first surviving match is reported.
#[derive(Debug)]
pub(crate) struct GuardedPattern {
    pattern: Regex,
    not_preceded_by: Option<Regex>,
    not_followed_by: Option<Regex>,
}

impl GuardedPattern {
    /// Compile a table pattern. Table patterns are constants, so failure is a bug.
    pub(crate) fn compile(
        pattern: &str,
        not_preceded_by: Option<&str>,
        not_followed_by: Option<&str>,
    ) -> Self {
        let compile = |p: &str| Regex::new(p).expect("table pattern should compile");
        Self {
            pattern: compile(pattern),
            not_preceded_by: not_preceded_by.map(compile),
            not_followed_by: not_followed_by.map(compile),
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    pub(crate) fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .find_iter(text)
            .find(|m| !self.excluded(text, m))
            .map(|m| m.as_str())
    }

    fn excluded(&self, text: &str, m: &Match<'_>) -> bool {
        let before = self
            .not_preceded_by
            .as_ref()
            .is_some_and(|re| re.is_match(&text[..m.start()]));
        let after = self
            .not_followed_by
            .as_ref()
            .is_some_and(|re| re.is_match(&text[m.end()..]));
        before || after
    }
}
