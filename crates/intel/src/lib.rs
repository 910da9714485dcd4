//! Ingredient knowledge base.
//!
//! Maps canonical ingredient names to educational metadata and resolves
//! loosely-written ingredient text to a record:
//! 1. exact (case-insensitive) canonical key
//! 2. bidirectional substring match against each record's synonyms
//! 3. bidirectional substring match against canonical keys
//!
//! Records are scanned in table order, so earlier records win ties.

use std::collections::HashMap;
use std::sync::LazyLock;

use cleanlabel_model::{IngredientFlag, IngredientRecord};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntelError {
    #[error("Invalid knowledge base JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate ingredient key: {0}")]
    DuplicateKey(String),
    #[error("Ingredient key is not canonical (trimmed lowercase): {0:?}")]
    NonCanonicalKey(String),
    #[error("Empty synonym on ingredient: {0}")]
    EmptySynonym(String),
}

/// Trait for resolving ingredient text to knowledge-base records.
///
/// Lets an indexed implementation stand in for the linear scan without
/// changing match semantics.
pub trait IngredientLookup {
    /// Resolve an ingredient name, `None` if unknown.
    fn lookup(&self, name: &str) -> Option<&IngredientRecord>;
}

#[derive(Deserialize)]
struct Entry {
    key: String,
    #[serde(flatten)]
    record: IngredientRecord,
}

/// An ordered, immutable ingredient table.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    entries: Vec<(String, IngredientRecord)>,
    by_key: HashMap<String, usize>,
}

impl KnowledgeBase {
    /// Parse and validate a JSON array of records, each carrying its `key`.
    pub fn from_json(json: &str) -> Result<Self, IntelError> {
        let raw: Vec<Entry> = serde_json::from_str(json)?;

        let mut entries = Vec::with_capacity(raw.len());
        let mut by_key = HashMap::with_capacity(raw.len());

        for Entry { key, mut record } in raw {
            if key.is_empty() || key != key.trim().to_lowercase() {
                return Err(IntelError::NonCanonicalKey(key));
            }
            if record.synonyms.iter().any(|s| s.trim().is_empty()) {
                return Err(IntelError::EmptySynonym(key));
            }
            if by_key.insert(key.clone(), entries.len()).is_some() {
                return Err(IntelError::DuplicateKey(key));
            }
            for synonym in &mut record.synonyms {
                *synonym = synonym.to_lowercase();
            }
            entries.push((key, record));
        }

        Ok(Self { entries, by_key })
    }

    /// Get a record by its exact canonical key.
    pub fn get(&self, key: &str) -> Option<&IngredientRecord> {
        self.by_key.get(key).map(|&i| &self.entries[i].1)
    }

    /// Iterate `(key, record)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IngredientRecord)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IngredientLookup for KnowledgeBase {
    fn lookup(&self, name: &str) -> Option<&IngredientRecord> {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        if let Some(record) = self.get(&normalized) {
            return Some(record);
        }

        let overlaps = |candidate: &str| {
            normalized.contains(candidate) || candidate.contains(normalized.as_str())
        };

        self.entries
            .iter()
            .find(|(_, record)| record.synonyms.iter().any(|s| overlaps(s.as_str())))
            .or_else(|| self.entries.iter().find(|(key, _)| overlaps(key.as_str())))
            .map(|(_, record)| record)
    }
}

static INGREDIENTS_JSON: &str = include_str!("data/ingredients.json");

static KNOWLEDGE_BASE: LazyLock<KnowledgeBase> = LazyLock::new(|| {
    KnowledgeBase::from_json(INGREDIENTS_JSON)
        .expect("ingredients.json should be a valid knowledge base")
});

/// The built-in knowledge base.
pub fn knowledge_base() -> &'static KnowledgeBase {
    &KNOWLEDGE_BASE
}

/// Resolve an ingredient against the built-in knowledge base.
pub fn lookup_ingredient(name: &str) -> Option<&'static IngredientRecord> {
    knowledge_base().lookup(name)
}

/// Attach knowledge-base records to flags. Unknown ingredients keep `intel: None`.
pub fn enrich_flags<L>(flags: &mut [IngredientFlag], lookup: &L)
where
    L: IngredientLookup + ?Sized,
{
    for flag in flags {
        flag.intel = lookup.lookup(&flag.ingredient).cloned();
    }
}
