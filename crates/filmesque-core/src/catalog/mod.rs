//! Filter catalog
//!
//! An ordered, immutable list of [`FilterDefinition`]s. Index 0 is always the
//! identity filter ("Original"); every other entry carries a non-empty recipe
//! of [`TransformStep`]s that is validated when the catalog is built.

mod builtin;
mod storage;

#[cfg(test)]
mod tests;

pub use builtin::ids;
pub use storage::{load_catalog, save_catalog, validate_filter_id};

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::entitlement::{self, EntitlementSource, FilterAvailability};
use crate::error::{EngineError, Result};
use crate::transforms::TransformStep;

/// Stable slug identifying a filter, e.g. `portra_400`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(String);

impl FilterId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl Borrow<str> for FilterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for FilterId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// One named look: an ordered recipe plus its entitlement flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDefinition {
    id: FilterId,
    display_name: String,
    #[serde(default)]
    is_premium_only: bool,
    #[serde(default)]
    recipe: Vec<TransformStep>,
}

impl FilterDefinition {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        is_premium_only: bool,
        recipe: Vec<TransformStep>,
    ) -> Self {
        Self {
            id: FilterId::new(id),
            display_name: display_name.into(),
            is_premium_only,
            recipe,
        }
    }

    /// A filter with an empty recipe that leaves images untouched.
    pub fn identity(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self::new(id, display_name, false, Vec::new())
    }

    pub fn id(&self) -> &FilterId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_premium_only(&self) -> bool {
        self.is_premium_only
    }

    pub fn recipe(&self) -> &[TransformStep] {
        &self.recipe
    }

    pub fn is_identity(&self) -> bool {
        self.recipe.is_empty()
    }

    /// Short human-readable summary, e.g. "Apply Portra 400 film effect".
    pub fn description(&self) -> String {
        format!("Apply {} film effect", self.display_name)
    }
}

/// Validated, ordered set of filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<FilterDefinition>,
}

static BUILTIN_CATALOG: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    /// Build a catalog, rejecting any entry list that breaks its invariants.
    pub fn new(entries: Vec<FilterDefinition>) -> Result<Self> {
        validate_entries(&entries)?;
        Ok(Self { entries })
    }

    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static Catalog {
        BUILTIN_CATALOG.get_or_init(Self::standard)
    }

    /// A fresh copy of the built-in catalog.
    pub fn standard() -> Self {
        let entries = builtin::builtin_filters();
        debug_assert!(validate_entries(&entries).is_ok());
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a catalog holds at least the identity entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FilterDefinition> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[FilterDefinition] {
        &self.entries
    }

    /// The identity entry at index 0.
    pub fn identity(&self) -> &FilterDefinition {
        &self.entries[0]
    }

    pub fn get(&self, id: &str) -> Option<&FilterDefinition> {
        self.entries.iter().find(|f| f.id == *id)
    }

    /// Like [`Catalog::get`] but reports a missing id as an error.
    pub fn require(&self, id: &str) -> Result<&FilterDefinition> {
        self.get(id)
            .ok_or_else(|| EngineError::UnknownFilter(id.to_string()))
    }

    pub fn by_index(&self, index: usize) -> Option<&FilterDefinition> {
        self.entries.get(index)
    }

    pub fn by_display_name(&self, name: &str) -> Option<&FilterDefinition> {
        self.entries.iter().find(|f| f.display_name == name)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|f| f.id == *id)
    }

    /// Whether each entry is selectable right now, in catalog order.
    pub fn availability(&self, source: &dyn EntitlementSource) -> Vec<FilterAvailability> {
        entitlement::availability(self, source)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a FilterDefinition;
    type IntoIter = std::slice::Iter<'a, FilterDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn validate_entries(entries: &[FilterDefinition]) -> Result<()> {
    let Some(first) = entries.first() else {
        return Err(EngineError::InvalidCatalog("catalog has no entries".into()));
    };
    if !first.is_identity() {
        return Err(EngineError::InvalidCatalog(format!(
            "first entry '{}' must be the identity filter",
            first.id
        )));
    }

    let mut seen = HashSet::with_capacity(entries.len());
    for (index, filter) in entries.iter().enumerate() {
        validate_filter_id(filter.id.as_str())?;
        if !seen.insert(filter.id.as_str()) {
            return Err(EngineError::InvalidCatalog(format!(
                "duplicate filter id '{}'",
                filter.id
            )));
        }
        if filter.display_name.trim().is_empty() {
            return Err(EngineError::InvalidCatalog(format!(
                "filter '{}' has an empty display name",
                filter.id
            )));
        }
        if index > 0 && filter.is_identity() {
            return Err(EngineError::InvalidCatalog(format!(
                "filter '{}' at index {} has an empty recipe",
                filter.id, index
            )));
        }
        for step in &filter.recipe {
            step.validate().map_err(|err| {
                EngineError::InvalidCatalog(format!("filter '{}': {}", filter.id, err))
            })?;
        }
    }

    Ok(())
}
