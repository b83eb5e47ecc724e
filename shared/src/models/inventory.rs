//! Inventory addressing and snapshot types
//!
//! Stock is organized as named categories each holding named items with
//! integer quantities. An [`IngredientKey`] addresses one item inside one
//! category and is serialized in the composite `"<category>/<item>"` form
//! used throughout recipes and stock logs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Composite address of one trackable stock field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct IngredientKey {
    pub category: String,
    pub item: String,
}

impl IngredientKey {
    pub fn new(category: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            item: item.into(),
        }
    }
}

/// Error for malformed ingredient keys
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ingredient key: {0:?} (expected \"<category>/<item>\")")]
pub struct InvalidIngredientKey(pub String);

impl FromStr for IngredientKey {
    type Err = InvalidIngredientKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((category, item)) if !category.is_empty() && !item.is_empty() => {
                Ok(Self::new(category, item))
            }
            _ => Err(InvalidIngredientKey(s.to_string())),
        }
    }
}

impl fmt::Display for IngredientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.item)
    }
}

impl From<IngredientKey> for String {
    fn from(key: IngredientKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for IngredientKey {
    type Error = InvalidIngredientKey;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Seed file shape: category -> item -> initial quantity
pub type InventorySeed = BTreeMap<String, BTreeMap<String, u64>>;

/// Read-only snapshot of one inventory category, for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub category: String,
    pub items: BTreeMap<String, u64>,
}
