//! Item master models

use serde::{Deserialize, Serialize};

/// A stocked item (e.g. "1kg house blend beans", "vanilla syrup").
/// Immutable once registered, except for renaming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub name: String,
    /// Free-form grouping used by the count sheet (e.g. "시럽", "원두")
    pub category: String,
}
