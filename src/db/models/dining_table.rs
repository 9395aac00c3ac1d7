//! Dining Table Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Dining table entity (桌台)
///
/// A top-level table carries no `parent_table`; tables produced by a split
/// point back at the table they were split from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Unique among sibling top-level tables within the section
    pub name: String,
    /// Owning section back-reference, never an ownership edge
    pub section: SectionRef,
    /// Ordered line-item references, opaque to this crate
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_table: Option<RecordId>,
}

/// Denormalized `{name, id}` reference to the owning section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRef {
    pub name: String,
    pub id: RecordId,
}

/// Rename / reassign payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<RecordId>,
}
