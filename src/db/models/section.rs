//! Section Model

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Section entity (区域：大厅、露台、包厢等)
///
/// `table_names` is a denormalized index over the section's top-level
/// tables. Every entry must mirror a live [`DiningTable`] whose
/// `section.id` points back here; split subparts are never indexed.
///
/// [`DiningTable`]: super::DiningTable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub table_names: Vec<TableIndexEntry>,
}

/// One entry of the section's name → id index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableIndexEntry {
    pub table_name: String,
    pub table_id: RecordId,
}

/// Create section payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionCreate {
    pub name: String,
}
