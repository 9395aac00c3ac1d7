//! Seating Service
//!
//! Coordinates the table lifecycle and keeps each section's denormalized
//! name index (`Section.table_names`) in lock-step with the authoritative
//! table records. Operations touching both documents perform two sequential
//! writes; there is no cross-document transaction, so a crash between them
//! leaves the documented best-effort intermediate state.

use std::sync::Arc;

use dashmap::DashMap;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use tokio::sync::Mutex;
use tracing::info;

use crate::db::models::{
    DiningTable, DiningTableUpdate, Section, SectionCreate, SectionRef, TableIndexEntry,
};
use crate::db::repository::{DiningTableRepository, SectionRepository};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};

use super::allocator::NameAllocator;
use super::error::{SeatingError, SeatingResult};
use super::partitioner::plan_split;

/// Result of a split operation
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub parent_id: RecordId,
    pub subtables: Vec<DiningTable>,
}

/// Seating inventory service
#[derive(Clone)]
pub struct SeatingService {
    sections: SectionRepository,
    tables: DiningTableRepository,
    /// One create-batch per section at a time
    section_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl SeatingService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            sections: SectionRepository::new(db.clone()),
            tables: DiningTableRepository::new(db),
            section_locks: Arc::new(DashMap::new()),
        }
    }

    fn section_lock(&self, section_id: &str) -> Arc<Mutex<()>> {
        self.section_locks
            .entry(section_id.to_string())
            .or_default()
            .clone()
    }

    // ========== Sections ==========

    pub async fn create_section(&self, name: &str) -> SeatingResult<Section> {
        validate_required_text(name, "section name", MAX_NAME_LEN)?;
        let section = self
            .sections
            .create(SectionCreate {
                name: name.to_string(),
            })
            .await?;
        info!(section = %section.name, "created section");
        Ok(section)
    }

    pub async fn get_section(&self, section_id: &str) -> SeatingResult<Section> {
        self.sections
            .find_by_id(section_id)
            .await?
            .ok_or_else(|| SeatingError::NotFound(format!("Section {section_id} not found")))
    }

    pub async fn list_sections(&self) -> SeatingResult<Vec<Section>> {
        Ok(self.sections.find_all().await?)
    }

    /// Delete a section; refused while tables still reference it
    pub async fn delete_section(&self, section_id: &str) -> SeatingResult<bool> {
        Ok(self.sections.delete(section_id).await?)
    }

    // ========== Tables ==========

    /// Bulk-create `count` tables under a section.
    ///
    /// Names are allocated from a single working set seeded once from the
    /// section's current top-level tables; the section document is persisted
    /// once after the batch. A per-section lock serializes concurrent
    /// batches so two requests cannot compute the same starting number.
    pub async fn create_tables(
        &self,
        section_id: &str,
        count: u32,
    ) -> SeatingResult<Vec<DiningTable>> {
        if count == 0 {
            return Err(SeatingError::Validation(
                "Table count must be a positive integer".to_string(),
            ));
        }

        let lock = self.section_lock(section_id);
        let _guard = lock.lock().await;

        let mut section = self.get_section(section_id).await?;
        let section_rid = section
            .id
            .clone()
            .ok_or_else(|| SeatingError::Database("Section record has no id".to_string()))?;

        // Seed from the live top-level tables, not the index: a table
        // reassigned into this section has no index entry yet but its name
        // is still taken.
        let current = self.tables.find_top_level_by_section(&section_rid).await?;
        let mut allocator =
            NameAllocator::for_section(&section.name, current.into_iter().map(|t| t.name));

        let mut created = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let table = DiningTable {
                id: None,
                name: allocator.next_name(),
                section: SectionRef {
                    name: section.name.clone(),
                    id: section_rid.clone(),
                },
                items: Vec::new(),
                parent_table: None,
            };
            let table = self.tables.create(table).await?;
            let table_id = table
                .id
                .clone()
                .ok_or_else(|| SeatingError::Database("Created table has no id".to_string()))?;
            section.table_names.push(TableIndexEntry {
                table_name: table.name.clone(),
                table_id,
            });
            created.push(table);
        }

        self.sections
            .save_table_names(&section_rid, section.table_names)
            .await?;

        info!(section = %section_rid, count, "created tables");
        Ok(created)
    }

    /// Split a table's items into `n` lettered subtables.
    ///
    /// Repeated splits continue the letter sequence of the existing
    /// subtables. The parent keeps its items; subtables hold copies of
    /// their windows. Subtables are never added to the section index.
    pub async fn split_table(&self, table_id: &str, n: u32) -> SeatingResult<SplitOutcome> {
        if n == 0 {
            return Err(SeatingError::Validation(
                "Split count must be a positive integer".to_string(),
            ));
        }

        let parent = self.get_table(table_id).await?;
        let parent_id = parent
            .id
            .clone()
            .ok_or_else(|| SeatingError::Database("Table record has no id".to_string()))?;

        let existing = self.tables.find_subtables(&parent_id).await?;
        let planned = plan_split(&parent, &existing, n as usize)?;

        let mut subtables = Vec::with_capacity(planned.len());
        for sub in planned {
            subtables.push(self.tables.create(sub).await?);
        }

        info!(parent = %parent_id, n, "split table");
        Ok(SplitOutcome {
            parent_id,
            subtables,
        })
    }

    /// Delete every subtable of `parent_table_id`, after verifying the
    /// parent really belongs to `section_id`.
    pub async fn clear_subtables(
        &self,
        parent_table_id: &str,
        section_id: &str,
    ) -> SeatingResult<bool> {
        let parent = self.get_table(parent_table_id).await?;
        let parent_id = parent
            .id
            .clone()
            .ok_or_else(|| SeatingError::Database("Table record has no id".to_string()))?;

        let requested: RecordId = section_id
            .parse()
            .map_err(|_| SeatingError::Validation(format!("Invalid section ID: {section_id}")))?;
        if parent.section.id != requested {
            return Err(SeatingError::Inconsistent(format!(
                "Table {parent_table_id} does not belong to section {section_id}"
            )));
        }

        self.tables.delete_subtables(&parent_id).await?;
        info!(parent = %parent_id, "cleared subtables");
        Ok(true)
    }

    /// Rename a table and/or reassign it to another section.
    ///
    /// Renaming syncs the index entry of the section the table references
    /// at the time of the rename. Reassigning only moves the back-reference;
    /// the old section's index entry stays behind (known gap, see DESIGN.md).
    pub async fn update_table(
        &self,
        table_id: &str,
        update: DiningTableUpdate,
    ) -> SeatingResult<DiningTable> {
        let mut table = self.get_table(table_id).await?;
        let table_rid = table
            .id
            .clone()
            .ok_or_else(|| SeatingError::Database("Table record has no id".to_string()))?;

        if let Some(new_name) = update.name {
            validate_required_text(&new_name, "table name", MAX_NAME_LEN)?;
            if let Some(found) = self
                .tables
                .find_by_section_and_name(&table.section.id, &new_name)
                .await?
                && found.id != table.id
            {
                return Err(SeatingError::Validation(format!(
                    "Table '{new_name}' already exists in this section"
                )));
            }

            table.name = new_name;
            self.sync_index_entry(&table).await?;
        }

        if let Some(new_section_id) = update.section
            && new_section_id != table.section.id
        {
            let target = self
                .sections
                .find_by_id(&new_section_id.to_string())
                .await?
                .ok_or_else(|| {
                    SeatingError::NotFound(format!("Section {new_section_id} not found"))
                })?;
            table.section = SectionRef {
                name: target.name,
                id: new_section_id,
            };
        }

        self.tables
            .update_identity(&table_rid, &table.name, &table.section)
            .await?;

        info!(table = %table_rid, name = %table.name, "updated table");
        Ok(table)
    }

    /// Overwrite the table's entry in its section's name index, matching
    /// by table id. Subtables have no entry and are left alone.
    async fn sync_index_entry(&self, table: &DiningTable) -> SeatingResult<()> {
        let Some(table_rid) = table.id.as_ref() else {
            return Ok(());
        };
        let Some(mut section) = self
            .sections
            .find_by_id(&table.section.id.to_string())
            .await?
        else {
            return Ok(());
        };
        let Some(section_rid) = section.id.clone() else {
            return Ok(());
        };

        let mut touched = false;
        for entry in &mut section.table_names {
            if entry.table_id == *table_rid {
                entry.table_name = table.name.clone();
                touched = true;
            }
        }
        if touched {
            self.sections
                .save_table_names(&section_rid, section.table_names)
                .await?;
        }
        Ok(())
    }

    /// Delete a table and prune its entry from the section's name index.
    pub async fn delete_table(&self, table_id: &str) -> SeatingResult<bool> {
        let table = self.get_table(table_id).await?;
        let table_rid = table
            .id
            .clone()
            .ok_or_else(|| SeatingError::Database("Table record has no id".to_string()))?;

        self.tables.delete(&table_rid).await?;

        if let Some(mut section) = self
            .sections
            .find_by_id(&table.section.id.to_string())
            .await?
        {
            let before = section.table_names.len();
            section.table_names.retain(|e| e.table_id != table_rid);
            if section.table_names.len() != before
                && let Some(section_rid) = section.id.clone()
            {
                self.sections
                    .save_table_names(&section_rid, section.table_names)
                    .await?;
            }
        }

        info!(table = %table_rid, "deleted table");
        Ok(true)
    }

    // ========== Lookups ==========

    pub async fn get_table(&self, table_id: &str) -> SeatingResult<DiningTable> {
        self.tables
            .find_by_id(table_id)
            .await?
            .ok_or_else(|| SeatingError::NotFound(format!("Table {table_id} not found")))
    }

    pub async fn list_tables(&self) -> SeatingResult<Vec<DiningTable>> {
        Ok(self.tables.find_all().await?)
    }

    pub async fn get_table_by_section_and_name(
        &self,
        section_id: &str,
        name: &str,
    ) -> SeatingResult<DiningTable> {
        let section_rid: RecordId = section_id
            .parse()
            .map_err(|_| SeatingError::Validation(format!("Invalid section ID: {section_id}")))?;
        self.tables
            .find_by_section_and_name(&section_rid, name)
            .await?
            .ok_or_else(|| {
                SeatingError::NotFound(format!(
                    "Table '{name}' not found in section {section_id}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn setup() -> SeatingService {
        let db = DbService::memory().await.unwrap();
        SeatingService::new(db.clone_handle())
    }

    fn id_of(section: &Section) -> String {
        section.id.as_ref().unwrap().to_string()
    }

    fn table_id_of(table: &DiningTable) -> String {
        table.id.as_ref().unwrap().to_string()
    }

    async fn seed_items(svc: &SeatingService, table: &DiningTable, count: usize) {
        let items: Vec<String> = (1..=count).map(|i| format!("item-{i}")).collect();
        svc.tables
            .save_items(table.id.as_ref().unwrap(), items)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_tables_numbers_sequentially() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();

        let first = svc.create_tables(&id_of(&section), 3).await.unwrap();
        let names: Vec<&str> = first.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["1", "2", "3"]);

        let second = svc.create_tables(&id_of(&section), 2).await.unwrap();
        let names: Vec<&str> = second.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["4", "5"]);

        let section = svc.get_section(&id_of(&section)).await.unwrap();
        assert_eq!(section.table_names.len(), 5);
        assert_eq!(section.table_names[0].table_name, "1");
        assert_eq!(section.table_names[4].table_name, "5");
    }

    #[tokio::test]
    async fn room_section_gets_prefixed_names() {
        let svc = setup().await;
        let section = svc.create_section("Room Section").await.unwrap();

        let created = svc.create_tables(&id_of(&section), 2).await.unwrap();
        assert_eq!(created[0].name, "ROOM1");
        assert_eq!(created[1].name, "ROOM2");

        let more = svc.create_tables(&id_of(&section), 1).await.unwrap();
        assert_eq!(more[0].name, "ROOM3");
    }

    #[tokio::test]
    async fn create_tables_rejects_zero_count() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let err = svc.create_tables(&id_of(&section), 0).await.unwrap_err();
        assert!(matches!(err, SeatingError::Validation(_)));
    }

    #[tokio::test]
    async fn create_tables_requires_existing_section() {
        let svc = setup().await;
        let err = svc.create_tables("section:missing", 2).await.unwrap_err();
        assert!(matches!(err, SeatingError::NotFound(_)));
    }

    #[tokio::test]
    async fn split_reconstructs_items_and_keeps_parent() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let table = svc
            .create_tables(&id_of(&section), 1)
            .await
            .unwrap()
            .remove(0);
        seed_items(&svc, &table, 5).await;

        let outcome = svc.split_table(&table_id_of(&table), 2).await.unwrap();
        assert_eq!(outcome.subtables.len(), 2);
        assert_eq!(outcome.subtables[0].name, "1 A");
        assert_eq!(outcome.subtables[1].name, "1 B");
        assert_eq!(outcome.subtables[0].items.len(), 3);
        assert_eq!(outcome.subtables[1].items.len(), 2);

        let rebuilt: Vec<String> = outcome
            .subtables
            .iter()
            .flat_map(|s| s.items.clone())
            .collect();
        let expected: Vec<String> = (1..=5).map(|i| format!("item-{i}")).collect();
        assert_eq!(rebuilt, expected);

        // Parent keeps its items and stays out of the subtable set
        let parent = svc.get_table(&table_id_of(&table)).await.unwrap();
        assert_eq!(parent.items.len(), 5);
        assert!(parent.parent_table.is_none());
    }

    #[tokio::test]
    async fn repeated_splits_continue_letters() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let table = svc
            .create_tables(&id_of(&section), 1)
            .await
            .unwrap()
            .remove(0);
        seed_items(&svc, &table, 4).await;

        let first = svc.split_table(&table_id_of(&table), 2).await.unwrap();
        assert_eq!(first.subtables[0].name, "1 A");
        assert_eq!(first.subtables[1].name, "1 B");

        let second = svc.split_table(&table_id_of(&table), 2).await.unwrap();
        assert_eq!(second.subtables[0].name, "1 C");
        assert_eq!(second.subtables[1].name, "1 D");
    }

    #[tokio::test]
    async fn split_does_not_touch_the_section_index() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let table = svc
            .create_tables(&id_of(&section), 1)
            .await
            .unwrap()
            .remove(0);

        svc.split_table(&table_id_of(&table), 3).await.unwrap();

        let section = svc.get_section(&id_of(&section)).await.unwrap();
        assert_eq!(section.table_names.len(), 1);
    }

    #[tokio::test]
    async fn split_rejects_missing_table_and_zero_parts() {
        let svc = setup().await;
        let err = svc.split_table("dining_table:none", 2).await.unwrap_err();
        assert!(matches!(err, SeatingError::NotFound(_)));

        let section = svc.create_section("Main Hall").await.unwrap();
        let table = svc
            .create_tables(&id_of(&section), 1)
            .await
            .unwrap()
            .remove(0);
        let err = svc.split_table(&table_id_of(&table), 0).await.unwrap_err();
        assert!(matches!(err, SeatingError::Validation(_)));
    }

    #[tokio::test]
    async fn clear_subtables_checks_the_section() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let other = svc.create_section("Terrace").await.unwrap();
        let table = svc
            .create_tables(&id_of(&section), 1)
            .await
            .unwrap()
            .remove(0);
        svc.split_table(&table_id_of(&table), 2).await.unwrap();

        let err = svc
            .clear_subtables(&table_id_of(&table), &id_of(&other))
            .await
            .unwrap_err();
        assert!(matches!(err, SeatingError::Inconsistent(_)));

        // Subtables survived the failed clear
        let parent_rid = table.id.clone().unwrap();
        assert_eq!(svc.tables.find_subtables(&parent_rid).await.unwrap().len(), 2);

        svc.clear_subtables(&table_id_of(&table), &id_of(&section))
            .await
            .unwrap();
        assert!(svc.tables.find_subtables(&parent_rid).await.unwrap().is_empty());

        // The parent itself is untouched
        assert!(svc.get_table(&table_id_of(&table)).await.is_ok());
    }

    #[tokio::test]
    async fn clear_subtables_leaves_other_parents_alone() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let tables = svc.create_tables(&id_of(&section), 2).await.unwrap();
        svc.split_table(&table_id_of(&tables[0]), 2).await.unwrap();
        svc.split_table(&table_id_of(&tables[1]), 2).await.unwrap();

        svc.clear_subtables(&table_id_of(&tables[0]), &id_of(&section))
            .await
            .unwrap();

        let other_subs = svc
            .tables
            .find_subtables(tables[1].id.as_ref().unwrap())
            .await
            .unwrap();
        assert_eq!(other_subs.len(), 2);
    }

    #[tokio::test]
    async fn rename_updates_the_index_entry() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let tables = svc.create_tables(&id_of(&section), 2).await.unwrap();

        let renamed = svc
            .update_table(
                &table_id_of(&tables[0]),
                DiningTableUpdate {
                    name: Some("Window Booth".to_string()),
                    section: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Window Booth");

        let section = svc.get_section(&id_of(&section)).await.unwrap();
        assert_eq!(section.table_names.len(), 2);
        assert_eq!(section.table_names[0].table_name, "Window Booth");
        // Sibling untouched
        assert_eq!(section.table_names[1].table_name, "2");
    }

    #[tokio::test]
    async fn rename_rejects_duplicate_sibling_name() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let tables = svc.create_tables(&id_of(&section), 2).await.unwrap();

        let err = svc
            .update_table(
                &table_id_of(&tables[0]),
                DiningTableUpdate {
                    name: Some("2".to_string()),
                    section: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SeatingError::Validation(_)));
    }

    #[tokio::test]
    async fn reassign_requires_existing_target_section() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let table = svc
            .create_tables(&id_of(&section), 1)
            .await
            .unwrap()
            .remove(0);

        let err = svc
            .update_table(
                &table_id_of(&table),
                DiningTableUpdate {
                    name: None,
                    section: Some("section:missing".parse().unwrap()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SeatingError::NotFound(_)));
    }

    #[tokio::test]
    async fn reassign_moves_backref_but_leaves_old_index_entry() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let target = svc.create_section("Terrace").await.unwrap();
        let table = svc
            .create_tables(&id_of(&section), 1)
            .await
            .unwrap()
            .remove(0);

        let updated = svc
            .update_table(
                &table_id_of(&table),
                DiningTableUpdate {
                    name: None,
                    section: Some(target.id.clone().unwrap()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.section.id, target.id.clone().unwrap());
        assert_eq!(updated.section.name, "Terrace");

        // Known gap: the old section's index keeps its (now stale) entry,
        // and the new section's index gains none.
        let old = svc.get_section(&id_of(&section)).await.unwrap();
        assert_eq!(old.table_names.len(), 1);
        let new = svc.get_section(&id_of(&target)).await.unwrap();
        assert!(new.table_names.is_empty());
    }

    #[tokio::test]
    async fn create_after_reassign_skips_the_adopted_name() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let target = svc.create_section("Terrace").await.unwrap();
        let table = svc
            .create_tables(&id_of(&section), 1)
            .await
            .unwrap()
            .remove(0);
        assert_eq!(table.name, "1");

        // The reassigned table never enters the target's index, but its
        // name still counts against the target's numbering.
        svc.update_table(
            &table_id_of(&table),
            DiningTableUpdate {
                name: None,
                section: Some(target.id.clone().unwrap()),
            },
        )
        .await
        .unwrap();

        let created = svc.create_tables(&id_of(&target), 2).await.unwrap();
        assert_eq!(created[0].name, "2");
        assert_eq!(created[1].name, "3");
    }

    #[tokio::test]
    async fn delete_prunes_exactly_one_index_entry() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let tables = svc.create_tables(&id_of(&section), 3).await.unwrap();

        svc.delete_table(&table_id_of(&tables[1])).await.unwrap();

        let section = svc.get_section(&id_of(&section)).await.unwrap();
        let names: Vec<&str> = section
            .table_names
            .iter()
            .map(|e| e.table_name.as_str())
            .collect();
        assert_eq!(names, vec!["1", "3"]);

        let err = svc.get_table(&table_id_of(&tables[1])).await.unwrap_err();
        assert!(matches!(err, SeatingError::NotFound(_)));
    }

    #[tokio::test]
    async fn lookup_by_section_and_name() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let tables = svc.create_tables(&id_of(&section), 2).await.unwrap();

        let found = svc
            .get_table_by_section_and_name(&id_of(&section), "2")
            .await
            .unwrap();
        assert_eq!(found.id, tables[1].id);

        let err = svc
            .get_table_by_section_and_name(&id_of(&section), "99")
            .await
            .unwrap_err();
        assert!(matches!(err, SeatingError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_batches_on_one_section_never_collide() {
        let svc = setup().await;
        let section = svc.create_section("Main Hall").await.unwrap();
        let section_id = id_of(&section);

        let a = {
            let svc = svc.clone();
            let section_id = section_id.clone();
            tokio::spawn(async move { svc.create_tables(&section_id, 5).await })
        };
        let b = {
            let svc = svc.clone();
            let section_id = section_id.clone();
            tokio::spawn(async move { svc.create_tables(&section_id, 5).await })
        };

        let mut names: Vec<String> = Vec::new();
        names.extend(a.await.unwrap().unwrap().into_iter().map(|t| t.name));
        names.extend(b.await.unwrap().unwrap().into_iter().map(|t| t.name));

        let unique: std::collections::HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), 10);

        let section = svc.get_section(&section_id).await.unwrap();
        assert_eq!(section.table_names.len(), 10);
    }
}
