//! Dining Table Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{DiningTable, SectionRef};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "dining_table";

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all dining tables
    pub async fn find_all(&self) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table ORDER BY name")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DiningTable>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid table ID: {}", id)))?;
        let table: Option<DiningTable> = self.base.db().select(thing).await?;
        Ok(table)
    }

    /// Find the top-level tables of a section
    pub async fn find_top_level_by_section(
        &self,
        section: &RecordId,
    ) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query(
                "SELECT * FROM dining_table \
                 WHERE section.id = $section AND parent_table IS NONE ORDER BY name",
            )
            .bind(("section", section.clone()))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by name in section
    pub async fn find_by_section_and_name(
        &self,
        section: &RecordId,
        name: &str,
    ) -> RepoResult<Option<DiningTable>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM dining_table \
                 WHERE section.id = $section AND name = $name LIMIT 1",
            )
            .bind(("section", section.clone()))
            .bind(("name", name.to_string()))
            .await?;
        let tables: Vec<DiningTable> = result.take(0)?;
        Ok(tables.into_iter().next())
    }

    /// Find the subtables of a parent, ordered by name
    pub async fn find_subtables(&self, parent: &RecordId) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table WHERE parent_table = $parent ORDER BY name")
            .bind(("parent", parent.clone()))
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Create a new dining table
    pub async fn create(&self, table: DiningTable) -> RepoResult<DiningTable> {
        // Check duplicate name in same section
        if let Some(found) = self
            .find_by_section_and_name(&table.section.id, &table.name)
            .await?
            && found.id != table.id
        {
            return Err(RepoError::Duplicate(format!(
                "Table '{}' already exists in this section",
                table.name
            )));
        }

        let created: Option<DiningTable> = self.base.db().create(TABLE).content(table).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create dining table".to_string()))
    }

    /// Update a table's name and section back-reference
    pub async fn update_identity(
        &self,
        id: &RecordId,
        name: &str,
        section: &SectionRef,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET name = $name, section = $section")
            .bind(("thing", id.clone()))
            .bind(("name", name.to_string()))
            .bind(("section", section.clone()))
            .await?;
        Ok(())
    }

    /// Replace a table's item list
    pub async fn save_items(&self, id: &RecordId, items: Vec<String>) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $thing SET items = $items")
            .bind(("thing", id.clone()))
            .bind(("items", items))
            .await?;
        Ok(())
    }

    /// Hard delete a dining table
    pub async fn delete(&self, id: &RecordId) -> RepoResult<bool> {
        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", id.clone()))
            .await?;
        Ok(true)
    }

    /// Delete every subtable of a parent
    pub async fn delete_subtables(&self, parent: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE dining_table WHERE parent_table = $parent")
            .bind(("parent", parent.clone()))
            .await?;
        Ok(())
    }
}
