//! Section Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Section, SectionCreate, TableIndexEntry};
use serde::Deserialize;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "section";

#[derive(Clone)]
pub struct SectionRepository {
    base: BaseRepository,
}

impl SectionRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all sections
    pub async fn find_all(&self) -> RepoResult<Vec<Section>> {
        let sections: Vec<Section> = self
            .base
            .db()
            .query("SELECT * FROM section ORDER BY name")
            .await?
            .take(0)?;
        Ok(sections)
    }

    /// Find section by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Section>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid section ID: {}", id)))?;
        let section: Option<Section> = self.base.db().select(thing).await?;
        Ok(section)
    }

    /// Find section by exact name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Section>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM section WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let sections: Vec<Section> = result.take(0)?;
        Ok(sections.into_iter().next())
    }

    /// Create a new section with an empty table index
    pub async fn create(&self, data: SectionCreate) -> RepoResult<Section> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Section '{}' already exists",
                data.name
            )));
        }

        let section = Section {
            id: None,
            name: data.name,
            table_names: Vec::new(),
        };

        let created: Option<Section> = self.base.db().create(TABLE).content(section).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create section".to_string()))
    }

    /// Persist the denormalized name index
    pub async fn save_table_names(
        &self,
        id: &RecordId,
        entries: Vec<TableIndexEntry>,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $section SET table_names = $entries")
            .bind(("section", id.clone()))
            .bind(("entries", entries))
            .await?;
        Ok(())
    }

    /// Hard delete a section; refused while tables still reference it
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid section ID: {}", id)))?;

        let count = self.count_tables(&thing).await?;
        if count > 0 {
            return Err(RepoError::Validation(
                "Cannot delete section with tables".to_string(),
            ));
        }

        self.base
            .db()
            .query("DELETE $thing")
            .bind(("thing", thing))
            .await?;
        Ok(true)
    }

    async fn count_tables(&self, section: &RecordId) -> RepoResult<i64> {
        #[derive(Deserialize)]
        struct CountRow {
            count: i64,
        }

        let rows: Vec<CountRow> = self
            .base
            .db()
            .query("SELECT count() AS count FROM dining_table WHERE section.id = $section GROUP ALL")
            .bind(("section", section.clone()))
            .await?
            .take(0)?;
        Ok(rows.first().map(|r| r.count).unwrap_or(0))
    }
}
