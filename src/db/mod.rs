//! Database Module
//!
//! Embedded SurrealDB service plus models and repositories.

pub mod models;
pub mod repository;

use self::repository::RepoError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "seating";
const DATABASE: &str = "seating";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) a RocksDb-backed database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let db = Surreal::new::<RocksDb>(db_path).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        tracing::info!(path = db_path, "Database connection established (SurrealDB RocksDb)");
        Ok(Self { db })
    }

    /// In-memory engine, used by tests and ephemeral tooling
    pub async fn memory() -> Result<Self, RepoError> {
        let db = Surreal::new::<Mem>(()).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        Ok(Self { db })
    }

    /// Cloneable handle for services and repositories
    pub fn clone_handle(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
