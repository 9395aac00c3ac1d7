//! Seating inventory core - 餐厅座位库存核心
//!
//! Manages a restaurant's seating inventory: sections containing dining
//! tables, bulk table generation with collision-free naming, recursive table
//! splitting into lettered subparts, and the denormalized name index each
//! section keeps over its tables.
//!
//! # 模块结构
//!
//! ```text
//! src/
//! ├── db/            # 数据库层 (embedded SurrealDB, models, repositories)
//! ├── seating/       # 命名分配、分桌、一致性服务
//! └── utils/         # 日志、校验
//! ```
//!
//! HTTP routing, authentication and the menu catalog are external
//! collaborators; this crate exposes [`SeatingService`] as its surface.

pub mod db;
pub mod seating;
pub mod utils;

// Re-export 公共类型
pub use db::DbService;
pub use db::models::{DiningTable, DiningTableUpdate, Section, SectionRef, TableIndexEntry};
pub use seating::{SeatingError, SeatingResult, SeatingService, SplitOutcome};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
