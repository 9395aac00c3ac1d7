//! Seating core - 命名分配、分桌、区域一致性
//!
//! - [`allocator`]: collision-free table naming within a section
//! - [`partitioner`]: splitting a table's items into lettered subtables
//! - [`service`]: lifecycle operations keeping `Section.table_names` in
//!   lock-step with the authoritative table records

pub mod allocator;
pub mod error;
pub mod partitioner;
pub mod service;

pub use error::{SeatingError, SeatingResult};
pub use service::{SeatingService, SplitOutcome};
