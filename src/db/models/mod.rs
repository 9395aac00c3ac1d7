//! Database Models

pub mod dining_table;
pub mod section;

pub use dining_table::{DiningTable, DiningTableUpdate, SectionRef};
pub use section::{Section, SectionCreate, TableIndexEntry};
