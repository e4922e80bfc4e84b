//! Data models for inventory uploads.
//!
//! - `InventoryItem`: one row (item, category, location, count, value, date)
//! - `InventoryBatch`: the rows of one upload, plus the category filter and
//!   the totals shown in summaries
//! - `CategoryTotals`: row count, unit count and value of a selection

pub mod inventory;

pub use inventory::{CategoryTotals, InventoryBatch, InventoryItem};
