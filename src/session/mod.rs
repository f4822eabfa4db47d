//! Per-session utilities
//!
//! Recent-search history and snapshot export.

pub mod export;
pub mod history;

pub use export::{export_file_name, write_json_snapshot, ExportError};
pub use history::SearchHistory;
