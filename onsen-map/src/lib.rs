pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{ListFilter, load_data, resolve_data_dir, select_records, suggest_names};

// Re-export collection functionality from onsen-core
pub use onsen_core::collect::{CollectOptions, CollectProgressCallback, execute_collection};
