pub mod collect;
pub mod error;
pub mod loader;
pub mod report;
pub mod store;

pub use collect::{CollectOptions, Collector, execute_collection};
pub use error::{CollectError, DataError};
pub use loader::OnsenLoader;
pub use store::RecordStore;
