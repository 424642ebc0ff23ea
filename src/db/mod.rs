pub mod file_store;
pub mod memory_store;
pub mod models;
pub mod store;

pub use file_store::JsonFileStore;
pub use memory_store::InMemoryStore;
pub use store::{MonitorStore, StoreError};
