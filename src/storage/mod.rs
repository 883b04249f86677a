//! Storage and persistence layer
//!
//! One trait, [`ToyStore`], is the only way the HTTP layer touches data.
//! Two backends implement it: MongoDB for deployments and an in-memory map
//! for tests and database-less runs.

pub mod factory;
pub mod mem_store;
pub mod mongo_store;
pub mod query;
pub mod store;

// Re-export main storage types
pub use factory::create_store;
pub use mem_store::MemoryToyStore;
pub use mongo_store::MongoToyStore;
pub use query::{FindOptions, SortOrder, ToyFilter};
pub use store::{SharedStore, ToyStore};
