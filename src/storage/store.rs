//! Collection gateway - the only persistence seam

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::error::Result;
use crate::storage::query::{FindOptions, ToyFilter};
use crate::types::{DeleteAck, InsertAck, Toy, ToyFields, ToyId, UpdateAck};

/// Handle to one collection of toy documents
///
/// Every HTTP operation maps onto exactly one call here. Implementations must
/// be safe to share across request tasks.
#[async_trait]
pub trait ToyStore: Send + Sync + 'static {
    /// Backend name reported by the info endpoint
    fn backend(&self) -> &'static str;

    /// Insert a new document under a freshly assigned id
    async fn insert_one(&self, fields: ToyFields) -> Result<InsertAck>;

    /// Return every matching document, honouring sort and limit
    async fn find_many(&self, filter: ToyFilter, options: FindOptions) -> Result<Vec<Toy>>;

    /// Return the first matching document
    async fn find_one(&self, filter: ToyFilter) -> Result<Option<Toy>>;

    /// Replace every field of the document with `id`
    ///
    /// With `upsert` set, a miss inserts a new document carrying `id`;
    /// otherwise a miss writes nothing and reports zero matches.
    async fn replace_one(&self, id: ToyId, fields: ToyFields, upsert: bool) -> Result<UpdateAck>;

    /// Remove the document with `id`, reporting how many were removed
    async fn delete_one(&self, id: ToyId) -> Result<DeleteAck>;

    /// Create the title index used by name search
    async fn ensure_indexes(&self) -> Result<()>;

    /// Round trip to the backend
    async fn ping(&self) -> Result<()>;
}

/// Store handle shared by all request handlers
pub type SharedStore = Arc<dyn ToyStore>;
