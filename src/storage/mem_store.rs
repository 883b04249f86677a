//! In-memory toy collection.
//!
//! Documents live in a `BTreeMap` keyed by id behind a single read/write lock.
//! ObjectIds grow with creation time, so iteration order is insertion order
//! for generated ids, which is also the natural order a document store
//! returns for an unsorted find.
//!
//! Used by the test suite and for running the server without a database.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::core::error::Result;
use crate::storage::query::{FindOptions, SortOrder, ToyFilter};
use crate::storage::store::ToyStore;
use crate::types::{DeleteAck, InsertAck, Toy, ToyFields, ToyId, UpdateAck};

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryToyStore {
    toys: RwLock<BTreeMap<ToyId, ToyFields>>,
}

impl MemoryToyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn document_count(&self) -> usize {
        self.toys.read().len()
    }
}

/// Apply a filter, price ordering and limit to a sequence of documents
///
/// Sorting is stable, so equal prices keep the incoming (id) order.
pub(crate) fn evaluate<'a, I>(entries: I, filter: &ToyFilter, options: &FindOptions) -> Vec<Toy>
where
    I: IntoIterator<Item = (&'a ToyId, &'a ToyFields)>,
{
    let mut toys: Vec<Toy> = entries
        .into_iter()
        .map(|(id, fields)| Toy::new(*id, fields.clone()))
        .filter(|toy| filter.matches(toy))
        .collect();

    if let Some(order) = options.sort {
        toys.sort_by(|a, b| {
            let ordering = a.fields.price.total_cmp(&b.fields.price);
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }

    if let Some(limit) = options.limit {
        toys.truncate(limit);
    }

    toys
}

#[async_trait]
impl ToyStore for MemoryToyStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_one(&self, fields: ToyFields) -> Result<InsertAck> {
        let id = ToyId::new();
        self.toys.write().insert(id, fields);
        Ok(InsertAck::new(id))
    }

    async fn find_many(&self, filter: ToyFilter, options: FindOptions) -> Result<Vec<Toy>> {
        let toys = self.toys.read();
        Ok(evaluate(toys.iter(), &filter, &options))
    }

    async fn find_one(&self, filter: ToyFilter) -> Result<Option<Toy>> {
        let toys = self.toys.read();

        if let ToyFilter::Id(id) = filter {
            return Ok(toys.get(&id).map(|fields| Toy::new(id, fields.clone())));
        }

        Ok(evaluate(toys.iter(), &filter, &FindOptions::limit(1)).pop())
    }

    async fn replace_one(&self, id: ToyId, fields: ToyFields, upsert: bool) -> Result<UpdateAck> {
        let mut toys = self.toys.write();

        match toys.get_mut(&id) {
            Some(existing) => {
                let modified = *existing != fields;
                *existing = fields;
                Ok(UpdateAck::matched(modified))
            }
            None if upsert => {
                toys.insert(id, fields);
                Ok(UpdateAck::upserted(id))
            }
            None => Ok(UpdateAck::missed()),
        }
    }

    async fn delete_one(&self, id: ToyId) -> Result<DeleteAck> {
        let removed = self.toys.write().remove(&id).is_some();
        Ok(DeleteAck::new(u64::from(removed)))
    }

    async fn ensure_indexes(&self) -> Result<()> {
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
