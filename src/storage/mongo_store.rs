//! MongoDB-backed toy collection
//!
//! The driver client is built once and shared; it pools connections
//! internally, so every request borrows the same handle. Building it can
//! itself need the network (SRV lookup for `mongodb+srv`), so a store that
//! cannot be reached yet is opened lazily on first use instead.
//!
//! Reads are tolerant of documents written by other clients: fields with an
//! unexpected type are coerced or defaulted, and a document without an
//! ObjectId `_id` is skipped with a warning.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::{
    ClientOptions, Credential, FindOptions as DriverFindOptions, IndexOptions, ReplaceOptions,
    ServerApi, ServerApiVersion,
};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::OnceCell;

use crate::core::config::StorageConfig;
use crate::core::error::{Error, Result};
use crate::storage::query::{FindOptions, ToyFilter};
use crate::storage::store::ToyStore;
use crate::types::{DeleteAck, InsertAck, Toy, ToyFields, ToyId, UpdateAck};

/// Name of the index backing title search
pub const TITLE_INDEX: &str = "toyTitle";

/// Stored shape of a toy, `_id` kept as a native ObjectId
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToyDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default, deserialize_with = "lenient::text")]
    toy_title: String,
    #[serde(default, deserialize_with = "lenient::text")]
    category: String,
    #[serde(default, deserialize_with = "lenient::text")]
    seller_email: String,
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    seller_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    price: f64,
    #[serde(default, deserialize_with = "lenient::integer")]
    quantity: i64,
    #[serde(default, deserialize_with = "lenient::optional_number", skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    photo_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Decoders for fields the collection does not constrain
mod lenient {
    use super::*;

    fn as_text(value: Bson) -> Option<String> {
        match value {
            Bson::String(s) => Some(s),
            Bson::Null | Bson::Undefined => None,
            Bson::Double(n) => Some(n.to_string()),
            Bson::Int32(n) => Some(n.to_string()),
            Bson::Int64(n) => Some(n.to_string()),
            Bson::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn as_number(value: Bson) -> Option<f64> {
        match value {
            Bson::Double(n) => Some(n),
            Bson::Int32(n) => Some(f64::from(n)),
            Bson::Int64(n) => Some(n as f64),
            Bson::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub(super) fn text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
        Ok(as_text(Bson::deserialize(d)?).unwrap_or_default())
    }

    pub(super) fn optional_text<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Option<String>, D::Error> {
        Ok(as_text(Bson::deserialize(d)?))
    }

    pub(super) fn number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
        Ok(as_number(Bson::deserialize(d)?).unwrap_or_default())
    }

    pub(super) fn optional_number<'de, D: Deserializer<'de>>(
        d: D,
    ) -> std::result::Result<Option<f64>, D::Error> {
        Ok(as_number(Bson::deserialize(d)?))
    }

    pub(super) fn integer<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i64, D::Error> {
        let value = match Bson::deserialize(d)? {
            Bson::Int32(n) => i64::from(n),
            Bson::Int64(n) => n,
            other => as_number(other).map(|n| n as i64).unwrap_or_default(),
        };
        Ok(value)
    }
}

/// Decode one stored document, skipping it when `_id` is not an ObjectId
fn decode_toy(document: Document) -> Option<Toy> {
    match mongodb::bson::from_document::<ToyDocument>(document) {
        Ok(stored) => Some(Toy::from(stored)),
        Err(e) => {
            tracing::warn!("Skipping toy document that cannot be read: {}", e);
            None
        }
    }
}

impl ToyDocument {
    fn new(id: ToyId, fields: ToyFields) -> Self {
        Self {
            id: id.object_id(),
            toy_title: fields.toy_title,
            category: fields.category,
            seller_email: fields.seller_email,
            seller_name: fields.seller_name,
            price: fields.price,
            quantity: fields.quantity,
            rating: fields.rating,
            photo_url: fields.photo_url,
            description: fields.description,
        }
    }
}

impl From<ToyDocument> for Toy {
    fn from(doc: ToyDocument) -> Self {
        Toy::new(
            ToyId::from(doc.id),
            ToyFields {
                toy_title: doc.toy_title,
                category: doc.category,
                seller_email: doc.seller_email,
                seller_name: doc.seller_name,
                price: doc.price,
                quantity: doc.quantity,
                rating: doc.rating,
                photo_url: doc.photo_url,
                description: doc.description,
            },
        )
    }
}

/// Translate a filter into a query document
pub(crate) fn filter_document(filter: &ToyFilter) -> Document {
    match filter {
        ToyFilter::All => doc! {},
        ToyFilter::Id(id) => doc! { "_id": id.object_id() },
        ToyFilter::Category(category) => doc! { "category": category.as_str() },
        ToyFilter::Seller(seller) => doc! { "sellerEmail": seller.as_str() },
        ToyFilter::TitleContains(needle) => doc! {
            "toyTitle": { "$regex": regex::escape(needle), "$options": "i" }
        },
    }
}

/// Translate sort and limit into driver find options
pub(crate) fn driver_find_options(options: &FindOptions) -> DriverFindOptions {
    let mut driver = DriverFindOptions::default();
    driver.sort = options
        .sort
        .map(|order| doc! { "price": order.direction(), "_id": 1 });
    driver.limit = options.limit.map(|limit| limit as i64);
    driver
}

/// Driver client plus the bound collection
struct Connection {
    client: Client,
    toys: Collection<Document>,
}

/// Build the driver client and bind the configured collection
async fn open(config: &StorageConfig) -> Result<Connection> {
    let mut options = ClientOptions::parse(config.connection_uri()).await?;
    options.app_name = Some(crate::NAME.to_string());

    if let Some((user, pass)) = config.credentials() {
        let mut credential = Credential::default();
        credential.username = Some(user.to_string());
        credential.password = Some(pass.to_string());
        options.credential = Some(credential);
    }

    if config.stable_api {
        let server_api = ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build();
        options.server_api = Some(server_api);
    }

    let client = Client::with_options(options)?;
    let toys = client
        .database(&config.database)
        .collection::<Document>(&config.collection);

    tracing::info!(
        "MongoDB client ready for {}.{}",
        config.database,
        config.collection
    );

    Ok(Connection { client, toys })
}

/// Store backed by one MongoDB collection
pub struct MongoToyStore {
    config: StorageConfig,
    connection: OnceCell<Connection>,
}

impl MongoToyStore {
    /// Open the configured collection
    ///
    /// An unreachable deployment is not fatal: the store is returned
    /// unopened and every call retries until the deployment resolves,
    /// failing with `StoreUnavailable` meanwhile. Other failures, such as a
    /// malformed connection string, are returned.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let store = Self::lazy(config.clone());

        match store.connection().await {
            Ok(_) => {}
            Err(Error::StoreUnavailable(e)) => {
                tracing::warn!("MongoDB is unreachable, will retry on first use: {}", e);
            }
            Err(e) => return Err(e),
        }

        Ok(store)
    }

    /// A store that opens its client on first use
    pub fn lazy(config: StorageConfig) -> Self {
        Self {
            config,
            connection: OnceCell::new(),
        }
    }

    /// Whether the driver client has been built
    pub fn is_open(&self) -> bool {
        self.connection.initialized()
    }

    async fn connection(&self) -> Result<&Connection> {
        self.connection.get_or_try_init(|| open(&self.config)).await
    }

    async fn collection(&self) -> Result<&Collection<Document>> {
        Ok(&self.connection().await?.toys)
    }

    async fn typed_collection(&self) -> Result<Collection<ToyDocument>> {
        Ok(self.collection().await?.clone_with_type::<ToyDocument>())
    }
}

#[async_trait]
impl ToyStore for MongoToyStore {
    fn backend(&self) -> &'static str {
        "mongo"
    }

    async fn insert_one(&self, fields: ToyFields) -> Result<InsertAck> {
        let id = ToyId::new();
        self.typed_collection()
            .await?
            .insert_one(ToyDocument::new(id, fields), None)
            .await?;
        Ok(InsertAck::new(id))
    }

    async fn find_many(&self, filter: ToyFilter, options: FindOptions) -> Result<Vec<Toy>> {
        let cursor = self
            .collection()
            .await?
            .find(filter_document(&filter), driver_find_options(&options))
            .await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs.into_iter().filter_map(decode_toy).collect())
    }

    async fn find_one(&self, filter: ToyFilter) -> Result<Option<Toy>> {
        let found = self
            .collection()
            .await?
            .find_one(filter_document(&filter), None)
            .await?;
        Ok(found.and_then(decode_toy))
    }

    async fn replace_one(&self, id: ToyId, fields: ToyFields, upsert: bool) -> Result<UpdateAck> {
        let mut options = ReplaceOptions::default();
        options.upsert = Some(upsert);

        let result = self
            .typed_collection()
            .await?
            .replace_one(
                filter_document(&ToyFilter::Id(id)),
                ToyDocument::new(id, fields),
                options,
            )
            .await?;

        let ack = if result.upserted_id.is_some() {
            UpdateAck::upserted(id)
        } else if result.matched_count > 0 {
            UpdateAck::matched(result.modified_count > 0)
        } else {
            UpdateAck::missed()
        };
        Ok(ack)
    }

    async fn delete_one(&self, id: ToyId) -> Result<DeleteAck> {
        let result = self
            .collection()
            .await?
            .delete_one(filter_document(&ToyFilter::Id(id)), None)
            .await?;
        Ok(DeleteAck::new(result.deleted_count))
    }

    async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "toyTitle": 1 })
            .options(IndexOptions::builder().name(TITLE_INDEX.to_string()).build())
            .build();

        let created = self.collection().await?.create_index(index, None).await?;
        tracing::debug!("Index ready: {}", created.index_name);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.connection()
            .await?
            .client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;
        Ok(())
    }
}
