//! HTTP request handlers for the Toy House API
//!
//! Each toy handler extracts its parameters and issues exactly one store
//! call. Store failures come back as [`Error`] and are rendered by its
//! `IntoResponse` impl.

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::api::response::{JsonRequest, PathParam, QueryParams};
use crate::core::error::{Error, Result};
use crate::core::AppState;
use crate::storage::{FindOptions, SortOrder, ToyFilter};
use crate::system::{collect_metrics, Metrics};
use crate::types::{DeleteAck, InsertAck, Toy, ToyFields, ToyId, UpdateAck};

/// Liveness text returned by `/`
pub const LIVENESS_MESSAGE: &str = "Toy House is running ....";

/// `?seller=` query of the seller listings
#[derive(Debug, Deserialize)]
pub struct SellerQuery {
    /// Seller email to match exactly
    pub seller: Option<String>,
}

impl SellerQuery {
    fn require(self) -> Result<String> {
        self.seller
            .filter(|seller| !seller.is_empty())
            .ok_or_else(|| Error::validation("Missing `seller` query parameter"))
    }
}

/// `?upsert=` query of the update endpoint
#[derive(Debug, Deserialize)]
pub struct UpsertQuery {
    /// Overrides the configured upsert default
    pub upsert: Option<String>,
}

impl UpsertQuery {
    fn resolve(self, default: bool) -> Result<bool> {
        match self.upsert.as_deref() {
            None => Ok(default),
            Some("true") | Some("1") => Ok(true),
            Some("false") | Some("0") => Ok(false),
            Some(other) => Err(Error::validation(format!(
                "Invalid `upsert` value '{}', expected true or false",
                other
            ))),
        }
    }
}

/// System health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "degraded"
    pub status: String,
    /// "up" or "down"
    pub store: String,
    /// Seconds since start-up
    pub uptime_secs: u64,
    /// Service version
    pub version: String,
}

/// Service information
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    /// Service name
    pub name: String,
    /// Service version
    pub version: String,
    /// Storage backend in use
    pub storage: String,
    /// Routes served
    pub endpoints: Vec<String>,
}

/// Run one store call, recording its latency and the request outcome
async fn observe<T, F>(operation: &'static str, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let metrics = Metrics::global();
    let timer = metrics.store_timer(operation);
    let result = call.await;
    timer.finish();

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    };
    metrics.record_request(operation, outcome);
    result
}

fn parse_id(raw: &str) -> Result<ToyId> {
    raw.parse()
}

/// Liveness, independent of store health
pub async fn root_handler() -> &'static str {
    LIVENESS_MESSAGE
}

/// List every toy
pub async fn all_toys(State(state): State<AppState>) -> Result<Json<Vec<Toy>>> {
    let toys = observe(
        "list_all",
        state.store.find_many(ToyFilter::All, FindOptions::default()),
    )
    .await?;
    tracing::debug!("Listed {} toys", toys.len());
    Ok(Json(toys))
}

/// List toys of one category, capped at the configured limit
pub async fn toys_by_category(
    State(state): State<AppState>,
    PathParam(category): PathParam<String>,
) -> Result<Json<Vec<Toy>>> {
    let options = FindOptions::limit(state.category_limit());
    let toys = observe(
        "list_by_category",
        state.store.find_many(ToyFilter::Category(category), options),
    )
    .await?;
    Ok(Json(toys))
}

/// Fetch a single toy
pub async fn get_toy(State(state): State<AppState>, PathParam(id): PathParam<String>) -> Result<Json<Toy>> {
    let id = parse_id(&id)?;
    let toy = observe("get_toy", async {
        state
            .store
            .find_one(ToyFilter::Id(id))
            .await?
            .ok_or_else(|| Error::not_found(id.to_string()))
    })
    .await?;
    Ok(Json(toy))
}

/// List the toys of one seller
pub async fn my_toys(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SellerQuery>,
) -> Result<Json<Vec<Toy>>> {
    let seller = query.require()?;
    let toys = observe(
        "list_by_seller",
        state
            .store
            .find_many(ToyFilter::Seller(seller), FindOptions::default()),
    )
    .await?;
    Ok(Json(toys))
}

/// Case-insensitive title search
pub async fn search_by_name(
    State(state): State<AppState>,
    PathParam(name): PathParam<String>,
) -> Result<Json<Vec<Toy>>> {
    let toys = observe(
        "search_by_name",
        state
            .store
            .find_many(ToyFilter::TitleContains(name), FindOptions::default()),
    )
    .await?;
    Ok(Json(toys))
}

/// A seller's toys ordered by price
pub async fn sort_by_price(
    State(state): State<AppState>,
    PathParam(mode): PathParam<String>,
    QueryParams(query): QueryParams<SellerQuery>,
) -> Result<Json<Vec<Toy>>> {
    let order: SortOrder = mode.parse()?;
    let seller = query.require()?;
    let toys = observe(
        "sort_by_price",
        state
            .store
            .find_many(ToyFilter::Seller(seller), FindOptions::sorted(order)),
    )
    .await?;
    Ok(Json(toys))
}

/// Create a toy
pub async fn add_toy(
    State(state): State<AppState>,
    JsonRequest(fields): JsonRequest<ToyFields>,
) -> Result<(StatusCode, Json<InsertAck>)> {
    fields.validate()?;
    let ack = observe("add_toy", state.store.insert_one(fields)).await?;
    tracing::info!("Toy created: {}", ack.inserted_id);
    Ok((StatusCode::CREATED, Json(ack)))
}

/// Replace every field of a toy, optionally inserting it when missing
pub async fn update_toy(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    QueryParams(query): QueryParams<UpsertQuery>,
    JsonRequest(fields): JsonRequest<ToyFields>,
) -> Result<Json<UpdateAck>> {
    let id = parse_id(&id)?;
    let upsert = query.resolve(state.upsert_on_update())?;
    fields.validate()?;

    let ack = observe("update_toy", async {
        let ack = state.store.replace_one(id, fields, upsert).await?;
        if ack.is_miss() {
            return Err(Error::not_found(id.to_string()));
        }
        Ok(ack)
    })
    .await?;

    match ack.upserted_id {
        Some(upserted) => tracing::info!("Toy {} not found, inserted by upsert", upserted),
        None => tracing::info!("Toy updated: {}", id),
    }
    Ok(Json(ack))
}

/// Delete a toy
///
/// A miss answers 404 with the usual acknowledgment and a zero count, so a
/// repeated delete has the same response shape as the first.
pub async fn delete_toy(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<(StatusCode, Json<DeleteAck>)> {
    let id = parse_id(&id)?;
    let ack = observe("delete_toy", state.store.delete_one(id)).await?;

    if ack.deleted_count == 0 {
        tracing::warn!("Toy not found for deletion: {}", id);
        return Ok((StatusCode::NOT_FOUND, Json(ack)));
    }

    tracing::info!("Toy deleted: {}", id);
    Ok((StatusCode::OK, Json(ack)))
}

/// Health check endpoint, fails when the store does not answer
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_up = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Health check ping failed: {}", e);
            false
        }
    };

    let response = HealthResponse {
        status: if store_up { "ok" } else { "degraded" }.to_string(),
        store: if store_up { "up" } else { "down" }.to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
        version: crate::VERSION.to_string(),
    };
    let status = if store_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(response))
}

/// Service information endpoint
pub async fn system_info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        storage: state.store.backend().to_string(),
        endpoints: crate::api::server::ROUTES.iter().map(|r| r.to_string()).collect(),
    })
}

/// Prometheus exposition
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4")],
        collect_metrics(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seller_query_requires_value() {
        let present = SellerQuery { seller: Some("a@x.com".into()) };
        assert_eq!(present.require().unwrap(), "a@x.com");

        assert!(SellerQuery { seller: None }.require().is_err());
        assert!(SellerQuery { seller: Some(String::new()) }.require().is_err());
    }

    #[test]
    fn test_upsert_query_resolution() {
        assert!(UpsertQuery { upsert: None }.resolve(true).unwrap());
        assert!(!UpsertQuery { upsert: None }.resolve(false).unwrap());
        assert!(!UpsertQuery { upsert: Some("false".into()) }.resolve(true).unwrap());
        assert!(UpsertQuery { upsert: Some("1".into()) }.resolve(false).unwrap());

        let err = UpsertQuery { upsert: Some("maybe".into()) }.resolve(true).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
