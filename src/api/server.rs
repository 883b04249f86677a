//! HTTP server implementation for the Toy House API

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::future::Future;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use crate::core::error::Result;
use crate::core::AppState;

/// Routes served, as listed by the info endpoint
pub const ROUTES: &[&str] = &[
    "GET /",
    "GET /allToys",
    "GET /allToys/:category",
    "GET /toy/:id",
    "GET /myToys?seller=",
    "GET /searchByName/:name",
    "GET /sort/:query?seller=",
    "POST /addToy",
    "PUT /updateToy/:id",
    "DELETE /deleteToy/:id",
    "GET /health",
    "GET /info",
    "GET /metrics",
];

/// Creates the main application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // Any origin may call the API
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any);

    let mut router = Router::new()
        // Liveness
        .route("/", get(handlers::root_handler))

        // Listings
        .route("/allToys", get(handlers::all_toys))
        .route("/allToys/:category", get(handlers::toys_by_category))
        .route("/toy/:id", get(handlers::get_toy))
        .route("/myToys", get(handlers::my_toys))
        .route("/searchByName/:name", get(handlers::search_by_name))
        .route("/sort/:query", get(handlers::sort_by_price))

        // Writes
        .route("/addToy", post(handlers::add_toy))
        .route("/updateToy/:id", put(handlers::update_toy))
        .route("/deleteToy/:id", delete(handlers::delete_toy))

        // System routes
        .route("/health", get(handlers::health_check))
        .route("/info", get(handlers::system_info));

    if state.config.metrics.enabled {
        router = router.route("/metrics", get(handlers::metrics_handler));
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Start the HTTP server and run until `shutdown` resolves
pub async fn start_server<F>(state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = state.config.server.http_addr;
    tracing::info!("Starting Toy House API server on {}", addr);

    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Toy house server is running on port {}", addr.port());
    tracing::info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
