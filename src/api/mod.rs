//! # API Module
//!
//! HTTP interface of Toy House.
//!
//! ## Endpoints Overview
//!
//! ### Listings
//! - `GET /allToys` - Every toy
//! - `GET /allToys/{category}` - Toys in a category (capped)
//! - `GET /toy/{id}` - One toy
//! - `GET /myToys?seller={email}` - A seller's toys
//! - `GET /searchByName/{name}` - Case-insensitive title search
//! - `GET /sort/{highToLow|lowToHigh}?seller={email}` - A seller's toys by price
//!
//! ### Writes
//! - `POST /addToy` - Create
//! - `PUT /updateToy/{id}` - Replace, upserting by default
//! - `DELETE /deleteToy/{id}` - Delete
//!
//! ### System Essentials
//! - `GET /` - Liveness text
//! - `GET /health` - Store health
//! - `GET /info` - Service info
//! - `GET /metrics` - Prometheus metrics

pub mod handlers;
pub mod response;
pub mod server;


// Re-export commonly used items
pub use handlers::LIVENESS_MESSAGE;
pub use response::{ErrorResponse, JsonRequest, PathParam, QueryParams};
pub use server::{create_app, start_server};
