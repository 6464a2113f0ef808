//! HTTP API Server Module
//!
//! REST gateway over the index registry: index lifecycle and vector
//! operations as JSON over HTTP.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use handlers::AppState;
pub use routes::create_router;
pub use server::HttpServer;
