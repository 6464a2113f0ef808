//! Daemon Module
//!
//! The vectord service process. The daemon owns one index registry and
//! exposes it over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                vectord daemon                 │
//! │                                               │
//! │  ┌─────────────┐   ┌──────────────────────┐  │
//! │  │ HTTP API    │──▶│ Index Registry       │  │
//! │  │ (axum)      │   │ name/id -> resource  │  │
//! │  └─────────────┘   └──────────┬───────────┘  │
//! │                               │               │
//! │                    ┌──────────▼───────────┐  │
//! │                    │ Engine adapter       │  │
//! │                    │ (flat / usearch)     │  │
//! │                    └──────────────────────┘  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! vectord serve --port 7007
//! ```

pub mod http;
pub mod lifecycle;
pub mod registry;

pub use http::HttpServer;
pub use lifecycle::{Daemon, LifecycleError, ServerState};
pub use registry::{IndexRegistry, IndexResource, RegistryError};
