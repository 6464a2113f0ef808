//! vectord: a network service and client for vector similarity indexes
//!
//! - Engine boundary with a built-in flat scan and USearch graph indexes
//! - Concurrent registry of named indexes
//! - REST API over axum
//! - Client that attaches to a running daemon or starts and owns a local one

pub mod client;
pub mod config;
pub mod daemon;
pub mod engine;

pub use client::{Client, ClientError};
pub use config::Config;
pub use daemon::Daemon;
pub use engine::MatchResult;
