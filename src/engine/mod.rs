//! Vector index engine boundary
//!
//! The registry and the HTTP layer never talk to an index backend directly.
//! They hold an [`IndexHandle`], which owns exactly one native index and
//! translates backend status codes into [`EngineError`].
//!
//! ```text
//! IndexRegistry ──▶ IndexHandle (adapter) ──▶ dyn NativeIndex
//!                                               ├── FlatIndex   (linear scan)
//!                                               └── GraphIndex  (USearch HNSW)
//! ```

mod adapter;
mod builtin;
mod error;
mod flat;
mod graph;
mod stats;

pub use adapter::{alloc_index, IndexHandle};
pub use builtin::BuiltinEngine;
pub use error::{EngineCode, EngineError};
pub use flat::FlatIndex;
pub use graph::GraphIndex;
pub use stats::{IndexStats, StatsRecorder, TimeStat};

use serde::{Deserialize, Serialize};

/// Index algorithm selector (wire value in parentheses)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// Exact linear scan (0)
    Flat,
    /// Navigable small world graph (2)
    Nsw,
    /// Hierarchical navigable small world graph (3)
    Hnsw,
}

impl IndexType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Flat),
            2 => Some(Self::Nsw),
            3 => Some(Self::Hnsw),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::Flat => 0,
            Self::Nsw => 2,
            Self::Hnsw => 3,
        }
    }
}

/// Distance function selector (wire value in parentheses)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Euclidean distance (0)
    L2Norm,
    /// Cosine distance, `1 - cos(a, b)` (1)
    Cosine,
}

impl Method {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::L2Norm),
            1 => Some(Self::Cosine),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::L2Norm => 0,
            Self::Cosine => 1,
        }
    }
}

/// A single nearest-neighbour match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: u64,
    pub distance: f32,
}

/// One allocated native index instance.
///
/// Implementations must be safe for concurrent insert/delete/search on the
/// same instance; the registry does not serialize these calls.
pub trait NativeIndex: Send + Sync {
    fn insert(&self, id: u64, vector: &[f32]) -> Result<(), EngineCode>;

    fn delete(&self, id: u64) -> Result<(), EngineCode>;

    fn search(&self, vector: &[f32]) -> Result<MatchResult, EngineCode>;

    /// Up to `k` matches, nearest first
    fn search_n(&self, vector: &[f32], k: usize) -> Result<Vec<MatchResult>, EngineCode>;

    fn contains(&self, id: u64) -> Result<bool, EngineCode>;

    fn size(&self) -> Result<u64, EngineCode>;

    fn stats(&self) -> Result<IndexStats, EngineCode>;
}

/// Index allocator
pub trait Engine: Send + Sync {
    fn alloc_index(
        &self,
        index_type: i32,
        method: i32,
        dims: u16,
    ) -> Result<Box<dyn NativeIndex>, EngineCode>;
}

/// Distance between two vectors of equal length
pub(crate) fn distance(method: Method, a: &[f32], b: &[f32]) -> f32 {
    match method {
        Method::L2Norm => a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
        Method::Cosine => {
            let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
            let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                1.0
            } else {
                1.0 - dot / (norm_a * norm_b)
            }
        }
    }
}
