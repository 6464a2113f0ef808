//! Graph index backed by USearch (HNSW)

use parking_lot::Mutex;
use tracing::{debug, warn};
use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use super::stats::{IndexStats, Op, StatsRecorder};
use super::{EngineCode, MatchResult, Method, NativeIndex};

/// Initial number of slots reserved on allocation
const INITIAL_CAPACITY: usize = 1024;

/// Approximate nearest-neighbour index
pub struct GraphIndex {
    /// Every USearch call goes through this lock. Searches draw from a fixed
    /// pool of per-thread contexts sized at `reserve` time, and growing the
    /// index reallocates storage.
    index: Mutex<Index>,
    method: Method,
    dims: usize,
    stats: StatsRecorder,
}

impl GraphIndex {
    /// Create a graph index with `connectivity` edges per node (the HNSW `M`)
    pub fn new(method: Method, dims: u16, connectivity: usize) -> Result<Self, EngineCode> {
        let metric = match method {
            Method::L2Norm => MetricKind::L2sq,
            Method::Cosine => MetricKind::Cos,
        };

        let options = IndexOptions {
            dimensions: dims as usize,
            metric,
            quantization: ScalarKind::F32,
            connectivity,
            expansion_add: 128,
            expansion_search: 64,
            multi: false,
        };

        let index = Index::new(&options).map_err(|e| {
            warn!("Failed to create USearch index: {}", e);
            EngineCode::INVALID_INIT
        })?;
        index.reserve(INITIAL_CAPACITY).map_err(|e| {
            warn!("Failed to reserve index capacity: {}", e);
            EngineCode::SYSTEM_ERROR
        })?;

        debug!(
            "Created graph index: {} dimensions, M={}, metric={:?}",
            dims, connectivity, method
        );

        Ok(Self {
            index: Mutex::new(index),
            method,
            dims: dims as usize,
            stats: StatsRecorder::new(),
        })
    }

    fn check_dims(&self, vector: &[f32]) -> Result<(), EngineCode> {
        if vector.len() != self.dims {
            return Err(EngineCode::INVALID_DIMENSIONS);
        }
        Ok(())
    }

    /// USearch reports squared L2; expose plain Euclidean distance
    fn normalize_distance(&self, raw: f32) -> f32 {
        match self.method {
            Method::L2Norm => raw.max(0.0).sqrt(),
            Method::Cosine => raw.max(0.0),
        }
    }

    fn ranked(&self, vector: &[f32], k: usize) -> Result<Vec<MatchResult>, EngineCode> {
        self.check_dims(vector)?;
        if k == 0 {
            return Err(EngineCode::INVALID_ARGUMENT);
        }

        let index = self.index.lock();
        if index.size() == 0 {
            return Err(EngineCode::INDEX_EMPTY);
        }
        // USearch allocates all k result slots up front
        let k = k.min(index.size());

        let results = index.search(vector, k).map_err(|e| {
            warn!("USearch search failed: {}", e);
            EngineCode::SYSTEM_ERROR
        })?;

        Ok(results
            .keys
            .iter()
            .zip(results.distances.iter())
            .map(|(&id, &distance)| MatchResult {
                id,
                distance: self.normalize_distance(distance),
            })
            .collect())
    }
}

impl NativeIndex for GraphIndex {
    fn insert(&self, id: u64, vector: &[f32]) -> Result<(), EngineCode> {
        self.stats.timed(Op::Insert, || {
            self.check_dims(vector)?;
            let index = self.index.lock();
            if index.contains(id) {
                return Err(EngineCode::DUPLICATED_ENTRY);
            }

            if index.size() >= index.capacity() {
                let target = (index.capacity() * 2).max(INITIAL_CAPACITY);
                index.reserve(target).map_err(|e| {
                    warn!("Failed to grow index to {}: {}", target, e);
                    EngineCode::SYSTEM_ERROR
                })?;
            }

            index.add(id, vector).map_err(|e| {
                warn!("USearch add failed for id {}: {}", id, e);
                EngineCode::SYSTEM_ERROR
            })
        })
    }

    fn delete(&self, id: u64) -> Result<(), EngineCode> {
        self.stats.timed(Op::Delete, || {
            let index = self.index.lock();
            let removed = index.remove(id).map_err(|e| {
                warn!("USearch remove failed for id {}: {}", id, e);
                EngineCode::SYSTEM_ERROR
            })?;
            if removed == 0 {
                return Err(EngineCode::NOT_FOUND_ID);
            }
            Ok(())
        })
    }

    fn search(&self, vector: &[f32]) -> Result<MatchResult, EngineCode> {
        self.stats.timed(Op::Search, || {
            self.ranked(vector, 1)?
                .into_iter()
                .next()
                .ok_or(EngineCode::INVALID_RESULT)
        })
    }

    fn search_n(&self, vector: &[f32], k: usize) -> Result<Vec<MatchResult>, EngineCode> {
        self.stats.timed(Op::SearchN, || self.ranked(vector, k))
    }

    fn contains(&self, id: u64) -> Result<bool, EngineCode> {
        Ok(self.index.lock().contains(id))
    }

    fn size(&self) -> Result<u64, EngineCode> {
        Ok(self.index.lock().size() as u64)
    }

    fn stats(&self) -> Result<IndexStats, EngineCode> {
        Ok(self.stats.snapshot())
    }
}
