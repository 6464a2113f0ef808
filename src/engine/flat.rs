//! Exact linear-scan index

use std::collections::HashMap;

use parking_lot::RwLock;

use super::stats::{IndexStats, Op, StatsRecorder};
use super::{distance, EngineCode, MatchResult, Method, NativeIndex};

#[derive(Default)]
struct Entries {
    /// Vectors in insertion order (swap-removed on delete)
    items: Vec<(u64, Vec<f32>)>,
    /// id -> position in `items`
    positions: HashMap<u64, usize>,
}

/// Brute-force index: every search compares against every stored vector
pub struct FlatIndex {
    method: Method,
    dims: usize,
    entries: RwLock<Entries>,
    stats: StatsRecorder,
}

impl FlatIndex {
    pub fn new(method: Method, dims: u16) -> Self {
        Self {
            method,
            dims: dims as usize,
            entries: RwLock::new(Entries::default()),
            stats: StatsRecorder::new(),
        }
    }

    fn check_dims(&self, vector: &[f32]) -> Result<(), EngineCode> {
        if vector.len() != self.dims {
            return Err(EngineCode::INVALID_DIMENSIONS);
        }
        Ok(())
    }

    fn ranked(&self, vector: &[f32], k: usize) -> Result<Vec<MatchResult>, EngineCode> {
        self.check_dims(vector)?;
        if k == 0 {
            return Err(EngineCode::INVALID_ARGUMENT);
        }

        let entries = self.entries.read();
        if entries.items.is_empty() {
            return Err(EngineCode::INDEX_EMPTY);
        }

        let mut matches: Vec<MatchResult> = entries
            .items
            .iter()
            .map(|(id, stored)| MatchResult {
                id: *id,
                distance: distance(self.method, vector, stored),
            })
            .collect();

        // Stable sort keeps insertion order among equal distances
        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        matches.truncate(k);
        Ok(matches)
    }
}

impl NativeIndex for FlatIndex {
    fn insert(&self, id: u64, vector: &[f32]) -> Result<(), EngineCode> {
        self.stats.timed(Op::Insert, || {
            self.check_dims(vector)?;
            let mut entries = self.entries.write();
            if entries.positions.contains_key(&id) {
                return Err(EngineCode::DUPLICATED_ENTRY);
            }
            let position = entries.items.len();
            entries.items.push((id, vector.to_vec()));
            entries.positions.insert(id, position);
            Ok(())
        })
    }

    fn delete(&self, id: u64) -> Result<(), EngineCode> {
        self.stats.timed(Op::Delete, || {
            let mut entries = self.entries.write();
            let position = entries
                .positions
                .remove(&id)
                .ok_or(EngineCode::NOT_FOUND_ID)?;
            entries.items.swap_remove(position);
            if let Some((moved, _)) = entries.items.get(position) {
                let moved = *moved;
                entries.positions.insert(moved, position);
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
        Ok(self.entries.read().positions.contains_key(&id))
    }

    fn size(&self) -> Result<u64, EngineCode> {
        Ok(self.entries.read().items.len() as u64)
    }

    fn stats(&self) -> Result<IndexStats, EngineCode> {
        Ok(self.stats.snapshot())
    }
}
