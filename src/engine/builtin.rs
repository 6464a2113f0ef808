//! Default engine: flat scan or USearch graph depending on the index type

use tracing::debug;

use super::{Engine, EngineCode, FlatIndex, GraphIndex, IndexType, Method, NativeIndex};

/// Graph connectivity (`M`) used for HNSW indexes
const HNSW_CONNECTIVITY: usize = 16;

/// NSW is served by the same graph with sparser links
const NSW_CONNECTIVITY: usize = 8;

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinEngine;

impl BuiltinEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for BuiltinEngine {
    fn alloc_index(
        &self,
        index_type: i32,
        method: i32,
        dims: u16,
    ) -> Result<Box<dyn NativeIndex>, EngineCode> {
        let index_type = IndexType::from_raw(index_type).ok_or(EngineCode::INVALID_INDEX)?;
        let method = Method::from_raw(method).ok_or(EngineCode::INVALID_ARGUMENT)?;
        if dims == 0 {
            return Err(EngineCode::INVALID_DIMENSIONS);
        }

        debug!("Allocating {:?} index ({:?}, {} dims)", index_type, method, dims);

        let index: Box<dyn NativeIndex> = match index_type {
            IndexType::Flat => Box::new(FlatIndex::new(method, dims)),
            IndexType::Nsw => Box::new(GraphIndex::new(method, dims, NSW_CONNECTIVITY)?),
            IndexType::Hnsw => Box::new(GraphIndex::new(method, dims, HNSW_CONNECTIVITY)?),
        };
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_type() {
        let engine = BuiltinEngine::new();
        assert_eq!(engine.alloc_index(1, 0, 4).err(), Some(EngineCode::INVALID_INDEX));
        assert_eq!(engine.alloc_index(9, 0, 4).err(), Some(EngineCode::INVALID_INDEX));
    }

    #[test]
    fn test_rejects_unknown_method() {
        let engine = BuiltinEngine::new();
        assert_eq!(engine.alloc_index(0, 5, 4).err(), Some(EngineCode::INVALID_ARGUMENT));
    }

    #[test]
    fn test_rejects_zero_dims() {
        let engine = BuiltinEngine::new();
        assert_eq!(engine.alloc_index(0, 0, 0).err(), Some(EngineCode::INVALID_DIMENSIONS));
    }

    #[test]
    fn test_allocates_every_type() {
        let engine = BuiltinEngine::new();
        for index_type in [0, 2, 3] {
            let index = engine.alloc_index(index_type, 0, 3).unwrap();
            index.insert(1, &[1.0, 2.0, 3.0]).unwrap();
            assert_eq!(index.size().unwrap(), 1);
        }
    }
}
