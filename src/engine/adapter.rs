//! Engine adapter
//!
//! [`IndexHandle`] exclusively owns one native index. Every call is checked
//! against a detached handle first and every failure code is translated to
//! [`EngineError`]. Nothing is retried here.

use super::{Engine, EngineError, IndexStats, MatchResult, NativeIndex};

/// Allocate a native index and wrap it in a handle
pub fn alloc_index(
    engine: &dyn Engine,
    index_type: i32,
    method: i32,
    dims: u16,
) -> Result<IndexHandle, EngineError> {
    engine
        .alloc_index(index_type, method, dims)
        .map(IndexHandle::new)
        .map_err(EngineError::from_failure)
}

/// Owning reference to one native index.
///
/// Not `Clone`: a native index has exactly one owner. Dropping the handle
/// destroys the index.
pub struct IndexHandle {
    native: Option<Box<dyn NativeIndex>>,
}

impl IndexHandle {
    pub fn new(native: Box<dyn NativeIndex>) -> Self {
        Self {
            native: Some(native),
        }
    }

    /// A handle with no native index behind it
    pub fn detached() -> Self {
        Self { native: None }
    }

    pub fn is_initialized(&self) -> bool {
        self.native.is_some()
    }

    fn native(&self) -> Result<&dyn NativeIndex, EngineError> {
        self.native.as_deref().ok_or(EngineError::NotInitialized)
    }

    pub fn insert(&self, id: u64, vector: &[f32]) -> Result<(), EngineError> {
        let native = self.native()?;
        if vector.is_empty() {
            return Err(EngineError::InvalidVector);
        }
        native.insert(id, vector).map_err(EngineError::from_failure)
    }

    pub fn delete(&self, id: u64) -> Result<(), EngineError> {
        self.native()?.delete(id).map_err(EngineError::from_failure)
    }

    pub fn search(&self, vector: &[f32]) -> Result<MatchResult, EngineError> {
        let native = self.native()?;
        if vector.is_empty() {
            return Err(EngineError::InvalidVector);
        }
        native.search(vector).map_err(EngineError::from_failure)
    }

    pub fn search_n(&self, vector: &[f32], k: usize) -> Result<Vec<MatchResult>, EngineError> {
        let native = self.native()?;
        if vector.is_empty() {
            return Err(EngineError::InvalidVector);
        }
        native.search_n(vector, k).map_err(EngineError::from_failure)
    }

    pub fn contains(&self, id: u64) -> Result<bool, EngineError> {
        self.native()?.contains(id).map_err(EngineError::from_failure)
    }

    pub fn size(&self) -> Result<u64, EngineError> {
        self.native()?.size().map_err(EngineError::from_failure)
    }

    pub fn stats(&self) -> Result<IndexStats, EngineError> {
        self.native()?.stats().map_err(EngineError::from_failure)
    }

    /// Release the native index. Safe to call more than once.
    pub fn destroy(&mut self) {
        self.native = None;
    }
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexHandle")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::engine::{BuiltinEngine, EngineCode};

    /// Backend that fails every call with a fixed code and counts calls
    struct FailingIndex {
        code: EngineCode,
        calls: Arc<AtomicUsize>,
    }

    impl NativeIndex for FailingIndex {
        fn insert(&self, _id: u64, _vector: &[f32]) -> Result<(), EngineCode> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.code)
        }
        fn delete(&self, _id: u64) -> Result<(), EngineCode> {
            Err(self.code)
        }
        fn search(&self, _vector: &[f32]) -> Result<MatchResult, EngineCode> {
            Err(self.code)
        }
        fn search_n(&self, _vector: &[f32], _k: usize) -> Result<Vec<MatchResult>, EngineCode> {
            Err(self.code)
        }
        fn contains(&self, _id: u64) -> Result<bool, EngineCode> {
            Err(self.code)
        }
        fn size(&self) -> Result<u64, EngineCode> {
            Err(self.code)
        }
        fn stats(&self) -> Result<IndexStats, EngineCode> {
            Err(self.code)
        }
    }

    fn failing(code: i32) -> (IndexHandle, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = IndexHandle::new(Box::new(FailingIndex {
            code: EngineCode(code),
            calls: calls.clone(),
        }));
        (handle, calls)
    }

    #[test]
    fn test_detached_handle_fails_before_calling() {
        let handle = IndexHandle::detached();
        assert_eq!(handle.insert(1, &[1.0]), Err(EngineError::NotInitialized));
        assert_eq!(handle.delete(1), Err(EngineError::NotInitialized));
        assert_eq!(handle.search(&[1.0]).err(), Some(EngineError::NotInitialized));
        assert_eq!(handle.size(), Err(EngineError::NotInitialized));
        assert_eq!(handle.contains(1), Err(EngineError::NotInitialized));
        assert!(handle.stats().is_err());
    }

    #[test]
    fn test_empty_vector_never_reaches_engine() {
        let (handle, calls) = failing(9);
        assert_eq!(handle.insert(1, &[]), Err(EngineError::InvalidVector));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(handle.insert(1, &[1.0]), Err(EngineError::DuplicatedEntry));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_codes_are_translated() {
        let (handle, _) = failing(11);
        assert_eq!(handle.search(&[1.0]).err(), Some(EngineError::IndexEmpty));

        let (handle, _) = failing(99);
        assert_eq!(handle.size(), Err(EngineError::Unknown(99)));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut handle = alloc_index(&BuiltinEngine::new(), 0, 0, 2).unwrap();
        handle.insert(1, &[1.0, 1.0]).unwrap();
        handle.destroy();
        handle.destroy();
        assert!(!handle.is_initialized());
        assert_eq!(handle.size(), Err(EngineError::NotInitialized));
    }

    #[test]
    fn test_alloc_failure_is_typed() {
        let err = alloc_index(&BuiltinEngine::new(), 42, 0, 4).unwrap_err();
        assert_eq!(err, EngineError::InvalidIndex);
    }
}
