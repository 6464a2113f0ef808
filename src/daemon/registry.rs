//! Index Registry
//!
//! Concurrent table of named index resources for one service instance.
//! Each resource exclusively owns its engine handle; the registry only
//! guards the table itself. Insert/Delete/Search on a registered resource
//! go straight to the engine without touching the registry lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DuplicateNamePolicy;
use crate::engine::{self, Engine, EngineError, IndexHandle};

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Index '{0}' already exists")]
    Exists(String),

    #[error("Index '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// One allocated engine index exposed under a name
pub struct IndexResource {
    resource_id: Uuid,
    name: String,
    index_type: i32,
    method: i32,
    dims: u16,
    handle: IndexHandle,
}

impl IndexResource {
    pub fn resource_id(&self) -> Uuid {
        self.resource_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index_type(&self) -> i32 {
        self.index_type
    }

    pub fn method(&self) -> i32 {
        self.method
    }

    pub fn dims(&self) -> u16 {
        self.dims
    }

    /// Engine handle; all vector operations go through it
    pub fn handle(&self) -> &IndexHandle {
        &self.handle
    }
}

impl std::fmt::Debug for IndexResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexResource")
            .field("resource_id", &self.resource_id)
            .field("name", &self.name)
            .field("index_type", &self.index_type)
            .field("method", &self.method)
            .field("dims", &self.dims)
            .finish()
    }
}

#[derive(Default)]
struct Tables {
    by_name: HashMap<String, Arc<IndexResource>>,
    by_id: HashMap<Uuid, Arc<IndexResource>>,
}

/// Name and id keyed store of index resources
pub struct IndexRegistry {
    engine: Arc<dyn Engine>,
    policy: DuplicateNamePolicy,
    tables: RwLock<Tables>,
}

impl IndexRegistry {
    pub fn new(engine: Arc<dyn Engine>, policy: DuplicateNamePolicy) -> Self {
        Self {
            engine,
            policy,
            tables: RwLock::new(Tables::default()),
        }
    }

    pub fn policy(&self) -> DuplicateNamePolicy {
        self.policy
    }

    /// Allocate an engine index and register it under `name`.
    ///
    /// The write lock is held across engine allocation, so creates are fully
    /// serialized. Allocation is fast for the built-in engine; a slow engine
    /// would stall lookups for its duration.
    pub fn create(
        &self,
        name: &str,
        index_type: i32,
        method: i32,
        dims: u16,
    ) -> Result<Arc<IndexResource>, RegistryError> {
        let mut tables = self.tables.write();

        if tables.by_name.contains_key(name) && self.policy == DuplicateNamePolicy::Reject {
            return Err(RegistryError::Exists(name.to_string()));
        }

        let handle = engine::alloc_index(self.engine.as_ref(), index_type, method, dims)?;
        let resource = Arc::new(IndexResource {
            resource_id: Uuid::new_v4(),
            name: name.to_string(),
            index_type,
            method,
            dims,
            handle,
        });

        if let Some(previous) = tables.by_name.insert(name.to_string(), resource.clone()) {
            tables.by_id.remove(&previous.resource_id);
            warn!(
                "Replaced index '{}' ({} -> {})",
                name, previous.resource_id, resource.resource_id
            );
        }
        tables.by_id.insert(resource.resource_id, resource.clone());

        info!(
            "Created index '{}' id={} type={} method={} dims={}",
            name, resource.resource_id, index_type, method, dims
        );
        Ok(resource)
    }

    /// Look up a resource by name, falling back to its resource id
    pub fn lookup(&self, key: &str) -> Option<Arc<IndexResource>> {
        let tables = self.tables.read();
        if let Some(resource) = tables.by_name.get(key) {
            return Some(resource.clone());
        }
        let id = Uuid::parse_str(key).ok()?;
        tables.by_id.get(&id).cloned()
    }

    pub fn dims(&self, key: &str) -> Option<u16> {
        self.lookup(key).map(|r| r.dims)
    }

    /// All resources, ordered by name
    pub fn list(&self) -> Vec<Arc<IndexResource>> {
        let tables = self.tables.read();
        let mut resources: Vec<_> = tables.by_name.values().cloned().collect();
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        resources
    }

    pub fn len(&self) -> usize {
        self.tables.read().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a resource from both lookup paths.
    ///
    /// The engine index is released when the last in-flight holder of the
    /// returned `Arc` drops it.
    pub fn destroy(&self, key: &str) -> Result<Arc<IndexResource>, RegistryError> {
        let mut tables = self.tables.write();
        let name = match tables.by_name.get(key) {
            Some(resource) => resource.name.clone(),
            None => Uuid::parse_str(key)
                .ok()
                .and_then(|id| tables.by_id.get(&id))
                .map(|r| r.name.clone())
                .ok_or_else(|| RegistryError::NotFound(key.to_string()))?,
        };

        let resource = tables
            .by_name
            .remove(&name)
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))?;
        tables.by_id.remove(&resource.resource_id);

        info!("Destroyed index '{}' id={}", name, resource.resource_id);
        Ok(resource)
    }

    /// Drop every resource; used on service shutdown
    pub fn clear(&self) {
        let mut tables = self.tables.write();
        let count = tables.by_name.len();
        tables.by_name.clear();
        tables.by_id.clear();
        debug!("Released {} index(es)", count);
    }
}
