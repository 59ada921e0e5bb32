use std::collections::BTreeMap;

use acrux_core::error::AcruxError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Byte-keyed store owned by one component. Each component gets its own
/// namespace, so keys never collide across modules.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, AcruxError>;

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), AcruxError>;

    fn has(&self, key: &[u8]) -> Result<bool, AcruxError> {
        Ok(self.get(key)?.is_some())
    }
}

// ── In-memory ────────────────────────────────────────────────────────────────

/// Ordered in-memory store.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, AcruxError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), AcruxError> {
        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

// ── sled ─────────────────────────────────────────────────────────────────────

/// One sled tree used as a module namespace. Cloning shares the tree.
#[derive(Clone)]
pub struct TreeStore {
    tree: sled::Tree,
}

impl TreeStore {
    pub fn new(tree: sled::Tree) -> Self {
        Self { tree }
    }

    pub(crate) fn tree(&self) -> &sled::Tree {
        &self.tree
    }
}

impl KvStore for TreeStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, AcruxError> {
        self.tree
            .get(key)
            .map(|v| v.map(|iv| iv.to_vec()))
            .map_err(|e| AcruxError::Storage(e.to_string()))
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), AcruxError> {
        self.tree
            .insert(key, value)
            .map_err(|e| AcruxError::Storage(e.to_string()))?;
        Ok(())
    }

    fn has(&self, key: &[u8]) -> Result<bool, AcruxError> {
        self.tree
            .contains_key(key)
            .map_err(|e| AcruxError::Storage(e.to_string()))
    }
}

// ── Write overlay ────────────────────────────────────────────────────────────

/// Buffers writes over `base`. Reads see buffered values first; nothing
/// reaches `base` until the owner takes the pending set and commits it.
pub struct Overlay<S> {
    base: S,
    pending: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl<S> Overlay<S> {
    pub fn new(base: S) -> Self {
        Self {
            base,
            pending: BTreeMap::new(),
        }
    }

    pub fn pending(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.pending
    }

    pub fn into_parts(self) -> (S, BTreeMap<Vec<u8>, Vec<u8>>) {
        (self.base, self.pending)
    }
}

impl<S: KvStore> KvStore for Overlay<S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, AcruxError> {
        match self.pending.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.base.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), AcruxError> {
        self.pending.insert(key.to_vec(), value.to_vec());
        Ok(())
    }
}

// ── Parameter subspace ───────────────────────────────────────────────────────

/// A module's parameter namespace: one JSON-encoded value per parameter key,
/// each readable and writable on its own. Validation belongs to the owning
/// module, which runs it before calling `set`.
pub struct Subspace<S> {
    name: String,
    store: S,
}

impl<S: KvStore> Subspace<S> {
    pub fn new(name: impl Into<String>, store: S) -> Self {
        Self {
            name: name.into(),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>, AcruxError> {
        self.store.get(key)
    }

    pub fn set_raw(&mut self, key: &[u8], value: &[u8]) -> Result<(), AcruxError> {
        self.store.set(key, value)
    }

    pub fn has(&self, key: &[u8]) -> Result<bool, AcruxError> {
        self.store.has(key)
    }

    pub fn get<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, AcruxError> {
        match self.store.get(key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| AcruxError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&mut self, key: &[u8], value: &T) -> Result<(), AcruxError> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| AcruxError::Serialization(e.to_string()))?;
        self.store.set(key, &bytes)
    }
}
