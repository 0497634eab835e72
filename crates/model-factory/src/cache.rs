//! Identity map and cache controller
//!
//! A cache-enabled class owns one [`CacheController`]: the key spec, the
//! external fetch collaborator and the identity map. Every operation takes
//! the class it acts for explicitly.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use crate::class::ModelClass;
use crate::error::ModelResult;
use crate::instance::Instance;
use crate::key::{coerce_key, KeySpec};
use crate::members::{FetchCallback, Fetcher, SaveCallback, SaveFn};

/// In-memory map from string key to the most recently cached instance.
///
/// Entries are never evicted; a key is only ever overwritten.
#[derive(Default)]
pub struct IdentityMap {
    entries: DashMap<String, Instance>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `instance` under `key`, returning the entry it replaced
    pub(crate) fn insert(&self, key: String, instance: Instance) -> Option<Instance> {
        self.entries.insert(key, instance)
    }

    /// Look up an entry. The returned handle holds no lock on the map.
    pub fn get(&self, key: &str) -> Option<Instance> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for IdentityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityMap")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Cache, fetch and save logic bound to one identity map
pub struct CacheController {
    key: KeySpec,
    fetcher: Fetcher,
    instances: IdentityMap,
}

impl CacheController {
    pub(crate) fn new(key: KeySpec, fetcher: Fetcher) -> Self {
        Self {
            key,
            fetcher,
            instances: IdentityMap::new(),
        }
    }

    pub fn key_spec(&self) -> &KeySpec {
        &self.key
    }

    pub fn identity_map(&self) -> &IdentityMap {
        &self.instances
    }

    /// Store `instance` under its resolved key, replacing any prior entry
    pub fn cache(&self, instance: &Instance) {
        let key = self.key.resolve(instance);
        debug!("Caching {} instance under key '{}'", instance.class().name(), key);
        self.instances.insert(key, instance.clone());
    }

    /// Resolve `key` for `class`.
    ///
    /// - `force_refresh`: hand straight to the collaborator, map untouched.
    /// - with a callback: hit → callback runs now; miss → collaborator.
    /// - without a callback: return the cached instance, never fetch.
    pub fn fetch(
        &self,
        class: &ModelClass,
        key: &Value,
        callback: Option<FetchCallback>,
        force_refresh: bool,
    ) -> ModelResult<Option<Instance>> {
        if force_refresh {
            debug!("Forced refresh of {} key {}", class.name(), key);
            self.delegate(class, key, callback)?;
            return Ok(None);
        }

        let cache_key = coerce_key(key);
        let cached = self.instances.get(&cache_key);

        match callback {
            Some(callback) => {
                match cached {
                    Some(instance) => {
                        debug!("Cache hit for {} key '{}'", class.name(), cache_key);
                        callback(instance);
                    }
                    None => {
                        debug!("Cache miss for {} key '{}', fetching", class.name(), cache_key);
                        self.delegate(class, key, Some(callback))?;
                    }
                }
                Ok(None)
            }
            None => Ok(cached),
        }
    }

    fn delegate(
        &self,
        class: &ModelClass,
        key: &Value,
        callback: Option<FetchCallback>,
    ) -> ModelResult<()> {
        let callback: FetchCallback = match callback {
            Some(callback) => callback,
            None => Box::new(|_: Instance| {}),
        };
        (self.fetcher)(class, key, callback)
    }
}

impl fmt::Debug for CacheController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheController")
            .field("key", &self.key)
            .field("instances", &self.instances)
            .finish()
    }
}

/// Default `save`: cache the instance, then run the callback
pub(crate) fn default_save(controller: Arc<CacheController>) -> SaveFn {
    Arc::new(move |instance: &Instance, callback: Option<SaveCallback>| -> ModelResult<()> {
        controller.cache(instance);
        if let Some(callback) = callback {
            callback(instance);
        }
        Ok(())
    })
}
