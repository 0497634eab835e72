//! Model classes produced by the factory
//!
//! A [`ModelClass`] is immutable once built. The only state that changes
//! afterwards is the identity map of its cache controller.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::{CacheController, IdentityMap};
use crate::config::ModelConfig;
use crate::error::{ModelError, ModelResult};
use crate::factory::ModelFactory;
use crate::instance::{instantiate, Instance, Record};
use crate::key::KeySpec;
use crate::members::{FetchCallback, Initializer, InstanceMember, Members, StaticMember};

pub(crate) struct ClassInner {
    pub(crate) name: String,
    pub(crate) initializer: Initializer,
    pub(crate) statics: Members<StaticMember>,
    pub(crate) prototype: Members<InstanceMember>,
    pub(crate) cache: Option<Arc<CacheController>>,
    pub(crate) parent: Option<ModelClass>,
}

/// Shared handle to a class definition
#[derive(Clone)]
pub struct ModelClass {
    inner: Arc<ClassInner>,
}

impl ModelClass {
    pub(crate) fn from_inner(inner: ClassInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The class this one was extended from
    pub fn parent(&self) -> Option<&ModelClass> {
        self.inner.parent.as_ref()
    }

    pub fn statics(&self) -> &Members<StaticMember> {
        &self.inner.statics
    }

    /// Instance members shared by every instance
    pub fn prototype(&self) -> &Members<InstanceMember> {
        &self.inner.prototype
    }

    pub(crate) fn initializer(&self) -> &Initializer {
        &self.inner.initializer
    }

    pub(crate) fn inner_cache(&self) -> Option<Arc<CacheController>> {
        self.inner.cache.clone()
    }

    /// Construct a new instance from `record`
    pub fn instantiate(&self, record: Record) -> ModelResult<Instance> {
        instantiate(self, &record)
    }

    pub fn static_member(&self, name: &str) -> Option<&StaticMember> {
        self.inner.statics.get(name)
    }

    /// Invoke a static member with this class as receiver.
    ///
    /// Plain values are returned cloned. The fetch collaborator is only
    /// reachable through [`ModelClass::fetch`].
    pub fn call_static(&self, name: &str, args: &[Value]) -> ModelResult<Value> {
        match self.inner.statics.get(name) {
            Some(StaticMember::Function(function)) => function(self, args),
            Some(StaticMember::Value(value)) => Ok(value.clone()),
            Some(StaticMember::Fetch(_)) => Err(ModelError::not_callable(self.name(), name)),
            None => Err(ModelError::unknown_member(self.name(), name)),
        }
    }

    /// Whether this class (or an ancestor it inherits from) keeps an identity map
    pub fn is_cacheable(&self) -> bool {
        self.inner.cache.is_some()
    }

    pub fn cache_controller(&self) -> Option<&CacheController> {
        self.inner.cache.as_deref()
    }

    pub fn cache_key(&self) -> Option<&KeySpec> {
        self.cache_controller().map(CacheController::key_spec)
    }

    pub fn identity_map(&self) -> Option<&IdentityMap> {
        self.cache_controller().map(CacheController::identity_map)
    }

    fn controller(&self) -> ModelResult<&CacheController> {
        self.cache_controller()
            .ok_or_else(|| ModelError::CacheDisabled(self.name().to_string()))
    }

    /// Store `instance` in the identity map under its cache key
    pub fn cache(&self, instance: &Instance) -> ModelResult<()> {
        self.controller()?.cache(instance);
        Ok(())
    }

    /// Resolve `key` through the identity map, see [`CacheController::fetch`]
    pub fn fetch(
        &self,
        key: impl Into<Value>,
        callback: Option<FetchCallback>,
        force_refresh: bool,
    ) -> ModelResult<Option<Instance>> {
        self.controller()?
            .fetch(self, &key.into(), callback, force_refresh)
    }

    /// Read-through fetch: `callback` runs on a hit or once the collaborator resolves
    pub fn fetch_with<F>(&self, key: impl Into<Value>, callback: F) -> ModelResult<()>
    where
        F: FnOnce(Instance) + Send + 'static,
    {
        self.fetch(key, Some(Box::new(callback)), false).map(|_| ())
    }

    /// Synchronous identity-map query
    pub fn lookup(&self, key: impl Into<Value>) -> ModelResult<Option<Instance>> {
        self.fetch(key, None, false)
    }

    /// Bypass the identity map and ask the collaborator
    pub fn refresh<F>(&self, key: impl Into<Value>, callback: F) -> ModelResult<()>
    where
        F: FnOnce(Instance) + Send + 'static,
    {
        self.fetch(key, Some(Box::new(callback)), true).map(|_| ())
    }

    /// Define a child class chained from this one
    pub fn extend(&self, config: ModelConfig) -> ModelResult<ModelClass> {
        self.controller()?;
        ModelFactory::define_with_parent(config, self)
    }
}

impl fmt::Debug for ModelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelClass")
            .field("name", &self.inner.name)
            .field("statics", &self.inner.statics.names().collect::<Vec<_>>())
            .field("prototype", &self.inner.prototype.names().collect::<Vec<_>>())
            .field("cache_key", &self.cache_key())
            .field("parent", &self.parent().map(ModelClass::name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_static() {
        let class = ModelFactory::define(
            ModelConfig::named("Counter")
                .static_value("table", "counters")
                .static_fn("describe", |class, args| {
                    Ok(json!(format!("{}({})", class.name(), args.len())))
                }),
        )
        .unwrap();

        assert_eq!(class.call_static("table", &[]).unwrap(), json!("counters"));
        assert_eq!(
            class.call_static("describe", &[json!(1), json!(2)]).unwrap(),
            json!("Counter(2)")
        );
        assert!(matches!(
            class.call_static("missing", &[]),
            Err(ModelError::UnknownMember { .. })
        ));
    }

    #[test]
    fn test_fetch_static_is_not_directly_callable() {
        let class = ModelFactory::define(
            ModelConfig::named("Item").cache_key("id").fetch(|_, _, _| Ok(())),
        )
        .unwrap();

        assert!(matches!(
            class.call_static("fetch", &[json!(1)]),
            Err(ModelError::NotCallable { .. })
        ));
    }

    #[test]
    fn test_cache_ops_require_cache_key() {
        let class = ModelFactory::define(ModelConfig::named("Plain")).unwrap();
        let instance = class.instantiate(Record::new()).unwrap();

        let disabled = ModelError::CacheDisabled("Plain".to_string());
        assert_eq!(class.cache(&instance).unwrap_err(), disabled);
        assert_eq!(class.lookup(1).unwrap_err(), disabled);
        assert_eq!(class.extend(ModelConfig::new()).unwrap_err(), disabled);
        assert!(class.identity_map().is_none());
    }

    #[test]
    fn test_debug_lists_member_names() {
        let class = ModelFactory::define(
            ModelConfig::named("Animal").method("speak", |_, _| Ok(json!("..."))),
        )
        .unwrap();
        let debug = format!("{:?}", class);
        assert!(debug.contains("Animal"));
        assert!(debug.contains("speak"));
    }
}
