//! Model configuration and builder

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::class::ModelClass;
use crate::error::ModelResult;
use crate::instance::{Instance, Record};
use crate::key::KeySpec;
use crate::members::{
    merge, FetchCallback, Initializer, InstanceMember, Members, SaveCallback, StaticMember,
};

/// Declarative description of a model class.
///
/// Feed it to [`ModelFactory::define`](crate::ModelFactory::define) or
/// [`ModelClass::extend`].
#[derive(Clone, Default)]
pub struct ModelConfig {
    pub(crate) name: Option<String>,
    pub(crate) init: Option<Initializer>,
    pub(crate) statics: Members<StaticMember>,
    pub(crate) methods: Members<InstanceMember>,
    pub(crate) cache_key: Option<KeySpec>,
}

impl ModelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a configuration for a class with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Custom constructor; replaces the default field copying entirely
    pub fn init<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance, &Record) -> ModelResult<()> + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(f));
        self
    }

    /// Add a static value
    pub fn static_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.statics.insert(name, StaticMember::Value(value.into()));
        self
    }

    /// Add a static function
    pub fn static_fn<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&ModelClass, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.statics.insert(name, StaticMember::Function(Arc::new(f)));
        self
    }

    /// Install the `fetch` collaborator consulted on cache misses
    pub fn fetch<F>(mut self, f: F) -> Self
    where
        F: Fn(&ModelClass, &Value, FetchCallback) -> ModelResult<()> + Send + Sync + 'static,
    {
        self.statics.insert("fetch", StaticMember::Fetch(Arc::new(f)));
        self
    }

    /// Add an instance method
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> ModelResult<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name, InstanceMember::Method(Arc::new(f)));
        self
    }

    /// Add a value shared by every instance
    pub fn instance_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.methods.insert(name, InstanceMember::Value(value.into()));
        self
    }

    /// Custom `save`; suppresses the default caching save
    pub fn save<F>(mut self, f: F) -> Self
    where
        F: Fn(&Instance, Option<SaveCallback>) -> ModelResult<()> + Send + Sync + 'static,
    {
        self.methods.insert("save", InstanceMember::Save(Arc::new(f)));
        self
    }

    /// Enable the identity map, keyed by a field name or a [`KeySpec`]
    pub fn cache_key(mut self, key: impl Into<KeySpec>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Enable the identity map with a derived key
    pub fn cache_key_with<F>(self, f: F) -> Self
    where
        F: Fn(&Instance) -> Value + Send + Sync + 'static,
    {
        self.cache_key(KeySpec::derive(f))
    }

    /// Layer a whole table of statics over the current ones
    pub fn statics(mut self, statics: Members<StaticMember>) -> Self {
        merge(&statics, &mut self.statics);
        self
    }

    /// Layer a whole table of instance members over the current ones
    pub fn methods(mut self, methods: Members<InstanceMember>) -> Self {
        merge(&methods, &mut self.methods);
        self
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("name", &self.name)
            .field("init", &self.init.is_some())
            .field("statics", &self.statics.names().collect::<Vec<_>>())
            .field("methods", &self.methods.names().collect::<Vec<_>>())
            .field("cache_key", &self.cache_key)
            .finish()
    }
}
