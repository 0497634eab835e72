//! The model factory
//!
//! Turns a [`ModelConfig`] (and optionally a parent class) into a
//! [`ModelClass`]:
//!
//! 1. pick the effective initializer: `config.init`, else the parent's,
//!    else the default field copy
//! 2. merge parent statics, then config statics on top
//! 3. merge the parent prototype, then config methods on top
//! 4. with a cache key: require a `fetch` collaborator, create the identity
//!    map and install the default `save` unless one was configured
//!
//! Extension is composition: instances of the child own a full parent
//! instance built from the same record.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{default_save, CacheController};
use crate::class::{ClassInner, ModelClass};
use crate::config::ModelConfig;
use crate::error::{ModelError, ModelResult};
use crate::instance::{Instance, Record};
use crate::members::{merge, Initializer, InstanceMember, Members, StaticMember};

/// Builds model classes from configurations
pub struct ModelFactory;

impl ModelFactory {
    /// Define a root class
    pub fn define(config: ModelConfig) -> ModelResult<ModelClass> {
        Self::build(config, None)
    }

    /// Define a class extending `parent`
    pub fn define_with_parent(config: ModelConfig, parent: &ModelClass) -> ModelResult<ModelClass> {
        Self::build(config, Some(parent))
    }

    fn build(config: ModelConfig, parent: Option<&ModelClass>) -> ModelResult<ModelClass> {
        let ModelConfig {
            name,
            init,
            statics: config_statics,
            methods: config_methods,
            cache_key,
        } = config;

        let name = name.unwrap_or_else(|| match parent {
            Some(parent) => format!("{}::child", parent.name()),
            None => "Model".to_string(),
        });

        let initializer = match (init, parent) {
            (Some(init), _) => init,
            (None, Some(parent)) => parent.initializer().clone(),
            (None, None) => default_initializer(),
        };

        let mut statics = Members::new();
        let mut prototype = Members::new();
        if let Some(parent) = parent {
            merge(parent.statics(), &mut statics);
            merge(parent.prototype(), &mut prototype);
        }
        merge(&config_statics, &mut statics);
        merge(&config_methods, &mut prototype);

        let cache = match cache_key {
            Some(key) => {
                let fetcher = match config_statics.get("fetch") {
                    Some(StaticMember::Fetch(fetcher)) => fetcher.clone(),
                    Some(_) => {
                        return Err(ModelError::Configuration(format!(
                            "static 'fetch' of model '{}' is not a fetch collaborator",
                            name
                        )))
                    }
                    None => {
                        return Err(ModelError::Configuration(format!(
                            "model '{}' has a cache key but no 'fetch' static",
                            name
                        )))
                    }
                };

                let controller = Arc::new(CacheController::new(key, fetcher));
                if !config_methods.contains("save") {
                    prototype.insert("save", InstanceMember::Save(default_save(controller.clone())));
                }
                Some(controller)
            }
            None => parent.and_then(|parent| parent.inner_cache()),
        };

        debug!(
            "Defined model {} ({} statics, {} instance members, cached: {})",
            name,
            statics.len(),
            prototype.len(),
            cache.is_some()
        );

        Ok(ModelClass::from_inner(ClassInner {
            name,
            initializer,
            statics,
            prototype,
            cache,
            parent: parent.cloned(),
        }))
    }
}

fn default_initializer() -> Initializer {
    Arc::new(|instance: &Instance, record: &Record| -> ModelResult<()> {
        instance.assign(record);
        Ok(())
    })
}
