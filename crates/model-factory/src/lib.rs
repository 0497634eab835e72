//! # model-factory
//!
//! Declarative model classes for elif.rs: build a class from a
//! [`ModelConfig`], construct instances from plain records, extend classes
//! by composition and keep an in-memory identity map keyed by a
//! configurable field.
//!
//! ## Features
//!
//! - **Static and instance members**: merged parent-first, configuration wins
//! - **Extension**: child instances own a parent instance built from the same record
//! - **Identity map**: read-through `fetch` backed by a caller-supplied collaborator
//! - **Force refresh**: bypass the map and always ask the collaborator
//!
//! ## Quick Start
//!
//! ```rust
//! use model_factory::{ModelConfig, ModelFactory, Record};
//! use serde_json::json;
//!
//! let cached = ModelFactory::define(
//!     ModelConfig::named("Cached")
//!         .cache_key("id")
//!         .fetch(|class, key, callback| {
//!             let mut record = Record::new();
//!             record.insert("id".to_string(), key.clone());
//!             record.insert("loaded".to_string(), json!(true));
//!             callback(class.instantiate(record)?);
//!             Ok(())
//!         }),
//! )
//! .unwrap();
//!
//! // Miss: the collaborator builds the instance, `save` caches it
//! cached
//!     .fetch_with(5, |instance| instance.save(None).unwrap())
//!     .unwrap();
//!
//! // Hit: served from the identity map
//! let instance = cached.lookup(5).unwrap().unwrap();
//! assert_eq!(instance.get("loaded"), Some(json!(true)));
//! ```

pub mod cache;
pub mod class;
pub mod config;
pub mod error;
pub mod factory;
pub mod instance;
pub mod key;
pub mod members;

pub use cache::*;
pub use class::*;
pub use config::*;
pub use error::*;
pub use factory::*;
pub use instance::*;
pub use key::*;
pub use members::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
