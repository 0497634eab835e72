//! Model instances
//!
//! An instance keeps the raw input record under `attributes` and re-exposes
//! each field as a direct member. Instances of extended classes also own a
//! `parent` instance built by the parent class from the same record.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::class::ModelClass;
use crate::error::{ModelError, ModelResult};
use crate::members::{InstanceMember, SaveCallback};

/// Plain record of field values
pub type Record = HashMap<String, Value>;

struct InstanceInner {
    class: ModelClass,
    attributes: RwLock<Record>,
    fields: RwLock<Record>,
    parent: Option<Instance>,
}

/// Shared handle to a model instance.
///
/// Clones refer to the same instance; equality is identity.
#[derive(Clone)]
pub struct Instance {
    inner: Arc<InstanceInner>,
}

impl Instance {
    fn empty(class: ModelClass, parent: Option<Instance>) -> Self {
        Self {
            inner: Arc::new(InstanceInner {
                class,
                attributes: RwLock::new(Record::new()),
                fields: RwLock::new(Record::new()),
                parent,
            }),
        }
    }

    /// The class this instance was constructed by
    pub fn class(&self) -> &ModelClass {
        &self.inner.class
    }

    /// Instance of the parent class built from the same record
    pub fn parent(&self) -> Option<&Instance> {
        self.inner.parent.as_ref()
    }

    /// Read a direct member
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.fields.read().get(name).cloned()
    }

    /// Write a direct member
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.inner.fields.write().insert(name.into(), value.into());
    }

    /// Read a field of the nested attributes record
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.inner.attributes.read().get(name).cloned()
    }

    /// Snapshot of the nested attributes record
    pub fn attributes(&self) -> Record {
        self.inner.attributes.read().clone()
    }

    /// Snapshot of all direct members
    pub fn fields(&self) -> Record {
        self.inner.fields.read().clone()
    }

    /// Default construction behaviour: keep `record` as the attributes
    /// record and copy each field onto the instance as a direct member.
    pub fn assign(&self, record: &Record) {
        *self.inner.attributes.write() = record.clone();
        let mut fields = self.inner.fields.write();
        for (name, value) in record {
            fields.insert(name.clone(), value.clone());
        }
    }

    /// Whether `name` resolves to a direct member or a prototype member
    pub fn has_member(&self, name: &str) -> bool {
        self.inner.fields.read().contains_key(name) || self.class().prototype().contains(name)
    }

    /// Invoke a prototype member.
    ///
    /// Methods are called with `args`, plain values are returned cloned and a
    /// `save` member is run without a callback.
    pub fn call(&self, name: &str, args: &[Value]) -> ModelResult<Value> {
        match self.class().prototype().get(name) {
            Some(InstanceMember::Method(method)) => method(self, args),
            Some(InstanceMember::Value(value)) => Ok(value.clone()),
            Some(InstanceMember::Save(save)) => save(self, None).map(|_| Value::Null),
            None => Err(ModelError::unknown_member(self.class().name(), name)),
        }
    }

    /// Run the prototype's `save`
    pub fn save(&self, callback: Option<SaveCallback>) -> ModelResult<()> {
        match self.class().prototype().get("save") {
            Some(InstanceMember::Save(save)) => save(self, callback),
            Some(InstanceMember::Method(method)) => {
                method(self, &[])?;
                if let Some(callback) = callback {
                    callback(self);
                }
                Ok(())
            }
            Some(InstanceMember::Value(_)) => {
                Err(ModelError::not_callable(self.class().name(), "save"))
            }
            None => Err(ModelError::unknown_member(self.class().name(), "save")),
        }
    }

    /// Whether both handles refer to the same instance
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class().name())
            .field("attributes", &*self.inner.attributes.read())
            .field("fields", &*self.inner.fields.read())
            .field("parent", &self.inner.parent)
            .finish()
    }
}

/// Build an instance of `class` from `record`.
///
/// The parent instance (if any) is fully constructed first, then the class's
/// effective initializer runs on the new instance.
pub(crate) fn instantiate(class: &ModelClass, record: &Record) -> ModelResult<Instance> {
    let parent = match class.parent() {
        Some(parent_class) => Some(parent_class.instantiate(record.clone())?),
        None => None,
    };
    let instance = Instance::empty(class.clone(), parent);
    (class.initializer())(&instance, record)?;
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::factory::ModelFactory;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_default_initializer_copies_fields() {
        let animal = ModelFactory::define(ModelConfig::named("Animal")).unwrap();
        let rex = animal
            .instantiate(record(&[("name", json!("Rex")), ("age", json!(3))]))
            .unwrap();

        assert_eq!(rex.get("name"), Some(json!("Rex")));
        assert_eq!(rex.attribute("age"), Some(json!(3)));
        assert_eq!(rex.attributes().len(), 2);
        assert!(rex.parent().is_none());
    }

    #[test]
    fn test_set_does_not_touch_attributes() {
        let animal = ModelFactory::define(ModelConfig::new()).unwrap();
        let rex = animal.instantiate(record(&[("name", json!("Rex"))])).unwrap();

        rex.set("name", "Max");
        assert_eq!(rex.get("name"), Some(json!("Max")));
        assert_eq!(rex.attribute("name"), Some(json!("Rex")));
    }

    #[test]
    fn test_identity_equality() {
        let animal = ModelFactory::define(ModelConfig::new()).unwrap();
        let a = animal.instantiate(Record::new()).unwrap();
        let b = animal.instantiate(Record::new()).unwrap();

        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_call_unknown_member() {
        let animal = ModelFactory::define(ModelConfig::named("Animal")).unwrap();
        let rex = animal.instantiate(Record::new()).unwrap();

        let err = rex.call("speak", &[]).unwrap_err();
        assert_eq!(err, ModelError::unknown_member("Animal", "speak"));
        assert!(!rex.has_member("speak"));
    }

    #[test]
    fn test_save_without_cache_is_unknown() {
        let animal = ModelFactory::define(ModelConfig::named("Animal")).unwrap();
        let rex = animal.instantiate(Record::new()).unwrap();
        assert!(matches!(
            rex.save(None),
            Err(ModelError::UnknownMember { .. })
        ));
    }

    #[test]
    fn test_custom_save_method_runs_callback() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let saved = Arc::new(AtomicBool::new(false));
        let saved_clone = saved.clone();
        let note = ModelFactory::define(ModelConfig::new().method("save", move |_, _| {
            saved_clone.store(true, Ordering::SeqCst);
            Ok(Value::Null)
        }))
        .unwrap();

        let instance = note.instantiate(Record::new()).unwrap();
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();
        instance
            .save(Some(Box::new(move |_: &Instance| called_clone.store(true, Ordering::SeqCst))))
            .unwrap();

        assert!(saved.load(Ordering::SeqCst));
        assert!(called.load(Ordering::SeqCst));
    }
}
