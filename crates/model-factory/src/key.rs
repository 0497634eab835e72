//! Cache key specification and key coercion

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::instance::Instance;

/// Derives a cache key from an instance
pub type DeriveKeyFn = Arc<dyn Fn(&Instance) -> Value + Send + Sync>;

/// How a class computes the identity-map key of an instance
#[derive(Clone)]
pub enum KeySpec {
    /// Read a direct member of the instance
    Field(String),
    /// Compute the key from the instance
    Derive(DeriveKeyFn),
}

impl KeySpec {
    pub fn field(name: impl Into<String>) -> Self {
        KeySpec::Field(name.into())
    }

    pub fn derive<F>(f: F) -> Self
    where
        F: Fn(&Instance) -> Value + Send + Sync + 'static,
    {
        KeySpec::Derive(Arc::new(f))
    }

    /// Resolve the key of `instance` in its string form
    pub fn resolve(&self, instance: &Instance) -> String {
        let value = match self {
            KeySpec::Field(name) => instance.get(name).unwrap_or_else(|| {
                warn!(
                    "Cache key field '{}' missing on {} instance",
                    name,
                    instance.class().name()
                );
                Value::Null
            }),
            KeySpec::Derive(derive) => derive(instance),
        };
        coerce_key(&value)
    }
}

impl fmt::Debug for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::Field(name) => f.debug_tuple("Field").field(name).finish(),
            KeySpec::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

impl From<&str> for KeySpec {
    fn from(name: &str) -> Self {
        KeySpec::Field(name.to_string())
    }
}

impl From<String> for KeySpec {
    fn from(name: String) -> Self {
        KeySpec::Field(name)
    }
}

/// String form of a lookup key.
///
/// Strings key by their raw text, everything else by its JSON text, so
/// `5` and `"5"` address the same entry.
pub fn coerce_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_key() {
        assert_eq!(coerce_key(&json!(5)), "5");
        assert_eq!(coerce_key(&json!("5")), "5");
        assert_eq!(coerce_key(&json!("user:1")), "user:1");
        assert_eq!(coerce_key(&json!(true)), "true");
        assert_eq!(coerce_key(&Value::Null), "null");
        assert_eq!(coerce_key(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_key_spec_from_str() {
        match KeySpec::from("id") {
            KeySpec::Field(name) => assert_eq!(name, "id"),
            other => panic!("unexpected key spec {:?}", other),
        }
        assert_eq!(format!("{:?}", KeySpec::derive(|_| Value::Null)), "Derive(..)");
    }
}
