//! Member tables - ordered name→member mappings for statics and prototypes
//!
//! Classes carry two tables: static members (called with the class as
//! receiver) and instance members (the prototype, called with an instance
//! as receiver). Both are built by merging a parent's table with the
//! configuration's own entries through [`merge`].

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::class::ModelClass;
use crate::error::ModelResult;
use crate::instance::{Instance, Record};

/// Custom constructor: initializes a fresh instance from the input record
pub type Initializer = Arc<dyn Fn(&Instance, &Record) -> ModelResult<()> + Send + Sync>;

/// Static function, receives the class it was called on
pub type StaticFn = Arc<dyn Fn(&ModelClass, &[Value]) -> ModelResult<Value> + Send + Sync>;

/// Instance method, receives the instance it was called on
pub type MethodFn = Arc<dyn Fn(&Instance, &[Value]) -> ModelResult<Value> + Send + Sync>;

/// Completion callback handed to a fetch collaborator. Fires at most once.
pub type FetchCallback = Box<dyn FnOnce(Instance) + Send>;

/// External lookup used on cache misses and forced refreshes
pub type Fetcher = Arc<dyn Fn(&ModelClass, &Value, FetchCallback) -> ModelResult<()> + Send + Sync>;

/// Completion callback for `save`
pub type SaveCallback = Box<dyn FnOnce(&Instance) + Send>;

/// Implementation of an instance's `save`
pub type SaveFn = Arc<dyn Fn(&Instance, Option<SaveCallback>) -> ModelResult<()> + Send + Sync>;

/// A member exposed on the class itself
#[derive(Clone)]
pub enum StaticMember {
    /// Plain value, returned as-is
    Value(Value),
    /// Callable static
    Function(StaticFn),
    /// The external `fetch` collaborator
    Fetch(Fetcher),
}

impl fmt::Debug for StaticMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticMember::Value(value) => f.debug_tuple("Value").field(value).finish(),
            StaticMember::Function(_) => f.write_str("Function(..)"),
            StaticMember::Fetch(_) => f.write_str("Fetch(..)"),
        }
    }
}

/// A member exposed on every instance through the prototype
#[derive(Clone)]
pub enum InstanceMember {
    /// Plain value shared by all instances
    Value(Value),
    /// Callable method
    Method(MethodFn),
    /// Persist hook invoked by [`Instance::save`]
    Save(SaveFn),
}

impl fmt::Debug for InstanceMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceMember::Value(value) => f.debug_tuple("Value").field(value).finish(),
            InstanceMember::Method(_) => f.write_str("Method(..)"),
            InstanceMember::Save(_) => f.write_str("Save(..)"),
        }
    }
}

/// Ordered mapping of member name to member.
///
/// A name keeps the position of its first insertion; inserting it again
/// replaces the member in place.
#[derive(Debug, Clone)]
pub struct Members<M> {
    entries: Vec<(String, M)>,
}

impl<M> Members<M> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Insert or replace a member, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, member: M) -> Option<M> {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, member)),
            None => {
                self.entries.push((name, member));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&M> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, member)| member)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &M)> {
        self.entries.iter().map(|(name, member)| (name.as_str(), member))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M> Default for Members<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, N: Into<String>> FromIterator<(N, M)> for Members<M> {
    fn from_iter<I: IntoIterator<Item = (N, M)>>(iter: I) -> Self {
        let mut members = Members::new();
        for (name, member) in iter {
            members.insert(name, member);
        }
        members
    }
}

/// Copy every member of `source` onto `destination`.
///
/// Shallow and name keyed: members already present in `destination` are
/// overwritten by the source's version.
pub fn merge<M: Clone>(source: &Members<M>, destination: &mut Members<M>) {
    for (name, member) in source.iter() {
        destination.insert(name, member.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut members = Members::new();
        assert!(members.insert("a", 1).is_none());
        members.insert("b", 2);
        assert_eq!(members.insert("a", 3), Some(1));

        let names: Vec<&str> = members.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(members.get("a"), Some(&3));
        assert_eq!(members.len(), 2);
    }

    #[test]
    fn test_merge_later_copies_win() {
        let parent: Members<Value> = [("kind", json!("animal")), ("legs", json!(4))]
            .into_iter()
            .collect();
        let child: Members<Value> = [("kind", json!("bird")), ("wings", json!(2))]
            .into_iter()
            .collect();

        let mut merged = Members::new();
        merge(&parent, &mut merged);
        merge(&child, &mut merged);

        assert_eq!(merged.get("kind"), Some(&json!("bird")));
        assert_eq!(merged.get("legs"), Some(&json!(4)));
        assert_eq!(merged.get("wings"), Some(&json!(2)));
        // Source tables are untouched
        assert_eq!(parent.get("kind"), Some(&json!("animal")));
    }

    #[test]
    fn test_merge_empty_source_is_noop() {
        let mut destination: Members<Value> = [("id", json!(1))].into_iter().collect();
        merge(&Members::new(), &mut destination);
        assert_eq!(destination.len(), 1);
    }

    fn noop(_: &ModelClass, _: &[Value]) -> ModelResult<Value> {
        Ok(Value::Null)
    }

    #[test]
    fn test_member_debug_hides_callables() {
        let member = StaticMember::Function(Arc::new(noop));
        assert_eq!(format!("{:?}", member), "Function(..)");
        let member = InstanceMember::Value(json!("x"));
        assert_eq!(format!("{:?}", member), "Value(String(\"x\"))");
    }
}
