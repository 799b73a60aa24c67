//! Resource metadata and serialization group derivation.
//!
//! A [`ResourceDescriptor`] is produced by whatever loads the base metadata
//! (see [`crate::config`]) and is then passed through [`GroupDeriver`] before
//! being handed to the serialization layer. Groups are attached at three
//! granularities:
//!
//! - `{element}:{action}`: every operation of a resource, per direction
//! - `{element}:{scope}:{action}`: every operation within one scope
//! - `{element}:{scope}:{operation}`: one exact operation
//!
//! ## Usage
//!
//! ```ignore
//! let descriptor: ResourceDescriptor = serde_json::from_str(raw)?;
//! let descriptor = GroupDeriver::derive(descriptor)?;
//! ```

mod groups;

pub use groups::{
    GroupDeriver, GroupError, default_groups, global_action_group, operation_group,
    scoped_action_group,
};

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{Group, OperationName, ResourceName};

/// Whether an operation acts on a single item or on a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Item,
    Collection,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Collection => "collection",
        }
    }
}

/// Whether groups govern outbound (read) or inbound (write) data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Read, Direction::Write];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Set of serialization groups. Iteration order is sorted and stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSet(BTreeSet<Group>);

impl GroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group. Returns `false` if it was already present.
    pub fn insert(&mut self, group: Group) -> bool {
        self.0.insert(group)
    }

    /// Union the given groups into this set.
    pub fn merge<I>(&mut self, groups: I)
    where
        I: IntoIterator<Item = Group>,
    {
        self.0.extend(groups);
    }

    pub fn contains(&self, group: &str) -> bool {
        self.0.contains(group)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.0.iter()
    }
}

impl<S: Into<Group>> FromIterator<S> for GroupSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Serialization configuration of a single operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationConfig {
    /// Groups applied when reading (normalizing) the resource
    #[serde(default)]
    pub normalization: GroupSet,
    /// Groups applied when writing (denormalizing) the resource
    #[serde(default)]
    pub denormalization: GroupSet,
}

impl OperationConfig {
    pub fn groups(&self, direction: Direction) -> &GroupSet {
        match direction {
            Direction::Read => &self.normalization,
            Direction::Write => &self.denormalization,
        }
    }

    pub fn groups_mut(&mut self, direction: Direction) -> &mut GroupSet {
        match direction {
            Direction::Read => &mut self.normalization,
            Direction::Write => &mut self.denormalization,
        }
    }
}

/// Ordered mapping from operation identifier to its configuration.
///
/// Insertion order is kept so that output is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationTable(IndexMap<OperationName, OperationConfig>);

impl OperationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an operation, returning the builder for chaining.
    pub fn with(mut self, operation: impl Into<OperationName>, config: OperationConfig) -> Self {
        self.0.insert(operation.into(), config);
        self
    }

    pub fn insert(&mut self, operation: impl Into<OperationName>, config: OperationConfig) {
        self.0.insert(operation.into(), config);
    }

    pub fn get(&self, operation: &str) -> Option<&OperationConfig> {
        self.0.get(operation)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OperationName, &OperationConfig)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&OperationName, &mut OperationConfig)> {
        self.0.iter_mut()
    }
}

/// Metadata of one API resource: its display name and its operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    pub name: ResourceName,
    #[serde(default)]
    pub item_operations: OperationTable,
    #[serde(default)]
    pub collection_operations: OperationTable,
}

impl ResourceDescriptor {
    /// Create a descriptor with empty operation tables.
    pub fn new(name: impl Into<ResourceName>) -> Self {
        Self {
            name: name.into(),
            item_operations: OperationTable::new(),
            collection_operations: OperationTable::new(),
        }
    }

    pub fn with_item_operations(mut self, operations: OperationTable) -> Self {
        self.item_operations = operations;
        self
    }

    pub fn with_collection_operations(mut self, operations: OperationTable) -> Self {
        self.collection_operations = operations;
        self
    }

    pub fn operations(&self, scope: Scope) -> &OperationTable {
        match scope {
            Scope::Item => &self.item_operations,
            Scope::Collection => &self.collection_operations,
        }
    }

    pub fn operations_mut(&mut self, scope: Scope) -> &mut OperationTable {
        match scope {
            Scope::Item => &mut self.item_operations,
            Scope::Collection => &mut self.collection_operations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_and_direction_names() {
        assert_eq!(Scope::Item.as_str(), "item");
        assert_eq!(Scope::Collection.as_str(), "collection");
        assert_eq!(Direction::Read.as_str(), "read");
        assert_eq!(Direction::Write.as_str(), "write");
    }

    #[test]
    fn test_group_set_collapses_duplicates() {
        let mut set: GroupSet = ["custom:tag", "user:read"].into_iter().collect();
        set.merge([Group::new("user:read"), Group::new("user:write")]);

        assert_eq!(set.len(), 3);
        let ordered: Vec<&str> = set.iter().map(Group::as_str).collect();
        assert_eq!(ordered, vec!["custom:tag", "user:read", "user:write"]);
    }

    #[test]
    fn test_descriptor_deserialization() {
        let json = r#"{
            "name": "User",
            "itemOperations": {
                "get": {},
                "put": { "denormalization": ["custom:tag"] }
            }
        }"#;

        let descriptor: ResourceDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.name.as_str(), "User");
        assert_eq!(descriptor.item_operations.len(), 2);
        assert!(descriptor.collection_operations.is_empty());

        let put = descriptor.item_operations.get("put").unwrap();
        assert!(put.denormalization.contains("custom:tag"));
        assert!(put.normalization.is_empty());
    }

    #[test]
    fn test_operation_config_serialized_keys() {
        let config = OperationConfig {
            normalization: ["user:read"].into_iter().collect(),
            denormalization: GroupSet::new(),
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "normalization": ["user:read"], "denormalization": [] })
        );
    }

    #[test]
    fn test_operation_table_keeps_insertion_order() {
        let table = OperationTable::new()
            .with("put", OperationConfig::default())
            .with("get", OperationConfig::default())
            .with("delete", OperationConfig::default());

        let names: Vec<&str> = table.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["put", "get", "delete"]);
    }
}
