//! Derivation of serialization groups for resource operations.

use std::fmt;

use tracing::debug;

use super::{Direction, OperationTable, ResourceDescriptor, Scope};
use crate::types::Group;

/// Errors raised when a descriptor violates the deriver's input contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    /// Empty resource name or empty operation identifier
    InvalidArgument(String),
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for GroupError {}

/// Pipeline stage that merges derived groups into resource metadata.
///
/// Holds no state; every call is a pure function of its input.
pub struct GroupDeriver;

impl GroupDeriver {
    /// Augment every operation of `descriptor` with its derived groups.
    ///
    /// Existing groups are kept. Applying this twice yields the same result
    /// as applying it once.
    pub fn derive(mut descriptor: ResourceDescriptor) -> Result<ResourceDescriptor, GroupError> {
        Self::validate(&descriptor)?;

        let element = descriptor.name.as_str().to_ascii_lowercase();

        for scope in [Scope::Item, Scope::Collection] {
            Self::update_operations(descriptor.operations_mut(scope), &element, scope);
        }

        debug!(
            resource = %descriptor.name,
            item_operations = descriptor.item_operations.len(),
            collection_operations = descriptor.collection_operations.len(),
            "Derived serialization groups"
        );

        Ok(descriptor)
    }

    /// Derive groups for a batch of descriptors, stopping at the first invalid one.
    pub fn derive_all<I>(descriptors: I) -> Result<Vec<ResourceDescriptor>, GroupError>
    where
        I: IntoIterator<Item = ResourceDescriptor>,
    {
        descriptors.into_iter().map(Self::derive).collect()
    }

    fn validate(descriptor: &ResourceDescriptor) -> Result<(), GroupError> {
        if descriptor.name.as_str().is_empty() {
            return Err(GroupError::InvalidArgument(
                "resource name must not be empty".to_string(),
            ));
        }

        for scope in [Scope::Item, Scope::Collection] {
            if descriptor
                .operations(scope)
                .iter()
                .any(|(operation, _)| operation.as_str().is_empty())
            {
                return Err(GroupError::InvalidArgument(format!(
                    "{} operation of resource '{}' has an empty identifier",
                    scope.as_str(),
                    descriptor.name
                )));
            }
        }

        Ok(())
    }

    fn update_operations(operations: &mut OperationTable, element: &str, scope: Scope) {
        for (operation, config) in operations.iter_mut() {
            for direction in Direction::ALL {
                config
                    .groups_mut(direction)
                    .merge(default_groups(element, scope, direction, operation.as_str()));
            }
        }
    }
}

/// All groups for one operation in one direction.
pub fn default_groups(element: &str, scope: Scope, direction: Direction, operation: &str) -> [Group; 3] {
    [
        global_action_group(element, direction),
        scoped_action_group(element, scope, direction),
        operation_group(element, scope, operation),
    ]
}

/// `{element}:{action}`, e.g. `user:read`.
pub fn global_action_group(element: &str, direction: Direction) -> Group {
    Group::new(format!("{}:{}", element, direction.as_str()))
}

/// `{element}:{scope}:{action}`, e.g. `user:collection:read`.
pub fn scoped_action_group(element: &str, scope: Scope, direction: Direction) -> Group {
    Group::new(format!("{}:{}:{}", element, scope.as_str(), direction.as_str()))
}

/// `{element}:{scope}:{operation}`, e.g. `user:collection:get`.
pub fn operation_group(element: &str, scope: Scope, operation: &str) -> Group {
    Group::new(format!("{}:{}:{}", element, scope.as_str(), operation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{GroupSet, OperationConfig};

    fn groups(values: &[&str]) -> GroupSet {
        values.iter().copied().collect()
    }

    fn user_descriptor() -> ResourceDescriptor {
        ResourceDescriptor::new("User")
            .with_item_operations(
                OperationTable::new()
                    .with("get", OperationConfig::default())
                    .with(
                        "put",
                        OperationConfig {
                            denormalization: groups(&["custom:tag"]),
                            ..Default::default()
                        },
                    ),
            )
            .with_collection_operations(OperationTable::new().with("get", OperationConfig::default()))
    }

    #[test]
    fn test_group_builders() {
        assert_eq!(global_action_group("user", Direction::Read).as_str(), "user:read");
        assert_eq!(
            scoped_action_group("user", Scope::Collection, Direction::Write).as_str(),
            "user:collection:write"
        );
        assert_eq!(
            operation_group("user", Scope::Item, "get").as_str(),
            "user:item:get"
        );
    }

    #[test]
    fn test_read_groups_per_scope() {
        let derived = GroupDeriver::derive(user_descriptor()).unwrap();

        let item_get = derived.item_operations.get("get").unwrap();
        assert_eq!(
            item_get.normalization,
            groups(&["user:read", "user:item:read", "user:item:get"])
        );

        let collection_get = derived.collection_operations.get("get").unwrap();
        assert_eq!(
            collection_get.normalization,
            groups(&["user:read", "user:collection:read", "user:collection:get"])
        );
    }

    #[test]
    fn test_write_groups_keep_existing_entries() {
        let derived = GroupDeriver::derive(user_descriptor()).unwrap();

        let item_put = derived.item_operations.get("put").unwrap();
        assert_eq!(
            item_put.denormalization,
            groups(&["custom:tag", "user:write", "user:item:write", "user:item:put"])
        );
    }

    #[test]
    fn test_directions_do_not_leak() {
        let derived = GroupDeriver::derive(user_descriptor()).unwrap();

        for (_, config) in derived.item_operations.iter() {
            assert!(config.normalization.iter().all(|g| !g.as_str().ends_with(":write")));
            assert!(config.denormalization.iter().all(|g| !g.as_str().ends_with(":read")));
        }
    }

    #[test]
    fn test_scopes_do_not_leak() {
        let derived = GroupDeriver::derive(user_descriptor()).unwrap();

        let collection_get = derived.collection_operations.get("get").unwrap();
        assert!(collection_get.normalization.iter().all(|g| !g.as_str().contains(":item:")));
        assert!(collection_get.denormalization.iter().all(|g| !g.as_str().contains(":item:")));
    }

    #[test]
    fn test_derive_is_idempotent() {
        let once = GroupDeriver::derive(user_descriptor()).unwrap();
        let twice = GroupDeriver::derive(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_collection_table_is_untouched() {
        let descriptor = ResourceDescriptor::new("Order")
            .with_item_operations(OperationTable::new().with("get", OperationConfig::default()));

        let derived = GroupDeriver::derive(descriptor).unwrap();

        assert!(derived.collection_operations.is_empty());
        let item_get = derived.item_operations.get("get").unwrap();
        assert_eq!(
            item_get.normalization,
            groups(&["order:read", "order:item:read", "order:item:get"])
        );
        assert_eq!(
            item_get.denormalization,
            groups(&["order:write", "order:item:write", "order:item:get"])
        );
    }

    #[test]
    fn test_operation_case_is_preserved() {
        let descriptor = ResourceDescriptor::new("BlogPost")
            .with_item_operations(OperationTable::new().with("GET", OperationConfig::default()));

        let derived = GroupDeriver::derive(descriptor).unwrap();
        let item_get = derived.item_operations.get("GET").unwrap();
        assert!(item_get.normalization.contains("blogpost:item:GET"));
        assert!(item_get.normalization.contains("blogpost:read"));
    }

    #[test]
    fn test_non_ascii_name_is_only_ascii_lowercased() {
        let descriptor = ResourceDescriptor::new("ÄpfelKorb")
            .with_item_operations(OperationTable::new().with("get", OperationConfig::default()));

        let derived = GroupDeriver::derive(descriptor).unwrap();
        let item_get = derived.item_operations.get("get").unwrap();
        assert!(item_get.normalization.contains("Äpfelkorb:read"));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let descriptor = ResourceDescriptor::new("")
            .with_item_operations(OperationTable::new().with("get", OperationConfig::default()));

        let result = GroupDeriver::derive(descriptor);
        assert!(matches!(result, Err(GroupError::InvalidArgument(_))));
    }

    #[test]
    fn test_empty_operation_is_rejected() {
        let descriptor = ResourceDescriptor::new("User")
            .with_collection_operations(OperationTable::new().with("", OperationConfig::default()));

        let err = GroupDeriver::derive(descriptor).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument: collection operation of resource 'User' has an empty identifier"
        );
    }

    #[test]
    fn test_derive_all_processes_each_resource() {
        let derived = GroupDeriver::derive_all(vec![
            user_descriptor(),
            ResourceDescriptor::new("Order"),
        ])
        .unwrap();

        assert_eq!(derived.len(), 2);
        assert!(
            derived[0]
                .item_operations
                .get("get")
                .unwrap()
                .normalization
                .contains("user:item:get")
        );
        assert!(derived[1].item_operations.is_empty());
    }
}
