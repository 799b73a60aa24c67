//! Authenticated principal for request-scoped identity.

use serde::{Deserialize, Serialize};

/// Capability-only principal.
///
/// API tokens are bound to a role rather than to a person, so the principal
/// is named after that role and holds exactly that one role. It carries no
/// password or other credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    name: String,
    roles: Vec<String>,
}

impl Principal {
    /// Principal named after `role` and holding only that role.
    pub fn for_role(role: impl Into<String>) -> Self {
        let role = role.into();
        Self {
            name: role.clone(),
            roles: vec![role],
        }
    }

    /// Visual identifier; equal to the role name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
