//! Role names and the policy that validates them.

use std::fmt;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::token::TokenError;

/// Default pattern a role must match to have tokens issued for it.
pub const DEFAULT_ROLE_PATTERN: &str = "^ROLE_[A-Z0-9_]+$";

/// Default prefix identifying a name as a role.
pub const DEFAULT_ROLE_PREFIX: &str = "ROLE_";

/// A role name that passed the configured [`RolePolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation rules for role names.
#[derive(Debug, Clone)]
pub struct RolePolicy {
    pattern: Regex,
    prefix: String,
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_ROLE_PATTERN).expect("default role pattern is valid"),
            prefix: DEFAULT_ROLE_PREFIX.to_string(),
        }
    }
}

impl RolePolicy {
    /// Build a policy from a regular expression and a role prefix.
    pub fn new(pattern: &str, prefix: impl Into<String>) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid role pattern: {}", pattern))?;

        Ok(Self {
            pattern,
            prefix: prefix.into(),
        })
    }

    /// The configured pattern, as written.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check a role name against the pattern.
    pub fn validate(&self, role: &str) -> Result<Role, TokenError> {
        if !self.pattern.is_match(role) {
            return Err(TokenError::InvalidInput(format!(
                "'{}' is not a valid role. Required pattern: {}",
                role,
                self.pattern.as_str()
            )));
        }
        Ok(Role(role.to_string()))
    }

    /// Whether `name` identifies a role: it carries the prefix or matches
    /// the pattern. Every name `validate` accepts is a role name.
    pub fn is_role_name(&self, name: &str) -> bool {
        name.starts_with(&self.prefix) || self.pattern.is_match(name)
    }
}
