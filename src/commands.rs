//! Token management commands.
//!
//! The command logic lives here so the CLI only has to print outcomes and
//! choose an exit code.

use tracing::{info, warn};

use crate::auth::{Role, RolePolicy, TokenError, TokenStore};
use crate::db::ApiTokenRecord;

/// A freshly issued token. The raw value cannot be recovered later.
#[derive(Debug, Clone)]
pub struct GeneratedToken {
    pub token: String,
    pub role: Role,
}

/// Result of a purge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Nothing matched
    Empty { role: Option<String> },
    /// Tokens matched but `force` was not set
    DryRun { role: Option<String>, affected: usize },
    /// Tokens were deleted
    Removed { role: Option<String>, affected: usize },
}

impl PurgeOutcome {
    /// Whether the command should exit successfully.
    ///
    /// Purging everything from an empty store counts as a failure, while a
    /// role without tokens is already in the requested state.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Empty { role } => role.is_some(),
            Self::DryRun { .. } => false,
            Self::Removed { .. } => true,
        }
    }

    /// Human-readable report lines.
    pub fn report(&self) -> Vec<String> {
        match self {
            Self::Empty { role: None } => vec!["There are no tokens.".to_string()],
            Self::Empty { role: Some(role) } => {
                vec![format!("There are no tokens for role {}.", role)]
            }
            Self::DryRun { role: None, affected } => vec![
                format!("Would remove all ({}) API tokens.", affected),
                "Please run the operation with --force to execute".to_string(),
                "All tokens will be permanently lost!".to_string(),
            ],
            Self::DryRun {
                role: Some(role),
                affected,
            } => vec![
                format!("Would remove all ({}) API tokens for role {}.", affected, role),
                "Please run the operation with --force to execute".to_string(),
                "All matching tokens will be permanently lost!".to_string(),
            ],
            Self::Removed { role: None, affected } => {
                vec![format!("Removed all ({}) API tokens.", affected)]
            }
            Self::Removed {
                role: Some(role),
                affected,
            } => vec![format!(
                "Removed all ({}) API tokens for role {}.",
                affected, role
            )],
        }
    }
}

/// Token commands bound to a store and a role policy.
pub struct TokenCommands {
    store: TokenStore,
    policy: RolePolicy,
}

impl TokenCommands {
    pub fn new(store: TokenStore, policy: RolePolicy) -> Self {
        Self { store, policy }
    }

    /// Issue a token for `role` after checking it against the policy.
    pub async fn generate(&self, role: &str) -> Result<GeneratedToken, TokenError> {
        let role = self.policy.validate(role)?;

        let token = self
            .store
            .create(&role)
            .await
            .map_err(|e| TokenError::Store(e.to_string()))?;

        info!(role = %role, "Generated API token");
        Ok(GeneratedToken { token, role })
    }

    /// Invalidate a single token.
    pub async fn invalidate(&self, token: &str) -> Result<(), TokenError> {
        let removed = self
            .store
            .delete_by_token(token)
            .await
            .map_err(|e| TokenError::Store(e.to_string()))?;

        if !removed {
            return Err(TokenError::NotFound(
                "Cannot invalidate a token that does not exist".to_string(),
            ));
        }

        info!("Invalidated API token");
        Ok(())
    }

    /// Purge all tokens, or all tokens of one role.
    ///
    /// Without `force` nothing is deleted and the outcome reports what would be.
    pub async fn purge(&self, role: Option<&str>, force: bool) -> Result<PurgeOutcome, TokenError> {
        let affected = self
            .store
            .count(role)
            .await
            .map_err(|e| TokenError::Store(e.to_string()))?;

        let role_name = role.map(str::to_string);

        if affected == 0 {
            return Ok(PurgeOutcome::Empty { role: role_name });
        }

        if !force {
            return Ok(PurgeOutcome::DryRun {
                role: role_name,
                affected,
            });
        }

        let removed = match role {
            Some(role) => self.store.delete_all_by_role(role).await,
            None => self.store.delete_all().await,
        }
        .map_err(|e| TokenError::Store(e.to_string()))?;

        if removed != affected {
            warn!(
                expected = affected,
                removed, "Token count changed while purging"
            );
        }
        info!(role = ?role_name, removed, "Purged API tokens");

        Ok(PurgeOutcome::Removed {
            role: role_name,
            affected: removed,
        })
    }

    /// All stored tokens, oldest first.
    pub async fn list(&self) -> Result<Vec<ApiTokenRecord>, TokenError> {
        self.store
            .list()
            .await
            .map_err(|e| TokenError::Store(e.to_string()))
    }
}
