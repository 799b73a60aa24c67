// Core modules
mod config;
mod db;
mod types;

pub mod api;
pub mod auth;
pub mod commands;
pub mod metadata;

// Re-export key types and functions
pub use config::{AppConfig, load_config, resolve_config_path};
pub use db::{ApiTokenRecord, DatabaseConfig, Db, create_connection, ensure_schema};
pub use types::{Group, OperationName, ResourceName, TokenHash};

pub use auth::{BearerAuthenticator, Principal, PseudoRoleCatalog, RolePolicy, TokenStore};
pub use commands::{PurgeOutcome, TokenCommands};
pub use metadata::{GroupDeriver, ResourceDescriptor};

use anyhow::Result;

/// Convenience function to build the HTTP router from configuration.
///
/// This derives the groups of every configured resource, ensures the token
/// schema exists, and wires the bearer authenticator into the API state.
pub async fn create_app(config: &AppConfig, db: Db) -> Result<axum::Router> {
    ensure_schema(&db).await?;

    let resources = config.derived_resources()?;
    let catalog = PseudoRoleCatalog::new(config.role_policy()?);
    let authenticator = BearerAuthenticator::new(TokenStore::new(db), catalog);

    Ok(api::create_router(api::AppState::new(authenticator, resources)))
}
