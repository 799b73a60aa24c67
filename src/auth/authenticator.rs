//! Bearer token authentication.

use std::fmt;
use std::future::Future;

use tracing::debug;

use crate::auth::catalog::RoleCatalog;
use crate::auth::principal::Principal;
use crate::auth::token_store::TokenStore;

/// Scheme prefix of a supported `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Authentication errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No supported credentials were provided
    Unauthenticated,
    /// Bearer token is unknown
    BadCredentials,
    /// Identity exists but cannot be turned into a principal
    UnsupportedIdentity(String),
    /// Database error
    Database(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "Authentication required"),
            Self::BadCredentials => write!(f, "Invalid credentials."),
            Self::UnsupportedIdentity(msg) => write!(f, "{}", msg),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Resolves bearer tokens to principals.
pub trait TokenAuthenticator: Send + Sync {
    fn authenticate(
        &self,
        bearer_token: &str,
    ) -> impl Future<Output = Result<Principal, AuthError>> + Send;
}

/// Whether an `Authorization` header value carries a bearer token.
pub fn supports(authorization: Option<&str>) -> bool {
    authorization.is_some_and(|value| value.starts_with(BEARER_PREFIX))
}

/// Authenticator backed by the token store and a role catalog.
pub struct BearerAuthenticator<C> {
    tokens: TokenStore,
    catalog: C,
}

impl<C: RoleCatalog> BearerAuthenticator<C> {
    pub fn new(tokens: TokenStore, catalog: C) -> Self {
        Self { tokens, catalog }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Authenticate from a raw `Authorization` header value.
    pub async fn authenticate_header(
        &self,
        authorization: Option<&str>,
    ) -> Result<Principal, AuthError> {
        match authorization.and_then(|value| value.strip_prefix(BEARER_PREFIX)) {
            Some(token) => self.authenticate(token).await,
            None => Err(AuthError::Unauthenticated),
        }
    }
}

impl<C: RoleCatalog> TokenAuthenticator for BearerAuthenticator<C> {
    async fn authenticate(&self, bearer_token: &str) -> Result<Principal, AuthError> {
        let record = self
            .tokens
            .find_by_token(bearer_token)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or(AuthError::BadCredentials)?;

        let principal = self.catalog.principal_for_role(&record.role)?;

        debug!(id = %record.id, role = %principal.name(), "Bearer token authenticated");

        Ok(principal)
    }
}
