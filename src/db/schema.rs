use serde::{Deserialize, Serialize};
use surrealdb::{RecordId, sql::Datetime};

use crate::types::TokenHash;

/// Persisted API token. Only the hash of the token is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTokenRecord {
    /// Database identifier
    pub id: RecordId,
    /// SHA-256 hash of the raw token
    pub token_hash: TokenHash,
    /// Role the token authenticates as
    pub role: String,
    /// When the token was issued
    pub created_at: Option<Datetime>,
}

/// Payload for creating a new API token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTokenCreate {
    pub token_hash: TokenHash,
    pub role: String,
}

/// Row shape of `SELECT count() ... GROUP ALL`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CountRow {
    pub count: usize,
}
