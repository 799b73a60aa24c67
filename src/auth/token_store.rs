//! API token storage.

use anyhow::Result;
use tracing::debug;

use crate::auth::role::Role;
use crate::auth::token::{generate_token, hash_token};
use crate::db::Db;
use crate::db::schema::{ApiTokenCreate, ApiTokenRecord, CountRow};

/// Token store for database operations.
#[derive(Clone)]
pub struct TokenStore {
    db: Db,
}

impl TokenStore {
    /// Create a new token store.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Issue a new token for `role` and return the raw token.
    ///
    /// The raw value is only available here; the store keeps its hash.
    pub async fn create(&self, role: &Role) -> Result<String> {
        let token = generate_token();
        let create = ApiTokenCreate {
            token_hash: hash_token(&token),
            role: role.as_str().to_string(),
        };

        let query = r#"
            CREATE api_token CONTENT {
                token_hash: $token_hash,
                role: $role
            }
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("token_hash", create.token_hash))
            .bind(("role", create.role))
            .await?;

        let created: Vec<ApiTokenRecord> = res.take(0)?;
        let record = created
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Failed to create API token"))?;

        debug!(id = %record.id, role = %record.role, "Stored API token");
        Ok(token)
    }

    /// Look up a token by its raw value.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<ApiTokenRecord>> {
        let query = "SELECT * FROM api_token WHERE token_hash = $token_hash LIMIT 1";

        let mut res = self
            .db
            .query(query)
            .bind(("token_hash", hash_token(token)))
            .await?;

        let tokens: Vec<ApiTokenRecord> = res.take(0)?;
        Ok(tokens.into_iter().next())
    }

    /// Delete a token by its raw value. Returns whether a token was removed.
    pub async fn delete_by_token(&self, token: &str) -> Result<bool> {
        let query = r#"
            DELETE api_token
            WHERE token_hash = $token_hash
            RETURN BEFORE
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("token_hash", hash_token(token)))
            .await?;

        let deleted: Vec<ApiTokenRecord> = res.take(0)?;
        Ok(!deleted.is_empty())
    }

    /// Count tokens, optionally only those of one role.
    pub async fn count(&self, role: Option<&str>) -> Result<usize> {
        let mut res = match role {
            Some(role) => {
                self.db
                    .query("SELECT count() FROM api_token WHERE role = $role GROUP ALL")
                    .bind(("role", role.to_string()))
                    .await?
            }
            None => {
                self.db
                    .query("SELECT count() FROM api_token GROUP ALL")
                    .await?
            }
        };

        let rows: Vec<CountRow> = res.take(0)?;
        Ok(rows.first().map(|row| row.count).unwrap_or(0))
    }

    /// Delete every token of `role`. Returns how many were removed.
    pub async fn delete_all_by_role(&self, role: &str) -> Result<usize> {
        let query = r#"
            DELETE api_token
            WHERE role = $role
            RETURN BEFORE
        "#;

        let mut res = self
            .db
            .query(query)
            .bind(("role", role.to_string()))
            .await?;

        let deleted: Vec<ApiTokenRecord> = res.take(0)?;
        Ok(deleted.len())
    }

    /// Delete every token. Returns how many were removed.
    pub async fn delete_all(&self) -> Result<usize> {
        let mut res = self.db.query("DELETE api_token RETURN BEFORE").await?;

        let deleted: Vec<ApiTokenRecord> = res.take(0)?;
        Ok(deleted.len())
    }

    /// List all tokens, oldest first.
    pub async fn list(&self) -> Result<Vec<ApiTokenRecord>> {
        let mut res = self
            .db
            .query("SELECT * FROM api_token ORDER BY created_at ASC")
            .await?;

        let tokens: Vec<ApiTokenRecord> = res.take(0)?;
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::role::RolePolicy;
    use crate::db::{DatabaseConfig, create_connection, ensure_schema};

    async fn setup_test_db() -> Db {
        let db = create_connection(DatabaseConfig::with_url("memory")).await.unwrap();
        ensure_schema(&db).await.unwrap();
        db
    }

    fn role(name: &str) -> Role {
        RolePolicy::default().validate(name).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_token() {
        let store = TokenStore::new(setup_test_db().await);

        let token = store.create(&role("ROLE_READER")).await.unwrap();
        let record = store.find_by_token(&token).await.unwrap().unwrap();

        assert_eq!(record.role, "ROLE_READER");
        assert_eq!(record.token_hash, hash_token(&token));
        assert_ne!(record.token_hash.as_str(), token);
        assert!(record.created_at.is_some());
    }

    #[tokio::test]
    async fn test_find_unknown_token() {
        let store = TokenStore::new(setup_test_db().await);
        store.create(&role("ROLE_READER")).await.unwrap();

        let record = store.find_by_token("not-a-token").await.unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_token() {
        let store = TokenStore::new(setup_test_db().await);
        let token = store.create(&role("ROLE_READER")).await.unwrap();

        assert!(store.delete_by_token(&token).await.unwrap());
        assert!(store.find_by_token(&token).await.unwrap().is_none());
        assert!(!store.delete_by_token(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_and_purge_by_role() {
        let store = TokenStore::new(setup_test_db().await);
        store.create(&role("ROLE_READER")).await.unwrap();
        store.create(&role("ROLE_READER")).await.unwrap();
        let writer = store.create(&role("ROLE_WRITER")).await.unwrap();

        assert_eq!(store.count(None).await.unwrap(), 3);
        assert_eq!(store.count(Some("ROLE_READER")).await.unwrap(), 2);
        assert_eq!(store.count(Some("ROLE_NOBODY")).await.unwrap(), 0);

        assert_eq!(store.delete_all_by_role("ROLE_READER").await.unwrap(), 2);
        assert_eq!(store.count(None).await.unwrap(), 1);
        assert!(store.find_by_token(&writer).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_all() {
        let store = TokenStore::new(setup_test_db().await);
        assert_eq!(store.count(None).await.unwrap(), 0);

        store.create(&role("ROLE_READER")).await.unwrap();
        store.create(&role("ROLE_WRITER")).await.unwrap();

        assert_eq!(store.delete_all().await.unwrap(), 2);
        assert_eq!(store.count(None).await.unwrap(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_tokens() {
        let store = TokenStore::new(setup_test_db().await);
        store.create(&role("ROLE_READER")).await.unwrap();
        store.create(&role("ROLE_WRITER")).await.unwrap();

        let tokens = store.list().await.unwrap();
        assert_eq!(tokens.len(), 2);
        let mut roles: Vec<&str> = tokens.iter().map(|t| t.role.as_str()).collect();
        roles.sort();
        assert_eq!(roles, vec!["ROLE_READER", "ROLE_WRITER"]);
    }
}
