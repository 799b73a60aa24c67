use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("SURREALDB_URL").unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("SURREALDB_NAMESPACE").unwrap_or_else(|_| "apiguard".to_string()),
            database: env::var("SURREALDB_DATABASE").unwrap_or_else(|_| "tokens".to_string()),
            username: env::var("SURREALDB_USERNAME").ok(),
            password: env::var("SURREALDB_PASSWORD").ok(),
        }
    }
}

impl DatabaseConfig {
    /// Default configuration pointed at a specific URL.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Whether the URL points at an in-process engine that is dropped on exit.
    pub fn is_ephemeral(&self) -> bool {
        let url = self.url.trim();
        url == "memory" || url.starts_with("mem://")
    }

    /// Fail for URLs whose data would not outlive the current process.
    pub fn require_persistent(&self) -> Result<()> {
        if self.is_ephemeral() {
            bail!(
                "Database url '{}' is in-memory; tokens would be lost when the process exits. \
                 Pass --db-url or set SURREALDB_URL to a persistent database",
                self.url
            );
        }
        Ok(())
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url.as_str())
        .await
        .with_context(|| format!("Failed to connect to database at {}", config.url))?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = vec![
        // API tokens, stored by hash
        "DEFINE TABLE IF NOT EXISTS api_token SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS token_hash ON TABLE api_token TYPE string;
         DEFINE FIELD IF NOT EXISTS role ON TABLE api_token TYPE string;
         DEFINE FIELD IF NOT EXISTS created_at ON TABLE api_token TYPE datetime DEFAULT time::now();",
        // Lookups by token and purges by role
        "DEFINE INDEX IF NOT EXISTS api_token_hash ON TABLE api_token COLUMNS token_hash UNIQUE;
         DEFINE INDEX IF NOT EXISTS api_token_role ON TABLE api_token COLUMNS role;",
    ];

    for query in schema_queries {
        db.query(query).await?.check()?;
    }

    Ok(())
}
