//! API token generation and hashing.

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::types::TokenHash;

/// Number of random bytes behind each token (252 base64 characters).
pub const TOKEN_BYTES: usize = 189;

/// Errors raised by token management operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Token or role does not exist
    NotFound(String),
    /// Malformed role or other caller input
    InvalidInput(String),
    /// Underlying store failed
    Store(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Store(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

/// Generate a new random API token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

/// Hash a token for storage and lookup (don't store raw tokens).
pub fn hash_token(token: &str) -> TokenHash {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    TokenHash::new(format!("{:x}", result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 252);
        assert!(STANDARD.decode(&token).is_ok());
        assert_eq!(STANDARD.decode(&token).unwrap().len(), TOKEN_BYTES);
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_hash_token() {
        let hash1 = hash_token("secret123");
        let hash2 = hash_token("secret123");
        let hash3 = hash_token("different");

        assert_eq!(hash1.as_str().len(), 64);
        assert!(hash1.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
    }

    #[test]
    fn test_token_error_display() {
        assert_eq!(
            TokenError::NotFound("token".to_string()).to_string(),
            "Not found: token"
        );
        assert_eq!(
            TokenError::Store("connection lost".to_string()).to_string(),
            "Store error: connection lost"
        );
    }
}
