//! NewType wrappers for strong typing across metadata and token handling.
//!
//! These types keep semantically different strings apart (e.g. passing a
//! serialization group where an operation identifier is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// Display name of an API resource (e.g., "User", "Order").
    ///
    /// Derived groups use the lowercased form of this name as their first
    /// segment.
    ResourceName
);

newtype_string!(
    /// Operation identifier within an item or collection table.
    ///
    /// Usually an HTTP-method-like token ("get", "put", "delete"), but it is
    /// treated as an opaque key and its case is preserved.
    OperationName
);

newtype_string!(
    /// Serialization group attached to an operation (e.g., "user:item:read").
    Group
);

newtype_string!(
    /// SHA-256 hex digest of an API token. Raw tokens are never persisted.
    TokenHash
);

impl TokenHash {
    /// First 16 characters, for listings. Shorter hashes are returned whole.
    pub fn short(&self) -> &str {
        self.0.get(..16).unwrap_or(&self.0)
    }
}
