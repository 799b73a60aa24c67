//! Authentication with role-bound API tokens.
//!
//! API tokens are random opaque strings issued for a role (see
//! [`crate::commands`]). A request presenting `Authorization: Bearer <token>`
//! is resolved through the [`TokenStore`] to that role, and the
//! [`RoleCatalog`] turns the role into a capability-only [`Principal`].
//!
//! ## Security Model
//!
//! - Only the SHA-256 hash of a token is persisted
//! - A principal carries exactly one role and no credentials
//! - Role validation patterns come from configuration, not constants
//!
//! ## Usage
//!
//! ```ignore
//! let authenticator = BearerAuthenticator::new(TokenStore::new(db), PseudoRoleCatalog::default());
//! let principal = authenticator.authenticate_header(headers.get("authorization")).await?;
//! ```

mod authenticator;
mod catalog;
mod principal;
mod role;
mod token;
mod token_store;

pub use authenticator::{AuthError, BEARER_PREFIX, BearerAuthenticator, TokenAuthenticator, supports};
pub use catalog::{PseudoRoleCatalog, RoleCatalog};
pub use principal::Principal;
pub use role::{DEFAULT_ROLE_PATTERN, DEFAULT_ROLE_PREFIX, Role, RolePolicy};
pub use token::{TOKEN_BYTES, TokenError, generate_token, hash_token};
pub use token_store::TokenStore;
