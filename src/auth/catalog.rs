//! Role catalog: turns a role name into a principal.

use crate::auth::authenticator::AuthError;
use crate::auth::principal::Principal;
use crate::auth::role::RolePolicy;

/// Source of principals for role names.
pub trait RoleCatalog: Send + Sync {
    /// Materialize the principal acting under `role`.
    fn principal_for_role(&self, role: &str) -> Result<Principal, AuthError>;

    /// Re-validate a principal that was loaded earlier.
    fn refresh(&self, principal: &Principal) -> Result<Principal, AuthError>;
}

/// Catalog of pseudo principals; any name the role policy recognizes is accepted.
#[derive(Debug, Clone, Default)]
pub struct PseudoRoleCatalog {
    policy: RolePolicy,
}

impl PseudoRoleCatalog {
    pub fn new(policy: RolePolicy) -> Self {
        Self { policy }
    }
}

impl RoleCatalog for PseudoRoleCatalog {
    fn principal_for_role(&self, role: &str) -> Result<Principal, AuthError> {
        if !self.policy.is_role_name(role) {
            return Err(AuthError::UnsupportedIdentity(format!(
                "Can't load non-role principal '{}'",
                role
            )));
        }
        Ok(Principal::for_role(role))
    }

    fn refresh(&self, principal: &Principal) -> Result<Principal, AuthError> {
        // Pseudo principals can't change, so a loaded one is always fresh.
        if !self.policy.is_role_name(principal.name()) {
            return Err(AuthError::UnsupportedIdentity(format!(
                "Can't refresh non-role principal '{}'",
                principal.name()
            )));
        }
        Ok(principal.clone())
    }
}
