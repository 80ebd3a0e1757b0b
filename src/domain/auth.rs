use serde::{Deserialize, Serialize};

/// Role that implies every other role.
pub const ADMIN_ROLE: &str = "admin";

/// Claims carried by the token the auth service issues.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Subject, the user's id at the auth service.
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    /// Expiration as a UTC Unix timestamp.
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        check_role(role, &self.roles)
    }
}

/// Returns `true` when `roles` grants `role`.
pub fn check_role(role: &str, roles: &[String]) -> bool {
    roles.iter().any(|r| r == role || r == ADMIN_ROLE)
}
