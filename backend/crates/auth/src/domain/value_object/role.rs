//! Role Value Object
//!
//! Ordered privilege level used by the access-control gate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use kernel::error::app_error::AppError;

/// Privilege level, totally ordered `User < Admin < SuperAdmin`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
    #[serde(alias = "super-admin")]
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Admin, Role::SuperAdmin];

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Whether this role meets a route's minimum
    #[inline]
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
    }

    #[inline]
    pub const fn is_admin_or_higher(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    #[inline]
    pub const fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Parse a stored or wire code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "super_admin" | "super-admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_code(s.trim())
            .ok_or_else(|| AppError::bad_request(format!("Unknown account type: {}", s)))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_order() {
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::SuperAdmin);
        assert_eq!(Role::ALL.iter().max(), Some(&Role::SuperAdmin));
    }

    #[test]
    fn test_role_satisfies_admin_route() {
        assert!(!Role::User.satisfies(Role::Admin));
        assert!(Role::Admin.satisfies(Role::Admin));
        assert!(Role::SuperAdmin.satisfies(Role::Admin));
    }

    #[test]
    fn test_role_from_code() {
        assert_eq!(Role::from_code("user"), Some(Role::User));
        assert_eq!(Role::from_code("admin"), Some(Role::Admin));
        assert_eq!(Role::from_code("super_admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::from_code("super-admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::from_code("root"), None);
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::SuperAdmin).unwrap(), "\"super_admin\"");
        let role: Role = serde_json::from_str("\"super-admin\"").unwrap();
        assert_eq!(role, Role::SuperAdmin);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::SuperAdmin.to_string(), "super_admin");
    }
}
