use std::collections::BTreeSet;
use std::str::FromStr;

use planora_core::AppError;
use serde::{Deserialize, Serialize};

use crate::user::User;

/// Role codes enforced by the access gate.
///
/// The set is closed: a user record arriving from the backend may carry role
/// codes outside this enumeration, and those grant no capability (see
/// [`resolve_roles`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCode {
    /// Manages people and approves project allocations.
    Manager,
    /// Maintains shared content and announcement pages.
    ContentAdmin,
    /// Baseline role every staff account holds.
    Employee,
    /// Accesses payroll and bookkeeping views.
    Accountant,
    /// Leads a department and reviews its reports.
    DepartmentHead,
}

impl RoleCode {
    /// Returns a stable storage value for this role code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::ContentAdmin => "content_admin",
            Self::Employee => "employee",
            Self::Accountant => "accountant",
            Self::DepartmentHead => "department_head",
        }
    }

    /// Returns all known role codes.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[RoleCode] = &[
            RoleCode::Manager,
            RoleCode::ContentAdmin,
            RoleCode::Employee,
            RoleCode::Accountant,
            RoleCode::DepartmentHead,
        ];

        ALL
    }
}

impl FromStr for RoleCode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "manager" => Ok(Self::Manager),
            "content_admin" => Ok(Self::ContentAdmin),
            "employee" => Ok(Self::Employee),
            "accountant" => Ok(Self::Accountant),
            "department_head" => Ok(Self::DepartmentHead),
            _ => Err(AppError::Validation(format!("unknown role code '{value}'"))),
        }
    }
}

/// Value-copy of role reference data carried on a user record.
///
/// Holds the raw backend code rather than a [`RoleCode`] so that records with
/// roles this build does not know about still deserialize; stale copies
/// between syncs are acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Raw machine code as delivered by the backend.
    pub code: String,
    /// Human-readable label.
    pub name: String,
}

impl RoleGrant {
    /// Creates a grant from a known role code and its label.
    #[must_use]
    pub fn known(code: RoleCode, name: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_owned(),
            name: name.into(),
        }
    }
}

/// Projects a user's role grants onto the closed [`RoleCode`] set.
///
/// Unrecognized codes are dropped: an unknown role from the backend never
/// crashes the client, it simply grants no extra capability.
#[must_use]
pub fn resolve_roles(user: Option<&User>) -> BTreeSet<RoleCode> {
    user.map(|user| {
        user.roles
            .iter()
            .filter_map(|grant| grant.code.parse::<RoleCode>().ok())
            .collect()
    })
    .unwrap_or_default()
}

/// Returns whether the user holds the given role.
#[must_use]
pub fn has_role(user: Option<&User>, role: RoleCode) -> bool {
    resolve_roles(user).contains(&role)
}

/// Returns whether the user holds at least one of the given roles.
///
/// An empty requirement list means no role is required and is always
/// satisfied.
#[must_use]
pub fn has_any_role(user: Option<&User>, roles: &[RoleCode]) -> bool {
    if roles.is_empty() {
        return true;
    }

    let resolved = resolve_roles(user);
    roles.iter().any(|role| resolved.contains(role))
}

/// Returns whether the user holds every one of the given roles.
///
/// Vacuously true for an empty requirement list.
#[must_use]
pub fn has_all_roles(user: Option<&User>, roles: &[RoleCode]) -> bool {
    let resolved = resolve_roles(user);
    roles.iter().all(|role| resolved.contains(role))
}
