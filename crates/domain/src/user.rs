use planora_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::role::RoleGrant;

/// Unique identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    /// Creates a user identifier from the backend's numeric id.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// User record held by the auth session after hydration.
///
/// The authoritative copy lives in the session repository; this in-memory
/// copy is replaced on login and merged on profile updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Name shown in the UI shell.
    pub display_name: String,
    /// Optional HR employee code.
    pub employee_code: Option<String>,
    /// Role grants as delivered by the backend, in backend order.
    pub roles: Vec<RoleGrant>,
}

impl User {
    /// Creates a user record with no employee code and no role grants.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        display_name: impl Into<String>,
    ) -> AppResult<Self> {
        let username = NonEmptyString::new(username)?;
        let display_name = NonEmptyString::new(display_name)?;

        Ok(Self {
            id,
            username: username.into(),
            display_name: display_name.into(),
            employee_code: None,
            roles: Vec::new(),
        })
    }

    /// Shallow-merges the set fields of an update into this record.
    ///
    /// Fields left `None` in the update keep their current value.
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(employee_code) = update.employee_code {
            self.employee_code = Some(employee_code);
        }
        if let Some(roles) = update.roles {
            self.roles = roles;
        }
    }
}

/// Partial user record for profile updates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    /// Replacement display name, when set.
    pub display_name: Option<String>,
    /// Replacement employee code, when set.
    pub employee_code: Option<String>,
    /// Replacement role grants, when set.
    pub roles: Option<Vec<RoleGrant>>,
}

#[cfg(test)]
mod tests {
    use planora_core::AppResult;

    use crate::role::{RoleCode, RoleGrant};

    use super::{User, UserId, UserUpdate};

    #[test]
    fn blank_username_is_rejected() {
        assert!(User::new(UserId::new(1), " ", "Jan Smith").is_err());
    }

    #[test]
    fn update_merges_only_set_fields() -> AppResult<()> {
        let mut user = User::new(UserId::new(1), "jsmith", "Jan Smith")?;
        user.employee_code = Some("EMP-0042".to_owned());

        user.apply(UserUpdate {
            display_name: Some("Jan A. Smith".to_owned()),
            ..UserUpdate::default()
        });

        assert_eq!(user.display_name, "Jan A. Smith");
        assert_eq!(user.username, "jsmith");
        assert_eq!(user.employee_code.as_deref(), Some("EMP-0042"));
        Ok(())
    }

    #[test]
    fn update_replaces_role_grants_wholesale() -> AppResult<()> {
        let mut user = User::new(UserId::new(1), "jsmith", "Jan Smith")?;
        user.roles = vec![RoleGrant::known(RoleCode::Employee, "Employee")];

        user.apply(UserUpdate {
            roles: Some(vec![RoleGrant::known(RoleCode::Manager, "Manager")]),
            ..UserUpdate::default()
        });

        assert_eq!(user.roles.len(), 1);
        assert_eq!(user.roles[0].code, "manager");
        Ok(())
    }
}
