//! Wire types exchanged with the TypeScript front-end.

use planora_application::AuthState;
use planora_core::AppError;
use planora_domain::{RoleGrant, User, UserId, UserUpdate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Role grant as delivered inside an identity payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoleGrantPayload {
    pub code: String,
    pub name: String,
}

impl From<RoleGrantPayload> for RoleGrant {
    fn from(value: RoleGrantPayload) -> Self {
        Self {
            code: value.code,
            name: value.name,
        }
    }
}

/// User record as delivered by the identity provider on login.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub employee_code: Option<String>,
    #[serde(default)]
    pub roles: Vec<RoleGrantPayload>,
}

impl TryFrom<UserPayload> for User {
    type Error = AppError;

    fn try_from(value: UserPayload) -> Result<Self, Self::Error> {
        let mut user = User::new(UserId::new(value.id), value.username, value.display_name)?;
        user.employee_code = value.employee_code;
        user.roles = value.roles.into_iter().map(RoleGrant::from).collect();
        Ok(user)
    }
}

/// Login request: the upstream identity response handed to the gateway.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: UserPayload,
}

/// Profile update request; unset fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub employee_code: Option<String>,
    pub roles: Option<Vec<RoleGrantPayload>>,
}

impl From<UpdateProfileRequest> for UserUpdate {
    fn from(value: UpdateProfileRequest) -> Self {
        Self {
            display_name: value.display_name,
            employee_code: value.employee_code,
            roles: value
                .roles
                .map(|roles| roles.into_iter().map(RoleGrant::from).collect()),
        }
    }
}

/// User record as reported back to the front-end.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub employee_code: Option<String>,
}

/// Session snapshot reported by `/auth/me` and the auth mutations.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub is_authenticated: bool,
    pub user: Option<UserResponse>,
    pub roles: Vec<String>,
    pub generation: u64,
}

impl SessionResponse {
    /// Projects a state snapshot into the wire shape.
    #[must_use]
    pub fn from_state(state: &AuthState) -> Self {
        Self {
            is_authenticated: state.is_authenticated(),
            user: state.user().map(|user| UserResponse {
                id: user.id.value(),
                username: user.username.clone(),
                display_name: user.display_name.clone(),
                employee_code: user.employee_code.clone(),
            }),
            roles: state
                .roles()
                .iter()
                .map(|role| role.as_str().to_owned())
                .collect(),
            generation: state.generation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use planora_core::{AppError, AppResult};
    use planora_domain::{RoleCode, User};

    use super::{LoginRequest, UserPayload};

    #[test]
    fn login_request_deserializes_camel_case_payload() -> AppResult<()> {
        let raw = r#"{
            "accessToken": "hdr.payload.sig",
            "user": {
                "id": 42,
                "username": "jsmith",
                "displayName": "Jan Smith",
                "employeeCode": "EMP-0042",
                "roles": [{"code": "employee", "name": "Employee"}]
            }
        }"#;

        let request: LoginRequest = serde_json::from_str(raw)
            .map_err(|error| AppError::Validation(error.to_string()))?;
        assert_eq!(request.access_token, "hdr.payload.sig");
        assert_eq!(request.refresh_token, None);

        let user = User::try_from(request.user)?;
        assert_eq!(user.id.value(), 42);
        assert!(planora_domain::has_role(Some(&user), RoleCode::Employee));
        Ok(())
    }

    #[test]
    fn blank_display_name_is_rejected_at_conversion() {
        let payload = UserPayload {
            id: 1,
            username: "jsmith".to_owned(),
            display_name: "  ".to_owned(),
            employee_code: None,
            roles: Vec::new(),
        };

        assert!(User::try_from(payload).is_err());
    }
}
