//! User profile as returned by the login endpoint and kept in the session.

use serde::{Deserialize, Serialize};

use telexpense_core::{ApiResponse, CityId, DepartmentId, DomainError, DomainResult, Entity, UserId};

use crate::Role;

/// City a user or department belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct City {
    pub city_id: CityId,
    pub city_name: String,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Department a user belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub dept_id: DepartmentId,
    pub dept_name: String,
    #[serde(default)]
    pub dept_number: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_invoiced_at: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Authenticated user profile.
///
/// The password is accepted when deserializing (some endpoints echo it back)
/// but is never written out, so it cannot end up in a session record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_logged_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<City>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl User {
    pub fn new(user_id: UserId, user_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            user_name: user_name.into(),
            email: email.into(),
            phone_number: String::new(),
            password: None,
            created_at: None,
            updated_at: None,
            last_logged_at: None,
            role: None,
            city: None,
            department: None,
            is_deleted: false,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn role(&self) -> Option<&Role> {
        self.role.as_ref()
    }

    /// Parse and unwrap the login endpoint response, validating the role.
    pub fn from_login_response(json: &str) -> DomainResult<Self> {
        let response: ApiResponse<User> = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("malformed login response: {e}")))?;
        let user = response.into_data()?;
        if let Some(role) = user.role() {
            role.validate()?;
        }
        Ok(user)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.user_id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

impl Entity for City {
    type Id = CityId;

    fn id(&self) -> CityId {
        self.city_id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

impl Entity for Department {
    type Id = DepartmentId;

    fn id(&self) -> DepartmentId {
        self.dept_id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAYLOAD: &str = r#"{
        "userId": 11,
        "userName": "Dana",
        "email": "dana@example.com",
        "phoneNumber": "555-0100",
        "password": "hunter2",
        "lastLoggedAt": "2024-05-02T08:15:00",
        "role": {
            "roleId": 3,
            "roleName": "Analyst",
            "moduleAccessList": [{"id": 4, "moduleName": "Reports", "accessType": "READ"}]
        },
        "city": {"cityId": 1, "cityName": "Springfield", "isDeleted": false},
        "department": {
            "deptId": 8, "deptName": "Fleet", "deptNumber": "F-08",
            "description": "", "isDeleted": false
        },
        "isDeleted": false
    }"#;

    #[test]
    fn login_payload_parses() {
        let user: User = serde_json::from_str(LOGIN_PAYLOAD).unwrap();
        assert_eq!(user.id(), UserId::new(11));
        assert_eq!(user.role().map(|r| r.role_name.as_str()), Some("Analyst"));
        assert_eq!(user.department.as_ref().map(|d| d.id()), Some(DepartmentId::new(8)));
        assert_eq!(user.password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn role_with_null_grants_still_loads() {
        let json = r#"{"userId": 12, "userName": "Lee", "email": "lee@example.com",
            "role": {"roleId": 9, "roleName": "Pending", "moduleAccessList": null}}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role().map(|r| r.module_access_list.len()), Some(0));
    }

    #[test]
    fn login_response_is_unwrapped_and_checked() {
        let ok = format!(r#"{{"data": {LOGIN_PAYLOAD}, "status": "OK", "statusCode": 200}}"#);
        let user = User::from_login_response(&ok).unwrap();
        assert_eq!(user.id(), UserId::new(11));

        let failed = format!(
            r#"{{"data": {LOGIN_PAYLOAD}, "status": "UNAUTHORIZED", "statusCode": 401}}"#
        );
        assert!(matches!(User::from_login_response(&failed), Err(DomainError::Validation(_))));

        let duplicate = r#"{"data": {"userId": 1, "userName": "x", "email": "x@example.com",
            "role": {"roleId": 1, "roleName": "Dup", "moduleAccessList": [
                {"moduleName": "User", "accessType": "READ"},
                {"moduleName": "user", "accessType": "WRITE"}
            ]}}, "status": "OK", "statusCode": 200}"#;
        assert!(User::from_login_response(duplicate).is_err());
    }

    #[test]
    fn password_is_never_serialized() {
        let user: User = serde_json::from_str(LOGIN_PAYLOAD).unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(!json.contains("password"));

        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(back.password, None);
        assert_eq!(back.email, user.email);
    }
}
