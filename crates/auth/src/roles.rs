use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use telexpense_core::{ApiResponse, DomainError, DomainResult, Entity, RoleId};

use crate::{AccessLevel, ModuleAccess, ModuleKey};

/// Role as returned by the role endpoints.
///
/// The module mapping is kept as the backend's ordered list; lookups walk it
/// in order and the first entry with a matching label wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_id: RoleId,
    pub role_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub module_access_list: Vec<ModuleAccess>,
}

impl Role {
    pub fn new(role_id: RoleId, role_name: impl Into<String>, modules: Vec<ModuleAccess>) -> Self {
        Self {
            role_id,
            role_name: role_name.into(),
            description: String::new(),
            created_at: None,
            updated_at: None,
            is_deleted: false,
            module_access_list: modules,
        }
    }

    /// First grant whose module name equals `label`, ignoring case.
    pub fn grant_for(&self, label: &str) -> Option<&ModuleAccess> {
        let key = ModuleKey::new(label);
        self.module_access_list
            .iter()
            .find(|access| key.matches(&access.module_name))
    }

    pub fn access_for(&self, label: &str) -> Option<AccessLevel> {
        self.grant_for(label).map(|access| access.access_type)
    }

    /// Boundary check for payloads coming from the role endpoints.
    ///
    /// Module names must be non-empty and unique within the role, ignoring case.
    pub fn validate(&self) -> DomainResult<()> {
        if self.role_name.trim().is_empty() {
            return Err(DomainError::validation(format!("role {} has no name", self.role_id)));
        }

        let mut seen: HashSet<ModuleKey> = HashSet::new();
        for access in &self.module_access_list {
            if access.module_name.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "role '{}' has a module grant without a name",
                    self.role_name
                )));
            }
            if !seen.insert(access.key()) {
                return Err(DomainError::validation(format!(
                    "role '{}' grants module '{}' more than once",
                    self.role_name, access.module_name
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate a role payload.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let role: Role = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("malformed role: {e}")))?;
        role.validate()?;
        Ok(role)
    }

    /// Parse, unwrap and validate a role endpoint response.
    pub fn from_response(json: &str) -> DomainResult<Self> {
        let response: ApiResponse<Role> = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("malformed role response: {e}")))?;
        let role = response.into_data()?;
        role.validate()?;
        Ok(role)
    }
}

/// The backend sends `null` for a role with no grants.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ModuleAccess>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ModuleAccess>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Entity for Role {
    type Id = RoleId;

    fn id(&self) -> RoleId {
        self.role_id
    }

    fn is_deleted(&self) -> bool {
        self.is_deleted
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.role_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> Role {
        Role::new(
            RoleId::new(2),
            "Manager",
            vec![
                ModuleAccess::new("Dashboard", AccessLevel::Read),
                ModuleAccess::new("User", AccessLevel::Write),
            ],
        )
    }

    #[test]
    fn access_lookup_ignores_case() {
        let role = manager();
        assert_eq!(role.access_for("dashboard"), Some(AccessLevel::Read));
        assert_eq!(role.access_for("USER"), Some(AccessLevel::Write));
        assert_eq!(role.access_for("Role"), None);
    }

    #[test]
    fn duplicate_module_names_are_rejected() {
        let mut role = manager();
        role.module_access_list
            .push(ModuleAccess::new("DASHBOARD", AccessLevel::Write));
        let err = role.validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("more than once")));
    }

    #[test]
    fn backend_payload_parses_and_validates() {
        let json = r#"{
            "roleId": 5,
            "roleName": "Auditor",
            "description": "read-only",
            "createdAt": "2024-03-01T10:00:00",
            "isDeleted": false,
            "moduleAccessList": [
                {"id": 1, "moduleName": "Invoices", "accessType": "READ"}
            ]
        }"#;
        let role = Role::from_json(json).unwrap();
        assert_eq!(role.id(), RoleId::new(5));
        assert_eq!(role.access_for("invoices"), Some(AccessLevel::Read));
    }

    #[test]
    fn null_module_list_decodes_as_no_grants() {
        let role = Role::from_json(
            r#"{"roleId": 6, "roleName": "Guest", "moduleAccessList": null}"#,
        )
        .unwrap();
        assert!(role.module_access_list.is_empty());
        assert_eq!(role.access_for("Dashboard"), None);
    }

    #[test]
    fn enveloped_role_is_unwrapped() {
        let json = r#"{
            "data": {"roleId": 5, "roleName": "Auditor", "moduleAccessList": [
                {"moduleName": "Invoices", "accessType": "READ"}
            ]},
            "status": "OK",
            "statusCode": 200
        }"#;
        let role = Role::from_response(json).unwrap();
        assert_eq!(role.access_for("INVOICES"), Some(AccessLevel::Read));

        let missing =
            r#"{"data": {"roleId": 0, "roleName": ""}, "status": "NOT_FOUND", "statusCode": 404}"#;
        assert_eq!(Role::from_response(missing), Err(DomainError::NotFound));
    }

    #[test]
    fn nameless_role_is_rejected() {
        let role = Role::new(RoleId::new(1), "  ", Vec::new());
        assert!(role.validate().is_err());
    }
}
