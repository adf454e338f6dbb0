use serde::{Deserialize, Serialize};

use telexpense_core::ModuleAccessId;

/// Granularity of permitted interaction with a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    Read,
    Write,
    ReadWrite,
}

impl AccessLevel {
    pub fn allows_read(self) -> bool {
        matches!(self, AccessLevel::Read | AccessLevel::ReadWrite)
    }

    pub fn allows_write(self) -> bool {
        matches!(self, AccessLevel::Write | AccessLevel::ReadWrite)
    }

    pub fn allows(self, op: Operation) -> bool {
        match op {
            Operation::Read => self.allows_read(),
            Operation::Write => self.allows_write(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Read => "READ",
            AccessLevel::Write => "WRITE",
            AccessLevel::ReadWrite => "READ_WRITE",
        }
    }
}

impl core::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a feature page is about to do with a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Operation::Read => f.write_str("read"),
            Operation::Write => f.write_str("write"),
        }
    }
}

/// Normalized module/menu label used as the match key.
///
/// Grants are matched by human-readable label, not by a stable id, so renaming
/// a menu entry silently revokes the grant for every role still using the old
/// label. Keep all comparisons going through this type so a switch to stable
/// identifiers only has one place to change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleKey(String);

impl ModuleKey {
    pub fn new(label: &str) -> Self {
        Self(label.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, label: &str) -> bool {
        self.0 == label.to_lowercase()
    }
}

impl core::fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One module grant inside a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleAccess {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ModuleAccessId>,
    pub module_name: String,
    pub access_type: AccessLevel,
}

impl ModuleAccess {
    pub fn new(module_name: impl Into<String>, access_type: AccessLevel) -> Self {
        Self {
            id: None,
            module_name: module_name.into(),
            access_type,
        }
    }

    pub fn key(&self) -> ModuleKey {
        ModuleKey::new(&self.module_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_levels_use_upper_case_wire_names() {
        let json = serde_json::to_string(&AccessLevel::ReadWrite).unwrap();
        assert_eq!(json, "\"READ_WRITE\"");
        let level: AccessLevel = serde_json::from_str("\"WRITE\"").unwrap();
        assert_eq!(level, AccessLevel::Write);
    }

    #[test]
    fn write_only_does_not_allow_read() {
        assert!(AccessLevel::Read.allows(Operation::Read));
        assert!(!AccessLevel::Read.allows(Operation::Write));
        assert!(!AccessLevel::Write.allows(Operation::Read));
        assert!(AccessLevel::ReadWrite.allows(Operation::Write));
    }

    #[test]
    fn module_key_ignores_case() {
        let key = ModuleKey::new("Dashboard");
        for label in ["dashboard", "DASHBOARD", "DashBoard"] {
            assert!(key.matches(label), "{label}");
        }
        assert!(!key.matches("Dashboards"));
    }

    #[test]
    fn module_access_accepts_backend_shape() {
        let access: ModuleAccess =
            serde_json::from_str(r#"{"id":9,"moduleName":"User","accessType":"READ"}"#).unwrap();
        assert_eq!(access.id, Some(ModuleAccessId::new(9)));
        assert_eq!(access.key().as_str(), "user");
    }
}
