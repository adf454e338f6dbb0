//! Menu skeleton and its per-user annotated form.

use serde::{Deserialize, Serialize};

use telexpense_core::{DomainError, DomainResult};

use crate::AccessLevel;

/// Navigable entry inside a parent group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub can_show: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessLevel>,
}

impl MenuItem {
    pub fn new(text: impl Into<String>, router_link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            router_link: Some(router_link.into()),
            icon: None,
            can_show: false,
            access_type: None,
        }
    }

    /// Route fragment, when the item has a non-empty one.
    pub fn route(&self) -> Option<&str> {
        self.router_link.as_deref().filter(|link| !link.is_empty())
    }
}

/// Top-level navigation entry.
///
/// Either a leaf with its own `router_link`, or a parent grouping whose
/// `menu` holds the navigable items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuGroup {
    pub menu_name: String,
    #[serde(default)]
    pub parent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<Vec<MenuItem>>,
    #[serde(default)]
    pub can_show: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<AccessLevel>,
}

impl MenuGroup {
    pub fn leaf(menu_name: impl Into<String>, router_link: impl Into<String>) -> Self {
        Self {
            menu_name: menu_name.into(),
            parent: false,
            router_link: Some(router_link.into()),
            icon: None,
            menu: None,
            can_show: false,
            access_type: None,
        }
    }

    pub fn parent(menu_name: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            menu_name: menu_name.into(),
            parent: true,
            router_link: None,
            icon: None,
            menu: Some(items),
            can_show: false,
            access_type: None,
        }
    }

    /// Sub-items, or an empty slice for leaf groups.
    pub fn items(&self) -> &[MenuItem] {
        self.menu.as_deref().unwrap_or(&[])
    }

    /// Grants apply per item only when the group is flagged as a parent and
    /// actually carries items; everything else is matched by its own name.
    pub fn is_parent(&self) -> bool {
        self.parent && self.menu.is_some()
    }

    pub fn item(&self, text: &str) -> Option<&MenuItem> {
        self.items().iter().find(|item| item.text == text)
    }
}

/// Static menu skeleton, shared by every user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuDefinition {
    groups: Vec<MenuGroup>,
}

impl MenuDefinition {
    pub fn new(groups: Vec<MenuGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[MenuGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Boundary check for the menu resource.
    pub fn validate(&self) -> DomainResult<()> {
        for (index, group) in self.groups.iter().enumerate() {
            if group.menu_name.trim().is_empty() {
                return Err(DomainError::validation(format!("menu group {index} has no name")));
            }
            if group.parent && group.items().is_empty() {
                return Err(DomainError::validation(format!(
                    "parent menu group '{}' has no items",
                    group.menu_name
                )));
            }
            if let Some(item) = group.items().iter().find(|item| item.text.trim().is_empty()) {
                return Err(DomainError::validation(format!(
                    "menu group '{}' has an item without text (route '{}')",
                    group.menu_name,
                    item.route().unwrap_or_default()
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate the menu resource.
    pub fn from_json(json: &str) -> DomainResult<Self> {
        let menu: MenuDefinition = serde_json::from_str(json)
            .map_err(|e| DomainError::validation(format!("malformed menu definition: {e}")))?;
        menu.validate()?;
        Ok(menu)
    }
}

/// Group currently expanded in the navigation shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveGroup {
    pub index: usize,
    pub menu_name: String,
}

/// Menu annotated for one user.
///
/// Serializes to the same JSON array as [`MenuDefinition`], which is what the
/// session `menu` record stores.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedMenu {
    groups: Vec<MenuGroup>,
}

impl ResolvedMenu {
    pub(crate) fn from_groups(groups: Vec<MenuGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[MenuGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, menu_name: &str) -> Option<&MenuGroup> {
        self.groups.iter().find(|group| group.menu_name == menu_name)
    }

    /// See [`crate::find_active_group_index`].
    pub fn active_group_index(&self, current_route: &str) -> Option<usize> {
        crate::find_active_group_index(self, current_route)
    }

    pub fn active_group(&self, current_route: &str) -> Option<ActiveGroup> {
        let index = self.active_group_index(current_route)?;
        self.select_group(index)
    }

    /// Group chosen explicitly, e.g. when a sub-item is clicked.
    pub fn select_group(&self, index: usize) -> Option<ActiveGroup> {
        self.groups.get(index).map(|group| ActiveGroup {
            index,
            menu_name: group.menu_name.clone(),
        })
    }

    /// Groups the shell should render, with hidden sub-items dropped.
    ///
    /// A parent group is shown when at least one of its items is visible; any
    /// other group only when it is itself visible.
    pub fn visible_groups(&self) -> Vec<MenuGroup> {
        self.groups
            .iter()
            .filter_map(|group| {
                if group.is_parent() {
                    let items: Vec<MenuItem> = group
                        .items()
                        .iter()
                        .filter(|item| item.can_show)
                        .cloned()
                        .collect();
                    if items.is_empty() {
                        return None;
                    }
                    let mut shown = group.clone();
                    shown.menu = Some(items);
                    Some(shown)
                } else if group.can_show {
                    Some(group.clone())
                } else {
                    None
                }
            })
            .collect()
    }
}
