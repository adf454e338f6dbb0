use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use telexpense_core::{Entity, RoleId};

use crate::{
    AccessLevel, MenuDefinition, MenuGroup, MenuItem, ModuleKey, Operation, ResolvedMenu, Role,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("no access granted to '{0}'")]
    NotGranted(String),

    #[error("'{module}' grants {granted}, {needed} required")]
    Insufficient {
        module: String,
        granted: AccessLevel,
        needed: Operation,
    },
}

/// Annotate the menu skeleton for one role.
///
/// - No IO
/// - No panics
/// - The input definition is never modified
///
/// Every entry in the derived copy starts hidden with no access level, then
/// picks up `can_show`/`access_type` from the first role grant whose module
/// name equals its label (case-insensitively). A missing or soft-deleted
/// role leaves everything hidden.
pub fn annotate(menu: &MenuDefinition, role: Option<&Role>) -> ResolvedMenu {
    let role = role.filter(|r| {
        if r.is_deleted() {
            tracing::warn!(role_id = %r.id(), "role is deleted; granting nothing");
        }
        !r.is_deleted()
    });
    let groups: Vec<MenuGroup> = menu
        .groups()
        .iter()
        .map(|group| annotate_group(group, role))
        .collect();

    let resolved = ResolvedMenu::from_groups(groups);
    tracing::debug!(
        role_id = ?role.map(|r| r.id()),
        groups = resolved.groups().len(),
        visible = resolved.visible_groups().len(),
        "menu annotated"
    );
    resolved
}

fn annotate_group(group: &MenuGroup, role: Option<&Role>) -> MenuGroup {
    let mut out = group.clone();
    out.can_show = false;
    out.access_type = None;

    if group.is_parent() {
        out.menu = group
            .menu
            .as_ref()
            .map(|items| items.iter().map(|item| annotate_item(item, role)).collect());
    } else {
        if let Some(items) = out.menu.as_mut() {
            items.iter_mut().for_each(hide_item);
        }
        if let Some(level) = role.and_then(|r| r.access_for(&group.menu_name)) {
            out.can_show = true;
            out.access_type = Some(level);
        }
    }
    out
}

fn annotate_item(item: &MenuItem, role: Option<&Role>) -> MenuItem {
    let mut out = item.clone();
    hide_item(&mut out);
    if let Some(level) = role.and_then(|r| r.access_for(&item.text)) {
        out.can_show = true;
        out.access_type = Some(level);
    }
    out
}

fn hide_item(item: &mut MenuItem) {
    item.can_show = false;
    item.access_type = None;
}

/// Index of the group to expand for `current_route`.
///
/// A group with sub-items matches when any item's route fragment occurs in
/// the route; items without a route never match. All groups are scanned and
/// the last match wins, so routes that overlap two groups resolve to the
/// later one.
pub fn find_active_group_index(menu: &ResolvedMenu, current_route: &str) -> Option<usize> {
    let mut active = None;
    for (index, group) in menu.groups().iter().enumerate() {
        let Some(items) = group.menu.as_ref() else {
            continue;
        };
        if items
            .iter()
            .filter_map(MenuItem::route)
            .any(|route| current_route.contains(route))
        {
            active = Some(index);
        }
    }
    active
}

/// Access level recorded for a group, or for one of its items.
///
/// Names are compared exactly: these are the labels feature pages hardcode.
pub fn access_type_for(
    menu: &ResolvedMenu,
    menu_group_name: &str,
    item_text: Option<&str>,
) -> Option<AccessLevel> {
    let group = menu.group(menu_group_name)?;
    match item_text {
        Some(text) => group.item(text)?.access_type,
        None => group.access_type,
    }
}

/// Gate an operation on a menu entry.
///
/// Feature pages use this to disable create/edit/delete actions when the
/// user's level only allows reading.
pub fn require_access(
    menu: &ResolvedMenu,
    menu_group_name: &str,
    item_text: Option<&str>,
    needed: Operation,
) -> Result<AccessLevel, AccessError> {
    let module = item_text.unwrap_or(menu_group_name).to_string();
    let Some(granted) = access_type_for(menu, menu_group_name, item_text) else {
        return Err(AccessError::NotGranted(module));
    };

    if granted.allows(needed) {
        Ok(granted)
    } else {
        tracing::debug!(%module, %granted, %needed, "operation not allowed");
        Err(AccessError::Insufficient {
            module,
            granted,
            needed,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Role Audit
// ─────────────────────────────────────────────────────────────────────────────

/// How a role's grants line up with the menu labels.
///
/// Grants are matched by label, so a renamed menu entry silently orphans every
/// grant that still uses the old name. The audit makes that visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAudit {
    pub role_id: RoleId,
    pub role_name: String,

    /// Grants that match at least one menu label.
    pub matched: Vec<String>,

    /// Grants that match no menu label.
    pub orphaned: Vec<String>,

    /// Menu labels the role grants nothing for (sorted).
    pub ungranted: Vec<String>,
}

impl RoleAudit {
    pub fn is_clean(&self) -> bool {
        self.orphaned.is_empty()
    }
}

/// Compare a role's grants against the labels the menu actually matches on.
pub fn audit_role(menu: &MenuDefinition, role: &Role) -> RoleAudit {
    let labels: BTreeSet<ModuleKey> = matchable_labels(menu).map(ModuleKey::new).collect();

    let mut matched = Vec::new();
    let mut orphaned = Vec::new();
    for access in &role.module_access_list {
        if labels.contains(&access.key()) {
            matched.push(access.module_name.clone());
        } else {
            orphaned.push(access.module_name.clone());
        }
    }

    let ungranted: Vec<String> = labels
        .iter()
        .filter(|label| role.grant_for(label.as_str()).is_none())
        .map(|label| label.to_string())
        .collect();

    if !orphaned.is_empty() {
        tracing::warn!(
            role_id = %role.id(),
            ?orphaned,
            "role grants modules missing from the menu"
        );
    }

    RoleAudit {
        role_id: role.id(),
        role_name: role.role_name.clone(),
        matched,
        orphaned,
        ungranted,
    }
}

fn matchable_labels(menu: &MenuDefinition) -> impl Iterator<Item = &str> {
    menu.groups().iter().flat_map(|group| {
        let labels: Vec<&str> = if group.is_parent() {
            group.items().iter().map(|item| item.text.as_str()).collect()
        } else {
            vec![group.menu_name.as_str()]
        };
        labels
    })
}
