//! `telexpense-auth` — role-based menu access (pure, no storage, no IO).
//!
//! Roles grant access to modules by name; a static menu skeleton is annotated
//! per user so the shell only shows what the role allows.

pub mod access;
pub mod menu;
pub mod resolve;
pub mod roles;
pub mod user;

pub use access::{AccessLevel, ModuleAccess, ModuleKey, Operation};
pub use menu::{ActiveGroup, MenuDefinition, MenuGroup, MenuItem, ResolvedMenu};
pub use resolve::{
    access_type_for, annotate, audit_role, find_active_group_index, require_access, AccessError,
    RoleAudit,
};
pub use roles::Role;
pub use user::{City, Department, User};
