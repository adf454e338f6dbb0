//! `telexpense-core` — shared building blocks for the expense-management core.
//!
//! Nothing here knows about storage, ciphers or menus.

pub mod entity;
pub mod envelope;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use envelope::ApiResponse;
pub use error::{DomainError, DomainResult};
pub use id::{CityId, DepartmentId, ModuleAccessId, RoleId, UserId};
