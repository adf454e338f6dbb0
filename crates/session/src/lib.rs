//! `telexpense-session` — encrypted client-side session records.
//!
//! `SessionCodec` obscures small JSON payloads at rest; `SessionStore` is the
//! single place that reads and writes the `user`/`menu` records and the
//! login flag; `auth_guard` decides whether a protected route may load.

pub mod codec;
pub mod config;
pub mod error;
pub mod guard;
pub mod store;

pub use codec::SessionCodec;
pub use config::{ConfigError, SessionConfig};
pub use error::{CodecError, FormatError, SessionError};
pub use guard::{auth_guard, GuardDecision, Redirect};
pub use store::{KeyValueStore, MemoryStore, Session, SessionStore, SetOptions};
