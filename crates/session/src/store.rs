//! Session records in a client-side key/value store.
//!
//! Every read and write of the `user`/`menu` records and the login flag goes
//! through [`SessionStore`]; nothing else touches the underlying stores.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use telexpense_auth::{annotate, MenuDefinition, ResolvedMenu, User};
use telexpense_core::Entity;

use crate::codec::SessionCodec;
use crate::config::SessionConfig;
use crate::error::{FormatError, SessionError};
use crate::guard::Redirect;

pub const USER_RECORD: &str = "user";
pub const MENU_RECORD: &str = "menu";
pub const EMAIL_KEY: &str = "email";
pub const LOGGED_IN_KEY: &str = "isLoggedIn";

/// Write options for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetOptions {
    /// Entry reads as absent once this much time has passed.
    pub ttl: Option<Duration>,
    /// Path scope (cookie-like stores only).
    pub path: Option<String>,
}

/// Minimal string key/value store (cookie jar or local storage).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String, options: &SetOptions);
    fn remove(&self, key: &str);
    fn clear(&self);
}

#[derive(Debug, Clone)]
struct StoredEntry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
    path: Option<String>,
}

/// In-process [`KeyValueStore`] with per-entry expiry.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Path scope recorded for a live entry.
    pub fn path_of(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|entry| !is_expired(entry, Utc::now()))
            .and_then(|entry| entry.path.clone())
    }

    pub fn len(&self) -> usize {
        let now = Utc::now();
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|entry| !is_expired(entry, now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_expired(entry: &StoredEntry, now: DateTime<Utc>) -> bool {
    entry.expires_at.is_some_and(|at| at <= now)
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        if is_expired(entry, Utc::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: String, options: &SetOptions) {
        let entry = StoredEntry {
            value,
            // A lifetime past the calendar range never expires.
            expires_at: options.ttl.and_then(|ttl| Utc::now().checked_add_signed(ttl)),
            path: options.path.clone(),
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), entry);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }

    fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }
}

/// Decoded session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub menu: Option<ResolvedMenu>,
}

/// Typed facade over the encrypted session records.
///
/// `cookies` holds the expiring `user`/`menu` records; `local` holds the
/// login flag and other encrypted local entries. Reads never fail: anything
/// that does not decode is logged and treated as absent.
pub struct SessionStore<S: KeyValueStore = MemoryStore> {
    cookies: S,
    local: S,
    codec: Arc<SessionCodec>,
    config: SessionConfig,
}

impl<S: KeyValueStore> core::fmt::Debug for SessionStore<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("codec", &self.codec)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(cookies: S, local: S, codec: Arc<SessionCodec>, config: SessionConfig) -> Self {
        Self {
            cookies,
            local,
            codec,
            config,
        }
    }

    /// Build the codec from `config` and wrap the two stores.
    pub fn from_config(cookies: S, local: S, config: SessionConfig) -> Result<Self, SessionError> {
        let codec = SessionCodec::from_config(&config)?;
        Ok(Self::new(cookies, local, Arc::new(codec), config))
    }

    pub fn cookies(&self) -> &S {
        &self.cookies
    }

    pub fn local(&self) -> &S {
        &self.local
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn record_options(&self) -> SetOptions {
        SetOptions {
            ttl: Some(self.config.record_ttl),
            path: Some(self.config.cookie_path.clone()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Records
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_user(&self, user: &User) -> Result<(), SessionError> {
        let blob = self.codec.encrypt_json(user)?;
        self.cookies.set(USER_RECORD, blob, &self.record_options());
        Ok(())
    }

    pub fn get_user(&self) -> Option<User> {
        let blob = self.cookies.get(USER_RECORD)?;
        match self.codec.decrypt_json::<User>(&blob) {
            Ok(user) => Some(user),
            Err(err) => {
                tracing::warn!(error = %err, "user record unreadable; treating as signed out");
                None
            }
        }
    }

    pub fn clear_user(&self) {
        self.cookies.remove(USER_RECORD);
    }

    pub fn set_menu(&self, menu: &ResolvedMenu) -> Result<(), SessionError> {
        let blob = self.codec.encrypt_json(menu)?;
        self.cookies.set(MENU_RECORD, blob, &self.record_options());
        Ok(())
    }

    pub fn get_menu(&self) -> Option<ResolvedMenu> {
        let blob = self.cookies.get(MENU_RECORD)?;
        let decoded = self.codec.decrypt_to_array(&blob).and_then(|items| {
            serde_json::from_value::<ResolvedMenu>(Value::Array(items))
                .map_err(|e| FormatError::InvalidJson(e.to_string()))
        });
        match decoded {
            Ok(menu) => Some(menu),
            Err(err) => {
                tracing::warn!(error = %err, "menu record unreadable; dropping it");
                None
            }
        }
    }

    pub fn clear_menu(&self) {
        self.cookies.remove(MENU_RECORD);
    }

    /// Annotate `menu` with the signed-in user's role and store the result.
    ///
    /// Without a readable user record every entry stays hidden.
    pub fn resolve_menu(&self, menu: &MenuDefinition) -> Result<ResolvedMenu, SessionError> {
        let user = self.get_user();
        let resolved = annotate(menu, user.as_ref().and_then(User::role));
        self.set_menu(&resolved)?;
        Ok(resolved)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Local entries
    // ─────────────────────────────────────────────────────────────────────

    pub fn set_local<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), SessionError> {
        let blob = self.codec.encrypt_json(value)?;
        self.local.set(key, blob, &SetOptions::default());
        Ok(())
    }

    pub fn get_local<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let blob = self.local.get(key)?;
        match self.codec.decrypt_json::<T>(&blob) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "local entry unreadable");
                None
            }
        }
    }

    pub fn remove_local(&self, key: &str) {
        self.local.remove(key);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Record a successful login.
    pub fn login(&self, user: &User) -> Result<(), SessionError> {
        self.set_local(EMAIL_KEY, &user.email)?;
        self.set_local(LOGGED_IN_KEY, &true)?;
        self.set_user(user)?;
        tracing::info!(user_id = %user.id(), "session started");
        Ok(())
    }

    /// Only a stored JSON `true` counts as signed in.
    pub fn is_logged_in(&self) -> bool {
        self.get_local::<bool>(LOGGED_IN_KEY).unwrap_or(false)
    }

    pub fn load(&self) -> Option<Session> {
        let user = self.get_user()?;
        Some(Session {
            user,
            menu: self.get_menu(),
        })
    }

    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        self.set_user(&session.user)?;
        match &session.menu {
            Some(menu) => self.set_menu(menu)?,
            None => self.clear_menu(),
        }
        Ok(())
    }

    /// Drop the user and menu records and all local entries.
    pub fn clear(&self) {
        self.clear_user();
        self.clear_menu();
        self.local.clear();
    }

    /// Sign out: clear everything and return where to navigate.
    pub fn clear_and_redirect(&self) -> Redirect {
        self.clear();
        tracing::info!("session cleared");
        Redirect::to(self.config.login_route.clone())
    }
}
