//! Durable client-side state in `localStorage`.
//!
//! - The pending try-on job is checkpointed here right after submission and
//!   cleared on every terminal state, so a page reload resumes polling.
//! - The admin bearer session (token + expiry) and the user session token
//!   also live here.
//!
//! All values are JSON or plain strings under a `styleselect.` key prefix.
//! Off the web the same API is backed by an in-process map, which keeps the
//! checkpoint lifecycle unit-testable.

use chrono::Utc;

use crate::models::{AdminSession, PendingGeneration};

pub const KEY_PENDING_GENERATION: &str = "styleselect.pending_generation";
pub const KEY_ADMIN_SESSION: &str = "styleselect.admin_session";
pub const KEY_SESSION_TOKEN: &str = "styleselect.session_token";
pub const KEY_ENDPOINTS: &str = "styleselect.endpoints";

#[cfg(target_arch = "wasm32")]
fn storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

#[cfg(target_arch = "wasm32")]
pub fn get_raw(key: &str) -> Option<String> {
    storage()?.get_item(key).ok().flatten()
}

#[cfg(target_arch = "wasm32")]
pub fn set_raw(key: &str, value: &str) {
    if let Some(store) = storage() {
        if store.set_item(key, value).is_err() {
            log::error!("localStorage write failed for {key}");
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub fn remove_raw(key: &str) {
    if let Some(store) = storage() {
        let _ = store.remove_item(key);
    }
}

// --------------------------- non-wasm backing ---------------------------

#[cfg(not(target_arch = "wasm32"))]
static STORE: once_cell::sync::Lazy<std::sync::Mutex<std::collections::HashMap<String, String>>> =
    once_cell::sync::Lazy::new(|| std::sync::Mutex::new(std::collections::HashMap::new()));

#[cfg(not(target_arch = "wasm32"))]
pub fn get_raw(key: &str) -> Option<String> {
    STORE.lock().ok()?.get(key).cloned()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn set_raw(key: &str, value: &str) {
    if let Ok(mut store) = STORE.lock() {
        store.insert(key.to_string(), value.to_string());
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn remove_raw(key: &str) {
    if let Ok(mut store) = STORE.lock() {
        store.remove(key);
    }
}

// --------------------------- typed accessors ---------------------------

/// Read a JSON value; a corrupt entry is dropped so it cannot wedge startup.
fn get_json<T: serde::de::DeserializeOwned>(key: &str) -> Option<T> {
    let raw = get_raw(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("discarding corrupt {key}: {e}");
            remove_raw(key);
            None
        }
    }
}

fn set_json<T: serde::Serialize>(key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => set_raw(key, &json),
        Err(e) => log::error!("could not serialize {key}: {e}"),
    }
}

pub fn save_pending_generation(pending: &PendingGeneration) {
    set_json(KEY_PENDING_GENERATION, pending);
}

pub fn load_pending_generation() -> Option<PendingGeneration> {
    get_json(KEY_PENDING_GENERATION)
}

pub fn clear_pending_generation() {
    remove_raw(KEY_PENDING_GENERATION);
}

pub fn save_admin_session(session: &AdminSession) {
    set_json(KEY_ADMIN_SESSION, session);
}

/// Load the admin session, treating an expired token as absent.
pub fn load_admin_session() -> Option<AdminSession> {
    let session: AdminSession = get_json(KEY_ADMIN_SESSION)?;
    if session.is_expired(Utc::now()) {
        remove_raw(KEY_ADMIN_SESSION);
        return None;
    }
    Some(session)
}

pub fn clear_admin_session() {
    remove_raw(KEY_ADMIN_SESSION);
}

pub fn load_session_token() -> Option<String> {
    get_raw(KEY_SESSION_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    // One sequential test: the native backing store is process-global, so the
    // checkpoint assertions must not run concurrently against the same key.
    #[test]
    fn pending_generation_checkpoint_lifecycle() {
        clear_pending_generation();
        assert!(load_pending_generation().is_none());

        let pending = PendingGeneration {
            person_image: "data:image/jpeg;base64,AA".into(),
            garment_image: "https://cdn.example/g.png".into(),
            description: String::new(),
            category_hint: None,
            status_url: "https://jobs.example/42".into(),
        };
        save_pending_generation(&pending);
        assert_eq!(load_pending_generation(), Some(pending));

        clear_pending_generation();
        assert!(load_pending_generation().is_none());

        // a corrupt entry is discarded rather than wedging startup
        set_raw(KEY_PENDING_GENERATION, "{not json");
        assert!(load_pending_generation().is_none());
        assert!(get_raw(KEY_PENDING_GENERATION).is_none());
    }

    #[test]
    fn expired_admin_session_reads_as_absent() {
        save_admin_session(&AdminSession {
            token: "jwt".into(),
            expires_at: 0,
        });
        assert!(load_admin_session().is_none());

        save_admin_session(&AdminSession {
            token: "jwt".into(),
            expires_at: Utc::now().timestamp() + 3600,
        });
        assert_eq!(load_admin_session().map(|s| s.token), Some("jwt".into()));
        clear_admin_session();
    }
}
