//! Session store.
//!
//! Owns every live session. The store lock covers only create/lookup/delete;
//! all field mutation happens under each session's own mutex, so the audio
//! path and the watchdog can interleave without tearing state and sessions
//! never contend with each other.

use crate::session::state::{SessionConfig, SessionState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock, watch};

/// One live session: identity, state under its own lock, and the watchdog
/// cancellation slot.
pub struct SessionHandle {
    /// Session identifier assigned by the transport.
    pub id: String,
    /// All mutable session state.
    pub state: Mutex<SessionState>,
    /// Cancellation side of the session's watchdog task, if one is running.
    watchdog: std::sync::Mutex<Option<watch::Sender<bool>>>,
}

impl SessionHandle {
    fn new(id: &str, config: SessionConfig, now: Instant) -> Self {
        Self {
            id: id.to_string(),
            state: Mutex::new(SessionState::new(config, now)),
            watchdog: std::sync::Mutex::new(None),
        }
    }

    /// Installs a new watchdog cancellation handle.
    ///
    /// Any previous handle is dropped, which wakes the old task's `changed()`
    /// wait with an error and stops it — re-arming an already-watched
    /// session replaces the task instead of stacking a second one.
    pub fn install_watchdog(&self, sender: watch::Sender<bool>) {
        let mut slot = self.watchdog.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(sender);
    }

    /// Cancels the watchdog, if running. Safe to call repeatedly.
    pub fn cancel_watchdog(&self) {
        let sender = self.watchdog.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(sender) = sender {
            let _ = sender.send(true);
        }
    }

    /// Returns true while a watchdog handle is installed.
    pub fn has_watchdog(&self) -> bool {
        self.watchdog.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}

/// All live sessions, keyed by session id.
pub struct SessionStore {
    config: SessionConfig,
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionStore {
    /// Creates an empty store.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Looks up a session, creating it if missing.
    ///
    /// Idempotent: an event for an unknown or expired session id recovers by
    /// creating a fresh session rather than failing.
    pub async fn get_or_create(&self, id: &str, now: Instant) -> Arc<SessionHandle> {
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(id) {
                return Arc::clone(handle);
            }
        }

        let mut sessions = self.sessions.write().await;
        // Re-check: another task may have created it between the locks.
        if let Some(handle) = sessions.get(id) {
            return Arc::clone(handle);
        }

        let handle = Arc::new(SessionHandle::new(id, self.config.clone(), now));
        sessions.insert(id.to_string(), Arc::clone(&handle));
        tracing::info!(session = id, "session created");
        handle
    }

    /// Looks up a session without creating it.
    pub async fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Removes a session, cancelling its watchdog.
    ///
    /// Returns the handle so in-flight work holding it can finish; the
    /// session is no longer reachable through the store, which is what the
    /// watchdog task checks before every tick.
    pub async fn remove(&self, id: &str) -> Option<Arc<SessionHandle>> {
        let handle = self.sessions.write().await.remove(id);
        if let Some(handle) = &handle {
            handle.cancel_watchdog();
            tracing::info!(session = id, "session removed");
        }
        handle
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true when no session is live.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(SessionConfig::default())
    }

    #[tokio::test]
    async fn test_get_or_create_creates_once() {
        let store = store();
        let now = Instant::now();

        let a = store.get_or_create("s1", now).await;
        let b = store.get_or_create("s1", now).await;

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_session() {
        let store = store();
        assert!(store.get("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_session() {
        let store = store();
        let now = Instant::now();

        store.get_or_create("s1", now).await;
        assert_eq!(store.len().await, 1);

        let removed = store.remove("s1").await;
        assert!(removed.is_some());
        assert!(store.get("s1").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_unknown_session_is_noop() {
        let store = store();
        assert!(store.remove("nope").await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = store();
        let now = Instant::now();

        let a = store.get_or_create("s1", now).await;
        let b = store.get_or_create("s2", now).await;

        a.state.lock().await.chunk_index = 7;
        assert_eq!(b.state.lock().await.chunk_index, 0);
    }

    #[tokio::test]
    async fn test_remove_cancels_watchdog() {
        let store = store();
        let now = Instant::now();

        let handle = store.get_or_create("s1", now).await;
        let (tx, mut rx) = watch::channel(false);
        handle.install_watchdog(tx);
        assert!(handle.has_watchdog());

        store.remove("s1").await;

        rx.changed().await.expect("cancel signal should arrive");
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn test_install_watchdog_replaces_previous() {
        let store = store();
        let handle = store.get_or_create("s1", Instant::now()).await;

        let (tx1, mut rx1) = watch::channel(false);
        handle.install_watchdog(tx1);

        let (tx2, _rx2) = watch::channel(false);
        handle.install_watchdog(tx2);

        // The first sender was dropped: its receiver errors out, which is
        // how the superseded task learns to stop.
        assert!(rx1.changed().await.is_err());
    }

    #[tokio::test]
    async fn test_cancel_watchdog_is_idempotent() {
        let store = store();
        let handle = store.get_or_create("s1", Instant::now()).await;

        let (tx, _rx) = watch::channel(false);
        handle.install_watchdog(tx);

        handle.cancel_watchdog();
        handle.cancel_watchdog();
        assert!(!handle.has_watchdog());
    }
}
