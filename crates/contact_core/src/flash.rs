//! Session-scoped one-shot notices.
//!
//! # Responsibility
//! - Queue messages per session and category until the next render drains them.
//! - Expire sessions that stay idle longer than the configured window.
//!
//! # Invariants
//! - `drain` returns each queued message at most once.
//! - Expired sessions yield no messages, even if they were never purged.

use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Opaque per-browser session identifier carried in a cookie.
pub type SessionId = Uuid;

pub const CATEGORY_SUCCESS: &str = "success";
pub const CATEGORY_ERROR: &str = "error";

/// Default inactivity window after which a session's notices are dropped.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60);

#[derive(Debug)]
struct SessionQueues {
    last_seen: Instant,
    queues: BTreeMap<String, Vec<String>>,
}

/// Process-local flash queue store shared by all requests.
#[derive(Debug)]
pub struct FlashStore {
    idle_window: Duration,
    sessions: Mutex<HashMap<SessionId, SessionQueues>>,
}

impl Default for FlashStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_IDLE)
    }
}

impl FlashStore {
    pub fn new(idle_window: Duration) -> Self {
        Self {
            idle_window,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn idle_window(&self) -> Duration {
        self.idle_window
    }

    /// Appends `message` to the `category` queue of `session`.
    pub fn enqueue(&self, session: SessionId, category: &str, message: impl Into<String>) {
        let now = Instant::now();
        let mut sessions = self.lock();
        let entry = sessions.entry(session).or_insert_with(|| SessionQueues {
            last_seen: now,
            queues: BTreeMap::new(),
        });
        if is_expired(entry.last_seen, now, self.idle_window) {
            entry.queues.clear();
        }
        entry.last_seen = now;
        entry
            .queues
            .entry(category.to_string())
            .or_default()
            .push(message.into());
    }

    /// Returns and clears every queued message of `category` for `session`.
    pub fn drain(&self, session: SessionId, category: &str) -> Vec<String> {
        let now = Instant::now();
        let mut sessions = self.lock();
        let Some(entry) = sessions.get_mut(&session) else {
            return Vec::new();
        };
        if is_expired(entry.last_seen, now, self.idle_window) {
            sessions.remove(&session);
            return Vec::new();
        }
        entry.last_seen = now;
        let drained = entry.queues.remove(category).unwrap_or_default();
        if entry.queues.is_empty() {
            sessions.remove(&session);
        }
        drained
    }

    /// Drops every session idle longer than the window; returns how many.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| !is_expired(entry.last_seen, now, self.idle_window));
        let purged = before - sessions.len();
        if purged > 0 {
            debug!("event=flash_purge module=flash status=ok purged={purged}");
        }
        purged
    }

    /// Number of sessions currently holding queued notices.
    pub fn session_count(&self) -> usize {
        self.lock().len()
    }

    /// Binds this store to one session.
    pub fn scope(&self, session: SessionId) -> FlashScope<'_> {
        FlashScope {
            store: self,
            session,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionQueues>> {
        // Queues hold plain data, so a poisoned lock still guards a usable map.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Flash handle for a single session, passed into workflows.
#[derive(Debug, Clone, Copy)]
pub struct FlashScope<'a> {
    store: &'a FlashStore,
    session: SessionId,
}

impl FlashScope<'_> {
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn enqueue(&self, category: &str, message: impl Into<String>) {
        self.store.enqueue(self.session, category, message);
    }

    pub fn drain(&self, category: &str) -> Vec<String> {
        self.store.drain(self.session, category)
    }
}

fn is_expired(last_seen: Instant, now: Instant, idle_window: Duration) -> bool {
    now.saturating_duration_since(last_seen) > idle_window
}
