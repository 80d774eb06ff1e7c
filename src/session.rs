//! Page session store
//!
//! Holds one [`PageController`] per page load, keyed by a random UUID. All data
//! is lost on restart. Idle sessions are evicted by [`SessionStore::sweep_expired`].

use crate::error::{AppError, Result};
use crate::page::PageController;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// State of one loaded page
#[derive(Debug)]
pub struct PageSession {
    pub controller: PageController,
    /// For idle eviction
    last_seen: DateTime<Utc>,
}

impl PageSession {
    fn new(controller: PageController, now: DateTime<Utc>) -> Self {
        PageSession {
            controller,
            last_seen: now,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        // A session with a create request in flight is kept until the request settles
        !self.controller.panel().is_submitting() && now - self.last_seen > idle_timeout
    }
}

/// In-memory page sessions.
///
/// Locks are only held for synchronous controller updates, never across a
/// request to the memoir API.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, PageSession>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, max_sessions: usize) -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Register a freshly loaded page. Returns its id.
    ///
    /// When the store is full the least recently seen page without a create
    /// in flight is evicted first.
    pub async fn create(&self, controller: PageController) -> Uuid {
        let id = Uuid::new_v4();
        let mut sessions = self.sessions.write().await;

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(_, session)| !session.controller.panel().is_submitting())
                .min_by_key(|(_, session)| session.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                    tracing::debug!("Evicted page session {} (store full)", oldest);
                }
                None => break,
            }
        }

        sessions.insert(id, PageSession::new(controller, Utc::now()));
        tracing::debug!("Created page session {}", id);
        id
    }

    /// Run `f` against the controller of page `id` and mark the page as seen.
    pub async fn update<F, T>(&self, id: &Uuid, f: F) -> Result<T>
    where
        F: FnOnce(&mut PageController) -> T,
    {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let expired = match sessions.get(id) {
            Some(session) => session.is_expired(now, self.idle_timeout),
            None => return Err(AppError::SessionNotFound(id.to_string())),
        };
        if expired {
            sessions.remove(id);
            return Err(AppError::SessionNotFound(id.to_string()));
        }

        let session = sessions
            .get_mut(id)
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
        session.last_seen = now;
        Ok(f(&mut session.controller))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle for longer than the timeout. Returns how many were removed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, self.idle_timeout));
        before - sessions.len()
    }
}
