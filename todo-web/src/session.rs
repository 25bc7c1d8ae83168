//! Per-visitor session state.
//!
//! Each browser session owns exactly one [`TodoList`]. The session id travels in
//! a cookie; [`session_middleware`] resolves it (or issues a new one) and
//! stores the [`SessionId`] as a request extension for handlers to pick up.
//! A session is only registered once a handler changes its list.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use todo_list::TodoList;

use crate::config::Config;

/// Opaque identifier of a browser session.
///
/// The value is the cookie's bearer secret, so `Debug` does not print it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(..)")
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct SessionEntry {
    list: TodoList,
    last_seen: Instant,
}

impl SessionEntry {
    fn new(now: Instant) -> Self {
        Self {
            list: TodoList::new(),
            last_seen: now,
        }
    }
}

/// All live sessions of the process, keyed by session id.
///
/// The lock is held only while a single synchronous operation runs, so two
/// operations never interleave on the same list.
#[derive(Debug)]
pub struct SessionRegistry {
    cookie_name: String,
    idle_timeout: Duration,
    sessions: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new(cookie_name: impl Into<String>, idle_timeout: Duration) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            idle_timeout,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.session_cookie.clone(), config.session_idle_timeout())
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionEntry>> {
        // Every operation leaves its list consistent, so a poisoned lock is still usable.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new session with an empty list, discarding idle ones first.
    #[tracing::instrument(skip(self))]
    pub fn open(&self) -> SessionId {
        let now = Instant::now();
        let id = SessionId::generate();
        let mut sessions = self.lock();
        self.retain_active(&mut sessions, now);
        sessions.insert(id.clone(), SessionEntry::new(now));
        tracing::info!(sessions = sessions.len(), "session opened");
        id
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Runs `f` against the list of session `id`, registering the session
    /// first when it is not known yet.
    ///
    /// Registering a session discards idle ones. A session that expired after
    /// the request was admitted is recreated empty.
    pub fn with_session<R>(&self, id: &SessionId, f: impl FnOnce(&mut TodoList) -> R) -> R {
        let now = Instant::now();
        let mut sessions = self.lock();
        if !sessions.contains_key(id) {
            self.retain_active(&mut sessions, now);
            tracing::info!("session opened");
        }
        let entry = sessions
            .entry(id.clone())
            .or_insert_with(|| SessionEntry::new(now));
        entry.last_seen = now;
        f(&mut entry.list)
    }

    /// Runs `f` against the list of session `id` without registering it.
    ///
    /// An unknown session reads as an empty list.
    pub fn read_session<R>(&self, id: &SessionId, f: impl FnOnce(&TodoList) -> R) -> R {
        let mut sessions = self.lock();
        match sessions.get_mut(id) {
            Some(entry) => {
                entry.last_seen = Instant::now();
                f(&entry.list)
            }
            None => f(&TodoList::new()),
        }
    }

    /// Drops every session not seen within the idle timeout before `now`.
    pub fn prune_idle(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        self.retain_active(&mut sessions, now)
    }

    fn retain_active(&self, sessions: &mut HashMap<SessionId, SessionEntry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| {
            now.saturating_duration_since(entry.last_seen) <= self.idle_timeout
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!(pruned, "discarded idle sessions");
        }
        pruned
    }
}

/// Resolves the session cookie into a [`SessionId`] request extension, issuing
/// a new id and setting the cookie when none is known.
///
/// The new id is not registered here; the first handler that changes the list
/// registers it through [`SessionRegistry::with_session`].
pub async fn session_middleware(
    State(registry): State<Arc<SessionRegistry>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let known = jar
        .get(registry.cookie_name())
        .map(|cookie| SessionId::from(cookie.value()))
        .filter(|id| registry.contains(id));

    let (jar, session_id) = match known {
        Some(id) => (jar, id),
        None => {
            let id = SessionId::generate();
            let cookie = Cookie::build((registry.cookie_name().to_string(), id.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (jar.add(cookie), id)
        }
    };

    request.extensions_mut().insert(session_id);
    let response = next.run(request).await;
    (jar, response).into_response()
}
