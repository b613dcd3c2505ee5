use std::path::Path;
use std::sync::Mutex;

use uuid::Uuid;

use crate::backend::{lock_unpoisoned, FileStore, KeyValueStore, MemoryStore};

pub const USER_ID_KEY: &str = "chatbot_user_uuid";
pub const VISIT_COUNT_KEY: &str = "chatbot_visit_count";
pub const SESSION_ID_KEY: &str = "chatbot_session_uuid";

/// Snapshot of the three identity values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub session_id: String,
    pub visit_count: u64,
}

/// Last known values, used whenever a backend read or write fails.
#[derive(Debug, Default)]
struct Fallback {
    user_id: Option<String>,
    visit_count: Option<u64>,
    session_id: Option<String>,
}

/// Durable user id, visit counter and tab-scoped session id.
///
/// `user_id` and the visit counter live in the durable backend; the session
/// id lives in the session backend. Each operation holds an internal lock for
/// its whole read-modify-write, so user id creation and the visit increment
/// happen together.
pub struct IdentityStore {
    durable: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
    fallback: Mutex<Fallback>,
}

impl IdentityStore {
    pub fn new(
        durable: impl KeyValueStore + 'static,
        session: impl KeyValueStore + 'static,
    ) -> Self {
        Self {
            durable: Box::new(durable),
            session: Box::new(session),
            fallback: Mutex::new(Fallback::default()),
        }
    }

    /// Both backends in memory; nothing outlives the store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), MemoryStore::new())
    }

    /// Durable values in `<root>/.chat_widget/identity.json`, session id in memory.
    pub fn with_durable_root(root: &Path) -> Self {
        Self::new(FileStore::under_root(root), MemoryStore::new())
    }

    /// Returns the durable user id, creating and persisting one on first use.
    ///
    /// Creation also increments the visit counter exactly once.
    pub fn get_or_create_user_id(&self) -> String {
        let mut fallback = lock_unpoisoned(&self.fallback);

        match self.durable.get(USER_ID_KEY) {
            Ok(Some(user_id)) if !user_id.trim().is_empty() => {
                fallback.user_id = Some(user_id.clone());
                return user_id;
            }
            Ok(_) => {
                if let Some(user_id) = fallback.user_id.clone() {
                    return user_id;
                }
            }
            Err(error) => {
                tracing::warn!(%error, "durable identity read failed; using in-memory user id");
                if let Some(user_id) = fallback.user_id.clone() {
                    return user_id;
                }
                let user_id = generate_id();
                fallback.user_id = Some(user_id.clone());
                fallback.visit_count = Some(fallback.visit_count.unwrap_or(0) + 1);
                return user_id;
            }
        }

        let user_id = generate_id();
        if let Err(error) = self.durable.set(USER_ID_KEY, &user_id) {
            tracing::warn!(%error, "durable identity write failed; user id kept in memory");
        }
        fallback.user_id = Some(user_id.clone());

        let visit_count = self.read_visit_count(&mut fallback) + 1;
        if let Err(error) = self.durable.set(VISIT_COUNT_KEY, &visit_count.to_string()) {
            tracing::warn!(%error, "visit counter write failed; counter kept in memory");
        }
        fallback.visit_count = Some(visit_count);

        tracing::info!(visit_count, "created durable user id");
        user_id
    }

    /// Pure read of the visit counter; 0 when never written.
    pub fn get_visit_count(&self) -> u64 {
        let mut fallback = lock_unpoisoned(&self.fallback);
        self.read_visit_count(&mut fallback)
    }

    /// Returns the tab-scoped session id, creating and persisting one if absent.
    pub fn get_current_session_id(&self) -> String {
        let mut fallback = lock_unpoisoned(&self.fallback);

        match self.session.get(SESSION_ID_KEY) {
            Ok(Some(session_id)) if !session_id.trim().is_empty() => {
                fallback.session_id = Some(session_id.clone());
                return session_id;
            }
            Ok(_) => {
                if let Some(session_id) = fallback.session_id.clone() {
                    return session_id;
                }
            }
            Err(error) => {
                tracing::warn!(%error, "session storage read failed; using in-memory session id");
                return fallback.session_id.get_or_insert_with(generate_id).clone();
            }
        }

        let session_id = generate_id();
        self.persist_session_id(&mut fallback, &session_id);
        session_id
    }

    /// Replaces the session id with a fresh one and returns it.
    ///
    /// Leaves the user id and visit counter untouched.
    pub fn reset_session(&self) -> String {
        let mut fallback = lock_unpoisoned(&self.fallback);

        if let Err(error) = self.session.remove(SESSION_ID_KEY) {
            tracing::warn!(%error, "failed to clear session id");
        }

        let session_id = generate_id();
        self.persist_session_id(&mut fallback, &session_id);
        tracing::info!(%session_id, "session reset");
        session_id
    }

    pub fn identity(&self) -> SessionIdentity {
        let user_id = self.get_or_create_user_id();
        let session_id = self.get_current_session_id();
        let visit_count = self.get_visit_count();
        SessionIdentity {
            user_id,
            session_id,
            visit_count,
        }
    }

    fn read_visit_count(&self, fallback: &mut Fallback) -> u64 {
        match self.durable.get(VISIT_COUNT_KEY) {
            Ok(Some(raw)) => raw.trim().parse::<u64>().unwrap_or(0),
            Ok(None) => fallback.visit_count.unwrap_or(0),
            Err(error) => {
                tracing::warn!(%error, "visit counter read failed; using in-memory counter");
                fallback.visit_count.unwrap_or(0)
            }
        }
    }

    fn persist_session_id(&self, fallback: &mut Fallback, session_id: &str) {
        if let Err(error) = self.session.set(SESSION_ID_KEY, session_id) {
            tracing::warn!(%error, "session storage write failed; session id kept in memory");
        }
        fallback.session_id = Some(session_id.to_string());
    }
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore").finish_non_exhaustive()
    }
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
