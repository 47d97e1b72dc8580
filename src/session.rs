//! In-memory session store (non-persistent).
//!
//! Sessions are created on first reference, live until explicitly cleared or
//! the process exits, and keep a turn history bounded by an approximate token
//! count. Each session sits behind its own async mutex so concurrent requests
//! on one session id run one after the other while different ids never wait
//! on each other.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

impl Role {
    /// Tag used when the history is rendered for the model.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "Müşteri",
            Self::Agent => "Temsilci",
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            at: Utc::now(),
        }
    }

    /// Approximate token count (word count).
    pub fn tokens(&self) -> usize {
        estimate_tokens(&self.text)
    }
}

/// Word-count token estimate used for the memory ceiling.
pub fn estimate_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Bounded turn history of one conversation.
#[derive(Debug)]
pub struct Session {
    id: String,
    turns: VecDeque<Turn>,
    token_limit: usize,
    tokens: usize,
}

impl Session {
    pub fn new(id: impl Into<String>, token_limit: usize) -> Self {
        Self {
            id: id.into(),
            turns: VecDeque::new(),
            token_limit,
            tokens: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.tokens
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        let turn = Turn::new(role, text);
        self.tokens += turn.tokens();
        self.turns.push_back(turn);
        self.evict();
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.tokens = 0;
    }

    /// Drop turns from the oldest end until under the ceiling. The most recent
    /// user turn is never dropped, even if it alone exceeds the ceiling.
    fn evict(&mut self) {
        while self.tokens > self.token_limit {
            let last_user = self.turns.iter().rposition(|t| t.role == Role::User);
            if last_user == Some(0) {
                break;
            }
            let Some(dropped) = self.turns.pop_front() else {
                break;
            };
            self.tokens -= dropped.tokens();
            tracing::debug!(
                session_id = %self.id,
                role = ?dropped.role,
                remaining_tokens = self.tokens,
                "Evicted oldest turn"
            );
        }
    }
}

/// Shared handle to one session; hold the lock for the whole chat turn.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Process-wide session map.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    token_limit: usize,
}

impl SessionStore {
    pub fn new(token_limit: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            token_limit,
        }
    }

    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    /// Get the session, creating an empty one on first reference.
    pub async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(session_id) {
            return handle.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::info!(session_id = %session_id, "Created session");
                Arc::new(Mutex::new(Session::new(session_id, self.token_limit)))
            })
            .clone()
    }

    pub async fn append(&self, session_id: &str, role: Role, text: impl Into<String>) {
        let handle = self.get_or_create(session_id).await;
        handle.lock().await.push(role, text);
    }

    /// Remove a session. Returns `false` for unknown ids; never creates one.
    pub async fn clear(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(handle) => {
                handle.lock().await.clear();
                tracing::info!(session_id = %session_id, "Cleared session");
                true
            }
            None => false,
        }
    }

    /// Copy of the history, without creating the session.
    pub async fn snapshot(&self, session_id: &str) -> Option<Vec<Turn>> {
        let handle = self.sessions.read().await.get(session_id).cloned()?;
        let session = handle.lock().await;
        Some(session.snapshot())
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
