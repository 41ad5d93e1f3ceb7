//! Session identifier persistence
//!
//! One session id per storage scope, persisted until an explicit reset.
//! Callers never synthesize ids themselves; [`SessionStore::get_or_create`]
//! is the single generation path.

use chrono::Utc;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Storage key under which the session id lives.
const SESSION_KEY: &str = "chat_session_id";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS client_kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session store error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Durable key-value home for the session identifier.
///
/// Two processes racing on an absent key can each generate a different id;
/// the last write wins and this is accepted, not corrected.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> SessionResult<Option<String>>;

    fn save(&self, session_id: &str) -> SessionResult<()>;

    /// Removing an absent id is a no-op.
    fn clear(&self) -> SessionResult<()>;

    /// Read the persisted id, generating and persisting a fresh one if
    /// absent. Idempotent between calls to [`SessionStore::clear`].
    fn get_or_create(&self) -> SessionResult<String> {
        if let Some(id) = self.load()? {
            return Ok(id);
        }
        let id = generate_session_id();
        self.save(&id)?;
        tracing::info!(session_id = %id, "created new chat session");
        Ok(id)
    }
}

/// `session-{unix_millis}-{9 random base36 chars}`
fn generate_session_id() -> String {
    const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("session-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Session store backed by a small sqlite key-value table
#[derive(Clone)]
pub struct SqliteSessionStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> SessionResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> SessionResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> SessionResult<Self> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self) -> SessionResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM client_kv WHERE key = ?1",
                params![SESSION_KEY],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save(&self, session_id: &str) -> SessionResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO client_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![SESSION_KEY, session_id],
        )?;
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM client_kv WHERE key = ?1",
            params![SESSION_KEY],
        )?;
        Ok(())
    }
}
