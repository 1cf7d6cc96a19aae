//! Project-list storage contract and SQLite implementation.
//!
//! # Responsibility
//! - Load and store the full project list as one JSON document.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - The list lives under the fixed `projects` key; `store_projects` replaces
//!   it wholesale in a single statement.
//! - A missing key reads as an empty list, never as an error.

use crate::db::DbError;
use crate::model::project::ProjectRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized project list.
pub const PROJECTS_KEY: &str = "projects";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for project-list persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted project data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable storage for the project list.
///
/// The contract is whole-list: callers read the complete list, mutate it in
/// memory, and write the complete list back.
pub trait ProjectStorage {
    fn load_projects(&self) -> RepoResult<Vec<ProjectRecord>>;
    fn store_projects(&mut self, projects: &[ProjectRecord]) -> RepoResult<()>;
}

/// SQLite-backed project storage over the `kv` table.
pub struct SqliteProjectStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ProjectStorage for SqliteProjectStorage<'_> {
    fn load_projects(&self) -> RepoResult<Vec<ProjectRecord>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![PROJECTS_KEY],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json)
                .map_err(|err| RepoError::InvalidData(err.to_string())),
        }
    }

    fn store_projects(&mut self, projects: &[ProjectRecord]) -> RepoResult<()> {
        let json = serde_json::to_string(projects)
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
            params![PROJECTS_KEY, json],
        )?;
        Ok(())
    }
}

/// In-memory project storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryProjectStorage {
    projects: Vec<ProjectRecord>,
    /// Counts `store_projects` calls, so tests can observe autosave writes.
    pub store_count: u32,
}

impl ProjectStorage for MemoryProjectStorage {
    fn load_projects(&self) -> RepoResult<Vec<ProjectRecord>> {
        Ok(self.projects.clone())
    }

    fn store_projects(&mut self, projects: &[ProjectRecord]) -> RepoResult<()> {
        self.projects = projects.to_vec();
        self.store_count += 1;
        Ok(())
    }
}
