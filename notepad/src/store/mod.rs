//! Remote note store: the per-owner notes table the access layer syncs with.

use async_trait::async_trait;

use crate::{
    db,
    notes::{NewNote, Note, NoteChanges, NoteId},
    users::UserId,
};

mod http;
mod sqlite;

pub use http::HttpNoteStore;
pub use sqlite::SqliteNoteStore;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not_found")]
    NotFound(String),
    #[error("{error}: {message}")]
    Status { status: u16, error: String, message: String },

    #[error(transparent)]
    DB(db::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        match error {
            db::Error::NotFound(msg) => Self::NotFound(msg),
            error => Self::DB(error),
        }
    }
}

impl From<tokio_rusqlite::Error> for Error {
    fn from(error: tokio_rusqlite::Error) -> Self {
        Self::from(db::Error::from(error))
    }
}

/// Every query is scoped to an owner; a row owned by someone else behaves
/// exactly like a missing row.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes of `owner`, most recently updated first.
    async fn list(&self, owner: UserId) -> Result<Vec<Note>>;

    async fn find(&self, id: NoteId, owner: UserId) -> Result<Option<Note>>;

    async fn insert(&self, note: NewNote) -> Result<Note>;

    /// Returns `None` when no row matches both `id` and `owner`.
    async fn update(&self, id: NoteId, owner: UserId, changes: NoteChanges) -> Result<Option<Note>>;

    /// Number of rows removed; zero is not an error.
    async fn delete(&self, id: NoteId, owner: UserId) -> Result<u64>;

    /// Cheapest possible round trip to the store.
    async fn ping(&self) -> Result<()>;
}
