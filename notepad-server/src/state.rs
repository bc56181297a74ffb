use axum::extract::FromRef;
use notepad::{db::DB, SqliteNoteStore};

#[derive(FromRef, Clone)]
pub struct AppState {
    pub conn: DB,
    pub notes: SqliteNoteStore,
}

impl AppState {
    pub fn new(conn: DB) -> Self {
        Self {
            notes: SqliteNoteStore::new(conn.clone()),
            conn,
        }
    }
}
