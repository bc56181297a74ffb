//! Client side of the notepad: who is signed in, where notes live, and the
//! cached per-user notes collection that screens render from.

pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod notes;
pub mod session;
pub mod store;
pub mod users;

pub use auth::AuthClient;
pub use notes::{Note, NoteForm, NoteId, Notes};
pub use session::Session;
pub use store::{HttpNoteStore, NoteStore, SqliteNoteStore};
pub use users::{User, UserId};
