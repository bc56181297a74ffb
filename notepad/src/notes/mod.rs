mod access;
mod errors;
mod form;
mod model;

pub use access::{Notes, NotesCache};
pub use errors::{Error, Result};
pub use form::{FormError, NoteForm};
pub use model::*;
