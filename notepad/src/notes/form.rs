/// Title and content as typed by the user, trimmed and checked before they
/// reach [`Notes::add`](super::Notes::add) or [`Notes::update`](super::Notes::update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub title: String,
    pub content: String,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter a title for your note")]
    MissingTitle,
}

impl NoteForm {
    pub fn new(title: &str, content: &str) -> Result<Self, FormError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(FormError::MissingTitle);
        }

        Ok(Self {
            title: title.to_owned(),
            content: content.trim().to_owned(),
        })
    }
}
