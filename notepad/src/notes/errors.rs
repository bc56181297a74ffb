use crate::store;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_authenticated")]
    NotAuthenticated,
    #[error("not_found")]
    NotFound(String),

    #[error(transparent)]
    Store(store::Error),
}

impl From<store::Error> for Error {
    fn from(error: store::Error) -> Self {
        match error {
            store::Error::NotFound(msg) => Self::NotFound(msg),
            error => Self::Store(error),
        }
    }
}
