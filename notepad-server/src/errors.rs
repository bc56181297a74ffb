use axum::{http::StatusCode, response::IntoResponse};
use notepad::{db, store};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("not_found")]
    NotFound(String),

    // auth
    #[error("unauthorized")]
    Unauthorized,
    #[error("invalid_credentials")]
    InvalidCredentials,

    #[error("validation")]
    Validation(String),
    #[error("conflict")]
    Conflict(String),

    #[error(transparent)]
    DB(db::Error),
    #[error(transparent)]
    Store(store::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unexpected")]
    Unexpected(String),
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

impl From<store::Error> for Error {
    fn from(error: store::Error) -> Self {
        match error {
            store::Error::NotFound(msg) => Self::NotFound(msg),
            store::Error::Unauthorized => Self::Unauthorized,
            error => Self::Store(error),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ErrorResponse {
    NotFound { message: String },
    Unauthorized { message: String },
    Validation { message: String },
    Conflict { message: String },
    Unexpected { message: String },
}

impl From<Error> for ErrorResponse {
    fn from(error: Error) -> Self {
        match error {
            Error::NotFound(message) => Self::NotFound { message },
            Error::Unauthorized => Self::Unauthorized {
                message: "Unauthorized".into(),
            },
            Error::InvalidCredentials => Self::Unauthorized {
                message: "Invalid login credentials".into(),
            },
            Error::Validation(message) => Self::Validation { message },
            Error::Conflict(message) => Self::Conflict { message },
            Error::Unexpected(message) => {
                tracing::error!("unexpected: {message}");
                Self::Unexpected { message }
            }
            error => {
                tracing::error!("{:?}", error);
                Self::Unexpected {
                    message: "Unexpected error".into(),
                }
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unauthorized | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut res = axum::Json(ErrorResponse::from(self)).into_response();
        *res.status_mut() = status;
        res
    }
}
