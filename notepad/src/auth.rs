//! Email/password authentication against the notes server.

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{session::Session, users::User};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{message}")]
    Rejected { status: u16, error: String, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub user: User,
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.json::<ErrorBody>().await.ok();
    let message = body
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_else(|| status.to_string());

    Err(match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized(message),
        status => Error::Rejected {
            status: status.as_u16(),
            error: body.map(|b| b.error).unwrap_or_else(|| "unexpected".into()),
            message,
        },
    })
}

/// Drives a [`Session`]: every call flips the session's loading flag and
/// records a readable error message when it fails.
#[derive(Clone, Debug)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self::with_client(Client::new(), base_url, session)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, session: Session) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Creates the account. The session stays signed out until [`Self::sign_in`].
    pub async fn sign_up(&self, email: &str, password: &str, name: Option<&str>) -> Result<User> {
        self.track("An error occurred during sign up", self.request_sign_up(email, password, name))
            .await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        self.track("An error occurred during sign in", self.request_sign_in(email, password))
            .await
    }

    /// Revokes the token server-side, then signs the session out.
    pub async fn sign_out(&self) -> Result<()> {
        self.track("An error occurred during sign out", self.request_sign_out())
            .await
    }

    /// Re-establishes a session from a persisted token. An expired or revoked
    /// token leaves the session signed out and returns `None`.
    pub async fn restore(&self, access_token: &str) -> Result<Option<User>> {
        self.track("Error checking authentication state", self.request_restore(access_token))
            .await
    }

    async fn request_sign_up(&self, email: &str, password: &str, name: Option<&str>) -> Result<User> {
        let response = self
            .client
            .post(self.url("/auth/v1/signup"))
            .json(&json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?;

        Ok(check(response).await?.json::<User>().await?)
    }

    async fn request_sign_in(&self, email: &str, password: &str) -> Result<User> {
        let response = self
            .client
            .post(self.url("/auth/v1/token"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let TokenResponse { access_token, user } = check(response).await?.json().await?;
        let user = user.with_access_token(access_token);

        tracing::info!(user_id = %user.id, "signed in");
        self.session.sign_in(user.clone());
        Ok(user)
    }

    async fn request_sign_out(&self) -> Result<()> {
        if let Some(token) = self.session.access_token() {
            let response = self
                .client
                .post(self.url("/auth/v1/logout"))
                .bearer_auth(token)
                .send()
                .await?;
            check(response).await?;
        }

        self.session.sign_out();
        Ok(())
    }

    async fn request_restore(&self, access_token: &str) -> Result<Option<User>> {
        let response = self
            .client
            .get(self.url("/auth/v1/user"))
            .bearer_auth(access_token)
            .send()
            .await?;

        match check(response).await {
            Ok(response) => {
                let user = response.json::<User>().await?.with_access_token(access_token);
                self.session.sign_in(user.clone());
                Ok(Some(user))
            }
            Err(Error::Unauthorized(_)) => {
                self.session.sign_out();
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    async fn track<T>(&self, fallback: &str, call: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        self.session.set_loading(true);
        self.session.set_error(None);

        let result = call.await;

        if let Err(error) = &result {
            tracing::error!("{fallback}: {error:?}");
            let message = match error {
                Error::Http(_) => fallback.to_owned(),
                error => error.to_string(),
            };
            self.session.set_error(Some(message));
        }
        self.session.set_loading(false);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_server_records_fallback_error() {
        let session = Session::new();
        let auth = AuthClient::new("http://127.0.0.1:9", session.clone());
        assert!(session.is_loading());

        let result = auth.sign_in("test@mail.com", "password").await;

        assert!(matches!(result, Err(Error::Http(_))));
        assert_eq!(session.error(), Some("An error occurred during sign in".into()));
        assert!(!session.is_loading());
        assert_eq!(session.current_user_id(), None);
    }

    #[tokio::test]
    async fn sign_out_without_token_only_clears_session() {
        let session = Session::signed_in(crate::users::User::new(uuid::Uuid::now_v7()));
        let auth = AuthClient::new("http://127.0.0.1:9", session.clone());

        auth.sign_out().await.unwrap();

        assert_eq!(session.current_user_id(), None);
    }
}
