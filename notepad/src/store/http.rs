use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::{
    notes::{NewNote, Note, NoteChanges, NoteId},
    session::Session,
    users::UserId,
};

use super::{Error, NoteStore, Result};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    deleted: u64,
}

/// Client of the notes server's REST table.
///
/// Requests carry the session's access token; the server derives ownership
/// from it, so the `owner` arguments only guard against a session that
/// changed hands mid-flight.
#[derive(Clone, Debug)]
pub struct HttpNoteStore {
    client: Client,
    base_url: String,
    session: Session,
}

impl HttpNoteStore {
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

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn note_url(&self, id: NoteId) -> String {
        self.url(&format!("/rest/v1/notes/{id}"))
    }

    fn authorized(&self, request: RequestBuilder, owner: UserId) -> Result<RequestBuilder> {
        let user = self.session.current_user().ok_or(Error::Unauthorized)?;
        if user.id != owner {
            return Err(Error::Unauthorized);
        }
        let token = user.access_token.ok_or(Error::Unauthorized)?;

        Ok(request.bearer_auth(token))
    }
}

/// Maps non-success statuses to store errors.
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
        StatusCode::UNAUTHORIZED => Error::Unauthorized,
        StatusCode::NOT_FOUND => Error::NotFound(message),
        status => Error::Status {
            status: status.as_u16(),
            error: body.map(|b| b.error).unwrap_or_else(|| "unexpected".into()),
            message,
        },
    })
}

fn not_found_as_none<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::NotFound(_)) => Ok(None),
        Err(error) => Err(error),
    }
}

#[async_trait]
impl NoteStore for HttpNoteStore {
    async fn list(&self, owner: UserId) -> Result<Vec<Note>> {
        let request = self.authorized(self.client.get(self.url("/rest/v1/notes")), owner)?;
        let notes = check(request.send().await?).await?.json().await?;
        Ok(notes)
    }

    async fn find(&self, id: NoteId, owner: UserId) -> Result<Option<Note>> {
        let request = self.authorized(self.client.get(self.note_url(id)), owner)?;
        let result = match check(request.send().await?).await {
            Ok(response) => Ok(response.json::<Note>().await?),
            Err(error) => Err(error),
        };
        not_found_as_none(result)
    }

    async fn insert(&self, note: NewNote) -> Result<Note> {
        let request = self.authorized(self.client.post(self.url("/rest/v1/notes")), note.owner_id)?;
        let note = check(request.json(&note).send().await?).await?.json().await?;
        Ok(note)
    }

    async fn update(&self, id: NoteId, owner: UserId, changes: NoteChanges) -> Result<Option<Note>> {
        let request = self.authorized(self.client.patch(self.note_url(id)), owner)?;
        let result = match check(request.json(&changes).send().await?).await {
            Ok(response) => Ok(response.json::<Note>().await?),
            Err(error) => Err(error),
        };
        not_found_as_none(result)
    }

    async fn delete(&self, id: NoteId, owner: UserId) -> Result<u64> {
        let request = self.authorized(self.client.delete(self.note_url(id)), owner)?;
        let response: DeleteResponse = check(request.send().await?).await?.json().await?;
        Ok(response.deleted)
    }

    async fn ping(&self) -> Result<()> {
        check(self.client.get(self.url("/__heartbeat__")).send().await?).await?;
        Ok(())
    }
}
