use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use crate::{session::Session, store::NoteStore, users::UserId};

use super::{Error, NewNote, Note, NoteChanges, NoteId, Result};

/// Cached notes together with the user they were fetched for.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NotesCache {
    pub owner: Option<UserId>,
    pub notes: Vec<Note>,
}

impl NotesCache {
    fn owned_by(&self, user_id: Option<UserId>) -> bool {
        self.owner.is_some() && self.owner == user_id
    }
}

/// Session-scoped notes access layer.
///
/// Holds the signed-in user's notes as a best-effort cache of the store and
/// keeps it in step with every successful load, add, update and delete. The
/// store stays the source of truth.
///
/// Every operation needs a signed-in user and does nothing without one.
/// Operations are not coordinated with each other: the cache is mutated in
/// completion order, and of two overlapping loads the one finishing last
/// wins. A result that arrives after the session switched to another user
/// is returned to the caller but never written to the cache, and a cache
/// filled for another user is never shown.
///
/// The plain operations (`load`, `add`, ...) never fail: errors are logged
/// and turned into `None`/`false`/no change. The `try_*` variants return the
/// typed error instead.
#[derive(Clone)]
pub struct Notes {
    session: Session,
    store: Arc<dyn NoteStore>,
    notes: Arc<watch::Sender<NotesCache>>,
    loading: Arc<watch::Sender<bool>>,
}

impl Notes {
    pub fn new(session: Session, store: Arc<dyn NoteStore>) -> Self {
        let (notes, _) = watch::channel(NotesCache::default());
        let (loading, _) = watch::channel(false);

        Self {
            session,
            store,
            notes: Arc::new(notes),
            loading: Arc::new(loading),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Snapshot of the cached collection. Empty unless the cache belongs to
    /// the signed-in user.
    pub fn notes(&self) -> Vec<Note> {
        let cache = self.notes.borrow();
        if cache.owned_by(self.session.current_user_id()) {
            cache.notes.clone()
        } else {
            Vec::new()
        }
    }

    /// Raw cache updates. Receivers should compare `owner` with the session.
    pub fn subscribe(&self) -> watch::Receiver<NotesCache> {
        self.notes.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn get_local(&self, id: NoteId) -> Option<Note> {
        let cache = self.notes.borrow();
        if !cache.owned_by(self.session.current_user_id()) {
            return None;
        }
        cache.notes.iter().find(|note| note.id == id).cloned()
    }

    pub fn clear(&self) {
        self.notes.send_if_modified(|cache| {
            let changed = *cache != NotesCache::default();
            *cache = NotesCache::default();
            changed
        });
    }

    pub async fn load(&self) {
        soft("loading notes", self.try_load().await);
    }

    pub async fn fetch_by_id(&self, id: NoteId) -> Option<Note> {
        soft("fetching note by id", self.try_fetch_by_id(id).await)
    }

    pub async fn add(&self, title: &str, content: &str) -> Option<Note> {
        soft("adding note", self.try_add(title, content).await)
    }

    pub async fn update(&self, id: NoteId, title: &str, content: &str) -> Option<Note> {
        soft("updating note", self.try_update(id, title, content).await)
    }

    /// `true` when the store accepted the delete, including when no row matched.
    pub async fn delete(&self, id: NoteId) -> bool {
        soft("deleting note", self.try_delete(id).await).is_some()
    }

    /// Replaces the cache with the user's notes, most recently updated first.
    pub async fn try_load(&self) -> Result<Vec<Note>> {
        let user_id = self.user_id()?;

        self.loading.send_replace(true);
        let result = self.store.list(user_id).await;
        self.loading.send_replace(false);

        let notes = result?;
        self.apply(user_id, |cache| {
            *cache = notes.clone();
            true
        });

        Ok(notes)
    }

    /// Asks the store directly; the cache is neither read nor written.
    pub async fn try_fetch_by_id(&self, id: NoteId) -> Result<Note> {
        let user_id = self.user_id()?;

        self.store
            .find(id, user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Note '{id}' not found")))
    }

    pub async fn try_add(&self, title: &str, content: &str) -> Result<Note> {
        let user_id = self.user_id()?;

        let note = self.store.insert(NewNote::new(user_id, title, content)).await?;
        self.apply(user_id, |cache| {
            cache.insert(0, note.clone());
            true
        });

        Ok(note)
    }

    /// Replaces the cached entry in place; the cache is not re-sorted.
    pub async fn try_update(&self, id: NoteId, title: &str, content: &str) -> Result<Note> {
        let user_id = self.user_id()?;

        let note = self
            .store
            .update(id, user_id, NoteChanges::new(title, content))
            .await?
            .ok_or_else(|| Error::NotFound(format!("Note '{id}' not found")))?;

        self.apply(user_id, |cache| match cache.iter_mut().find(|n| n.id == id) {
            Some(cached) => {
                *cached = note.clone();
                true
            }
            None => false,
        });

        Ok(note)
    }

    /// Returns the number of rows the store removed.
    pub async fn try_delete(&self, id: NoteId) -> Result<u64> {
        let user_id = self.user_id()?;

        let deleted = self.store.delete(id, user_id).await?;
        self.apply(user_id, |cache| {
            let len = cache.len();
            cache.retain(|n| n.id != id);
            cache.len() != len
        });

        Ok(deleted)
    }

    /// Clears the cache whenever the session's user changes and reloads it
    /// for the new user. Runs until aborted.
    pub fn follow_session(&self) -> JoinHandle<()> {
        let notes = self.clone();
        let mut changes = self.session.subscribe();

        tokio::spawn(async move {
            let mut user_id = changes.borrow_and_update().user_id();
            if user_id.is_some() {
                notes.load().await;
            }

            while changes.changed().await.is_ok() {
                let next = changes.borrow_and_update().user_id();
                if next == user_id {
                    continue;
                }

                tracing::debug!(?next, "session user changed, resetting notes");
                user_id = next;
                notes.clear();
                if user_id.is_some() {
                    notes.load().await;
                }
            }
        })
    }

    fn user_id(&self) -> Result<UserId> {
        self.session.current_user_id().ok_or(Error::NotAuthenticated)
    }

    /// Mutates the cache unless the session moved to another user meanwhile.
    /// A cache still holding another user's notes is emptied first.
    fn apply(&self, user_id: UserId, modify: impl FnOnce(&mut Vec<Note>) -> bool) {
        if self.session.current_user_id() != Some(user_id) {
            tracing::debug!(%user_id, "session changed during the call, cache left untouched");
            return;
        }

        self.notes.send_if_modified(|cache| {
            let mut reset = false;
            if cache.owner != Some(user_id) {
                tracing::debug!(%user_id, previous = ?cache.owner, "cache owner changed, resetting");
                *cache = NotesCache {
                    owner: Some(user_id),
                    notes: Vec::new(),
                };
                reset = true;
            }
            modify(&mut cache.notes) || reset
        });
    }
}

fn soft<T>(operation: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(Error::NotAuthenticated) => {
            tracing::debug!("{operation} skipped: not signed in");
            None
        }
        Err(Error::NotFound(message)) => {
            tracing::debug!("{operation}: {message}");
            None
        }
        Err(error) => {
            tracing::error!("Error {operation}: {error:?}");
            None
        }
    }
}
