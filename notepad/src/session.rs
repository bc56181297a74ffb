use std::sync::Arc;

use tokio::sync::watch;

use crate::users::{User, UserId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// Shared handle reporting who, if anyone, is signed in.
///
/// Clones observe and mutate the same state. Subscribers are notified on
/// every change. A new session reports `loading` until the first auth call
/// (usually a restore) settles.
#[derive(Clone, Debug)]
pub struct Session {
    state: Arc<watch::Sender<SessionState>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState {
            loading: true,
            ..SessionState::default()
        });
        Self { state: Arc::new(state) }
    }

    pub fn signed_in(user: User) -> Self {
        let session = Self::new();
        session.sign_in(user);
        session.set_loading(false);
        session
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn current_user_id(&self) -> Option<UserId> {
        self.state.borrow().user_id()
    }

    pub fn access_token(&self) -> Option<String> {
        self.state.borrow().user.as_ref().and_then(|u| u.access_token.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn sign_in(&self, user: User) {
        tracing::debug!(user_id = %user.id, "session signed in");
        self.state.send_modify(|state| {
            state.user = Some(user);
            state.error = None;
        });
    }

    pub fn sign_out(&self) {
        tracing::debug!("session signed out");
        self.state.send_modify(|state| state.user = None);
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|state| {
            let changed = state.loading != loading;
            state.loading = loading;
            changed
        });
    }

    pub fn set_error(&self, error: Option<String>) {
        self.state.send_modify(|state| state.error = error);
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn starts_signed_out_and_loading() {
        let session = Session::new();

        assert_eq!(session.current_user_id(), None);
        assert!(session.is_loading());
        assert_eq!(session.access_token(), None);

        assert!(!Session::signed_in(User::new(Uuid::now_v7())).is_loading());
    }

    #[test]
    fn clones_share_state() {
        let session = Session::new();
        let other = session.clone();
        let user_id = Uuid::now_v7();

        other.sign_in(User::new(user_id).with_access_token("token"));

        assert_eq!(session.current_user_id(), Some(user_id));
        assert_eq!(session.access_token(), Some("token".into()));

        session.sign_out();
        assert_eq!(other.current_user_id(), None);
    }

    #[tokio::test]
    async fn subscribers_see_user_changes() {
        let session = Session::new();
        let mut changes = session.subscribe();
        let user_id = Uuid::now_v7();

        session.sign_in(User::new(user_id));

        changes.changed().await.unwrap();
        assert_eq!(changes.borrow_and_update().user_id(), Some(user_id));
    }

    #[test]
    fn sign_in_clears_previous_error() {
        let session = Session::new();
        session.set_error(Some("Invalid login credentials".into()));

        session.sign_in(User::new(Uuid::now_v7()));

        assert_eq!(session.error(), None);
    }
}
