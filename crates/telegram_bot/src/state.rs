use std::{collections::HashMap, sync::Arc};

use teloxide::types::UserId;
use tokio::sync::Mutex;

use crate::conversation::Conversation;

/// In-progress conversations, one per Telegram user.
///
/// Kept in memory only: a restart drops every draft.
#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    inner: Arc<Mutex<HashMap<UserId, Conversation>>>,
}

impl SessionStore {
    pub(crate) async fn get(&self, user: UserId) -> Option<Conversation> {
        let guard = self.inner.lock().await;
        guard.get(&user).cloned()
    }

    pub(crate) async fn put(&self, user: UserId, conversation: Conversation) {
        let mut guard = self.inner.lock().await;
        guard.insert(user, conversation);
    }

    /// Removes the user's conversation, returning whether one existed.
    pub(crate) async fn clear(&self, user: UserId) -> bool {
        let mut guard = self.inner.lock().await;
        guard.remove(&user).is_some()
    }
}
