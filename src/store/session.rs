//! Shared session state.

use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::credentials::CredentialSlot;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversations {
    pub list: Vec<Conversation>,
    pub current: Option<Conversation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user: Option<User>,
    /// Newest first.
    pub notifications: Vec<Notification>,
    pub conversations: Conversations,
    pub messages: Vec<Message>,
    pub documents: Vec<Document>,
}

/// Passive state holder shared by the UI layer.
#[derive(Debug, Default)]
pub struct SessionStore {
    state: RwLock<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Mutations ---

    pub fn set_user(&self, user: Option<User>) {
        self.write().user = user;
    }

    pub fn add_notification(&self, notification: Notification) {
        self.write().notifications.insert(0, notification);
    }

    pub fn mark_notification_read(&self, id: &str) {
        if let Some(n) = self.write().notifications.iter_mut().find(|n| n.id == id) {
            n.read = true;
        }
    }

    pub fn set_conversations(&self, conversations: Vec<Conversation>) {
        self.write().conversations.list = conversations;
    }

    pub fn add_conversation(&self, conversation: Conversation) {
        self.write().conversations.list.insert(0, conversation);
    }

    pub fn set_current_conversation(&self, conversation: Option<Conversation>) {
        self.write().conversations.current = conversation;
    }

    pub fn remove_conversation(&self, id: &str) {
        let mut state = self.write();
        state.conversations.list.retain(|c| c.id != id);
        if state.conversations.current.as_ref().is_some_and(|c| c.id == id) {
            state.conversations.current = None;
        }
    }

    pub fn set_messages(&self, messages: Vec<Message>) {
        self.write().messages = messages;
    }

    pub fn add_message(&self, message: Message) {
        self.write().messages.push(message);
    }

    pub fn set_documents(&self, documents: Vec<Document>) {
        self.write().documents = documents;
    }

    /// Drop everything tied to the signed-in user, including the stored token.
    ///
    /// Notifications survive logout.
    pub fn logout(&self, credentials: &CredentialSlot) {
        {
            let mut state = self.write();
            state.user = None;
            state.conversations = Conversations::default();
            state.messages.clear();
            state.documents.clear();
        }
        credentials.purge("logout");
        tracing::info!("Session cleared");
    }

    // --- Getters ---

    pub fn is_authenticated(&self) -> bool {
        self.read().user.is_some()
    }

    pub fn current_conversation(&self) -> Option<Conversation> {
        self.read().conversations.current.clone()
    }

    pub fn conversation_list(&self) -> Vec<Conversation> {
        self.read().conversations.list.clone()
    }

    pub fn current_messages(&self) -> Vec<Message> {
        self.read().messages.clone()
    }

    pub fn available_documents(&self) -> Vec<Document> {
        self.read().documents.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.read().notifications.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }
}
