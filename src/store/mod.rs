//! Shared session state consumed by views.
//!
//! The request pipeline never writes here; the UI layer owns every mutation.
//! The only link to the core is `logout`, which also clears the stored
//! credential.

pub mod session;

pub use session::{
    Conversation, Conversations, Document, Message, Notification, SessionState, SessionStore, User,
};
