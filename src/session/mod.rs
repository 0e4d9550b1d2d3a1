//! Conversation sessions
//!
//! A [`Session`] is one open conversation: the home screen, a private chat
//! with another user, or a room. The [`SessionRegistry`] owns the ordered
//! set of open sessions and the active key, and is the single source of
//! truth for which conversations are visibly open.

mod registry;

pub use registry::{SessionRegistry, HOME_KEY};

use crate::types::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminates message provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// A message authored by a user
    #[default]
    User,
    /// A server-generated notice (e.g. "user is offline")
    System,
}

/// One chat message
///
/// The `sender` is a denormalized snapshot taken at delivery time, not a
/// live link: later profile changes do not rewrite history. A message
/// carries text, an attachment URL, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Client-side identity, assigned on construction
    pub id: Uuid,
    /// Snapshot of the sender at delivery time
    pub sender: User,
    /// Message text, if any
    pub content: Option<String>,
    /// Durable URL of an uploaded file, if any
    pub attachment_url: Option<String>,
    /// User message or server notice
    pub kind: MessageKind,
    /// Delivery timestamp (client clock)
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// Creates a user message with optional text and attachment
    pub fn new(sender: User, content: Option<String>, attachment_url: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            content,
            attachment_url,
            kind: MessageKind::User,
            sent_at: Utc::now(),
        }
    }

    /// Creates a plain text user message
    ///
    /// # Examples
    ///
    /// ```
    /// use palaver::session::Message;
    /// use palaver::types::User;
    ///
    /// let msg = Message::text(User::new("u1", "ana"), "hi");
    /// assert_eq!(msg.content.as_deref(), Some("hi"));
    /// assert!(msg.attachment_url.is_none());
    /// ```
    pub fn text(sender: User, content: impl Into<String>) -> Self {
        Self::new(sender, Some(content.into()), None)
    }

    /// Creates a server notice attributed to `sender`
    pub fn system(sender: User, content: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::System,
            ..Self::new(sender, Some(content.into()), None)
        }
    }
}

/// What kind of conversation a session holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// The irremovable landing session
    Home,
    /// A one-to-one conversation, keyed by the counterpart's user id
    Private,
    /// A room conversation, keyed by the room id
    Room,
}

/// One open conversation tracked by the registry
///
/// Sessions are created by opening a chat or by an inbound private message
/// from a peer without an open session, and destroyed only by an explicit
/// close. The registry owns removal behavior; sessions carry no callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique key: `"home"`, a user id, or a room id
    pub key: String,
    /// Home, private, or room
    pub kind: SessionKind,
    /// Base title (counterpart nickname or room name)
    pub label: String,
    /// Whether the counterpart is currently typing (private sessions)
    pub typing: bool,
    /// Ordered message history, append-only within the session's lifetime
    pub messages: Vec<Message>,
    /// Current participants (room sessions only, replaced wholesale)
    pub participants: Vec<User>,
}

impl Session {
    /// Creates an empty session
    pub fn new(key: impl Into<String>, kind: SessionKind, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            label: label.into(),
            typing: false,
            messages: Vec::new(),
            participants: Vec::new(),
        }
    }

    /// Human-readable title, reflecting typing state
    ///
    /// # Examples
    ///
    /// ```
    /// use palaver::session::{Session, SessionKind};
    ///
    /// let mut session = Session::new("u1", SessionKind::Private, "ana");
    /// assert_eq!(session.display_label(), "ana");
    /// session.typing = true;
    /// assert_eq!(session.display_label(), "ana (typing…)");
    /// ```
    pub fn display_label(&self) -> String {
        if self.typing {
            format!("{} (typing…)", self.label)
        } else {
            self.label.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_text() {
        let msg = Message::text(User::new("u1", "ana"), "hello");
        assert_eq!(msg.kind, MessageKind::User);
        assert_eq!(msg.content.as_deref(), Some("hello"));
        assert!(msg.attachment_url.is_none());
        assert_eq!(msg.sender.nickname, "ana");
    }

    #[test]
    fn test_message_system() {
        let msg = Message::system(User::new("u1", "ana"), "user is offline");
        assert_eq!(msg.kind, MessageKind::System);
    }

    #[test]
    fn test_message_attachment_only() {
        let msg = Message::new(User::new("u1", "ana"), None, Some("https://cdn/x.png".into()));
        assert!(msg.content.is_none());
        assert_eq!(msg.attachment_url.as_deref(), Some("https://cdn/x.png"));
    }

    #[test]
    fn test_message_ids_are_unique() {
        let sender = User::new("u1", "ana");
        let a = Message::text(sender.clone(), "one");
        let b = Message::text(sender, "two");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_session_display_label_typing() {
        let mut session = Session::new("u1", SessionKind::Private, "ana");
        assert_eq!(session.display_label(), "ana");
        session.typing = true;
        assert!(session.display_label().contains("typing"));
        session.typing = false;
        assert_eq!(session.display_label(), "ana");
    }

    #[test]
    fn test_session_starts_empty() {
        let session = Session::new("r1", SessionKind::Room, "General");
        assert!(session.messages.is_empty());
        assert!(session.participants.is_empty());
        assert!(!session.typing);
    }
}
