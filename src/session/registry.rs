//! The conversation session registry
//!
//! Single source of truth for which conversations are open and which is
//! focused. All operations are total: unknown keys degrade to no-ops, so
//! the registry can never reach an invalid state. Mutation happens only on
//! the caller's (single) update path; readers take snapshots.

use super::{Message, Session, SessionKind};
use crate::types::{Room, User};

/// Key of the irremovable home session
pub const HOME_KEY: &str = "home";

/// Ordered set of open sessions plus the active key
///
/// Insertion order is tab order and is never implicitly reordered. The
/// registry always contains the home session, and `active_key` always
/// references an existing session.
///
/// # Examples
///
/// ```
/// use palaver::session::SessionRegistry;
/// use palaver::types::{Room, User};
///
/// let mut registry = SessionRegistry::new("Home");
/// registry.open_room(&Room::public("r1", "General"));
/// registry.open_private(&User::new("u1", "ana"));
/// assert_eq!(registry.active_key(), "u1");
/// assert_eq!(registry.keys(), vec!["home", "r1", "u1"]);
/// ```
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
    active_key: String,
}

impl SessionRegistry {
    /// Creates a registry holding only the home session, which is active
    pub fn new(home_label: impl Into<String>) -> Self {
        Self {
            sessions: vec![Session::new(HOME_KEY, SessionKind::Home, home_label)],
            active_key: HOME_KEY.to_string(),
        }
    }

    /// Key of the currently focused session
    pub fn active_key(&self) -> &str {
        &self.active_key
    }

    /// The currently focused session
    pub fn active(&self) -> &Session {
        // active_key always references an existing session
        self.sessions
            .iter()
            .find(|s| s.key == self.active_key)
            .unwrap_or(&self.sessions[0])
    }

    /// All open sessions in tab order
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Session keys in tab order
    pub fn keys(&self) -> Vec<&str> {
        self.sessions.iter().map(|s| s.key.as_str()).collect()
    }

    /// Looks up a session by key
    pub fn get(&self, key: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.key == key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.key == key)
    }

    /// Opens (or re-focuses) a private session with `counterpart`
    ///
    /// If no session keyed by the counterpart's id exists, a new one is
    /// appended with an empty history and made active; otherwise the
    /// existing one is focused. Idempotent with respect to existing
    /// sessions: a key never appears twice.
    pub fn open_private(&mut self, counterpart: &User) {
        if self.get(&counterpart.id).is_none() {
            self.sessions.push(Session::new(
                counterpart.id.clone(),
                SessionKind::Private,
                counterpart.nickname.clone(),
            ));
        }
        self.active_key = counterpart.id.clone();
    }

    /// Opens (or re-focuses) a room session. Same contract as
    /// [`open_private`](Self::open_private), keyed by the room id.
    pub fn open_room(&mut self, room: &Room) {
        if self.get(&room.id).is_none() {
            self.sessions.push(Session::new(
                room.id.clone(),
                SessionKind::Room,
                room.name.clone(),
            ));
        }
        self.active_key = room.id.clone();
    }

    /// Closes the session keyed by `key`
    ///
    /// The home session cannot be closed. If the closed session was active,
    /// focus falls back to the first remaining session; closing a
    /// background session leaves the active key untouched. Unknown keys are
    /// a no-op.
    pub fn close(&mut self, key: &str) {
        if key == HOME_KEY {
            return;
        }
        let before = self.sessions.len();
        self.sessions.retain(|s| s.key != key);
        if self.sessions.len() == before {
            return; // unknown key
        }
        if self.active_key == key {
            self.active_key = self.sessions[0].key.clone();
        }
    }

    /// Focuses the session keyed by `key`; no-op when the key is unknown
    pub fn set_active(&mut self, key: &str) {
        if self.get(key).is_some() {
            self.active_key = key.to_string();
        }
    }

    /// Records an inbound private message
    ///
    /// When a session for the sender exists, the message is appended in
    /// place: the session keeps its position and focus is not stolen from
    /// whatever the user is looking at. When no session exists, a new one
    /// is created pre-populated with this message and activated.
    pub fn record_inbound_private_message(&mut self, message: Message) {
        let sender_id = message.sender.id.clone();
        match self.get_mut(&sender_id) {
            Some(session) => {
                // keep the base label current, as set_typing does
                session.label = message.sender.nickname.clone();
                session.messages.push(message);
            }
            None => {
                let mut session = Session::new(
                    sender_id.clone(),
                    SessionKind::Private,
                    message.sender.nickname.clone(),
                );
                session.messages.push(message);
                self.sessions.push(session);
                self.active_key = sender_id;
            }
        }
    }

    /// Appends an outbound message to the session keyed by `key`, if open
    pub fn record_outbound_message(&mut self, key: &str, message: Message) {
        if let Some(session) = self.get_mut(key) {
            session.messages.push(message);
        }
    }

    /// Updates the typing flag of the session keyed by the user's id
    ///
    /// The session's [`display_label`](Session::display_label) reflects the
    /// flag. Unknown keys are a no-op.
    pub fn set_typing(&mut self, user: &User, is_typing: bool) {
        if let Some(session) = self.get_mut(&user.id) {
            session.typing = is_typing;
            // keep the base label current with the peer's nickname
            session.label = user.nickname.clone();
        }
    }

    /// Replaces the history of a room session with the server's recent
    /// backlog; no-op when the room is not open
    pub fn replace_room_history(&mut self, room_id: &str, messages: Vec<Message>) {
        if let Some(session) = self.get_mut(room_id) {
            session.messages = messages;
        }
    }

    /// Appends an inbound room message in place; no focus steal, no
    /// reorder, no-op when the room is not open
    pub fn record_room_message(&mut self, room_id: &str, message: Message) {
        if let Some(session) = self.get_mut(room_id) {
            session.messages.push(message);
        }
    }

    /// Replaces the participant roster of a room session
    pub fn set_room_participants(&mut self, room_id: &str, users: Vec<User>) {
        if let Some(session) = self.get_mut(room_id) {
            session.participants = users;
        }
    }
}
