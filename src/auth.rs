//! Login, session resumption, and token storage
//!
//! A successful login or reconnect yields the server-assigned [`User`] and
//! an opaque session token. The token lives in the OS keyring so a later
//! `palaver chat` can resume the pseudonym without asking again.

use crate::connection::{ClientCommand, Connection, ServerEvent};
use crate::error::{PalaverError, Result};
use crate::types::{City, Gender, User};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const KEYRING_SERVICE: &str = "palaver";
const KEYRING_USER: &str = "session";

/// The fields a pseudonym login declares
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginFields {
    pub nickname: String,
    pub gender: Gender,
    pub age: u8,
    pub city: City,
}

impl LoginFields {
    /// Validate the declared fields before they go on the wire
    ///
    /// # Errors
    ///
    /// Returns `PalaverError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.nickname.trim().len() < 3 {
            return Err(PalaverError::validation(
                "nickname",
                "must be at least 3 characters",
            )
            .into());
        }
        if !(13..=99).contains(&self.age) {
            return Err(PalaverError::validation("age", "must be between 13 and 99").into());
        }
        if self.city.name.is_empty() || self.city.code.is_empty() {
            return Err(PalaverError::validation("city", "a city must be selected").into());
        }
        Ok(())
    }
}

/// Outcome of a login or reconnect exchange
#[derive(Debug, Clone, PartialEq)]
pub struct Authenticated {
    /// The server-assigned identity
    pub user: User,
    /// Opaque session token for later resumption
    pub token: String,
}

/// Log in with declared fields and wait for the server's answer
///
/// Events other than the authentication outcome (roster pushes racing the
/// login) are discarded while waiting.
///
/// # Errors
///
/// Returns an error if validation fails, the send fails, or the
/// connection closes before an outcome arrives.
pub async fn login(conn: &mut dyn Connection, fields: &LoginFields) -> Result<Authenticated> {
    fields.validate()?;
    conn.send(ClientCommand::Login {
        nickname: fields.nickname.clone(),
        gender: fields.gender,
        age: fields.age,
        city: fields.city.clone(),
    })
    .await?;
    match wait_for_outcome(conn).await? {
        Some(auth) => {
            info!("Logged in as {} ({})", auth.user.nickname, auth.user.id);
            Ok(auth)
        }
        None => Err(PalaverError::Auth("login rejected by server".to_string()).into()),
    }
}

/// Try to resume a previous session with a stored token
///
/// # Returns
///
/// Returns `Ok(None)` when the server rejects the token; the caller
/// should fall back to a fresh login.
pub async fn resume(conn: &mut dyn Connection, token: &str) -> Result<Option<Authenticated>> {
    conn.send(ClientCommand::Reconnect {
        token: token.to_string(),
    })
    .await?;
    let outcome = wait_for_outcome(conn).await?;
    match &outcome {
        Some(auth) => info!("Resumed session as {}", auth.user.nickname),
        None => debug!("Stored token rejected, fresh login required"),
    }
    Ok(outcome)
}

async fn wait_for_outcome(conn: &mut dyn Connection) -> Result<Option<Authenticated>> {
    while let Some(event) = conn.next_event().await {
        match event {
            ServerEvent::Logged { user, token } => {
                return Ok(Some(Authenticated { user, token }))
            }
            ServerEvent::ReconnectFailed => return Ok(None),
            other => debug!("Ignoring {:?} while authenticating", event_name(&other)),
        }
    }
    Err(PalaverError::ConnectionClosed.into())
}

fn event_name(event: &ServerEvent) -> &'static str {
    match event {
        ServerEvent::Logged { .. } => "logged",
        ServerEvent::ReconnectFailed => "reconnectFailed",
        ServerEvent::PrivateMessage { .. } => "privateMessage",
        ServerEvent::Typing { .. } => "typing",
        ServerEvent::StopTyping { .. } => "stopTyping",
        ServerEvent::OnlineUsers(_) => "onlineUsers",
        ServerEvent::UserStatusChange { .. } => "userStatusChange",
        ServerEvent::RoomsList(_) => "roomsList",
        ServerEvent::RoomCreated(_) => "roomCreated",
        ServerEvent::RoomDeleted { .. } => "roomDeleted",
        ServerEvent::LastRoomMessages { .. } => "lastRoomMessages",
        ServerEvent::RoomMessage { .. } => "roomMessage",
        ServerEvent::RoomUsers { .. } => "roomUsers",
        ServerEvent::Kicked { .. } => "kicked",
        ServerEvent::Banned { .. } => "banned",
        ServerEvent::Signal { .. } => "signal",
    }
}

/// What the keyring remembers between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    /// Opaque reconnect token
    pub token: String,
    /// User id the token belongs to
    pub user_id: String,
    /// Nickname, for the "welcome back" line
    pub nickname: String,
}

/// Session token persistence backed by the OS keyring
pub struct TokenStore {
    service: String,
}

impl TokenStore {
    /// Creates a store using the default service name
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    /// Creates a store with a custom service name (used by tests to avoid
    /// touching the real keyring entry)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Persist a session
    ///
    /// # Errors
    ///
    /// Returns an error if the keyring is unavailable.
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, KEYRING_USER)?;
        let json = serde_json::to_string(session).map_err(PalaverError::Serialization)?;
        entry.set_password(&json)?;
        debug!("Stored session token for {}", session.nickname);
        Ok(())
    }

    /// Load the stored session, if any
    ///
    /// A missing entry is not an error; a present but undecodable entry is
    /// treated as missing.
    pub fn load(&self) -> Result<Option<StoredSession>> {
        let entry = keyring::Entry::new(&self.service, KEYRING_USER)?;
        match entry.get_password() {
            Ok(json) => Ok(serde_json::from_str(&json).ok()),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(PalaverError::Keyring(e).into()),
        }
    }

    /// Forget the stored session
    ///
    /// Deleting an absent entry is a no-op.
    pub fn clear(&self) -> Result<()> {
        let entry = keyring::Entry::new(&self.service, KEYRING_USER)?;
        match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(PalaverError::Keyring(e).into()),
        }
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}
