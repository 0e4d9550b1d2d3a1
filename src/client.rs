//! The chat client context
//!
//! [`Client`] owns everything a logged-in session needs: the connection,
//! the session registry, the roster and room directory, and the outbound
//! typing tracker. All inbound events funnel through [`Client::handle_event`],
//! the single state-update path; everything else reads snapshots.

use crate::connection::wire::system_notice_text;
use crate::connection::{ClientCommand, Connection, ServerEvent, WireMessage};
use crate::error::{PalaverError, Result};
use crate::roster::{RoomDirectory, Roster, RosterFilter};
use crate::session::{Message, SessionKind, SessionRegistry};
use crate::signaling::CallSession;
use crate::typing::{TypingSignal, TypingTracker};
use crate::types::{Room, RoomVisibility, User};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Something the shell should surface to the user after an event
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Informational line
    Info(String),
    /// A room session was closed by the server (kick, ban, deletion)
    RoomClosed { room_id: String, reason: String },
}

/// A logged-in chat session
pub struct Client {
    user: User,
    registry: SessionRegistry,
    roster: Roster,
    rooms: RoomDirectory,
    filter: RosterFilter,
    typing: TypingTracker,
    typing_peer: Option<String>,
    call: Option<CallSession>,
    conn: Box<dyn Connection>,
}

impl Client {
    /// Creates a client for an authenticated user
    ///
    /// # Arguments
    ///
    /// * `user` - The identity returned by login
    /// * `conn` - The established realtime connection
    /// * `home_label` - Label of the home session
    /// * `typing_idle` - Idle window after which typing indicators stop
    pub fn new(
        user: User,
        conn: Box<dyn Connection>,
        home_label: &str,
        typing_idle: Duration,
    ) -> Self {
        Self {
            user,
            registry: SessionRegistry::new(home_label),
            roster: Roster::new(),
            rooms: RoomDirectory::new(),
            filter: RosterFilter::default(),
            typing: TypingTracker::new(typing_idle),
            typing_peer: None,
            call: None,
            conn,
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn rooms(&self) -> &RoomDirectory {
        &self.rooms
    }

    pub fn filter(&self) -> &RosterFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: RosterFilter) {
        self.filter = filter;
    }

    /// Announce presence and ask for the initial roster and room list
    pub async fn announce_online(&mut self) -> Result<()> {
        self.conn
            .send(ClientCommand::UserOnline {
                user_id: self.user.id.clone(),
            })
            .await?;
        self.conn.send(ClientCommand::GetOnlineUsers).await?;
        self.conn.send(ClientCommand::GetRooms).await?;
        Ok(())
    }

    /// Apply one server event to client state
    ///
    /// # Returns
    ///
    /// Returns a [`Notice`] when the shell should tell the user something
    /// beyond redrawing state.
    pub async fn handle_event(&mut self, event: ServerEvent) -> Result<Option<Notice>> {
        match event {
            ServerEvent::PrivateMessage {
                sender,
                message,
                file,
                kind,
                code,
            } => {
                let message = match kind {
                    crate::session::MessageKind::System => {
                        let text = code
                            .as_deref()
                            .and_then(system_notice_text)
                            .map(str::to_string)
                            .or(message)
                            .unwrap_or_else(|| "server notice".to_string());
                        Message::system(sender, text)
                    }
                    crate::session::MessageKind::User => Message::new(sender, message, file),
                };
                self.registry.record_inbound_private_message(message);
                Ok(None)
            }
            ServerEvent::Typing { user } => {
                self.registry.set_typing(&user, true);
                Ok(None)
            }
            ServerEvent::StopTyping { user } => {
                self.registry.set_typing(&user, false);
                Ok(None)
            }
            ServerEvent::OnlineUsers(entries) => {
                self.roster.replace(entries);
                Ok(None)
            }
            ServerEvent::UserStatusChange { user_id, status } => {
                self.roster.set_status(&user_id, status);
                Ok(None)
            }
            ServerEvent::RoomsList(rooms) => {
                self.rooms.replace(rooms);
                Ok(None)
            }
            ServerEvent::RoomCreated(room) => {
                let notice = Notice::Info(format!("Room '{}' created", room.name));
                self.rooms.upsert(room);
                Ok(Some(notice))
            }
            ServerEvent::RoomDeleted { room_id } => {
                self.rooms.remove(&room_id);
                if self.registry.get(&room_id).is_some() {
                    self.registry.close(&room_id);
                    return Ok(Some(Notice::RoomClosed {
                        room_id,
                        reason: "the room was deleted".to_string(),
                    }));
                }
                Ok(None)
            }
            ServerEvent::LastRoomMessages { room_id, messages } => {
                let history = messages.into_iter().map(message_from_wire).collect();
                self.registry.replace_room_history(&room_id, history);
                Ok(None)
            }
            ServerEvent::RoomMessage {
                room_id,
                sender,
                content,
                file,
            } => {
                self.registry
                    .record_room_message(&room_id, Message::new(sender, content, file));
                Ok(None)
            }
            ServerEvent::RoomUsers { room_id, users } => {
                self.registry.set_room_participants(&room_id, users);
                Ok(None)
            }
            ServerEvent::Kicked { room_id } => {
                self.registry.close(&room_id);
                Ok(Some(Notice::RoomClosed {
                    room_id,
                    reason: "you were kicked".to_string(),
                }))
            }
            ServerEvent::Banned { room_id } => {
                self.registry.close(&room_id);
                Ok(Some(Notice::RoomClosed {
                    room_id,
                    reason: "you were banned".to_string(),
                }))
            }
            ServerEvent::Signal { from, signal } => {
                match self.call.as_mut() {
                    Some(call) => call.handle_signal(&from, signal).await?,
                    None => debug!("Ignoring call signal from {} (no call in progress)", from),
                }
                Ok(None)
            }
            ServerEvent::Logged { .. } | ServerEvent::ReconnectFailed => {
                // authentication already happened; a stray outcome is noise
                warn!("Ignoring late authentication event");
                Ok(None)
            }
        }
    }

    /// Apply every buffered event without blocking
    pub async fn drain_events(&mut self) -> Result<Vec<Notice>> {
        let mut notices = Vec::new();
        while let Some(event) = self.conn.try_next_event() {
            if let Some(notice) = self.handle_event(event).await? {
                notices.push(notice);
            }
        }
        Ok(notices)
    }

    /// Open (or re-focus) a private conversation
    pub fn open_private(&mut self, counterpart: &User) {
        self.registry.open_private(counterpart);
    }

    /// Focus an open session; unknown keys are a no-op
    pub fn focus(&mut self, key: &str) {
        self.registry.set_active(key);
    }

    /// Close an open session, leaving the room on the server side first
    /// when it is a room session
    pub async fn close_session(&mut self, key: &str) -> Result<()> {
        if let Some(session) = self.registry.get(key) {
            if session.kind == SessionKind::Room {
                self.conn
                    .send(ClientCommand::LeaveRoom {
                        user_id: self.user.id.clone(),
                        room_id: key.to_string(),
                    })
                    .await?;
            }
        }
        self.registry.close(key);
        Ok(())
    }

    /// Send a private message to the active session's counterpart
    ///
    /// # Errors
    ///
    /// Returns a validation error when the active session is not a private
    /// conversation or the message is empty.
    pub async fn send_private(
        &mut self,
        content: Option<String>,
        attachment_url: Option<String>,
    ) -> Result<()> {
        let active = self.registry.active();
        if active.kind != SessionKind::Private {
            return Err(PalaverError::validation(
                "session",
                "the active session is not a private conversation",
            )
            .into());
        }
        if content.as_deref().map_or(true, str::is_empty) && attachment_url.is_none() {
            return Err(PalaverError::validation("message", "nothing to send").into());
        }
        let receiver_id = active.key.clone();

        self.conn
            .send(ClientCommand::PrivateMessage {
                sender_id: self.user.id.clone(),
                receiver_id: receiver_id.clone(),
                message: content.clone(),
                file: attachment_url.clone(),
            })
            .await?;
        self.registry.record_outbound_message(
            &receiver_id,
            Message::new(self.user.clone(), content, attachment_url),
        );

        if self.typing.message_sent() == Some(TypingSignal::Stop) {
            if let Some(peer) = self.typing_peer.take() {
                self.conn
                    .send(ClientCommand::StopTyping { recipient_id: peer })
                    .await?;
            }
        }
        Ok(())
    }

    /// Join a room: opens the session locally and announces the join
    pub async fn join_room(&mut self, room: &Room) -> Result<()> {
        self.registry.open_room(room);
        self.conn
            .send(ClientCommand::JoinRoom {
                user_id: self.user.id.clone(),
                room_id: room.id.clone(),
            })
            .await
    }

    /// Send a message to the active room session
    pub async fn send_room_message(
        &mut self,
        content: Option<String>,
        attachment_url: Option<String>,
    ) -> Result<()> {
        let active = self.registry.active();
        if active.kind != SessionKind::Room {
            return Err(
                PalaverError::validation("session", "the active session is not a room").into(),
            );
        }
        if content.as_deref().map_or(true, str::is_empty) && attachment_url.is_none() {
            return Err(PalaverError::validation("message", "nothing to send").into());
        }
        let room_id = active.key.clone();
        self.conn
            .send(ClientCommand::SendRoomMessage {
                room_id,
                user_id: self.user.id.clone(),
                message: content,
                file: attachment_url,
            })
            .await
    }

    /// Forward a slash command typed in a room to the server
    ///
    /// The server owns moderation semantics (`/kick`, `/ban`, ...); the
    /// client relays the raw command text.
    pub async fn send_room_command(&mut self, command: &str) -> Result<()> {
        let active = self.registry.active();
        if active.kind != SessionKind::Room {
            return Err(
                PalaverError::validation("session", "the active session is not a room").into(),
            );
        }
        let room_id = active.key.clone();
        self.conn
            .send(ClientCommand::SlashCommand {
                command: command.to_string(),
                room_id,
                user_id: self.user.id.clone(),
            })
            .await
    }

    /// Ask the server to create a room
    pub async fn create_room(&mut self, name: &str, visibility: RoomVisibility) -> Result<()> {
        if name.trim().is_empty() {
            return Err(PalaverError::validation("name", "room name is required").into());
        }
        self.conn
            .send(ClientCommand::CreateRoom {
                name: name.trim().to_string(),
                visibility,
            })
            .await
    }

    /// Ask for a fresh roster without waiting for the reply
    ///
    /// The `onlineUsers` push lands through a later drain.
    pub async fn refresh_roster(&mut self) -> Result<()> {
        self.conn.send(ClientCommand::GetOnlineUsers).await
    }

    /// Ask for a fresh room list without waiting for the reply
    pub async fn refresh_rooms(&mut self) -> Result<()> {
        self.conn.send(ClientCommand::GetRooms).await
    }

    /// Refresh the roster and wait (up to `wait`) for the reply to land
    ///
    /// Unrelated events arriving first are applied normally; their notices
    /// are returned. On timeout the roster keeps its previous contents.
    pub async fn sync_roster(&mut self, wait: Duration) -> Result<Vec<Notice>> {
        self.refresh_roster().await?;
        self.apply_until(wait, |e| matches!(e, ServerEvent::OnlineUsers(_)))
            .await
    }

    /// Refresh the room list and wait (up to `wait`) for the reply to land
    pub async fn sync_rooms(&mut self, wait: Duration) -> Result<Vec<Notice>> {
        self.refresh_rooms().await?;
        self.apply_until(wait, |e| matches!(e, ServerEvent::RoomsList(_)))
            .await
    }

    /// Apply inbound events until one matches `done`, the deadline passes,
    /// or the connection closes
    async fn apply_until(
        &mut self,
        wait: Duration,
        done: impl Fn(&ServerEvent) -> bool,
    ) -> Result<Vec<Notice>> {
        let deadline = tokio::time::Instant::now() + wait;
        let mut notices = Vec::new();
        loop {
            let event =
                match tokio::time::timeout_at(deadline, self.conn.next_event()).await {
                    Ok(Some(event)) => event,
                    // closed or timed out: the caller renders what it has
                    Ok(None) | Err(_) => return Ok(notices),
                };
            let finished = done(&event);
            if let Some(notice) = self.handle_event(event).await? {
                notices.push(notice);
            }
            if finished {
                return Ok(notices);
            }
        }
    }

    /// Record a keystroke toward the active private session
    ///
    /// Announces `typing` on the first keystroke of a burst. Keystrokes
    /// outside a private session are ignored.
    pub async fn keystroke(&mut self, now: Instant) -> Result<()> {
        let active = self.registry.active();
        if active.kind != SessionKind::Private {
            return Ok(());
        }
        let peer = active.key.clone();
        if self.typing.keystroke(now) == Some(TypingSignal::Start) {
            self.typing_peer = Some(peer.clone());
            self.conn
                .send(ClientCommand::Typing { recipient_id: peer })
                .await?;
        }
        Ok(())
    }

    /// Check the typing idle deadline, announcing `stopTyping` when it
    /// elapses
    pub async fn poll_typing(&mut self, now: Instant) -> Result<()> {
        if self.typing.poll(now) == Some(TypingSignal::Stop) {
            if let Some(peer) = self.typing_peer.take() {
                self.conn
                    .send(ClientCommand::StopTyping { recipient_id: peer })
                    .await?;
            }
        }
        Ok(())
    }

    /// Start a call with a counterpart, sending the opening payload
    ///
    /// # Errors
    ///
    /// Returns a validation error when a call is already in progress.
    pub async fn start_call(
        &mut self,
        call: CallSession,
        opening_signal: serde_json::Value,
    ) -> Result<()> {
        if self.call.is_some() {
            return Err(PalaverError::validation("call", "a call is already in progress").into());
        }
        let command = call.outbound(opening_signal);
        self.call = Some(call);
        self.conn.send(command).await
    }

    /// Whether a call is in progress
    pub fn in_call(&self) -> bool {
        self.call.is_some()
    }

    /// End the current call, if any
    pub async fn hang_up(&mut self) -> Result<()> {
        if let Some(call) = self.call.take() {
            call.hang_up().await?;
        }
        Ok(())
    }

    /// Announce departure; called once when the shell exits
    pub async fn shutdown(&mut self) -> Result<()> {
        self.hang_up().await?;
        self.conn
            .send(ClientCommand::UserOffline {
                user_id: self.user.id.clone(),
            })
            .await
    }
}

fn message_from_wire(wire: WireMessage) -> Message {
    Message::new(wire.sender, wire.content, wire.file)
}
