//! Wire model for the realtime channel
//!
//! Both directions are closed tagged unions serialized as
//! `{"event": "...", "data": {...}}` envelopes, so every event the server
//! contract defines has a typed payload and dispatch is exhaustive at
//! compile time. Event and field names follow the server contract
//! (camelCase).

use crate::session::MessageKind;
use crate::types::{Room, RoomVisibility, User};
use serde::{Deserialize, Serialize};

/// Commands the client sends to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientCommand {
    /// Pseudonym login with the declared fields
    #[serde(rename_all = "camelCase")]
    Login {
        nickname: String,
        gender: crate::types::Gender,
        age: u8,
        city: crate::types::City,
    },
    /// Resume a previous session with a stored token
    Reconnect { token: String },
    /// Presence announcements around the chat surface lifecycle
    #[serde(rename_all = "camelCase")]
    UserOnline { user_id: String },
    #[serde(rename_all = "camelCase")]
    UserOffline { user_id: String },
    /// Send a private message; `file` is a durable upload URL
    #[serde(rename_all = "camelCase")]
    PrivateMessage {
        sender_id: String,
        receiver_id: String,
        message: Option<String>,
        file: Option<String>,
    },
    /// Typing indicator for a private conversation
    #[serde(rename_all = "camelCase")]
    Typing { recipient_id: String },
    #[serde(rename_all = "camelCase")]
    StopTyping { recipient_id: String },
    #[serde(rename_all = "camelCase")]
    JoinRoom { user_id: String, room_id: String },
    #[serde(rename_all = "camelCase")]
    LeaveRoom { user_id: String, room_id: String },
    #[serde(rename_all = "camelCase")]
    SendRoomMessage {
        room_id: String,
        user_id: String,
        message: Option<String>,
        file: Option<String>,
    },
    /// Server-side slash command typed inside a room (`/kick`, `/ban`, ...)
    #[serde(rename_all = "camelCase")]
    SlashCommand {
        command: String,
        room_id: String,
        user_id: String,
    },
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        name: String,
        #[serde(rename = "type")]
        visibility: RoomVisibility,
    },
    GetRooms,
    GetOnlineUsers,
    /// Relay a peer-to-peer negotiation payload to another user
    #[serde(rename_all = "camelCase")]
    Signal {
        to: String,
        signal: serde_json::Value,
    },
}

/// One entry of the online roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The online user
    pub user: User,
    /// Distance from the logged-in user, in meters
    #[serde(default)]
    pub distance: f64,
    /// Presence status as reported by the server
    #[serde(default)]
    pub status: String,
}

/// A message as carried on the wire (room backlog and live room traffic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Snapshot of the sender
    pub sender: User,
    /// Message text
    #[serde(default)]
    pub content: Option<String>,
    /// Durable upload URL
    #[serde(default)]
    pub file: Option<String>,
}

/// Events the server pushes to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Login or reconnect succeeded; the token replaces any stored one
    Logged { user: User, token: String },
    /// The presented reconnect token was rejected
    ReconnectFailed,
    /// Inbound private message. `kind` is `system` for server notices,
    /// in which case `code` identifies the notice.
    #[serde(rename_all = "camelCase")]
    PrivateMessage {
        sender: User,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        file: Option<String>,
        #[serde(rename = "type", default)]
        kind: MessageKind,
        #[serde(default)]
        code: Option<String>,
    },
    Typing { user: User },
    StopTyping { user: User },
    /// Full roster replacement
    OnlineUsers(Vec<RosterEntry>),
    #[serde(rename_all = "camelCase")]
    UserStatusChange { user_id: String, status: String },
    RoomsList(Vec<Room>),
    RoomCreated(Room),
    #[serde(rename_all = "camelCase")]
    RoomDeleted { room_id: String },
    /// Recent backlog delivered on room join
    #[serde(rename_all = "camelCase")]
    LastRoomMessages {
        room_id: String,
        messages: Vec<WireMessage>,
    },
    /// Live room traffic
    #[serde(rename_all = "camelCase")]
    RoomMessage {
        room_id: String,
        sender: User,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        file: Option<String>,
    },
    /// Room participant roster replacement
    #[serde(rename_all = "camelCase")]
    RoomUsers { room_id: String, users: Vec<User> },
    #[serde(rename_all = "camelCase")]
    Kicked { room_id: String },
    #[serde(rename_all = "camelCase")]
    Banned { room_id: String },
    /// Peer-to-peer negotiation payload relayed from another user
    #[serde(rename_all = "camelCase")]
    Signal {
        from: String,
        signal: serde_json::Value,
    },
}

/// System notice codes carried by `privateMessage` events with a `system`
/// kind, mapped to display text on the client.
pub fn system_notice_text(code: &str) -> Option<&'static str> {
    match code {
        "USER_OFFLINE" => Some("This user is offline"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gender;
    use serde_json::json;

    #[test]
    fn test_client_command_envelope_shape() {
        let cmd = ClientCommand::Typing {
            recipient_id: "u2".to_string(),
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["event"], "typing");
        assert_eq!(value["data"]["recipientId"], "u2");
    }

    #[test]
    fn test_login_command_field_names() {
        let cmd = ClientCommand::Login {
            nickname: "ana".to_string(),
            gender: Gender::Woman,
            age: 27,
            city: crate::types::City {
                name: "Lyon".to_string(),
                code: "69123".to_string(),
            },
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["event"], "login");
        assert_eq!(value["data"]["nickname"], "ana");
        assert_eq!(value["data"]["gender"], "woman");
        assert_eq!(value["data"]["city"]["code"], "69123");
    }

    #[test]
    fn test_private_message_command() {
        let cmd = ClientCommand::PrivateMessage {
            sender_id: "me".to_string(),
            receiver_id: "u2".to_string(),
            message: Some("hi".to_string()),
            file: None,
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["event"], "privateMessage");
        assert_eq!(value["data"]["senderId"], "me");
        assert_eq!(value["data"]["receiverId"], "u2");
    }

    #[test]
    fn test_create_room_uses_type_field() {
        let cmd = ClientCommand::CreateRoom {
            name: "mine".to_string(),
            visibility: RoomVisibility::Private,
        };
        let value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(value["event"], "createRoom");
        assert_eq!(value["data"]["type"], "private");
    }

    #[test]
    fn test_server_event_logged_roundtrip() {
        let raw = json!({
            "event": "logged",
            "data": {
                "user": {"id": "u1", "nickname": "ana", "gender": "woman", "age": 27},
                "token": "tok-1"
            }
        });
        let event: ServerEvent = serde_json::from_value(raw).unwrap();
        match event {
            ServerEvent::Logged { user, token } => {
                assert_eq!(user.id, "u1");
                assert_eq!(token, "tok-1");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_private_message_defaults() {
        let raw = json!({
            "event": "privateMessage",
            "data": {
                "sender": {"id": "u2", "nickname": "bob", "gender": "man", "age": 30},
                "message": "hello"
            }
        });
        let event: ServerEvent = serde_json::from_value(raw).unwrap();
        match event {
            ServerEvent::PrivateMessage { kind, code, message, .. } => {
                assert_eq!(kind, MessageKind::User);
                assert!(code.is_none());
                assert_eq!(message.as_deref(), Some("hello"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_system_private_message() {
        let raw = json!({
            "event": "privateMessage",
            "data": {
                "sender": {"id": "u2", "nickname": "bob", "gender": "man", "age": 30},
                "type": "system",
                "code": "USER_OFFLINE"
            }
        });
        let event: ServerEvent = serde_json::from_value(raw).unwrap();
        match event {
            ServerEvent::PrivateMessage { kind, code, .. } => {
                assert_eq!(kind, MessageKind::System);
                assert_eq!(code.as_deref(), Some("USER_OFFLINE"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_room_message() {
        let raw = json!({
            "event": "roomMessage",
            "data": {
                "roomId": "r1",
                "sender": {"id": "u2", "nickname": "bob", "gender": "man", "age": 30},
                "content": "hey room"
            }
        });
        let event: ServerEvent = serde_json::from_value(raw).unwrap();
        match event {
            ServerEvent::RoomMessage {
                room_id, content, file, ..
            } => {
                assert_eq!(room_id, "r1");
                assert_eq!(content.as_deref(), Some("hey room"));
                assert!(file.is_none());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_server_event_online_users() {
        let raw = json!({
            "event": "onlineUsers",
            "data": [
                {"user": {"id": "u2", "nickname": "bob", "gender": "man", "age": 30},
                 "distance": 12000.0, "status": "online"}
            ]
        });
        let event: ServerEvent = serde_json::from_value(raw).unwrap();
        match event {
            ServerEvent::OnlineUsers(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].user.nickname, "bob");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unit_event_roundtrip() {
        let event = ServerEvent::ReconnectFailed;
        let text = serde_json::to_string(&event).unwrap();
        let back: ServerEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_signal_payload_is_opaque() {
        let raw = json!({
            "event": "signal",
            "data": {"from": "u2", "signal": {"sdp": "v=0", "type": "offer"}}
        });
        let event: ServerEvent = serde_json::from_value(raw).unwrap();
        match event {
            ServerEvent::Signal { from, signal } => {
                assert_eq!(from, "u2");
                assert_eq!(signal["type"], "offer");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_system_notice_text() {
        assert_eq!(system_notice_text("USER_OFFLINE"), Some("This user is offline"));
        assert_eq!(system_notice_text("SOMETHING_ELSE"), None);
    }
}
