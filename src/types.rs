//! Shared domain types for Palaver
//!
//! These are the denormalized shapes exchanged with the realtime server and
//! the HTTP collaborators: users, cities, rooms. Messages and sessions live
//! in the `session` module.

use serde::{Deserialize, Serialize};

/// A city as selected during login (from the municipality autocomplete)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct City {
    /// Display name of the municipality
    pub name: String,
    /// INSEE city code
    pub code: String,
}

/// Declared gender of a pseudonymous user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Man,
    Woman,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Man => write!(f, "man"),
            Self::Woman => write!(f, "woman"),
        }
    }
}

/// A pseudonymous user
///
/// Users are anonymous: there is no account, only a server-assigned id and
/// the fields declared at login. Copies of this struct embedded in messages
/// are snapshots, not live links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier
    pub id: String,
    /// Chosen pseudonym
    pub nickname: String,
    /// Declared gender
    pub gender: Gender,
    /// Declared age
    pub age: u8,
    /// Declared city
    #[serde(default)]
    pub city: City,
}

impl User {
    /// Creates a user with the given id and nickname and neutral defaults,
    /// mostly useful in tests and examples.
    pub fn new(id: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            nickname: nickname.into(),
            gender: Gender::Man,
            age: 18,
            city: City::default(),
        }
    }
}

/// Visibility of a chat room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomVisibility {
    Public,
    Private,
}

/// A chat room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Server-assigned identifier
    pub id: String,
    /// Room display name
    pub name: String,
    /// Public rooms are listed for everyone; private rooms are user-created
    #[serde(rename = "type")]
    pub visibility: RoomVisibility,
}

impl Room {
    /// Creates a public room, mostly useful in tests and examples.
    pub fn public(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visibility: RoomVisibility::Public,
        }
    }
}
