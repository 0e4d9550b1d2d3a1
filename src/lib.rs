//! Palaver - terminal client library for an anonymous real-time chat service
//!
//! This library provides the core functionality of the Palaver client:
//! session management, the realtime connection layer, authentication, and
//! the HTTP collaborators for uploads, profiles, and city autocomplete.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Conversation sessions and the session registry
//! - `connection`: The realtime wire model and transports
//! - `client`: The logged-in client context and event reducer
//! - `auth`: Login, session resumption, and token storage
//! - `roster`: Online users, filters, and the room directory
//! - `typing`: The outbound typing indicator state machine
//! - `signaling`: Call signaling relay
//! - `api`: HTTP collaborators (upload, profile, geocoding)
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use palaver::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Config::default_path())?;
//!     config.validate()?;
//!
//!     // Client usage would go here
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod roster;
pub mod session;
pub mod signaling;
pub mod typing;
pub mod types;

// Re-export commonly used types
pub use client::{Client, Notice};
pub use config::Config;
pub use connection::{ClientCommand, Connection, ServerEvent};
pub use error::{PalaverError, Result};
pub use session::{Message, Session, SessionRegistry};
pub use types::{City, Gender, Room, RoomVisibility, User};
