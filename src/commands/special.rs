//! Slash command parser for the interactive chat shell
//!
//! This module parses the commands that can be entered during an
//! interactive chat session. Slash commands let users:
//! - List rooms and online users
//! - Open, focus, and close conversation tabs
//! - Send files and create rooms
//! - Inspect profiles and filter the roster
//!
//! Commands are prefixed with `/` and are case-insensitive. Input that
//! starts with `/` but matches no client command is not an error by
//! itself: inside a room it is forwarded to the server, which owns
//! moderation commands like `/kick`.

use crate::roster::AgeBand;
use crate::types::{Gender, RoomVisibility};
use thiserror::Error;

/// Errors that can occur when parsing slash commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },
}

/// Commands handled by the chat shell itself
#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    /// List known rooms, public and private
    Rooms,

    /// List online users through the current roster filter
    Users,

    /// Join a room by name
    Join(String),

    /// Open (or focus) a private conversation by nickname
    Msg(String),

    /// List open tabs with their display labels
    Tabs,

    /// Focus a tab by position (1-based) or key
    Tab(String),

    /// Close a tab: the active one, or the one selected by position or key
    Close(Option<String>),

    /// Upload a file and send it to the active conversation
    SendFile(String),

    /// Create a room
    CreateRoom { name: String, visibility: RoomVisibility },

    /// Show a profile; defaults to the logged-in user
    Profile(Option<String>),

    /// Narrow the roster view by gender and age band
    Filter { gender: Option<Gender>, age_band: AgeBand },

    /// Display help information
    Help,

    /// Exit the session
    Quit,

    /// Input that starts with `/` but is not a client command; forwarded
    /// to the server when typed inside a room
    Server(String),

    /// Not a slash command; send as a message to the active conversation
    None,
}

/// Parse a line of shell input into a slash command
///
/// Command names are case-insensitive; arguments keep their case
/// (nicknames and room names are matched case-insensitively downstream).
///
/// # Errors
///
/// Returns `CommandError` when a known command is missing or given an
/// unusable argument.
///
/// # Examples
///
/// ```
/// use palaver::commands::{parse_slash_command, SlashCommand};
///
/// let cmd = parse_slash_command("/join General").unwrap();
/// assert_eq!(cmd, SlashCommand::Join("General".to_string()));
///
/// let cmd = parse_slash_command("hello there").unwrap();
/// assert_eq!(cmd, SlashCommand::None);
///
/// // unknown slash input is forwarded, not rejected
/// let cmd = parse_slash_command("/kick bob").unwrap();
/// assert_eq!(cmd, SlashCommand::Server("/kick bob".to_string()));
/// ```
pub fn parse_slash_command(input: &str) -> Result<SlashCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        if lower == "exit" || lower == "quit" {
            return Ok(SlashCommand::Quit);
        }
        return Ok(SlashCommand::None);
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default().to_lowercase();
    let rest = parts.next().map(str::trim).unwrap_or_default();

    match name.as_str() {
        "/rooms" => Ok(SlashCommand::Rooms),
        "/users" => Ok(SlashCommand::Users),
        "/tabs" => Ok(SlashCommand::Tabs),
        "/close" => Ok(SlashCommand::Close(if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        })),
        "/help" | "/?" => Ok(SlashCommand::Help),
        "/quit" | "/exit" => Ok(SlashCommand::Quit),

        "/join" => require_arg("/join", "/join <room name>", rest).map(SlashCommand::Join),
        "/msg" => require_arg("/msg", "/msg <nickname>", rest).map(SlashCommand::Msg),
        "/tab" => require_arg("/tab", "/tab <number|key>", rest).map(SlashCommand::Tab),
        "/send-file" => {
            require_arg("/send-file", "/send-file <path>", rest).map(SlashCommand::SendFile)
        }

        "/create-room" => {
            let (name, private) = match rest.strip_suffix("--private") {
                Some(name) => (name.trim(), true),
                None => (rest, false),
            };
            let name = require_arg("/create-room", "/create-room <name> [--private]", name)?;
            Ok(SlashCommand::CreateRoom {
                name,
                visibility: if private {
                    RoomVisibility::Private
                } else {
                    RoomVisibility::Public
                },
            })
        }

        "/profile" => Ok(SlashCommand::Profile(if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        })),

        "/filter" => parse_filter(rest),

        // anything else belongs to the server (moderation commands)
        _ => Ok(SlashCommand::Server(trimmed.to_string())),
    }
}

fn require_arg(command: &str, usage: &str, rest: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument {
            command: command.to_string(),
            usage: usage.to_string(),
        })
    } else {
        Ok(rest.to_string())
    }
}

fn parse_filter(rest: &str) -> Result<SlashCommand, CommandError> {
    let mut gender = None;
    let mut age_band = AgeBand::Any;
    for word in rest.split_whitespace() {
        match word.to_lowercase().as_str() {
            "all" | "any" => {}
            "man" | "men" => gender = Some(Gender::Man),
            "woman" | "women" => gender = Some(Gender::Woman),
            "under30" | "<30" => age_band = AgeBand::Under30,
            "30-50" => age_band = AgeBand::From30To50,
            "over50" | ">50" => age_band = AgeBand::Over50,
            other => {
                return Err(CommandError::UnsupportedArgument {
                    command: "/filter".to_string(),
                    arg: other.to_string(),
                })
            }
        }
    }
    Ok(SlashCommand::Filter { gender, age_band })
}

/// Print help for the shell commands
pub fn print_help() {
    println!("Available commands:");
    println!("  /rooms                      List public and private rooms");
    println!("  /users                      List online users (filtered)");
    println!("  /join <room name>           Join a room");
    println!("  /msg <nickname>             Open a private conversation");
    println!("  /tabs                       List open tabs");
    println!("  /tab <number|key>           Focus a tab");
    println!("  /close [number|key]         Close a tab (default: the active one)");
    println!("  /send-file <path>           Upload a file and send it here");
    println!("  /create-room <name> [--private]  Create a room");
    println!("  /profile [nickname]         Show a profile");
    println!("  /filter [man|woman|all] [under30|30-50|over50|any]");
    println!("                              Narrow the roster view");
    println!("  /help                       Show this help");
    println!("  /quit                       Leave the chat");
    println!();
    println!("Inside a room, other /commands are sent to the server (e.g. /kick).");
    println!("Anything else is sent as a message to the active tab.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_is_none() {
        assert_eq!(parse_slash_command("hello there").unwrap(), SlashCommand::None);
        assert_eq!(parse_slash_command("").unwrap(), SlashCommand::None);
    }

    #[test]
    fn test_parse_bare_words() {
        assert_eq!(parse_slash_command("quit").unwrap(), SlashCommand::Quit);
        assert_eq!(parse_slash_command("EXIT").unwrap(), SlashCommand::Quit);
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_slash_command("/rooms").unwrap(), SlashCommand::Rooms);
        assert_eq!(parse_slash_command("/USERS").unwrap(), SlashCommand::Users);
        assert_eq!(parse_slash_command("/tabs").unwrap(), SlashCommand::Tabs);
        assert_eq!(parse_slash_command("/close").unwrap(), SlashCommand::Close(None));
        assert_eq!(
            parse_slash_command("/close 2").unwrap(),
            SlashCommand::Close(Some("2".to_string()))
        );
        assert_eq!(parse_slash_command("/help").unwrap(), SlashCommand::Help);
        assert_eq!(parse_slash_command("/?").unwrap(), SlashCommand::Help);
    }

    #[test]
    fn test_parse_join_keeps_argument_case() {
        assert_eq!(
            parse_slash_command("/join General Chat").unwrap(),
            SlashCommand::Join("General Chat".to_string())
        );
    }

    #[test]
    fn test_parse_join_requires_argument() {
        assert!(matches!(
            parse_slash_command("/join"),
            Err(CommandError::MissingArgument { .. })
        ));
    }

    #[test]
    fn test_parse_msg() {
        assert_eq!(
            parse_slash_command("/msg Ana").unwrap(),
            SlashCommand::Msg("Ana".to_string())
        );
    }

    #[test]
    fn test_parse_create_room_public() {
        assert_eq!(
            parse_slash_command("/create-room My Room").unwrap(),
            SlashCommand::CreateRoom {
                name: "My Room".to_string(),
                visibility: RoomVisibility::Public,
            }
        );
    }

    #[test]
    fn test_parse_create_room_private() {
        assert_eq!(
            parse_slash_command("/create-room Hideout --private").unwrap(),
            SlashCommand::CreateRoom {
                name: "Hideout".to_string(),
                visibility: RoomVisibility::Private,
            }
        );
    }

    #[test]
    fn test_parse_create_room_requires_name() {
        assert!(parse_slash_command("/create-room").is_err());
        assert!(parse_slash_command("/create-room --private").is_err());
    }

    #[test]
    fn test_parse_profile_optional_argument() {
        assert_eq!(
            parse_slash_command("/profile").unwrap(),
            SlashCommand::Profile(None)
        );
        assert_eq!(
            parse_slash_command("/profile ana").unwrap(),
            SlashCommand::Profile(Some("ana".to_string()))
        );
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_slash_command("/filter woman under30").unwrap(),
            SlashCommand::Filter {
                gender: Some(Gender::Woman),
                age_band: AgeBand::Under30,
            }
        );
        assert_eq!(
            parse_slash_command("/filter all").unwrap(),
            SlashCommand::Filter {
                gender: None,
                age_band: AgeBand::Any,
            }
        );
        assert!(parse_slash_command("/filter martian").is_err());
    }

    #[test]
    fn test_unknown_slash_command_is_forwarded() {
        assert_eq!(
            parse_slash_command("/kick bob").unwrap(),
            SlashCommand::Server("/kick bob".to_string())
        );
        assert_eq!(
            parse_slash_command("/ban bob spamming").unwrap(),
            SlashCommand::Server("/ban bob spamming".to_string())
        );
    }
}
