//! Command-line interface definition for Palaver
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the interactive chat shell, profile management,
//! file uploads, and logout.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Palaver - terminal client for an anonymous real-time chat service
///
/// Log in with a pseudonym, join public and private rooms, exchange
/// private messages and files, all from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "palaver")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to the platform config dir)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Palaver
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive chat shell
    Chat {
        /// Pseudonym to log in with (prompted interactively when omitted
        /// and no stored session token exists)
        #[arg(short, long)]
        nickname: Option<String>,

        /// Declared age (13-99)
        #[arg(short, long)]
        age: Option<u8>,

        /// Declared gender (man, woman)
        #[arg(short, long)]
        gender: Option<String>,

        /// City name to search for during login
        #[arg(long)]
        city: Option<String>,

        /// Ignore any stored session token and force a fresh login
        #[arg(long)]
        fresh: bool,
    },

    /// Inspect or update the user profile
    Profile {
        /// Profile subcommand
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Upload a file and print its durable URL
    Upload {
        /// Path of the file to upload
        file: PathBuf,
    },

    /// Forget the stored session token
    Logout,
}

/// Profile management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// Show a user's profile
    Show {
        /// User id to look up
        #[arg(short, long)]
        user_id: String,
    },

    /// Update the logged-in user's profile
    Update {
        /// User id to update
        #[arg(short, long)]
        user_id: String,

        /// New biography text
        #[arg(short, long)]
        bio: Option<String>,

        /// Path of an image to upload and set as avatar
        #[arg(short, long)]
        avatar: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_chat_command() {
        let cli = Cli::try_parse_from(["palaver", "chat"]);
        assert!(cli.is_ok());
        let cli = cli.unwrap();
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }

    #[test]
    fn test_cli_parse_chat_with_nickname() {
        let cli = Cli::try_parse_from(["palaver", "chat", "--nickname", "ana"]).unwrap();
        if let Commands::Chat { nickname, fresh, .. } = cli.command {
            assert_eq!(nickname, Some("ana".to_string()));
            assert!(!fresh);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_chat_fresh() {
        let cli = Cli::try_parse_from(["palaver", "chat", "--fresh"]).unwrap();
        if let Commands::Chat { fresh, .. } = cli.command {
            assert!(fresh);
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_parse_upload() {
        let cli = Cli::try_parse_from(["palaver", "upload", "photo.png"]).unwrap();
        if let Commands::Upload { file } = cli.command {
            assert_eq!(file, PathBuf::from("photo.png"));
        } else {
            panic!("Expected Upload command");
        }
    }

    #[test]
    fn test_cli_parse_profile_show() {
        let cli = Cli::try_parse_from(["palaver", "profile", "show", "--user-id", "u1"]).unwrap();
        if let Commands::Profile { command } = cli.command {
            assert!(matches!(command, ProfileCommand::Show { user_id } if user_id == "u1"));
        } else {
            panic!("Expected Profile command");
        }
    }

    #[test]
    fn test_cli_parse_profile_update_with_bio() {
        let cli = Cli::try_parse_from([
            "palaver", "profile", "update", "--user-id", "u1", "--bio", "hello",
        ])
        .unwrap();
        if let Commands::Profile {
            command: ProfileCommand::Update { user_id, bio, avatar },
        } = cli.command
        {
            assert_eq!(user_id, "u1");
            assert_eq!(bio, Some("hello".to_string()));
            assert!(avatar.is_none());
        } else {
            panic!("Expected Profile Update command");
        }
    }

    #[test]
    fn test_cli_parse_logout() {
        let cli = Cli::try_parse_from(["palaver", "logout"]).unwrap();
        assert!(matches!(cli.command, Commands::Logout));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["palaver"]).is_err());
    }
}
