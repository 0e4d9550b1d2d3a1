/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint.

It exposes three areas:

- `chat`    — the interactive chat shell
- `profile` — profile, upload, and logout handlers
- `special` — the slash command parser used inside the shell

The handlers are intentionally small and use the library components:
the client, the connection layer, and the HTTP collaborators.
*/

pub mod chat;
pub mod profile;
pub mod special;

pub use chat::{run_chat, LoginArgs};
pub use profile::{run_logout, run_profile_show, run_profile_update, run_upload};
pub use special::{parse_slash_command, print_help, CommandError, SlashCommand};
