//! Palaver - terminal chat client
//!
#![doc = "Palaver - terminal client for an anonymous real-time chat service"]
#![doc = "Main entry point for the Palaver application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use palaver::cli::{Cli, Commands, ProfileCommand};
use palaver::commands;
use palaver::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli
        .config
        .as_ref()
        .map(std::path::PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat {
            nickname,
            age,
            gender,
            city,
            fresh,
        } => {
            let args = commands::LoginArgs {
                nickname,
                age,
                gender,
                city,
            };
            commands::run_chat(config, args, fresh).await?;
            Ok(())
        }
        Commands::Profile { command } => match command {
            ProfileCommand::Show { user_id } => {
                commands::run_profile_show(&config, &user_id).await?;
                Ok(())
            }
            ProfileCommand::Update {
                user_id,
                bio,
                avatar,
            } => {
                commands::run_profile_update(&config, &user_id, bio, avatar.as_deref()).await?;
                Ok(())
            }
        },
        Commands::Upload { file } => {
            commands::run_upload(&config, &file).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::run_logout()?;
            Ok(())
        }
    }
}

/// Initialize the tracing subscriber
///
/// Respects `RUST_LOG` when set; `--verbose` raises the default level.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "palaver=debug" } else { "palaver=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
