//! Non-interactive command handlers
//!
//! Profile inspection and updates, standalone uploads, and logout run
//! without the chat shell; they talk straight to the HTTP collaborators
//! and the token store.

use crate::api::{ProfileClient, ProfileUpdate, UploadClient};
use crate::auth::TokenStore;
use crate::config::Config;
use crate::error::Result;
use std::path::Path;

/// Show a user's profile
pub async fn run_profile_show(config: &Config, user_id: &str) -> Result<()> {
    let profile = ProfileClient::new(&config.server)?.get(user_id).await?;
    println!("bio:    {}", profile.bio.as_deref().unwrap_or("-"));
    println!("avatar: {}", profile.avatar_url.as_deref().unwrap_or("-"));
    Ok(())
}

/// Update a user's profile
///
/// The avatar path, when given, is uploaded first; the resulting durable
/// URL is what the profile stores.
pub async fn run_profile_update(
    config: &Config,
    user_id: &str,
    bio: Option<String>,
    avatar: Option<&Path>,
) -> Result<()> {
    let avatar_url = match avatar {
        Some(path) => Some(UploadClient::new(&config.server)?.upload(path).await?),
        None => None,
    };
    let update = ProfileUpdate { bio, avatar_url };
    let profile = ProfileClient::new(&config.server)?
        .update(user_id, &update)
        .await?;
    println!("Profile updated.");
    println!("bio:    {}", profile.bio.as_deref().unwrap_or("-"));
    println!("avatar: {}", profile.avatar_url.as_deref().unwrap_or("-"));
    Ok(())
}

/// Upload a file and print its durable URL
pub async fn run_upload(config: &Config, file: &Path) -> Result<()> {
    let url = UploadClient::new(&config.server)?.upload(file).await?;
    println!("{}", url);
    Ok(())
}

/// Forget the stored session token
pub fn run_logout() -> Result<()> {
    TokenStore::new().clear()?;
    println!("Logged out.");
    Ok(())
}
