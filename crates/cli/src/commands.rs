/// Authentication commands for configuring GitHub access
pub mod auth;
/// Commit status evaluation commands
pub mod check_commit;
/// Pull request status evaluation commands
pub mod check_pr;
/// Configuration management commands
pub mod config_cmd;

use keyring::Entry;
use merge_sentinel_github::github::{create_app_client, create_token_client};
use octocrab::Octocrab;
use std::fs;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{get_config_path, AppConfig};
use crate::errors::CliError;
use auth::{
    KEY_RING_APP_ID, KEY_RING_APP_PRIVATE_KEY_PATH, KEY_RING_SERVICE_NAME, KEY_RING_USER_TOKEN,
};

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

/// Load the configuration file, falling back to defaults when none exists
fn load_config(path: Option<&str>) -> Result<AppConfig, CliError> {
    let config_path = get_config_path(path);
    if config_path.exists() {
        AppConfig::load(&config_path)
    } else {
        debug!("No configuration file found; using defaults");
        Ok(AppConfig::default())
    }
}

/// Split an `owner/name` repository argument into its two parts
fn split_repository(repo: &str) -> Result<(String, String), CliError> {
    let parts: Vec<&str> = repo.split('/').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(CliError::InvalidArguments(format!(
            "Expected a repository in owner/name form, got: {}",
            repo
        )));
    }

    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// Creates a GitHub client based on the configured authentication method.
///
/// The credentials are retrieved from the system keyring, where the
/// `auth` command stores them. With the `token` method a personal access
/// token authenticates the client; with the `app` method the stored app
/// ID and private key path are used instead.
fn create_github_client(config: &AppConfig) -> Result<Octocrab, CliError> {
    match config.authentication.auth_method.as_str() {
        "token" => {
            debug!("Using personal access token authentication");
            let token = Entry::new(KEY_RING_SERVICE_NAME, KEY_RING_USER_TOKEN)
                .map_err(|e| {
                    CliError::AuthError(format!("Failed to create an entry in the keyring: {}", e))
                })?
                .get_password()
                .map_err(|e| {
                    CliError::AuthError(format!("Failed to get the token from the keyring: {}", e))
                })?;

            create_token_client(&token).map_err(|e| {
                CliError::AuthError(format!("Failed to create the GitHub client. Error was: {}", e))
            })
        }
        "app" => {
            info!("Using GitHub App authentication");
            let app_id = Entry::new(KEY_RING_SERVICE_NAME, KEY_RING_APP_ID)
                .map_err(|e| {
                    CliError::AuthError(format!("Failed to create an entry in the keyring: {}", e))
                })?
                .get_password()
                .map_err(|e| {
                    CliError::AuthError(format!("Failed to get app ID from the keyring: {}", e))
                })?;

            let app_key_path = Entry::new(KEY_RING_SERVICE_NAME, KEY_RING_APP_PRIVATE_KEY_PATH)
                .map_err(|e| {
                    CliError::AuthError(format!("Failed to create an entry in the keyring: {}", e))
                })?
                .get_password()
                .map_err(|e| {
                    CliError::AuthError(format!(
                        "Failed to get app key location from the keyring: {}",
                        e
                    ))
                })?;

            let app_key = fs::read_to_string(app_key_path).map_err(|e| {
                CliError::ConfigError(format!(
                    "Failed to load the app key from the provided file: {}",
                    e
                ))
            })?;

            let app_id_number = app_id.parse::<u64>().map_err(|e| {
                CliError::InvalidArguments(format!(
                    "Failed to parse the app ID. Expected a number, got {}. Error was: {}.",
                    app_id, e
                ))
            })?;

            create_app_client(app_id_number, &app_key).map_err(|e| {
                CliError::AuthError(format!("Failed to create the GitHub client. Error was: {}", e))
            })
        }
        other => Err(CliError::InvalidArguments(format!(
            "Unsupported authentication method: {}",
            other
        ))),
    }
}

/// Creates a cancellation token that trips when the process receives an
/// interrupt, so in-flight API requests stop instead of running to
/// completion after Ctrl-C.
fn cancellation_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Received interrupt; cancelling outstanding requests");
            signal_cancel.cancel();
        }
    });

    cancel
}
