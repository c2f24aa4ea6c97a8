//! Command handlers

mod account;
mod checks;
mod profile;

use anyhow::{Context, Result};
use url::Url;
use voyage_core::{Config, Portal, SessionManager};

use crate::cli::{Cli, Commands, SessionCommand};

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        // Credential checks are purely local
        Commands::CheckPassword { password, json } => checks::password(&password, json),
        Commands::CheckEmail { email, json } => checks::email(&email, json),
        Commands::Session(command) => {
            let portal = open_portal(cli.api_url.as_deref())?;
            run(portal.session_manager(), command).await
        }
    }
}

async fn run(sessions: &SessionManager, command: SessionCommand) -> Result<()> {
    sessions.on_state_change(|change| {
        tracing::info!(
            authenticated = change.authenticated,
            user = ?change.user.as_ref().and_then(|u| u.email.as_deref()),
            "Auth state changed"
        );
    });

    match command {
        SessionCommand::Status => account::status(sessions),
        SessionCommand::Login { email, password } => {
            account::login(sessions, email, password).await
        }
        SessionCommand::Register(args) => account::register(sessions, args).await,
        SessionCommand::Logout => account::logout(sessions).await,
        SessionCommand::Verify => account::verify(sessions).await,
        SessionCommand::Refresh => account::refresh(sessions).await,
        SessionCommand::Profile { json } => profile::show(sessions, json).await,
        SessionCommand::UpdateProfile(args) => profile::update(sessions, args).await,
        SessionCommand::ForgotPassword { email } => {
            profile::forgot_password(sessions, &email).await
        }
        SessionCommand::ResetPassword {
            token,
            new_password,
        } => profile::reset_password(sessions, &token, &new_password).await,
    }
}

fn open_portal(api_url: Option<&str>) -> Result<Portal> {
    let mut config = Config::from_env().context("Failed to load configuration")?;

    if let Some(raw) = api_url {
        config.api_base_url =
            Url::parse(raw).with_context(|| format!("Invalid --api-url: {raw}"))?;
    }

    Portal::new(config).context("Failed to open local session store")
}
