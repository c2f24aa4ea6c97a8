//! Login, registration and token commands

use anyhow::{bail, Result};
use voyage_core::{Credentials, Registration, SessionManager};

use crate::cli::RegisterArgs;

pub fn status(sessions: &SessionManager) -> Result<()> {
    match sessions.user() {
        Some(user) if sessions.is_authenticated() => {
            println!("Logged in as {}", user.display_name());
            if sessions.refresh_token().is_none() {
                println!("(no refresh token; you will need to log in again when it expires)");
            }
        }
        _ => println!("Not logged in"),
    }
    println!("Server: {}", sessions.api().base_url());
    Ok(())
}

pub async fn login(sessions: &SessionManager, email: String, password: String) -> Result<()> {
    let session = sessions.login(&Credentials::new(email, password)).await?;

    let name = session
        .user
        .as_ref()
        .map(|u| u.display_name())
        .unwrap_or_default();
    println!("Welcome back, {name}");
    Ok(())
}

pub async fn register(sessions: &SessionManager, args: RegisterArgs) -> Result<()> {
    let registration = Registration {
        email: args.email,
        password: args.password,
        first_name: args.first_name,
        last_name: args.last_name,
        phone: args.phone,
        ..Default::default()
    };

    let session = sessions.register(&registration).await?;

    let name = session
        .user
        .as_ref()
        .map(|u| u.display_name())
        .unwrap_or_default();
    println!("Account created. Welcome, {name}");
    Ok(())
}

pub async fn logout(sessions: &SessionManager) -> Result<()> {
    sessions.logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn verify(sessions: &SessionManager) -> Result<()> {
    if sessions.token().is_none() {
        bail!("Not logged in");
    }
    if !sessions.verify_token().await? {
        bail!("Session is no longer valid; please log in again");
    }
    println!("Session is valid");
    Ok(())
}

pub async fn refresh(sessions: &SessionManager) -> Result<()> {
    if sessions.refresh_token().is_none() {
        bail!("No refresh token stored; please log in again");
    }
    if !sessions.refresh_auth_token().await? {
        bail!("Could not refresh the session; please log in again");
    }
    println!("Session refreshed");
    Ok(())
}
