//! Profile and password recovery commands

use anyhow::{bail, Result};
use voyage_core::{ProfileUpdate, SessionManager, UserProfile};

use crate::cli::UpdateProfileArgs;

pub async fn show(sessions: &SessionManager, json: bool) -> Result<()> {
    if sessions.token().is_none() {
        bail!("Not logged in");
    }

    let Some(user) = sessions.get_user_profile().await? else {
        bail!("Could not load your profile; please log in again");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
    } else {
        print_profile(&user);
    }
    Ok(())
}

pub async fn update(sessions: &SessionManager, args: UpdateProfileArgs) -> Result<()> {
    let update = ProfileUpdate {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phone: args.phone,
        new_password: args.new_password,
    };

    let user = sessions.update_profile(&update).await?;
    println!("Profile updated");
    print_profile(&user);
    Ok(())
}

pub async fn forgot_password(sessions: &SessionManager, email: &str) -> Result<()> {
    let message = sessions.forgot_password(email).await?;
    println!("{message}");
    Ok(())
}

pub async fn reset_password(
    sessions: &SessionManager,
    token: &str,
    new_password: &str,
) -> Result<()> {
    let message = sessions.reset_password(token, new_password).await?;
    println!("{message}");
    Ok(())
}

fn print_profile(user: &UserProfile) {
    println!("Name:  {}", user.display_name());
    if let Some(email) = &user.email {
        println!("Email: {email}");
    }
    if let Some(phone) = &user.phone {
        println!("Phone: {phone}");
    }
}
