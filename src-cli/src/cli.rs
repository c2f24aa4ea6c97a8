use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "voyage")]
#[command(about = "Voyage - Manage your booking site account from the command line")]
#[command(version)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Auth API base URL (overrides VOYAGE_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Session(SessionCommand),

    /// Score a password against the sign-up rules (no network)
    CheckPassword {
        password: String,
        #[arg(long)]
        json: bool,
    },

    /// Check an email address the way sign-up does (no network)
    CheckEmail {
        email: String,
        #[arg(long)]
        json: bool,
    },
}

/// Commands that act on the stored session
#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Show who is logged in
    Status,

    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "VOYAGE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in
    Register(RegisterArgs),

    /// Log out and forget the stored session
    Logout,

    /// Check the stored token with the server (refreshing it if expired)
    Verify,

    /// Exchange the refresh token for a new access token
    Refresh,

    /// Fetch the current profile
    Profile {
        /// Print the raw profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update profile details or change password
    UpdateProfile(UpdateProfileArgs),

    /// Request a password reset email
    ForgotPassword {
        #[arg(short, long)]
        email: String,
    },

    /// Set a new password using a reset token
    ResetPassword {
        #[arg(long)]
        token: String,
        #[arg(long, env = "VOYAGE_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(short, long)]
    pub email: String,
    #[arg(short, long, env = "VOYAGE_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Args, Debug)]
pub struct UpdateProfileArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(short, long)]
    pub email: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long, env = "VOYAGE_NEW_PASSWORD", hide_env_values = true)]
    pub new_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_login() {
        let cli = Cli::try_parse_from([
            "voyage",
            "-v",
            "login",
            "--email",
            "ana@example.com",
            "--password",
            "Passw0rd!",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Session(SessionCommand::Login { email, password }) => {
                assert_eq!(email, "ana@example.com");
                assert_eq!(password, "Passw0rd!");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_session_commands_stay_top_level() {
        let cli = Cli::try_parse_from(["voyage", "status", "--api-url", "http://127.0.0.1:3000"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Session(SessionCommand::Status)
        ));
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:3000"));
    }

    #[test]
    fn test_parse_check_password() {
        let cli = Cli::try_parse_from(["voyage", "check-password", "abc", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::CheckPassword { json: true, .. }
        ));
    }
}
