use clap::{Args, Subcommand};

/// User identity commands.
#[derive(Clone, Debug, Subcommand)]
pub enum UserCommands {
    /// Create a backend account and make it the active identity.
    Register(UserRegisterArgs),
    /// Show the active identity.
    Show,
    /// Switch to an existing account by id.
    Set(UserSetArgs),
    /// Forget the active identity and cached balance.
    Logout(UserLogoutArgs),
}

#[derive(Clone, Debug, Args)]
pub struct UserRegisterArgs {
    /// Display name.
    #[arg(long)]
    pub name: String,

    /// Phone number.
    #[arg(long)]
    pub phone: String,
}

#[derive(Clone, Debug, Args)]
pub struct UserSetArgs {
    /// Backend user id.
    pub id: String,
}

#[derive(Clone, Debug, Args)]
pub struct UserLogoutArgs {
    /// Also delete the saved state file, including the language preference.
    #[arg(long)]
    pub all: bool,
}
