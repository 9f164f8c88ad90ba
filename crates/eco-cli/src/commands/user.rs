use eco_core::Identity;
use eco_core::identity::Registration;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::{UserCommands, UserLogoutArgs, UserRegisterArgs, UserSetArgs};
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct UserResponse {
    signed_in: bool,
    #[serde(flatten)]
    identity: Option<Identity>,
    language: String,
    token_balance: Option<u64>,
}

#[derive(Serialize)]
struct LogoutResponse {
    cleared: bool,
    state_removed: bool,
}

/// Handle `ecosort user <subcommand>`.
pub async fn handle(
    action: &UserCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        UserCommands::Register(args) => register(args, ctx, flags).await,
        UserCommands::Show => show(ctx, flags),
        UserCommands::Set(args) => set(args, ctx, flags).await,
        UserCommands::Logout(args) => logout(args, ctx, flags),
    }
}

async fn register(
    args: &UserRegisterArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let registration = Registration {
        display_name: args.name.trim().to_string(),
        contact: args.phone.trim().to_string(),
        language: ctx.store.language(),
    };
    ctx.orchestrator
        .register(&registration)
        .await
        .map_err(|error| anyhow::Error::new(error).context("registration failed"))?;
    // Registration records the language the user picked; keep it.
    ctx.set_saved_language(registration.language);
    ctx.save_state()?;
    show(ctx, flags)
}

async fn set(args: &UserSetArgs, ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.orchestrator
        .sign_in(args.id.trim())
        .await
        .map_err(|error| anyhow::Error::new(error).context("sign-in failed"))?;
    ctx.save_state()?;
    show(ctx, flags)
}

fn show(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let identity = ctx.store.identity();
    output(
        &UserResponse {
            signed_in: identity.is_some(),
            identity,
            language: ctx.store.language().to_string(),
            token_balance: ctx.store.token_balance(),
        },
        flags.format,
    )
}

fn logout(args: &UserLogoutArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.store.clear_identity();
    if args.all {
        ctx.clear_state()?;
    } else {
        ctx.save_state()?;
    }
    if ctx.config.identity.is_configured() {
        tracing::warn!("an identity is configured and will be used again on the next run");
    }
    output(
        &LogoutResponse {
            cleared: true,
            state_removed: args.all && ctx.persistence_enabled(),
        },
        flags.format,
    )
}
