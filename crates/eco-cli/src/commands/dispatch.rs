use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Scan(args) => commands::scan::handle(&args, ctx, flags).await,
        Commands::Voice(args) => commands::voice::handle(&args, ctx, flags).await,
        Commands::Ask(args) => commands::ask::handle(&args, ctx, flags).await,
        Commands::Result => commands::result::handle(ctx, flags),
        Commands::Recyclers(args) => commands::recyclers::handle(&args, ctx, flags).await,
        Commands::Impact => commands::account::handle_impact(ctx, flags).await,
        Commands::Wallet => commands::account::handle_wallet(ctx, flags).await,
        Commands::Redeem(args) => commands::account::handle_redeem(&args, ctx, flags).await,
        Commands::Pickup(args) => commands::pickup::handle(&args, ctx, flags).await,
        Commands::User { action } => commands::user::handle(&action, ctx, flags).await,
        Commands::Lang(args) => commands::lang::handle(&args, ctx, flags),
        Commands::Shell => anyhow::bail!("shell cannot be nested"),
    }
}
