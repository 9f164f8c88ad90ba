use crate::cli::GlobalFlags;
use crate::cli::root_commands::AskArgs;
use crate::commands::run;
use crate::context::AppContext;

/// Handle `ecosort ask`.
pub async fn handle(args: &AskArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = run::drive(ctx, "asking", ctx.orchestrator.run_text(args.query())).await;
    run::finish(report, ctx, flags, false).await
}
