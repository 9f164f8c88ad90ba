use eco_core::entities::PickupRequest;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::PickupArgs;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

/// Handle `ecosort pickup`.
pub async fn handle(args: &PickupArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let request = PickupRequest {
        identity_id: String::new(),
        recycler_id: args.recycler.clone(),
        scan_id: args.scan_id.clone(),
        material: args.material.clone(),
        date: args.date.clone(),
        time_slot: args.slot.clone(),
        address: args.address.clone(),
        notes: args.notes.clone(),
    };

    let spinner = Progress::spinner("scheduling pickup");
    match ctx.orchestrator.schedule_pickup(request).await {
        Ok(confirmation) => {
            spinner.finish_clear();
            output(&confirmation, flags.format)
        }
        Err(error) => {
            spinner.finish_err(&error.user_message());
            Err(anyhow::Error::new(error).context("failed to schedule pickup"))
        }
    }
}
