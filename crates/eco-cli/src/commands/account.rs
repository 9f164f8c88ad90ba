use eco_core::entities::{ImpactStats, Wallet};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RedeemArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Serialize)]
struct ImpactResponse {
    total_scans: u64,
    tokens_earned: u64,
    tokens_balance: u64,
    co2_saved_kg: String,
    water_saved_liters: String,
    landfill_saved_kg: String,
}

impl From<ImpactStats> for ImpactResponse {
    fn from(stats: ImpactStats) -> Self {
        Self {
            total_scans: stats.total_scans,
            tokens_earned: stats.tokens_earned,
            tokens_balance: stats.tokens_balance,
            co2_saved_kg: format!("{:.1}", stats.total_co2_saved_kg),
            water_saved_liters: format!("{:.0}", stats.total_water_saved_liters),
            landfill_saved_kg: format!("{:.1}", stats.total_landfill_saved_kg),
        }
    }
}

#[derive(Serialize)]
struct RedeemResponse {
    code: String,
    tokens_awarded: u64,
    balance: Option<u64>,
    message: Option<String>,
}

/// Handle `ecosort impact`.
pub async fn handle_impact(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let stats = ctx
        .orchestrator
        .impact()
        .await
        .map_err(|error| anyhow::Error::new(error).context("failed to load impact"))?;
    ctx.save_state()?;
    output(&ImpactResponse::from(stats), flags.format)
}

/// Handle `ecosort wallet`.
pub async fn handle_wallet(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let wallet: Wallet = ctx
        .orchestrator
        .wallet()
        .await
        .map_err(|error| anyhow::Error::new(error).context("failed to load wallet"))?;
    ctx.save_state()?;
    output(&wallet, flags.format)
}

/// Handle `ecosort redeem`.
pub async fn handle_redeem(
    args: &RedeemArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let redemption = ctx
        .orchestrator
        .redeem(&args.code)
        .await
        .map_err(|error| anyhow::Error::new(error).context("redeem failed"))?;
    ctx.save_state()?;
    output(
        &RedeemResponse {
            code: redemption.code,
            tokens_awarded: redemption.tokens_awarded,
            balance: ctx.store.token_balance(),
            message: redemption.message,
        },
        flags.format,
    )
}
